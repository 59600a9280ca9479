//! `audioread` — decode the audio streams of arbitrary container files into
//! a normalized sample tensor.
//!
//! This crate provides:
//! - Container probing and audio stream discovery over any format Symphonia
//!   demuxes
//! - An incremental decode loop accumulating every audio stream at once,
//!   with an optional per-stream sample ceiling
//! - A rectangular output tensor (`[channels, samples]`, or
//!   `[streams, channels, samples]` for multi-stream containers) normalized
//!   to unit amplitude
//! - A size-only query reporting the would-be extents without decoding
//! - Container, tag, and per-stream metadata read-out
//!
//! The library is designed to be used by both CLI tools and host bindings,
//! with an emphasis on all-or-nothing results: a call yields its full output
//! or an error, never a partial set.

// High-level API (most consumers should start here).
pub mod reader;

// Pipeline stages, in decode order.
mod probe;
mod decode;
mod accumulate;

// Result types: extents, samples, and descriptive metadata.
pub mod estimate;
pub mod metadata;
pub mod tensor;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub mod error;
