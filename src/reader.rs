// src/reader.rs

//! High-level API for reading container audio into a tensor.
//!
//! This module is intentionally orchestration-focused:
//! - `probe` opens the container and finds the audio streams
//! - `decode` builds one decoder per stream
//! - `estimate` sizes the result from container metadata
//! - `accumulate` runs the packet pass into per-stream banks
//! - `tensor` packs the banks into the rectangular output
//! - `metadata` assembles the descriptive record
//!
//! Every invocation owns its container handle, decoders, and buffers; all of
//! it is created fresh here and dropped before returning, on success and on
//! every error path. Nothing persists between calls.

use std::path::Path;

use tracing::debug;

use crate::accumulate::{self, SampleBank};
use crate::decode;
use crate::error::{Error, Result};
use crate::estimate::{self, SizeEstimate};
use crate::metadata::{self, ContainerInfo};
use crate::probe;
use crate::tensor::{self, Tensor};

/// Everything one full read produces.
///
/// Callers wanting only the tensor take `tensor`; the sample-rate and
/// normalized-bit-rate vectors and the metadata record are the optional
/// result positions of the call boundary. A failed read returns `Err` and
/// binds none of these.
#[derive(Debug, Clone)]
pub struct Reading {
    pub tensor: Tensor,
    /// Per-stream sample rate, in discovery order.
    pub sample_rates: Vec<u32>,
    /// Per-stream bit rate divided by sample rate and channel count —
    /// effectively bits per sample; `0.0` when the bit rate is unknown.
    pub normalized_bit_rates: Vec<f64>,
    pub info: ContainerInfo,
}

/// Decode every audio stream of `path` into a normalized sample tensor.
///
/// `limit` is the optional per-stream ceiling on decoded samples per
/// channel; `None` decodes everything. A ceiling of zero is rejected as
/// [`Error::InvalidArgument`] before the file is touched.
pub fn read(path: impl AsRef<Path>, limit: Option<u64>) -> Result<Reading> {
    let path = path.as_ref();

    if limit == Some(0) {
        return Err(Error::InvalidArgument(String::from(
            "sample ceiling must be a positive integer",
        )));
    }

    let mut handle = probe::open_container(path)?;
    let mut decoders = decode::build_decoder_set(&handle.audio_tracks)?;

    // Pre-size each bank from the container's own duration claim.
    let mut banks: Vec<SampleBank> = handle
        .audio_tracks
        .iter()
        .zip(&decoders)
        .map(|(track, decoder)| {
            let estimated = estimate::estimate_frames(&track.codec_params);
            SampleBank::new(decoder.channels, estimated, limit)
        })
        .collect();

    accumulate::run(handle.format.as_mut(), &mut decoders, &mut banks);

    debug!(
        streams = banks.len(),
        frames = banks.iter().map(SampleBank::frames).max().unwrap_or(0),
        "accumulation finished"
    );

    let info = container_info(&mut handle, &decoders);
    let sample_rates = decoders.iter().map(|decoder| decoder.sample_rate).collect();
    let normalized_bit_rates = info
        .streams
        .iter()
        .map(|stream| match stream.bit_rate {
            Some(bits) if stream.sample_rate > 0 && stream.channels > 0 => {
                bits as f64 / f64::from(stream.sample_rate) / stream.channels as f64
            }
            _ => 0.0,
        })
        .collect();

    let tensor = tensor::pack(banks);

    Ok(Reading {
        tensor,
        sample_rates,
        normalized_bit_rates,
        info,
    })
}

/// Report the extents a full decode of `path` would have, without decoding
/// any audio data: `[stream_count, max_channel_count, max_estimated_samples]`.
///
/// The decoder set is still constructed so codec problems surface exactly as
/// they would in a full read.
pub fn read_size(path: impl AsRef<Path>) -> Result<SizeEstimate> {
    let handle = probe::open_container(path.as_ref())?;
    let decoders = decode::build_decoder_set(&handle.audio_tracks)?;

    let channel_counts: Vec<usize> = decoders.iter().map(|decoder| decoder.channels).collect();
    Ok(estimate::estimate_extents(&handle.audio_tracks, &channel_counts))
}

fn container_info(
    handle: &mut probe::ContainerHandle,
    decoders: &[decode::StreamDecoder],
) -> ContainerInfo {
    let duration = handle
        .audio_tracks
        .iter()
        .filter_map(|track| estimate::duration_seconds(&track.codec_params))
        .fold(0.0_f64, f64::max);

    let streams = handle
        .audio_tracks
        .iter()
        .zip(decoders)
        .map(|(track, decoder)| metadata::stream_info(track, decoder.channels, handle.file_size))
        .collect();

    ContainerInfo {
        file_name: handle.path.display().to_string(),
        container_name: metadata::container_name(&handle.path),
        duration,
        file_size: handle.file_size,
        tag_info: metadata::collect_tags(handle),
        streams,
    }
}
