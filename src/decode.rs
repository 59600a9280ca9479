// src/decode.rs

//! Decoder setup and per-packet decoding built on top of Symphonia.
//!
//! This module isolates codec-level concerns:
//! - constructing one decoder per discovered audio stream
//! - decoding packets into interleaved 16-bit PCM runs
//! - handling Symphonia's error model in a predictable way
//!
//! Error handling policy for individual packets: any decode failure yields an
//! empty run and the loop moves on. Only setup failures (unknown codec,
//! decoder construction) are fatal, and those are reported before the first
//! packet is read.

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{Packet, Track};
use tracing::debug;

use crate::error::{Error, Result};

/// Decoding state for one audio stream.
///
/// Channel count and sample rate are fixed at setup and never change for the
/// life of the stream; the interleaved scratch buffer is created lazily from
/// the first decoded buffer and reused for every packet after it.
pub(crate) struct StreamDecoder {
    pub track_id: u32,
    pub channels: usize,
    pub sample_rate: u32,
    decoder: Box<dyn Decoder>,
    sample_buf: Option<SampleBuffer<i16>>,
}

/// Construct a decoder for every audio track, in discovery order.
///
/// Fails with:
/// - [`Error::UnsupportedCodec`] when the default registry has no decoder
///   for a track's codec (checked before construction, so the error names
///   the exact stream)
/// - [`Error::DecoderInit`] when decoder construction fails
///
/// On a per-stream failure the decoders built so far are dropped as the
/// error propagates; there is no partially-initialized set to clean up.
pub(crate) fn build_decoder_set(tracks: &[Track]) -> Result<Vec<StreamDecoder>> {
    let registry = symphonia::default::get_codecs();
    let decoder_opts: DecoderOptions = Default::default();

    let mut decoders = Vec::with_capacity(tracks.len());

    for (stream, track) in tracks.iter().enumerate() {
        if registry.get_codec(track.codec_params.codec).is_none() {
            return Err(Error::UnsupportedCodec { stream });
        }

        let decoder = registry
            .make(&track.codec_params, &decoder_opts)
            .map_err(|err| Error::decoder_init(stream, err))?;

        // Both fields were validated during probing.
        let channels = track
            .codec_params
            .channels
            .map(|chans| chans.count())
            .ok_or_else(|| Error::stream_info(stream, "no channel map reported"))?;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| Error::stream_info(stream, "no sample rate reported"))?;

        decoders.push(StreamDecoder {
            track_id: track.id,
            channels,
            sample_rate,
            decoder,
            sample_buf: None,
        });
    }

    Ok(decoders)
}

impl StreamDecoder {
    /// Decode one packet into an interleaved `i16` run.
    ///
    /// Returns an empty slice when the packet produced no audio — including
    /// every decode failure, which is recoverable by contract. A
    /// `ResetRequired` resets this stream's decoder and also yields nothing.
    pub(crate) fn decode_packet(&mut self, packet: &Packet) -> &[i16] {
        match self.decoder.decode(packet) {
            Ok(decoded) => {
                if decoded.frames() == 0 {
                    return &[];
                }

                let sample_buf = self.sample_buf.get_or_insert_with(|| {
                    SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec())
                });
                sample_buf.copy_interleaved_ref(decoded);
                sample_buf.samples()
            }
            Err(SymphoniaError::ResetRequired) => {
                self.decoder.reset();
                &[]
            }
            Err(err) => {
                // Skip the bad packet; the stream keeps decoding.
                debug!(track_id = self.track_id, error = %err, "packet decode failed");
                &[]
            }
        }
    }
}
