// src/accumulate.rs

//! The decode-accumulate loop and its per-stream sample banks.
//!
//! Responsibilities:
//! - iterate container packets once, in delivery order, routing each to the
//!   decoder that owns its track
//! - append decoded runs into a growable per-stream bank of interleaved
//!   `i16` samples
//! - enforce the caller's samples-per-channel ceiling: full streams stop
//!   decoding (their packets are still scanned past), and a final pass
//!   truncates any overshoot to exactly the bound

use symphonia::core::formats::FormatReader;
use tracing::debug;

use crate::decode::StreamDecoder;

/// Capacity is reserved in increments of this many samples, amortizing
/// reallocation the same way a fixed-step `realloc` loop would.
const GROW_INCREMENT: usize = 65_536;

/// A growable buffer of channel-interleaved `i16` samples for one stream.
///
/// Invariant: the logical length is always a multiple of the stream's channel
/// count (decoded runs arrive whole-frame). The bank never shrinks while
/// accumulating; [`SampleBank::truncate_to_ceiling`] is the one cut, applied
/// after the packet pass.
pub(crate) struct SampleBank {
    samples: Vec<i16>,
    channels: usize,
    /// Caller-requested samples-per-channel bound; `None` is unbounded.
    ceiling: Option<u64>,
}

impl SampleBank {
    /// Create a bank for one stream, pre-allocating from the container's
    /// size estimate (clamped by the ceiling when one is set). The estimate
    /// is best-effort; the grow path covers any shortfall.
    pub(crate) fn new(channels: usize, estimated_frames: u64, ceiling: Option<u64>) -> Self {
        let mut seed_frames = estimated_frames;
        if let Some(limit) = ceiling {
            seed_frames = seed_frames.min(limit);
        }
        let seed = (seed_frames as usize).saturating_mul(channels);

        Self {
            samples: Vec::with_capacity(seed),
            channels,
            ceiling,
        }
    }

    /// The ceiling expressed in interleaved samples, when one is set.
    fn ceiling_samples(&self) -> Option<usize> {
        self.ceiling
            .map(|frames| (frames as usize).saturating_mul(self.channels))
    }

    /// True once the bank holds at least `ceiling × channels` samples;
    /// further packets for this stream are skipped without decoding.
    pub(crate) fn is_full(&self) -> bool {
        matches!(self.ceiling_samples(), Some(cap) if self.samples.len() >= cap)
    }

    /// Append one decoded run, growing backing storage in fixed increments
    /// when the current capacity cannot hold it.
    pub(crate) fn append(&mut self, run: &[i16]) {
        debug_assert_eq!(run.len() % self.channels.max(1), 0);

        let needed = self.samples.len() + run.len();
        if needed > self.samples.capacity() {
            let shortfall = needed - self.samples.capacity();
            let grow = shortfall.div_ceil(GROW_INCREMENT) * GROW_INCREMENT;
            let target = self.samples.capacity() + grow;
            self.samples.reserve_exact(target - self.samples.len());
        }

        self.samples.extend_from_slice(run);
    }

    /// Cut the bank to exactly `ceiling × channels` samples when it ran
    /// past the bound mid-decode. Idempotent; a no-op without a ceiling.
    pub(crate) fn truncate_to_ceiling(&mut self) {
        if let Some(cap) = self.ceiling_samples() {
            if self.samples.len() > cap {
                self.samples.truncate(cap);
            }
        }
    }

    pub(crate) fn channels(&self) -> usize {
        self.channels
    }

    /// Samples-per-channel currently held.
    pub(crate) fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    pub(crate) fn samples(&self) -> &[i16] {
        &self.samples
    }
}

/// Run the single ordered packet pass.
///
/// Packets from untracked streams are skipped; packets for full banks are
/// skipped without decoding while the rest of the container keeps flowing.
/// Format-reader errors end the pass (end-of-data); per-packet decode
/// failures were already absorbed by [`StreamDecoder::decode_packet`].
pub(crate) fn run(
    format: &mut dyn FormatReader,
    decoders: &mut [StreamDecoder],
    banks: &mut [SampleBank],
) {
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(err) => {
                debug!(error = %err, "packet stream ended");
                break;
            }
        };

        let Some(slot) = decoders
            .iter()
            .position(|decoder| decoder.track_id == packet.track_id())
        else {
            continue;
        };

        if banks[slot].is_full() {
            continue;
        }

        let decoded = decoders[slot].decode_packet(&packet);
        if !decoded.is_empty() {
            banks[slot].append(decoded);
        }
    }

    for bank in banks.iter_mut() {
        bank.truncate_to_ceiling();
    }
}
