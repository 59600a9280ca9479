//! Size estimation from container metadata.
//!
//! Sample counts are estimated from the duration each stream reports, without
//! decoding any payload data. Containers mis-report duration often enough
//! that the result is a best-effort bound: it may overshoot or undershoot the
//! true decoded count. It is used to seed buffer pre-allocation and to answer
//! the size-only query.

use serde::Serialize;
use symphonia::core::codecs::CodecParameters;
use symphonia::core::formats::Track;

/// The would-be extents of a decode, derived purely from container metadata.
///
/// This is the size-only query result: stream count, the maximum channel
/// count across streams, and the maximum estimated samples-per-channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    pub streams: usize,
    pub max_channels: usize,
    pub max_frames: u64,
}

impl SizeEstimate {
    /// The estimate as the flat `[stream_count, max_channel_count,
    /// max_estimated_samples]` row the size-only call returns.
    pub fn as_row(&self) -> [u64; 3] {
        [self.streams as u64, self.max_channels as u64, self.max_frames]
    }
}

/// Reduce per-stream estimates into the overall extents.
///
/// `channel_counts` holds the decoder-recorded channel count for each track,
/// index-aligned with `tracks`.
pub(crate) fn estimate_extents(tracks: &[Track], channel_counts: &[usize]) -> SizeEstimate {
    let max_channels = channel_counts.iter().copied().max().unwrap_or(0);
    let max_frames = tracks
        .iter()
        .map(|track| estimate_frames(&track.codec_params))
        .max()
        .unwrap_or(0);

    SizeEstimate {
        streams: tracks.len(),
        max_channels,
        max_frames,
    }
}

/// Estimate one stream's samples-per-channel as
/// `sample_rate × reported duration`, truncated to an integer.
///
/// `n_frames` is in the stream's time base; when no time base is reported it
/// is taken as a frame count directly. Streams reporting neither estimate
/// to zero.
pub(crate) fn estimate_frames(params: &CodecParameters) -> u64 {
    match (params.n_frames, params.time_base) {
        (Some(n_frames), Some(time_base)) => {
            let sample_rate = params.sample_rate.unwrap_or(0);
            (f64::from(sample_rate) * track_seconds(n_frames, time_base)) as u64
        }
        (Some(n_frames), None) => n_frames,
        _ => 0,
    }
}

/// A stream's reported duration in seconds, when it reports one.
pub(crate) fn duration_seconds(params: &CodecParameters) -> Option<f64> {
    let n_frames = params.n_frames?;
    let time_base = params.time_base?;
    Some(track_seconds(n_frames, time_base))
}

fn track_seconds(n_frames: u64, time_base: symphonia::core::units::TimeBase) -> f64 {
    let time = time_base.calc_time(n_frames);
    time.seconds as f64 + time.frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::audio::Channels;
    use symphonia::core::codecs::CODEC_TYPE_PCM_S16LE;
    use symphonia::core::units::TimeBase;

    fn track(id: u32, sample_rate: u32, n_frames: Option<u64>, time_base: Option<TimeBase>) -> Track {
        let mut params = CodecParameters::new();
        params
            .for_codec(CODEC_TYPE_PCM_S16LE)
            .with_sample_rate(sample_rate)
            .with_channels(Channels::FRONT_LEFT);
        if let Some(n) = n_frames {
            params.with_n_frames(n);
        }
        if let Some(tb) = time_base {
            params.with_time_base(tb);
        }
        Track::new(id, params)
    }

    #[test]
    fn estimates_from_time_base_and_duration() {
        // 44100 ticks at 1/44100 s per tick = exactly one second.
        let t = track(0, 44_100, Some(44_100), Some(TimeBase::new(1, 44_100)));
        assert_eq!(estimate_frames(&t.codec_params), 44_100);
    }

    #[test]
    fn falls_back_to_raw_frame_count_without_a_time_base() {
        let t = track(0, 48_000, Some(1234), None);
        assert_eq!(estimate_frames(&t.codec_params), 1234);
    }

    #[test]
    fn no_duration_estimates_zero() {
        let t = track(0, 48_000, None, None);
        assert_eq!(estimate_frames(&t.codec_params), 0);
    }

    #[test]
    fn extents_take_the_max_across_streams() {
        let tracks = vec![
            track(0, 8_000, Some(800), Some(TimeBase::new(1, 8_000))),
            track(1, 8_000, Some(1200), Some(TimeBase::new(1, 8_000))),
        ];
        let estimate = estimate_extents(&tracks, &[2, 1]);

        assert_eq!(
            estimate,
            SizeEstimate {
                streams: 2,
                max_channels: 2,
                max_frames: 1200,
            }
        );
        assert_eq!(estimate.as_row(), [2, 2, 1200]);
    }

    #[test]
    fn duration_needs_both_frames_and_time_base() {
        let with_both = track(0, 8_000, Some(4_000), Some(TimeBase::new(1, 8_000)));
        let seconds = duration_seconds(&with_both.codec_params).expect("duration");
        assert!((seconds - 0.5).abs() < 1e-9);

        let without = track(0, 8_000, Some(4_000), None);
        assert!(duration_seconds(&without.codec_params).is_none());
    }
}
