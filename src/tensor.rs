//! Packing accumulated streams into the output tensor.
//!
//! Streams finish accumulation ragged: different channel counts, different
//! lengths. The packer reconciles them into one rectangular buffer sized by
//! the maximum extents, scales every sample from native 16-bit down to unit
//! amplitude, and leaves everything past a stream's actual extent at zero.

use serde::Serialize;

use crate::accumulate::SampleBank;

/// Scale from native signed 16-bit samples to unit amplitude. Full-scale
/// positive input maps just under `+1.0` (`32767 / 32768`).
const AMPLITUDE_SCALE: f32 = 1.0 / 32_768.0;

/// The rectangular, normalized decode result.
///
/// Axes are `[channels, samples]` when the container held exactly one audio
/// stream, and `[streams, channels, samples]` otherwise. The flat layout is
/// first-axis-fastest: element `(stream, channel, sample)` lives at
/// `(sample × max_channels + channel) × streams + stream`, with the two-axis
/// case being the same formula with one stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// The axis extents, outermost first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The flat sample data (see the type docs for the layout).
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Look up one element by logical position.
    ///
    /// `stream` must be 0 for a two-axis tensor. Out-of-range positions
    /// return `None`.
    pub fn value(&self, stream: usize, channel: usize, sample: usize) -> Option<f32> {
        let (streams, channels, samples) = self.extents()?;
        if stream >= streams || channel >= channels || sample >= samples {
            return None;
        }
        Some(self.data[(sample * channels + channel) * streams + stream])
    }

    fn extents(&self) -> Option<(usize, usize, usize)> {
        match *self.shape.as_slice() {
            [channels, samples] => Some((1, channels, samples)),
            [streams, channels, samples] => Some((streams, channels, samples)),
            _ => None,
        }
    }
}

/// Pack the accumulated banks into the output tensor, consuming them.
///
/// Pure computation over already-validated buffers; there are no error
/// conditions here.
pub(crate) fn pack(banks: Vec<SampleBank>) -> Tensor {
    let streams = banks.len();
    let max_channels = banks.iter().map(SampleBank::channels).max().unwrap_or(0);
    let max_frames = banks.iter().map(SampleBank::frames).max().unwrap_or(0);

    let shape = if streams == 1 {
        vec![max_channels, max_frames]
    } else {
        vec![streams, max_channels, max_frames]
    };

    // Zero-initialized; positions past a stream's extent are never written.
    let mut data = vec![0.0f32; streams * max_channels * max_frames];

    for (stream, bank) in banks.iter().enumerate() {
        let channels = bank.channels();
        let samples = bank.samples();

        for channel in 0..channels {
            for frame in 0..bank.frames() {
                let native = samples[frame * channels + channel];
                data[(frame * max_channels + channel) * streams + stream] =
                    f32::from(native) * AMPLITUDE_SCALE;
            }
        }
    }

    Tensor { shape, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(channels: usize, interleaved: &[i16]) -> SampleBank {
        let mut bank = SampleBank::new(channels, 0, None);
        bank.append(interleaved);
        bank
    }

    #[test]
    fn single_stream_packs_to_two_axes() {
        let tensor = pack(vec![bank(2, &[100, 200, 300, 400])]);
        assert_eq!(tensor.shape(), &[2, 2]);
    }

    #[test]
    fn multiple_streams_pack_to_three_axes() {
        let tensor = pack(vec![bank(1, &[1, 2]), bank(1, &[3, 4])]);
        assert_eq!(tensor.shape(), &[2, 1, 2]);
    }

    #[test]
    fn layout_is_first_axis_fastest() {
        // Stream 0: stereo frames (100, 200), (300, 400).
        // Stream 1: mono frames 500, 600.
        let tensor = pack(vec![
            bank(2, &[100, 200, 300, 400]),
            bank(1, &[500, 600]),
        ]);
        assert_eq!(tensor.shape(), &[2, 2, 2]);

        let expect = |v: i16| f32::from(v) * AMPLITUDE_SCALE;
        // Flat order: (frame, channel, stream) with stream varying fastest.
        let want = vec![
            expect(100),
            expect(500),
            expect(200),
            0.0,
            expect(300),
            expect(600),
            expect(400),
            0.0,
        ];
        assert_eq!(tensor.data(), want.as_slice());
    }

    #[test]
    fn value_addresses_logical_positions() {
        let tensor = pack(vec![
            bank(2, &[100, 200, 300, 400]),
            bank(1, &[500, 600]),
        ]);

        let expect = |v: i16| f32::from(v) * AMPLITUDE_SCALE;
        assert_eq!(tensor.value(0, 1, 1), Some(expect(400)));
        assert_eq!(tensor.value(1, 0, 1), Some(expect(600)));
        // Stream 1 has no second channel; its slot is zero, not absent.
        assert_eq!(tensor.value(1, 1, 0), Some(0.0));
        assert_eq!(tensor.value(2, 0, 0), None);
    }

    #[test]
    fn ragged_stream_tails_stay_zero() {
        // 800 and 1200 frames per channel, both stereo.
        let long: Vec<i16> = (0..2400).map(|i| (i % 311) as i16).collect();
        let short: Vec<i16> = (0..1600).map(|i| (i % 211) as i16 + 1).collect();

        let tensor = pack(vec![bank(2, &short), bank(2, &long)]);
        assert_eq!(tensor.shape(), &[2, 2, 1200]);

        for frame in 800..1200 {
            for channel in 0..2 {
                assert_eq!(tensor.value(0, channel, frame), Some(0.0));
            }
        }
        // The longer stream's tail is real data.
        assert_ne!(tensor.value(1, 0, 1199), Some(0.0));
    }

    #[test]
    fn normalization_is_linear_and_range_preserving() {
        let tensor = pack(vec![bank(1, &[i16::MAX, 0, i16::MIN])]);

        let max = tensor.value(0, 0, 0).unwrap();
        assert!(max > 0.999 && max < 1.0);
        assert_eq!(tensor.value(0, 0, 1), Some(0.0));
        assert_eq!(tensor.value(0, 0, 2), Some(-1.0));
    }

    #[test]
    fn no_streams_packs_an_empty_tensor() {
        let tensor = pack(Vec::new());
        assert_eq!(tensor.shape(), &[0, 0, 0]);
        assert!(tensor.is_empty());
    }
}
