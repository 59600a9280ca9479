// src/probe.rs

//! Container probing for audioread.
//!
//! This module keeps container-level concerns isolated from the rest of the
//! decode pipeline:
//! - open an input path and probe its container format
//! - enumerate elementary streams and collect the audio ones, in container order
//! - validate that each audio stream carries the metadata decoding requires

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::{Hint, ProbedMetadata};
use tracing::debug;

use crate::error::{Error, Result};

/// One opened container plus everything discovered while probing it.
///
/// The handle is the sole owner of the format reader and, transitively, of
/// every decoder built on top of it during a read. Dropping it — on success
/// and on every error path alike — releases all of that state, so no exit
/// path needs explicit teardown.
pub(crate) struct ContainerHandle {
    pub format: Box<dyn FormatReader>,
    /// Audio tracks in container discovery order.
    pub audio_tracks: Vec<Track>,
    pub path: PathBuf,
    /// Byte length of the input, when the filesystem reports one.
    pub file_size: Option<u64>,
    /// Metadata revisions found while probing (e.g. leading ID3 tags).
    pub probe_metadata: ProbedMetadata,
}

/// Open `path` and probe it as a media container.
///
/// Fails with:
/// - [`Error::Open`] when the file cannot be read or no demuxer recognizes it
/// - [`Error::StreamInfo`] when an audio stream lacks a sample rate or
///   channel map (both are required downstream)
/// - [`Error::NoAudioStream`] when no elementary stream is audio
pub(crate) fn open_container(path: &Path) -> Result<ContainerHandle> {
    let file = File::open(path).map_err(|err| Error::open(path, err))?;
    let file_size = file.metadata().ok().map(|m| m.len());

    let mss_opts = MediaSourceStreamOptions {
        // Symphonia expects a power-of-two buffer > 32KiB for good probing behavior.
        buffer_len: 256 * 1024,
    };
    let mss = MediaSourceStream::new(Box::new(file), mss_opts);

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let format_opts: FormatOptions = Default::default();
    let metadata_opts: MetadataOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|err| Error::open(path, err))?;

    let audio_tracks = collect_audio_tracks(probed.format.tracks())?;

    debug!(
        path = %path.display(),
        streams = probed.format.tracks().len(),
        audio_streams = audio_tracks.len(),
        "probed container"
    );

    Ok(ContainerHandle {
        format: probed.format,
        audio_tracks,
        path: path.to_path_buf(),
        file_size,
        probe_metadata: probed.metadata,
    })
}

/// Classify tracks and keep the audio ones, preserving container order.
///
/// A track counts as audio when the demuxer resolved a codec id for it;
/// tracks the demuxer could not type (`CODEC_TYPE_NULL`, e.g. video payloads
/// in a mixed container) are skipped, not errors.
fn collect_audio_tracks(tracks: &[Track]) -> Result<Vec<Track>> {
    let mut audio = Vec::new();

    for track in tracks {
        if track.codec_params.codec == CODEC_TYPE_NULL {
            continue;
        }

        let stream = audio.len();
        if track.codec_params.sample_rate.is_none() {
            return Err(Error::stream_info(stream, "no sample rate reported"));
        }
        if track.codec_params.channels.is_none() {
            return Err(Error::stream_info(stream, "no channel map reported"));
        }

        audio.push(track.clone());
    }

    if audio.is_empty() {
        return Err(Error::NoAudioStream);
    }

    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::audio::Channels;
    use symphonia::core::codecs::{CODEC_TYPE_PCM_S16LE, CodecParameters};

    fn audio_track(id: u32, sample_rate: Option<u32>, channels: Option<Channels>) -> Track {
        let mut params = CodecParameters::new();
        params.for_codec(CODEC_TYPE_PCM_S16LE);
        if let Some(rate) = sample_rate {
            params.with_sample_rate(rate);
        }
        if let Some(chans) = channels {
            params.with_channels(chans);
        }
        Track::new(id, params)
    }

    fn null_track(id: u32) -> Track {
        Track::new(id, CodecParameters::new())
    }

    #[test]
    fn collects_audio_tracks_in_container_order() {
        let tracks = vec![
            null_track(0),
            audio_track(1, Some(44_100), Some(Channels::FRONT_LEFT | Channels::FRONT_RIGHT)),
            audio_track(2, Some(48_000), Some(Channels::FRONT_LEFT)),
        ];

        let audio = collect_audio_tracks(&tracks).expect("two audio tracks");
        assert_eq!(audio.len(), 2);
        assert_eq!(audio[0].id, 1);
        assert_eq!(audio[1].id, 2);
    }

    #[test]
    fn no_typed_tracks_is_no_audio_stream() {
        let tracks = vec![null_track(0), null_track(1)];
        assert!(matches!(
            collect_audio_tracks(&tracks),
            Err(Error::NoAudioStream)
        ));
    }

    #[test]
    fn missing_sample_rate_is_stream_info_error() {
        let tracks = vec![audio_track(0, None, Some(Channels::FRONT_LEFT))];
        assert!(matches!(
            collect_audio_tracks(&tracks),
            Err(Error::StreamInfo { stream: 0, .. })
        ));
    }

    #[test]
    fn missing_channel_map_is_stream_info_error() {
        let tracks = vec![audio_track(0, Some(44_100), None)];
        assert!(matches!(
            collect_audio_tracks(&tracks),
            Err(Error::StreamInfo { stream: 0, .. })
        ));
    }
}
