// src/metadata.rs

//! Descriptive metadata read-out.
//!
//! Everything here is assembled from state the prober and decoder set already
//! hold; no additional decoding happens. Fields the source container does not
//! report stay `None` and are omitted from serialized output.

use std::path::Path;

use serde::Serialize;
use symphonia::core::formats::Track;
use symphonia::core::meta::{MetadataRevision, StandardTagKey};

use crate::estimate;
use crate::probe::ContainerHandle;

/// Container-level description of one input: identity, duration, tag fields,
/// and one record per audio stream.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub file_name: String,
    pub container_name: String,
    /// Duration in seconds, taken as the maximum across audio streams.
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    pub tag_info: TagInfo,
    pub streams: Vec<StreamInfo>,
}

/// The classic container tag fields. Absent tags are omitted, not empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

/// Per-stream codec facts.
///
/// Symphonia's demuxers do not surface encoder rate-control settings, so
/// `bit_rate_tolerance` and the quantizer bounds are reported only when a
/// future source provides them; today they serialize as absent.
#[derive(Debug, Clone, Serialize)]
pub struct StreamInfo {
    pub codec_name: String,
    pub channels: usize,
    pub sample_rate: u32,
    /// Bits per second. Exact for codecs reporting a native sample width
    /// (PCM and friends), otherwise a container-level estimate from file
    /// size over duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate_tolerance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_quantizer: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_quantizer: Option<u32>,
}

/// Gather tag fields from every metadata revision the container exposed:
/// revisions found while probing (leading ID3 and friends) first, then the
/// format reader's own. The first value seen for a field wins.
pub(crate) fn collect_tags(handle: &mut ContainerHandle) -> TagInfo {
    let mut tags = TagInfo::default();

    if let Some(metadata) = handle.probe_metadata.get() {
        if let Some(revision) = metadata.current() {
            apply_revision(&mut tags, revision);
        }
    }

    let format_metadata = handle.format.metadata();
    if let Some(revision) = format_metadata.current() {
        apply_revision(&mut tags, revision);
    }

    tags
}

fn apply_revision(tags: &mut TagInfo, revision: &MetadataRevision) {
    for tag in revision.tags() {
        let value = tag.value.to_string();
        if value.is_empty() {
            continue;
        }

        match tag.std_key {
            Some(StandardTagKey::TrackTitle) => fill(&mut tags.title, value),
            Some(StandardTagKey::Composer) => fill(&mut tags.author, value),
            Some(StandardTagKey::Artist) => fill(&mut tags.artist, value),
            Some(StandardTagKey::Copyright) => fill(&mut tags.copyright, value),
            Some(StandardTagKey::Comment) => fill(&mut tags.comment, value),
            Some(StandardTagKey::Album) => fill(&mut tags.album, value),
            Some(StandardTagKey::Date) => fill(&mut tags.date, value),
            Some(StandardTagKey::TrackNumber) => fill(&mut tags.track, value),
            Some(StandardTagKey::Genre) => fill(&mut tags.genre, value),
            // Fall back to raw key names for tag schemes Symphonia does not map.
            _ => match tag.key.to_ascii_lowercase().as_str() {
                "title" => fill(&mut tags.title, value),
                "author" => fill(&mut tags.author, value),
                "artist" => fill(&mut tags.artist, value),
                "copyright" => fill(&mut tags.copyright, value),
                "comment" => fill(&mut tags.comment, value),
                "album" => fill(&mut tags.album, value),
                "date" => fill(&mut tags.date, value),
                "track" => fill(&mut tags.track, value),
                "genre" => fill(&mut tags.genre, value),
                _ => {}
            },
        }
    }
}

fn fill(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Build the per-stream record from track parameters.
pub(crate) fn stream_info(track: &Track, channels: usize, file_size: Option<u64>) -> StreamInfo {
    let params = &track.codec_params;
    let sample_rate = params.sample_rate.unwrap_or(0);

    StreamInfo {
        codec_name: codec_name(track),
        channels,
        sample_rate,
        bit_rate: bit_rate(track, channels, file_size),
        bit_rate_tolerance: None,
        frame_size: params.max_frames_per_packet,
        min_quantizer: None,
        max_quantizer: None,
    }
}

/// The registry descriptor's long name for a track's codec, falling back to
/// the short name, then `"unknown"`.
fn codec_name(track: &Track) -> String {
    match symphonia::default::get_codecs().get_codec(track.codec_params.codec) {
        Some(descriptor) if !descriptor.long_name.is_empty() => descriptor.long_name.to_string(),
        Some(descriptor) if !descriptor.short_name.is_empty() => descriptor.short_name.to_string(),
        _ => String::from("unknown"),
    }
}

/// Bits per second for one stream.
///
/// Codecs that report a native sample width (PCM and the lossless family)
/// give `sample_rate × width × channels` exactly. Anything else falls back
/// to `file_size × 8 / duration` — a container-level estimate shared by all
/// streams — or reports absent when neither is known.
fn bit_rate(track: &Track, channels: usize, file_size: Option<u64>) -> Option<u64> {
    let params = &track.codec_params;

    if let (Some(width), Some(rate)) = (params.bits_per_sample, params.sample_rate) {
        return Some(u64::from(rate) * u64::from(width) * channels as u64);
    }

    let size = file_size?;
    let seconds = estimate::duration_seconds(params)?;
    if seconds <= 0.0 {
        return None;
    }
    Some(((size as f64) * 8.0 / seconds) as u64)
}

/// Container format name for the report.
///
/// Symphonia's probe does not reveal which demuxer matched, so this reuses
/// the probe hint: the lowercased path extension, or `"unknown"`.
pub(crate) fn container_name(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| String::from("unknown"))
}
