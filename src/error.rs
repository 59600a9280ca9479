use std::path::PathBuf;

use thiserror::Error;

/// Audioread's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Audioread's crate-wide error type.
///
/// Every variant is fatal: the call that produced it returns nothing, and all
/// resources acquired up to that point (open container, constructed decoders)
/// have already been dropped by the time the error reaches the caller.
///
/// Per-packet decode failures are deliberately *not* represented here — they
/// are recoverable, yield an empty decoded run, and never abort a read.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller supplied an argument the call boundary rejects before any
    /// file is opened (e.g. a zero sample ceiling, conflicting modes).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input could not be read or its container format was not
    /// recognized by the probe.
    #[error("failed to open '{path}' as a media container")]
    Open {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The container opened, but stream metadata required for decoding
    /// (sample rate or channel map) could not be resolved.
    #[error("stream {stream} is missing required metadata: {detail}")]
    StreamInfo { stream: usize, detail: String },

    /// The container holds no audio streams at all.
    #[error("no audio stream found")]
    NoAudioStream,

    /// No decoder exists for one stream's codec.
    #[error("no decoder available for the codec of stream {stream}")]
    UnsupportedCodec { stream: usize },

    /// A decoder for one stream's codec exists but failed to initialize.
    #[error("failed to initialize the decoder for stream {stream}")]
    DecoderInit {
        stream: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn open(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Open {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn stream_info(stream: usize, detail: impl Into<String>) -> Self {
        Self::StreamInfo {
            stream,
            detail: detail.into(),
        }
    }

    pub(crate) fn decoder_init(
        stream: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DecoderInit {
            stream,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_the_path() {
        let err = Error::open("/tmp/missing.ogg", std::io::Error::other("gone"));
        assert!(err.to_string().contains("/tmp/missing.ogg"));
    }

    #[test]
    fn per_stream_errors_name_the_stream() {
        assert!(
            Error::UnsupportedCodec { stream: 2 }
                .to_string()
                .contains("stream 2")
        );
        assert!(
            Error::decoder_init(1, std::io::Error::other("bad extradata"))
                .to_string()
                .contains("stream 1")
        );
    }
}
