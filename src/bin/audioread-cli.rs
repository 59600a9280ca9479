use anyhow::{Context, Result};
use clap::Parser;

use std::io::{self, BufWriter, Write};

use audioread::logging;
use audioread::reader;

fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();
    let request = validate(&params).map_err(audioread::error::Error::InvalidArgument)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    match request {
        Request::Size => {
            let estimate = reader::read_size(&params.input_path)?;
            let row = estimate.as_row();
            serde_json::to_writer(&mut writer, &serde_json::json!({ "size": row }))?;
        }
        Request::Samples { limit, outputs } => {
            let reading = reader::read(&params.input_path, limit)?;

            let mut out = serde_json::json!({ "samples": reading.tensor });
            if outputs >= 3 {
                out["sample_rates"] = serde_json::json!(reading.sample_rates);
                out["normalized_bit_rates"] = serde_json::json!(reading.normalized_bit_rates);
            }
            if outputs == 4 {
                out["info"] = serde_json::to_value(&reading.info)?;
            }
            serde_json::to_writer(&mut writer, &out)?;
        }
    }

    writeln!(writer)?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "audioread")]
#[command(about = "Decode container audio into a normalized sample tensor")]
struct Params {
    /// Input media file.
    #[arg(short = 'i', long = "input")]
    pub input_path: String,

    /// Decode at most this many samples per channel, per stream.
    #[arg(short = 'n', long = "samples")]
    pub samples: Option<u64>,

    /// Report the estimated result extents without decoding any audio.
    #[arg(long = "size", default_value_t = false)]
    pub size: bool,

    /// Number of result positions to emit: 1 (tensor), 3 (plus rate
    /// vectors), or 4 (plus the metadata record).
    #[arg(short = 'o', long = "outputs", default_value_t = 1)]
    pub outputs: u8,
}

/// What the caller asked for, after the argument combination checks.
#[derive(Debug, PartialEq, Eq)]
enum Request {
    Size,
    Samples { limit: Option<u64>, outputs: u8 },
}

/// Reject invalid argument combinations before any file is opened.
fn validate(params: &Params) -> std::result::Result<Request, String> {
    if params.size && params.samples.is_some() {
        return Err(String::from(
            "--size and --samples are mutually exclusive",
        ));
    }
    if params.samples == Some(0) {
        return Err(String::from("--samples must be a positive integer"));
    }
    if !matches!(params.outputs, 1 | 3 | 4) {
        return Err(String::from("--outputs must be 1, 3 or 4"));
    }
    if params.size && params.outputs != 1 {
        return Err(String::from(
            "only one output position is available with --size",
        ));
    }

    if params.size {
        Ok(Request::Size)
    } else {
        Ok(Request::Samples {
            limit: params.samples,
            outputs: params.outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(samples: Option<u64>, size: bool, outputs: u8) -> Params {
        Params {
            input_path: String::from("in.wav"),
            samples,
            size,
            outputs,
        }
    }

    #[test]
    fn full_and_size_modes_validate() {
        assert_eq!(
            validate(&params(None, false, 1)),
            Ok(Request::Samples {
                limit: None,
                outputs: 1
            })
        );
        assert_eq!(
            validate(&params(Some(500), false, 4)),
            Ok(Request::Samples {
                limit: Some(500),
                outputs: 4
            })
        );
        assert_eq!(validate(&params(None, true, 1)), Ok(Request::Size));
    }

    #[test]
    fn conflicting_or_malformed_arguments_are_rejected() {
        assert!(validate(&params(Some(10), true, 1)).is_err());
        assert!(validate(&params(Some(0), false, 1)).is_err());
        assert!(validate(&params(None, false, 2)).is_err());
        assert!(validate(&params(None, true, 3)).is_err());
    }
}
