//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Format tag of the canonical interchange format.
pub const FORMAT_GPX: &str = "gpx";

/// Source and destination format tags of a conversion.
///
/// Tags are opaque to this crate and only interpreted by gpsbabel, so
/// an unknown tag is reported by the executable at conversion time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatPair {
    /// Format of the bytes read from the input stream (e.g. "v900").
    pub source: String,
    /// Format of the bytes written to the output stream (e.g. "gpx").
    pub destination: String,
}

impl FormatPair {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Pair converting `source` into GPX.
    pub fn to_gpx(source: impl Into<String>) -> Self {
        Self::new(source, FORMAT_GPX)
    }
}

impl fmt::Display for FormatPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Direction of a caller-supplied stream that failed during a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamDirection {
    /// Reading from the caller's input stream.
    Input,
    /// Writing to the caller's output stream.
    Output,
}

impl fmt::Display for StreamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("reading input"),
            Self::Output => f.write_str("writing output"),
        }
    }
}

/// Summary of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Formats used.
    pub formats: FormatPair,
    /// Bytes read from the input stream and fed to the executable.
    pub bytes_in: u64,
    /// Bytes written to the output stream.
    pub bytes_out: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Anything the executable wrote to stderr despite succeeding (warnings).
    pub warnings: Option<String>,
}
