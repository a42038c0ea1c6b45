//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::{FormatPair, StreamDirection};

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The executable could not be found or started.
    #[error("Failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The executable ran and exited unsuccessfully.
    #[error("Conversion {formats} failed ({}): {}", describe_exit(.exit_code), .stderr.trim())]
    ConversionFailed {
        formats: FormatPair,
        /// `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
        stderr: String,
    },

    /// A caller-supplied stream failed while bytes were being transferred.
    #[error("Stream error while {direction}: {source}")]
    Stream {
        direction: StreamDirection,
        #[source]
        source: std::io::Error,
    },

    /// Conversion timed out.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Conversion was cancelled by the caller.
    #[error("Conversion cancelled")]
    Cancelled,

    /// I/O error on the process pipes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl ConverterError {
    /// Creates a new launch error.
    pub fn launch(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }

    /// Creates a new conversion failed error with the captured stderr.
    pub fn conversion_failed(
        formats: FormatPair,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ConversionFailed {
            formats,
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new stream error.
    pub fn stream(direction: StreamDirection, source: std::io::Error) -> Self {
        Self::Stream { direction, source }
    }

    /// Diagnostics written by the executable, if it ran and failed.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ConversionFailed { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Only a hint for callers: the converter itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Stream { .. } | Self::Io(_))
    }

    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "launch_failed",
            Self::ConversionFailed { .. } => "conversion_failed",
            Self::Stream { .. } => "stream_error",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::Io(_) => "io_error",
        }
    }
}
