//! Converter module for GPS data formats.
//!
//! This module provides the `Converter` trait and a gpsbabel-backed
//! implementation that streams bytes through the external executable:
//! input is fed to its stdin while its stdout is copied to the output.
//!
//! The executable is invoked as
//! `gpsbabel -i <source> -f /dev/stdin -o <destination> -F -`.
//! Its location defaults to `gpsbabel` on the `PATH`, can be set with the
//! `GPSBABEL_FILEPATH` environment variable, replaced process-wide with
//! [`set_executable_path`], or pinned per converter through
//! [`ConverterConfig::executable_path`].
//!
//! # Example
//!
//! ```ignore
//! use babelpipe_core::converter::{convert_to_gpx, ConverterError};
//!
//! let mut input = tokio::fs::File::open("track.csv").await?;
//! let mut output = Vec::new();
//!
//! match convert_to_gpx("v900", &mut input, &mut output).await {
//!     Ok(report) => println!("{} bytes of GPX", report.bytes_out),
//!     Err(ConverterError::ConversionFailed { stderr, .. }) => eprintln!("{}", stderr),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

mod config;
mod error;
mod gpsbabel;
mod location;
mod pipe;
mod traits;
mod types;

use tokio::io::{AsyncRead, AsyncWrite};

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use gpsbabel::GpsBabelConverter;
pub use location::{executable_path, set_executable_path, DEFAULT_EXECUTABLE, EXECUTABLE_ENV_VAR};
pub use traits::Converter;
pub use types::{ConversionReport, FormatPair, StreamDirection, FORMAT_GPX};

/// Converts `input` from `source` to `destination` with default configuration.
pub async fn convert<R, W>(
    source: &str,
    destination: &str,
    input: &mut R,
    output: &mut W,
) -> Result<ConversionReport, ConverterError>
where
    R: AsyncRead + Unpin + Send + ?Sized,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    GpsBabelConverter::new(source, destination)
        .convert(input, output)
        .await
}

/// Converts `input` from `source` to GPX with default configuration.
pub async fn convert_to_gpx<R, W>(
    source: &str,
    input: &mut R,
    output: &mut W,
) -> Result<ConversionReport, ConverterError>
where
    R: AsyncRead + Unpin + Send + ?Sized,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    convert(source, FORMAT_GPX, input, output).await
}
