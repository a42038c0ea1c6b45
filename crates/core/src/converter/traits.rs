//! Trait definitions for the converter module.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use super::error::ConverterError;
use super::types::{ConversionReport, FormatPair};

/// A converter that transforms a byte stream between two formats.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Formats this converter reads and writes.
    fn formats(&self) -> &FormatPair;

    /// Streams `input` through the conversion into `output`.
    ///
    /// On error, whatever was already written to `output` must be discarded.
    async fn convert(
        &self,
        input: &mut (dyn AsyncRead + Unpin + Send),
        output: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<ConversionReport, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    ///
    /// Returns a human-readable version string of the backend.
    async fn validate(&self) -> Result<String, ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    struct UppercaseConverter {
        formats: FormatPair,
    }

    #[async_trait]
    impl Converter for UppercaseConverter {
        fn name(&self) -> &str {
            "uppercase"
        }

        fn formats(&self) -> &FormatPair {
            &self.formats
        }

        async fn convert(
            &self,
            input: &mut (dyn AsyncRead + Unpin + Send),
            output: &mut (dyn AsyncWrite + Unpin + Send),
        ) -> Result<ConversionReport, ConverterError> {
            let mut data = Vec::new();
            input.read_to_end(&mut data).await?;
            let upper = data.to_ascii_uppercase();
            output.write_all(&upper).await?;
            Ok(ConversionReport {
                formats: self.formats.clone(),
                bytes_in: data.len() as u64,
                bytes_out: upper.len() as u64,
                duration_ms: 0,
                warnings: None,
            })
        }

        async fn validate(&self) -> Result<String, ConverterError> {
            Ok("uppercase 1.0".to_string())
        }
    }

    #[tokio::test]
    async fn test_trait_object_convert() {
        let converter: Box<dyn Converter> = Box::new(UppercaseConverter {
            formats: FormatPair::new("lower", "upper"),
        });
        let mut input: &[u8] = b"lisbon";
        let mut output = Vec::new();

        let report = converter.convert(&mut input, &mut output).await.unwrap();

        assert_eq!(output, b"LISBON");
        assert_eq!(report.bytes_in, 6);
        assert_eq!(converter.name(), "uppercase");
        assert_eq!(converter.formats().destination, "upper");
    }
}
