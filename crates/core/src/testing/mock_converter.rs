//! Mock converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::RwLock;

use crate::converter::{ConversionReport, Converter, ConverterError, FormatPair, StreamDirection};

/// A recorded conversion for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// Formats requested.
    pub formats: FormatPair,
    /// Bytes the caller supplied as input.
    pub input: Vec<u8>,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversions for assertions
/// - Echo input back or return canned output
/// - Simulate failures and slow conversions
///
/// # Example
///
/// ```rust,ignore
/// use babelpipe_core::testing::MockConverter;
///
/// let converter = MockConverter::new(FormatPair::to_gpx("v900"));
/// converter.set_output(b"<gpx/>".to_vec()).await;
///
/// let report = converter.convert(&mut input, &mut output).await?;
///
/// assert_eq!(converter.conversion_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    formats: FormatPair,
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// Output returned by every conversion; `None` echoes the input.
    output: Arc<RwLock<Option<Vec<u8>>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Simulated conversion duration.
    conversion_duration: Arc<RwLock<Duration>>,
}

impl MockConverter {
    /// Create a new mock converter that echoes its input.
    pub fn new(formats: FormatPair) -> Self {
        Self {
            formats,
            conversions: Arc::new(RwLock::new(Vec::new())),
            output: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
            conversion_duration: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Clear recorded conversions.
    pub async fn clear_recorded(&self) {
        self.conversions.write().await.clear();
    }

    /// Get the number of conversions performed.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Return `output` from every following conversion.
    pub async fn set_output(&self, output: Vec<u8>) {
        *self.output.write().await = Some(output);
    }

    /// Go back to echoing the input.
    pub async fn clear_output(&self) {
        *self.output.write().await = None;
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_duration(&self, duration: Duration) {
        *self.conversion_duration.write().await = duration;
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<ConverterError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
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
        input
            .read_to_end(&mut data)
            .await
            .map_err(|e| ConverterError::stream(StreamDirection::Input, e))?;

        if let Some(err) = self.take_error().await {
            self.conversions.write().await.push(RecordedConversion {
                formats: self.formats.clone(),
                input: data,
                success: false,
            });
            return Err(err);
        }

        let duration = *self.conversion_duration.read().await;
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }

        let produced = self
            .output
            .read()
            .await
            .clone()
            .unwrap_or_else(|| data.clone());
        output
            .write_all(&produced)
            .await
            .map_err(|e| ConverterError::stream(StreamDirection::Output, e))?;
        output
            .flush()
            .await
            .map_err(|e| ConverterError::stream(StreamDirection::Output, e))?;

        let bytes_in = data.len() as u64;
        self.conversions.write().await.push(RecordedConversion {
            formats: self.formats.clone(),
            input: data,
            success: true,
        });

        Ok(ConversionReport {
            formats: self.formats.clone(),
            bytes_in,
            bytes_out: produced.len() as u64,
            duration_ms: duration.as_millis() as u64,
            warnings: None,
        })
    }

    async fn validate(&self) -> Result<String, ConverterError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok("mock converter".to_string())
    }
}
