//! gpsbabel-based converter implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::pipe::{collect_diagnostics, pump, PumpError};
use super::traits::Converter;
use super::types::{ConversionReport, FormatPair, StreamDirection};
use crate::metrics;

/// Input path handed to gpsbabel; the data arrives on its stdin.
const STDIN_PATH: &str = "/dev/stdin";

/// Output path telling gpsbabel to write to its stdout.
const STDOUT_PATH: &str = "-";

/// Converter that pipes a byte stream through the gpsbabel executable.
///
/// One process is spawned per [`convert`](GpsBabelConverter::convert) call
/// and the call returns only once that process has exited.
#[derive(Debug, Clone)]
pub struct GpsBabelConverter {
    formats: FormatPair,
    config: ConverterConfig,
    cancel: Option<CancellationToken>,
}

/// Why a running conversion was stopped before the process exited.
enum Interruption {
    Cancelled,
    TimedOut(Duration),
}

impl GpsBabelConverter {
    /// Creates a converter from `source` to `destination` with default configuration.
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self::with_config(FormatPair::new(source, destination), ConverterConfig::default())
    }

    /// Creates a converter with an explicit configuration.
    pub fn with_config(formats: FormatPair, config: ConverterConfig) -> Self {
        Self {
            formats,
            config,
            cancel: None,
        }
    }

    /// Kills the process and returns [`ConverterError::Cancelled`] once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Builds gpsbabel arguments for a stdin-to-stdout conversion.
    fn build_args(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.formats.source.clone(),
            "-f".to_string(),
            STDIN_PATH.to_string(),
            "-o".to_string(),
            self.formats.destination.clone(),
            "-F".to_string(),
            STDOUT_PATH.to_string(),
        ]
    }

    fn command_line(program: &Path, args: &[String]) -> String {
        let mut line = program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Resolves once the caller cancels or the configured timeout expires.
    async fn interruption(&self) -> Interruption {
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.config.timeout() {
                Some(limit) => {
                    tokio::time::sleep(limit).await;
                    limit
                }
                None => std::future::pending::<Duration>().await,
            }
        };

        tokio::select! {
            _ = cancelled => Interruption::Cancelled,
            limit = expired => Interruption::TimedOut(limit),
        }
    }

    /// Runs one gpsbabel process, streaming `input` in and its stdout out.
    async fn run_conversion<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<ConversionReport, ConverterError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let start = Instant::now();
        let program = self.config.resolve_executable();
        let args = self.build_args();

        debug!("Running {}", Self::command_line(&program, &args));

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ConverterError::launch(&program, e))?;

        let (mut stdin, mut stdout, mut stderr) =
            match (child.stdin.take(), child.stdout.take(), child.stderr.take()) {
                (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
                _ => {
                    let _ = child.kill().await;
                    return Err(ConverterError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "gpsbabel pipes were not captured",
                    )));
                }
            };

        let max_stderr_bytes = self.config.max_stderr_bytes;
        let mut bytes_in = 0u64;
        let mut bytes_out = 0u64;
        let outcome = {
            let transfer = async {
                let feed = async {
                    let fed = pump(input, &mut stdin, &mut bytes_in).await;
                    // EOF for gpsbabel
                    drop(stdin);
                    fed
                };
                let drain = async {
                    let drained = pump(&mut stdout, output, &mut bytes_out).await;
                    if drained.is_err() {
                        // gpsbabel must not block on a full stdout pipe
                        let _ = tokio::io::copy(&mut stdout, &mut tokio::io::sink()).await;
                    }
                    drained
                };
                let diagnostics = collect_diagnostics(&mut stderr, max_stderr_bytes);
                let process = async {
                    let (drained, diagnostics) = tokio::join!(drain, diagnostics);
                    let status = child.wait().await;
                    (drained, diagnostics, status)
                };
                tokio::pin!(feed);
                tokio::pin!(process);

                // Feeding stops once gpsbabel has exited, even if the input never ends
                let mut fed = None;
                loop {
                    tokio::select! {
                        result = &mut feed, if fed.is_none() => fed = Some(result),
                        (drained, diagnostics, status) = &mut process => {
                            break (fed, drained, diagnostics, status);
                        }
                    }
                }
            };

            tokio::select! {
                finished = transfer => Ok(finished),
                interruption = self.interruption() => Err(interruption),
            }
        };

        let (fed, drained, diagnostics, status) = match outcome {
            Ok(finished) => finished,
            Err(interruption) => {
                let _ = child.kill().await;
                return Err(self.interrupted(interruption));
            }
        };

        let status = status?;
        let stderr_text = diagnostics?;
        self.classify_feed(fed)?;
        match drained {
            Ok(()) => {}
            Err(PumpError::Write(e)) => {
                return Err(ConverterError::stream(StreamDirection::Output, e))
            }
            Err(PumpError::Read(e)) => return Err(ConverterError::Io(e)),
        }

        self.check_status(status, stderr_text.clone())?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Converted {} ({} bytes in, {} bytes out) in {} ms",
            self.formats, bytes_in, bytes_out, duration_ms
        );

        Ok(ConversionReport {
            formats: self.formats.clone(),
            bytes_in,
            bytes_out,
            duration_ms,
            warnings: if stderr_text.trim().is_empty() {
                None
            } else {
                Some(stderr_text)
            },
        })
    }

    /// Maps a cancellation or timeout to its error, logging it.
    fn interrupted(&self, interruption: Interruption) -> ConverterError {
        match interruption {
            Interruption::Cancelled => {
                info!("Conversion {} cancelled", self.formats);
                ConverterError::Cancelled
            }
            Interruption::TimedOut(limit) => {
                warn!("Conversion {} timed out after {:?}", self.formats, limit);
                ConverterError::Timeout {
                    timeout_secs: limit.as_secs(),
                }
            }
        }
    }

    /// Maps the stdin pump result to a caller stream error, if any.
    ///
    /// gpsbabel may exit before consuming all of its input; the resulting
    /// broken pipe or abandoned feed is not an error, the exit status decides.
    fn classify_feed(&self, fed: Option<Result<(), PumpError>>) -> Result<(), ConverterError> {
        match fed {
            Some(Ok(())) => Ok(()),
            Some(Err(PumpError::Read(e))) => {
                Err(ConverterError::stream(StreamDirection::Input, e))
            }
            Some(Err(PumpError::Write(e))) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("gpsbabel closed its input early");
                Ok(())
            }
            Some(Err(PumpError::Write(e))) => Err(ConverterError::Io(e)),
            None => {
                debug!("gpsbabel exited before the input ended");
                Ok(())
            }
        }
    }

    fn check_status(&self, status: ExitStatus, stderr: String) -> Result<(), ConverterError> {
        if status.success() {
            return Ok(());
        }

        warn!(
            "gpsbabel failed converting {} ({:?}):\n{}",
            self.formats,
            status.code(),
            stderr.trim_end()
        );
        Err(ConverterError::conversion_failed(
            self.formats.clone(),
            status.code(),
            stderr,
        ))
    }

    /// Streams `input` (in the source format) into `output` (in the destination format).
    ///
    /// No timeout applies unless configured; the returned future completes
    /// only after gpsbabel has exited. Dropping it kills the process.
    pub async fn convert<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<ConversionReport, ConverterError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let start = Instant::now();
        let result = self.run_conversion(input, output).await;
        metrics::record_conversion(&result, start.elapsed());
        result
    }
}

#[async_trait]
impl Converter for GpsBabelConverter {
    fn name(&self) -> &str {
        "gpsbabel"
    }

    fn formats(&self) -> &FormatPair {
        &self.formats
    }

    async fn convert(
        &self,
        input: &mut (dyn AsyncRead + Unpin + Send),
        output: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<ConversionReport, ConverterError> {
        GpsBabelConverter::convert(self, input, output).await
    }

    async fn validate(&self) -> Result<String, ConverterError> {
        let program = self.config.resolve_executable();
        let version_check = Command::new(&program)
            .arg("-V")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            output = version_check => output.map_err(|e| ConverterError::launch(&program, e))?,
            interruption = self.interruption() => return Err(self.interrupted(interruption)),
        };

        if !output.status.success() {
            return Err(ConverterError::conversion_failed(
                self.formats.clone(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Found {}", version);
        Ok(version)
    }
}
