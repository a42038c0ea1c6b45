//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::location;

/// Configuration for the gpsbabel-based converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to the gpsbabel binary.
    ///
    /// When unset, the process-wide location is used (see
    /// [`set_executable_path`](super::set_executable_path)).
    #[serde(default)]
    pub executable_path: Option<PathBuf>,

    /// Timeout for a single conversion in seconds. Unset means no limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Maximum number of stderr bytes kept for diagnostics.
    #[serde(default = "default_max_stderr_bytes")]
    pub max_stderr_bytes: usize,
}

fn default_max_stderr_bytes() -> usize {
    64 * 1024
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            executable_path: None,
            timeout_secs: None,
            max_stderr_bytes: default_max_stderr_bytes(),
        }
    }
}

impl ConverterConfig {
    /// Creates a config pinned to a specific executable.
    pub fn with_executable(executable_path: impl Into<PathBuf>) -> Self {
        Self {
            executable_path: Some(executable_path.into()),
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Sets the stderr capture limit.
    pub fn with_max_stderr_bytes(mut self, max: usize) -> Self {
        self.max_stderr_bytes = max;
        self
    }

    /// Executable used by the next conversion.
    pub fn resolve_executable(&self) -> PathBuf {
        self.executable_path
            .clone()
            .unwrap_or_else(location::executable_path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
