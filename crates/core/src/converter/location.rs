//! Process-wide location of the gpsbabel executable.
//!
//! The location is resolved once from `GPSBABEL_FILEPATH` on first use and
//! can be replaced with [`set_executable_path`]. Configure it before starting
//! conversions; calls already in flight keep the path they resolved.

use once_cell::sync::Lazy;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Command name used when nothing else is configured.
pub const DEFAULT_EXECUTABLE: &str = "gpsbabel";

/// Environment variable overriding [`DEFAULT_EXECUTABLE`].
pub const EXECUTABLE_ENV_VAR: &str = "GPSBABEL_FILEPATH";

static EXECUTABLE_PATH: Lazy<RwLock<PathBuf>> =
    Lazy::new(|| RwLock::new(path_from_env(std::env::var_os(EXECUTABLE_ENV_VAR))));

fn path_from_env(value: Option<OsString>) -> PathBuf {
    match value {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_EXECUTABLE),
    }
}

/// Replaces the process-wide executable path. Last write wins.
pub fn set_executable_path(path: impl Into<PathBuf>) {
    let path = path.into();
    debug!("gpsbabel executable set to {:?}", path);
    *EXECUTABLE_PATH
        .write()
        .unwrap_or_else(PoisonError::into_inner) = path;
}

/// Current process-wide executable path.
pub fn executable_path() -> PathBuf {
    EXECUTABLE_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
