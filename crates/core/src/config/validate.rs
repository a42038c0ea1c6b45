use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Executable path, when given, is not empty
/// - Timeout, when given, is not 0
/// - Stderr capture limit is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let converter = &config.converter;

    if let Some(path) = &converter.executable_path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "converter.executable_path cannot be empty".to_string(),
            ));
        }
    }

    if converter.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "converter.timeout_secs cannot be 0; omit it to disable the timeout".to_string(),
        ));
    }

    if converter.max_stderr_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "converter.max_stderr_bytes cannot be 0".to_string(),
        ));
    }

    Ok(())
}
