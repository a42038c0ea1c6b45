pub mod config;
pub mod converter;
pub mod metrics;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_env_config, validate_config, Config, ConfigError,
    LoggingConfig,
};
pub use converter::{
    convert, convert_to_gpx, set_executable_path, ConversionReport, Converter, ConverterConfig,
    ConverterError, FormatPair, GpsBabelConverter, StreamDirection, FORMAT_GPX,
};
