mod metrics;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use babelpipe_core::{
    load_config, load_env_config, validate_config, Config, Converter, FormatPair,
    GpsBabelConverter, LoggingConfig, FORMAT_GPX,
};

/// Environment variable naming the configuration file
const CONFIG_ENV_VAR: &str = "BABELPIPE_CONFIG";

/// Convert GPS data by streaming it through gpsbabel.
///
/// Reads the input format from stdin (or --input) and writes the output
/// format to stdout (or --output). Logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "babelpipe", version)]
struct Args {
    /// gpsbabel format tag of the input, e.g. "v900"
    #[arg(short = 'i', long = "from")]
    from: String,

    /// gpsbabel format tag of the output
    #[arg(short = 'o', long = "to", default_value = FORMAT_GPX)]
    to: String,

    /// Read from this file instead of stdin
    #[arg(short = 'f', long)]
    input: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(short = 'F', long)]
    output: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path of the gpsbabel executable
    #[arg(long)]
    gpsbabel: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("babelpipe: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    let print_metrics = args.print_metrics;
    let result = run(args, config).await;

    if print_metrics {
        eprint!("{}", metrics::encode_metrics());
    }

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };

    // Exit without waiting for a stdin read still parked on a blocking thread
    std::process::exit(code);
}

/// Loads configuration, applies command-line overrides and validates the result.
fn resolve_config(args: &Args) -> Result<Config> {
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    let mut config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => load_env_config().context("Failed to load config from environment")?,
    };

    apply_overrides(&mut config, args);
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(path) = &args.gpsbabel {
        config.converter.executable_path = Some(path.clone());
    }
    if let Some(timeout) = args.timeout {
        config.converter.timeout_secs = Some(timeout);
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.filter.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries converted data
    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(args: Args, config: Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let converter = GpsBabelConverter::with_config(
        FormatPair::new(args.from.as_str(), args.to.as_str()),
        config.converter,
    )
    .with_cancellation(cancel.clone());

    info!(
        "Converting {} with {:?}",
        converter.formats(),
        converter.config().resolve_executable()
    );

    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Interrupted, stopping gpsbabel");
        cancel.cancel();
    });

    let mut input = open_input(args.input.as_deref()).await?;
    let mut output = open_output(args.output.as_deref()).await?;

    let result = converter.convert(&mut input, &mut output).await;
    drop(output);

    match result {
        Ok(report) => {
            if let Some(warnings) = &report.warnings {
                warn!("gpsbabel reported:\n{}", warnings.trim_end());
            }
            info!(
                "Done: {} bytes in, {} bytes out, {} ms",
                report.bytes_in, report.bytes_out, report.duration_ms
            );
            Ok(())
        }
        Err(e) => {
            // Partial output is never valid
            if let Some(path) = &args.output {
                if let Err(remove_err) = tokio::fs::remove_file(path).await {
                    warn!("Failed to remove partial output {:?}: {}", path, remove_err);
                }
            }
            Err(e).with_context(|| format!("Failed to convert {}", converter.formats()))
        }
    }
}

async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open input {:?}", path))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}

async fn open_output(path: Option<&Path>) -> Result<Box<dyn AsyncWrite + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .await
                .with_context(|| format!("Failed to create output {:?}", path))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
