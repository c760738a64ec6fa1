use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

use convoscope_config::config::{Config, ConfigLoader, ExportFormat};
use convoscope_config::source::{EnvSource, FileSource, LayeredSource, RetryPolicy, duration};

#[derive(Debug, Parser)]
#[command(name = "convoscope-config", version, about = "Load and validate server configuration")]
struct Cli {
    /// YAML or JSON file read before the environment; environment variables win.
    #[arg(long, env = "CONVOSCOPE_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Prefix of configuration environment variables.
    #[arg(long, default_value = EnvSource::DEFAULT_PREFIX, value_parser = EnvSource::parse_prefix)]
    env_prefix: String,

    /// Deployment environment to select: production, dev, dev2, mit or local.
    #[arg(long)]
    environment: Option<String>,

    /// Attempts for transient source failures.
    #[arg(long, default_value_t = 3)]
    fetch_attempts: u32,

    /// Delay before the first retry, e.g. "250ms".
    #[arg(long, default_value = "100ms", value_parser = duration::parse_duration)]
    fetch_backoff: Duration,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate, then exit.
    Check,
    /// Print a redacted summary.
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Print the configuration in a source format.
    Export {
        /// yaml, json or dotenv.
        #[arg(long, default_value = "yaml")]
        format: ExportFormat,
        /// Write secret values instead of masking them.
        #[arg(long)]
        reveal_secrets: bool,
    },
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // Logs go to stderr so `show` and `export` output stays clean
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(Some(&cli.log_level));

    let env = EnvSource::new(cli.env_prefix.clone());
    let mut source = LayeredSource::new();
    if let Some(path) = &cli.config {
        source = source.layer(FileSource::new(path));
    }
    source = source.layer(env.clone());

    let policy = RetryPolicy {
        max_attempts: cli.fetch_attempts,
        initial_delay: cli.fetch_backoff,
        ..RetryPolicy::default()
    };

    let mut loader = ConfigLoader::new(&source).retry(policy);
    if let Some(environment) = &cli.environment {
        loader = loader.set("environment", environment.as_str());
    }

    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration rejected");
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli.command, &config, &env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Command, config: &Config, env: &EnvSource) -> Result<(), String> {
    match command {
        Command::Check => {
            info!("configuration is valid");
            Ok(())
        }
        Command::Show { json } => {
            let summary = config.summary();
            if *json {
                let out = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
                println!("{out}");
            } else {
                println!("{summary}");
            }
            Ok(())
        }
        Command::Export {
            format,
            reveal_secrets,
        } => {
            let pairs = if *reveal_secrets {
                config.to_pairs()
            } else {
                config.to_redacted_pairs()
            };
            let out = format.render(&pairs, env).map_err(|e| e.to_string())?;
            print!("{out}");
            Ok(())
        }
    }
}
