//! rulesctl - inspect and validate clwabot rules

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, LoggingConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rulesctl")]
#[command(about = "Load, validate and query clwabot rules")]
#[command(version)]
struct Cli {
    /// Rules file (YAML); the built-in rules are used when omitted
    #[arg(long, short, global = true, env = "CLWABOT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the rules and report warnings
    Check,
    /// Print the loaded rules
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Print the value at a dotted path, e.g. external.meeting.graceSeconds
    Get {
        path: String,
    },
    /// Write an example rules file
    Init {
        path: PathBuf,
    },
    /// Show how the rules treat a sender and message
    Classify {
        #[arg(long)]
        msisdn: String,
        #[arg(long)]
        text: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    // Load .env file if it exists
    let dotenv_result = dotenv::dotenv();

    let cli = Cli::parse();

    // rules are only loaded for the subcommands that read them
    let rules = || -> Result<Config> {
        let config = commands::load(cli.config.as_deref())?;
        init_logging(&config.logging, &dotenv_result)?;
        commands::log_warnings(&config);
        match &cli.config {
            Some(path) => info!("Rules loaded from: {}", path.display()),
            None => info!("Using built-in rules"),
        }
        Ok(config)
    };

    let output = match cli.command {
        Commands::Init { path } => {
            init_logging(&LoggingConfig::default(), &dotenv_result)?;
            commands::init(&path)?;
            format!("Wrote example rules to {}", path.display())
        }
        Commands::Check => {
            let report = commands::check(&rules()?);
            let mut lines = vec![report.summary()];
            lines.extend(
                report
                    .warnings
                    .iter()
                    .map(|issue| format!("warning: {}: {}", issue.field, issue.message)),
            );
            lines.join("\n")
        }
        Commands::Show { format } => commands::show(&rules()?, format)?,
        Commands::Get { path } => commands::get(&rules()?, &path)?,
        Commands::Classify { msisdn, text } => commands::classify(&rules()?, &msisdn, &text)?,
    };

    println!("{}", output);
    Ok(())
}

/// Initialize logging from the rules' logging section; `RUST_LOG` wins when set
fn init_logging(logging: &LoggingConfig, dotenv_result: &dotenv::Result<PathBuf>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout carries command output, logs go to stderr
    match logging.format.as_str() {
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
    }

    if let Some(warning) = commands::env_file_warning(dotenv_result) {
        warn!("{}", warning);
    }

    if logging.level == "trace" || logging.level == "debug" {
        warn!("Debug/trace logging enabled, phone numbers are masked but message text is not");
    }

    Ok(())
}
