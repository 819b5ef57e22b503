//! rngfactory - Command Line Front End for RNG Resolution
//!
//! Resolves a random source from a kind name and parameter string, taken
//! from a TOML file, `RNG_*` environment variables and the command line (in
//! increasing precedence).
//!
//! # Commands
//!
//! - `rngfactory sample --count <n>` - Draw values from the shared generator
//! - `rngfactory plan` - Validate the configuration and print the source it selects
//! - `rngfactory kinds` - List the registered kinds and their parameters
//!
//! Configuration errors exit with status 2; other failures with status 1.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rng_factory::{CliOverrides, GlobalRng, RngSettings};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;

pub use error::{CliError, Result};

/// Configuration-driven random number generation
#[derive(Parser, Debug)]
#[command(name = "rngfactory")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// RNG kind, e.g. MTRNG or DeviceReaderRNG
    #[arg(short, long, global = true)]
    kind: Option<String>,

    /// Parameter string, e.g. "device=/dev/zero,discard=4"
    #[arg(short, long, global = true, allow_hyphen_values = true)]
    params: Option<String>,

    /// Seed used when the parameters name none
    #[arg(short, long, global = true, allow_hyphen_values = true)]
    seed: Option<i64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Draw values from the shared generator
    Sample {
        /// Number of values to draw
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "u32")]
        format: commands::sample::Format,
    },

    /// Validate the configuration and print the selected source
    Plan,

    /// List registered kinds and their parameters
    Kinds,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        CliOverrides {
            kind: cli.kind.clone(),
            params: cli.params.clone(),
            seed: cli.seed,
            log_level: cli.log_level.clone(),
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_settings(cli: &Cli) -> Result<RngSettings> {
    let mut settings = RngSettings::load(cli.config.as_deref())?;
    settings.merge_with_cli(&CliOverrides::from(cli))?;
    Ok(settings)
}

fn execute(cli: Cli, settings: RngSettings) -> Result<()> {
    let factory = rng_sources::standard_factory();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Sample { count, format } => {
            rng_factory::install(GlobalRng::new(factory, Arc::new(settings)))
                .map_err(|_| CliError::AlreadyInstalled)?;
            commands::sample::run(count, format, &mut out)?;
        }
        Commands::Plan => commands::plan::run(&factory, &settings, &mut out)?,
        Commands::Kinds => commands::kinds::run(&factory, &mut out)?,
    }
    out.flush().map_err(CliError::Output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{}", err.report());
            return ExitCode::from(err.exit_code());
        }
    };

    init_tracing(settings.log_level.as_filter_str());
    debug!(
        kind = ?settings.kind,
        params = ?settings.params,
        seed = ?settings.seed,
        log_level = %settings.log_level,
        "settings loaded"
    );

    match execute(cli, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = err.exit_code(), "{err}");
            eprintln!("{}", err.report());
            ExitCode::from(err.exit_code())
        }
    }
}
