//! Bastion TD - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use td_core::data::GameConfig;
use td_tools::headless::{run_game, SimulateOptions, TowerPlacement};
use td_tools::validate::{load_config, validate_path};
use td_tools::ToolError;

#[derive(Parser)]
#[command(name = "td-tools")]
#[command(about = "Development tools for Bastion TD")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a game config file, or every .ron file in a directory
    Validate {
        /// Path to a data file or directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },

    /// Run a game headlessly and print a summary
    Simulate {
        /// Game config file (built-in defaults if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many waves are cleared
        #[arg(short, long)]
        waves: Option<u32>,

        /// Seconds of game time per tick
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,

        /// Tick limit
        #[arg(long, default_value_t = 216_000)]
        max_ticks: u64,

        /// Spawn shuffle seed (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Tower to build before the first wave, as KIND@X,Y (repeatable)
        #[arg(short, long = "tower")]
        towers: Vec<TowerPlacement>,

        /// Snap tower positions to the placement grid
        #[arg(long)]
        snap: bool,

        /// Include the final world snapshot in JSON output
        #[arg(long)]
        snapshot: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the built-in game config as RON
    DumpDefault,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries summaries and data.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), ToolError> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            let files = validate_path(&path)?.into_result()?;
            tracing::info!(files, "Validation passed");
        }
        Commands::Simulate {
            config,
            waves,
            dt,
            max_ticks,
            seed,
            towers,
            snap,
            snapshot,
            json,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => GameConfig::default(),
            };
            let options = SimulateOptions {
                waves,
                step: SimulateOptions::step_from_secs(dt)?,
                max_ticks,
                seed,
                towers,
                snap,
                snapshot,
            };

            let summary = run_game(config, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
            }
        }
        Commands::DumpDefault => {
            println!("{}", GameConfig::default().to_ron_string()?);
        }
    }
    Ok(())
}
