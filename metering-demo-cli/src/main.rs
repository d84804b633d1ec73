//! Metering Demo CLI
//!
//! Command-line interface for trying out publisher metering: PPIDs, the
//! metering state, the paywall and the reset flow, plus the lint task for
//! the demo's JavaScript sources.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use metering_demo_core::DemoConfig;

mod commands;
mod session;
mod terminal;
mod ui;

#[derive(Parser)]
#[command(name = "metering-demo")]
#[command(about = "Metering Demo CLI - Try out publisher metering state and paywalls", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Custom storage directory
    #[arg(long, global = true, env = "METERING_DEMO_DIR")]
    storage_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored PPID, creating one if needed
    Ppid,

    /// Generate PPIDs without storing them
    NewPpid {
        /// How many to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Fetch the metering state
    State {
        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show everything the demo stores locally
    Status,

    /// Simulate signing in through the registration wall
    Register {
        /// Name used for the greeting
        #[arg(short, long)]
        username: Option<String>,

        /// Registration time, stored as given (defaults to now, in Unix seconds)
        #[arg(short, long)]
        timestamp: Option<String>,
    },

    /// Open the paywall
    Paywall,

    /// Clear demo state, sign out and reload
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Lint the demo's JavaScript sources
    Lint {
        /// Glob patterns (prefix with ! to exclude); defaults to the configured globs
        patterns: Vec<String>,

        /// Re-run on file changes
        #[arg(short, long)]
        watch: bool,

        /// Apply automatic fixes (rewrites files in place)
        #[arg(long)]
        fix: bool,

        /// Directory the patterns are relative to
        #[arg(long)]
        root: Option<PathBuf>,

        /// Linter command, e.g. "npx eslint"
        #[arg(long)]
        linter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("metering_demo_cli=debug,metering_demo_core=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("metering_demo_cli=info,metering_demo_core=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    // Setup storage directory
    let storage_dir = cli.storage_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("metering-demo")
    });

    let config = DemoConfig::load(&storage_dir)?;
    config.validate()?;

    // Dispatch commands
    match cli.command {
        Commands::Ppid => {
            commands::ppid::run(&storage_dir, &config, cli.verbose).await?;
        }
        Commands::NewPpid { count } => {
            commands::new_ppid::run(count).await?;
        }
        Commands::State { json } => {
            commands::state::run(&storage_dir, &config, json, cli.verbose).await?;
        }
        Commands::Status => {
            commands::status::run(&storage_dir, &config, cli.verbose).await?;
        }
        Commands::Register {
            username,
            timestamp,
        } => {
            commands::register::run(&storage_dir, &config, username, timestamp, cli.verbose)
                .await?;
        }
        Commands::Paywall => {
            commands::paywall::run(&storage_dir, &config, cli.verbose).await?;
        }
        Commands::Reset { yes } => {
            commands::reset::run(&storage_dir, &config, yes, cli.verbose).await?;
        }
        Commands::Lint {
            patterns,
            watch,
            fix,
            root,
            linter,
        } => {
            let args = commands::lint::LintArgs {
                patterns,
                watch,
                fix,
                root,
                linter,
            };
            commands::lint::run(&config, args, cli.verbose).await?;
        }
    }

    Ok(())
}
