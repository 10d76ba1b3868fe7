//! Locus CLI - Command-line interface
//!
//! This binary drives the locus library against a simulated platform: it
//! evaluates permission decisions and replays recorded sample batches.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use locus::logging::{default_log_dir, default_log_file, init_logging};

use commands::common::{ActivityArg, GrantArg, ModeArg};
use commands::permission::PermissionArgs;
use commands::replay::ReplayArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "locus")]
#[command(version = locus::VERSION)]
#[command(about = "Inspect and replay the locus location pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the action taken for an operating mode and grant level
    Permission {
        /// Operating mode the application asks for
        #[arg(long, value_enum)]
        mode: ModeArg,

        /// Grant level reported by the platform
        #[arg(long, value_enum)]
        grant: GrantArg,
    },

    /// Feed recorded sample batches through the service
    Replay {
        /// JSON-lines file, one array of samples per line
        #[arg(long)]
        samples: PathBuf,

        /// Config file (defaults to the user config file if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Operating mode (overrides config)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Activity profile (overrides config)
        #[arg(long, value_enum)]
        activity: Option<ActivityArg>,

        /// Grant level reported by the simulated platform
        #[arg(long, value_enum, default_value = "undetermined")]
        grant: GrantArg,

        /// JSON array of places to reverse geocode against
        #[arg(long)]
        places: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };
    tracing::info!(version = locus::VERSION, "locus starting");

    let result = match cli.command {
        Commands::Permission { mode, grant } => {
            commands::permission::run(PermissionArgs { mode, grant })
        }
        Commands::Replay {
            samples,
            config,
            mode,
            activity,
            grant,
            places,
        } => commands::replay::run(ReplayArgs {
            samples,
            config,
            mode,
            activity,
            grant,
            places,
        }),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        // Flush the log file before exiting
        drop(guard);
        e.exit();
    }
}
