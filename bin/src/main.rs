//! huntsize CLI - Security-telemetry ingestion volume estimator.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use huntsize_lib::load_settings;
use std::path::PathBuf;
use tracing::debug;

mod commands;
mod display;
mod logging;

use display::Format;

#[derive(Parser)]
#[command(name = "huntsize")]
#[command(about = "Estimate ingestion volume of advanced-hunting tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to the user config dir, then ./huntsize.toml)
    #[arg(long, global = true, env = "HUNTSIZE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress and report output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate ingestion volume for the configured tables
    Estimate {
        /// Lookback window in days. Prompted for when omitted.
        #[arg(short, long)]
        lookback_days: Option<String>,

        /// Rows sampled per table (1-100000). Prompted for when omitted.
        #[arg(short, long)]
        sample_size: Option<String>,

        /// Sampling operator (take or sample). Prompted for when omitted.
        #[arg(short = 'm', long)]
        sample_method: Option<String>,

        /// Output directory for samples, the summary and the log file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Summary file format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Tables estimated at once (overrides estimate.parallelism)
        #[arg(long)]
        parallel: Option<usize>,

        /// Skip prompts; missing values take their defaults
        #[arg(long)]
        yes: bool,
    },

    /// List the configured tables
    Tables,

    /// Print the queries an estimate run would issue
    Queries {
        /// Lookback window in days
        #[arg(short, long)]
        lookback_days: Option<String>,

        /// Rows sampled per table
        #[arg(short, long)]
        sample_size: Option<String>,

        /// Sampling operator (take or sample)
        #[arg(short = 'm', long)]
        sample_method: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut settings =
        load_settings(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Commands::Estimate {
        output_dir: Some(dir),
        ..
    } = &command
    {
        settings.output.dir.clone_from(dir);
    }

    let level = logging::console_level(cli.verbose, cli.quiet, &settings.logging.level);
    let log_dir = match &command {
        Commands::Estimate { .. } if settings.logging.file => Some(settings.output.dir.as_path()),
        _ => None,
    };
    let _guard = logging::init(&level, log_dir)?;

    // Table name warnings are emitted during validation; repeat it now that
    // a subscriber is installed.
    settings.validate()?;
    debug!(?settings, "Loaded configuration");

    match command {
        Commands::Estimate {
            lookback_days,
            sample_size,
            sample_method,
            output_dir: _,
            format,
            parallel,
            yes,
        } => {
            let args = commands::estimate::EstimateArgs {
                lookback_days,
                sample_size,
                sample_method,
                format,
                parallel,
                yes,
            };
            commands::estimate::estimate(&settings, args, cli.quiet).await
        }
        Commands::Tables => {
            commands::tables::list_tables(&settings);
            Ok(())
        }
        Commands::Queries {
            lookback_days,
            sample_size,
            sample_method,
        } => {
            commands::queries::print_queries(
                &settings,
                lookback_days.as_deref(),
                sample_size.as_deref(),
                sample_method.as_deref(),
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_flag() {
        let cli =
            Cli::try_parse_from(["huntsize", "--config", "/etc/huntsize.toml", "tables"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/huntsize.toml")));
        assert!(matches!(cli.command, Some(Commands::Tables)));

        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == "config")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("HUNTSIZE_CONFIG")));
    }
}
