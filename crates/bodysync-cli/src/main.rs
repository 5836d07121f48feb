use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bodysync_cli::cli::{Cli, Commands};
use bodysync_cli::commands::convert::{ConvertArgs, cmd_convert};
use bodysync_cli::commands::inspect::{InspectArgs, cmd_inspect};
use bodysync_cli::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            reconcile,
            output,
            to_fit,
            to_json,
            no_upload,
        } => cmd_convert(
            ConvertArgs {
                input,
                reconcile,
                output,
                to_fit,
                to_json,
                no_upload,
            },
            &config,
        ),
        Commands::Inspect {
            input,
            reconcile,
            format,
        } => cmd_inspect(
            InspectArgs {
                input,
                reconcile,
                format,
            },
            &config,
        ),
    }
}
