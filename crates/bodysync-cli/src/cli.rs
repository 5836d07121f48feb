//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for the inspect command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Reusable input-selection arguments
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Provider measurement dump (JSON) to read groups from
    #[arg(short, long, env = "BODYSYNC_INPUT")]
    pub input: PathBuf,

    /// Only consider measurements on or after this date (RFC3339 or YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only consider measurements on or before this date (RFC3339 or YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

/// Reusable reconciliation arguments
#[derive(Debug, Clone, Args)]
pub struct ReconcileArgs {
    /// Subject height in meters, used to derive BMI (overrides config)
    #[arg(long)]
    pub height: Option<f64>,

    /// Enable named features, comma-separated (e.g. BLOOD_PRESSURE)
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Keep records that carry no whitelisted metric (report output only)
    #[arg(long)]
    pub accept_unclassified: bool,
}

#[derive(Parser)]
#[command(name = "bodysync")]
#[command(
    author,
    version,
    about = "Reconcile body-composition measurements and encode activity files",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to an alternative config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile a measurement dump and write activity/report files
    Convert {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        reconcile: ReconcileArgs,

        /// Basename for output files; suffixes are appended per format
        #[arg(short, long)]
        output: PathBuf,

        /// Write binary activity files
        #[arg(long)]
        to_fit: bool,

        /// Write the JSON report document
        #[arg(long)]
        to_json: bool,

        /// Do not hand finalized buffers to any upload collaborator
        #[arg(long)]
        no_upload: bool,
    },

    /// Show parsed groups and reconciled records from a dump
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        reconcile: ReconcileArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
