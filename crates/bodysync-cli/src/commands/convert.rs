//! Convert command - reconcile a measurement dump into output artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use time::OffsetDateTime;
use tracing::info;

use bodysync_core::output::OutputRouter;
use bodysync_core::traits::MeasurementSource;
use bodysync_core::{Reconciler, RecordKind};

use crate::cli::{InputArgs, ReconcileArgs};
use crate::commands::resolve_reconcile_config;
use crate::config::Config;
use crate::source::DumpFileSource;
use crate::util::resolve_range;

/// Arguments for the convert command.
pub struct ConvertArgs {
    pub input: InputArgs,
    pub reconcile: ReconcileArgs,
    pub output: PathBuf,
    pub to_fit: bool,
    pub to_json: bool,
    pub no_upload: bool,
}

/// Execute the convert command.
pub fn cmd_convert(args: ConvertArgs, config: &Config) -> Result<()> {
    let (start, end) = resolve_range(args.input.from.as_deref(), args.input.to.as_deref())?;
    info!(from = %start, to = %end, "selecting measurements");

    let mut source = DumpFileSource::new(&args.input.input);
    let groups = source
        .fetch(start, end, None)
        .context("Failed to read measurement dump")?;
    if groups.is_empty() {
        bail!("No measurements to convert for the specified period");
    }

    let reconciler = Reconciler::new(resolve_reconcile_config(&args.reconcile, config));
    let result = reconciler.reconcile(&groups);

    if args.no_upload {
        info!("skipping upload");
    } else {
        info!("no upload collaborator configured; writing files only");
    }

    let router = OutputRouter {
        basename: Some(args.output.clone()),
        write_fit: args.to_fit,
        write_json: args.to_json,
    };
    // No upload collaborator is wired in; transports live outside this tool.
    let encoded = router
        .route(&result, OffsetDateTime::now_utc(), None)
        .context("Failed to write output artifacts")?;

    println!("Groups read: {}", groups.len());
    println!("Records reconciled: {}", result.records.len());
    if let Some(file) = &encoded.weight {
        println!("Weight file: {} bytes", file.len());
    }
    if let Some(file) = &encoded.blood_pressure {
        println!("Blood pressure file: {} bytes", file.len());
    }
    if let Some(last) = &result.last {
        println!("Last record: {} at {}", last.kind, last.captured_at);
        if last.kind == RecordKind::Weight {
            if let Some((_, kilograms)) = result.latest_weight() {
                println!("Latest weight: {kilograms} kg");
            }
        }
    }

    Ok(())
}
