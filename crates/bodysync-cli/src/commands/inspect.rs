//! Inspect command - show parsed groups and reconciled records.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use bodysync_core::traits::MeasurementSource;
use bodysync_core::{CanonicalRecord, Reconciler, RecordData};
use bodysync_types::MeasurementGroup;

use crate::cli::{InputArgs, OutputFormat, ReconcileArgs};
use crate::commands::resolve_reconcile_config;
use crate::config::Config;
use crate::source::DumpFileSource;
use crate::util::resolve_range;

/// Arguments for the inspect command.
pub struct InspectArgs {
    pub input: InputArgs,
    pub reconcile: ReconcileArgs,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct Listing<'a> {
    groups: &'a [MeasurementGroup],
    records: &'a [CanonicalRecord],
}

/// Execute the inspect command.
pub fn cmd_inspect(args: InspectArgs, config: &Config) -> Result<()> {
    let (start, end) = resolve_range(args.input.from.as_deref(), args.input.to.as_deref())?;
    info!(from = %start, to = %end, "selecting measurements");

    let mut source = DumpFileSource::new(&args.input.input);
    let groups = source
        .fetch(start, end, None)
        .context("Failed to read measurement dump")?;

    let reconciler = Reconciler::new(resolve_reconcile_config(&args.reconcile, config));
    let result = reconciler.reconcile(&groups);

    match args.format {
        OutputFormat::Json => {
            let listing = Listing {
                groups: &groups,
                records: &result.records,
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Text => {
            println!("Groups: {}", groups.len());
            for group in &groups {
                println!("  group {} at {}", group.group_id, group.captured_at);
                for unit in group.units() {
                    println!("    {unit}");
                }
            }
            println!("Records: {}", result.records.len());
            for record in &result.records {
                print_record(record);
            }
        }
    }

    Ok(())
}

fn print_record(record: &CanonicalRecord) {
    match &record.data {
        RecordData::Weight(body) => {
            println!(
                "  {} weight: weight={:?} fat_ratio={:?} muscle_mass={:?} bone_mass={:?} bmi={:?} percent_hydration={:?}",
                record.captured_at,
                body.weight,
                body.fat_ratio,
                body.muscle_mass,
                body.bone_mass,
                body.bmi,
                body.percent_hydration,
            );
        }
        RecordData::BloodPressure(body) => {
            println!(
                "  {} blood_pressure: diastolic={:?} systolic={:?} heart_pulse={:?}",
                record.captured_at, body.diastolic, body.systolic, body.heart_pulse,
            );
        }
        RecordData::Unclassified => {
            println!(
                "  {} unclassified ({} source measurements)",
                record.captured_at,
                record.sources.len()
            );
        }
    }
}
