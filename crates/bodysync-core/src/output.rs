//! Output routing for reconciled records.
//!
//! Splits the canonical record sequence by kind, drives one container writer
//! per kind, and dispatches the finalized buffers to file sinks and an
//! optional upload collaborator. Thin glue by design; the interesting work
//! happens in [`crate::reconcile`] and [`crate::fit`].

use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fit::{BloodPressureSample, FitFile, FitFileKind, FitFileWriter, WeightSample};
use crate::reconcile::{CanonicalRecord, RecordData, Reconciliation};
use crate::report::build_report;
use crate::traits::UploadTarget;

/// Encoded container files for one reconciled sequence.
///
/// A side is `None` when no record of that kind exists; the consuming service
/// rejects empty files, so none is produced.
#[derive(Debug, Clone, Default)]
pub struct EncodedFiles {
    /// Weight-scale container, if any weight records exist.
    pub weight: Option<FitFile>,
    /// Blood-pressure container, if any blood-pressure records exist.
    pub blood_pressure: Option<FitFile>,
}

/// Encode the record sequence into per-kind container files.
///
/// `created_at` becomes the file-creation timestamp of each container, so
/// callers keep control of it for reproducible output.
///
/// # Errors
///
/// Propagates encoder failures ([`Error::FieldRange`],
/// [`Error::PreEpochTimestamp`]).
pub fn encode_fit(records: &[CanonicalRecord], created_at: OffsetDateTime) -> Result<EncodedFiles> {
    let weight_records: Vec<_> = records
        .iter()
        .filter_map(|r| match &r.data {
            RecordData::Weight(body) => Some((r.captured_at, body)),
            _ => None,
        })
        .collect();
    let bp_records: Vec<_> = records
        .iter()
        .filter_map(|r| match &r.data {
            RecordData::BloodPressure(body) => Some((r.captured_at, body)),
            _ => None,
        })
        .collect();
    let skipped = records.len() - weight_records.len() - bp_records.len();
    if skipped > 0 {
        debug!(count = skipped, "unclassified records reach the report only");
    }

    let weight = if weight_records.is_empty() {
        info!("no weight data to encode");
        None
    } else {
        let mut writer = new_writer(FitFileKind::Weight, created_at)?;
        for (captured_at, body) in weight_records {
            writer.write_device_info(captured_at)?;
            writer.write_weight_scale(
                captured_at,
                &WeightSample {
                    weight: body.weight,
                    percent_fat: body.fat_ratio,
                    percent_hydration: body.percent_hydration,
                    bone_mass: body.bone_mass,
                    muscle_mass: body.muscle_mass,
                    bmi: body.bmi,
                },
            )?;
        }
        Some(writer.finish())
    };

    let blood_pressure = if bp_records.is_empty() {
        info!("no blood pressure data to encode");
        None
    } else {
        let mut writer = new_writer(FitFileKind::BloodPressure, created_at)?;
        for (captured_at, body) in bp_records {
            writer.write_device_info(captured_at)?;
            writer.write_blood_pressure(
                captured_at,
                &BloodPressureSample {
                    diastolic: body.diastolic,
                    systolic: body.systolic,
                    heart_rate: body.heart_pulse,
                },
            )?;
        }
        Some(writer.finish())
    };

    Ok(EncodedFiles {
        weight,
        blood_pressure,
    })
}

fn new_writer(kind: FitFileKind, created_at: OffsetDateTime) -> Result<FitFileWriter> {
    let mut writer = FitFileWriter::new(kind);
    writer.write_file_info(created_at)?;
    writer.write_file_creator();
    Ok(writer)
}

/// Dispatches encoded artifacts to files and the upload collaborator.
#[derive(Debug, Clone, Default)]
pub struct OutputRouter {
    /// Basename for output artifacts; suffixes are appended per format.
    /// `None` disables file output entirely.
    pub basename: Option<PathBuf>,
    /// Write the binary container files.
    pub write_fit: bool,
    /// Write the JSON report document.
    pub write_json: bool,
}

impl OutputRouter {
    /// Encode, write requested files, and push buffers to the uploader.
    ///
    /// # Errors
    ///
    /// Propagates encoder failures, [`Error::WriteOutput`] for file sinks and
    /// whatever the upload collaborator reports.
    pub fn route(
        &self,
        reconciliation: &Reconciliation,
        created_at: OffsetDateTime,
        mut upload: Option<&mut dyn UploadTarget>,
    ) -> Result<EncodedFiles> {
        let encoded = encode_fit(&reconciliation.records, created_at)?;

        if let Some(basename) = &self.basename {
            if self.write_fit {
                if let Some(file) = &encoded.weight {
                    write_artifact(&suffixed(basename, "weight.fit"), file.as_bytes())?;
                }
                if let Some(file) = &encoded.blood_pressure {
                    write_artifact(&suffixed(basename, "blood_pressure.fit"), file.as_bytes())?;
                }
            }
            if self.write_json {
                let report = build_report(&reconciliation.records);
                let text = serde_json::to_string_pretty(&report)?;
                write_artifact(&suffixed(basename, "json"), text.as_bytes())?;
            }
        }

        if let Some(target) = upload.as_deref_mut() {
            for file in [&encoded.weight, &encoded.blood_pressure]
                .into_iter()
                .flatten()
            {
                target.upload(file)?;
            }
            info!("upload complete");
        }

        Ok(encoded)
    }
}

/// `<basename>.<suffix>`, matching the naming of the upstream tooling.
fn suffixed(basename: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", basename.display(), suffix))
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    info!(path = %path.display(), len = bytes.len(), "writing output artifact");
    fs::write(path, bytes).map_err(|source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}
