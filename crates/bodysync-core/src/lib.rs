//! Measurement reconciliation and binary activity-file encoding.
//!
//! This crate turns heterogeneous body-composition and vital-sign samples,
//! as reported by a scale/health-metrics provider, into a deduplicated
//! per-timestamp record set and a checksum-protected binary container the
//! fitness upload endpoint accepts.
//!
//! # Pipeline
//!
//! provider groups → [`Reconciler`] → ordered [`CanonicalRecord`] sequence →
//! { [`fit::FitFileWriter`] → byte buffer; [`report`] → JSON document } →
//! [`output::OutputRouter`] → files / upload collaborator.
//!
//! # Concurrency
//!
//! Everything here is pure, synchronous and single-threaded: reconciliation
//! is a fold over an in-memory sequence, encoding accumulates into an
//! in-memory buffer, and no component performs I/O except the output router's
//! file sinks. Callers parallelizing across date ranges use one
//! reconciler/writer per range; no state is shared between instances.
//!
//! # Quick Start
//!
//! ```
//! use bodysync_core::{ReconcileConfig, Reconciler};
//! use bodysync_core::output::encode_fit;
//! use bodysync_types::{Category, MeasurementGroup, MeasurementUnit, MetricKind};
//! use time::OffsetDateTime;
//!
//! let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
//! let groups = vec![MeasurementGroup::new(
//!     1,
//!     at,
//!     Category::Real,
//!     vec![MeasurementUnit::new(MetricKind::Weight, 80500, -3)],
//! )];
//!
//! let reconciler = Reconciler::new(ReconcileConfig {
//!     height: Some(1.80),
//!     ..ReconcileConfig::default()
//! });
//! let result = reconciler.reconcile(&groups);
//! let files = encode_fit(&result.records, at).unwrap();
//! assert!(files.weight.is_some());
//! ```

pub mod error;
pub mod fit;
pub mod output;
pub mod reconcile;
pub mod report;
pub mod traits;

pub use error::{Error, Result};
pub use fit::{BloodPressureSample, FitFile, FitFileKind, FitFileWriter, WeightSample};
pub use output::{EncodedFiles, OutputRouter};
pub use reconcile::{
    BloodPressureBody, CanonicalRecord, LastRecord, ReconcileConfig, Reconciler, Reconciliation,
    RecordData, RecordKind, WeightBody,
};
pub use report::{ReportDocument, ReportEntry, build_report};
pub use traits::{MeasurementSource, ProfileTarget, UploadTarget};

// Re-export the data-model crate for downstream convenience.
pub use bodysync_types as types;
