//! Structured-text report document.
//!
//! Builds the side file handed to the structured-text serializer: per record,
//! a mapping from metric label to value/unit pair, with derived fields under
//! the fixed keys `"BMI"` and `"Percent_Hydration"`.

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::reconcile::{CanonicalRecord, RecordData};

/// One labeled value in the report document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Decoded physical value.
    #[serde(rename = "Value")]
    pub value: f64,
    /// Unit string; empty for unknown metrics.
    #[serde(rename = "Unit")]
    pub unit: String,
}

/// Timestamp-keyed report: capture instant → metric label → entry.
pub type ReportDocument = BTreeMap<String, BTreeMap<String, ReportEntry>>;

/// Build the report document for a reconciled record sequence.
///
/// Every raw source unit is listed under its metric label (a later duplicate
/// of the same label replaces the earlier one, mirroring the upstream
/// serializer); derived fields are appended under their fixed keys.
#[must_use]
pub fn build_report(records: &[CanonicalRecord]) -> ReportDocument {
    let mut document = ReportDocument::new();
    for record in records {
        let mut fields = BTreeMap::new();
        for unit in &record.sources {
            fields.insert(
                unit.kind.label().to_string(),
                ReportEntry {
                    value: unit.value(),
                    unit: unit.kind.unit().to_string(),
                },
            );
        }
        if let RecordData::Weight(body) = &record.data {
            if let Some(bmi) = body.bmi {
                fields.insert(
                    "BMI".to_string(),
                    ReportEntry {
                        value: bmi,
                        unit: "kg/m^2".to_string(),
                    },
                );
            }
            if let Some(percent) = body.percent_hydration {
                fields.insert(
                    "Percent_Hydration".to_string(),
                    ReportEntry {
                        value: percent,
                        unit: "%".to_string(),
                    },
                );
            }
        }
        document.insert(timestamp_key(record.captured_at), fields);
    }
    document
}

/// RFC3339 capture instant; epoch seconds when formatting is impossible.
fn timestamp_key(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}
