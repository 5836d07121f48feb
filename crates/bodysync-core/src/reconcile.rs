//! Measurement reconciliation.
//!
//! The provider reports several partial groups for one capture instant: the
//! scale uploads weight and impedance-derived masses in one group, heart data
//! in another, and so on. This module folds an arbitrarily ordered group
//! sequence into one canonical record per timestamp, derives BMI and percent
//! hydration, and classifies every record by its dominant metric type.
//!
//! # Merge policy
//!
//! - The merge key is the capture instant at seconds resolution.
//! - Record types rank weight > blood-pressure > unclassified; a record never
//!   downgrades once a higher-ranked draft has been folded in.
//! - Scalar fields merge last-non-null-wins in input encounter order; a null
//!   from a later group never clears a value.
//! - When a weight draft displaces a blood-pressure body (or the reverse
//!   collision arrives), the only value carried across is the heart pulse,
//!   and only into an empty slot. Pressure readings have no slot on a weight
//!   record and are dropped.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use bodysync_types::{MeasurementGroup, MeasurementUnit};

/// Configuration for one reconciliation pass.
///
/// Passed in explicitly by the caller; the reconciler keeps no ambient state.
#[derive(Debug, Clone, Default)]
pub struct ReconcileConfig {
    /// Subject height in meters, used to derive BMI. `None` leaves BMI unset.
    pub height: Option<f64>,
    /// Emit records that carry neither weight nor blood-pressure data.
    ///
    /// Such records never reach the binary encoder; they only surface in the
    /// report document.
    pub accept_unclassified: bool,
    /// Classify blood-pressure groups. When disabled they are treated as
    /// unclassified, matching the feature toggle of the upstream tooling.
    pub blood_pressure: bool,
}

/// Scalar fields of a weight-classified record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightBody {
    /// Body weight in kilograms.
    pub weight: Option<f64>,
    /// Fat ratio as a percentage.
    pub fat_ratio: Option<f64>,
    /// Muscle mass in kilograms.
    pub muscle_mass: Option<f64>,
    /// Body water in kilograms.
    pub hydration: Option<f64>,
    /// Bone mass in kilograms.
    pub bone_mass: Option<f64>,
    /// Pulse wave velocity in meters per second.
    pub pulse_wave_velocity: Option<f64>,
    /// Heart pulse in beats per minute.
    pub heart_pulse: Option<f64>,
    /// Body mass index, derived from weight and height.
    pub bmi: Option<f64>,
    /// Body water as a percentage of weight, derived.
    pub percent_hydration: Option<f64>,
}

/// Scalar fields of a blood-pressure-classified record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BloodPressureBody {
    /// Diastolic blood pressure in mmHg.
    pub diastolic: Option<f64>,
    /// Systolic blood pressure in mmHg.
    pub systolic: Option<f64>,
    /// Heart pulse in beats per minute.
    pub heart_pulse: Option<f64>,
}

/// Classified payload of a canonical record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordData {
    /// Body-composition sample.
    Weight(WeightBody),
    /// Blood-pressure sample.
    BloodPressure(BloodPressureBody),
    /// Neither weight nor blood-pressure data was observed.
    Unclassified,
}

impl RecordData {
    /// Discriminant of this payload.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordData::Weight(_) => RecordKind::Weight,
            RecordData::BloodPressure(_) => RecordKind::BloodPressure,
            RecordData::Unclassified => RecordKind::Unclassified,
        }
    }
}

/// Record classification, ordered by merge precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Neither weight nor blood-pressure data.
    Unclassified,
    /// Blood-pressure sample.
    BloodPressure,
    /// Body-composition sample.
    Weight,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Weight => write!(f, "weight"),
            RecordKind::BloodPressure => write!(f, "blood_pressure"),
            RecordKind::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// One merged, per-timestamp record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    /// The capture instant shared by every contributing group.
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
    /// Classified scalar payload.
    #[serde(flatten)]
    pub data: RecordData,
    /// Units of every contributing group in encounter order, kept for
    /// traceability and the report document; never merged further.
    #[serde(skip)]
    pub sources: Vec<MeasurementUnit>,
}

/// Kind and capture time of the chronologically last emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LastRecord {
    /// Classification of the last record.
    pub kind: RecordKind,
    /// Its capture instant.
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Canonical records in ascending capture order, one per instant.
    pub records: Vec<CanonicalRecord>,
    /// Side channel for callers that push only the newest measurement.
    pub last: Option<LastRecord>,
}

impl Reconciliation {
    /// Latest emitted weight value, if any.
    ///
    /// Used by callers deciding whether to push a single current weight to a
    /// third-party profile.
    #[must_use]
    pub fn latest_weight(&self) -> Option<(OffsetDateTime, f64)> {
        self.records.iter().rev().find_map(|r| match &r.data {
            RecordData::Weight(w) => w.weight.map(|kg| (r.captured_at, kg)),
            _ => None,
        })
    }
}

/// Folds measurement groups into canonical per-timestamp records.
///
/// A reconciler is cheap to construct and holds only its configuration;
/// callers that process independent date ranges in parallel use one instance
/// per range.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a reconciler with the given configuration.
    #[must_use]
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Reconcile a group sequence into ordered canonical records.
    ///
    /// An empty input yields an empty output; absence of data is never an
    /// error here.
    #[must_use]
    pub fn reconcile(&self, groups: &[MeasurementGroup]) -> Reconciliation {
        let mut merged: BTreeMap<i64, CanonicalRecord> = BTreeMap::new();

        for group in groups {
            let draft = self.classify(group);
            let key = group.captured_at.unix_timestamp();
            match merged.entry(key) {
                std::collections::btree_map::Entry::Vacant(entry) => {
                    entry.insert(CanonicalRecord {
                        captured_at: group.captured_at,
                        data: draft,
                        sources: group.units().to_vec(),
                    });
                }
                std::collections::btree_map::Entry::Occupied(mut entry) => {
                    let record = entry.get_mut();
                    record.sources.extend_from_slice(group.units());
                    let current = std::mem::replace(&mut record.data, RecordData::Unclassified);
                    record.data = merge_data(current, draft);
                }
            }
        }

        let mut records = Vec::with_capacity(merged.len());
        let mut last = None;
        for record in merged.into_values() {
            if record.data.kind() == RecordKind::Unclassified && !self.config.accept_unclassified {
                debug!(
                    timestamp = record.captured_at.unix_timestamp(),
                    "dropping record without whitelisted metrics"
                );
                continue;
            }
            last = Some(LastRecord {
                kind: record.data.kind(),
                captured_at: record.captured_at,
            });
            records.push(record);
        }

        if last.is_none() {
            warn!("no valid measurement data after reconciliation");
        }

        Reconciliation { records, last }
    }

    /// Classify one group and populate its draft fields.
    fn classify(&self, group: &MeasurementGroup) -> RecordData {
        if group.weight().is_some() {
            let mut body = WeightBody {
                weight: group.weight(),
                fat_ratio: group.fat_ratio(),
                muscle_mass: group.muscle_mass(),
                hydration: group.hydration(),
                bone_mass: group.bone_mass(),
                pulse_wave_velocity: group.pulse_wave_velocity(),
                heart_pulse: group.heart_pulse(),
                bmi: None,
                percent_hydration: None,
            };
            derive_fields(&mut body, self.config.height);
            debug!(
                group = group.group_id,
                timestamp = group.captured_at.unix_timestamp(),
                weight = ?body.weight,
                fat_ratio = ?body.fat_ratio,
                bmi = ?body.bmi,
                "weight group classified"
            );
            RecordData::Weight(body)
        } else if group.diastolic_blood_pressure().is_some() {
            if self.config.blood_pressure {
                let body = BloodPressureBody {
                    diastolic: group.diastolic_blood_pressure(),
                    systolic: group.systolic_blood_pressure(),
                    heart_pulse: group.heart_pulse(),
                };
                debug!(
                    group = group.group_id,
                    timestamp = group.captured_at.unix_timestamp(),
                    diastolic = ?body.diastolic,
                    systolic = ?body.systolic,
                    "blood-pressure group classified"
                );
                RecordData::BloodPressure(body)
            } else {
                info!(
                    group = group.group_id,
                    timestamp = group.captured_at.unix_timestamp(),
                    "group carries blood pressure but the feature is disabled"
                );
                RecordData::Unclassified
            }
        } else {
            let kinds: Vec<String> = group.kinds().map(|k| k.to_string()).collect();
            info!(
                group = group.group_id,
                timestamp = group.captured_at.unix_timestamp(),
                kinds = %kinds.join(", "),
                "group carries no whitelisted metric"
            );
            RecordData::Unclassified
        }
    }
}

/// Compute BMI and percent hydration for a weight draft.
fn derive_fields(body: &mut WeightBody, height: Option<f64>) {
    if let (Some(height), Some(weight)) = (height, body.weight) {
        if height > 0.0 {
            body.bmi = Some(round_to(weight / (height * height), 1));
        }
    }
    if let (Some(hydration), Some(weight)) = (body.hydration, body.weight) {
        if weight != 0.0 {
            body.percent_hydration = Some(round_to(hydration * 100.0 / weight, 2));
        }
    }
}

/// Merge an incoming draft into the accumulated payload for one instant.
fn merge_data(current: RecordData, incoming: RecordData) -> RecordData {
    match (current, incoming) {
        (RecordData::Weight(mut cur), RecordData::Weight(new)) => {
            merge_weight(&mut cur, &new);
            RecordData::Weight(cur)
        }
        (RecordData::Weight(mut cur), RecordData::BloodPressure(bp)) => {
            if cur.heart_pulse.is_none() {
                cur.heart_pulse = bp.heart_pulse;
            }
            RecordData::Weight(cur)
        }
        (RecordData::BloodPressure(bp), RecordData::Weight(mut new)) => {
            if new.heart_pulse.is_none() {
                new.heart_pulse = bp.heart_pulse;
            }
            RecordData::Weight(new)
        }
        (RecordData::BloodPressure(mut cur), RecordData::BloodPressure(new)) => {
            merge_bp(&mut cur, &new);
            RecordData::BloodPressure(cur)
        }
        (current, RecordData::Unclassified) => current,
        (RecordData::Unclassified, incoming) => incoming,
    }
}

fn merge_weight(cur: &mut WeightBody, new: &WeightBody) {
    overwrite(&mut cur.weight, new.weight);
    overwrite(&mut cur.fat_ratio, new.fat_ratio);
    overwrite(&mut cur.muscle_mass, new.muscle_mass);
    overwrite(&mut cur.hydration, new.hydration);
    overwrite(&mut cur.bone_mass, new.bone_mass);
    overwrite(&mut cur.pulse_wave_velocity, new.pulse_wave_velocity);
    overwrite(&mut cur.heart_pulse, new.heart_pulse);
    overwrite(&mut cur.bmi, new.bmi);
    overwrite(&mut cur.percent_hydration, new.percent_hydration);
}

fn merge_bp(cur: &mut BloodPressureBody, new: &BloodPressureBody) {
    overwrite(&mut cur.diastolic, new.diastolic);
    overwrite(&mut cur.systolic, new.systolic);
    overwrite(&mut cur.heart_pulse, new.heart_pulse);
}

/// Last non-null wins; a null never clears an existing value.
fn overwrite(dst: &mut Option<f64>, src: Option<f64>) {
    if src.is_some() {
        *dst = src;
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
