//! Integration tests for bodysync-core
//!
//! End-to-end scenarios over the full pipeline: provider groups through the
//! reconciler into finalized container buffers and the report document.
//! Everything here is pure and in-memory; no hardware or network required.
//!
//! `cargo test --package bodysync-core --test integration`

use bodysync_core::output::encode_fit;
use bodysync_core::report::build_report;
use bodysync_core::{ReconcileConfig, Reconciler, RecordData, RecordKind, fit};
use bodysync_types::{Category, MeasurementGroup, MeasurementUnit, MetricKind};
use time::OffsetDateTime;

fn ts(seconds: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(seconds).unwrap()
}

fn group(id: i64, seconds: i64, units: &[(MetricKind, i64, i32)]) -> MeasurementGroup {
    MeasurementGroup::new(
        id,
        ts(seconds),
        Category::Real,
        units
            .iter()
            .map(|&(kind, raw, exp)| MeasurementUnit::new(kind, raw, exp))
            .collect(),
    )
}

const T0: i64 = 1_700_000_000;

#[test]
fn colliding_weight_and_bp_groups_collapse_to_one_weight_record() {
    let groups = [
        group(1, T0, &[(MetricKind::Weight, 80000, -3)]),
        group(2, T0, &[(MetricKind::DiastolicBloodPressure, 80, 0)]),
    ];
    let reconciler = Reconciler::new(ReconcileConfig {
        height: Some(1.80),
        accept_unclassified: false,
        blood_pressure: true,
    });

    let result = reconciler.reconcile(&groups);

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.captured_at.unix_timestamp(), T0);
    match &record.data {
        RecordData::Weight(body) => {
            assert_eq!(body.weight, Some(80.0));
            assert_eq!(body.bmi, Some(24.7));
            // Weight precedence wins; the pressure readings are dropped.
            assert_eq!(body.heart_pulse, None);
        }
        other => panic!("expected weight record, got {:?}", other.kind()),
    }

    // Only a weight container is produced from this sequence.
    let files = encode_fit(&result.records, ts(T0)).unwrap();
    assert!(files.weight.is_some());
    assert!(files.blood_pressure.is_none());
}

#[test]
fn bp_feature_disabled_keeps_only_the_weight_record() {
    let groups = [
        group(1, T0, &[(MetricKind::Weight, 80000, -3)]),
        group(
            2,
            T0 + 600,
            &[
                (MetricKind::DiastolicBloodPressure, 80, 0),
                (MetricKind::SystolicBloodPressure, 120, 0),
            ],
        ),
    ];
    let reconciler = Reconciler::new(ReconcileConfig {
        height: None,
        accept_unclassified: false,
        blood_pressure: false,
    });

    let result = reconciler.reconcile(&groups);

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].data.kind(), RecordKind::Weight);
    let last = result.last.unwrap();
    assert_eq!(last.kind, RecordKind::Weight);
    assert_eq!(last.captured_at.unix_timestamp(), T0);
}

#[test]
fn pipeline_produces_a_checksummed_container_and_report() {
    let groups = [
        group(
            1,
            T0,
            &[
                (MetricKind::Weight, 81000, -3),
                (MetricKind::FatRatio, 2150, -2),
                (MetricKind::Hydration, 40500, -3),
            ],
        ),
        group(2, T0 + 86_400, &[(MetricKind::Weight, 80600, -3)]),
    ];
    let reconciler = Reconciler::new(ReconcileConfig {
        height: Some(1.80),
        accept_unclassified: false,
        blood_pressure: true,
    });

    let result = reconciler.reconcile(&groups);
    assert_eq!(result.records.len(), 2);

    let files = encode_fit(&result.records, ts(T0 + 90_000)).unwrap();
    let file = files.weight.unwrap();
    let bytes = file.as_bytes();

    // Header declares exactly the payload between itself and the checksum.
    let declared = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
    assert_eq!(bytes.len(), 14 + declared + 2);

    // The trailing checksum matches a recomputation over everything before it.
    let stored = u16::from_le_bytes([bytes[bytes.len() - 2], bytes[bytes.len() - 1]]);
    assert_eq!(fit::crc16(0, &bytes[..bytes.len() - 2]), stored);

    // The report carries raw values plus both derived fields.
    let report = build_report(&result.records);
    assert_eq!(report.len(), 2);
    let first = report.values().next().unwrap();
    assert_eq!(first["Weight"].value, 81.0);
    assert_eq!(first["BMI"].value, 25.0);
    assert_eq!(first["Percent_Hydration"].value, 50.0);
}

#[test]
fn latest_weight_feeds_the_profile_target() {
    struct Profile(Option<f64>);
    impl bodysync_core::ProfileTarget for Profile {
        fn set_weight(&mut self, kilograms: f64) -> bodysync_core::Result<()> {
            self.0 = Some(kilograms);
            Ok(())
        }
    }

    let groups = [
        group(1, T0, &[(MetricKind::Weight, 80000, -3)]),
        group(2, T0 + 60, &[(MetricKind::Weight, 81200, -3)]),
    ];
    let result = Reconciler::new(ReconcileConfig::default()).reconcile(&groups);

    let mut profile = Profile(None);
    if let Some((_, kilograms)) = result.latest_weight() {
        bodysync_core::ProfileTarget::set_weight(&mut profile, kilograms).unwrap();
    }
    assert_eq!(profile.0, Some(81.2));
}

#[test]
fn reconcilers_are_independent_across_ranges() {
    let first = [group(1, T0, &[(MetricKind::Weight, 80000, -3)])];
    let second = [group(2, T0 + 60, &[(MetricKind::Weight, 81000, -3)])];

    let reconciler_a = Reconciler::new(ReconcileConfig::default());
    let reconciler_b = Reconciler::new(ReconcileConfig::default());

    let a = reconciler_a.reconcile(&first);
    let b = reconciler_b.reconcile(&second);

    // No state leaks between instances or calls.
    assert_eq!(a.records.len(), 1);
    assert_eq!(b.records.len(), 1);
    assert_ne!(
        a.records[0].captured_at.unix_timestamp(),
        b.records[0].captured_at.unix_timestamp()
    );
}
