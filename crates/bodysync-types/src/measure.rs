//! Core types for provider measurement data.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use time::OffsetDateTime;

/// Metric type of a single measurement.
///
/// The discriminants mirror the provider's numeric type codes so that wire
/// payloads map losslessly onto this enum. Codes the library has no dedicated
/// handling for are preserved in [`MetricKind::Other`] rather than dropped,
/// since diagnostic output wants to report them.
///
/// # Examples
///
/// ```
/// use bodysync_types::MetricKind;
///
/// assert_eq!(MetricKind::from_code(1), MetricKind::Weight);
/// assert_eq!(MetricKind::from_code(9), MetricKind::DiastolicBloodPressure);
/// assert_eq!(MetricKind::from_code(170), MetricKind::Other(170));
/// assert_eq!(MetricKind::Weight.code(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum MetricKind {
    /// Body weight in kilograms.
    Weight,
    /// Body height in meters.
    Height,
    /// Fat-free mass in kilograms.
    FatFreeMass,
    /// Fat ratio as a percentage.
    FatRatio,
    /// Fat mass in kilograms.
    FatMassWeight,
    /// Diastolic blood pressure in mmHg.
    DiastolicBloodPressure,
    /// Systolic blood pressure in mmHg.
    SystolicBloodPressure,
    /// Heart pulse in beats per minute.
    HeartPulse,
    /// Temperature in degrees Celsius.
    Temperature,
    /// Blood oxygen saturation as a percentage.
    Spo2,
    /// Core body temperature in degrees Celsius.
    BodyTemperature,
    /// Skin temperature in degrees Celsius.
    SkinTemperature,
    /// Muscle mass in kilograms.
    MuscleMass,
    /// Body water in kilograms.
    Hydration,
    /// Bone mass in kilograms.
    BoneMass,
    /// Pulse wave velocity in meters per second.
    PulseWaveVelocity,
    /// A provider code without dedicated handling.
    Other(u16),
}

impl MetricKind {
    /// Map a provider type code onto a metric kind.
    ///
    /// Unknown codes are preserved as [`MetricKind::Other`]; this function
    /// never fails because the provider's code set is open-ended.
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => MetricKind::Weight,
            4 => MetricKind::Height,
            5 => MetricKind::FatFreeMass,
            6 => MetricKind::FatRatio,
            8 => MetricKind::FatMassWeight,
            9 => MetricKind::DiastolicBloodPressure,
            10 => MetricKind::SystolicBloodPressure,
            11 => MetricKind::HeartPulse,
            12 => MetricKind::Temperature,
            54 => MetricKind::Spo2,
            71 => MetricKind::BodyTemperature,
            73 => MetricKind::SkinTemperature,
            76 => MetricKind::MuscleMass,
            77 => MetricKind::Hydration,
            88 => MetricKind::BoneMass,
            91 => MetricKind::PulseWaveVelocity,
            other => MetricKind::Other(other),
        }
    }

    /// The provider type code for this kind.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            MetricKind::Weight => 1,
            MetricKind::Height => 4,
            MetricKind::FatFreeMass => 5,
            MetricKind::FatRatio => 6,
            MetricKind::FatMassWeight => 8,
            MetricKind::DiastolicBloodPressure => 9,
            MetricKind::SystolicBloodPressure => 10,
            MetricKind::HeartPulse => 11,
            MetricKind::Temperature => 12,
            MetricKind::Spo2 => 54,
            MetricKind::BodyTemperature => 71,
            MetricKind::SkinTemperature => 73,
            MetricKind::MuscleMass => 76,
            MetricKind::Hydration => 77,
            MetricKind::BoneMass => 88,
            MetricKind::PulseWaveVelocity => 91,
            MetricKind::Other(code) => *code,
        }
    }

    /// Human-readable label, used by diagnostics and the report document.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Weight => "Weight",
            MetricKind::Height => "Height",
            MetricKind::FatFreeMass => "Fat Free Mass",
            MetricKind::FatRatio => "Fat Ratio",
            MetricKind::FatMassWeight => "Fat Mass Weight",
            MetricKind::DiastolicBloodPressure => "Diastolic Blood Pressure",
            MetricKind::SystolicBloodPressure => "Systolic Blood Pressure",
            MetricKind::HeartPulse => "Heart Pulse",
            MetricKind::Temperature => "Temperature",
            MetricKind::Spo2 => "SP02",
            MetricKind::BodyTemperature => "Body Temperature",
            MetricKind::SkinTemperature => "Skin Temperature",
            MetricKind::MuscleMass => "Muscle Mass",
            MetricKind::Hydration => "Hydration",
            MetricKind::BoneMass => "Bone Mass",
            MetricKind::PulseWaveVelocity => "Pulse Wave Velocity",
            MetricKind::Other(_) => "unknown",
        }
    }

    /// Unit string for this kind; empty when unknown.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Weight
            | MetricKind::FatFreeMass
            | MetricKind::FatMassWeight
            | MetricKind::MuscleMass
            | MetricKind::Hydration
            | MetricKind::BoneMass => "kg",
            MetricKind::Height => "meter",
            MetricKind::FatRatio | MetricKind::Spo2 => "%",
            MetricKind::DiastolicBloodPressure | MetricKind::SystolicBloodPressure => "mmHg",
            MetricKind::HeartPulse => "bpm",
            MetricKind::Temperature
            | MetricKind::BodyTemperature
            | MetricKind::SkinTemperature => "celsius",
            MetricKind::PulseWaveVelocity => "m/s",
            MetricKind::Other(_) => "",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Provider category of a measurement group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum Category {
    /// A real measurement taken by a device.
    Real,
    /// A user-entered objective, not a measurement.
    Objective,
    /// Any other category code.
    Unknown,
}

impl From<i64> for Category {
    fn from(value: i64) -> Self {
        match value {
            1 => Category::Real,
            2 => Category::Objective,
            _ => Category::Unknown,
        }
    }
}

/// One typed physiological scalar with an integer mantissa and a base-10
/// scale exponent.
///
/// The decoded physical value is `raw_value * 10^scale_exponent`, which
/// reproduces the provider's decimal exactly. Units are immutable: a changed
/// value is a new unit, never a mutation.
///
/// # Examples
///
/// ```
/// use bodysync_types::{MeasurementUnit, MetricKind};
///
/// let unit = MeasurementUnit::new(MetricKind::Weight, 80500, -3);
/// assert_eq!(unit.value(), 80.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementUnit {
    /// Metric type of this measurement.
    pub kind: MetricKind,
    /// Integer mantissa as reported by the provider.
    pub raw_value: i64,
    /// Base-10 exponent applied to `raw_value`.
    pub scale_exponent: i32,
}

impl MeasurementUnit {
    /// Create a new measurement unit.
    #[must_use]
    pub fn new(kind: MetricKind, raw_value: i64, scale_exponent: i32) -> Self {
        Self {
            kind,
            raw_value,
            scale_exponent,
        }
    }

    /// Decoded physical value: `raw_value * 10^scale_exponent`.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.raw_value as f64 * 10f64.powi(self.scale_exponent)
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.kind.label(), self.value(), self.kind.unit())
    }
}

/// A provider-reported bundle of measurements sharing one capture instant.
///
/// Units keep their provider order; typed lookups are order-independent and
/// return the first unit of the requested kind when duplicates exist within
/// one group. A group with zero units is tolerated (the provider is not
/// supposed to produce one, but downstream consumers must not assume that).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementGroup {
    /// Provider group identifier.
    pub group_id: i64,
    /// Instant the measurement was taken, seconds resolution.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub captured_at: OffsetDateTime,
    /// Provider category.
    pub category: Category,
    units: Vec<MeasurementUnit>,
}

impl MeasurementGroup {
    /// Create a group from already-decoded units.
    #[must_use]
    pub fn new(
        group_id: i64,
        captured_at: OffsetDateTime,
        category: Category,
        units: Vec<MeasurementUnit>,
    ) -> Self {
        Self {
            group_id,
            captured_at,
            category,
            units,
        }
    }

    /// The contained units in provider order.
    #[must_use]
    pub fn units(&self) -> &[MeasurementUnit] {
        &self.units
    }

    /// Number of units in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the group carries no units at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Metric kinds present in this group, in provider order.
    pub fn kinds(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.units.iter().map(|u| u.kind)
    }

    /// Decoded value of the first unit of `kind`, rounded to two decimals.
    ///
    /// First occurrence wins when a group carries duplicates of one kind.
    #[must_use]
    pub fn value_of(&self, kind: MetricKind) -> Option<f64> {
        self.units
            .iter()
            .find(|u| u.kind == kind)
            .map(|u| (u.value() * 100.0).round() / 100.0)
    }

    /// Body weight in kilograms.
    #[must_use]
    pub fn weight(&self) -> Option<f64> {
        self.value_of(MetricKind::Weight)
    }

    /// Body height in meters.
    #[must_use]
    pub fn height(&self) -> Option<f64> {
        self.value_of(MetricKind::Height)
    }

    /// Fat ratio as a percentage.
    #[must_use]
    pub fn fat_ratio(&self) -> Option<f64> {
        self.value_of(MetricKind::FatRatio)
    }

    /// Muscle mass in kilograms.
    #[must_use]
    pub fn muscle_mass(&self) -> Option<f64> {
        self.value_of(MetricKind::MuscleMass)
    }

    /// Body water in kilograms.
    #[must_use]
    pub fn hydration(&self) -> Option<f64> {
        self.value_of(MetricKind::Hydration)
    }

    /// Bone mass in kilograms.
    #[must_use]
    pub fn bone_mass(&self) -> Option<f64> {
        self.value_of(MetricKind::BoneMass)
    }

    /// Pulse wave velocity in meters per second.
    #[must_use]
    pub fn pulse_wave_velocity(&self) -> Option<f64> {
        self.value_of(MetricKind::PulseWaveVelocity)
    }

    /// Heart pulse in beats per minute.
    #[must_use]
    pub fn heart_pulse(&self) -> Option<f64> {
        self.value_of(MetricKind::HeartPulse)
    }

    /// Diastolic blood pressure in mmHg.
    #[must_use]
    pub fn diastolic_blood_pressure(&self) -> Option<f64> {
        self.value_of(MetricKind::DiastolicBloodPressure)
    }

    /// Systolic blood pressure in mmHg.
    #[must_use]
    pub fn systolic_blood_pressure(&self) -> Option<f64> {
        self.value_of(MetricKind::SystolicBloodPressure)
    }
}
