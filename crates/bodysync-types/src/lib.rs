//! Platform-agnostic measurement types for body-composition sync.
//!
//! This crate provides the shared data model consumed by bodysync-core and
//! the CLI: typed metric kinds, exact-decimal measurement units, per-instant
//! measurement groups, and the provider wire-format parser.
//!
//! # Features
//!
//! - Metric kinds carrying the provider's numeric type codes
//! - Measurement units with integer mantissa and base-10 scale exponent
//! - Measurement groups with order-independent typed accessors
//! - serde model of the provider's measurement-list JSON (feature `serde`)
//!
//! # Example
//!
//! ```
//! use bodysync_types::{MeasurementGroup, MeasurementUnit, MetricKind, Category};
//! use time::OffsetDateTime;
//!
//! let group = MeasurementGroup::new(
//!     1,
//!     OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
//!     Category::Real,
//!     vec![MeasurementUnit::new(MetricKind::Weight, 80500, -3)],
//! );
//! assert_eq!(group.weight(), Some(80.5));
//! ```

pub mod error;
pub mod measure;
#[cfg(feature = "serde")]
pub mod wire;

pub use error::{ParseError, ParseResult};
pub use measure::{Category, MeasurementGroup, MeasurementUnit, MetricKind};
#[cfg(feature = "serde")]
pub use wire::MeasurementResponse;
