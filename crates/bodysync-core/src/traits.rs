//! Trait boundaries toward the excluded network collaborators.
//!
//! The provider API, the upload endpoint and the third-party profile are
//! out of scope for this crate; these traits pin down the narrow contracts
//! the core expects from whoever implements them.

use time::OffsetDateTime;

use bodysync_types::{MeasurementGroup, MetricKind};

use crate::error::Result;
use crate::fit::FitFile;

/// Source of provider measurement groups for a time range.
///
/// An empty result means "no data for range" and is not an error; transport
/// and authentication failures surface through the error channel.
pub trait MeasurementSource {
    /// Fetch groups captured in `[start, end]`, optionally restricted to a
    /// single metric kind.
    fn fetch(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
        kind: Option<MetricKind>,
    ) -> Result<Vec<MeasurementGroup>>;
}

/// Accepts a finalized container buffer.
///
/// The transport status is pass/fail only; this core performs no retries and
/// cannot disambiguate the service's generic rejection.
pub trait UploadTarget {
    /// Upload one finalized file.
    fn upload(&mut self, file: &FitFile) -> Result<()>;
}

/// Third-party profile tracking a single current weight.
pub trait ProfileTarget {
    /// Replace the profile's current weight, in kilograms.
    fn set_weight(&mut self, kilograms: f64) -> Result<()>;
}
