//! Provider wire-format payloads.
//!
//! The provider's measurement endpoint answers with a JSON document of the
//! shape
//!
//! ```json
//! {
//!   "status": 0,
//!   "body": {
//!     "updatetime": 1700000000,
//!     "measuregrps": [
//!       {
//!         "grpid": 12, "attrib": 0, "date": 1699999000, "category": 1,
//!         "measures": [{"value": 80500, "type": 1, "unit": -3}]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! This module deserializes that document and converts it into
//! [`MeasurementGroup`] values. The HTTP fetch itself belongs to an external
//! collaborator; a dump of the payload is an equally valid input.

use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::{ParseError, ParseResult};
use crate::measure::{Category, MeasurementGroup, MeasurementUnit, MetricKind};

/// Top-level measurement-list response.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementResponse {
    /// Provider application status; zero means success.
    pub status: i64,
    /// Payload body; absent on provider errors.
    #[serde(default)]
    pub body: Option<MeasurementBody>,
}

/// Body of a successful measurement-list response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasurementBody {
    /// Provider-side time of the last account update.
    #[serde(default)]
    pub updatetime: Option<i64>,
    /// Measurement groups for the requested range.
    #[serde(default)]
    pub measuregrps: Vec<WireGroup>,
}

/// One measurement group as found on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireGroup {
    /// Provider group identifier.
    pub grpid: i64,
    /// Provider attribution code (how the measurement was attributed to the user).
    #[serde(default)]
    pub attrib: i64,
    /// Capture instant, epoch seconds.
    pub date: i64,
    /// Provider category code.
    #[serde(default)]
    pub category: i64,
    /// The individual measurements.
    #[serde(default)]
    pub measures: Vec<WireMeasure>,
}

/// One measurement entry as found on the wire.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireMeasure {
    /// Integer mantissa.
    pub value: i64,
    /// Provider metric type code.
    #[serde(rename = "type")]
    pub kind: u16,
    /// Base-10 exponent applied to `value`.
    pub unit: i32,
}

impl MeasurementResponse {
    /// Parse a measurement-list document from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] when the text is not a valid document of
    /// this shape.
    pub fn from_json(text: &str) -> ParseResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert the response into measurement groups.
    ///
    /// An empty group list means "no data for range" and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::ProviderStatus`] when the provider reported a
    /// non-zero status, and [`ParseError::InvalidPayload`] when a group
    /// carries an unrepresentable capture instant.
    pub fn into_groups(self) -> ParseResult<Vec<MeasurementGroup>> {
        if self.status != 0 {
            return Err(ParseError::ProviderStatus(self.status));
        }
        let body = self.body.unwrap_or_default();
        body.measuregrps.into_iter().map(WireGroup::into_group).collect()
    }
}

impl WireGroup {
    /// Convert a wire group into a [`MeasurementGroup`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPayload`] when `date` is outside the
    /// representable timestamp range.
    pub fn into_group(self) -> ParseResult<MeasurementGroup> {
        let captured_at = OffsetDateTime::from_unix_timestamp(self.date).map_err(|_| {
            ParseError::InvalidPayload(format!(
                "group {} has an out-of-range capture time {}",
                self.grpid, self.date
            ))
        })?;
        let units = self
            .measures
            .iter()
            .map(|m| MeasurementUnit::new(MetricKind::from_code(m.kind), m.value, m.unit))
            .collect();
        Ok(MeasurementGroup::new(
            self.grpid,
            captured_at,
            Category::from(self.category),
            units,
        ))
    }
}
