//! File-backed measurement source.
//!
//! Reads a dump of the provider's measurement-list payload (the exact JSON
//! the provider API answers with) and serves it through the
//! [`MeasurementSource`] boundary. The live HTTP/OAuth collaborator is out
//! of scope; any implementation of the same trait can replace this one.

use std::fs;
use std::path::PathBuf;

use time::OffsetDateTime;
use tracing::debug;

use bodysync_core::error::{Error, Result};
use bodysync_core::traits::MeasurementSource;
use bodysync_types::{MeasurementGroup, MeasurementResponse, MetricKind};

/// Measurement source reading a provider payload dump from disk.
#[derive(Debug, Clone)]
pub struct DumpFileSource {
    path: PathBuf,
}

impl DumpFileSource {
    /// Create a source for the given dump file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MeasurementSource for DumpFileSource {
    fn fetch(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
        kind: Option<MetricKind>,
    ) -> Result<Vec<MeasurementGroup>> {
        let text = fs::read_to_string(&self.path).map_err(|source| Error::ReadInput {
            path: self.path.clone(),
            source,
        })?;
        let groups = MeasurementResponse::from_json(&text)
            .map_err(Error::from)?
            .into_groups()?;
        let total = groups.len();
        let selected: Vec<MeasurementGroup> = groups
            .into_iter()
            .filter(|g| g.captured_at >= start && g.captured_at <= end)
            .filter(|g| kind.is_none_or(|k| g.kinds().any(|own| own == k)))
            .collect();
        debug!(
            path = %self.path.display(),
            total,
            selected = selected.len(),
            "loaded measurement dump"
        );
        Ok(selected)
    }
}
