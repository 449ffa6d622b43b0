//! Strongly-typed contour report ingest.
//!
//! The host's report collaborator emits one row of geometry metrics per
//! frame with drawn contours. The presence of a row is the has-contour
//! flag for its frame; gating a range with missing rows is a fatal
//! precondition failure that names the offending frames.

use ivuscore::data::range::FrameRange;
use serde::{Deserialize, Serialize};

use crate::gating::error::{GatingError, Result};

/// Geometry metrics for one contoured frame, pre-computed by the
/// contour/report collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourRecord {
    /// 1-based acquisition frame number.
    pub frame: u32,
    /// Shortest lumen-to-wall distance of the frame's contour pair.
    pub shortest_distance: f64,
    /// Angle of the centroid displacement vector.
    pub vector_angle: f64,
    /// Length of the centroid displacement vector.
    pub vector_length: f64,
}

/// Contour report rows, sorted by frame number and deduplicated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContourReport {
    records: Vec<ContourRecord>,
}

impl ContourReport {
    /// Builds a report from possibly unordered records. Records are
    /// sorted by frame number; for duplicated frame numbers the first
    /// record wins.
    pub fn new(mut records: Vec<ContourRecord>) -> Self {
        records.sort_by_key(|r| r.frame);
        records.dedup_by_key(|r| r.frame);
        ContourReport { records }
    }

    /// Parses a report from the host's JSON row format.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<ContourRecord> = serde_json::from_str(json)?;
        Ok(ContourReport::new(records))
    }

    pub fn records(&self) -> &[ContourRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if a contour row exists for the 1-based `frame` number.
    pub fn has_contour(&self, frame: u32) -> bool {
        self.records.binary_search_by_key(&frame, |r| r.frame).is_ok()
    }

    /// Returns the records covering `range`, in frame order.
    ///
    /// # Errors
    ///
    /// [`GatingError::MissingContours`] naming every in-range frame
    /// without a contour row. The caller must not start any signal
    /// extraction in that case.
    pub fn select_range(&self, range: &FrameRange) -> Result<Vec<ContourRecord>> {
        let selected: Vec<ContourRecord> = self
            .records
            .iter()
            .filter(|r| range.contains(r.frame))
            .copied()
            .collect();

        if selected.len() != range.len() {
            let frames: Vec<u32> = range
                .frame_numbers()
                .into_iter()
                .filter(|&frame| !self.has_contour(frame))
                .collect();
            return Err(GatingError::MissingContours { frames });
        }
        Ok(selected)
    }
}
