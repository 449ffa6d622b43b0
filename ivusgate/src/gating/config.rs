//! Gating pipeline configuration.

use ivuscore::data::frame::CropRegion;
use serde::{Deserialize, Serialize};

/// Tunable parameters of a gating session.
///
/// The host application injects this struct instead of handing the
/// pipeline its whole configuration context; everything the pipeline
/// needs to know is named here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatingConfig {
    /// Central crop applied to every frame before signal extraction.
    pub crop: CropRegion,

    /// Moving-average window applied to each normalized signal before it
    /// enters fusion and the display.
    pub smoothing_window: usize,

    /// Extrema-detection window for fusing the motion family
    /// (correlation + blur).
    pub motion_window: usize,

    /// Extrema-detection window for fusing the geometry family
    /// (distance, angle, length).
    pub geometry_window: usize,

    /// Divisor mapping gated-frame count to the marker selection radius
    /// in plot units.
    pub sensitivity_divisor: f64,
}

impl Default for GatingConfig {
    fn default() -> Self {
        GatingConfig {
            // 400 x 400 central region of a 500 x 500 acquisition
            crop: CropRegion::default(),

            // window 5 drives the final decision; 2 and 10 are useful
            // for eyeballing faster/slower consensus curves
            smoothing_window: 5,
            motion_window: 5,
            geometry_window: 5,

            // a click selects a marker within frame_count / 100 units
            sensitivity_divisor: 100.0,
        }
    }
}
