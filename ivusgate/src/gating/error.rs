//! Error types for the gating pipeline.

use thiserror::Error;

/// Failures surfaced to the operator before or during a gating pass.
///
/// Precondition failures abort the pass before any signal computation
/// begins; degenerate signals are handled with defined fallbacks inside
/// the core algorithms and never reach this enum.
#[derive(Error, Debug)]
pub enum GatingError {
    /// The selected range contains no frames.
    #[error("frame range selects no frames (lower {lower}, upper {upper})")]
    EmptyRange { lower: usize, upper: usize },

    /// The pullback has fewer frames than the selected range expects.
    #[error("frame range ends at frame {upper} but the pullback has only {frame_count} frames")]
    RangeOutOfBounds { upper: usize, frame_count: usize },

    /// Frames inside the requested range have no contours drawn yet.
    #[error("please add contours to frames {}", join_frames(.frames))]
    MissingContours { frames: Vec<u32> },

    /// The contour report could not be parsed.
    #[error("invalid contour report: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GatingError>;

fn join_frames(frames: &[u32]) -> String {
    frames
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
