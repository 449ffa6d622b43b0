use nalgebra::DVector;
use rayon::prelude::*;

use crate::data::frame::PullbackFrame;

/// Pearson correlation between the flattened pixel vectors of each
/// consecutive frame pair.
///
/// Cardiac motion periodically decorrelates neighboring frames, so this
/// series carries a weak phase signal. The output has one value per
/// frame; the final frame has no successor and is assigned 0.0 to keep
/// the lengths aligned. Degenerate (constant) frames have undefined
/// correlation and also yield 0.0 instead of NaN.
pub fn interframe_correlation(frames: &[PullbackFrame]) -> Vec<f64> {
    if frames.is_empty() {
        return Vec::new();
    }
    let mut scores: Vec<f64> = (0..frames.len() - 1)
        .into_par_iter()
        .map(|i| pearson(&frames[i].pixels, &frames[i + 1].pixels))
        .collect();
    scores.push(0.0);
    scores
}

/// Pearson correlation coefficient of two equal-length sample vectors,
/// 0.0 when either vector has zero variance.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "correlated frames must match in size");
    if a.is_empty() {
        return 0.0;
    }
    let a = DVector::from_column_slice(a);
    let b = DVector::from_column_slice(b);
    let a_centered = a.add_scalar(-a.mean());
    let b_centered = b.add_scalar(-b.mean());

    let denominator = a_centered.norm() * b_centered.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    a_centered.dot(&b_centered) / denominator
}
