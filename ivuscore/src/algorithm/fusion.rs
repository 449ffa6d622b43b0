use log::warn;
use statrs::statistics::Statistics;

use crate::algorithm::extrema::{extrema, spacing_variability, ExtremaMode};
use crate::algorithm::signal::smooth;

/// Floor applied to extrema-spacing variabilities before inverse
/// weighting, so a perfectly periodic signal receives a large but finite
/// weight instead of dividing by zero.
const MIN_VARIABILITY: f64 = 1e-3;

/// Inverse-variability weights: `weight_i = (v_i / sum(v))^-1`.
///
/// Signals whose extrema occur at more regular intervals are judged more
/// informative about periodic cardiac phase and are upweighted relative
/// to noisier signals. Variabilities are floored at [`MIN_VARIABILITY`]
/// first.
///
/// # Examples
///
/// ```
/// use ivuscore::algorithm::fusion::variability_weights;
///
/// let weights = variability_weights(&[2.0, 8.0]);
/// assert_eq!(weights, vec![5.0, 1.25]);
/// ```
pub fn variability_weights(variabilities: &[f64]) -> Vec<f64> {
    let floored: Vec<f64> = variabilities.iter().map(|v| v.max(MIN_VARIABILITY)).collect();
    let sum: f64 = floored.iter().sum();
    floored.iter().map(|v| sum / v).collect()
}

/// Per-signal fusion weights for a family of pre-smoothed signals.
///
/// Each signal is re-smoothed with `window` for extrema detection only;
/// the weight derives from the spacing variability of its own extrema.
/// Signals with fewer than 2 extrema carry no usable phase information
/// and are excluded (`None`).
pub fn fusion_weights(signals: &[Vec<f64>], window: usize, mode: ExtremaMode) -> Vec<Option<f64>> {
    let variabilities: Vec<Option<f64>> = signals
        .iter()
        .map(|signal| spacing_variability(&extrema(&smooth(signal, window), mode)))
        .collect();

    let usable: Vec<f64> = variabilities.iter().filter_map(|v| *v).collect();
    if usable.len() < variabilities.len() {
        warn!(
            "excluding {} of {} signals from fusion weighting (fewer than 2 extrema)",
            variabilities.len() - usable.len(),
            variabilities.len()
        );
    }
    if usable.is_empty() {
        return vec![None; signals.len()];
    }

    let mut weights = variability_weights(&usable).into_iter();
    variabilities
        .iter()
        .map(|v| v.map(|_| weights.next().expect("one weight per usable signal")))
        .collect()
}

/// Combines a family of pre-smoothed signals into one consensus signal.
///
/// The fused curve is the elementwise weighted sum of the input signals,
/// weighted inversely by each signal's share of the total extrema-spacing
/// variability. `window` steers the extrema detection only; the inputs
/// themselves are summed as given.
///
/// If no signal yields enough extrema to be weighted, the fuser falls
/// back to the unweighted mean of the inputs.
///
/// # Panics
///
/// Panics if the input signals differ in length.
pub fn fuse(signals: &[Vec<f64>], window: usize, mode: ExtremaMode) -> Vec<f64> {
    let Some(first) = signals.first() else {
        return Vec::new();
    };
    let n = first.len();
    assert!(
        signals.iter().all(|s| s.len() == n),
        "fused signals must share one length"
    );

    let weights = fusion_weights(signals, window, mode);
    let mut fused = vec![0.0; n];

    if weights.iter().all(|w| w.is_none()) {
        warn!("no signal produced enough extrema for weighting, falling back to unweighted mean");
        for signal in signals {
            for (acc, v) in fused.iter_mut().zip(signal) {
                *acc += v / signals.len() as f64;
            }
        }
        return fused;
    }

    for (signal, weight) in signals.iter().zip(&weights) {
        let Some(weight) = weight else { continue };
        for (acc, v) in fused.iter_mut().zip(signal) {
            *acc += weight * v;
        }
    }
    fused
}

/// Rescales one fused curve to the other's mean so both render on a
/// comparable scale.
///
/// The factor is `mean(motion) / mean(geometry)`; a factor below 1 means
/// the motion curve is the smaller one and the geometry curve is scaled
/// down to it, otherwise the motion curve is scaled instead. Exactly one
/// curve is ever touched, and only after fusion, so extrema positions
/// are unaffected.
///
/// A non-finite factor (empty input or zero geometry mean) leaves both
/// curves unchanged.
pub fn reconcile(motion: &[f64], geometry: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let factor = motion.mean() / geometry.mean();
    if !factor.is_finite() {
        return (motion.to_vec(), geometry.to_vec());
    }
    if factor < 1.0 {
        let scaled = geometry.iter().map(|v| v * factor).collect();
        (motion.to_vec(), scaled)
    } else {
        let scaled = motion.iter().map(|v| v * factor).collect();
        (scaled, geometry.to_vec())
    }
}
