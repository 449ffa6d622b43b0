/// Normalizes a raw per-frame signal to a probability-mass-like scale.
///
/// The minimum is shifted to 0 and the shifted values are divided by
/// their sum, so the result satisfies `min == 0` and `sum == 1` for any
/// non-constant input. Raw signals have no unit of their own and only
/// become comparable after this step.
///
/// A constant or empty signal has no spread to normalize and maps to all
/// zeros instead of propagating NaN.
pub fn normalize(signal: &[f64]) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let min = signal.iter().cloned().fold(f64::INFINITY, f64::min);
    let shifted: Vec<f64> = signal.iter().map(|v| v - min).collect();
    let sum: f64 = shifted.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return vec![0.0; signal.len()];
    }
    shifted.iter().map(|v| v / sum).collect()
}

/// Centered moving average with same-length output.
///
/// Matches a same-mode convolution with a uniform kernel of `window`
/// samples: the first and last `window / 2` outputs are averaged against
/// an implicit zero boundary and are therefore less reliable. Even
/// windows sit half a sample to the left of center, as the convolution
/// does.
///
/// A `window` of 0 (or an empty signal) returns the input unchanged.
pub fn smooth(signal: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || signal.is_empty() {
        return signal.to_vec();
    }
    let n = signal.len() as isize;
    let w = window as isize;
    let offset = (w - 1) / 2;
    let scale = 1.0 / window as f64;

    (0..n)
        .map(|i| {
            let lo = (i + offset - w + 1).max(0);
            let hi = (i + offset).min(n - 1);
            let mut acc = 0.0;
            for j in lo..=hi {
                acc += signal[j as usize];
            }
            acc * scale
        })
        .collect()
}
