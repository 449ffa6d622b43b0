use statrs::statistics::Statistics;

/// Selects which extrema of a smoothed signal feed the consensus
/// weighting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExtremaMode {
    /// Local maxima only. Used for the motion family, whose minima carry
    /// little phase information.
    MaximaOnly,
    /// Sorted union of local maxima and minima.
    All,
}

/// Indices of samples strictly greater than both neighbors.
///
/// Boundary samples have only one neighbor and are never extrema.
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    neighbor_extrema(signal, |center, neighbor| center > neighbor)
}

/// Indices of samples strictly smaller than both neighbors.
pub fn local_minima(signal: &[f64]) -> Vec<usize> {
    neighbor_extrema(signal, |center, neighbor| center < neighbor)
}

/// Extrema indices of `signal` under `mode`, strictly increasing.
///
/// Flat plateaus and signals shorter than 3 samples yield an empty set;
/// consumers are expected to tolerate this.
pub fn extrema(signal: &[f64], mode: ExtremaMode) -> Vec<usize> {
    match mode {
        ExtremaMode::MaximaOnly => local_maxima(signal),
        ExtremaMode::All => {
            itertools::merge(local_maxima(signal), local_minima(signal)).collect()
        }
    }
}

/// Population standard deviation of the spacing between consecutive
/// extrema indices.
///
/// This is the irregularity measure behind the fusion weights: a
/// perfectly periodic signal has variability 0, noisy signals spread
/// their extrema and score higher. Fewer than 2 extrema leave no spacing
/// to measure and return `None`.
pub fn spacing_variability(extrema: &[usize]) -> Option<f64> {
    if extrema.len() < 2 {
        return None;
    }
    let spacings: Vec<f64> = extrema.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    Some(spacings.population_std_dev())
}

fn neighbor_extrema(signal: &[f64], dominates: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    if signal.len() < 3 {
        return Vec::new();
    }
    (1..signal.len() - 1)
        .filter(|&k| dominates(signal[k], signal[k - 1]) && dominates(signal[k], signal[k + 1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_signal() {
        let signal = [0.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(local_maxima(&signal), vec![1, 3]);
        assert_eq!(local_minima(&signal), vec![2]);
        assert_eq!(extrema(&signal, ExtremaMode::MaximaOnly), vec![1, 3]);
        assert_eq!(extrema(&signal, ExtremaMode::All), vec![1, 2, 3]);
    }

    #[test]
    fn test_boundaries_are_never_extrema() {
        // largest and smallest values sit on the boundary
        let signal = [5.0, 1.0, 2.0, 0.0, 9.0];
        assert_eq!(local_maxima(&signal), vec![2]);
        assert_eq!(local_minima(&signal), vec![1, 3]);
    }

    #[test]
    fn test_degenerate_signals() {
        assert!(extrema(&[1.0, 2.0], ExtremaMode::All).is_empty());
        assert!(extrema(&[3.0; 10], ExtremaMode::All).is_empty());
        // plateau maxima are not strict and do not count
        assert!(local_maxima(&[0.0, 1.0, 1.0, 0.0]).is_empty());
    }

    #[test]
    fn test_spacing_variability() {
        // evenly spaced extrema: zero variability
        assert_eq!(spacing_variability(&[2, 7, 12, 17]), Some(0.0));

        // spacings 3 and 7: population std dev is 2
        assert_eq!(spacing_variability(&[0, 3, 10]), Some(2.0));

        // too few extrema to measure spacing
        assert_eq!(spacing_variability(&[4]), None);
        assert_eq!(spacing_variability(&[]), None);
    }
}
