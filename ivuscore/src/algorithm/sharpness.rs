use std::sync::Arc;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::data::frame::PullbackFrame;

/// Fraction of the sorted magnitude spectrum averaged into the
/// sharpness score.
const TOP_FRACTION: f64 = 0.1;

/// Spectral sharpness proxy per frame: the mean of the top 10% largest
/// magnitudes of the frame's 2-D Fourier spectrum.
///
/// Sharper frames concentrate more energy in high spatial frequencies,
/// and cardiac motion blurs frames cyclically, so this score doubles as
/// a weak periodic phase signal. The score is deterministic and needs no
/// training.
///
/// All frames must share the dimensions of the first one; the FFT plans
/// are built once and shared across the parallel per-frame evaluation.
pub fn spectral_blur_scores(frames: &[PullbackFrame]) -> Vec<f64> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    if first.rows == 0 || first.cols == 0 {
        return vec![0.0; frames.len()];
    }

    let mut planner = FftPlanner::new();
    let row_fft = planner.plan_fft_forward(first.cols);
    let col_fft = planner.plan_fft_forward(first.rows);

    frames
        .par_iter()
        .map(|frame| frame_score(frame, &row_fft, &col_fft))
        .collect()
}

fn frame_score(
    frame: &PullbackFrame,
    row_fft: &Arc<dyn Fft<f64>>,
    col_fft: &Arc<dyn Fft<f64>>,
) -> f64 {
    let rows = frame.rows;
    let cols = frame.cols;
    debug_assert_eq!(cols, row_fft.len(), "frame width must match the row plan");
    debug_assert_eq!(rows, col_fft.len(), "frame height must match the column plan");

    let mut spectrum: Vec<Complex<f64>> =
        frame.pixels.iter().map(|&p| Complex::new(p, 0.0)).collect();

    // 2-D transform: rows first, then columns through a scratch buffer
    for row in spectrum.chunks_exact_mut(cols) {
        row_fft.process(row);
    }
    let mut column = vec![Complex::new(0.0, 0.0); rows];
    for c in 0..cols {
        for r in 0..rows {
            column[r] = spectrum[r * cols + c];
        }
        col_fft.process(&mut column);
        for r in 0..rows {
            spectrum[r * cols + c] = column[r];
        }
    }

    let mut magnitudes: Vec<f64> = spectrum.iter().map(|v| v.norm()).collect();
    magnitudes.sort_unstable_by_key(|&m| OrderedFloat(m));

    let start = ((1.0 - TOP_FRACTION) * magnitudes.len() as f64) as usize;
    let top = &magnitudes[start..];
    if top.is_empty() {
        return 0.0;
    }
    top.iter().sum::<f64>() / top.len() as f64
}
