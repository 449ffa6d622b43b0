use std::fmt;
use std::fmt::Formatter;

use serde::{Deserialize, Serialize};

/// Rectangular crop applied to every frame before signal extraction.
///
/// Bounds are half-open pixel index ranges. The default selects the
/// 400 x 400 central region of a 500 x 500 IVUS acquisition, which
/// removes the catheter ring-down artefacts and the overlay margins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Default for CropRegion {
    fn default() -> Self {
        CropRegion {
            row_start: 50,
            row_end: 450,
            col_start: 50,
            col_end: 450,
        }
    }
}

impl CropRegion {
    /// Creates a new `CropRegion` from half-open row and column ranges.
    pub fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        CropRegion {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }
}

/// A single grayscale pullback frame with pixels stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PullbackFrame {
    pub frame_number: u32,
    pub rows: usize,
    pub cols: usize,
    pub pixels: Vec<f64>,
}

impl PullbackFrame {
    /// Creates a new `PullbackFrame`.
    ///
    /// # Arguments
    ///
    /// * `frame_number` - 1-based acquisition number of the frame.
    /// * `rows` - number of pixel rows.
    /// * `cols` - number of pixel columns.
    /// * `pixels` - row-major grayscale values of length `rows * cols`.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != rows * cols`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ivuscore::data::frame::PullbackFrame;
    ///
    /// let frame = PullbackFrame::new(1, 2, 2, vec![0.0, 1.0, 2.0, 3.0]);
    /// assert_eq!(frame.pixels.len(), 4);
    /// ```
    pub fn new(frame_number: u32, rows: usize, cols: usize, pixels: Vec<f64>) -> Self {
        assert_eq!(
            pixels.len(),
            rows * cols,
            "pixel buffer does not match frame dimensions"
        );
        PullbackFrame {
            frame_number,
            rows,
            cols,
            pixels,
        }
    }

    /// Pixel value at `(row, col)`.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> f64 {
        self.pixels[row * self.cols + col]
    }

    /// Returns the frame restricted to `region`.
    ///
    /// The region is clamped to the frame bounds, so frames smaller than
    /// the configured crop stay usable.
    pub fn crop(&self, region: &CropRegion) -> PullbackFrame {
        let row_end = region.row_end.min(self.rows);
        let col_end = region.col_end.min(self.cols);
        let row_start = region.row_start.min(row_end);
        let col_start = region.col_start.min(col_end);

        let mut pixels = Vec::with_capacity((row_end - row_start) * (col_end - col_start));
        for row in row_start..row_end {
            let offset = row * self.cols;
            pixels.extend_from_slice(&self.pixels[offset + col_start..offset + col_end]);
        }
        PullbackFrame {
            frame_number: self.frame_number,
            rows: row_end - row_start,
            cols: col_end - col_start,
            pixels,
        }
    }
}

impl fmt::Display for PullbackFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PullbackFrame(frame: {}, size: {}x{})",
            self.frame_number, self.rows, self.cols
        )
    }
}
