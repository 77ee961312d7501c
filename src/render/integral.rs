// TermPix
// copyright termpix contributors 2024~2025

//! Integral images over the resampled planes: six (W+1)x(H+1) prefix-sum
//! grids holding the running totals of R, G, B and their squares. Any
//! rectangle's sum (and sum of squares) then costs four lookups, which is
//! what lets the glyph matcher evaluate every candidate footprint in
//! constant time.
//!
//! The build is a single sequential pass; the row-to-row dependency makes
//! it a poor fit for the thread pool, so parallelism is spent in the
//! renderer instead.

use crate::convert::{report, StageProgress};
use crate::resample::RgbPlanes;

/// Channel indices into the sum tables.
pub const R: usize = 0;
pub const G: usize = 1;
pub const B: usize = 2;

pub struct Integrals {
    /// plane width (grids are one row and column larger)
    pub width: usize,
    pub height: usize,
    stride: usize,
    sums: [Vec<u64>; 3],
    squares: [Vec<u64>; 3],
}

impl Integrals {
    /// Builds all six grids in one pass over the planes. The zeroth row
    /// and column stay zero so rectangle queries need no edge cases.
    pub fn build(planes: &RgbPlanes, progress: StageProgress) -> Self {
        let (w, h) = (planes.width, planes.height);
        let stride = w + 1;
        let n = stride * (h + 1);
        let mut sums = [vec![0u64; n], vec![0u64; n], vec![0u64; n]];
        let mut squares = [vec![0u64; n], vec![0u64; n], vec![0u64; n]];

        let channels = [&planes.r, &planes.g, &planes.b];
        for y in 0..h {
            let mut row = [0u64; 3];
            let mut row_sq = [0u64; 3];
            for x in 0..w {
                let ii = (y + 1) * stride + (x + 1);
                let ii_up = y * stride + (x + 1);
                for ch in 0..3 {
                    let v = channels[ch][y * w + x] as u64;
                    row[ch] += v;
                    row_sq[ch] += v * v;
                    sums[ch][ii] = sums[ch][ii_up] + row[ch];
                    squares[ch][ii] = squares[ch][ii_up] + row_sq[ch];
                }
            }
            if y % 64 == 0 {
                report(progress, y as f64 / h as f64);
            }
        }
        report(progress, 1.0);

        Self {
            width: w,
            height: h,
            stride,
            sums,
            squares,
        }
    }

    #[inline]
    fn rect_in(&self, grid: &[u64], x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        grid[y1 * self.stride + x1] + grid[y0 * self.stride + x0]
            - grid[y0 * self.stride + x1]
            - grid[y1 * self.stride + x0]
    }

    /// Sum of channel `ch` over the half-open rectangle [x0,x1) x [y0,y1).
    #[inline]
    pub fn sum(&self, ch: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        self.rect_in(&self.sums[ch], x0, y0, x1, y1)
    }

    /// Sum of squared channel values over the same rectangle.
    #[inline]
    pub fn square_sum(&self, ch: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        self.rect_in(&self.squares[ch], x0, y0, x1, y1)
    }
}
