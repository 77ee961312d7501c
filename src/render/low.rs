// TermPix
// copyright termpix contributors 2024~2025

//! Low-quality renderer: one background-colored space per cell. The mean
//! is summed straight from the planes; at 64 sub-pixels per cell the
//! integral machinery would cost more than it saves.

use crate::asset::{Cell, ImageAsset, Rgb};
use crate::convert::{is_cancelled, report, StageProgress};
use crate::resample::RgbPlanes;
use crate::CELL;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn render_low(
    planes: &RgbPlanes,
    out_w: usize,
    out_h: usize,
    progress: StageProgress,
    cancel: Option<&AtomicBool>,
) -> ImageAsset {
    if out_w == 0 || out_h == 0 || planes.width < out_w * CELL || planes.height < out_h * CELL {
        return ImageAsset::new(0, 0);
    }

    let mut asset = ImageAsset::new(out_w, out_h);
    let completed = AtomicUsize::new(0);
    let high_w = planes.width;

    asset
        .cells
        .par_chunks_mut(out_w)
        .enumerate()
        .for_each(|(by, row)| {
            if is_cancelled(cancel) {
                return;
            }
            for (bx, cell) in row.iter_mut().enumerate() {
                let (mut rsum, mut gsum, mut bsum) = (0i64, 0i64, 0i64);
                for dy in 0..CELL {
                    let sy = by * CELL + dy;
                    for dx in 0..CELL {
                        let idx = sy * high_w + bx * CELL + dx;
                        rsum += i64::from(planes.r[idx]);
                        gsum += i64::from(planes.g[idx]);
                        bsum += i64::from(planes.b[idx]);
                    }
                }
                let count = (CELL * CELL) as i64;
                *cell = Cell {
                    symbol: " ".to_string(),
                    fg: Rgb::new(0, 0, 0),
                    bg: Rgb::new(
                        (rsum / count) as u8,
                        (gsum / count) as u8,
                        (bsum / count) as u8,
                    ),
                };
            }
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            report(progress, done as f64 / out_h as f64);
        });

    asset
}
