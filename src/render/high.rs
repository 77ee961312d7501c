// TermPix
// copyright termpix contributors 2024~2025

//! High-quality renderer: per cell, evaluates every candidate glyph and
//! keeps the one whose two-color repaint has the least summed squared
//! error against the 8x8 source block.
//!
//! For a fixed foreground mask the best repaint uses each partition's
//! mean, and the residual is
//!     sum(v^2) - (sum fg)^2 / |fg| - (sum bg)^2 / |bg|
//! per channel, all of which the integral images deliver in constant
//! time. Glyphs whose two means are nearly equal carry no visible
//! structure and are pruned before the error math.

use crate::asset::{Cell, ImageAsset, Rgb};
use crate::convert::{is_cancelled, report, StageProgress};
use crate::render::glyph::GLYPHS;
use crate::render::integral::Integrals;
use crate::resample::RgbPlanes;
use crate::CELL;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// One channel's residual; a partition with no pixels contributes no term.
#[inline]
fn channel_err(total_sq: u64, total: u64, fg: u64, fg_cnt: u64, bg_cnt: u64) -> f64 {
    let mut err = total_sq as f64;
    if fg_cnt > 0 {
        err -= (fg as f64) * (fg as f64) / fg_cnt as f64;
    }
    if bg_cnt > 0 {
        let bg = (total - fg) as f64;
        err -= bg * bg / bg_cnt as f64;
    }
    err
}

/// Picks the best glyph for the cell at (bx, by). Returns the finished
/// cell and its error; when every candidate is pruned the cell falls back
/// to a black space and the error stays at the sentinel maximum.
pub(crate) fn evaluate_cell(
    ii: &Integrals,
    bx: usize,
    by: usize,
    prune_threshold: i32,
) -> (Cell, f64) {
    let x0c = bx * CELL;
    let y0c = by * CELL;
    let (x1c, y1c) = (x0c + CELL, y0c + CELL);
    let tot = (CELL * CELL) as u64;

    let mut total = [0u64; 3];
    let mut total_sq = [0u64; 3];
    for ch in 0..3 {
        total[ch] = ii.sum(ch, x0c, y0c, x1c, y1c);
        total_sq[ch] = ii.square_sum(ch, x0c, y0c, x1c, y1c);
    }

    let mut best_err = f64::MAX;
    let mut best = Cell::default();

    for glyph in GLYPHS.iter() {
        let (fx0, fy0, fx1, fy1) = glyph.kind.fg_rect();
        let fg_cnt = glyph.kind.fg_count();
        let bg_cnt = tot - fg_cnt;

        let mut fg = [0u64; 3];
        if fg_cnt > 0 {
            for ch in 0..3 {
                fg[ch] = ii.sum(ch, x0c + fx0, y0c + fy0, x0c + fx1, y0c + fy1);
            }
        }

        let mut fg_mean = [0u8; 3];
        let mut bg_mean = [0u8; 3];
        for ch in 0..3 {
            if fg_cnt > 0 {
                fg_mean[ch] = (fg[ch] / fg_cnt) as u8;
            }
            if bg_cnt > 0 {
                bg_mean[ch] = ((total[ch] - fg[ch]) / bg_cnt) as u8;
            }
        }

        // A glyph whose two colors nearly coincide renders as a smudge;
        // drop it before spending the error math on it.
        let color_diff: i32 = (0..3)
            .map(|ch| (i32::from(fg_mean[ch]) - i32::from(bg_mean[ch])).abs())
            .sum();
        if color_diff < prune_threshold {
            continue;
        }

        let mut err = 0.0;
        for ch in 0..3 {
            err += channel_err(total_sq[ch], total[ch], fg[ch], fg_cnt, bg_cnt);
        }

        if err < best_err {
            best_err = err;
            best = Cell {
                symbol: glyph.code.to_string(),
                fg: Rgb::new(fg_mean[0], fg_mean[1], fg_mean[2]),
                bg: Rgb::new(bg_mean[0], bg_mean[1], bg_mean[2]),
            };
        }
    }

    (best, best_err)
}

/// Glyph-matches the planes into an out_w x out_h cell asset. The planes
/// must cover the full 8x cell grid; anything smaller yields an empty
/// asset rather than a panic.
pub fn render_high(
    planes: &RgbPlanes,
    out_w: usize,
    out_h: usize,
    prune_threshold: i32,
    progress: StageProgress,
    cancel: Option<&AtomicBool>,
) -> ImageAsset {
    if out_w == 0 || out_h == 0 || planes.width < out_w * CELL || planes.height < out_h * CELL {
        return ImageAsset::new(0, 0);
    }

    report(progress, 0.01);
    let integral_cb = |p: f64| report(progress, 0.01 + 0.14 * p);
    let ii = Integrals::build(planes, Some(&integral_cb));

    let mut asset = ImageAsset::new(out_w, out_h);
    let completed = AtomicUsize::new(0);

    asset
        .cells
        .par_chunks_mut(out_w)
        .enumerate()
        .for_each(|(by, row)| {
            if is_cancelled(cancel) {
                return;
            }
            for (bx, cell) in row.iter_mut().enumerate() {
                *cell = evaluate_cell(&ii, bx, by, prune_threshold).0;
            }
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            report(progress, 0.15 + 0.85 * done as f64 / out_h as f64);
        });

    asset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::glyph::GlyphKind;

    fn planes_from(f: impl Fn(usize, usize) -> [i32; 3], w: usize, h: usize) -> RgbPlanes {
        let mut planes = RgbPlanes::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let [r, g, b] = f(x, y);
                planes.r[y * w + x] = r;
                planes.g[y * w + x] = g;
                planes.b[y * w + x] = b;
            }
        }
        planes
    }

    #[test]
    fn uniform_cell_keeps_the_full_block() {
        let planes = planes_from(|_, _| [200, 100, 50], 8, 8);
        let ii = Integrals::build(&planes, None);
        let (cell, err) = evaluate_cell(&ii, 0, 0, 24);
        assert_eq!(cell.symbol, "█");
        assert_eq!(cell.fg, Rgb::new(200, 100, 50));
        assert_eq!(cell.bg, Rgb::new(0, 0, 0));
        assert_eq!(err, 0.0);
    }

    #[test]
    fn horizontal_split_selects_the_half_bar() {
        // top half blue, bottom half red
        let planes = planes_from(
            |_, y| if y < 4 { [0, 0, 255] } else { [255, 0, 0] },
            8,
            8,
        );
        let ii = Integrals::build(&planes, None);
        let (cell, err) = evaluate_cell(&ii, 0, 0, 24);
        assert_eq!(cell.symbol, "▄");
        assert_eq!(cell.fg, Rgb::new(255, 0, 0));
        assert_eq!(cell.bg, Rgb::new(0, 0, 255));
        assert_eq!(err, 0.0);
    }

    #[test]
    fn vertical_split_selects_the_half_bar() {
        // left half green, right half black
        let planes = planes_from(
            |x, _| if x < 4 { [0, 255, 0] } else { [0, 0, 0] },
            8,
            8,
        );
        let ii = Integrals::build(&planes, None);
        let (cell, err) = evaluate_cell(&ii, 0, 0, 24);
        assert_eq!(cell.symbol, "▌");
        assert_eq!(cell.fg, Rgb::new(0, 255, 0));
        assert_eq!(cell.bg, Rgb::new(0, 0, 0));
        assert_eq!(err, 0.0);
    }

    #[test]
    fn quadrant_cell_selects_the_quadrant() {
        let q3 = GlyphKind::Quadrant(3).fg_rect();
        let planes = planes_from(
            |x, y| {
                if x >= q3.0 && x < q3.2 && y >= q3.1 && y < q3.3 {
                    [250, 250, 0]
                } else {
                    [0, 0, 0]
                }
            },
            8,
            8,
        );
        let ii = Integrals::build(&planes, None);
        let (cell, err) = evaluate_cell(&ii, 0, 0, 24);
        assert_eq!(cell.symbol, "▞");
        assert_eq!(cell.fg, Rgb::new(250, 250, 0));
        assert_eq!(err, 0.0);
    }

    #[test]
    fn all_pruned_cell_falls_back_to_black_space() {
        let planes = planes_from(|_, _| [0, 0, 0], 8, 8);
        let ii = Integrals::build(&planes, None);
        let (cell, err) = evaluate_cell(&ii, 0, 0, 24);
        assert_eq!(cell.symbol, " ");
        assert_eq!(cell.fg, Rgb::new(0, 0, 0));
        assert_eq!(cell.bg, Rgb::new(0, 0, 0));
        assert_eq!(err, f64::MAX);
    }

    #[test]
    fn best_error_never_exceeds_the_single_mean_ceiling() {
        // busy deterministic pattern over a 4x3 cell grid, no pruning
        let (w, h) = (32, 24);
        let planes = planes_from(
            |x, y| {
                [
                    ((x * 31 + y * 17) % 256) as i32,
                    ((x * 11 + y * 41 + 7) % 256) as i32,
                    ((x * 5 + y * 3 + 101) % 256) as i32,
                ]
            },
            w,
            h,
        );
        let ii = Integrals::build(&planes, None);
        let tot = (CELL * CELL) as f64;
        for by in 0..3 {
            for bx in 0..4 {
                let (_, err) = evaluate_cell(&ii, bx, by, 0);
                let (x0, y0) = (bx * CELL, by * CELL);
                let mut ceiling = 0.0;
                for ch in 0..3 {
                    let s = ii.sum(ch, x0, y0, x0 + CELL, y0 + CELL) as f64;
                    let s2 = ii.square_sum(ch, x0, y0, x0 + CELL, y0 + CELL) as f64;
                    ceiling += s2 - s * s / tot;
                }
                assert!(err <= ceiling + 1e-6, "err {} > ceiling {}", err, ceiling);
            }
        }
    }

    #[test]
    fn undersized_planes_yield_an_empty_asset() {
        let planes = RgbPlanes::new(8, 8);
        let asset = render_high(&planes, 2, 1, 24, None, None);
        assert!(asset.cells.is_empty());
    }
}
