// TermPix
// copyright termpix contributors 2024~2025

//! Exact area-averaging resampler.
//!
//! Downsamples the source into RGB planes at the renderer's sub-pixel
//! resolution. Every output pixel is the integer mean of a source
//! rectangle [x0,x1) x [y0,y1) obtained from a floor/ceil column and row
//! mapping, so the result is the true box average rather than a point
//! sample.
//!
//! The work is split into three parallel phases:
//! 1. planarize: split interleaved RGB into one byte plane per channel
//!    (row tiles);
//! 2. horizontal accumulate: per source row, sum each output column's
//!    span. Output columns sharing a span length are grouped into runs so
//!    the inner loop has a constant bound and can sum two columns at a
//!    time (row tiles);
//! 3. vertical accumulate: sum the horizontal sums over each output row's
//!    span and divide by the box area (output row tiles).
//!
//! Sharing the horizontal sums across all output rows that map to the
//! same source rows is what makes this cheaper than summing a rectangle
//! per output pixel.

use crate::convert::{is_cancelled, report, StageProgress};
use crate::raw::RawImage;
use itertools::Itertools;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Rows per parallel tile in the planarize and accumulate phases.
const TILE_ROWS: usize = 64;

/// High resolution intermediate: one i32 plane per channel in
/// structure-of-arrays layout, values in 0..=255, width * height entries
/// each.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RgbPlanes {
    pub width: usize,
    pub height: usize,
    pub r: Vec<i32>,
    pub g: Vec<i32>,
    pub b: Vec<i32>,
}

impl RgbPlanes {
    pub fn new(width: usize, height: usize) -> Self {
        let n = width * height;
        Self {
            width,
            height,
            r: vec![0; n],
            g: vec![0; n],
            b: vec![0; n],
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Maximal range of output columns whose source span length is `len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    start: usize,
    end: usize,
    len: usize,
}

/// floor/ceil source span per output index, clamped to [0, src].
fn box_spans(src: usize, out: usize) -> (Vec<usize>, Vec<usize>) {
    let mut lo = vec![0usize; out];
    let mut hi = vec![0usize; out];
    for b in 0..out {
        let x0 = (b as f64 * src as f64 / out as f64).floor() as usize;
        let x1 = ((b + 1) as f64 * src as f64 / out as f64).ceil() as usize;
        lo[b] = x0.min(src);
        hi[b] = x1.min(src);
    }
    (lo, hi)
}

fn span_runs(x0s: &[usize], x1s: &[usize]) -> Vec<Run> {
    let mut runs = Vec::new();
    for (len, mut group) in &(0..x0s.len()).chunk_by(|&bx| x1s[bx] - x0s[bx]) {
        let start = group.next().unwrap();
        let end = group.last().unwrap_or(start) + 1;
        runs.push(Run { start, end, len });
    }
    runs
}

#[inline]
fn sum_u8(row: &[u8]) -> u32 {
    row.iter().map(|&v| u32::from(v)).sum()
}

/// Splits the interleaved source into one byte plane per channel.
fn planarize(
    img: &RawImage,
    progress: StageProgress,
    cancel: Option<&AtomicBool>,
) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let (w, h, ch) = (img.width, img.height, img.channels);
    let mut pr = vec![0u8; w * h];
    let mut pg = vec![0u8; w * h];
    let mut pb = vec![0u8; w * h];

    let tile = TILE_ROWS.min(h).max(1);
    let chunks = h.div_ceil(tile);
    let completed = AtomicUsize::new(0);

    pr.par_chunks_mut(tile * w)
        .zip(pg.par_chunks_mut(tile * w))
        .zip(pb.par_chunks_mut(tile * w))
        .enumerate()
        .for_each(|(c, ((tr, tg), tb))| {
            if is_cancelled(cancel) {
                return;
            }
            let y0 = c * tile;
            let rows = tr.len() / w;
            for dy in 0..rows {
                let src = &img.data[(y0 + dy) * w * ch..][..w * ch];
                let dst_r = &mut tr[dy * w..dy * w + w];
                let dst_g = &mut tg[dy * w..dy * w + w];
                let dst_b = &mut tb[dy * w..dy * w + w];
                for x in 0..w {
                    dst_r[x] = src[x * ch];
                    dst_g[x] = src[x * ch + 1];
                    dst_b[x] = src[x * ch + 2];
                }
            }
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            report(progress, done as f64 / chunks as f64);
        });

    (pr, pg, pb)
}

/// Per source row, sums each output column's source span. The run loop
/// keeps the summation length constant and handles two columns per
/// iteration to give the optimizer independent accumulator chains.
#[allow(clippy::too_many_arguments)]
fn horizontal_box_sum(
    pr: &[u8],
    pg: &[u8],
    pb: &[u8],
    w: usize,
    h: usize,
    out_w: usize,
    x0s: &[usize],
    runs: &[Run],
    progress: StageProgress,
    cancel: Option<&AtomicBool>,
) -> (Vec<u32>, Vec<u32>, Vec<u32>) {
    let mut hr = vec![0u32; h * out_w];
    let mut hg = vec![0u32; h * out_w];
    let mut hb = vec![0u32; h * out_w];

    let tile = TILE_ROWS.min(h).max(1);
    let chunks = h.div_ceil(tile);
    let completed = AtomicUsize::new(0);

    hr.par_chunks_mut(tile * out_w)
        .zip(hg.par_chunks_mut(tile * out_w))
        .zip(hb.par_chunks_mut(tile * out_w))
        .enumerate()
        .for_each(|(c, ((tr, tg), tb))| {
            if is_cancelled(cancel) {
                return;
            }
            let y0 = c * tile;
            let rows = tr.len() / out_w;
            for dy in 0..rows {
                let y = y0 + dy;
                let row_r = &pr[y * w..y * w + w];
                let row_g = &pg[y * w..y * w + w];
                let row_b = &pb[y * w..y * w + w];
                let dst_r = &mut tr[dy * out_w..dy * out_w + out_w];
                let dst_g = &mut tg[dy * out_w..dy * out_w + out_w];
                let dst_b = &mut tb[dy * out_w..dy * out_w + out_w];
                for run in runs {
                    let len = run.len;
                    let mut bx = run.start;
                    while bx + 1 < run.end {
                        let (a0, a1) = (x0s[bx], x0s[bx + 1]);
                        dst_r[bx] = sum_u8(&row_r[a0..a0 + len]);
                        dst_r[bx + 1] = sum_u8(&row_r[a1..a1 + len]);
                        dst_g[bx] = sum_u8(&row_g[a0..a0 + len]);
                        dst_g[bx + 1] = sum_u8(&row_g[a1..a1 + len]);
                        dst_b[bx] = sum_u8(&row_b[a0..a0 + len]);
                        dst_b[bx + 1] = sum_u8(&row_b[a1..a1 + len]);
                        bx += 2;
                    }
                    if bx < run.end {
                        let a0 = x0s[bx];
                        dst_r[bx] = sum_u8(&row_r[a0..a0 + len]);
                        dst_g[bx] = sum_u8(&row_g[a0..a0 + len]);
                        dst_b[bx] = sum_u8(&row_b[a0..a0 + len]);
                    }
                }
            }
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            report(progress, done as f64 / chunks as f64);
        });

    (hr, hg, hb)
}

/// Area-averages the source into out_w x out_h planes. Returns zero-sized
/// planes when the input is invalid or any dimension is zero; never
/// fails otherwise.
pub fn resample(
    img: &RawImage,
    out_w: usize,
    out_h: usize,
    progress: StageProgress,
    cancel: Option<&AtomicBool>,
) -> RgbPlanes {
    if !img.valid || img.width == 0 || img.height == 0 || out_w == 0 || out_h == 0 {
        return RgbPlanes::empty();
    }
    let mut out = RgbPlanes::new(out_w, out_h);

    report(progress, 0.05);
    let (x0s, x1s) = box_spans(img.width, out_w);
    let runs = span_runs(&x0s, &x1s);
    let (y0s, y1s) = box_spans(img.height, out_h);

    let planarize_cb = |p: f64| report(progress, 0.05 + 0.1 * p);
    let (pr, pg, pb) = planarize(img, Some(&planarize_cb), cancel);

    let horizontal_cb = |p: f64| report(progress, 0.15 + 0.15 * p);
    let (hr, hg, hb) = horizontal_box_sum(
        &pr,
        &pg,
        &pb,
        img.width,
        img.height,
        out_w,
        &x0s,
        &runs,
        Some(&horizontal_cb),
        cancel,
    );
    report(progress, 0.3);

    let tile = TILE_ROWS.min(out_h).max(1);
    let chunks = out_h.div_ceil(tile);
    let completed = AtomicUsize::new(0);

    out.r
        .par_chunks_mut(tile * out_w)
        .zip(out.g.par_chunks_mut(tile * out_w))
        .zip(out.b.par_chunks_mut(tile * out_w))
        .enumerate()
        .for_each(|(c, ((tr, tg), tb))| {
            if is_cancelled(cancel) {
                return;
            }
            let by0 = c * tile;
            let rows = tr.len() / out_w;
            for dy in 0..rows {
                let by = by0 + dy;
                let (y0, y1) = (y0s[by], y1s[by]);
                for bx in 0..out_w {
                    // Degenerate spans sum nothing; the guard keeps the
                    // division defined and the output zero.
                    let mut count = ((x1s[bx] - x0s[bx]) * (y1 - y0)) as u64;
                    if count == 0 {
                        count = 1;
                    }
                    let (mut rsum, mut gsum, mut bsum) = (0u64, 0u64, 0u64);
                    for sy in y0..y1 {
                        let idx = sy * out_w + bx;
                        rsum += u64::from(hr[idx]);
                        gsum += u64::from(hg[idx]);
                        bsum += u64::from(hb[idx]);
                    }
                    tr[dy * out_w + bx] = (rsum / count) as i32;
                    tg[dy * out_w + bx] = (gsum / count) as i32;
                    tb[dy * out_w + bx] = (bsum / count) as i32;
                }
            }
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            report(progress, 0.3 + 0.7 * done as f64 / chunks as f64);
        });

    out
}
