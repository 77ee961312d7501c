// TermPix
// copyright termpix contributors 2024~2025

//! Conversion driver. Wires the resampler to one of the two renderers,
//! weights their work for progress reporting and polls the cooperative
//! cancel flag between phases. Options are passed per call; the crate
//! keeps no process-wide state.

use crate::asset::ImageAsset;
use crate::raw::RawImage;
use crate::render::{render_high, render_low};
use crate::resample::resample;
use crate::CELL;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whole-conversion progress callback: (completed work, total work, stage).
/// Stage is one of "Resampling" and "Rendering".
pub type ProgressCb = Box<dyn Fn(f64, f64, &str) + Send + Sync>;

/// In-stage progress callback, 0.0..=1.0. Shared with worker threads.
pub type StageProgress<'a> = Option<&'a (dyn Fn(f64) + Sync)>;

pub(crate) fn report(progress: StageProgress, p: f64) {
    if let Some(cb) = progress {
        cb(p);
    }
}

pub(crate) fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.map_or(false, |c| c.load(Ordering::Relaxed))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    Low,
    #[default]
    High,
}

/// Per-call conversion options.
pub struct Options {
    /// output width in cells
    pub target_width: usize,
    /// output height in cells
    pub target_height: usize,
    pub quality: Quality,
    /// glyphs whose fg/bg means differ by less than this channel sum are
    /// skipped by the high-quality renderer
    pub prune_threshold: i32,
    pub on_progress: Option<ProgressCb>,
    /// cooperative cancellation, polled between phases and per row
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            target_width: 120,
            target_height: 80,
            quality: Quality::High,
            prune_threshold: 24,
            on_progress: None,
            cancel: None,
        }
    }
}

/// Converts a decoded image into a cell asset of target_width x
/// target_height cells. Invalid input or cancellation yields an empty
/// asset; the function itself never fails.
pub fn convert(img: &RawImage, opts: &Options) -> ImageAsset {
    if !img.valid {
        return ImageAsset::new(0, 0);
    }

    // Work units per stage: resampling scales with the source pixel count,
    // rendering with the target cell count and the quality mode.
    let source_work = (img.width * img.height) as f64 / 250.0;
    let render_work = (opts.target_width * opts.target_height) as f64
        * match opts.quality {
            Quality::High => 5.0,
            Quality::Low => 0.5,
        };
    let total_work = source_work + render_work;

    let stage_report = |completion: f64, stage: &str| {
        if let Some(cb) = &opts.on_progress {
            let (base, scale) = if stage == "Resampling" {
                (0.0, source_work)
            } else {
                (source_work, render_work)
            };
            cb(base + completion * scale, total_work, stage);
        }
    };

    let cancel = opts.cancel.as_deref();
    let high_w = opts.target_width * CELL;
    let high_h = opts.target_height * CELL;

    let planes = resample(
        img,
        high_w,
        high_h,
        Some(&|p| stage_report(p, "Resampling")),
        cancel,
    );
    if is_cancelled(cancel) {
        return ImageAsset::new(0, 0);
    }

    let asset = match opts.quality {
        Quality::High => render_high(
            &planes,
            opts.target_width,
            opts.target_height,
            opts.prune_threshold,
            Some(&|p| stage_report(p, "Rendering")),
            cancel,
        ),
        Quality::Low => render_low(
            &planes,
            opts.target_width,
            opts.target_height,
            Some(&|p| stage_report(p, "Rendering")),
            cancel,
        ),
    };
    if is_cancelled(cancel) {
        return ImageAsset::new(0, 0);
    }
    asset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_yields_empty_asset() {
        let asset = convert(&RawImage::invalid(), &Options::default());
        assert_eq!((asset.width, asset.height), (0, 0));
        assert!(asset.cells.is_empty());
    }

    #[test]
    fn zero_target_yields_empty_asset() {
        let img = RawImage::from_rgb(4, 4, vec![10u8; 48]);
        let opts = Options {
            target_width: 0,
            target_height: 3,
            ..Options::default()
        };
        let asset = convert(&img, &opts);
        assert!(asset.cells.is_empty());
    }

    #[test]
    fn pre_set_cancel_flag_yields_empty_asset() {
        let img = RawImage::from_rgb(16, 16, vec![200u8; 16 * 16 * 3]);
        let flag = Arc::new(AtomicBool::new(true));
        let opts = Options {
            target_width: 2,
            target_height: 2,
            cancel: Some(flag),
            ..Options::default()
        };
        let asset = convert(&img, &opts);
        assert!(asset.cells.is_empty());
    }

    #[test]
    fn progress_reaches_total_and_names_both_stages() {
        use std::sync::Mutex;
        let seen: Arc<Mutex<Vec<(f64, f64, String)>>> = Arc::new(Mutex::new(vec![]));
        let sink = seen.clone();
        let img = RawImage::from_rgb(16, 16, vec![200u8; 16 * 16 * 3]);
        let opts = Options {
            target_width: 2,
            target_height: 2,
            on_progress: Some(Box::new(move |done, total, stage| {
                sink.lock().unwrap().push((done, total, stage.to_string()));
            })),
            ..Options::default()
        };
        convert(&img, &opts);
        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|(_, _, s)| s == "Resampling"));
        assert!(seen.iter().any(|(_, _, s)| s == "Rendering"));
        let total = seen[0].1;
        let max_done = seen.iter().map(|(d, _, _)| *d).fold(0.0, f64::max);
        assert!((max_done - total).abs() < 1e-9);
    }
}
