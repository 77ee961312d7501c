// TermPix
// copyright termpix contributors 2024~2025

//! TermPix converts raster images into terminal "cell assets": a grid of
//! character cells, each carrying one block glyph plus a truecolor fore-
//! and background, that approximates the source image when printed in an
//! ANSI terminal.
//!
//! The pipeline has two stages, each of which completes before the next:
//!
//! ```text
//! RawImage --resample--> RgbPlanes (8x cell grid) --render--> ImageAsset
//! ```
//!
//! The resampler performs exact rectangular-box area averaging into
//! structure-of-arrays RGB planes at eight sub-pixels per cell side. The
//! high-quality renderer then picks, for every 8x8 sub-block, the
//! (glyph, fg, bg) triple with the least squared color error, using
//! integral images for constant-time rectangle statistics. A low-quality
//! renderer paints plain background-colored spaces instead.
//!
//! Both stages run on the rayon thread pool; all phase outputs are written
//! to disjoint row ranges, so results are byte-identical regardless of the
//! worker count.

/// cell sub-pixel resolution: every cell covers CELL x CELL plane pixels
pub const CELL: usize = 8;

/// decoded source image plus the loader built on the image crate
pub mod raw;

/// area-averaging resampler producing the high resolution RGB planes
pub mod resample;

/// glyph matching: integral images, the glyph table and both renderers
pub mod render;

/// cell asset data structure and its ANSI text form
pub mod asset;

/// disk store addressing assets by stem name under a root directory
pub mod store;

/// conversion driver: options, progress reporting, quality dispatch
pub mod convert;

/// rasterize an asset back into a pixel image
#[cfg(feature = "image")]
pub mod export;

/// log
pub mod log;

pub use asset::{Cell, ImageAsset, Rgb};
pub use convert::{convert, Options, Quality};
pub use raw::RawImage;
pub use resample::{resample, RgbPlanes};
