// TermPix
// copyright termpix contributors 2024~2025

//! RawImage is the decoded source picture handed to the pipeline: an
//! interleaved RGB byte buffer plus its dimensions and a validity flag.
//! Decoding is delegated to the image crate; every source is coerced to
//! three channels. An undecodable file yields an invalid RawImage, which
//! the rest of the pipeline turns into an empty asset without failing.

#[cfg(feature = "image")]
use log::error;
#[cfg(feature = "image")]
use std::path::Path;

/// Interleaved RGB8 source image. `data` holds width * height * channels
/// bytes, row major. The pipeline only ever borrows it read-only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawImage {
    pub width: usize,
    pub height: usize,
    /// always 3 once decoded; kept explicit for buffer stride math
    pub channels: usize,
    pub data: Vec<u8>,
    pub valid: bool,
}

impl RawImage {
    /// Wraps an interleaved RGB buffer. The image is only marked valid
    /// when the buffer length matches the claimed dimensions.
    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Self {
        let valid = width > 0 && height > 0 && data.len() == width * height * 3;
        Self {
            width,
            height,
            channels: 3,
            data,
            valid,
        }
    }

    /// The invalid placeholder returned when decoding fails.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Decodes any raster format the image crate understands, forcing the
    /// result to RGB8. Returns an invalid RawImage on failure.
    #[cfg(feature = "image")]
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        match image::open(path.as_ref()) {
            Ok(img) => {
                let rgb = img.to_rgb8();
                let (w, h) = (rgb.width() as usize, rgb.height() as usize);
                Self::from_rgb(w, h, rgb.into_raw())
            }
            Err(e) => {
                error!("failed to decode {:?}: {}", path.as_ref(), e);
                Self::invalid()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_length_is_checked() {
        let ok = RawImage::from_rgb(2, 2, vec![0u8; 12]);
        assert!(ok.valid);
        let short = RawImage::from_rgb(2, 2, vec![0u8; 11]);
        assert!(!short.valid);
        assert!(!RawImage::invalid().valid);
    }
}
