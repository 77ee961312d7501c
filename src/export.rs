// TermPix
// copyright termpix contributors 2024~2025

//! Rasterizes a cell asset back into a pixel image: every cell becomes a
//! cell_px x cell_px square painted fg inside the glyph's coverage
//! footprint and bg outside it. The footprint is the matcher's own 8x8
//! model, so a rasterized asset shows exactly what the matcher thought
//! it was approximating, independent of any terminal font.

use crate::asset::ImageAsset;
use crate::render::glyph::footprint_of;
use crate::CELL;
use image::{Rgb as ImgRgb, RgbImage};

pub fn rasterize(asset: &ImageAsset, cell_px: u32) -> RgbImage {
    let cell_px = cell_px.max(1);
    let width = asset.width as u32 * cell_px;
    let height = asset.height as u32 * cell_px;
    let mut img = RgbImage::new(width, height);

    for y in 0..asset.height {
        for x in 0..asset.width {
            let cell = asset.get(x, y);
            let kind = footprint_of(cell.symbol.chars().next().unwrap_or(' '));
            for py in 0..cell_px {
                let sy = (py as usize * CELL) / cell_px as usize;
                for px in 0..cell_px {
                    let sx = (px as usize * CELL) / cell_px as usize;
                    let c = if kind.covers(sx, sy) { cell.fg } else { cell.bg };
                    img.put_pixel(
                        x as u32 * cell_px + px,
                        y as u32 * cell_px + py,
                        ImgRgb([c.r, c.g, c.b]),
                    );
                }
            }
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Cell, Rgb};

    #[test]
    fn half_bar_paints_half_the_cell() {
        let mut asset = ImageAsset::new(1, 1);
        *asset.get_mut(0, 0) = Cell {
            symbol: "▄".into(),
            fg: Rgb::new(255, 0, 0),
            bg: Rgb::new(0, 0, 255),
        };
        let img = rasterize(&asset, 8);
        assert_eq!((img.width(), img.height()), (8, 8));
        assert_eq!(img.get_pixel(3, 0).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(3, 7).0, [255, 0, 0]);
    }

    #[test]
    fn scaling_follows_the_footprint() {
        let mut asset = ImageAsset::new(1, 1);
        *asset.get_mut(0, 0) = Cell {
            symbol: "▌".into(),
            fg: Rgb::new(9, 9, 9),
            bg: Rgb::new(1, 1, 1),
        };
        let img = rasterize(&asset, 16);
        // left half fg, right half bg at any scale
        assert_eq!(img.get_pixel(7, 8).0, [9, 9, 9]);
        assert_eq!(img.get_pixel(8, 8).0, [1, 1, 1]);
    }

    #[test]
    fn diagonal_code_point_paints_its_bottom_right_footprint() {
        let mut asset = ImageAsset::new(1, 1);
        *asset.get_mut(0, 0) = Cell {
            symbol: "▞".into(),
            fg: Rgb::new(255, 255, 255),
            bg: Rgb::new(0, 0, 0),
        };
        let img = rasterize(&asset, 8);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(7, 7).0, [255, 255, 255]);
        // top-right stays background: the footprint is the solid quarter,
        // not the glyph's diagonal pair
        assert_eq!(img.get_pixel(7, 0).0, [0, 0, 0]);
    }
}
