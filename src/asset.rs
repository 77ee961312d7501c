// TermPix
// copyright termpix contributors 2024~2025

//! Cell asset: the pipeline's output. A row-major grid of cells, each a
//! one-glyph UTF-8 string plus truecolor fore- and background. The asset
//! is plain data; printing it is a matter of emitting ANSI color
//! sequences, which to_ansi does by merging runs of equally-colored
//! cells into one escape span per run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub symbol: String,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: " ".to_string(),
            fg: Rgb::default(),
            bg: Rgb::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageAsset {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Cell>,
}

impl ImageAsset {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index_of(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "cell position outside the asset: x={}, y={}, size={}x{}",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.index_of(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let i = self.index_of(x, y);
        &mut self.cells[i]
    }

    /// Renders the asset as ANSI truecolor text, one line per cell row.
    /// Adjacent cells sharing both colors are merged into a single escape
    /// span; every span ends with a reset so partial pastes stay sane.
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            let mut span = String::new();
            let mut colors = (Rgb::default(), Rgb::default());
            for x in 0..self.width {
                let cell = self.get(x, y);
                let key = (cell.fg, cell.bg);
                if key != colors {
                    flush_span(&mut out, &span, colors);
                    span.clear();
                    colors = key;
                }
                span.push_str(&cell.symbol);
            }
            flush_span(&mut out, &span, colors);
            out.push('\n');
        }
        out
    }
}

fn flush_span(out: &mut String, span: &str, (fg, bg): (Rgb, Rgb)) {
    if span.is_empty() {
        return;
    }
    out.push_str(&format!(
        "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{}\x1b[0m",
        fg.r, fg.g, fg.b, bg.r, bg.g, bg.b, span
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_asset_is_filled_with_black_spaces() {
        let asset = ImageAsset::new(3, 2);
        assert_eq!(asset.cells.len(), 6);
        assert!(asset.cells.iter().all(|c| c == &Cell::default()));
        assert!(!asset.is_empty());
        assert!(ImageAsset::new(0, 0).is_empty());
    }

    #[test]
    fn ansi_merges_equal_color_runs() {
        let mut asset = ImageAsset::new(3, 1);
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);
        *asset.get_mut(0, 0) = Cell { symbol: "█".into(), fg: red, bg: blue };
        *asset.get_mut(1, 0) = Cell { symbol: "█".into(), fg: red, bg: blue };
        *asset.get_mut(2, 0) = Cell { symbol: "▄".into(), fg: blue, bg: red };
        let text = asset.to_ansi();
        assert_eq!(
            text,
            "\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m██\x1b[0m\
             \x1b[38;2;0;0;255m\x1b[48;2;255;0;0m▄\x1b[0m\n"
        );
    }

    #[test]
    fn serde_round_trip_preserves_cells() {
        let mut asset = ImageAsset::new(2, 1);
        *asset.get_mut(1, 0) = Cell {
            symbol: "▌".into(),
            fg: Rgb::new(1, 2, 3),
            bg: Rgb::new(4, 5, 6),
        };
        let json = serde_json::to_string(&asset).unwrap();
        let back: ImageAsset = serde_json::from_str(&json).unwrap();
        assert_eq!(asset, back);
    }
}
