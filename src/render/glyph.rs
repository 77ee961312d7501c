// TermPix
// copyright termpix contributors 2024~2025

//! The fixed candidate glyph table.
//!
//! Every glyph is a Unicode block element whose foreground footprint is a
//! rectangle inside the 8x8 cell. Keeping the footprints rectangular is a
//! deliberate restriction: it means one integral-image query per glyph,
//! so the matcher stays O(1) per candidate.
//!
//! The table order is the selection priority: ties on error keep the
//! earlier entry, so the order must not change between releases or saved
//! assets would stop reproducing.

use crate::CELL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphKind {
    /// whole cell is foreground
    Full,
    /// no foreground at all
    Space,
    /// bottom `level` of 8 rows, U+2581..=U+2588
    HorzBar(u8),
    /// left `level` of 8 columns, U+258F..=U+2588
    VertBar(u8),
    /// one 4x4 quarter: 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right
    Quadrant(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub code: char,
    pub kind: GlyphKind,
}

const fn g(code: char, kind: GlyphKind) -> Glyph {
    Glyph { code, kind }
}

/// Candidate glyphs in selection-priority order.
///
/// The bottom-right quadrant keeps the historical code point U+259E (the
/// diagonal pair ▞) even though its matcher footprint is the solid
/// bottom-right quarter; assets written with it stay bit-compatible, and
/// the rasterizer paints the footprint, not the font's idea of the glyph.
pub const GLYPHS: [Glyph; 22] = [
    g('\u{2588}', GlyphKind::Full),
    g(' ', GlyphKind::Space),
    g('\u{2598}', GlyphKind::Quadrant(0)),
    g('\u{259D}', GlyphKind::Quadrant(1)),
    g('\u{2596}', GlyphKind::Quadrant(2)),
    g('\u{259E}', GlyphKind::Quadrant(3)),
    g('\u{2588}', GlyphKind::HorzBar(8)),
    g('\u{2587}', GlyphKind::HorzBar(7)),
    g('\u{2586}', GlyphKind::HorzBar(6)),
    g('\u{2585}', GlyphKind::HorzBar(5)),
    g('\u{2584}', GlyphKind::HorzBar(4)),
    g('\u{2583}', GlyphKind::HorzBar(3)),
    g('\u{2582}', GlyphKind::HorzBar(2)),
    g('\u{2581}', GlyphKind::HorzBar(1)),
    g('\u{2588}', GlyphKind::VertBar(8)),
    g('\u{2589}', GlyphKind::VertBar(7)),
    g('\u{258A}', GlyphKind::VertBar(6)),
    g('\u{258B}', GlyphKind::VertBar(5)),
    g('\u{258C}', GlyphKind::VertBar(4)),
    g('\u{258D}', GlyphKind::VertBar(3)),
    g('\u{258E}', GlyphKind::VertBar(2)),
    g('\u{258F}', GlyphKind::VertBar(1)),
];

impl GlyphKind {
    /// Foreground rectangle in cell-local sub-pixel coordinates,
    /// half-open [x0,x1) x [y0,y1) with 0 <= x,y <= 8.
    pub fn fg_rect(self) -> (usize, usize, usize, usize) {
        let half = CELL / 2;
        match self {
            GlyphKind::Space => (0, 0, 0, 0),
            GlyphKind::Full => (0, 0, CELL, CELL),
            GlyphKind::HorzBar(level) => (0, CELL - level as usize, CELL, CELL),
            GlyphKind::VertBar(level) => (0, 0, level as usize, CELL),
            GlyphKind::Quadrant(q) => {
                let x0 = (q as usize % 2) * half;
                let y0 = if q < 2 { 0 } else { half };
                (x0, y0, x0 + half, y0 + half)
            }
        }
    }

    /// Foreground sub-pixel count.
    pub fn fg_count(self) -> u64 {
        let (x0, y0, x1, y1) = self.fg_rect();
        ((x1 - x0) * (y1 - y0)) as u64
    }

    /// Whether the cell-local sub-pixel (x, y) belongs to the foreground.
    pub fn covers(self, x: usize, y: usize) -> bool {
        let (x0, y0, x1, y1) = self.fg_rect();
        x >= x0 && x < x1 && y >= y0 && y < y1
    }
}

/// Footprint of a stored symbol, for painting an asset back into pixels.
/// The first table entry carrying the code point wins; unknown symbols
/// paint as background only.
pub fn footprint_of(symbol: char) -> GlyphKind {
    GLYPHS
        .iter()
        .find(|g| g.code == symbol)
        .map(|g| g.kind)
        .unwrap_or(GlyphKind::Space)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_and_code_points() {
        assert_eq!(GLYPHS.len(), 22);
        assert_eq!(GLYPHS[0], g('█', GlyphKind::Full));
        assert_eq!(GLYPHS[1], g(' ', GlyphKind::Space));
        assert_eq!(GLYPHS[2].code, '▘');
        assert_eq!(GLYPHS[3].code, '▝');
        assert_eq!(GLYPHS[4].code, '▖');
        assert_eq!(GLYPHS[5].code, '▞');
        // horizontal bars: full block down to the one-eighth bottom bar
        assert_eq!(GLYPHS[6].code, '█');
        assert_eq!(GLYPHS[13], g('▁', GlyphKind::HorzBar(1)));
        // vertical bars: full block down to the one-eighth left bar
        assert_eq!(GLYPHS[14].code, '█');
        assert_eq!(GLYPHS[18], g('▌', GlyphKind::VertBar(4)));
        assert_eq!(GLYPHS[21], g('▏', GlyphKind::VertBar(1)));
    }

    #[test]
    fn footprints_are_consistent() {
        for glyph in GLYPHS {
            let count = (0..CELL)
                .flat_map(|y| (0..CELL).map(move |x| (x, y)))
                .filter(|&(x, y)| glyph.kind.covers(x, y))
                .count() as u64;
            assert_eq!(count, glyph.kind.fg_count());
        }
        assert_eq!(GlyphKind::Full.fg_count(), 64);
        assert_eq!(GlyphKind::Space.fg_count(), 0);
        assert_eq!(GlyphKind::HorzBar(4).fg_rect(), (0, 4, 8, 8));
        assert_eq!(GlyphKind::VertBar(4).fg_rect(), (0, 0, 4, 8));
        assert_eq!(GlyphKind::Quadrant(3).fg_rect(), (4, 4, 8, 8));
    }

    #[test]
    fn quadrants_tile_the_cell() {
        for y in 0..CELL {
            for x in 0..CELL {
                let n = (0..4)
                    .filter(|&q| GlyphKind::Quadrant(q).covers(x, y))
                    .count();
                assert_eq!(n, 1);
            }
        }
    }

    #[test]
    fn footprint_lookup_prefers_the_first_entry() {
        // U+2588 appears three times; all carry the full-cell footprint
        assert_eq!(footprint_of('█'), GlyphKind::Full);
        assert_eq!(footprint_of('▞'), GlyphKind::Quadrant(3));
        assert_eq!(footprint_of('x'), GlyphKind::Space);
    }
}
