//! Procedural tiles: box drawing, block elements and the replacement glyph.
//!
//! Every tile is drawn white on transparent at exactly the cell size, so
//! lines from neighbouring cells join up without gaps.

use tilegrid_core::{Bitmap, Color, Rect, Size};

use super::TilesetError;
use crate::tile::{Alignment, Tile, TileOptions};

const REPLACEMENT: u32 = 0xFFFD;
const BLOCKS: std::ops::RangeInclusive<u32> = 0x2580..=0x259F;

/// Line-drawing and block-element tiles synthesized at the cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicTileset {
    cell: Size,
}

impl DynamicTileset {
    /// Tiles of `cell` pixels; dimensions are clamped to at least 1.
    pub fn new(cell: Size) -> Self {
        Self {
            cell: Size::new(cell.width.max(1), cell.height.max(1)),
        }
    }

    pub fn cell_size(&self) -> Size {
        self.cell
    }

    pub fn provides(&self, code: u32) -> bool {
        code == REPLACEMENT || BLOCKS.contains(&code) || box_segments(code).is_some()
    }

    pub fn produce(&self, code: u32) -> Result<Tile, TilesetError> {
        let mut bitmap = Bitmap::new(self.cell, Color::TRANSPARENT);
        if code == REPLACEMENT {
            draw_frame(&mut bitmap);
            let options = TileOptions {
                alignment: Alignment::DeadCenter,
                ..TileOptions::default()
            };
            return Ok(Tile::with_options(bitmap, options));
        }
        if BLOCKS.contains(&code) {
            draw_block(&mut bitmap, code);
        } else if let Some(segments) = box_segments(code) {
            draw_box(&mut bitmap, segments);
        } else {
            return Err(TilesetError::NotProvided(code));
        }
        Ok(Tile::new(bitmap))
    }
}

/// A hollow rectangle one pixel in from the cell edge.
fn draw_frame(b: &mut Bitmap) {
    let Size { width: w, height: h } = b.size();
    if w < 3 || h < 3 {
        b.fill_rect(Rect::from_size(b.size()), Color::WHITE);
        return;
    }
    b.fill_rect(Rect::new(1, 1, w - 2, 1), Color::WHITE);
    b.fill_rect(Rect::new(1, h - 2, w - 2, 1), Color::WHITE);
    b.fill_rect(Rect::new(1, 1, 1, h - 2), Color::WHITE);
    b.fill_rect(Rect::new(w - 2, 1, 1, h - 2), Color::WHITE);
}

// ---------------------------------------------------------------------------
// Block elements
// ---------------------------------------------------------------------------

const UPPER_LEFT: u8 = 1;
const UPPER_RIGHT: u8 = 2;
const LOWER_LEFT: u8 = 4;
const LOWER_RIGHT: u8 = 8;

fn draw_block(b: &mut Bitmap, code: u32) {
    let Size { width: w, height: h } = b.size();
    let eighth_h = |n: i32| (h * n + 4) / 8;
    let eighth_w = |n: i32| (w * n + 4) / 8;
    let solid = Color::WHITE;

    match code {
        0x2580 => b.fill_rect(Rect::new(0, 0, w, h / 2), solid),
        // Lower one eighth through lower seven eighths, then the full block.
        0x2581..=0x2588 => {
            let n = eighth_h((code - 0x2580) as i32);
            b.fill_rect(Rect::new(0, h - n, w, n), solid);
        }
        // Left seven eighths down to left one eighth.
        0x2589..=0x258F => {
            let n = eighth_w((0x2590 - code) as i32);
            b.fill_rect(Rect::new(0, 0, n, h), solid);
        }
        0x2590 => b.fill_rect(Rect::new(w / 2, 0, w - w / 2, h), solid),
        0x2591..=0x2593 => {
            let alpha = ((code - 0x2590) * 64) as u8;
            b.fill_rect(Rect::from_size(b.size()), solid.with_alpha(alpha));
        }
        0x2594 => b.fill_rect(Rect::new(0, 0, w, eighth_h(1)), solid),
        0x2595 => {
            let n = eighth_w(1);
            b.fill_rect(Rect::new(w - n, 0, n, h), solid);
        }
        _ => fill_quadrants(b, quadrants(code)),
    }
}

fn quadrants(code: u32) -> u8 {
    match code {
        0x2596 => LOWER_LEFT,
        0x2597 => LOWER_RIGHT,
        0x2598 => UPPER_LEFT,
        0x2599 => UPPER_LEFT | LOWER_LEFT | LOWER_RIGHT,
        0x259A => UPPER_LEFT | LOWER_RIGHT,
        0x259B => UPPER_LEFT | UPPER_RIGHT | LOWER_LEFT,
        0x259C => UPPER_LEFT | UPPER_RIGHT | LOWER_RIGHT,
        0x259D => UPPER_RIGHT,
        0x259E => UPPER_RIGHT | LOWER_LEFT,
        0x259F => UPPER_RIGHT | LOWER_LEFT | LOWER_RIGHT,
        _ => 0,
    }
}

fn fill_quadrants(b: &mut Bitmap, mask: u8) {
    let Size { width: w, height: h } = b.size();
    let (hw, hh) = (w / 2, h / 2);
    let parts = [
        (UPPER_LEFT, Rect::new(0, 0, hw, hh)),
        (UPPER_RIGHT, Rect::new(hw, 0, w - hw, hh)),
        (LOWER_LEFT, Rect::new(0, hh, hw, h - hh)),
        (LOWER_RIGHT, Rect::new(hw, hh, w - hw, h - hh)),
    ];
    for (bit, r) in parts {
        if mask & bit != 0 {
            b.fill_rect(r, Color::WHITE);
        }
    }
}

// ---------------------------------------------------------------------------
// Box drawing
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Weight {
    None,
    Light,
    Heavy,
    Double,
}

#[derive(Clone, Copy, Debug)]
struct Segments {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    horizontal: Weight,
    vertical: Weight,
}

fn box_segments(code: u32) -> Option<Segments> {
    use Weight::*;
    let s = |left, right, up, down, horizontal, vertical| {
        Some(Segments {
            left,
            right,
            up,
            down,
            horizontal,
            vertical,
        })
    };
    match code {
        0x2500 => s(true, true, false, false, Light, None),
        0x2502 => s(false, false, true, true, None, Light),
        0x250C | 0x256D => s(false, true, false, true, Light, Light),
        0x2510 | 0x256E => s(true, false, false, true, Light, Light),
        0x2514 | 0x2570 => s(false, true, true, false, Light, Light),
        0x2518 | 0x256F => s(true, false, true, false, Light, Light),
        0x251C => s(false, true, true, true, Light, Light),
        0x2524 => s(true, false, true, true, Light, Light),
        0x252C => s(true, true, false, true, Light, Light),
        0x2534 => s(true, true, true, false, Light, Light),
        0x253C => s(true, true, true, true, Light, Light),

        0x2501 => s(true, true, false, false, Heavy, None),
        0x2503 => s(false, false, true, true, None, Heavy),
        0x250F => s(false, true, false, true, Heavy, Heavy),
        0x2513 => s(true, false, false, true, Heavy, Heavy),
        0x2517 => s(false, true, true, false, Heavy, Heavy),
        0x251B => s(true, false, true, false, Heavy, Heavy),
        0x2523 => s(false, true, true, true, Heavy, Heavy),
        0x252B => s(true, false, true, true, Heavy, Heavy),
        0x2533 => s(true, true, false, true, Heavy, Heavy),
        0x253B => s(true, true, true, false, Heavy, Heavy),
        0x254B => s(true, true, true, true, Heavy, Heavy),

        0x2550 => s(true, true, false, false, Double, None),
        0x2551 => s(false, false, true, true, None, Double),
        0x2554 => s(false, true, false, true, Double, Double),
        0x2557 => s(true, false, false, true, Double, Double),
        0x255A => s(false, true, true, false, Double, Double),
        0x255D => s(true, false, true, false, Double, Double),
        0x2560 => s(false, true, true, true, Double, Double),
        0x2563 => s(true, false, true, true, Double, Double),
        0x2566 => s(true, true, false, true, Double, Double),
        0x2569 => s(true, true, true, false, Double, Double),
        0x256C => s(true, true, true, true, Double, Double),
        _ => Option::None,
    }
}

/// Bands `(start, len)` across a stroke of `weight` centred on `c`.
fn bands(weight: Weight, c: i32, light: i32) -> Vec<(i32, i32)> {
    match weight {
        Weight::None => Vec::new(),
        Weight::Light => vec![(c - light / 2, light)],
        Weight::Heavy => vec![(c - light, light * 2)],
        Weight::Double => vec![(c - light - light / 2, light), (c + light - light / 2, light)],
    }
}

/// `[min, max)` covered by a stroke, or `[c, c)` when there is none.
fn extent(bands: &[(i32, i32)], c: i32) -> (i32, i32) {
    let min = bands.iter().map(|b| b.0).min().unwrap_or(c);
    let max = bands.iter().map(|b| b.0 + b.1).max().unwrap_or(c);
    (min, max)
}

fn draw_box(b: &mut Bitmap, s: Segments) {
    let Size { width: w, height: h } = b.size();
    let (cx, cy) = (w / 2, h / 2);
    let light = (w / 8).max(1);

    let rows = bands(s.horizontal, cy, light);
    let cols = bands(s.vertical, cx, light);
    let (col_min, col_max) = extent(&cols, cx);
    let (row_min, row_max) = extent(&rows, cy);

    for &(y, t) in &rows {
        if s.left {
            b.fill_rect(Rect::new(0, y, col_max, t), Color::WHITE);
        }
        if s.right {
            b.fill_rect(Rect::new(col_min, y, w - col_min, t), Color::WHITE);
        }
    }
    for &(x, t) in &cols {
        if s.up {
            b.fill_rect(Rect::new(x, 0, t, row_max), Color::WHITE);
        }
        if s.down {
            b.fill_rect(Rect::new(x, row_min, t, h - row_min), Color::WHITE);
        }
    }
}
