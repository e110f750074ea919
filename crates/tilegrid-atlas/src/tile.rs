//! Tiles and the generational [`TileArena`] that owns them.
//!
//! A [`Tile`] is shared between the provider that produced it, the page it
//! is placed on and every codespace entry that maps to it. None of them own
//! it directly: each holds a [`TileId`] and a reference count in the arena.
//! The tile is dropped when the last holder releases it, and a stale id
//! simply fails the lookup.

use std::fmt;
use std::str::FromStr;

use tilegrid_core::{Bitmap, Point, Rect, Size};

use crate::page::PageId;
use crate::tileset::TilesetId;

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Where a tile's quad is anchored relative to the cell box it is drawn in.
///
/// `Center` anchors the tile's top-left at the centre of the box (providers
/// put a negative half-size into the offset), `DeadCenter` centres the tile
/// itself. The corner variants anchor the matching tile corner to the
/// matching box corner. The offset is added in every case.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Alignment {
    Center,
    DeadCenter,
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Alignment {
    const NAMES: [(Alignment, &'static str); 6] = [
        (Alignment::Center, "center"),
        (Alignment::DeadCenter, "dead-center"),
        (Alignment::TopLeft, "top-left"),
        (Alignment::TopRight, "top-right"),
        (Alignment::BottomLeft, "bottom-left"),
        (Alignment::BottomRight, "bottom-right"),
    ];

    /// Top-left corner of a `tile`-sized quad inside `cell_box`, before the
    /// tile offset is applied.
    pub fn anchor(self, cell_box: Rect, tile: Size) -> Point {
        let cx = cell_box.left + cell_box.width / 2;
        let cy = cell_box.top + cell_box.height / 2;
        match self {
            Self::Center => Point::new(cx, cy),
            Self::DeadCenter => Point::new(cx - tile.width / 2, cy - tile.height / 2),
            Self::TopLeft => cell_box.location(),
            Self::TopRight => Point::new(cell_box.right() - tile.width, cell_box.top),
            Self::BottomLeft => Point::new(cell_box.left, cell_box.bottom() - tile.height),
            Self::BottomRight => {
                Point::new(cell_box.right() - tile.width, cell_box.bottom() - tile.height)
            }
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Self::NAMES
            .iter()
            .find(|(a, _)| a == self)
            .map(|(_, n)| *n)
            .unwrap_or("top-left");
        f.write_str(name)
    }
}

/// Error returned when an alignment name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAlignmentError(pub String);

impl fmt::Display for ParseAlignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown alignment \u{201c}{}\u{201d}", self.0)
    }
}

impl std::error::Error for ParseAlignmentError {}

impl FromStr for Alignment {
    type Err = ParseAlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::NAMES
            .iter()
            .find(|(_, n)| *n == key)
            .map(|(a, _)| *a)
            .ok_or_else(|| ParseAlignmentError(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// TexCoords / TileOptions
// ---------------------------------------------------------------------------

/// Normalised texture coordinates of a tile's useful area.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TexCoords {
    pub tu1: f32,
    pub tv1: f32,
    pub tu2: f32,
    pub tv2: f32,
}

impl TexCoords {
    /// Coordinates of `region` within a canvas of `canvas` pixels.
    pub fn of(region: Rect, canvas: Size) -> Self {
        let w = canvas.width as f32;
        let h = canvas.height as f32;
        Self {
            tu1: region.left as f32 / w,
            tv1: region.top as f32 / h,
            tu2: region.right() as f32 / w,
            tv2: region.bottom() as f32 / h,
        }
    }
}

impl Default for TexCoords {
    fn default() -> Self {
        Self {
            tu1: 0.0,
            tv1: 0.0,
            tu2: 1.0,
            tv2: 1.0,
        }
    }
}

/// Placement defaults a tileset stamps onto every tile it produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TileOptions {
    pub alignment: Alignment,
    pub offset: Point,
    /// How many grid cells the tile spans.
    pub spacing: Size,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            alignment: Alignment::TopLeft,
            offset: Point::ZERO,
            spacing: Size::new(1, 1),
        }
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// Where a placed tile lives on its page.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Placement {
    pub page: PageId,
    pub useful: Rect,
    /// Padded allocation taken out of the free list; contains `useful`
    /// inflated by one pixel plus the round-up slack.
    pub reserved: Rect,
    pub coords: TexCoords,
}

/// One renderable glyph or image.
///
/// Providers fill in the bitmap and the placement metadata; the atlas fills
/// in the page, the spaces and the texture coordinates.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Source pixels. Moved into the page canvas on placement unless the
    /// atlas is configured to keep bitmaps; restored by a copy-back removal.
    pub bitmap: Bitmap,
    pub alignment: Alignment,
    pub offset: Point,
    pub spacing: Size,
    pub(crate) provider: Option<TilesetId>,
    pub(crate) placement: Option<Placement>,
}

impl Tile {
    /// A fresh, unplaced tile with default placement metadata.
    pub fn new(bitmap: Bitmap) -> Self {
        Self::with_options(bitmap, TileOptions::default())
    }

    pub fn with_options(bitmap: Bitmap, options: TileOptions) -> Self {
        Self {
            bitmap,
            alignment: options.alignment,
            offset: options.offset,
            spacing: options.spacing,
            provider: None,
            placement: None,
        }
    }

    /// Pixel size of the tile image, whether or not it is placed.
    pub fn size(&self) -> Size {
        match &self.placement {
            Some(p) => p.useful.size(),
            None => self.bitmap.size(),
        }
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    /// The page holding this tile.
    pub fn page(&self) -> Option<PageId> {
        self.placement.map(|p| p.page)
    }

    /// The tileset that produced this tile.
    pub fn provider(&self) -> Option<TilesetId> {
        self.provider
    }

    /// Tight bounds of the image within its page (empty while unplaced).
    pub fn useful_space(&self) -> Rect {
        self.placement.map(|p| p.useful).unwrap_or_default()
    }

    /// `useful_space` plus the one-pixel bleed border on every side.
    pub fn total_space(&self) -> Rect {
        self.placement.map(|p| p.useful.inflate(1)).unwrap_or_default()
    }

    /// Normalised coordinates against the page's current size.
    pub fn texture_coords(&self) -> TexCoords {
        self.placement.map(|p| p.coords).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// TileId / TileArena
// ---------------------------------------------------------------------------

/// Generational handle to a tile in a [`TileArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    index: u32,
    generation: u32,
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    refs: u32,
    tile: Option<Tile>,
}

/// Reference-counted slab of tiles addressed by [`TileId`].
#[derive(Debug, Default)]
pub struct TileArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl TileArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `tile`. The caller owns the one initial reference.
    pub fn insert(&mut self, tile: Tile) -> TileId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.refs = 1;
            slot.tile = Some(tile);
            return TileId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            refs: 1,
            tile: Some(tile),
        });
        TileId {
            index,
            generation: 0,
        }
    }

    fn slot(&self, id: TileId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation && s.tile.is_some())
    }

    fn slot_mut(&mut self, id: TileId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation && s.tile.is_some())
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.slot(id).is_some()
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.slot(id).and_then(|s| s.tile.as_ref())
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.slot_mut(id).and_then(|s| s.tile.as_mut())
    }

    /// Number of live references to `id` (0 for a stale id).
    pub fn refs(&self, id: TileId) -> u32 {
        self.slot(id).map(|s| s.refs).unwrap_or(0)
    }

    /// Add a reference. Returns `false` for a stale id.
    pub fn retain(&mut self, id: TileId) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drop a reference. When it was the last one the tile is removed and
    /// returned, and the id becomes stale.
    pub fn release(&mut self, id: TileId) -> Option<Tile> {
        let slot = self.slot_mut(id)?;
        slot.refs -= 1;
        if slot.refs > 0 {
            return None;
        }
        let tile = slot.tile.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        tile
    }

    /// Number of live tiles.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over live tiles.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.tile.as_ref().map(|t| {
                (
                    TileId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    t,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegrid_core::Color;

    fn tile(w: i32, h: i32) -> Tile {
        Tile::new(Bitmap::new(Size::new(w, h), Color::WHITE))
    }

    #[test]
    fn arena_refcount_lifecycle() {
        let mut arena = TileArena::new();
        let id = arena.insert(tile(2, 2));
        assert!(arena.retain(id));
        assert_eq!(arena.refs(id), 2);
        assert!(arena.release(id).is_none());
        assert!(arena.contains(id));
        let freed = arena.release(id).expect("last reference frees the tile");
        assert_eq!(freed.size(), Size::new(2, 2));
        assert!(!arena.contains(id));
        assert!(arena.is_empty());
    }

    #[test]
    fn stale_ids_fail_lookup_after_slot_reuse() {
        let mut arena = TileArena::new();
        let old = arena.insert(tile(1, 1));
        arena.release(old);
        let new = arena.insert(tile(3, 3));
        assert_ne!(old, new);
        assert!(arena.get(old).is_none());
        assert!(!arena.retain(old));
        assert!(arena.release(old).is_none());
        assert_eq!(arena.get(new).map(Tile::size), Some(Size::new(3, 3)));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn iter_skips_freed_slots() {
        let mut arena = TileArena::new();
        let a = arena.insert(tile(1, 1));
        let b = arena.insert(tile(2, 2));
        arena.release(a);
        let ids: Vec<TileId> = arena.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![b]);
    }

    #[test]
    fn unplaced_tile_has_empty_spaces() {
        let t = tile(4, 4);
        assert!(!t.is_placed());
        assert!(t.useful_space().is_empty());
        assert!(t.total_space().is_empty());
        assert_eq!(t.texture_coords(), TexCoords::default());
        assert_eq!(t.spacing, Size::new(1, 1));
    }

    #[test]
    fn alignment_names_round_trip() {
        for (a, name) in Alignment::NAMES {
            assert_eq!(a.to_string(), name);
            assert_eq!(name.parse::<Alignment>().unwrap(), a);
        }
        assert_eq!("Dead_Center".parse::<Alignment>().unwrap(), Alignment::DeadCenter);
        assert!("middle".parse::<Alignment>().is_err());
    }

    #[test]
    fn alignment_anchors() {
        let cell = Rect::new(10, 20, 8, 16);
        let t = Size::new(4, 4);
        assert_eq!(Alignment::TopLeft.anchor(cell, t), Point::new(10, 20));
        assert_eq!(Alignment::TopRight.anchor(cell, t), Point::new(14, 20));
        assert_eq!(Alignment::BottomLeft.anchor(cell, t), Point::new(10, 32));
        assert_eq!(Alignment::BottomRight.anchor(cell, t), Point::new(14, 32));
        assert_eq!(Alignment::Center.anchor(cell, t), Point::new(14, 28));
        assert_eq!(Alignment::DeadCenter.anchor(cell, t), Point::new(12, 26));
    }

    #[test]
    fn tex_coords_normalise_against_canvas() {
        let c = TexCoords::of(Rect::new(64, 32, 64, 32), Size::new(256, 128));
        assert_eq!(c, TexCoords { tu1: 0.25, tv1: 0.25, tu2: 0.5, tv2: 0.5 });
    }
}
