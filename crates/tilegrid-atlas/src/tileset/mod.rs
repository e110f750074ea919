//! Tile providers.
//!
//! A tileset turns a code relative to the offset it is registered under into
//! a fresh, unplaced [`Tile`]. Three kinds exist:
//!
//! - [`BitmapTileset`] slices a decoded image into a grid of equal tiles.
//! - [`TrueTypeTileset`] rasterizes glyphs from an outline font on demand.
//! - [`DynamicTileset`] draws box-drawing, block-element and replacement
//!   tiles procedurally, sized to the grid cell.

mod bitmap;
mod dynamic;
mod truetype;

use std::fmt;

use tilegrid_core::Size;

use crate::tile::Tile;

pub use bitmap::{BitmapTileset, BitmapTilesetConfig};
pub use dynamic::DynamicTileset;
pub use truetype::{TrueTypeConfig, TrueTypeTileset};

/// Identifier of a registered tileset, unique for the life of a codespace.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilesetId(u64);

impl TilesetId {
    pub(crate) const fn new(serial: u64) -> Self {
        Self(serial)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TilesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tileset#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to build a tileset or to produce one of its tiles.
#[derive(Debug)]
pub enum TilesetError {
    /// The source image could not be decoded.
    Image(image::ImageError),
    /// The source file could not be read.
    Io(std::io::Error),
    /// The font data was rejected by the rasterizer.
    InvalidFont(&'static str),
    /// A tile or image size is zero, negative or larger than its source.
    InvalidSize(Size),
    /// The tileset was asked for a relative code it does not provide.
    NotProvided(u32),
}

impl fmt::Display for TilesetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(e) => write!(f, "image: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::InvalidFont(msg) => write!(f, "invalid font: {msg}"),
            Self::InvalidSize(size) => write!(f, "invalid size {size}"),
            Self::NotProvided(code) => write!(f, "code {code:#x} is not provided"),
        }
    }
}

impl std::error::Error for TilesetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for TilesetError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

impl From<std::io::Error> for TilesetError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Tileset
// ---------------------------------------------------------------------------

/// Any of the provider kinds.
#[derive(Debug)]
pub enum Tileset {
    Bitmap(BitmapTileset),
    TrueType(TrueTypeTileset),
    Dynamic(DynamicTileset),
}

impl Tileset {
    /// Whether `code` (relative to the registration offset) has a tile.
    pub fn provides(&self, code: u32) -> bool {
        match self {
            Self::Bitmap(t) => t.provides(code),
            Self::TrueType(t) => t.provides(code),
            Self::Dynamic(t) => t.provides(code),
        }
    }

    /// Render the tile for `code`. Fails with [`TilesetError::NotProvided`]
    /// when [`provides`](Tileset::provides) is false.
    pub fn produce(&self, code: u32) -> Result<Tile, TilesetError> {
        match self {
            Self::Bitmap(t) => t.produce(code),
            Self::TrueType(t) => t.produce(code),
            Self::Dynamic(t) => t.produce(code),
        }
    }

    /// Bounding box of one tile in pixels.
    pub fn cell_size(&self) -> Size {
        match self {
            Self::Bitmap(t) => t.tile_size(),
            Self::TrueType(t) => t.cell_size(),
            Self::Dynamic(t) => t.cell_size(),
        }
    }
}

impl From<BitmapTileset> for Tileset {
    fn from(t: BitmapTileset) -> Self {
        Self::Bitmap(t)
    }
}

impl From<TrueTypeTileset> for Tileset {
    fn from(t: TrueTypeTileset) -> Self {
        Self::TrueType(t)
    }
}

impl From<DynamicTileset> for Tileset {
    fn from(t: DynamicTileset) -> Self {
        Self::Dynamic(t)
    }
}
