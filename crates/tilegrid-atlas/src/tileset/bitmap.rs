//! Image-backed tilesets.

use std::path::Path;

use tilegrid_core::{Bitmap, Color, Point, Rect, Size};

use super::TilesetError;
use crate::tile::{Tile, TileOptions};

/// How a source image is cut into tiles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BitmapTilesetConfig {
    /// Size of one tile. `None` makes the whole image a single tile.
    pub tile_size: Option<Size>,
    /// Colour key: pixels of this RGB become fully transparent.
    pub transparent: Option<Color>,
    /// Scale every tile to this size (nearest neighbour) when produced.
    pub resize: Option<Size>,
    /// Placement metadata stamped on every produced tile.
    pub options: TileOptions,
}

/// A grid of equally sized tiles sliced from one image, numbered row-major
/// from relative code 0.
#[derive(Debug, Clone)]
pub struct BitmapTileset {
    image: Bitmap,
    tile_size: Size,
    columns: i32,
    count: u32,
    resize: Option<Size>,
    options: TileOptions,
}

impl BitmapTileset {
    pub fn from_bitmap(mut image: Bitmap, config: BitmapTilesetConfig) -> Result<Self, TilesetError> {
        if image.is_empty() {
            return Err(TilesetError::InvalidSize(image.size()));
        }
        let tile_size = config.tile_size.unwrap_or(image.size());
        if tile_size.is_empty() || !image.size().fits(tile_size) {
            return Err(TilesetError::InvalidSize(tile_size));
        }
        if let Some(size) = config.resize.filter(|s| s.is_empty()) {
            return Err(TilesetError::InvalidSize(size));
        }
        if let Some(key) = config.transparent {
            image.make_transparent(key);
        }

        let columns = image.width() / tile_size.width;
        let rows = image.height() / tile_size.height;
        log::debug!("bitmap tileset: {columns}x{rows} tiles of {tile_size}");
        Ok(Self {
            image,
            tile_size,
            columns,
            count: (columns * rows) as u32,
            resize: config.resize,
            options: config.options,
        })
    }

    pub fn from_image(image: &image::DynamicImage, config: BitmapTilesetConfig) -> Result<Self, TilesetError> {
        let rgba = image.to_rgba8();
        let size = Size::new(rgba.width() as i32, rgba.height() as i32);
        let pixels = rgba.pixels().map(|p| Color::from(p.0)).collect();
        let bitmap = Bitmap::from_pixels(size, pixels).ok_or(TilesetError::InvalidSize(size))?;
        Self::from_bitmap(bitmap, config)
    }

    /// Decode an encoded image (PNG) held in memory.
    pub fn from_bytes(bytes: &[u8], config: BitmapTilesetConfig) -> Result<Self, TilesetError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(&image, config)
    }

    pub fn open(path: impl AsRef<Path>, config: BitmapTilesetConfig) -> Result<Self, TilesetError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, config)
    }

    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    /// Number of tiles in the grid.
    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn provides(&self, code: u32) -> bool {
        code < self.count
    }

    pub fn produce(&self, code: u32) -> Result<Tile, TilesetError> {
        if !self.provides(code) {
            return Err(TilesetError::NotProvided(code));
        }
        let i = code as i32;
        let origin = Point::new(
            (i % self.columns) * self.tile_size.width,
            (i / self.columns) * self.tile_size.height,
        );
        let mut bitmap = self.image.extract(Rect::at(origin, self.tile_size));
        if let Some(size) = self.resize {
            bitmap = bitmap.resize(size);
        }
        Ok(Tile::with_options(bitmap, self.options))
    }
}
