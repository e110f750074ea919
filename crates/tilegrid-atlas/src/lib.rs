//! **tilegrid-atlas** — texture-atlas packing and tile lifecycle for grid
//! displays.
//!
//! Glyphs and sprites of any size are packed into a handful of GPU textures
//! ("pages"). The crate is organised bottom-up:
//!
//! - [`Tile`] and the reference-counted [`TileArena`] that owns them.
//! - [`Page`]: guillotine bin packing with bleed borders, growth under the
//!   device texture limit and banded dirty-region uploads.
//! - [`Atlas`]: which page a tile goes to, dedicated pages for large
//!   sprites, cleanup of empty pages.
//! - [`Codespace`]: the tileset registry and the code → tile cache, with
//!   eviction when providers are added or removed.
//! - [`Resources`]: owns all of the above for a rendering loop.
//!
//! The GPU is reached only through the [`Texture`] / [`TextureFactory`]
//! traits; `tilegrid-wgpu` implements them for wgpu and [`HeadlessTextures`]
//! needs no GPU at all. Everything is single-threaded: use it from the
//! thread that owns the graphics context.

pub mod atlas;
pub mod codespace;
pub mod config;
pub mod error;
pub mod page;
pub mod resources;
pub mod texture;
pub mod tile;
pub mod tileset;

pub use atlas::Atlas;
pub use codespace::{CHAR_MASK, Codespace, FONT_MASK, REPLACEMENT};
pub use config::{AtlasConfig, GpuCaps, ResourcesConfig};
pub use error::{Error, Result};
pub use page::{Page, PageId};
pub use resources::Resources;
pub use texture::{HeadlessTexture, HeadlessTextures, Texture, TextureFactory};
pub use tile::{Alignment, ParseAlignmentError, TexCoords, Tile, TileArena, TileId, TileOptions};
pub use tileset::{
    BitmapTileset, BitmapTilesetConfig, DynamicTileset, Tileset, TilesetError, TilesetId,
    TrueTypeConfig, TrueTypeTileset,
};
