//! The single owner of the tile arena, the atlas and the codespace.

use std::path::{Path, PathBuf};

use crate::atlas::Atlas;
use crate::codespace::Codespace;
use crate::config::{GpuCaps, ResourcesConfig};
use crate::error::Result;
use crate::page::PageId;
use crate::texture::TextureFactory;
use crate::tile::{Tile, TileArena, TileId};
use crate::tileset::{Tileset, TilesetId};

/// Everything a rendering loop needs to turn codes into textured quads.
///
/// Created once when the display opens, used from the thread that owns the
/// GPU context, and cleared when it closes.
pub struct Resources<F: TextureFactory> {
    config: ResourcesConfig,
    tiles: TileArena,
    atlas: Atlas<F>,
    codespace: Codespace,
}

impl<F: TextureFactory> Resources<F> {
    pub fn new(config: ResourcesConfig, caps: GpuCaps, factory: F) -> Self {
        log::debug!(
            "resources: cell {}, page {}px, texture limit {}px",
            config.cell_size,
            config.atlas.page_size,
            caps.max_texture_size
        );
        Self {
            config,
            tiles: TileArena::new(),
            atlas: Atlas::new(factory, caps, config.atlas),
            codespace: Codespace::new(config.cell_size),
        }
    }

    pub fn config(&self) -> &ResourcesConfig {
        &self.config
    }

    pub fn atlas(&self) -> &Atlas<F> {
        &self.atlas
    }

    pub fn tiles(&self) -> &TileArena {
        &self.tiles
    }

    pub fn codespace(&self) -> &Codespace {
        &self.codespace
    }

    /// The placed tile for `code`.
    pub fn resolve(&mut self, code: u32) -> Result<TileId> {
        self.codespace.resolve(code, &mut self.tiles, &mut self.atlas)
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn add_tileset(&mut self, offset: u32, tileset: impl Into<Tileset>) -> Result<TilesetId> {
        self.codespace
            .add_tileset(offset, tileset.into(), &mut self.tiles, &mut self.atlas)
    }

    pub fn remove_tileset(&mut self, offset: u32) -> Result<bool> {
        self.codespace
            .remove_tileset(offset, &mut self.tiles, &mut self.atlas)
    }

    /// Sync one page before drawing with it. Returns the upload count.
    pub fn bind_page(&mut self, page: PageId) -> usize {
        self.atlas.bind(page)
    }

    pub fn bind_all(&mut self) -> usize {
        self.atlas.bind_all()
    }

    pub fn cleanup(&mut self) -> usize {
        self.atlas.cleanup()
    }

    pub fn defragment(&mut self) {
        self.atlas.defragment();
    }

    pub fn dump(&self, dir: &Path) -> image::ImageResult<Vec<PathBuf>> {
        self.atlas.dump(dir)
    }

    /// Release every tile, page and provider.
    pub fn clear(&mut self) -> Result<()> {
        self.atlas.clear(&mut self.tiles);
        self.codespace.clear(&mut self.tiles, &mut self.atlas)?;
        log::debug!("resources: cleared, {} tile(s) still referenced", self.tiles.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tilegrid_core::{Bitmap, Color, Size};

    use super::*;
    use crate::Error;
    use crate::texture::recording::{RecordingTextures, Upload};
    use crate::tileset::{BitmapTileset, BitmapTilesetConfig};

    fn resources() -> (Resources<RecordingTextures>, RecordingTextures) {
        let factory = RecordingTextures::default();
        let res = Resources::new(ResourcesConfig::default(), GpuCaps::default(), factory.clone());
        (res, factory)
    }

    fn sprite(size: i32) -> BitmapTileset {
        BitmapTileset::from_bitmap(
            Bitmap::new(Size::new(size, size), Color::WHITE),
            BitmapTilesetConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn resolving_places_and_binding_uploads() {
        let (mut res, factory) = resources();
        let id = res.resolve(0x2588).unwrap();
        let tile = res.tile(id).unwrap();
        assert_eq!(tile.size(), Size::new(8, 16));
        let page = tile.page().unwrap();

        assert_eq!(res.bind_page(page), 1);
        assert_eq!(factory.take(), vec![Upload::Full(Size::new(256, 256))]);

        res.resolve(0x2580).unwrap();
        assert_eq!(res.bind_page(page), 1);
        assert!(matches!(factory.take()[..], [Upload::Partial(..)]));
    }

    #[test]
    fn sprites_come_and_go_with_their_tileset() {
        let (mut res, _) = resources();
        res.resolve(0x2500).unwrap();
        res.add_tileset(0xE000, sprite(150)).unwrap();
        let id = res.resolve(0xE000).unwrap();
        assert_eq!(res.atlas().len(), 2);
        assert_eq!(res.tile(id).unwrap().size(), Size::new(150, 150));

        assert!(res.remove_tileset(0xE000).unwrap());
        assert_eq!(res.atlas().len(), 1);
        assert!(res.tile(id).is_none());
    }

    #[test]
    fn oversized_sprites_are_reported() {
        let caps = GpuCaps {
            max_texture_size: 128,
            npot: true,
        };
        let mut res = Resources::new(ResourcesConfig::default(), caps, RecordingTextures::default());
        res.add_tileset(0xE000, sprite(200)).unwrap();
        assert!(matches!(res.resolve(0xE000), Err(Error::TileTooLarge { .. })));
        assert_eq!(res.tiles().len(), 0);
    }

    #[test]
    fn clear_leaves_nothing_behind() {
        let (mut res, _) = resources();
        res.add_tileset(0xE000, sprite(20)).unwrap();
        res.resolve(0xE000).unwrap();
        res.resolve(0x2500).unwrap();
        res.resolve('x' as u32).unwrap();
        res.clear().unwrap();
        assert!(res.tiles().is_empty());
        assert!(res.atlas().is_empty());
        assert_eq!(res.codespace().cached_len(), 0);
    }
}
