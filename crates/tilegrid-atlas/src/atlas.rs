//! The ordered set of pages and the policy for choosing one.

use std::path::{Path, PathBuf};

use tilegrid_core::{Bitmap, Size};

use crate::config::{AtlasConfig, GpuCaps};
use crate::error::{Error, Result};
use crate::page::{Page, PageId, padded_size};
use crate::texture::TextureFactory;
use crate::tile::{TileArena, TileId};

/// All texture pages, in creation order.
///
/// Small tiles share pages; a tile whose raw area is above
/// [`AtlasConfig::large_tile_area`] gets a page of its own so that sprites do
/// not fragment the glyph pages.
pub struct Atlas<F: TextureFactory> {
    factory: F,
    caps: GpuCaps,
    config: AtlasConfig,
    pages: Vec<Page<F::Texture>>,
    next_page: u64,
}

impl<F: TextureFactory> Atlas<F> {
    pub fn new(factory: F, caps: GpuCaps, config: AtlasConfig) -> Self {
        Self {
            factory,
            caps,
            config,
            pages: Vec::new(),
            next_page: 1,
        }
    }

    pub fn caps(&self) -> GpuCaps {
        self.caps
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn pages(&self) -> &[Page<F::Texture>] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&Page<F::Texture>> {
        self.pages.iter().find(|p| p.id() == id)
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page<F::Texture>> {
        self.pages.iter_mut().find(|p| p.id() == id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn open_page(&mut self, size: Size) -> Page<F::Texture> {
        let id = PageId::new(self.next_page);
        self.next_page += 1;
        Page::new(id, size, self.factory.create_texture(), self.caps, self.config.keep_bitmaps)
    }

    fn too_large(&self, size: Size) -> Error {
        Error::TileTooLarge {
            size,
            max: self.caps.max_texture_size,
        }
    }

    /// Place an unplaced tile and return the page it landed on.
    pub fn add(&mut self, tiles: &mut TileArena, id: TileId) -> Result<PageId> {
        let tile = tiles.get(id).ok_or(Error::StaleTile(id))?;
        if let Some(page) = tile.page() {
            return Err(Error::AlreadyPlaced { tile: id, page });
        }
        let size = tile.bitmap.size();

        if size.area() > self.config.large_tile_area as i64 {
            let page_size = padded_size(size);
            if !self.caps.allows(self.caps.texture_size(page_size)) {
                return Err(self.too_large(size));
            }
            let mut page = self.open_page(page_size);
            if !page.add(tiles, id)? {
                return Err(self.too_large(size));
            }
            log::debug!("{}: dedicated to {id} ({size})", page.id());
            let page_id = page.id();
            self.pages.push(page);
            return Ok(page_id);
        }

        for page in &mut self.pages {
            if page.add(tiles, id)? {
                return Ok(page.id());
            }
        }

        let side = self.caps.page_side(self.config.page_size).min(i32::MAX as u32) as i32;
        let mut page = self.open_page(Size::new(side, side));
        if !page.add(tiles, id)? {
            return Err(self.too_large(size));
        }
        let page_id = page.id();
        self.pages.push(page);
        Ok(page_id)
    }

    /// Detach a tile from whichever page holds it.
    pub fn remove(&mut self, tiles: &mut TileArena, id: TileId, copy_back: bool) -> Result<()> {
        let tile = tiles.get(id).ok_or(Error::StaleTile(id))?;
        let Some(page_id) = tile.page() else {
            return Err(Error::OwnershipMismatch { tile: id, page: None });
        };
        let page = self.page_mut(page_id).ok_or(Error::OwnershipMismatch {
            tile: id,
            page: Some(page_id),
        })?;
        page.remove(tiles, id, copy_back)
    }

    /// Replace a placed tile's pixels with a bitmap of the same size.
    pub fn update(&mut self, tiles: &mut TileArena, id: TileId, bitmap: &Bitmap) -> Result<()> {
        let page_id = tiles
            .get(id)
            .ok_or(Error::StaleTile(id))?
            .page()
            .ok_or(Error::OwnershipMismatch { tile: id, page: None })?;
        let page = self.page_mut(page_id).ok_or(Error::OwnershipMismatch {
            tile: id,
            page: Some(page_id),
        })?;
        page.update(tiles, id, bitmap)
    }

    /// Drop every page holding no tiles. Returns how many were dropped.
    pub fn cleanup(&mut self) -> usize {
        let before = self.pages.len();
        self.pages.retain(|p| !p.is_empty());
        let dropped = before - self.pages.len();
        if dropped > 0 {
            log::debug!("atlas: dropped {dropped} empty page(s), {} left", self.pages.len());
        }
        dropped
    }

    pub fn defragment(&mut self) {
        for page in &mut self.pages {
            page.defragment();
        }
    }

    /// Sync one page to its texture. Returns the number of uploads, zero for
    /// an unknown page.
    pub fn bind(&mut self, id: PageId) -> usize {
        self.page_mut(id).map_or(0, |p| p.bind())
    }

    /// Sync every page. Returns the total number of uploads.
    pub fn bind_all(&mut self) -> usize {
        self.pages.iter_mut().map(|p| p.bind()).sum()
    }

    /// Write each page canvas to `dir/page-<n>.png`.
    pub fn dump(&self, dir: &Path) -> image::ImageResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(image::ImageError::IoError)?;
        let mut written = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let canvas = page.canvas();
            let path = dir.join(format!("page-{}.png", page.id().get()));
            image::save_buffer(
                &path,
                canvas.as_bytes(),
                canvas.width() as u32,
                canvas.height() as u32,
                image::ColorType::Rgba8,
            )?;
            log::debug!("{}: dumped to {}", page.id(), path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Drop all pages, releasing their tile references.
    pub fn clear(&mut self, tiles: &mut TileArena) {
        for page in &mut self.pages {
            page.release_all(tiles);
        }
        self.pages.clear();
    }
}
