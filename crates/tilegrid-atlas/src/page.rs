//! One atlas page: a CPU canvas mirrored into a GPU texture, packed with a
//! guillotine free-rectangle allocator.
//!
//! The free list is kept sorted by ascending area, so the first rectangle
//! that fits is also (approximately) the tightest one. Every placement
//! reserves its bitmap size rounded up to a multiple of four plus a one
//! pixel bleed border, and records the written area as dirty. [`Page::bind`]
//! later pushes dirty rows to the texture in as few uploads as possible.

use std::fmt;

use tilegrid_core::{Bitmap, Color, Point, Rect, Size};

use crate::config::GpuCaps;
use crate::error::{Error, Result};
use crate::texture::Texture;
use crate::tile::{Placement, TexCoords, TileArena, TileId};

/// Placements are rounded up to this many pixels per axis.
const GRANULARITY: i32 = 4;

/// A page refuses new tiles once its only tile covers more than
/// `1 / SPRITE_FRACTION` of it.
const SPRITE_FRACTION: i64 = 4;

/// Stable identifier of a page within its atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(u64);

impl PageId {
    pub(crate) const fn new(serial: u64) -> Self {
        Self(serial)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page#{}", self.0)
    }
}

/// Padded allocation size for a bitmap of `size`.
pub(crate) fn padded_size(size: Size) -> Size {
    let r = size.round_up_to(GRANULARITY);
    Size::new(r.width + 2, r.height + 2)
}

/// A packed texture page.
#[derive(Debug)]
pub struct Page<T> {
    id: PageId,
    caps: GpuCaps,
    keep_bitmaps: bool,
    canvas: Bitmap,
    texture: T,
    /// Canvas size at the last full upload.
    synced: Option<Size>,
    spaces: Vec<Rect>,
    dirty: Vec<Rect>,
    tiles: Vec<TileId>,
}

impl<T: Texture> Page<T> {
    /// An empty page. `size` is rounded to a power of two when the device
    /// lacks NPOT support; callers pick sizes that stay within the ceiling
    /// after rounding (see [`GpuCaps::page_side`]).
    pub(crate) fn new(id: PageId, size: Size, texture: T, caps: GpuCaps, keep_bitmaps: bool) -> Self {
        let size = caps.texture_size(size);
        log::debug!("{id}: created at {size}");
        Self {
            id,
            caps,
            keep_bitmaps,
            canvas: Bitmap::new(size, Color::TRANSPARENT),
            texture,
            synced: None,
            spaces: vec![Rect::from_size(size)],
            dirty: Vec::new(),
            tiles: Vec::new(),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// Current canvas size in pixels.
    pub fn size(&self) -> Size {
        self.canvas.size()
    }

    pub fn canvas(&self) -> &Bitmap {
        &self.canvas
    }

    pub fn texture(&self) -> &T {
        &self.texture
    }

    pub fn texture_mut(&mut self) -> &mut T {
        &mut self.texture
    }

    /// Tiles placed on this page, in placement order.
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn holds(&self, id: TileId) -> bool {
        self.tiles.contains(&id)
    }

    /// Free rectangles, ascending by area.
    pub fn free_spaces(&self) -> &[Rect] {
        &self.spaces
    }

    pub fn free_area(&self) -> i64 {
        self.spaces.iter().map(|r| r.area()).sum()
    }

    /// Regions written since the last [`bind`](Page::bind).
    pub fn dirty_regions(&self) -> &[Rect] {
        &self.dirty
    }

    /// Place the tile on this page.
    ///
    /// Returns `Ok(false)` when it does not fit even after growing the page
    /// to the device limit, or when the page has become a dedicated sprite
    /// page. Errors are reserved for misuse: a stale id or a tile that is
    /// already placed.
    pub fn add(&mut self, tiles: &mut TileArena, id: TileId) -> Result<bool> {
        let tile = tiles.get(id).ok_or(Error::StaleTile(id))?;
        if let Some(page) = tile.page() {
            return Err(Error::AlreadyPlaced { tile: id, page });
        }
        let size = tile.bitmap.size();

        if let [only] = self.tiles.as_slice() {
            let occupied = tiles.get(*only).map(|t| t.total_space().area()).unwrap_or(0);
            if occupied * SPRITE_FRACTION > self.canvas.size().area() {
                return Ok(false);
            }
        }

        let padded = padded_size(size);
        let index = loop {
            if let Some(i) = self.spaces.iter().position(|s| s.size().fits(padded)) {
                break i;
            }
            if !self.try_grow(tiles) {
                log::trace!("{}: no room for {padded}", self.id);
                return Ok(false);
            }
        };

        let space = self.spaces[index];
        let reserved = Rect::at(space.location(), padded);
        let useful = Rect::at(space.location().shift(1, 1), size);

        let Some(tile) = tiles.get_mut(id) else {
            return Err(Error::StaleTile(id));
        };
        self.canvas.blit_all(&tile.bitmap, useful.location());
        self.canvas.replicate_border(useful);
        if !self.keep_bitmaps {
            tile.bitmap = Bitmap::default();
        }
        tile.placement = Some(Placement {
            page: self.id,
            useful,
            reserved,
            coords: TexCoords::of(useful, self.canvas.size()),
        });
        self.dirty.push(useful.inflate(1));
        self.split(index, padded);

        tiles.retain(id);
        self.tiles.push(id);
        log::trace!("{}: placed {id} at {useful}", self.id);
        Ok(true)
    }

    /// Cut the free rectangle at `index` around a `used` block at its
    /// top-left corner, keeping whichever cut leaves the larger piece whole.
    fn split(&mut self, index: usize, used: Size) {
        let s = self.spaces.swap_remove(index);
        let rest_w = s.width - used.width;
        let rest_h = s.height - used.height;
        let right_full = rest_w as i64 * s.height as i64;
        let below_full = s.width as i64 * rest_h as i64;

        let (right, below) = if right_full > below_full {
            (
                Rect::new(s.left + used.width, s.top, rest_w, s.height),
                Rect::new(s.left, s.top + used.height, used.width, rest_h),
            )
        } else {
            (
                Rect::new(s.left + used.width, s.top, rest_w, used.height),
                Rect::new(s.left, s.top + used.height, s.width, rest_h),
            )
        };

        self.spaces
            .extend([right, below].into_iter().filter(|r| r.area() > 0));
        self.sort_spaces();
    }

    fn sort_spaces(&mut self) {
        self.spaces.sort_by_key(|r| r.area());
    }

    /// Double the smaller dimension (height on a tie). Refused without any
    /// change when the result would exceed the device ceiling.
    pub fn try_grow(&mut self, tiles: &mut TileArena) -> bool {
        let old = self.canvas.size();
        let new = if old.height <= old.width {
            Size::new(old.width, old.height * 2)
        } else {
            Size::new(old.width * 2, old.height)
        };
        if !self.caps.allows(new) {
            log::debug!("{}: growth to {new} refused by device limit", self.id);
            return false;
        }

        let mut canvas = Bitmap::new(new, Color::TRANSPARENT);
        canvas.blit_all(&self.canvas, Point::ZERO);
        self.canvas = canvas;

        if new.width > old.width {
            self.spaces
                .push(Rect::new(old.width, 0, new.width - old.width, new.height));
        } else {
            self.spaces
                .push(Rect::new(0, old.height, new.width, new.height - old.height));
        }
        self.sort_spaces();

        for id in &self.tiles {
            if let Some(p) = tiles.get_mut(*id).and_then(|t| t.placement.as_mut()) {
                p.coords = TexCoords::of(p.useful, new);
            }
        }
        log::debug!("{}: grew from {old} to {new}", self.id);
        true
    }

    /// Detach the tile, giving its reservation back to the free list as-is.
    ///
    /// With `copy_back` the tile's pixels are read from the canvas into its
    /// own bitmap first, so it can be placed again later.
    pub fn remove(&mut self, tiles: &mut TileArena, id: TileId, copy_back: bool) -> Result<()> {
        let tile = tiles.get_mut(id).ok_or(Error::StaleTile(id))?;
        let position = self.tiles.iter().position(|t| *t == id);
        let (Some(position), Some(placement)) = (position, tile.placement) else {
            return Err(Error::OwnershipMismatch {
                tile: id,
                page: Some(self.id),
            });
        };

        if copy_back {
            tile.bitmap = self.canvas.extract(placement.useful);
        }
        tile.placement = None;

        self.tiles.remove(position);
        self.spaces.push(placement.reserved);
        self.sort_spaces();
        tiles.release(id);
        log::trace!("{}: removed {id}", self.id);
        Ok(())
    }

    /// Replace the pixels of a placed tile with a bitmap of the same size.
    pub fn update(&mut self, tiles: &mut TileArena, id: TileId, bitmap: &Bitmap) -> Result<()> {
        let tile = tiles.get_mut(id).ok_or(Error::StaleTile(id))?;
        let placement = match tile.placement {
            Some(p) if p.page == self.id => p,
            _ => {
                return Err(Error::OwnershipMismatch {
                    tile: id,
                    page: Some(self.id),
                });
            }
        };
        if bitmap.size() != placement.useful.size() {
            return Err(Error::SizeMismatch {
                expected: placement.useful.size(),
                actual: bitmap.size(),
            });
        }
        self.canvas.blit_all(bitmap, placement.useful.location());
        self.canvas.replicate_border(placement.useful);
        if self.keep_bitmaps {
            tile.bitmap = bitmap.clone();
        }
        self.dirty.push(placement.useful.inflate(1));
        Ok(())
    }

    /// Push the canvas to the texture; call right before drawing with it.
    ///
    /// After a size change the whole canvas is uploaded once. Otherwise the
    /// dirty regions are merged into full-width bands of touching rows and
    /// each band is uploaded separately. Returns the number of uploads.
    pub fn bind(&mut self) -> usize {
        let size = self.canvas.size();
        if self.synced != Some(size) {
            self.texture.upload(&self.canvas);
            self.synced = Some(size);
            self.dirty.clear();
            log::trace!("{}: full upload at {size}", self.id);
            return 1;
        }
        if self.dirty.is_empty() {
            return 0;
        }

        let bands = merge_bands(&mut self.dirty, size.height);
        self.dirty.clear();
        for &(top, bottom) in &bands {
            let area = Rect::new(0, top, size.width, bottom - top);
            self.texture.update(area, self.canvas.rows(top, bottom));
        }
        log::trace!("{}: {} band upload(s)", self.id, bands.len());
        bands.len()
    }

    /// Re-sort the free list by ascending area. Free rectangles are not
    /// merged and live tiles are not moved.
    pub fn defragment(&mut self) {
        self.sort_spaces();
    }

    /// Detach every tile without copying pixels back.
    pub(crate) fn release_all(&mut self, tiles: &mut TileArena) {
        for id in self.tiles.drain(..) {
            if let Some(tile) = tiles.get_mut(id) {
                tile.placement = None;
            }
            tiles.release(id);
        }
        self.spaces = vec![Rect::from_size(self.canvas.size())];
        self.dirty.clear();
    }
}

/// Merge dirty rectangles into vertical spans `[top, bottom)` whose rows
/// touch or overlap, clamped to `height`. Sorts `dirty` by top edge.
fn merge_bands(dirty: &mut [Rect], height: i32) -> Vec<(i32, i32)> {
    dirty.sort_by_key(|r| r.top);
    let mut bands: Vec<(i32, i32)> = Vec::new();
    for r in dirty.iter() {
        let top = r.top.clamp(0, height);
        let bottom = r.bottom().clamp(0, height);
        if bottom <= top {
            continue;
        }
        match bands.last_mut() {
            Some(band) if top <= band.1 => band.1 = band.1.max(bottom),
            _ => bands.push((top, bottom)),
        }
    }
    bands
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::texture::HeadlessTexture;
    use crate::texture::recording::{RecordingTextures, Upload};
    use crate::texture::TextureFactory;
    use crate::tile::Tile;

    fn caps(max: u32) -> GpuCaps {
        GpuCaps {
            max_texture_size: max,
            npot: false,
        }
    }

    fn page(size: i32, max: u32) -> Page<HeadlessTexture> {
        Page::new(
            PageId::new(1),
            Size::new(size, size),
            HeadlessTexture::default(),
            caps(max),
            false,
        )
    }

    /// A bitmap whose every pixel is distinct, alpha included.
    fn patterned(w: i32, h: i32, seed: u8) -> Bitmap {
        let data = (0..w * h)
            .map(|i| Color::from_rgba(i as u8, (i / 256) as u8 ^ seed, seed, (i * 7) as u8))
            .collect();
        Bitmap::from_pixels(Size::new(w, h), data).unwrap()
    }

    fn new_tile(tiles: &mut TileArena, w: i32, h: i32) -> TileId {
        tiles.insert(Tile::new(patterned(w, h, 3)))
    }

    fn assert_disjoint<T: Texture>(page: &Page<T>, tiles: &TileArena) {
        let totals: Vec<Rect> = page
            .tiles()
            .iter()
            .map(|id| tiles.get(*id).unwrap().total_space())
            .collect();
        let bounds = Rect::from_size(page.size());
        for (i, a) in totals.iter().enumerate() {
            assert!(bounds.contains(*a), "{a} outside page");
            for b in &totals[i + 1..] {
                assert!(!a.overlaps(*b), "tiles {a} and {b} overlap");
            }
            for f in page.free_spaces() {
                assert!(!a.overlaps(*f), "free {f} overlaps tile {a}");
            }
        }
        for (i, a) in page.free_spaces().iter().enumerate() {
            assert!(bounds.contains(*a), "free {a} outside page");
            for b in &page.free_spaces()[i + 1..] {
                assert!(!a.overlaps(*b), "free {a} and {b} overlap");
            }
        }
    }

    #[test]
    fn ten_pixel_tile_on_fresh_page() {
        let mut tiles = TileArena::new();
        let mut p = page(256, 256);
        let id = new_tile(&mut tiles, 10, 10);
        assert!(p.add(&mut tiles, id).unwrap());

        let t = tiles.get(id).unwrap();
        assert_eq!(t.total_space().size(), Size::new(12, 12));
        assert_eq!(t.useful_space().location(), t.total_space().location().shift(1, 1));
        assert_eq!(t.useful_space().size(), Size::new(10, 10));
        assert_eq!(t.page(), Some(p.id()));
        assert_eq!(tiles.refs(id), 2);
        assert_eq!(p.dirty_regions(), &[t.total_space()]);
    }

    #[test]
    fn margins_are_exactly_one_pixel() {
        let mut tiles = TileArena::new();
        let mut p = page(128, 128);
        for (w, h) in [(1, 1), (3, 7), (8, 8), (13, 2), (5, 16)] {
            let id = new_tile(&mut tiles, w, h);
            assert!(p.add(&mut tiles, id).unwrap());
            let t = tiles.get(id).unwrap();
            let (u, o) = (t.useful_space(), t.total_space());
            assert_eq!(u.left - o.left, 1);
            assert_eq!(u.top - o.top, 1);
            assert_eq!(o.right() - u.right(), 1);
            assert_eq!(o.bottom() - u.bottom(), 1);
        }
    }

    #[test]
    fn random_packing_never_overlaps() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut tiles = TileArena::new();
        let mut p = page(64, 256);
        let mut placed = Vec::new();
        for _ in 0..400 {
            let id = new_tile(&mut tiles, rng.random_range(1..=20), rng.random_range(1..=20));
            if p.add(&mut tiles, id).unwrap() {
                placed.push(id);
            }
            assert_disjoint(&p, &tiles);
            if !placed.is_empty() && rng.random_range(0..4) == 0 {
                let victim = placed.swap_remove(rng.random_range(0..placed.len()));
                p.remove(&mut tiles, victim, false).unwrap();
                assert_disjoint(&p, &tiles);
            }
        }
        assert!(!placed.is_empty());
    }

    #[test]
    fn border_replicates_edge_pixels() {
        let mut tiles = TileArena::new();
        let mut p = page(64, 64);
        let src = patterned(5, 3, 9);
        let id = tiles.insert(Tile::new(src.clone()));
        p.add(&mut tiles, id).unwrap();
        let u = tiles.get(id).unwrap().useful_space();
        let canvas = p.canvas();
        for y in 0..3 {
            assert_eq!(canvas.get(Point::new(u.left - 1, u.top + y)), src.get(Point::new(0, y)));
            assert_eq!(canvas.get(Point::new(u.right(), u.top + y)), src.get(Point::new(4, y)));
        }
        for x in 0..5 {
            assert_eq!(canvas.get(Point::new(u.left + x, u.top - 1)), src.get(Point::new(x, 0)));
            assert_eq!(canvas.get(Point::new(u.left + x, u.bottom())), src.get(Point::new(x, 2)));
        }
    }

    #[test]
    fn growth_recomputes_texture_coords() {
        let mut tiles = TileArena::new();
        let mut p = page(32, 256);
        let first = new_tile(&mut tiles, 12, 12);
        assert!(p.add(&mut tiles, first).unwrap());
        let before = tiles.get(first).unwrap().texture_coords();

        // 14x14 padded blocks: four fit a 32x32 page, the fifth forces growth.
        for _ in 0..4 {
            let id = new_tile(&mut tiles, 12, 12);
            assert!(p.add(&mut tiles, id).unwrap());
        }
        assert!(p.size().area() > 32 * 32);

        let size = p.size();
        let t = tiles.get(first).unwrap();
        let u = t.useful_space();
        let c = t.texture_coords();
        assert_ne!(c, before);
        assert_eq!(c.tu1, u.left as f32 / size.width as f32);
        assert_eq!(c.tv1, u.top as f32 / size.height as f32);
        assert_eq!(c.tu2, u.right() as f32 / size.width as f32);
        assert_eq!(c.tv2, u.bottom() as f32 / size.height as f32);
        assert_disjoint(&p, &tiles);
    }

    #[test]
    fn growth_doubles_smaller_side_and_exposes_one_rect() {
        let mut tiles = TileArena::new();
        let mut p = page(32, 64);
        let id = new_tile(&mut tiles, 28, 28);
        p.add(&mut tiles, id).unwrap();
        let free_before = p.free_area();

        assert!(p.try_grow(&mut tiles));
        assert_eq!(p.size(), Size::new(32, 64));
        assert_eq!(p.free_area(), free_before + 32 * 32);
        assert!(p.free_spaces().contains(&Rect::new(0, 32, 32, 32)));

        assert!(p.try_grow(&mut tiles));
        assert_eq!(p.size(), Size::new(64, 64));
        assert!(p.free_spaces().contains(&Rect::new(32, 0, 32, 64)));

        assert!(!p.try_grow(&mut tiles));
        assert_eq!(p.size(), Size::new(64, 64));
    }

    #[test]
    fn add_fails_when_growth_is_exhausted() {
        let mut tiles = TileArena::new();
        let mut p = page(16, 32);
        let id = new_tile(&mut tiles, 40, 4);
        assert!(!p.add(&mut tiles, id).unwrap());
        assert!(!tiles.get(id).unwrap().is_placed());
        assert_eq!(tiles.refs(id), 1);
        assert_eq!(p.size(), Size::new(32, 32));
    }

    #[test]
    fn add_remove_cycles_do_not_leak() {
        let mut tiles = TileArena::new();
        let mut p = page(128, 128);
        let keep = new_tile(&mut tiles, 6, 9);
        p.add(&mut tiles, keep).unwrap();
        let free_before = p.free_area();
        for _ in 0..50 {
            let id = new_tile(&mut tiles, 10, 7);
            assert!(p.add(&mut tiles, id).unwrap());
            p.remove(&mut tiles, id, false).unwrap();
            tiles.release(id);
        }
        assert_eq!(p.free_area(), free_before);
        assert_eq!(tiles.len(), 1);
    }

    #[test]
    fn copy_back_round_trip_is_pixel_exact() {
        let mut tiles = TileArena::new();
        let mut p = page(64, 64);
        let original = patterned(7, 5, 42);
        let id = tiles.insert(Tile::new(original.clone()));
        p.add(&mut tiles, id).unwrap();
        assert!(tiles.get(id).unwrap().bitmap.is_empty());

        p.remove(&mut tiles, id, true).unwrap();
        let t = tiles.get(id).unwrap();
        assert_eq!(t.bitmap, original);
        assert!(!t.is_placed());
        assert!(p.is_empty());
    }

    #[test]
    fn remove_rejects_foreign_and_stale_tiles() {
        let mut tiles = TileArena::new();
        let mut a = page(64, 64);
        let mut b = Page::new(
            PageId::new(2),
            Size::new(64, 64),
            HeadlessTexture::default(),
            caps(64),
            false,
        );
        let id = new_tile(&mut tiles, 4, 4);
        a.add(&mut tiles, id).unwrap();
        assert!(matches!(
            b.remove(&mut tiles, id, false),
            Err(Error::OwnershipMismatch { .. })
        ));
        assert!(matches!(b.add(&mut tiles, id), Err(Error::AlreadyPlaced { .. })));

        let gone = new_tile(&mut tiles, 4, 4);
        tiles.release(gone);
        assert!(matches!(a.add(&mut tiles, gone), Err(Error::StaleTile(_))));
    }

    #[test]
    fn sprite_page_refuses_second_tile() {
        let mut tiles = TileArena::new();
        let mut p = page(64, 64);
        let big = new_tile(&mut tiles, 40, 40);
        assert!(p.add(&mut tiles, big).unwrap());
        let small = new_tile(&mut tiles, 2, 2);
        assert!(!p.add(&mut tiles, small).unwrap());
    }

    #[test]
    fn bind_uploads_full_then_bands() {
        let mut factory = RecordingTextures::default();
        let mut tiles = TileArena::new();
        let mut p = Page::new(PageId::new(1), Size::new(64, 64), factory.create_texture(), caps(128), false);

        assert_eq!(p.bind(), 1);
        assert_eq!(factory.take(), vec![Upload::Full(Size::new(64, 64))]);
        assert_eq!(p.bind(), 0);

        // Two tiles side by side in the first row share one band.
        for _ in 0..2 {
            let id = new_tile(&mut tiles, 8, 8);
            p.add(&mut tiles, id).unwrap();
        }
        assert_eq!(p.bind(), 1);
        let uploads = factory.take();
        assert_eq!(uploads.len(), 1);
        let Upload::Partial(area, len) = uploads[0] else {
            panic!("expected a partial upload");
        };
        assert_eq!(area.left, 0);
        assert_eq!(area.width, 64);
        assert_eq!(len as i64, area.area());
        assert!(p.dirty_regions().is_empty());
    }

    #[test]
    fn bind_after_growth_is_one_full_upload() {
        let mut factory = RecordingTextures::default();
        let mut tiles = TileArena::new();
        let mut p = Page::new(PageId::new(1), Size::new(16, 16), factory.create_texture(), caps(64), false);
        p.bind();
        factory.take();

        let id = new_tile(&mut tiles, 20, 4);
        assert!(p.add(&mut tiles, id).unwrap());
        assert_eq!(p.bind(), 1);
        assert_eq!(factory.take(), vec![Upload::Full(p.size())]);
    }

    #[test]
    fn bands_merge_touching_and_keep_gaps() {
        let mut dirty = vec![
            Rect::new(40, 20, 4, 4),
            Rect::new(0, 0, 10, 10),
            Rect::new(30, 10, 4, 2),
            Rect::new(5, 5, 2, 2),
            Rect::new(0, 60, 4, 10),
        ];
        assert_eq!(merge_bands(&mut dirty, 64), vec![(0, 12), (20, 24), (60, 64)]);
    }

    #[test]
    fn update_rewrites_pixels_in_place() {
        let mut tiles = TileArena::new();
        let mut p = page(64, 64);
        let id = new_tile(&mut tiles, 4, 4);
        p.add(&mut tiles, id).unwrap();
        p.bind();

        let fresh = Bitmap::new(Size::new(4, 4), Color::WHITE);
        p.update(&mut tiles, id, &fresh).unwrap();
        let u = tiles.get(id).unwrap().useful_space();
        assert_eq!(p.canvas().extract(u), fresh);
        assert_eq!(p.dirty_regions().len(), 1);

        let wrong = Bitmap::new(Size::new(5, 4), Color::WHITE);
        assert!(matches!(
            p.update(&mut tiles, id, &wrong),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn defragment_orders_free_list_by_area() {
        let mut tiles = TileArena::new();
        let mut p = page(128, 128);
        let ids: Vec<TileId> = (1..6).map(|i| new_tile(&mut tiles, i * 4, 4)).collect();
        for id in &ids {
            p.add(&mut tiles, *id).unwrap();
        }
        for id in ids.iter().rev() {
            p.remove(&mut tiles, *id, false).unwrap();
        }
        p.defragment();
        let areas: Vec<i64> = p.free_spaces().iter().map(|r| r.area()).collect();
        let mut sorted = areas.clone();
        sorted.sort();
        assert_eq!(areas, sorted);
        assert_eq!(p.free_area(), 128 * 128);
    }
}
