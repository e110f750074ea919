//! Code-point resolution: the provider registry and the resolved-tile cache.
//!
//! A code is 32 bits: the font slot in the top byte and the character in
//! the low 24 bits. Providers are registered under an offset and asked about
//! `code - offset`; the one with the highest offset not above the code wins.
//! Codes no provider covers fall back to procedural tiles for the character
//! bits, and then to the replacement glyph of the same font slot.

use std::collections::{BTreeMap, HashMap};

use tilegrid_core::Size;

use crate::atlas::Atlas;
use crate::error::{Error, Result};
use crate::texture::TextureFactory;
use crate::tile::{TileArena, TileId};
use crate::tileset::{DynamicTileset, Tileset, TilesetId};

/// Font slot bits of a code.
pub const FONT_MASK: u32 = 0xFF00_0000;
/// Character bits of a code.
pub const CHAR_MASK: u32 = 0x00FF_FFFF;
/// The Unicode replacement character.
pub const REPLACEMENT: u32 = 0xFFFD;

/// The replacement code within the font slot of `code`.
pub const fn replacement_for(code: u32) -> u32 {
    (code & FONT_MASK) | REPLACEMENT
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// A registered tileset plus the tiles it has produced so far.
///
/// The provider holds one arena reference per produced tile, so a tile that
/// was evicted from the cache and its page can be placed again later
/// without rendering it a second time.
#[derive(Debug)]
struct Provider {
    id: TilesetId,
    offset: u32,
    tileset: Tileset,
    tiles: HashMap<u32, TileId>,
}

impl Provider {
    fn new(id: TilesetId, offset: u32, tileset: Tileset) -> Self {
        Self {
            id,
            offset,
            tileset,
            tiles: HashMap::new(),
        }
    }

    /// The placed tile for a relative code, reusing a previously produced
    /// one when it is still alive.
    fn tile<F: TextureFactory>(
        &mut self,
        code: u32,
        tiles: &mut TileArena,
        atlas: &mut Atlas<F>,
    ) -> Result<TileId> {
        if let Some(&id) = self.tiles.get(&code) {
            match tiles.get(id).map(|t| t.is_placed()) {
                Some(true) => return Ok(id),
                Some(false) => {
                    atlas.add(tiles, id)?;
                    return Ok(id);
                }
                None => {
                    self.tiles.remove(&code);
                }
            }
        }

        let mut tile = self.tileset.produce(code)?;
        tile.provider = Some(self.id);
        let id = tiles.insert(tile);
        if let Err(e) = atlas.add(tiles, id) {
            tiles.release(id);
            return Err(e);
        }
        self.tiles.insert(code, id);
        log::trace!("{}: produced {id} for {code:#x}", self.id);
        Ok(id)
    }

    /// Detach every produced tile from its page and drop our references.
    fn destroy<F: TextureFactory>(&mut self, tiles: &mut TileArena, atlas: &mut Atlas<F>) -> Result<()> {
        for (_, id) in self.tiles.drain() {
            if tiles.get(id).is_some_and(|t| t.is_placed()) {
                atlas.remove(tiles, id, false)?;
            }
            tiles.release(id);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Codespace
// ---------------------------------------------------------------------------

/// Who resolved a cache entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Source {
    Tileset { id: TilesetId, offset: u32 },
    Fallback,
}

impl Source {
    /// Whether a provider newly registered at `offset` outranks this source.
    fn outranked_by(self, offset: u32) -> bool {
        match self {
            Self::Tileset { offset: own, .. } => own < offset,
            Self::Fallback => true,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Entry {
    tile: TileId,
    source: Source,
    /// Resolved through the replacement glyph rather than the code itself.
    substitute: bool,
}

/// The provider registry and the code → tile cache.
///
/// Each cache entry owns one arena reference to its tile.
#[derive(Debug)]
pub struct Codespace {
    providers: BTreeMap<u32, Provider>,
    fallback: Provider,
    entries: HashMap<u32, Entry>,
    next_id: u64,
}

impl Codespace {
    /// An empty registry whose procedural fallback draws at `cell_size`.
    pub fn new(cell_size: Size) -> Self {
        let fallback = Provider::new(TilesetId::new(0), 0, DynamicTileset::new(cell_size).into());
        Self {
            providers: BTreeMap::new(),
            fallback,
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registered offsets in ascending order.
    pub fn tileset_offsets(&self) -> impl Iterator<Item = u32> + '_ {
        self.providers.keys().copied()
    }

    pub fn tileset(&self, offset: u32) -> Option<&Tileset> {
        self.providers.get(&offset).map(|p| &p.tileset)
    }

    /// Cached tile for `code`, without resolving.
    pub fn get(&self, code: u32) -> Option<TileId> {
        self.entries.get(&code).map(|e| e.tile)
    }

    pub fn cached_len(&self) -> usize {
        self.entries.len()
    }

    /// Register `tileset` at `offset`, replacing any provider already there.
    ///
    /// Cached entries for codes the new provider covers are evicted when
    /// they came from a lower-priority source or from the replacement glyph.
    /// Their tiles are read back from the page, so the provider that made
    /// them can place them again without re-rendering.
    pub fn add_tileset<F: TextureFactory>(
        &mut self,
        offset: u32,
        tileset: Tileset,
        tiles: &mut TileArena,
        atlas: &mut Atlas<F>,
    ) -> Result<TilesetId> {
        if self.providers.contains_key(&offset) {
            self.remove_tileset(offset, tiles, atlas)?;
        }
        let id = TilesetId::new(self.next_id);
        self.next_id += 1;

        let covers = |code: u32| code >= offset && tileset.provides(code - offset);
        let victims: Vec<u32> = self
            .entries
            .iter()
            .filter(|&(&code, e)| {
                (covers(code) && (e.substitute || e.source.outranked_by(offset)))
                    || (e.substitute && covers(replacement_for(code)))
            })
            .map(|(&code, _)| code)
            .collect();

        for code in &victims {
            self.evict(*code, true, tiles, atlas)?;
        }
        log::debug!(
            "{id}: registered at {offset:#010x}, evicted {} cached code(s)",
            victims.len()
        );

        self.providers.insert(offset, Provider::new(id, offset, tileset));
        atlas.cleanup();
        Ok(id)
    }

    /// Unregister the provider at `offset`, evicting every entry it resolved
    /// and destroying its tiles. Returns whether a provider was registered.
    pub fn remove_tileset<F: TextureFactory>(
        &mut self,
        offset: u32,
        tiles: &mut TileArena,
        atlas: &mut Atlas<F>,
    ) -> Result<bool> {
        let Some(mut provider) = self.providers.remove(&offset) else {
            return Ok(false);
        };
        let victims: Vec<u32> = self
            .entries
            .iter()
            .filter(|(_, e)| matches!(e.source, Source::Tileset { id, .. } if id == provider.id))
            .map(|(&code, _)| code)
            .collect();
        for code in &victims {
            self.evict(*code, false, tiles, atlas)?;
        }
        provider.destroy(tiles, atlas)?;
        log::debug!(
            "{}: removed from {offset:#010x}, evicted {} cached code(s)",
            provider.id,
            victims.len()
        );
        atlas.cleanup();
        Ok(true)
    }

    /// Drop the cache entry for `code`. When no other entry still maps to
    /// the tile it is detached from its page, with a read-back if asked.
    fn evict<F: TextureFactory>(
        &mut self,
        code: u32,
        copy_back: bool,
        tiles: &mut TileArena,
        atlas: &mut Atlas<F>,
    ) -> Result<()> {
        let Some(entry) = self.entries.remove(&code) else {
            return Ok(());
        };
        // Held by this entry, the producing provider and, when placed, the
        // page. Anything above that is another cache entry.
        let placed = tiles.get(entry.tile).is_some_and(|t| t.is_placed());
        let shared = tiles.refs(entry.tile) > 2 + u32::from(placed);
        if placed && !shared {
            atlas.remove(tiles, entry.tile, copy_back)?;
        }
        tiles.release(entry.tile);
        Ok(())
    }

    /// The placed tile for `code`, resolving and caching it on a miss.
    pub fn resolve<F: TextureFactory>(
        &mut self,
        code: u32,
        tiles: &mut TileArena,
        atlas: &mut Atlas<F>,
    ) -> Result<TileId> {
        if let Some(entry) = self.entries.get(&code) {
            let id = entry.tile;
            match tiles.get(id).map(|t| t.is_placed()) {
                Some(true) => return Ok(id),
                Some(false) => {
                    atlas.add(tiles, id)?;
                    return Ok(id);
                }
                None => {
                    self.entries.remove(&code);
                }
            }
        }

        let (tile, source, substitute) = match self.lookup(code, tiles, atlas)? {
            Some((tile, source)) => (tile, source, false),
            None => {
                let replacement = replacement_for(code);
                match self.lookup(replacement, tiles, atlas)? {
                    Some((tile, source)) => {
                        log::warn!("no tile for {code:#010x}, substituting {replacement:#010x}");
                        (tile, source, true)
                    }
                    None => return Err(Error::UnresolvedCode(code)),
                }
            }
        };

        tiles.retain(tile);
        self.entries.insert(
            code,
            Entry {
                tile,
                source,
                substitute,
            },
        );
        Ok(tile)
    }

    /// Ask the providers, most specific first, then the fallback.
    fn lookup<F: TextureFactory>(
        &mut self,
        code: u32,
        tiles: &mut TileArena,
        atlas: &mut Atlas<F>,
    ) -> Result<Option<(TileId, Source)>> {
        for (&offset, provider) in self.providers.range_mut(..=code).rev() {
            let relative = code - offset;
            if provider.tileset.provides(relative) {
                let tile = provider.tile(relative, tiles, atlas)?;
                let source = Source::Tileset {
                    id: provider.id,
                    offset: provider.offset,
                };
                return Ok(Some((tile, source)));
            }
        }

        let ch = code & CHAR_MASK;
        if self.fallback.tileset.provides(ch) {
            let tile = self.fallback.tile(ch, tiles, atlas)?;
            return Ok(Some((tile, Source::Fallback)));
        }
        Ok(None)
    }

    /// Forget every entry and provider, releasing all their references.
    pub fn clear<F: TextureFactory>(&mut self, tiles: &mut TileArena, atlas: &mut Atlas<F>) -> Result<()> {
        let codes: Vec<u32> = self.entries.keys().copied().collect();
        for code in codes {
            self.evict(code, false, tiles, atlas)?;
        }
        for (_, mut provider) in std::mem::take(&mut self.providers) {
            provider.destroy(tiles, atlas)?;
        }
        self.fallback.destroy(tiles, atlas)?;
        atlas.cleanup();
        Ok(())
    }
}
