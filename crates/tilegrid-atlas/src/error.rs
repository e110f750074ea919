//! Error types for placement and resolution.

use std::fmt;

use tilegrid_core::Size;

use crate::page::PageId;
use crate::tile::TileId;
use crate::tileset::TilesetError;

/// Hard failures of the atlas and the codespace.
///
/// Running out of room on one page is not an error: [`Page::add`] returns
/// `Ok(false)` and the atlas moves on to another page.
///
/// [`Page::add`]: crate::Page::add
#[derive(Debug)]
pub enum Error {
    /// The id does not name a live tile.
    StaleTile(TileId),
    /// The tile is not held by the page it was removed from.
    OwnershipMismatch { tile: TileId, page: Option<PageId> },
    /// The tile already sits on a page.
    AlreadyPlaced { tile: TileId, page: PageId },
    /// A replacement bitmap does not match the placed tile's size.
    SizeMismatch { expected: Size, actual: Size },
    /// The tile cannot fit even an empty page grown to the device limit.
    TileTooLarge { size: Size, max: u32 },
    /// No provider, fallback or replacement glyph covers the code.
    UnresolvedCode(u32),
    /// A provider failed to produce a tile it claimed to provide.
    Tileset(TilesetError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleTile(id) => write!(f, "{id} does not refer to a live tile"),
            Self::OwnershipMismatch { tile, page: Some(page) } => {
                write!(f, "{tile} is not placed on {page}")
            }
            Self::OwnershipMismatch { tile, page: None } => write!(f, "{tile} is not placed"),
            Self::AlreadyPlaced { tile, page } => write!(f, "{tile} is already placed on {page}"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "bitmap of {actual} cannot replace a tile of {expected}")
            }
            Self::TileTooLarge { size, max } => {
                write!(f, "tile of {size} does not fit a page of at most {max}x{max}")
            }
            Self::UnresolvedCode(code) => write!(f, "no tile provides code {code:#010x}"),
            Self::Tileset(e) => write!(f, "tileset: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tileset(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TilesetError> for Error {
    fn from(e: TilesetError) -> Self {
        Self::Tileset(e)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
