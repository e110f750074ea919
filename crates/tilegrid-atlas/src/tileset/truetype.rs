//! Outline-font tilesets rasterized with fontdue.

use std::path::Path;

use fontdue::{Font, FontSettings, LineMetrics};
use tilegrid_core::{Bitmap, Color, Point, Size};

use super::TilesetError;
use crate::tile::{Alignment, Tile, TileOptions};

/// Rasterization settings for a [`TrueTypeTileset`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrueTypeConfig {
    /// Font size in pixels.
    pub size: f32,
    /// `TopLeft` pins glyphs to the cell box at the baseline; `Center`
    /// positions them relative to the cell centre. Other values act as
    /// `TopLeft`.
    pub alignment: Alignment,
    /// Cells covered by each glyph.
    pub spacing: Size,
}

impl Default for TrueTypeConfig {
    fn default() -> Self {
        Self {
            size: 16.0,
            alignment: Alignment::TopLeft,
            spacing: Size::new(1, 1),
        }
    }
}

/// Glyph tiles rendered on request from an outline font.
///
/// Relative codes are Unicode scalar values. The replacement character is
/// never provided so that the procedural one is used instead.
pub struct TrueTypeTileset {
    font: Font,
    config: TrueTypeConfig,
    cell: Size,
    ascent: i32,
}

impl std::fmt::Debug for TrueTypeTileset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueTypeTileset")
            .field("config", &self.config)
            .field("cell", &self.cell)
            .finish_non_exhaustive()
    }
}

impl TrueTypeTileset {
    pub fn from_bytes(data: &[u8], config: TrueTypeConfig) -> Result<Self, TilesetError> {
        if !(config.size.is_finite() && config.size >= 1.0) {
            return Err(TilesetError::InvalidFont("font size must be at least one pixel"));
        }
        let settings = FontSettings {
            scale: config.size,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(data, settings).map_err(TilesetError::InvalidFont)?;

        let metrics = font
            .horizontal_line_metrics(config.size)
            .unwrap_or(LineMetrics {
                ascent: config.size * 0.8,
                descent: -(config.size * 0.2),
                line_gap: 0.0,
                new_line_size: config.size,
            });
        let height = (metrics.ascent - metrics.descent).ceil() as i32;
        let (m_metrics, _) = font.rasterize('M', config.size);
        let width = m_metrics.advance_width.ceil() as i32;
        let cell = Size::new(width.max(1), height.max(1));
        log::debug!("truetype tileset: {} px, cell {cell}", config.size);

        Ok(Self {
            font,
            config,
            cell,
            ascent: metrics.ascent.ceil() as i32,
        })
    }

    pub fn open(path: impl AsRef<Path>, config: TrueTypeConfig) -> Result<Self, TilesetError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data, config)
    }

    /// Cell box derived from the line metrics and the advance of `M`.
    pub fn cell_size(&self) -> Size {
        self.cell
    }

    fn char_for(&self, code: u32) -> Option<char> {
        char::from_u32(code)
            .filter(|&c| c != char::REPLACEMENT_CHARACTER)
            .filter(|&c| self.font.lookup_glyph_index(c) != 0)
    }

    pub fn provides(&self, code: u32) -> bool {
        self.char_for(code).is_some()
    }

    pub fn produce(&self, code: u32) -> Result<Tile, TilesetError> {
        let ch = self.char_for(code).ok_or(TilesetError::NotProvided(code))?;
        let (metrics, coverage) = self.font.rasterize(ch, self.config.size);
        let size = Size::new(metrics.width as i32, metrics.height as i32);
        let bitmap =
            Bitmap::from_alpha(size, &coverage, Color::WHITE).ok_or(TilesetError::InvalidSize(size))?;

        // Top-left of the glyph inside the cell box, on the baseline.
        let glyph = Point::new(metrics.xmin, self.ascent - metrics.ymin - size.height);
        let (alignment, offset) = match self.config.alignment {
            Alignment::Center => (
                Alignment::Center,
                glyph.shift(-self.cell.width / 2, -self.cell.height / 2),
            ),
            _ => (Alignment::TopLeft, glyph),
        };
        let options = TileOptions {
            alignment,
            offset,
            spacing: self.config.spacing,
        };
        Ok(Tile::with_options(bitmap, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";

    /// A monospace font from the host, when one is installed.
    fn system_font(config: TrueTypeConfig) -> Option<TrueTypeTileset> {
        let data = std::fs::read(SYSTEM_FONT).ok()?;
        Some(TrueTypeTileset::from_bytes(&data, config).unwrap())
    }

    #[test]
    fn rejects_garbage_and_bad_sizes() {
        assert!(matches!(
            TrueTypeTileset::from_bytes(b"definitely not a font", TrueTypeConfig::default()),
            Err(TilesetError::InvalidFont(_))
        ));
        let tiny = TrueTypeConfig {
            size: 0.0,
            ..TrueTypeConfig::default()
        };
        assert!(matches!(
            TrueTypeTileset::from_bytes(&[], tiny),
            Err(TilesetError::InvalidFont(_))
        ));
        assert!(matches!(
            TrueTypeTileset::open("/nonexistent/font.ttf", TrueTypeConfig::default()),
            Err(TilesetError::Io(_))
        ));
    }

    #[test]
    fn glyphs_sit_inside_the_cell() {
        let Some(ts) = system_font(TrueTypeConfig::default()) else {
            return;
        };
        let cell = ts.cell_size();
        assert!(cell.width > 0 && cell.height > 0);
        assert!(ts.provides('A' as u32));
        assert!(!ts.provides(0xFFFD));
        assert!(!ts.provides(0xD800));

        let tile = ts.produce('A' as u32).unwrap();
        assert_eq!(tile.alignment, Alignment::TopLeft);
        assert!(!tile.bitmap.is_empty());
        assert!(tile.offset.y >= 0);
        assert!(tile.offset.y + tile.bitmap.height() <= cell.height);
        assert!(tile.bitmap.pixels().iter().all(|c| c.same_rgb(Color::WHITE)));
    }

    #[test]
    fn centred_glyphs_are_offset_from_the_middle() {
        let config = TrueTypeConfig {
            alignment: Alignment::Center,
            ..TrueTypeConfig::default()
        };
        let Some(ts) = system_font(config) else {
            return;
        };
        let tile = ts.produce('g' as u32).unwrap();
        assert_eq!(tile.alignment, Alignment::Center);
        assert!(tile.offset.y < 0);
        assert!(tile.offset.y + tile.bitmap.height() > 0);
    }
}
