//! Configuration for the atlas and the resource context.

use tilegrid_core::Size;

/// GPU texture capabilities, probed once when the display is opened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpuCaps {
    /// Largest texture dimension the device accepts, per axis.
    pub max_texture_size: u32,
    /// Whether non-power-of-two texture sizes are supported.
    pub npot: bool,
}

impl GpuCaps {
    /// Round `size` to what the device can allocate: powers of two unless
    /// NPOT is supported. The ceiling is not applied here.
    pub fn texture_size(&self, size: Size) -> Size {
        if self.npot {
            size
        } else {
            size.next_power_of_two()
        }
    }

    /// Side of a square page for a requested `side`, within the ceiling.
    ///
    /// Without NPOT support the side is rounded up to a power of two, or
    /// down when rounding up would pass `max_texture_size`.
    pub fn page_side(&self, side: u32) -> u32 {
        let side = side.min(self.max_texture_size).max(1);
        if self.npot || side.is_power_of_two() {
            return side;
        }
        match side.checked_next_power_of_two() {
            Some(up) if up <= self.max_texture_size => up,
            _ => 1 << (u32::BITS - 1 - side.leading_zeros()),
        }
    }

    /// Whether a texture of `size` can exist on this device.
    pub fn allows(&self, size: Size) -> bool {
        let max = self.max_texture_size.min(i32::MAX as u32) as i32;
        size.width > 0 && size.height > 0 && size.width <= max && size.height <= max
    }
}

impl Default for GpuCaps {
    fn default() -> Self {
        Self {
            max_texture_size: 8192,
            npot: true,
        }
    }
}

/// Atlas placement policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AtlasConfig {
    /// Side of a freshly created shared page, in pixels.
    pub page_size: u32,
    /// Tiles whose raw area exceeds this many pixels get a dedicated page.
    pub large_tile_area: u32,
    /// Keep each tile's source bitmap after it has been copied to a page.
    pub keep_bitmaps: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_size: 256,
            large_tile_area: 100 * 100,
            keep_bitmaps: false,
        }
    }
}

/// Configuration for [`Resources`](crate::Resources).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResourcesConfig {
    /// Grid cell size in pixels; sizes the procedural fallback tiles.
    pub cell_size: Size,
    pub atlas: AtlasConfig,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            cell_size: Size::new(8, 16),
            atlas: AtlasConfig::default(),
        }
    }
}
