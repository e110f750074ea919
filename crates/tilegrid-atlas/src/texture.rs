//! The GPU texture seam.
//!
//! The atlas never talks to a graphics API directly. Each page owns one
//! [`Texture`] created by the [`TextureFactory`] the atlas was built with,
//! and pushes its CPU canvas into it from [`Page::bind`](crate::Page::bind).

use tilegrid_core::{Bitmap, Color, Rect, Size};

/// A GPU texture consumed (not owned) by a page.
///
/// Pixels are always `RGBA8`, row-major, tightly packed.
pub trait Texture {
    /// (Re)allocate the texture at the bitmap's size and upload all of it.
    fn upload(&mut self, bitmap: &Bitmap);

    /// Overwrite `area` of an existing texture whose size is unchanged.
    /// `pixels` holds exactly `area.width * area.height` colours.
    fn update(&mut self, area: Rect, pixels: &[Color]);
}

/// Creates the texture backing a new page.
pub trait TextureFactory {
    type Texture: Texture;

    fn create_texture(&mut self) -> Self::Texture;
}

// ---------------------------------------------------------------------------
// Headless
// ---------------------------------------------------------------------------

/// Texture without a GPU behind it. Remembers only its size; useful for
/// offline packing and atlas dumps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessTexture {
    pub size: Size,
}

impl Texture for HeadlessTexture {
    fn upload(&mut self, bitmap: &Bitmap) {
        self.size = bitmap.size();
    }

    fn update(&mut self, _area: Rect, _pixels: &[Color]) {}
}

/// Factory for [`HeadlessTexture`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessTextures;

impl TextureFactory for HeadlessTextures {
    type Texture = HeadlessTexture;

    fn create_texture(&mut self) -> HeadlessTexture {
        HeadlessTexture::default()
    }
}

// ---------------------------------------------------------------------------
// Recording double
// ---------------------------------------------------------------------------
