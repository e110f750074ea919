//! 8-bit-per-channel RGBA [`Color`], laid out exactly as GPU textures expect.

use bytemuck::{Pod, Zeroable};

/// An RGBA colour, one byte per channel, in memory order `r, g, b, a`.
///
/// The layout is `#[repr(C)]` so a `&[Color]` can be handed to a texture
/// upload as raw `RGBA8` bytes via [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent black, the canvas clear colour.
    pub const TRANSPARENT: Self = Self::from_rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);

    /// Construct from individual RGBA components.
    #[inline]
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque colour.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 255)
    }

    /// Same colour with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Pack into `0xAABBGGRR`, the little-endian reading of the byte layout.
    #[inline]
    pub const fn packed(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16) | ((self.a as u32) << 24)
    }

    /// Same RGB, ignoring alpha.
    #[inline]
    pub const fn same_rgb(self, other: Color) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Self::from_rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_matches_byte_layout() {
        let c = Color::from_rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.packed(), 0x4433_2211);
        let bytes: &[u8] = bytemuck::cast_slice(std::slice::from_ref(&c));
        assert_eq!(bytes, &[0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn array_conversions() {
        let c: Color = [1, 2, 3, 4].into();
        assert_eq!(c, Color::from_rgba(1, 2, 3, 4));
        let back: [u8; 4] = c.into();
        assert_eq!(back, [1, 2, 3, 4]);
    }

    #[test]
    fn rgb_comparison_ignores_alpha() {
        let a = Color::from_rgb(255, 0, 255);
        assert!(a.same_rgb(a.with_alpha(0)));
        assert!(!a.same_rgb(Color::WHITE));
    }
}
