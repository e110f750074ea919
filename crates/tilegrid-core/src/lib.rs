//! **tilegrid-core** — leaf value types for the tilegrid atlas backend.
//!
//! This crate provides the pixel-space geometry ([`Point`], [`Size`],
//! [`Rect`]), 8-bit RGBA [`Color`] and the CPU-side [`Bitmap`] that tiles and
//! atlas pages are built from.

pub mod bitmap;
pub mod color;
pub mod geom;

pub use bitmap::Bitmap;
pub use color::Color;
pub use geom::{ParseSizeError, Point, Rect, Size};
