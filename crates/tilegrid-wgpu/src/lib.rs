//! wgpu backend for tilegrid atlases.
//!
//! Provides the GPU side of the texture seam and the page-batched quad
//! builder a rendering loop draws with:
//!
//! - [`probe_caps`] reads the device texture limit once at startup.
//! - [`WgpuTextures`] is the [`TextureFactory`](tilegrid_atlas::TextureFactory)
//!   handed to [`Resources`](tilegrid_atlas::Resources); each page owns a
//!   [`WgpuTexture`].
//! - [`build_batches`] resolves [`Leaf`] draw commands and groups their
//!   quads by page, so every page is bound once per frame.
//!
//! Uses:
//! - [`wgpu`] for textures and the vertex layout
//! - [`bytemuck`] to hand pixels and vertices to the GPU without copies

mod batch;
mod texture;

pub use batch::{Leaf, LeafColor, PageBatch, SHADER, TileVertex, build_batches, quad_rect};
pub use texture::{WgpuTexture, WgpuTextures, probe_caps};
