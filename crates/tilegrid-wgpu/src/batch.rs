//! Turning cell draw commands into per-page vertex batches.
//!
//! A rendering loop collects one [`Leaf`] per glyph to draw, calls
//! [`build_batches`], then for each [`PageBatch`] binds the page
//! ([`Resources::bind_page`]) and issues one draw call with its vertices.

use bytemuck::{Pod, Zeroable};
use tilegrid_atlas::{Error, PageId, Resources, Result, TextureFactory};
use tilegrid_core::{Color, Point, Rect, Size};

// ---------------------------------------------------------------------------
// GPU types (must match tile.wgsl)
// ---------------------------------------------------------------------------

/// One corner of a tile quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TileVertex {
    pub position: [f32; 2],   // pixels
    pub tex_coords: [f32; 2], // normalised
    pub color: u32,           // packed RGBA
}

impl TileVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TileVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            },
            // tex_coords
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 8,
                shader_location: 1,
            },
            // color
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Uint32,
                offset: 16,
                shader_location: 2,
            },
        ],
    };
}

/// WGSL source for drawing [`TileVertex`] triangles.
pub const SHADER: &str = include_str!("tile.wgsl");

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

/// Tint of a drawn tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LeafColor {
    Solid(Color),
    /// Top-left, top-right, bottom-right, bottom-left.
    Corners([Color; 4]),
}

/// One glyph to draw at a grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    pub code: u32,
    pub cell: Point,
    pub color: LeafColor,
}

impl Leaf {
    pub fn new(code: u32, cell: Point, color: Color) -> Self {
        Self {
            code,
            cell,
            color: LeafColor::Solid(color),
        }
    }
}

/// Vertices of every quad sampling one page, six per quad.
#[derive(Clone, Debug, PartialEq)]
pub struct PageBatch {
    pub page: PageId,
    pub vertices: Vec<TileVertex>,
}

impl PageBatch {
    pub fn quads(&self) -> usize {
        self.vertices.len() / 6
    }
}

/// Pixel rectangle a tile occupies when drawn at `cell`.
pub fn quad_rect(tile: &tilegrid_atlas::Tile, cell: Point, cell_size: Size) -> Rect {
    let cell_box = Rect::new(
        cell.x * cell_size.width,
        cell.y * cell_size.height,
        cell_size.width * tile.spacing.width.max(1),
        cell_size.height * tile.spacing.height.max(1),
    );
    let size = tile.size();
    let origin = tile.alignment.anchor(cell_box, size) + tile.offset;
    Rect::at(origin, size)
}

/// Resolve every leaf and group the resulting quads by page, pages in the
/// order they are first used.
///
/// Codes that cannot be resolved at all are skipped with a warning; other
/// failures abort.
pub fn build_batches<F: TextureFactory>(
    resources: &mut Resources<F>,
    leaves: &[Leaf],
    cell_size: Size,
) -> Result<Vec<PageBatch>> {
    let mut batches: Vec<PageBatch> = Vec::new();
    for leaf in leaves {
        let id = match resources.resolve(leaf.code) {
            Ok(id) => id,
            Err(Error::UnresolvedCode(code)) => {
                log::warn!("skipping unresolved code {code:#010x} at {}", leaf.cell);
                continue;
            }
            Err(e) => return Err(e),
        };
        let Some(tile) = resources.tile(id) else {
            continue;
        };
        let Some(page) = tile.page() else {
            continue;
        };
        if tile.size().is_empty() {
            continue;
        }

        let rect = quad_rect(tile, leaf.cell, cell_size);
        let uv = tile.texture_coords();
        let colors = match leaf.color {
            LeafColor::Solid(c) => [c; 4],
            LeafColor::Corners(cs) => cs,
        };
        let (l, t, r, b) = (
            rect.left as f32,
            rect.top as f32,
            rect.right() as f32,
            rect.bottom() as f32,
        );
        let corner = |x: f32, y: f32, u: f32, v: f32, c: Color| TileVertex {
            position: [x, y],
            tex_coords: [u, v],
            color: c.packed(),
        };
        let tl = corner(l, t, uv.tu1, uv.tv1, colors[0]);
        let tr = corner(r, t, uv.tu2, uv.tv1, colors[1]);
        let br = corner(r, b, uv.tu2, uv.tv2, colors[2]);
        let bl = corner(l, b, uv.tu1, uv.tv2, colors[3]);

        let batch = match batches.iter_mut().position(|b| b.page == page) {
            Some(i) => &mut batches[i],
            None => {
                batches.push(PageBatch {
                    page,
                    vertices: Vec::new(),
                });
                let last = batches.len() - 1;
                &mut batches[last]
            }
        };
        batch.vertices.extend_from_slice(&[tl, tr, br, tl, br, bl]);
    }
    Ok(batches)
}
