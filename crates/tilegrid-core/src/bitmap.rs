//! The [`Bitmap`] type: a CPU-side RGBA pixel buffer.
//!
//! Bitmaps are the currency between tile providers, atlas page canvases and
//! GPU uploads. Pixels are stored row-major with no padding, so any run of
//! full rows is a contiguous slice that can be uploaded as-is.

use crate::color::Color;
use crate::geom::{Point, Rect, Size};

/// A row-major RGBA image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitmap {
    size: Size,
    data: Vec<Color>,
}

impl Bitmap {
    /// A bitmap of `size` filled with `color`. Negative dimensions are
    /// clamped to zero.
    pub fn new(size: Size, color: Color) -> Self {
        let size = Size::new(size.width.max(0), size.height.max(0));
        Self {
            size,
            data: vec![color; size.area() as usize],
        }
    }

    /// Wrap existing pixels. Returns `None` when the pixel count does not
    /// match `size`.
    pub fn from_pixels(size: Size, data: Vec<Color>) -> Option<Self> {
        if size.width < 0 || size.height < 0 || data.len() as i64 != size.area() {
            return None;
        }
        Some(Self { size, data })
    }

    /// Build from a monochrome coverage mask: every pixel is `color` with
    /// its alpha scaled by the coverage byte.
    pub fn from_alpha(size: Size, coverage: &[u8], color: Color) -> Option<Self> {
        if coverage.len() as i64 != size.area() {
            return None;
        }
        let data = coverage
            .iter()
            .map(|&a| color.with_alpha(((a as u16 * color.a as u16) / 255) as u8))
            .collect();
        Self::from_pixels(size, data)
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.size.height
    }

    /// Whether the bitmap holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.data
    }

    /// Raw `RGBA8` bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// The contiguous pixels of rows `top..bottom` (clamped to the bitmap).
    pub fn rows(&self, top: i32, bottom: i32) -> &[Color] {
        let top = top.clamp(0, self.size.height) as usize;
        let bottom = bottom.clamp(0, self.size.height) as usize;
        let w = self.size.width as usize;
        if bottom <= top {
            return &[];
        }
        &self.data[top * w..bottom * w]
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && x < self.size.width && y < self.size.height {
            Some(y as usize * self.size.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Read the pixel at `p`, or `None` outside the bitmap.
    #[inline]
    pub fn get(&self, p: Point) -> Option<Color> {
        self.index(p.x, p.y).map(|i| self.data[i])
    }

    /// Write the pixel at `p`. Writes outside the bitmap are ignored.
    #[inline]
    pub fn set(&mut self, p: Point, color: Color) {
        if let Some(i) = self.index(p.x, p.y) {
            self.data[i] = color;
        }
    }

    /// Fill `region` (clipped to the bitmap) with `color`.
    pub fn fill_rect(&mut self, region: Rect, color: Color) {
        let r = region.intersect(Rect::from_size(self.size));
        let w = self.size.width as usize;
        for y in r.top..r.bottom() {
            let start = y as usize * w + r.left as usize;
            self.data[start..start + r.width as usize].fill(color);
        }
    }

    /// Copy `src_region` of `src` so that its top-left lands on `dst`.
    /// Both the source region and the destination are clipped.
    pub fn blit(&mut self, src: &Bitmap, src_region: Rect, dst: Point) {
        let src_region = src_region.intersect(Rect::from_size(src.size));
        if src_region.is_empty() {
            return;
        }
        let target = Rect::at(dst, src_region.size()).intersect(Rect::from_size(self.size));
        if target.is_empty() {
            return;
        }
        let sx = src_region.left + (target.left - dst.x);
        let sy = src_region.top + (target.top - dst.y);
        let sw = src.size.width as usize;
        let dw = self.size.width as usize;
        let len = target.width as usize;
        for row in 0..target.height {
            let s = (sy + row) as usize * sw + sx as usize;
            let d = (target.top + row) as usize * dw + target.left as usize;
            self.data[d..d + len].copy_from_slice(&src.data[s..s + len]);
        }
    }

    /// Copy the whole of `src` with its top-left at `dst`.
    #[inline]
    pub fn blit_all(&mut self, src: &Bitmap, dst: Point) {
        self.blit(src, Rect::from_size(src.size), dst);
    }

    /// A copy of `region` (clipped) as a new bitmap.
    pub fn extract(&self, region: Rect) -> Bitmap {
        let region = region.intersect(Rect::from_size(self.size));
        let mut out = Bitmap::new(region.size(), Color::TRANSPARENT);
        out.blit(self, region, Point::ZERO);
        out
    }

    /// Duplicate the outermost rows and columns of `inner` into the one-pixel
    /// ring surrounding it, corners included. The ring is clipped to the
    /// bitmap.
    pub fn replicate_border(&mut self, inner: Rect) {
        if inner.is_empty() {
            return;
        }
        let (l, t, r, b) = (inner.left, inner.top, inner.right() - 1, inner.bottom() - 1);
        // Columns first, over the inner rows.
        for y in t..=b {
            if let Some(c) = self.get(Point::new(l, y)) {
                self.set(Point::new(l - 1, y), c);
            }
            if let Some(c) = self.get(Point::new(r, y)) {
                self.set(Point::new(r + 1, y), c);
            }
        }
        // Then rows, including the freshly written corner columns.
        for x in (l - 1)..=(r + 1) {
            if let Some(c) = self.get(Point::new(x, t)) {
                self.set(Point::new(x, t - 1), c);
            }
            if let Some(c) = self.get(Point::new(x, b)) {
                self.set(Point::new(x, b + 1), c);
            }
        }
    }

    /// Make every pixel whose RGB equals `key` fully transparent.
    pub fn make_transparent(&mut self, key: Color) {
        for px in &mut self.data {
            if px.same_rgb(key) {
                *px = Color::TRANSPARENT;
            }
        }
    }

    /// Nearest-neighbour resample to `size`.
    pub fn resize(&self, size: Size) -> Bitmap {
        let mut out = Bitmap::new(size, Color::TRANSPARENT);
        if self.is_empty() || out.is_empty() {
            return out;
        }
        for y in 0..out.size.height {
            let sy = (y as i64 * self.size.height as i64 / out.size.height as i64) as i32;
            for x in 0..out.size.width {
                let sx = (x as i64 * self.size.width as i64 / out.size.width as i64) as i32;
                let i = y as usize * out.size.width as usize + x as usize;
                out.data[i] = self.data[sy as usize * self.size.width as usize + sx as usize];
            }
        }
        out
    }
}
