/// Axis-aligned pixel rectangle. May extend past the canvas; drawing clips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.h
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersection with `other`; empty rectangles have zero size.
    pub fn clip_to(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let w = (self.right().min(other.right()) - x).max(0);
        let h = (self.bottom().min(other.bottom()) - y).max(0);
        PixelRect::new(x, y, w, h)
    }
}

/// Opaque RGBA raster, row-major, row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: [u8; 3]) -> Self {
        let mut pixels = vec![255u8; width * height * 4];
        for px in pixels.chunks_exact_mut(4) {
            px[..3].copy_from_slice(&background);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// RGBA bytes, `width * height * 4` long.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i64, self.height as i64)
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let off = (y * self.width + x) * 4;
        [
            self.pixels[off],
            self.pixels[off + 1],
            self.pixels[off + 2],
            self.pixels[off + 3],
        ]
    }

    /// Set one pixel; out-of-bounds coordinates are ignored.
    pub fn set(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let off = (y as usize * self.width + x as usize) * 4;
        self.pixels[off] = color[0];
        self.pixels[off + 1] = color[1];
        self.pixels[off + 2] = color[2];
        self.pixels[off + 3] = 255;
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: [u8; 3]) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set(x, y, color);
            }
        }
    }

    /// One-pixel outline just inside `rect`.
    pub fn stroke_rect(&mut self, rect: PixelRect, color: [u8; 3]) {
        let (r, b) = (rect.right() - 1, rect.bottom() - 1);
        self.line(rect.x, rect.y, r, rect.y, color, None);
        self.line(rect.x, b, r, b, color, None);
        self.line(rect.x, rect.y, rect.x, b, color, None);
        self.line(r, rect.y, r, b, color, None);
    }

    /// Bresenham line, inclusive of both ends, optionally clipped to `clip`.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3], clip: Option<PixelRect>) {
        self.walk_line(x0, y0, x1, y1, |canvas, x, y| {
            if clip.is_none_or(|c| c.contains(x, y)) {
                canvas.set(x, y, color);
            }
        });
    }

    /// Visit every pixel on the Bresenham path from `(x0, y0)` to `(x1, y1)`.
    pub fn walk_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, mut plot: impl FnMut(&mut Self, i64, i64)) {
        let mut cx = x0;
        let mut cy = y0;
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            plot(self, cx, cy);
            if cx == x1 && cy == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                cx += sx;
            }
            if e2 <= dx {
                err += dx;
                cy += sy;
            }
        }
    }

    /// Square brush of side `size` centred on `(x, y)`.
    pub fn stamp(&mut self, x: i64, y: i64, size: i64, color: [u8; 3], clip: Option<PixelRect>) {
        let half = size / 2;
        for py in y - half..y - half + size.max(1) {
            for px in x - half..x - half + size.max(1) {
                if clip.is_none_or(|c| c.contains(px, py)) {
                    self.set(px, py, color);
                }
            }
        }
    }
}
