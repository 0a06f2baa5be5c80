//! In-memory RGBA canvas the panel composites onto.
//!
//! The canvas is a plain `width * height * 4` byte buffer in RGBA order.
//! All drawing goes through the embedded-graphics [`DrawTarget`] impl, so
//! text, rectangles, and rounded rectangles come from that crate's
//! primitives; the bitmap operations the artwork path needs (alpha blit,
//! aspect-preserving downscale, quarter-turn rotation) are implemented
//! directly on the buffer.
//!
//! Nothing here touches the display. [`crate::fb`] converts the canvas to
//! the device's native byte order (BGRA for 32 bpp, RGB565 little-endian
//! for 16 bpp) and writes it out in one pass.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Owned RGBA pixel buffer with value semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    /// RGBA interleaved, row-major, tightly packed.
    pixels: Vec<u8>,
}

impl Canvas {
    /// Create a canvas filled with a solid opaque color.
    pub fn new(
        width: u32,
        height: u32,
        background: Rgb888,
    ) -> Self {
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        for px in pixels.chunks_exact_mut(4) {
            px[0] = background.r();
            px[1] = background.g();
            px[2] = background.b();
            px[3] = 0xFF;
        }
        Self { width, height, pixels }
    }

    /// Canvas width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    /// Canvas height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    #[inline]
    const fn index(
        &self,
        x: u32,
        y: u32,
    ) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Write one opaque pixel. Out-of-bounds coordinates are discarded.
    #[inline]
    pub fn set_pixel(
        &mut self,
        x: i32,
        y: i32,
        color: Rgb888,
    ) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let i = self.index(x as u32, y as u32);
        self.pixels[i] = color.r();
        self.pixels[i + 1] = color.g();
        self.pixels[i + 2] = color.b();
        self.pixels[i + 3] = 0xFF;
    }

    /// Read a pixel's RGB value, ignoring alpha. `None` out of bounds.
    #[inline]
    pub fn pixel(
        &self,
        x: i32,
        y: i32,
    ) -> Option<Rgb888> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let i = self.index(x as u32, y as u32);
        Some(Rgb888::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Alpha-composite `src` onto this canvas with its top-left at `(x, y)`.
    ///
    /// Source alpha 255 replaces the destination pixel, 0 leaves it alone,
    /// intermediate values blend linearly. Pixels falling outside the
    /// destination are clipped.
    pub fn blit(
        &mut self,
        src: &Canvas,
        x: i32,
        y: i32,
    ) {
        for sy in 0..src.height {
            let dy = y + sy as i32;
            if dy < 0 || dy as u32 >= self.height {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + sx as i32;
                if dx < 0 || dx as u32 >= self.width {
                    continue;
                }
                let si = src.index(sx, sy);
                let di = self.index(dx as u32, dy as u32);
                let alpha = u16::from(src.pixels[si + 3]);
                match alpha {
                    0 => {}
                    255 => {
                        self.pixels[di..di + 4].copy_from_slice(&src.pixels[si..si + 4]);
                    }
                    a => {
                        for c in 0..3 {
                            let s = u16::from(src.pixels[si + c]);
                            let d = u16::from(self.pixels[di + c]);
                            self.pixels[di + c] = ((s * a + d * (255 - a)) / 255) as u8;
                        }
                        self.pixels[di + 3] = 0xFF;
                    }
                }
            }
        }
    }

    /// Scale down to fit inside `max_w`/`max_h`, preserving aspect ratio.
    ///
    /// Never upscales: a canvas already inside the box is returned as a
    /// clone. Nearest-neighbor sampling; artwork at panel sizes does not
    /// warrant a filter kernel.
    pub fn fit(
        &self,
        max_w: u32,
        max_h: u32,
    ) -> Canvas {
        if self.width <= max_w && self.height <= max_h {
            return self.clone();
        }
        // Ratio that brings the longer relative edge exactly to the box
        let scale_w = f64::from(max_w) / f64::from(self.width);
        let scale_h = f64::from(max_h) / f64::from(self.height);
        let scale = scale_w.min(scale_h);
        let new_w = ((f64::from(self.width) * scale) as u32).max(1);
        let new_h = ((f64::from(self.height) * scale) as u32).max(1);
        self.resize_nearest(new_w, new_h)
    }

    /// Resample to exactly `new_w` x `new_h` with nearest-neighbor lookup.
    pub fn resize_nearest(
        &self,
        new_w: u32,
        new_h: u32,
    ) -> Canvas {
        let mut out = Canvas::new(new_w, new_h, Rgb888::BLACK);
        for oy in 0..new_h {
            let sy = (u64::from(oy) * u64::from(self.height) / u64::from(new_h)) as u32;
            for ox in 0..new_w {
                let sx = (u64::from(ox) * u64::from(self.width) / u64::from(new_w)) as u32;
                let si = self.index(sx, sy);
                let oi = out.index(ox, oy);
                out.pixels[oi..oi + 4].copy_from_slice(&self.pixels[si..si + 4]);
            }
        }
        out
    }

    /// Rotate by `quarter_turns * 90` degrees counter-clockwise.
    pub fn rotate_quarters(
        &self,
        quarter_turns: u8,
    ) -> Canvas {
        let mut out = self.clone();
        for _ in 0..(quarter_turns % 4) {
            out = out.rotate90();
        }
        out
    }

    /// One 90-degree counter-clockwise turn; width and height swap.
    fn rotate90(&self) -> Canvas {
        let mut out = Canvas::new(self.height, self.width, Rgb888::BLACK);
        for y in 0..self.height {
            for x in 0..self.width {
                // (x, y) lands at (y, width - 1 - x) in the rotated frame
                let si = self.index(x, y);
                let oi = out.index(y, self.width - 1 - x);
                out.pixels[oi..oi + 4].copy_from_slice(&self.pixels[si..si + 4]);
            }
        }
        out
    }

    // -------------------------------------------------------------------------
    // Native byte-order conversion for the framebuffer
    // -------------------------------------------------------------------------

    /// Repack as BGRA bytes, the layout of 32 bpp little-endian XRGB
    /// framebuffers.
    pub fn to_bgra(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len());
        for px in self.pixels.chunks_exact(4) {
            out.push(px[2]);
            out.push(px[1]);
            out.push(px[0]);
            out.push(px[3]);
        }
        out
    }

    /// Repack as RGB565 little-endian bytes for 16 bpp framebuffers.
    pub fn to_rgb565(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width * self.height * 2) as usize);
        for px in self.pixels.chunks_exact(4) {
            let r = u16::from(px[0] >> 3);
            let g = u16::from(px[1] >> 2);
            let b = u16::from(px[2] >> 3);
            let rgb565 = (r << 11) | (g << 5) | b;
            out.extend_from_slice(&rgb565.to_le_bytes());
        }
        out
    }
}

// =============================================================================
// embedded-graphics Integration
// =============================================================================

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        // Row fill over the clipped area; much hotter than draw_iter for
        // background and band clears
        let clipped = area.intersection(&self.bounding_box());
        if clipped.size.width == 0 || clipped.size.height == 0 {
            return Ok(());
        }
        let rgba = [color.r(), color.g(), color.b(), 0xFF];
        let x0 = clipped.top_left.x as u32;
        let y0 = clipped.top_left.y as u32;
        for y in y0..y0 + clipped.size.height {
            let row_start = self.index(x0, y);
            let row = &mut self.pixels[row_start..row_start + (clipped.size.width * 4) as usize];
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics::primitives::PrimitiveStyle;

    use super::*;
    use crate::colors::{BLACK, BLUE, WHITE, YELLOW};

    // -------------------------------------------------------------------------
    // Buffer Basics
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_fills_background() {
        let canvas = Canvas::new(4, 3, BLUE);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(canvas.pixel(x, y), Some(BLUE), "({x},{y}) should be background");
            }
        }
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_discarded() {
        let mut canvas = Canvas::new(2, 2, BLACK);
        canvas.set_pixel(-1, 0, WHITE);
        canvas.set_pixel(0, -1, WHITE);
        canvas.set_pixel(2, 0, WHITE);
        canvas.set_pixel(0, 2, WHITE);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(canvas.pixel(x, y), Some(BLACK), "no in-bounds pixel should change");
            }
        }
    }

    #[test]
    fn test_pixel_out_of_bounds_is_none() {
        let canvas = Canvas::new(2, 2, BLACK);
        assert!(canvas.pixel(-1, 0).is_none());
        assert!(canvas.pixel(2, 0).is_none());
    }

    // -------------------------------------------------------------------------
    // DrawTarget Integration
    // -------------------------------------------------------------------------

    #[test]
    fn test_draw_target_rectangle_fill() {
        let mut canvas = Canvas::new(10, 10, BLACK);
        Rectangle::new(Point::new(2, 2), Size::new(3, 3))
            .into_styled(PrimitiveStyle::with_fill(YELLOW))
            .draw(&mut canvas)
            .ok();

        assert_eq!(canvas.pixel(2, 2), Some(YELLOW), "inside fill");
        assert_eq!(canvas.pixel(4, 4), Some(YELLOW), "inside fill far corner");
        assert_eq!(canvas.pixel(5, 5), Some(BLACK), "outside fill");
        assert_eq!(canvas.pixel(1, 2), Some(BLACK), "left of fill");
    }

    #[test]
    fn test_fill_solid_clips_to_canvas() {
        let mut canvas = Canvas::new(4, 4, BLACK);
        // Rectangle extends past the right/bottom edges
        Rectangle::new(Point::new(2, 2), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(WHITE))
            .draw(&mut canvas)
            .ok();
        assert_eq!(canvas.pixel(3, 3), Some(WHITE), "clipped area should be filled");
        assert_eq!(canvas.pixel(1, 1), Some(BLACK), "outside area untouched");
    }

    #[test]
    fn test_clear_repaints_everything() {
        let mut canvas = Canvas::new(3, 3, BLACK);
        canvas.set_pixel(1, 1, YELLOW);
        canvas.clear(BLUE).ok();
        assert_eq!(canvas.pixel(1, 1), Some(BLUE), "clear should overwrite prior drawing");
    }

    // -------------------------------------------------------------------------
    // Blit and Alpha
    // -------------------------------------------------------------------------

    #[test]
    fn test_blit_opaque_replaces() {
        let mut dst = Canvas::new(4, 4, BLACK);
        let src = Canvas::new(2, 2, WHITE);
        dst.blit(&src, 1, 1);
        assert_eq!(dst.pixel(1, 1), Some(WHITE));
        assert_eq!(dst.pixel(2, 2), Some(WHITE));
        assert_eq!(dst.pixel(0, 0), Some(BLACK), "outside blit untouched");
        assert_eq!(dst.pixel(3, 3), Some(BLACK), "outside blit untouched");
    }

    #[test]
    fn test_blit_clips_at_edges() {
        let mut dst = Canvas::new(4, 4, BLACK);
        let src = Canvas::new(3, 3, WHITE);
        dst.blit(&src, 2, 2);
        assert_eq!(dst.pixel(3, 3), Some(WHITE), "in-bounds part lands");
        // The rest of the source hangs off the edge and must be clipped
        assert_eq!(dst.pixel(1, 1), Some(BLACK));
    }

    #[test]
    fn test_blit_negative_origin_clips() {
        let mut dst = Canvas::new(4, 4, BLACK);
        let src = Canvas::new(3, 3, WHITE);
        dst.blit(&src, -2, -2);
        assert_eq!(dst.pixel(0, 0), Some(WHITE), "overlapping corner lands");
        assert_eq!(dst.pixel(1, 1), Some(BLACK), "beyond source extent untouched");
    }

    #[test]
    fn test_blit_half_alpha_blends() {
        let mut dst = Canvas::new(1, 1, BLACK);
        let mut src = Canvas::new(1, 1, WHITE);
        src.pixels[3] = 128;
        dst.blit(&src, 0, 0);
        let px = dst.pixel(0, 0).unwrap();
        // 255*128/255 = 128 (integer), destination contributes 0
        assert_eq!(px, Rgb888::new(128, 128, 128), "half alpha should mix to mid grey");
    }

    #[test]
    fn test_blit_zero_alpha_is_transparent() {
        let mut dst = Canvas::new(1, 1, BLUE);
        let mut src = Canvas::new(1, 1, WHITE);
        src.pixels[3] = 0;
        dst.blit(&src, 0, 0);
        assert_eq!(dst.pixel(0, 0), Some(BLUE), "alpha 0 must leave destination alone");
    }

    // -------------------------------------------------------------------------
    // Fit / Resize / Rotate
    // -------------------------------------------------------------------------

    #[test]
    fn test_fit_downscales_preserving_aspect() {
        let canvas = Canvas::new(400, 200, WHITE);
        let fitted = canvas.fit(220, 220);
        assert_eq!((fitted.width(), fitted.height()), (220, 110), "2:1 aspect must survive");
    }

    #[test]
    fn test_fit_portrait_source() {
        let canvas = Canvas::new(100, 400, WHITE);
        let fitted = canvas.fit(220, 220);
        assert_eq!((fitted.width(), fitted.height()), (55, 220), "height should be limiting edge");
    }

    #[test]
    fn test_fit_never_upscales() {
        let canvas = Canvas::new(100, 50, WHITE);
        let fitted = canvas.fit(220, 220);
        assert_eq!(
            (fitted.width(), fitted.height()),
            (100, 50),
            "smaller-than-box source must pass through unscaled"
        );
    }

    #[test]
    fn test_resize_nearest_doubles() {
        let mut canvas = Canvas::new(2, 1, BLACK);
        canvas.set_pixel(1, 0, WHITE);
        let big = canvas.resize_nearest(4, 2);
        assert_eq!(big.pixel(0, 0), Some(BLACK));
        assert_eq!(big.pixel(1, 1), Some(BLACK));
        assert_eq!(big.pixel(2, 0), Some(WHITE), "right half maps to source pixel 1");
        assert_eq!(big.pixel(3, 1), Some(WHITE));
    }

    #[test]
    fn test_rotate_quarters_maps_corner() {
        let mut canvas = Canvas::new(3, 2, BLACK);
        canvas.set_pixel(2, 0, WHITE); // top-right
        let rotated = canvas.rotate_quarters(1);
        assert_eq!((rotated.width(), rotated.height()), (2, 3), "dimensions swap on 90deg");
        // CCW turn takes top-right to top-left
        assert_eq!(rotated.pixel(0, 0), Some(WHITE), "top-right should land at top-left");
    }

    #[test]
    fn test_rotate_four_quarters_is_identity() {
        let mut canvas = Canvas::new(3, 2, BLACK);
        canvas.set_pixel(2, 1, YELLOW);
        let rotated = canvas.rotate_quarters(4);
        assert_eq!(rotated, canvas, "four quarter turns must reproduce the original");
    }

    // -------------------------------------------------------------------------
    // Native Byte Order
    // -------------------------------------------------------------------------

    #[test]
    fn test_to_bgra_swaps_channels() {
        let canvas = Canvas::new(1, 1, Rgb888::new(10, 20, 30));
        assert_eq!(canvas.to_bgra(), vec![30, 20, 10, 0xFF], "layout must be B,G,R,A");
    }

    #[test]
    fn test_to_rgb565_packs_known_colors() {
        let white = Canvas::new(1, 1, WHITE);
        assert_eq!(white.to_rgb565(), vec![0xFF, 0xFF], "white is 0xFFFF");

        let red = Canvas::new(1, 1, Rgb888::new(255, 0, 0));
        // 0xF800 little-endian
        assert_eq!(red.to_rgb565(), vec![0x00, 0xF8], "pure red is 0xF800 LE");

        let green = Canvas::new(1, 1, Rgb888::new(0, 255, 0));
        // 0x07E0 little-endian
        assert_eq!(green.to_rgb565(), vec![0xE0, 0x07], "pure green is 0x07E0 LE");
    }

    #[test]
    fn test_to_rgb565_halves_byte_count() {
        let canvas = Canvas::new(5, 4, BLACK);
        assert_eq!(canvas.to_rgb565().len(), 5 * 4 * 2, "two bytes per pixel");
        assert_eq!(canvas.to_bgra().len(), 5 * 4 * 4, "four bytes per pixel");
    }
}
