//! In-memory display surface.
//!
//! [`FrameBuffer`] stands in for the client display when the session runs
//! headless: drawing orders become pixels in a `Vec<u32>`, which can be
//! compared frame-to-frame or saved to disk as a PNG image.
//!
//! Glyphs are rendered as solid blocks inset by one pixel in their cell.
//! Whitespace draws nothing.  That is enough to see where text lands and
//! to compare frames pixel for pixel; real glyph shapes are the client's job.

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use rdproxy_core::{ColorCtx, GraphicApi, Rect, RgbColor, ScreenInfo};

/// A width × height grid of `0xRRGGBB` pixels, initially black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(screen: ScreenInfo) -> Self {
        let (width, height) = (screen.width as u32, screen.height as u32);
        Self {
            width,
            height,
            pixels: vec![RgbColor::BLACK.0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Returns the pixel at (`x`, `y`), or `None` outside the surface.
    pub fn pixel(&self, x: i32, y: i32) -> Option<RgbColor> {
        if !self.bounds().contains_point(x, y) {
            return None;
        }
        Some(RgbColor(self.pixels[self.index(x, y)]))
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Number of pixels that differ from `color`.
    pub fn count_not(&self, color: RgbColor) -> usize {
        self.pixels.iter().filter(|&&p| p != color.0).count()
    }

    /// Smallest rectangle holding every pixel that differs from `other`.
    pub fn diff_bounds(&self, other: &FrameBuffer) -> Option<Rect> {
        if self.width != other.width || self.height != other.height {
            return Some(self.bounds());
        }
        let mut found: Option<(u32, u32, u32, u32)> = None;
        for (i, (a, b)) in self.pixels.iter().zip(&other.pixels).enumerate() {
            if a == b {
                continue;
            }
            let (x, y) = ((i as u32) % self.width, (i as u32) / self.width);
            found = Some(match found {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        found.map(|(x0, y0, x1, y1)| Rect::new(x0 as i32, y0 as i32, x1 - x0 + 1, y1 - y0 + 1))
    }

    /// Converts the surface to an 8-bit RGB image.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = RgbColor(self.pixels[self.index(x as i32, y as i32)]);
            Rgb([c.red(), c.green(), c.blue()])
        })
    }

    /// Saves the surface to `path` as a PNG, whatever the extension.
    ///
    /// # Errors
    ///
    /// Returns the encoder's error, including any I/O failure.
    pub fn save_png(&self, path: &Path) -> image::ImageResult<()> {
        self.to_image().save_with_format(path, ImageFormat::Png)
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn fill(&mut self, rect: Rect, color: RgbColor) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() {
            return;
        }
        for y in rect.y..rect.bottom() {
            let start = self.index(rect.x, y);
            self.pixels[start..start + rect.width as usize].fill(color.0);
        }
    }
}

impl GraphicApi for FrameBuffer {
    fn draw_rect(&mut self, rect: Rect, color: RgbColor, ctx: ColorCtx) {
        self.fill(rect, color.to_depth(ctx.bpp));
    }

    fn draw_glyph(&mut self, cell: Rect, ch: char, color: RgbColor, ctx: ColorCtx, clip: Rect) {
        if ch.is_whitespace() {
            return;
        }
        let block = cell.shrink(1).intersect(&clip);
        self.fill(block, color.to_depth(ctx.bpp));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rdproxy_core::BitsPerPixel;

    fn small() -> FrameBuffer {
        FrameBuffer::new(ScreenInfo::new(16, 8, BitsPerPixel::Bpp24))
    }

    #[test]
    fn test_new_surface_is_black() {
        let fb = small();
        assert_eq!(fb.pixels().len(), 128);
        assert_eq!(fb.count_not(RgbColor::BLACK), 0);
    }

    #[test]
    fn test_draw_rect_is_clipped_to_surface() {
        // Arrange
        let mut fb = small();

        // Act – rect hangs off the bottom-right corner
        fb.draw_rect(Rect::new(12, 6, 10, 10), RgbColor::WHITE, ColorCtx::depth24());

        // Assert
        assert_eq!(fb.count_not(RgbColor::BLACK), 4 * 2);
        assert_eq!(fb.pixel(15, 7), Some(RgbColor::WHITE));
        assert_eq!(fb.pixel(11, 7), Some(RgbColor::BLACK));
        assert_eq!(fb.pixel(16, 7), None);
    }

    #[test]
    fn test_draw_rect_applies_colour_depth() {
        let mut fb = small();
        let ctx = ColorCtx::new(BitsPerPixel::Bpp16);

        fb.draw_rect(Rect::new(0, 0, 1, 1), RgbColor::ORANGE, ctx);

        assert_eq!(fb.pixel(0, 0), Some(RgbColor::ORANGE.to_depth(BitsPerPixel::Bpp16)));
    }

    #[test]
    fn test_glyph_is_inset_block_within_clip() {
        let mut fb = small();
        let cell = Rect::new(0, 0, 8, 8);

        fb.draw_glyph(cell, 'A', RgbColor::WHITE, ColorCtx::depth24(), Rect::new(0, 0, 4, 8));

        // inset block is (1,1)-(7,7); the clip keeps x < 4
        assert_eq!(fb.count_not(RgbColor::BLACK), 3 * 6);
        assert_eq!(fb.pixel(0, 0), Some(RgbColor::BLACK));
        assert_eq!(fb.pixel(1, 1), Some(RgbColor::WHITE));
    }

    #[test]
    fn test_space_draws_nothing() {
        let mut fb = small();
        fb.draw_glyph(Rect::new(0, 0, 8, 8), ' ', RgbColor::WHITE, ColorCtx::depth24(), fb.bounds());
        assert_eq!(fb.count_not(RgbColor::BLACK), 0);
    }

    #[test]
    fn test_diff_bounds_finds_changed_area() {
        let blank = small();
        let mut fb = small();
        fb.draw_rect(Rect::new(3, 2, 4, 3), RgbColor::RED, ColorCtx::depth24());

        assert_eq!(fb.diff_bounds(&blank), Some(Rect::new(3, 2, 4, 3)));
        assert_eq!(blank.diff_bounds(&blank.clone()), None);
    }

    // ── Image export ──────────────────────────────────────────────────────────

    #[test]
    fn test_image_has_surface_size_and_rgb_pixels() {
        // Arrange
        let mut fb = small();
        fb.draw_rect(Rect::new(0, 0, 1, 1), RgbColor(0x123456), ColorCtx::depth24());

        // Act
        let img = fb.to_image();

        // Assert
        assert_eq!(img.dimensions(), (16, 8));
        assert_eq!(*img.get_pixel(0, 0), Rgb([0x12, 0x34, 0x56]));
        assert_eq!(*img.get_pixel(15, 7), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_saved_png_decodes_to_the_same_pixels() {
        // Arrange
        let mut fb = small();
        fb.draw_rect(Rect::new(3, 2, 4, 3), RgbColor::ORANGE, ColorCtx::depth24());
        let path = std::env::temp_dir().join(format!("rdproxy-frame-{}.png", uuid::Uuid::new_v4()));

        // Act
        fb.save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgb8();
        std::fs::remove_file(&path).unwrap();

        // Assert
        assert_eq!(decoded, fb.to_image());
    }
}
