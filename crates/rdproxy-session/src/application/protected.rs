//! Drawing proxy that keeps module output off the on-screen display.
//!
//! While a banner is up, module draws are routed through
//! [`ProtectedGraphics`], which splits every order around the banner region
//! and forwards only the pieces outside it.

use rdproxy_core::{ColorCtx, GraphicApi, Rect, RgbColor};

pub struct ProtectedGraphics<'a> {
    inner: &'a mut dyn GraphicApi,
    protected: Rect,
}

impl<'a> ProtectedGraphics<'a> {
    pub fn new(inner: &'a mut dyn GraphicApi, protected: Rect) -> Self {
        Self { inner, protected }
    }
}

impl GraphicApi for ProtectedGraphics<'_> {
    fn draw_rect(&mut self, rect: Rect, color: RgbColor, ctx: ColorCtx) {
        for piece in rect.subtract(&self.protected) {
            self.inner.draw_rect(piece, color, ctx);
        }
    }

    fn draw_glyph(&mut self, cell: Rect, ch: char, color: RgbColor, ctx: ColorCtx, clip: Rect) {
        let visible = clip.intersect(&cell);
        for piece in visible.subtract(&self.protected) {
            self.inner.draw_glyph(cell, ch, color, ctx, piece);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        rects: Vec<Rect>,
        glyph_clips: Vec<Rect>,
    }

    impl GraphicApi for Recorder {
        fn draw_rect(&mut self, rect: Rect, _color: RgbColor, _ctx: ColorCtx) {
            self.rects.push(rect);
        }

        fn draw_glyph(&mut self, _cell: Rect, _ch: char, _color: RgbColor, _ctx: ColorCtx, clip: Rect) {
            self.glyph_clips.push(clip);
        }
    }

    #[test]
    fn test_fill_outside_protected_area_passes_unchanged() {
        let mut rec = Recorder::default();
        let mut gd = ProtectedGraphics::new(&mut rec, Rect::new(300, 0, 200, 32));

        gd.draw_rect(Rect::new(0, 100, 50, 50), RgbColor::WHITE, ColorCtx::depth24());

        assert_eq!(rec.rects, vec![Rect::new(0, 100, 50, 50)]);
    }

    #[test]
    fn test_full_screen_fill_skips_protected_area() {
        // Arrange
        let banner = Rect::new(300, 0, 200, 32);
        let mut rec = Recorder::default();
        let mut gd = ProtectedGraphics::new(&mut rec, banner);

        // Act
        gd.draw_rect(Rect::new(0, 0, 800, 600), RgbColor::WHITE, ColorCtx::depth24());

        // Assert
        assert!(!rec.rects.is_empty());
        let covered: u64 = rec
            .rects
            .iter()
            .map(|r| r.width as u64 * r.height as u64)
            .sum();
        assert_eq!(covered, 800 * 600 - 200 * 32);
        assert!(rec.rects.iter().all(|r| !r.overlaps(&banner)));
    }

    #[test]
    fn test_fill_inside_protected_area_is_dropped() {
        let mut rec = Recorder::default();
        let mut gd = ProtectedGraphics::new(&mut rec, Rect::new(300, 0, 200, 32));

        gd.draw_rect(Rect::new(310, 4, 10, 10), RgbColor::WHITE, ColorCtx::depth24());

        assert!(rec.rects.is_empty());
    }

    #[test]
    fn test_glyph_clip_excludes_protected_area() {
        // Arrange – a glyph cell straddling the banner's left edge
        let banner = Rect::new(300, 0, 200, 32);
        let mut rec = Recorder::default();
        let mut gd = ProtectedGraphics::new(&mut rec, banner);
        let cell = Rect::new(296, 10, 8, 16);

        // Act
        gd.draw_glyph(cell, 'A', RgbColor::BLACK, ColorCtx::depth24(), Rect::new(0, 0, 800, 600));

        // Assert
        assert!(!rec.glyph_clips.is_empty());
        for clip in &rec.glyph_clips {
            assert!(!clip.overlaps(&banner));
            assert!(cell.contains(clip));
        }
    }
}
