//! Font metrics used to lay out text.
//!
//! Glyph rasterisation belongs to the surface; the session layer only needs
//! to know how tall a line is and how far each character advances so it can
//! size and centre text before asking the surface to draw glyph cells.

/// Text metrics for a single font face at a single size.
pub trait Font {
    /// Height of one line of text, in pixels.
    fn line_height(&self) -> u32;

    /// Horizontal advance of `ch`, in pixels.
    fn advance(&self, ch: char) -> u32;

    /// Width of `text` laid out on a single line.
    fn text_width(&self, text: &str) -> u32 {
        text.chars().map(|c| self.advance(c)).sum()
    }
}

/// A monospace font where every character occupies the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFont {
    pub cell_width: u32,
    pub cell_height: u32,
}

impl FixedFont {
    pub const fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }
}

impl Default for FixedFont {
    /// 8×16 cells, the size of the classic VGA text font.
    fn default() -> Self {
        Self::new(8, 16)
    }
}

impl Font for FixedFont {
    fn line_height(&self) -> u32 {
        self.cell_height
    }

    fn advance(&self, _ch: char) -> u32 {
        self.cell_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_font_width_counts_chars_not_bytes() {
        let font = FixedFont::default();
        assert_eq!(font.text_width("Hello"), 40);
        // "é" is two bytes in UTF-8 but one cell.
        assert_eq!(font.text_width("é"), 8);
        assert_eq!(font.text_width(""), 0);
    }
}
