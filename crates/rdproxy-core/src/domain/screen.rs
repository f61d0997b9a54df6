//! Client display descriptor.
//!
//! The descriptor is negotiated once, when the remote-desktop client connects,
//! and stays fixed for the lifetime of the session wrapper.  The on-screen
//! display reads it to size and centre its banners.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::Rect;

/// Error returned when a colour depth value is not one the proxy supports.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported colour depth: {0} bits per pixel")]
pub struct UnsupportedDepth(pub u8);

/// Colour depth of the client display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum BitsPerPixel {
    /// 8 bpp, indexed through the classic 3-3-2 palette.
    Bpp8 = 8,
    /// 15 bpp, 5-5-5.
    Bpp15 = 15,
    /// 16 bpp, 5-6-5.
    Bpp16 = 16,
    /// 24 bpp true colour.
    Bpp24 = 24,
    /// 32 bpp true colour (alpha ignored).
    Bpp32 = 32,
}

impl TryFrom<u8> for BitsPerPixel {
    type Error = UnsupportedDepth;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(BitsPerPixel::Bpp8),
            15 => Ok(BitsPerPixel::Bpp15),
            16 => Ok(BitsPerPixel::Bpp16),
            24 => Ok(BitsPerPixel::Bpp24),
            32 => Ok(BitsPerPixel::Bpp32),
            other => Err(UnsupportedDepth(other)),
        }
    }
}

impl From<BitsPerPixel> for u8 {
    fn from(bpp: BitsPerPixel) -> u8 {
        bpp as u8
    }
}

/// Width, height and colour depth of the client display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenInfo {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Colour depth.
    pub bpp: BitsPerPixel,
}

impl ScreenInfo {
    pub fn new(width: u16, height: u16, bpp: BitsPerPixel) -> Self {
        Self { width, height, bpp }
    }

    /// The whole display as a rectangle anchored at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width as u32, self.height as u32)
    }
}

impl Default for ScreenInfo {
    fn default() -> Self {
        Self::new(800, 600, BitsPerPixel::Bpp24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpp_try_from_accepts_supported_depths() {
        for depth in [8u8, 15, 16, 24, 32] {
            let bpp = BitsPerPixel::try_from(depth).expect("supported depth");
            assert_eq!(u8::from(bpp), depth);
        }
    }

    #[test]
    fn test_bpp_try_from_rejects_unknown_depth() {
        assert_eq!(BitsPerPixel::try_from(12), Err(UnsupportedDepth(12)));
    }

    #[test]
    fn test_screen_rect_is_anchored_at_origin() {
        let screen = ScreenInfo::new(800, 600, BitsPerPixel::Bpp24);
        assert_eq!(screen.rect(), Rect::new(0, 0, 800, 600));
    }
}
