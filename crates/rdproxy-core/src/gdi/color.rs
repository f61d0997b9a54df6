//! 24-bit colours and their reduction to the client colour depth.
//!
//! Drawing orders always carry a full 0xRRGGBB colour plus a [`ColorCtx`]
//! naming the depth of the target surface.  A surface working at a lower
//! depth stores what the client would actually see, which is what
//! [`RgbColor::to_depth`] computes.

use serde::{Deserialize, Serialize};

use crate::domain::screen::BitsPerPixel;

/// A 24-bit colour encoded as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RgbColor(pub u32);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor(0x00_00_00);
    pub const WHITE: RgbColor = RgbColor(0xFF_FF_FF);
    pub const LIGHT_YELLOW: RgbColor = RgbColor(0xFF_FF_C0);
    pub const LIGHT_BLUE: RgbColor = RgbColor(0xC0_E0_FF);
    pub const ORANGE: RgbColor = RgbColor(0xFF_A5_00);
    pub const RED: RgbColor = RgbColor(0xD0_10_10);
    pub const DARK_GREY: RgbColor = RgbColor(0x40_40_40);

    /// Builds a colour from its three 8-bit channels.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        RgbColor(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Returns the colour the client sees once `self` is reduced to `bpp`
    /// and expanded back to 24 bits.
    ///
    /// Pure black and pure white survive every depth unchanged.
    pub fn to_depth(self, bpp: BitsPerPixel) -> RgbColor {
        let (r, g, b) = (self.red(), self.green(), self.blue());
        match bpp {
            BitsPerPixel::Bpp24 | BitsPerPixel::Bpp32 => self,
            BitsPerPixel::Bpp16 => {
                RgbColor::from_rgb(expand5(r >> 3), expand6(g >> 2), expand5(b >> 3))
            }
            BitsPerPixel::Bpp15 => {
                RgbColor::from_rgb(expand5(r >> 3), expand5(g >> 3), expand5(b >> 3))
            }
            // classic 3-3-2 palette
            BitsPerPixel::Bpp8 => {
                RgbColor::from_rgb(expand3(r >> 5), expand3(g >> 5), (b >> 6) * 0x55)
            }
        }
    }
}

fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

fn expand6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

fn expand3(v: u8) -> u8 {
    (v << 5) | (v << 2) | (v >> 1)
}

/// The colour context of a drawing order: the depth of the target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCtx {
    pub bpp: BitsPerPixel,
}

impl ColorCtx {
    pub fn new(bpp: BitsPerPixel) -> Self {
        Self { bpp }
    }

    /// True-colour context used by most modules.
    pub fn depth24() -> Self {
        Self::new(BitsPerPixel::Bpp24)
    }
}

impl From<BitsPerPixel> for ColorCtx {
    fn from(bpp: BitsPerPixel) -> Self {
        Self::new(bpp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_round_trip_through_from_rgb() {
        let c = RgbColor::from_rgb(0x12, 0x34, 0x56);
        assert_eq!(c, RgbColor(0x123456));
        assert_eq!((c.red(), c.green(), c.blue()), (0x12, 0x34, 0x56));
    }

    #[test]
    fn test_black_and_white_survive_every_depth() {
        for bpp in [
            BitsPerPixel::Bpp8,
            BitsPerPixel::Bpp15,
            BitsPerPixel::Bpp16,
            BitsPerPixel::Bpp24,
            BitsPerPixel::Bpp32,
        ] {
            assert_eq!(RgbColor::BLACK.to_depth(bpp), RgbColor::BLACK, "{bpp:?}");
            assert_eq!(RgbColor::WHITE.to_depth(bpp), RgbColor::WHITE, "{bpp:?}");
        }
    }

    #[test]
    fn test_true_colour_is_identity() {
        let c = RgbColor(0x123457);
        assert_eq!(c.to_depth(BitsPerPixel::Bpp24), c);
        assert_eq!(c.to_depth(BitsPerPixel::Bpp32), c);
    }

    #[test]
    fn test_16bpp_drops_low_bits() {
        // 0x07 in the red channel is below the 5-bit resolution.
        let c = RgbColor::from_rgb(0x07, 0x03, 0x07);
        assert_eq!(c.to_depth(BitsPerPixel::Bpp16), RgbColor::BLACK);
    }

    #[test]
    fn test_8bpp_uses_332_palette() {
        // Orange: r=0xFF g=0xA5 b=0x00 → r3=7 g3=5 b2=0
        let c = RgbColor::ORANGE.to_depth(BitsPerPixel::Bpp8);
        assert_eq!(c.red(), 0xFF);
        assert_eq!(c.green(), (5 << 5) | (5 << 2) | (5 >> 1));
        assert_eq!(c.blue(), 0x00);
    }
}
