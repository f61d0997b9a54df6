//! Drawing contracts between the session layer and the host surface.
//!
//! The session layer never touches pixels.  It issues two primitives through
//! [`GraphicApi`]: fill a rectangle, and draw one glyph inside a cell.  The
//! host front end decides how those become pixels (a real RDP front encodes
//! them as drawing orders; the in-memory framebuffer paints a `Vec<u32>`).

pub mod color;
pub mod font;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::geometry::Rect;

pub use color::{ColorCtx, RgbColor};
pub use font::{FixedFont, Font};

/// Drawing capability of a shared surface.
pub trait GraphicApi {
    /// Fills `rect` with `color`.  Pixels outside the surface are ignored.
    fn draw_rect(&mut self, rect: Rect, color: RgbColor, ctx: ColorCtx);

    /// Draws glyph `ch` inside `cell`, painting only pixels that also lie in
    /// `clip`.  The background of the cell is left untouched.
    fn draw_glyph(&mut self, cell: Rect, ch: char, color: RgbColor, ctx: ColorCtx, clip: Rect);
}

impl<T: GraphicApi + ?Sized> GraphicApi for &mut T {
    fn draw_rect(&mut self, rect: Rect, color: RgbColor, ctx: ColorCtx) {
        (**self).draw_rect(rect, color, ctx);
    }

    fn draw_glyph(&mut self, cell: Rect, ch: char, color: RgbColor, ctx: ColorCtx, clip: Rect) {
        (**self).draw_glyph(cell, ch, color, ctx, clip);
    }
}

/// Styling tier of an on-screen display message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsdMsgUrgency {
    /// Neutral notice.
    #[default]
    Normal,
    /// Informational notice (hotkey help).
    Info,
    /// Something the user should pay attention to.
    Warning,
    /// Critical notice, e.g. the session is about to be killed.
    Alert,
}

/// Error returned when parsing an unknown urgency name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown OSD urgency: {0:?} (expected normal, info, warning or alert)")]
pub struct ParseUrgencyError(pub String);

impl FromStr for OsdMsgUrgency {
    type Err = ParseUrgencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(OsdMsgUrgency::Normal),
            "info" => Ok(OsdMsgUrgency::Info),
            "warning" => Ok(OsdMsgUrgency::Warning),
            "alert" => Ok(OsdMsgUrgency::Alert),
            _ => Err(ParseUrgencyError(s.to_string())),
        }
    }
}

impl fmt::Display for OsdMsgUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OsdMsgUrgency::Normal => "normal",
            OsdMsgUrgency::Info => "info",
            OsdMsgUrgency::Warning => "warning",
            OsdMsgUrgency::Alert => "alert",
        })
    }
}
