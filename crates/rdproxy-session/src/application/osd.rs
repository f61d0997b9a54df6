//! On-screen display: short text banners drawn over the active module.
//!
//! # How the banner is erased (for beginners)
//!
//! The overlay and the module share one drawing surface; there is no second
//! layer.  When the banner goes away, something must repaint the pixels it
//! covered.  The overlay does not remember those pixels.  Instead, [`Osd::hide`]
//! hands the covered rectangle to a repaint callback, and the wrapper routes
//! that callback to the module's invalidate handler so the module redraws
//! the area from its own state.
//!
//! ```text
//!            area (screen or work area)
//! +----------------------------------------+
//! |          +--------------+              |
//! |          |    Hello     |  <- banner    |
//! |          |   World !    |     (16 px / 8 px padding, 1 px border)
//! |          +--------------+              |
//! |                                        |
//! +----------------------------------------+
//! ```

use rdproxy_core::{ColorCtx, Font, GraphicApi, OsdMsgUrgency, Rect, RgbColor};

/// Horizontal padding between the widest line and the border, in pixels.
pub const PADDING_X: u32 = 16;
/// Vertical padding above the first and below the last line, in pixels.
pub const PADDING_Y: u32 = 8;
/// Width of the banner border, in pixels.
pub const BORDER_WIDTH: u32 = 1;

/// Colours of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsdStyle {
    pub background: RgbColor,
    pub border: RgbColor,
    pub text: RgbColor,
}

impl OsdStyle {
    pub fn for_urgency(urgency: OsdMsgUrgency) -> Self {
        let (background, text) = match urgency {
            OsdMsgUrgency::Normal => (RgbColor::LIGHT_YELLOW, RgbColor::BLACK),
            OsdMsgUrgency::Info => (RgbColor::LIGHT_BLUE, RgbColor::BLACK),
            OsdMsgUrgency::Warning => (RgbColor::ORANGE, RgbColor::BLACK),
            OsdMsgUrgency::Alert => (RgbColor::RED, RgbColor::WHITE),
        };
        Self {
            background,
            border: RgbColor::BLACK,
            text,
        }
    }
}

/// Returns the unclipped banner rectangle for `lines` at the top centre of
/// `area`.
pub fn banner_rect<S: AsRef<str>>(lines: &[S], font: &dyn Font, area: Rect) -> Rect {
    let text_width = lines
        .iter()
        .map(|l| font.text_width(l.as_ref()))
        .max()
        .unwrap_or(0);
    let width = text_width + 2 * PADDING_X;
    let height = lines.len() as u32 * font.line_height() + 2 * PADDING_Y;
    let x = area.x + (area.width as i32 - width as i32) / 2;
    Rect::new(x, area.y, width, height)
}

/// What the visible banner is for.
///
/// The help banner belongs to the hotkey: its release takes it down.  A
/// notice stays until it is replaced or dismissed by input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OsdKind {
    #[default]
    Notice,
    Help,
}

/// One banner's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsdMessage {
    pub lines: Vec<String>,
    pub urgency: OsdMsgUrgency,
    pub kind: OsdKind,
}

impl OsdMessage {
    pub fn notice(lines: Vec<String>, urgency: OsdMsgUrgency) -> Self {
        Self {
            lines,
            urgency,
            kind: OsdKind::Notice,
        }
    }

    /// Hotkey help, always drawn with [`OsdMsgUrgency::Info`] colours.
    pub fn help(lines: Vec<String>) -> Self {
        Self {
            lines,
            urgency: OsdMsgUrgency::Info,
            kind: OsdKind::Help,
        }
    }
}

/// Overlay state.
///
/// `visible` is `true` exactly when `region` is non-empty, and `region` is
/// exactly the set of pixels the last `show` wrote.
#[derive(Debug, Clone, Default)]
pub struct Osd {
    visible: bool,
    lines: Vec<String>,
    urgency: OsdMsgUrgency,
    kind: OsdKind,
    banner: Rect,
    region: Rect,
}

impl Osd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.check_invariant();
        self.visible
    }

    /// Pixels currently covered by the banner; empty while hidden.
    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn urgency(&self) -> OsdMsgUrgency {
        self.urgency
    }

    /// Kind of the visible banner, `None` while hidden.
    pub fn kind(&self) -> Option<OsdKind> {
        self.is_visible().then_some(self.kind)
    }

    /// Replaces the current banner with `message`, drawn inside `area`.
    ///
    /// A visible banner is erased first through `repaint`, exactly as
    /// [`Osd::hide`] does.  Returns `false`, leaving the overlay hidden,
    /// when `message` has no lines or the banner does not intersect `area`.
    pub fn show(
        &mut self,
        gd: &mut dyn GraphicApi,
        font: &dyn Font,
        ctx: ColorCtx,
        area: Rect,
        message: OsdMessage,
        repaint: impl FnOnce(Rect, &mut dyn GraphicApi),
    ) -> bool {
        self.hide(|region| repaint(region, &mut *gd));
        if message.lines.is_empty() {
            return false;
        }

        let banner = banner_rect(&message.lines, font, area);
        let region = banner.intersect(&area);
        if region.is_empty() {
            tracing::warn!(?area, ?banner, "OSD banner does not fit the display area");
            return false;
        }

        self.visible = true;
        self.lines = message.lines;
        self.urgency = message.urgency;
        self.kind = message.kind;
        self.banner = banner;
        self.region = region;
        self.paint(gd, font, ctx, region);
        self.check_invariant();
        true
    }

    /// Erases the banner by asking `repaint` to redraw the covered region.
    ///
    /// Does nothing while hidden.
    pub fn hide(&mut self, repaint: impl FnOnce(Rect)) {
        self.check_invariant();
        if !self.visible {
            return;
        }
        repaint(self.region);
        self.visible = false;
        self.lines.clear();
        self.kind = OsdKind::Notice;
        self.banner = Rect::empty();
        self.region = Rect::empty();
    }

    /// Paints the part of the visible banner that lies inside `clip`.
    pub fn paint(&self, gd: &mut dyn GraphicApi, font: &dyn Font, ctx: ColorCtx, clip: Rect) {
        let clip = clip.intersect(&self.region);
        if !self.visible || clip.is_empty() {
            return;
        }
        let style = OsdStyle::for_urgency(self.urgency);

        let border = self.banner.intersect(&clip);
        gd.draw_rect(border, style.border, ctx);
        let inside = self.banner.shrink(BORDER_WIDTH).intersect(&clip);
        if !inside.is_empty() {
            gd.draw_rect(inside, style.background, ctx);
        }

        let line_height = font.line_height();
        for (i, line) in self.lines.iter().enumerate() {
            let width = font.text_width(line);
            let mut x = self.banner.x + (self.banner.width as i32 - width as i32) / 2;
            let y = self.banner.y + (PADDING_Y + i as u32 * line_height) as i32;
            for ch in line.chars() {
                let advance = font.advance(ch);
                let cell = Rect::new(x, y, advance, line_height);
                if cell.overlaps(&inside) {
                    gd.draw_glyph(cell, ch, style.text, ctx, inside);
                }
                x += advance as i32;
            }
        }
    }

    fn check_invariant(&self) {
        debug_assert_eq!(
            self.visible,
            !self.region.is_empty(),
            "overlay visibility out of sync with its region"
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
