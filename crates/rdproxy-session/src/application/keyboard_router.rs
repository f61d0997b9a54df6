//! KeyboardRouter: decides what happens to each host input event.
//!
//! The router sits in front of the active module.  It knows one reserved
//! hotkey (F12 unless configured otherwise) that shows a help banner while
//! held, and it makes sure any other input first clears a visible banner so
//! the user never types or clicks "under" it.
//!
//! The router only *decides*.  It owns no overlay and no module: the
//! wrapper applies the returned [`KeyRoute`] / [`MouseRoute`], which keeps
//! every rule here testable with plain values.
//!
//! ```text
//!               hotkey press                  hotkey release
//!  Hidden/Notice ─────────────────▶ Help ─────────────────▶ Hidden
//!        │                            │
//!        │   any other key / unicode  │
//!        └──────────────┬─────────────┘
//!                       ▼
//!          hide, then forward to the module
//! ```
//!
//! A hotkey release only takes down the help banner.  A notice that was
//! never replaced by help stays up.

use std::time::Duration;

use rdproxy_core::{KbdFlags, Rect, Scancode};

use super::module::MouseFlags;
use super::osd::OsdKind;

/// Outcome of a scancode event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRoute {
    /// Hotkey pressed without help on screen: show it, replacing any notice.
    ShowHelp,
    /// Hotkey released while help is on screen: hide it.
    HideHelp,
    /// Hotkey event with nothing to do (repeat while help is up, or a
    /// release with no help banner).
    Swallow,
    /// Deliver to the module, hiding the overlay first if requested.
    Forward { dismiss_overlay: bool },
}

impl KeyRoute {
    /// `true` if the module must not see the event.
    pub fn is_consumed(&self) -> bool {
        !matches!(self, KeyRoute::Forward { .. })
    }
}

/// Outcome of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseRoute {
    /// Left click on the banner: hide it and drop the event.
    DismissOverlay,
    Forward,
}

/// Per-event routing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardRouter {
    hotkey: Scancode,
    osd_enabled: bool,
}

impl KeyboardRouter {
    pub fn new(hotkey: Scancode) -> Self {
        Self {
            hotkey,
            osd_enabled: false,
        }
    }

    pub fn hotkey(&self) -> Scancode {
        self.hotkey
    }

    /// Whether the help hotkey is active; set per module.
    pub fn osd_enabled(&self) -> bool {
        self.osd_enabled
    }

    pub fn set_osd_enabled(&mut self, enabled: bool) {
        self.osd_enabled = enabled;
    }

    /// Routes a scancode event given the kind of the visible banner, if any.
    pub fn route_scancode(
        &self,
        flags: KbdFlags,
        scancode: Scancode,
        overlay: Option<OsdKind>,
    ) -> KeyRoute {
        let is_hotkey = self.osd_enabled && scancode == self.hotkey && !flags.is_extended();
        if !is_hotkey {
            return KeyRoute::Forward {
                dismiss_overlay: overlay.is_some(),
            };
        }

        let help_shown = overlay == Some(OsdKind::Help);
        match (flags.is_release(), help_shown) {
            (false, false) => KeyRoute::ShowHelp,
            (true, true) => KeyRoute::HideHelp,
            _ => KeyRoute::Swallow,
        }
    }

    /// Routes a unicode event.  Typing always dismisses the overlay.
    pub fn route_unicode(&self, osd_visible: bool) -> KeyRoute {
        KeyRoute::Forward {
            dismiss_overlay: osd_visible,
        }
    }

    /// Routes a synchronize event.  Lock-state changes are not user input
    /// and leave the overlay alone.
    pub fn route_synchronize(&self) -> KeyRoute {
        KeyRoute::Forward {
            dismiss_overlay: false,
        }
    }

    /// Routes a pointer event; `osd_region` is empty while hidden.
    pub fn route_mouse(&self, flags: MouseFlags, x: u16, y: u16, osd_region: Rect) -> MouseRoute {
        if flags.is_left_press() && osd_region.contains_point(x as i32, y as i32) {
            MouseRoute::DismissOverlay
        } else {
            MouseRoute::Forward
        }
    }
}

impl Default for KeyboardRouter {
    fn default() -> Self {
        Self::new(Scancode::F12)
    }
}

/// Who the session is for, shown in the help banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub target_user: String,
    pub target_device: String,
    /// Maximum session length, if the policy sets one.
    pub time_limit: Option<Duration>,
}

impl SessionInfo {
    pub fn new(target_user: impl Into<String>, target_device: impl Into<String>) -> Self {
        Self {
            target_user: target_user.into(),
            target_device: target_device.into(),
            time_limit: None,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Builds the hotkey help banner.
    ///
    /// `connected_for` is how long the session has been connected, or `None`
    /// while it is not.  The remaining time is only shown for a connected
    /// session with a limit, rounded up to whole minutes.
    pub fn help_lines(&self, connected_for: Option<Duration>) -> Vec<String> {
        let target = match (self.target_user.as_str(), self.target_device.as_str()) {
            ("", "") => "-".to_string(),
            ("", device) => device.to_string(),
            (user, "") => user.to_string(),
            (user, device) => format!("{user}@{device}"),
        };
        let mut lines = vec![format!("Target: {target}")];

        if let (Some(limit), Some(elapsed)) = (self.time_limit, connected_for) {
            let remaining = limit.saturating_sub(elapsed).as_secs();
            let minutes = remaining.div_ceil(60);
            lines.push(format!("Session ends in {minutes} min"));
        }
        lines
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> KeyboardRouter {
        let mut r = KeyboardRouter::default();
        r.set_osd_enabled(true);
        r
    }

    // ── Hotkey ────────────────────────────────────────────────────────────────

    #[test]
    fn test_hotkey_press_shows_help_when_hidden() {
        let route = router().route_scancode(KbdFlags::empty(), Scancode::F12, None);
        assert_eq!(route, KeyRoute::ShowHelp);
        assert!(route.is_consumed());
    }

    #[test]
    fn test_hotkey_release_hides_help() {
        let route = router().route_scancode(KbdFlags::release(), Scancode::F12, Some(OsdKind::Help));
        assert_eq!(route, KeyRoute::HideHelp);
    }

    #[test]
    fn test_hotkey_repeat_while_help_is_up_is_swallowed() {
        let flags = KbdFlags(KbdFlags::DOWN);
        assert_eq!(
            router().route_scancode(flags, Scancode::F12, Some(OsdKind::Help)),
            KeyRoute::Swallow
        );
    }

    #[test]
    fn test_stray_hotkey_release_is_swallowed() {
        assert_eq!(
            router().route_scancode(KbdFlags::release(), Scancode::F12, None),
            KeyRoute::Swallow
        );
    }

    // ── Hotkey over a notice ──────────────────────────────────────────────────

    #[test]
    fn test_hotkey_press_over_notice_shows_help() {
        let route = router().route_scancode(KbdFlags::empty(), Scancode::F12, Some(OsdKind::Notice));
        assert_eq!(route, KeyRoute::ShowHelp);
    }

    #[test]
    fn test_hotkey_release_leaves_notice_up() {
        let route = router().route_scancode(KbdFlags::release(), Scancode::F12, Some(OsdKind::Notice));
        assert_eq!(route, KeyRoute::Swallow);
        assert!(route.is_consumed());
    }

    #[test]
    fn test_hotkey_is_forwarded_when_osd_disabled() {
        // Arrange
        let r = KeyboardRouter::default();
        assert!(!r.osd_enabled());

        // Act
        let route = r.route_scancode(KbdFlags::empty(), Scancode::F12, None);

        // Assert
        assert_eq!(route, KeyRoute::Forward { dismiss_overlay: false });
    }

    #[test]
    fn test_configured_hotkey_replaces_f12() {
        let mut r = KeyboardRouter::new(Scancode::F11);
        r.set_osd_enabled(true);
        assert_eq!(r.route_scancode(KbdFlags::empty(), Scancode::F11, None), KeyRoute::ShowHelp);
        assert!(!r.route_scancode(KbdFlags::empty(), Scancode::F12, None).is_consumed());
    }

    // ── Dismissal ─────────────────────────────────────────────────────────────

    #[test]
    fn test_other_key_dismisses_visible_overlay_then_forwards() {
        let route = router().route_scancode(KbdFlags(0x100), Scancode::INSERT, Some(OsdKind::Notice));
        assert_eq!(route, KeyRoute::Forward { dismiss_overlay: true });
    }

    #[test]
    fn test_other_key_without_overlay_just_forwards() {
        let route = router().route_scancode(KbdFlags::empty(), Scancode(0x1E), None);
        assert_eq!(route, KeyRoute::Forward { dismiss_overlay: false });
    }

    #[test]
    fn test_unicode_dismisses_and_synchronize_does_not() {
        let r = router();
        assert_eq!(r.route_unicode(true), KeyRoute::Forward { dismiss_overlay: true });
        assert_eq!(r.route_synchronize(), KeyRoute::Forward { dismiss_overlay: false });
    }

    // ── Mouse ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_left_click_on_banner_dismisses() {
        let banner = Rect::new(300, 0, 200, 32);
        let click = MouseFlags(MouseFlags::BUTTON1 | MouseFlags::DOWN);
        assert_eq!(router().route_mouse(click, 310, 10, banner), MouseRoute::DismissOverlay);
    }

    #[test]
    fn test_click_outside_banner_or_move_is_forwarded() {
        let r = router();
        let banner = Rect::new(300, 0, 200, 32);
        let click = MouseFlags(MouseFlags::BUTTON1 | MouseFlags::DOWN);
        assert_eq!(r.route_mouse(click, 10, 10, banner), MouseRoute::Forward);
        assert_eq!(r.route_mouse(MouseFlags(MouseFlags::MOVE), 310, 10, banner), MouseRoute::Forward);
        assert_eq!(r.route_mouse(click, 310, 10, Rect::empty()), MouseRoute::Forward);
    }

    // ── Help text ─────────────────────────────────────────────────────────────

    #[test]
    fn test_help_shows_user_at_device() {
        let info = SessionInfo::new("alice", "srv01");
        assert_eq!(info.help_lines(None), vec!["Target: alice@srv01"]);
    }

    #[test]
    fn test_help_shows_device_alone_without_user() {
        let info = SessionInfo::new("", "127.0.0.1");
        assert_eq!(info.help_lines(None), vec!["Target: 127.0.0.1"]);
    }

    #[test]
    fn test_help_rounds_remaining_minutes_up_when_connected() {
        // Arrange – 30 min limit, 10 min 30 s elapsed → 19 min 30 s left
        let info = SessionInfo::new("bob", "srv").with_time_limit(Duration::from_secs(30 * 60));

        // Act
        let lines = info.help_lines(Some(Duration::from_secs(10 * 60 + 30)));

        // Assert
        assert_eq!(lines, vec!["Target: bob@srv", "Session ends in 20 min"]);
    }

    #[test]
    fn test_help_omits_time_when_not_connected() {
        let info = SessionInfo::new("bob", "srv").with_time_limit(Duration::from_secs(60));
        assert_eq!(info.help_lines(None).len(), 1);
    }

    #[test]
    fn test_help_with_expired_limit_shows_zero() {
        let info = SessionInfo::new("", "srv").with_time_limit(Duration::from_secs(60));
        let lines = info.help_lines(Some(Duration::from_secs(120)));
        assert_eq!(lines[1], "Session ends in 0 min");
    }
}
