//! Live keyboard state of a session.
//!
//! The [`Keymap`] tracks which modifiers are held, which lock keys are on and
//! which keyboard layout the client announced.  It belongs to the session,
//! not to the protocol module currently plugged in: when the proxy swaps the
//! login screen for the RDP backend, a Shift key held across the swap is
//! still held afterwards.

pub mod scancode;

pub use scancode::{is_extended_key, KbdFlags, ParseKeyError, Scancode};

/// Keyboard layout announced by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    /// Windows keyboard layout identifier (KLID), e.g. `0x0409` for en-US.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
}

impl KeyLayout {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The placeholder layout used before the client announces its own.
    pub fn null_layout() -> Self {
        Self::new(0, "null")
    }
}

/// Modifier keys currently held, left and right tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const LEFT_CTRL: u8 = 1 << 0;
    pub const RIGHT_CTRL: u8 = 1 << 1;
    pub const LEFT_SHIFT: u8 = 1 << 2;
    pub const RIGHT_SHIFT: u8 = 1 << 3;
    pub const LEFT_ALT: u8 = 1 << 4;
    /// Right Alt, reported as AltGr on most European layouts.
    pub const RIGHT_ALT: u8 = 1 << 5;
    pub const LEFT_WIN: u8 = 1 << 6;
    pub const RIGHT_WIN: u8 = 1 << 7;

    pub fn ctrl(&self) -> bool {
        self.0 & (Self::LEFT_CTRL | Self::RIGHT_CTRL) != 0
    }

    pub fn shift(&self) -> bool {
        self.0 & (Self::LEFT_SHIFT | Self::RIGHT_SHIFT) != 0
    }

    pub fn alt(&self) -> bool {
        self.0 & Self::LEFT_ALT != 0
    }

    pub fn altgr(&self) -> bool {
        self.0 & Self::RIGHT_ALT != 0
    }

    pub fn win(&self) -> bool {
        self.0 & (Self::LEFT_WIN | Self::RIGHT_WIN) != 0
    }

    fn set(&mut self, bit: u8, down: bool) {
        if down {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

/// Lock-key bits of a synchronize event (`TS_SYNC_EVENT.toggleFlags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncFlags(pub u16);

impl SyncFlags {
    pub const SCROLL_LOCK: u16 = 0x01;
    pub const NUM_LOCK: u16 = 0x02;
    pub const CAPS_LOCK: u16 = 0x04;
    pub const KANA_LOCK: u16 = 0x08;
}

/// What the most recent key event means to the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KEvent {
    /// No key event has been seen yet.
    #[default]
    None,
    /// Ctrl, Shift, Alt or Windows key.
    Modifier,
    /// Caps, Num or Scroll Lock.
    Lock,
    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    /// Function key F1–F12 (the number is 1-based).
    Function(u8),
    /// Any other key.
    Other,
}

/// Keyboard state owned by the session wrapper.
#[derive(Debug, Clone)]
pub struct Keymap {
    layout: KeyLayout,
    modifiers: Modifiers,
    locks: SyncFlags,
    last_kevent: KEvent,
    last_scancode: Scancode,
    last_flags: KbdFlags,
}

impl Keymap {
    pub fn new(layout: KeyLayout) -> Self {
        Self {
            layout,
            modifiers: Modifiers::default(),
            locks: SyncFlags::default(),
            last_kevent: KEvent::None,
            last_scancode: Scancode::default(),
            last_flags: KbdFlags::default(),
        }
    }

    /// Records a key event and returns its classification.
    ///
    /// Modifier state follows press and release.  Lock keys toggle on the
    /// initial press only; auto-repeat (the `DOWN` flag) leaves them alone.
    pub fn event(&mut self, flags: KbdFlags, scancode: Scancode) -> KEvent {
        let released = flags.is_release();
        let extended = flags.is_extended();
        let repeat = flags.0 & KbdFlags::DOWN != 0;

        let kevent = match (scancode, extended) {
            (Scancode::CTRL, false) => self.modifier(Modifiers::LEFT_CTRL, !released),
            (Scancode::CTRL, true) => self.modifier(Modifiers::RIGHT_CTRL, !released),
            (Scancode::LSHIFT, _) => self.modifier(Modifiers::LEFT_SHIFT, !released),
            (Scancode::RSHIFT, _) => self.modifier(Modifiers::RIGHT_SHIFT, !released),
            (Scancode::ALT, false) => self.modifier(Modifiers::LEFT_ALT, !released),
            (Scancode::ALT, true) => self.modifier(Modifiers::RIGHT_ALT, !released),
            (Scancode::LWIN, true) => self.modifier(Modifiers::LEFT_WIN, !released),
            (Scancode::RWIN, true) => self.modifier(Modifiers::RIGHT_WIN, !released),
            (Scancode::CAPS_LOCK, _) => self.lock(SyncFlags::CAPS_LOCK, released || repeat),
            (Scancode::NUM_LOCK, _) => self.lock(SyncFlags::NUM_LOCK, released || repeat),
            (Scancode::SCROLL_LOCK, _) => self.lock(SyncFlags::SCROLL_LOCK, released || repeat),
            (Scancode::ESC, _) => KEvent::Escape,
            (Scancode::ENTER, _) => KEvent::Enter,
            (Scancode::TAB, _) => KEvent::Tab,
            (Scancode::BACKSPACE, _) => KEvent::Backspace,
            (Scancode::INSERT, true) => KEvent::Insert,
            (Scancode::DELETE, true) => KEvent::Delete,
            (Scancode(code @ 0x3B..=0x44), false) => KEvent::Function(code - 0x3A),
            (Scancode::F11, false) => KEvent::Function(11),
            (Scancode::F12, false) => KEvent::Function(12),
            _ => KEvent::Other,
        };

        self.last_kevent = kevent;
        self.last_scancode = scancode;
        self.last_flags = flags;
        kevent
    }

    /// Applies the lock state carried by a synchronize event.
    pub fn synchronize(&mut self, flags: SyncFlags) {
        self.locks = flags;
    }

    fn modifier(&mut self, bit: u8, down: bool) -> KEvent {
        self.modifiers.set(bit, down);
        KEvent::Modifier
    }

    fn lock(&mut self, bit: u16, no_toggle: bool) -> KEvent {
        if !no_toggle {
            self.locks.0 ^= bit;
        }
        KEvent::Lock
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Switches layout.  Held modifiers and lock state are kept.
    pub fn set_layout(&mut self, layout: KeyLayout) {
        self.layout = layout;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_ctrl_pressed(&self) -> bool {
        self.modifiers.ctrl()
    }

    pub fn is_shift_pressed(&self) -> bool {
        self.modifiers.shift()
    }

    pub fn is_alt_pressed(&self) -> bool {
        self.modifiers.alt()
    }

    pub fn is_caps_locked(&self) -> bool {
        self.locks.0 & SyncFlags::CAPS_LOCK != 0
    }

    pub fn is_num_locked(&self) -> bool {
        self.locks.0 & SyncFlags::NUM_LOCK != 0
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.locks.0 & SyncFlags::SCROLL_LOCK != 0
    }

    pub fn last_kevent(&self) -> KEvent {
        self.last_kevent
    }

    pub fn last_scancode(&self) -> Scancode {
        self.last_scancode
    }

    /// `true` if the most recent key event was a release.
    pub fn last_was_release(&self) -> bool {
        self.last_flags.is_release()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new(KeyLayout::null_layout())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn press(km: &mut Keymap, sc: Scancode) -> KEvent {
        km.event(KbdFlags::empty(), sc)
    }

    fn release(km: &mut Keymap, sc: Scancode) -> KEvent {
        km.event(KbdFlags::release(), sc)
    }

    #[test]
    fn test_modifier_follows_press_and_release() {
        // Arrange
        let mut km = Keymap::default();

        // Act / Assert
        press(&mut km, Scancode::LSHIFT);
        assert!(km.is_shift_pressed());
        release(&mut km, Scancode::LSHIFT);
        assert!(!km.is_shift_pressed());
    }

    #[test]
    fn test_extended_ctrl_is_right_ctrl() {
        let mut km = Keymap::default();
        km.event(KbdFlags(KbdFlags::EXTENDED), Scancode::CTRL);
        assert_eq!(km.modifiers().0, Modifiers::RIGHT_CTRL);
        assert!(km.is_ctrl_pressed());
    }

    #[test]
    fn test_right_alt_is_altgr_not_alt() {
        let mut km = Keymap::default();
        km.event(KbdFlags(KbdFlags::EXTENDED), Scancode::ALT);
        assert!(km.modifiers().altgr());
        assert!(!km.is_alt_pressed());
    }

    #[test]
    fn test_caps_lock_toggles_on_press_only() {
        let mut km = Keymap::default();

        press(&mut km, Scancode::CAPS_LOCK);
        release(&mut km, Scancode::CAPS_LOCK);
        assert!(km.is_caps_locked());

        // auto-repeat does not toggle
        km.event(KbdFlags(KbdFlags::DOWN), Scancode::CAPS_LOCK);
        assert!(km.is_caps_locked());

        press(&mut km, Scancode::CAPS_LOCK);
        assert!(!km.is_caps_locked());
    }

    #[test]
    fn test_synchronize_overrides_lock_state() {
        let mut km = Keymap::default();
        km.synchronize(SyncFlags(SyncFlags::NUM_LOCK | SyncFlags::SCROLL_LOCK));
        assert!(km.is_num_locked());
        assert!(km.is_scroll_locked());
        assert!(!km.is_caps_locked());
    }

    #[test]
    fn test_insert_requires_extended_flag() {
        let mut km = Keymap::default();
        assert_eq!(km.event(KbdFlags(0x100), Scancode::INSERT), KEvent::Insert);
        assert_eq!(press(&mut km, Scancode::INSERT), KEvent::Other);
    }

    #[test]
    fn test_function_keys_are_numbered_from_one() {
        let mut km = Keymap::default();
        assert_eq!(press(&mut km, Scancode::F1), KEvent::Function(1));
        assert_eq!(press(&mut km, Scancode::F10), KEvent::Function(10));
        assert_eq!(press(&mut km, Scancode::F12), KEvent::Function(12));
        assert_eq!(km.last_kevent(), KEvent::Function(12));
        assert_eq!(km.last_scancode(), Scancode::F12);
    }

    #[test]
    fn test_set_layout_keeps_modifier_state() {
        let mut km = Keymap::default();
        press(&mut km, Scancode::CTRL);

        km.set_layout(KeyLayout::new(0x040C, "fr-FR"));

        assert_eq!(km.layout().id, 0x040C);
        assert!(km.is_ctrl_pressed());
    }
}
