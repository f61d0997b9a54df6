//! Keyboard scancodes and event flags as they arrive from an RDP client.
//!
//! RDP keyboard events carry the PC/AT set-1 *make code* of the physical key
//! plus a flag word.  The same make code can mean two different keys: `0x52`
//! is numeric-keypad `0` on its own and the Insert key when the
//! [`KbdFlags::EXTENDED`] flag is set.
//!
//! | Key          | Scancode | Extended |
//! |--------------|----------|----------|
//! | Escape       | 0x01     | no       |
//! | F12          | 0x58     | no       |
//! | Insert       | 0x52     | yes      |
//! | Delete       | 0x53     | yes      |
//! | Right Ctrl   | 0x1D     | yes      |

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Keyboard event flags (`TS_KEYBOARD_EVENT.keyboardFlags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KbdFlags(pub u16);

impl KbdFlags {
    /// The scancode belongs to the extended (0xE0-prefixed) set.
    pub const EXTENDED: u16 = 0x0100;
    /// The scancode belongs to the 0xE1-prefixed set (Pause).
    pub const EXTENDED1: u16 = 0x0200;
    /// The key was already down (auto-repeat).
    pub const DOWN: u16 = 0x4000;
    /// The key is being released.
    pub const RELEASE: u16 = 0x8000;

    pub const fn empty() -> Self {
        KbdFlags(0)
    }

    /// Flags of a key release.
    pub const fn release() -> Self {
        KbdFlags(Self::RELEASE)
    }

    pub fn is_release(self) -> bool {
        self.0 & Self::RELEASE != 0
    }

    pub fn is_extended(self) -> bool {
        self.0 & Self::EXTENDED != 0
    }

    /// Returns a copy with `bits` added.
    pub fn with(self, bits: u16) -> Self {
        KbdFlags(self.0 | bits)
    }
}

/// A set-1 make code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scancode(pub u8);

impl Scancode {
    pub const ESC: Scancode = Scancode(0x01);
    pub const BACKSPACE: Scancode = Scancode(0x0E);
    pub const TAB: Scancode = Scancode(0x0F);
    pub const ENTER: Scancode = Scancode(0x1C);
    pub const CTRL: Scancode = Scancode(0x1D);
    pub const LSHIFT: Scancode = Scancode(0x2A);
    pub const RSHIFT: Scancode = Scancode(0x36);
    pub const ALT: Scancode = Scancode(0x38);
    pub const SPACE: Scancode = Scancode(0x39);
    pub const CAPS_LOCK: Scancode = Scancode(0x3A);
    pub const F1: Scancode = Scancode(0x3B);
    pub const F2: Scancode = Scancode(0x3C);
    pub const F3: Scancode = Scancode(0x3D);
    pub const F4: Scancode = Scancode(0x3E);
    pub const F5: Scancode = Scancode(0x3F);
    pub const F6: Scancode = Scancode(0x40);
    pub const F7: Scancode = Scancode(0x41);
    pub const F8: Scancode = Scancode(0x42);
    pub const F9: Scancode = Scancode(0x43);
    pub const F10: Scancode = Scancode(0x44);
    pub const NUM_LOCK: Scancode = Scancode(0x45);
    pub const SCROLL_LOCK: Scancode = Scancode(0x46);
    /// Insert when extended, numeric-keypad 0 otherwise.
    pub const INSERT: Scancode = Scancode(0x52);
    /// Delete when extended, numeric-keypad decimal otherwise.
    pub const DELETE: Scancode = Scancode(0x53);
    pub const F11: Scancode = Scancode(0x57);
    pub const F12: Scancode = Scancode(0x58);
    /// Left Windows key (extended).
    pub const LWIN: Scancode = Scancode(0x5B);
    /// Right Windows key (extended).
    pub const RWIN: Scancode = Scancode(0x5C);
}

/// Named keys accepted in configuration files and host scripts.
const NAMED_KEYS: &[(&str, Scancode)] = &[
    ("Esc", Scancode::ESC),
    ("Backspace", Scancode::BACKSPACE),
    ("Tab", Scancode::TAB),
    ("Enter", Scancode::ENTER),
    ("Ctrl", Scancode::CTRL),
    ("LShift", Scancode::LSHIFT),
    ("RShift", Scancode::RSHIFT),
    ("Alt", Scancode::ALT),
    ("Space", Scancode::SPACE),
    ("CapsLock", Scancode::CAPS_LOCK),
    ("F1", Scancode::F1),
    ("F2", Scancode::F2),
    ("F3", Scancode::F3),
    ("F4", Scancode::F4),
    ("F5", Scancode::F5),
    ("F6", Scancode::F6),
    ("F7", Scancode::F7),
    ("F8", Scancode::F8),
    ("F9", Scancode::F9),
    ("F10", Scancode::F10),
    ("NumLock", Scancode::NUM_LOCK),
    ("ScrollLock", Scancode::SCROLL_LOCK),
    ("Insert", Scancode::INSERT),
    ("Delete", Scancode::DELETE),
    ("F11", Scancode::F11),
    ("F12", Scancode::F12),
    ("LWin", Scancode::LWIN),
    ("RWin", Scancode::RWIN),
];

/// Error returned when a key name is neither a known name nor a hex scancode.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown key name: {0:?}")]
pub struct ParseKeyError(pub String);

impl FromStr for Scancode {
    type Err = ParseKeyError;

    /// Accepts a key name (`"F12"`, `"insert"`, case-insensitive) or a hex
    /// scancode (`"0x52"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u8::from_str_radix(hex, 16)
                .map(Scancode)
                .map_err(|_| ParseKeyError(s.to_string()));
        }
        NAMED_KEYS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, code)| *code)
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}

impl fmt::Display for Scancode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NAMED_KEYS.iter().find(|(_, code)| code == self) {
            Some((name, _)) => f.write_str(name),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

/// Returns `true` if the named key behind `scancode` is only reachable with
/// the extended flag.
///
/// Host scripts use this so that `"Insert"` produces an extended event rather
/// than numeric-keypad 0.
pub fn is_extended_key(scancode: Scancode) -> bool {
    matches!(
        scancode,
        Scancode::INSERT | Scancode::DELETE | Scancode::LWIN | Scancode::RWIN
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_keys_case_insensitively() {
        assert_eq!("F12".parse::<Scancode>(), Ok(Scancode::F12));
        assert_eq!("insert".parse::<Scancode>(), Ok(Scancode::INSERT));
        assert_eq!("ScrollLock".parse::<Scancode>(), Ok(Scancode::SCROLL_LOCK));
    }

    #[test]
    fn test_parse_hex_scancode() {
        assert_eq!("0x1e".parse::<Scancode>(), Ok(Scancode(0x1E)));
        assert!("0xZZ".parse::<Scancode>().is_err());
    }

    #[test]
    fn test_parse_unknown_name_fails() {
        assert_eq!(
            "Hyper".parse::<Scancode>(),
            Err(ParseKeyError("Hyper".to_string()))
        );
    }

    #[test]
    fn test_display_prefers_names() {
        assert_eq!(Scancode::F12.to_string(), "F12");
        assert_eq!(Scancode(0x1E).to_string(), "0x1E");
    }

    #[test]
    fn test_flags_release_and_extended() {
        let flags = KbdFlags(0x100);
        assert!(flags.is_extended());
        assert!(!flags.is_release());
        assert!(flags.with(KbdFlags::RELEASE).is_release());
    }
}
