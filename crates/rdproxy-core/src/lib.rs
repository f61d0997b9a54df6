//! # rdproxy-core
//!
//! Shared library for the rdproxy session layer: surface geometry, drawing
//! contracts, keyboard state and pattern-rule classification.
//!
//! It has zero dependencies on OS APIs, network sockets or any concrete
//! protocol backend, so everything here can be tested on any machine.
//!
//! # Architecture overview (for beginners)
//!
//! rdproxy sits between a user's remote-desktop client and the target
//! server.  Inside the proxy, the *session wrapper* (in `rdproxy-session`)
//! hosts whichever protocol backend is currently active and paints short
//! notices on top of it.  This crate holds the vocabulary both sides share:
//!
//! - **`domain`** – Rectangles and the client display descriptor.
//!
//! - **`gdi`** – The two drawing primitives a host surface must offer, 24-bit
//!   colours and their depth reduction, font metrics, and the urgency tiers
//!   of on-screen messages.
//!
//! - **`keymap`** – Scancodes, keyboard flags and the live modifier/lock
//!   state of a session.
//!
//! - **`pattern`** – Parsing of policy rule sets and the decision of which
//!   monitoring channels (keystrokes, screen text) a policy needs.

pub mod domain;
pub mod gdi;
pub mod keymap;
pub mod pattern;

// Re-export the most-used types at the crate root.
pub use domain::geometry::Rect;
pub use domain::screen::{BitsPerPixel, ScreenInfo, UnsupportedDepth};
pub use gdi::{ColorCtx, FixedFont, Font, GraphicApi, OsdMsgUrgency, RgbColor};
pub use keymap::{KbdFlags, KEvent, KeyLayout, Keymap, Scancode, SyncFlags};
pub use pattern::{
    contains_kbd_or_ocr_pattern, contains_kbd_pattern, contains_ocr_pattern, CaptureChannels,
};
