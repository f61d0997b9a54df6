//! Contracts between the session wrapper and the pluggable session backends.
//!
//! # What is a "module"? (for beginners)
//!
//! During one user connection the proxy shows several different things in
//! the same client window: a waiting screen while the target is selected,
//! the real remote-desktop session once connected, a close box when the
//! session ends.  Each of these is a *module*.  The wrapper holds exactly one
//! of them at a time and forwards host input to it; swapping modules never
//! disturbs the client connection itself.
//!
//! Besides [`Module`], this file defines the two external collaborators the
//! wrapper merely *references*:
//!
//! - [`WindowIntegration`] – the remote-application (window integration)
//!   layer, which owns window decorations and may capture mouse input.
//! - [`SocketTransport`] – the module's network transport, consulted for
//!   liveness.

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use rdproxy_core::{ColorCtx, GraphicApi, KbdFlags, Keymap, Rect, RgbColor, Scancode, SyncFlags};
use thiserror::Error;

// ── Mouse flags ───────────────────────────────────────────────────────────────

/// Pointer event flags (`TS_POINTER_EVENT.pointerFlags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseFlags(pub u16);

impl MouseFlags {
    pub const WHEEL: u16 = 0x0200;
    pub const MOVE: u16 = 0x0800;
    /// Left button.
    pub const BUTTON1: u16 = 0x1000;
    /// Right button.
    pub const BUTTON2: u16 = 0x2000;
    /// Middle button.
    pub const BUTTON3: u16 = 0x4000;
    /// Set on press, clear on release.
    pub const DOWN: u16 = 0x8000;

    pub fn contains(&self, bits: u16) -> bool {
        self.0 & bits == bits
    }

    /// `true` for a left-button press.
    pub fn is_left_press(&self) -> bool {
        self.contains(Self::BUTTON1 | Self::DOWN)
    }
}

// ── Module contract ───────────────────────────────────────────────────────────

/// A session backend plugged into the wrapper.
///
/// Every method has a do-nothing default so small modules only implement
/// what they react to.  Drawing always goes through the `gd` handed in by
/// the wrapper, never through a surface the module keeps for itself: that is
/// how the wrapper keeps module output away from the on-screen display.
pub trait Module {
    fn input_scancode(
        &mut self,
        _flags: KbdFlags,
        _scancode: Scancode,
        _event_time: u32,
        _keymap: &Keymap,
        _gd: &mut dyn GraphicApi,
    ) {
    }

    fn input_unicode(&mut self, _flags: KbdFlags, _unicode: u16, _gd: &mut dyn GraphicApi) {}

    fn input_synchronize(&mut self, _flags: SyncFlags, _gd: &mut dyn GraphicApi) {}

    fn input_mouse(&mut self, _flags: MouseFlags, _x: u16, _y: u16, _gd: &mut dyn GraphicApi) {}

    /// Repaints `rect` from the module's own state.
    fn input_invalidate(&mut self, _rect: Rect, _gd: &mut dyn GraphicApi) {}

    fn send_to_mod_channel(&mut self, _channel: &str, _data: &[u8]) {}

    /// The client wants updates again; `rect` is the area it needs.
    fn allow_display_updates(&mut self, _rect: Rect, _gd: &mut dyn GraphicApi) {}

    /// The client window is minimised; drawing can stop.
    fn suppress_display_updates(&mut self) {}

    fn is_up_and_running(&self) -> bool {
        false
    }

    /// Releases module resources.  Called at most once per module: when the
    /// session disconnects or right before the module is replaced.
    fn disconnect(&mut self) {}
}

/// Kind of module currently installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModuleName {
    Rdp,
    Vnc,
    Close,
    #[default]
    Waiting,
    Internal,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown module name: {0:?}")]
pub struct ParseModuleNameError(pub String);

impl FromStr for ModuleName {
    type Err = ParseModuleNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rdp" => Ok(ModuleName::Rdp),
            "vnc" => Ok(ModuleName::Vnc),
            "close" => Ok(ModuleName::Close),
            "waiting" => Ok(ModuleName::Waiting),
            "internal" => Ok(ModuleName::Internal),
            _ => Err(ParseModuleNameError(s.to_string())),
        }
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleName::Rdp => "rdp",
            ModuleName::Vnc => "vnc",
            ModuleName::Close => "close",
            ModuleName::Waiting => "waiting",
            ModuleName::Internal => "internal",
        })
    }
}

// ── Referenced collaborators ──────────────────────────────────────────────────

/// Capability handle forwarded opaquely to higher layers (RDP or window API).
pub type OpaqueApi = Rc<dyn Any>;

/// The remote-application (window integration) layer.
#[cfg_attr(test, mockall::automock)]
pub trait WindowIntegration {
    /// `true` while remote applications are shown instead of a full desktop.
    fn is_active(&self) -> bool;

    /// The area available to session content while active.
    fn work_area(&self) -> Rect;

    /// Offers a mouse event to the layer.  Returns `true` if it consumed it.
    fn input_mouse(&self, flags: MouseFlags, x: u16, y: u16) -> bool;

    /// Redraws window decorations intersecting `rect`.
    fn input_invalidate(&self, rect: Rect);
}

/// Window integration that is never active.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRail;

impl WindowIntegration for DisabledRail {
    fn is_active(&self) -> bool {
        false
    }

    fn work_area(&self) -> Rect {
        Rect::empty()
    }

    fn input_mouse(&self, _flags: MouseFlags, _x: u16, _y: u16) -> bool {
        false
    }

    fn input_invalidate(&self, _rect: Rect) {}
}

/// Network transport of a module.
#[cfg_attr(test, mockall::automock)]
pub trait SocketTransport {
    /// Printable address of the remote peer.
    fn peer_name(&self) -> String;

    /// `false` once the connection has been lost or timed out.
    fn is_alive(&self) -> bool;
}

/// Everything installed by one `set_mod` call.
#[derive(Default)]
pub struct ModPack {
    /// `None` leaves the wrapper without an active module.
    pub module: Option<Box<dyn Module>>,
    pub rdpapi: Option<OpaqueApi>,
    pub winapi: Option<OpaqueApi>,
    /// Whether the help hotkey is active for this module.
    pub enable_osd: bool,
    /// Whether the session already counts as connected.
    pub connected: bool,
    pub socket_transport: Option<Rc<dyn SocketTransport>>,
}

impl ModPack {
    pub fn new(module: Box<dyn Module>) -> Self {
        Self {
            module: Some(module),
            ..Self::default()
        }
    }

    pub fn with_osd(mut self, enable_osd: bool) -> Self {
        self.enable_osd = enable_osd;
        self
    }

    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    pub fn with_transport(mut self, transport: Rc<dyn SocketTransport>) -> Self {
        self.socket_transport = Some(transport);
        self
    }
}

// ── Built-in modules ──────────────────────────────────────────────────────────

/// A module that ignores everything and draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMod;

impl Module for NullMod {}

/// A module that shows a plain background, used for waiting and close
/// screens.  Any invalidated area is repainted with `color`.
#[derive(Debug, Clone, Copy)]
pub struct SolidMod {
    color: RgbColor,
}

impl SolidMod {
    pub fn new(color: RgbColor) -> Self {
        Self { color }
    }

    pub fn color(&self) -> RgbColor {
        self.color
    }
}

impl Default for SolidMod {
    fn default() -> Self {
        Self::new(RgbColor::BLACK)
    }
}

impl Module for SolidMod {
    fn input_invalidate(&mut self, rect: Rect, gd: &mut dyn GraphicApi) {
        gd.draw_rect(rect, self.color, ColorCtx::depth24());
    }

    fn allow_display_updates(&mut self, rect: Rect, gd: &mut dyn GraphicApi) {
        self.input_invalidate(rect, gd);
    }

    fn is_up_and_running(&self) -> bool {
        true
    }
}
