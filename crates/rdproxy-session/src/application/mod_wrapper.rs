//! ModWrapper: hosts the active session module and the on-screen display.
//!
//! The wrapper sits between the host front end (display surface plus
//! keyboard/mouse source) and whichever [`Module`] is currently plugged in.
//! It owns:
//!
//! - the active module, replaced synchronously by [`ModWrapper::set_mod`];
//! - the session [`Keymap`], which survives module replacement;
//! - the [`Osd`] overlay and the [`KeyboardRouter`] that drives it.
//!
//! # Event flow (for beginners)
//!
//! ```text
//! host front ──▶ Callback (ModWrapper) ──▶ KeyboardRouter decision
//!                        │                     │
//!                        │        hotkey ──────┴──▶ Osd show / hide
//!                        │
//!                        └──▶ hide overlay if needed ──▶ active Module
//!                                                           │
//!                                  surface ◀── draw orders ◀┘
//! ```
//!
//! Everything runs on the thread that owns the surface.  Every mutating call
//! takes `&mut self`, so a module swap can never interleave with input
//! delivery.

use std::rc::Rc;
use std::time::{Duration, Instant};

use rdproxy_core::{
    ColorCtx, Font, GraphicApi, KbdFlags, KeyLayout, Keymap, OsdMsgUrgency, Rect, RgbColor,
    Scancode, ScreenInfo, SyncFlags,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::keyboard_router::{KeyRoute, KeyboardRouter, MouseRoute, SessionInfo};
use super::module::{
    ModPack, Module, ModuleName, MouseFlags, OpaqueApi, SocketTransport, WindowIntegration,
};
use super::osd::{Osd, OsdMessage};
use super::protected::ProtectedGraphics;

/// Colour of the surface when no module is there to repaint it.
pub const BLANK_COLOR: RgbColor = RgbColor::BLACK;

/// Host-facing input surface.
///
/// The front end drives the session exclusively through this trait; it never
/// sees the module behind it.
pub trait Callback {
    fn input_scancode(&mut self, flags: KbdFlags, scancode: Scancode, event_time: u32);
    fn input_unicode(&mut self, flags: KbdFlags, unicode: u16);
    fn input_synchronize(&mut self, flags: SyncFlags);
    fn input_mouse(&mut self, flags: MouseFlags, x: u16, y: u16);
    /// The host needs `rect` repainted.
    fn input_invalidate(&mut self, rect: Rect);
    fn send_to_mod_channel(&mut self, channel: &str, data: &[u8]);
    fn allow_display_updates(&mut self, rect: Rect);
    fn suppress_display_updates(&mut self);
}

pub struct ModWrapper<G: GraphicApi> {
    session_id: Uuid,
    gd: G,
    screen: ScreenInfo,
    font: Box<dyn Font>,
    keymap: Keymap,
    osd: Osd,
    router: KeyboardRouter,
    rail: Rc<dyn WindowIntegration>,
    session: SessionInfo,
    current: Option<Box<dyn Module>>,
    current_name: ModuleName,
    /// The current module's `disconnect` hook has already run.
    released: bool,
    rdpapi: Option<OpaqueApi>,
    winapi: Option<OpaqueApi>,
    transport: Option<Rc<dyn SocketTransport>>,
    connected_at: Option<Instant>,
}

impl<G: GraphicApi> ModWrapper<G> {
    /// Creates a wrapper with no active module.
    pub fn new(
        gd: G,
        screen: ScreenInfo,
        font: Box<dyn Font>,
        rail: Rc<dyn WindowIntegration>,
    ) -> Self {
        let session_id = Uuid::new_v4();
        info!(session = %session_id, width = screen.width, height = screen.height, "session wrapper created");
        Self {
            session_id,
            gd,
            screen,
            font,
            keymap: Keymap::default(),
            osd: Osd::new(),
            router: KeyboardRouter::default(),
            rail,
            session: SessionInfo::default(),
            current: None,
            current_name: ModuleName::default(),
            released: false,
            rdpapi: None,
            winapi: None,
            transport: None,
            connected_at: None,
        }
    }

    /// Sets the help hotkey.
    pub fn with_hotkey(mut self, hotkey: Scancode) -> Self {
        let enabled = self.router.osd_enabled();
        self.router = KeyboardRouter::new(hotkey);
        self.router.set_osd_enabled(enabled);
        self
    }

    /// Scancode that shows the help banner while held.
    pub fn hotkey(&self) -> Scancode {
        self.router.hotkey()
    }

    pub fn with_session_info(mut self, session: SessionInfo) -> Self {
        self.session = session;
        self
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    // ── Module lifecycle ──────────────────────────────────────────────────────

    /// Replaces the active module.
    ///
    /// A visible overlay is erased through the outgoing module, which then
    /// gets its `disconnect` hook and is dropped before `pack` is installed.
    pub fn set_mod(&mut self, name: ModuleName, pack: ModPack) {
        self.hide_osd();

        if let Some(mut old) = self.current.take() {
            debug!(session = %self.session_id, module = %self.current_name, "releasing module");
            if !self.released {
                old.disconnect();
            }
        }

        info!(
            session = %self.session_id,
            from = %self.current_name,
            to = %name,
            enable_osd = pack.enable_osd,
            connected = pack.connected,
            "switching module"
        );

        self.current = pack.module;
        self.current_name = name;
        self.released = false;
        self.rdpapi = pack.rdpapi;
        self.winapi = pack.winapi;
        self.transport = pack.socket_transport;
        self.router.set_osd_enabled(pack.enable_osd);
        self.set_connected(pack.connected);

        if let Some(transport) = &self.transport {
            debug!(session = %self.session_id, peer = %transport.peer_name(), "module transport attached");
        }
    }

    pub fn current_mod_name(&self) -> ModuleName {
        self.current_name
    }

    pub fn has_mod(&self) -> bool {
        self.current.is_some()
    }

    pub fn rdpapi(&self) -> Option<&OpaqueApi> {
        self.rdpapi.as_ref()
    }

    pub fn winapi(&self) -> Option<&OpaqueApi> {
        self.winapi.as_ref()
    }

    pub fn mod_transport(&self) -> Option<&Rc<dyn SocketTransport>> {
        self.transport.as_ref()
    }

    /// `true` when the module runs and its transport, if any, is alive.
    pub fn is_up_and_running(&self) -> bool {
        let module_up = self.current.as_ref().is_some_and(|m| m.is_up_and_running());
        let transport_up = self.transport.as_ref().map_or(true, |t| t.is_alive());
        module_up && transport_up
    }

    pub fn set_connected(&mut self, connected: bool) {
        match (connected, self.connected_at) {
            (true, None) => self.connected_at = Some(Instant::now()),
            (false, _) => self.connected_at = None,
            (true, Some(_)) => {}
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected_at.is_some()
    }

    /// Ends the session: releases the module resources and marks the
    /// session disconnected.  The module stays installed until replaced.
    pub fn disconnect(&mut self) {
        info!(session = %self.session_id, module = %self.current_name, "session disconnect");
        if let Some(module) = self.current.as_deref_mut() {
            if !self.released {
                module.disconnect();
                self.released = true;
            }
        }
        self.set_connected(false);
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Returns the input entry point for the host front end.
    pub fn get_callback(&mut self) -> &mut dyn Callback {
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn screen_info(&self) -> ScreenInfo {
        self.screen
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn set_keyboard_layout(&mut self, layout: KeyLayout) {
        info!(session = %self.session_id, layout = %layout.name, id = layout.id, "keyboard layout changed");
        self.keymap.set_layout(layout);
    }

    pub fn set_session_info(&mut self, session: SessionInfo) {
        self.session = session;
    }

    pub fn graphics(&self) -> &G {
        &self.gd
    }

    pub fn graphics_mut(&mut self) -> &mut G {
        &mut self.gd
    }

    // ── On-screen display ─────────────────────────────────────────────────────

    pub fn is_osd_shown(&self) -> bool {
        self.osd.is_visible()
    }

    pub fn osd(&self) -> &Osd {
        &self.osd
    }

    /// Shows a system notice, replacing any banner currently up.
    ///
    /// Lines are split on `\n` and drawn verbatim.  An empty `text` only
    /// hides the current banner.
    pub fn display_osd_message(&mut self, text: &str, urgency: OsdMsgUrgency) {
        if text.is_empty() {
            self.hide_osd();
            return;
        }
        let lines = text.split('\n').map(str::to_owned).collect();
        self.show_osd(OsdMessage::notice(lines, urgency));
    }

    /// Erases the banner, letting the active module repaint under it.
    pub fn hide_osd(&mut self) {
        let gd = &mut self.gd;
        let current = &mut self.current;
        let session_id = self.session_id;
        self.osd
            .hide(|region| repaint_under(current, session_id, region, gd));
    }

    /// Shows `message` in place of whatever banner is up.
    fn show_osd(&mut self, message: OsdMessage) {
        let area = self.osd_area();
        let ctx = ColorCtx::from(self.screen.bpp);
        let urgency = message.urgency;
        let kind = message.kind;
        let line_count = message.lines.len();
        let current = &mut self.current;
        let session_id = self.session_id;
        let shown = self.osd.show(
            &mut self.gd,
            self.font.as_ref(),
            ctx,
            area,
            message,
            |region, gd| repaint_under(current, session_id, region, gd),
        );
        if shown {
            info!(session = %self.session_id, %urgency, ?kind, lines = line_count, region = ?self.osd.region(), "OSD shown");
        } else {
            warn!(session = %self.session_id, %urgency, ?area, "OSD message not rendered");
        }
    }

    /// Shows the hotkey help banner.
    ///
    /// Only the "Session ends in" line depends on the clock.  Two hotkey
    /// cycles therefore draw the same frame unless the remaining minutes
    /// ticked over in between.
    fn show_help(&mut self) {
        let connected_for = self.connected_at.map(|t| t.elapsed());
        self.show_help_at(connected_for);
    }

    fn show_help_at(&mut self, connected_for: Option<Duration>) {
        let lines = self.session.help_lines(connected_for);
        self.show_osd(OsdMessage::help(lines));
    }

    /// Area the banner is centred in: the work area while remote
    /// applications are shown, the whole screen otherwise.
    fn osd_area(&self) -> Rect {
        let screen = self.screen.rect();
        if self.rail.is_active() {
            self.rail.work_area().intersect(&screen)
        } else {
            screen
        }
    }

    // ── Forwarding ────────────────────────────────────────────────────────────

    /// Runs `f` against the active module.  While the banner is up the module
    /// draws through a proxy that cannot paint over it.
    fn forward(&mut self, f: impl FnOnce(&mut dyn Module, &Keymap, &mut dyn GraphicApi)) {
        let Some(module) = self.current.as_deref_mut() else {
            debug!(session = %self.session_id, "no active module, event dropped");
            return;
        };
        if self.osd.is_visible() {
            let mut guarded = ProtectedGraphics::new(&mut self.gd, self.osd.region());
            f(module, &self.keymap, &mut guarded);
        } else {
            f(module, &self.keymap, &mut self.gd);
        }
    }

    /// Applies `route` to the overlay; returns whether the module gets the
    /// event.
    fn apply_key_route(&mut self, route: KeyRoute) -> bool {
        match route {
            KeyRoute::ShowHelp => self.show_help(),
            KeyRoute::HideHelp | KeyRoute::Forward { dismiss_overlay: true } => self.hide_osd(),
            KeyRoute::Swallow | KeyRoute::Forward { dismiss_overlay: false } => {}
        }
        !route.is_consumed()
    }
}

/// Redraws `region` from the active module, or blanks it when there is none.
fn repaint_under(
    current: &mut Option<Box<dyn Module>>,
    session_id: Uuid,
    region: Rect,
    gd: &mut dyn GraphicApi,
) {
    debug!(session = %session_id, ?region, "erasing OSD");
    match current.as_deref_mut() {
        Some(module) => module.input_invalidate(region, gd),
        None => gd.draw_rect(region, BLANK_COLOR, ColorCtx::depth24()),
    }
}

impl<G: GraphicApi> Callback for ModWrapper<G> {
    fn input_scancode(&mut self, flags: KbdFlags, scancode: Scancode, event_time: u32) {
        self.keymap.event(flags, scancode);
        let route = self
            .router
            .route_scancode(flags, scancode, self.osd.kind());
        debug!(session = %self.session_id, %scancode, flags = flags.0, ?route, "scancode");
        if self.apply_key_route(route) {
            self.forward(|m, keymap, gd| m.input_scancode(flags, scancode, event_time, keymap, gd));
        }
    }

    fn input_unicode(&mut self, flags: KbdFlags, unicode: u16) {
        let route = self.router.route_unicode(self.osd.is_visible());
        if self.apply_key_route(route) {
            self.forward(|m, _, gd| m.input_unicode(flags, unicode, gd));
        }
    }

    fn input_synchronize(&mut self, flags: SyncFlags) {
        self.keymap.synchronize(flags);
        let route = self.router.route_synchronize();
        if self.apply_key_route(route) {
            self.forward(|m, _, gd| m.input_synchronize(flags, gd));
        }
    }

    fn input_mouse(&mut self, flags: MouseFlags, x: u16, y: u16) {
        if self.router.route_mouse(flags, x, y, self.osd.region()) == MouseRoute::DismissOverlay {
            debug!(session = %self.session_id, x, y, "click on OSD");
            self.hide_osd();
            return;
        }
        if self.rail.is_active() && self.rail.input_mouse(flags, x, y) {
            return;
        }
        self.forward(|m, _, gd| m.input_mouse(flags, x, y, gd));
    }

    fn input_invalidate(&mut self, rect: Rect) {
        match self.current.as_deref_mut() {
            Some(module) => module.input_invalidate(rect, &mut self.gd),
            None => self.gd.draw_rect(rect, BLANK_COLOR, ColorCtx::depth24()),
        }
        if self.rail.is_active() {
            self.rail.input_invalidate(rect);
        }
        let ctx = ColorCtx::from(self.screen.bpp);
        self.osd.paint(&mut self.gd, self.font.as_ref(), ctx, rect);
    }

    fn send_to_mod_channel(&mut self, channel: &str, data: &[u8]) {
        if let Some(module) = self.current.as_deref_mut() {
            module.send_to_mod_channel(channel, data);
        }
    }

    fn allow_display_updates(&mut self, rect: Rect) {
        self.forward(|m, _, gd| m.allow_display_updates(rect, gd));
    }

    fn suppress_display_updates(&mut self) {
        if let Some(module) = self.current.as_deref_mut() {
            module.suppress_display_updates();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
