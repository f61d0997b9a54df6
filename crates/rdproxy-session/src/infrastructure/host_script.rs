//! Line-oriented host event scripts.
//!
//! The headless host replays a script instead of reading a real keyboard and
//! mouse.  Each non-empty line is one event:
//!
//! ```text
//! # comment
//! module waiting #404040       install a solid-colour module (hotkey enabled)
//! connect                      mark the session connected
//! key F12 down                 scancode press (name or 0xNN, optional "ext")
//! key F12 up                   scancode release
//! unicode A                    unicode key press (char or 0xNNNN)
//! sync num caps                lock-state synchronisation
//! mouse left-down 400 10       pointer event: action, x, y
//! invalidate 0 0 800 600       host repaint request (no args = whole screen)
//! osd warning Line 1\nLine 2   system notice; `\n` splits lines
//! layout 0x040C French         keyboard layout switch
//! disconnect                   end the session
//! ```
//!
//! # Why a script? (for beginners)
//!
//! The wrapper's behaviour is all about ordering: which draw happens before
//! which input reaches the module.  A script makes a whole session
//! reproducible, and the final framebuffer can be dumped and compared.

use rdproxy_core::gdi::ParseUrgencyError;
use rdproxy_core::keymap::{is_extended_key, ParseKeyError};
use rdproxy_core::{
    GraphicApi, KbdFlags, KeyLayout, OsdMsgUrgency, Rect, RgbColor, Scancode, SyncFlags,
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::debug;

use crate::application::mod_wrapper::ModWrapper;
use crate::application::module::{ModPack, ModuleName, MouseFlags, ParseModuleNameError, SolidMod};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error returned when a script line is not a valid event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("{command}: missing {what}")]
    Missing {
        command: &'static str,
        what: &'static str,
    },

    #[error("{command}: invalid argument {value:?}")]
    Invalid {
        command: &'static str,
        value: String,
    },

    #[error(transparent)]
    Key(#[from] ParseKeyError),

    #[error(transparent)]
    Urgency(#[from] ParseUrgencyError),

    #[error(transparent)]
    Module(#[from] ParseModuleNameError),
}

/// Error returned by [`ScriptReader::next_event`].
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read host script: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseEventError,
    },
}

// ── Events ────────────────────────────────────────────────────────────────────

/// One host-side event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Key { flags: KbdFlags, scancode: Scancode },
    Unicode { flags: KbdFlags, unicode: u16 },
    Sync(SyncFlags),
    Mouse { flags: MouseFlags, x: u16, y: u16 },
    /// `None` repaints the whole screen.
    Invalidate(Option<Rect>),
    Osd { urgency: OsdMsgUrgency, text: String },
    Module { name: ModuleName, color: RgbColor },
    Connect,
    Disconnect,
    Layout(KeyLayout),
}

/// Parses one script line.  Blank lines and `#` comments yield `Ok(None)`.
///
/// # Errors
///
/// Returns a [`ParseEventError`] describing the first bad token.
pub fn parse_line(line: &str) -> Result<Option<HostEvent>, ParseEventError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim_start()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let event = match command {
        "key" => {
            let scancode: Scancode = args
                .next()
                .ok_or(ParseEventError::Missing {
                    command: "key",
                    what: "key name",
                })?
                .parse()?;
            let mut flags = if is_extended_key(scancode) {
                KbdFlags::empty().with(KbdFlags::EXTENDED)
            } else {
                KbdFlags::empty()
            };
            for arg in args {
                flags = match arg {
                    "down" => flags,
                    "up" => flags.with(KbdFlags::RELEASE),
                    "ext" => flags.with(KbdFlags::EXTENDED),
                    other => return Err(invalid("key", other)),
                };
            }
            HostEvent::Key { flags, scancode }
        }
        "unicode" => {
            let arg = args.next().ok_or(ParseEventError::Missing {
                command: "unicode",
                what: "character",
            })?;
            let unicode = parse_unicode(arg).ok_or_else(|| invalid("unicode", arg))?;
            let flags = match args.next() {
                None | Some("down") => KbdFlags::empty(),
                Some("up") => KbdFlags::release(),
                Some(other) => return Err(invalid("unicode", other)),
            };
            HostEvent::Unicode { flags, unicode }
        }
        "sync" => {
            let mut bits = 0;
            for arg in args {
                bits |= match arg {
                    "scroll" => SyncFlags::SCROLL_LOCK,
                    "num" => SyncFlags::NUM_LOCK,
                    "caps" => SyncFlags::CAPS_LOCK,
                    "kana" => SyncFlags::KANA_LOCK,
                    other => return Err(invalid("sync", other)),
                };
            }
            HostEvent::Sync(SyncFlags(bits))
        }
        "mouse" => {
            let action = args.next().ok_or(ParseEventError::Missing {
                command: "mouse",
                what: "action",
            })?;
            let flags = parse_mouse_action(action).ok_or_else(|| invalid("mouse", action))?;
            let x = parse_number(args.next(), "mouse", "x")?;
            let y = parse_number(args.next(), "mouse", "y")?;
            HostEvent::Mouse { flags, x, y }
        }
        "invalidate" => {
            if rest.is_empty() {
                HostEvent::Invalidate(None)
            } else {
                let x: i32 = parse_number(args.next(), "invalidate", "x")?;
                let y: i32 = parse_number(args.next(), "invalidate", "y")?;
                let w: u32 = parse_number(args.next(), "invalidate", "width")?;
                let h: u32 = parse_number(args.next(), "invalidate", "height")?;
                HostEvent::Invalidate(Some(Rect::new(x, y, w, h)))
            }
        }
        "osd" => {
            let (urgency, text) = match rest.split_once(char::is_whitespace) {
                Some((urgency, text)) => (urgency, text.trim_start()),
                None => (rest, ""),
            };
            if urgency.is_empty() {
                return Err(ParseEventError::Missing {
                    command: "osd",
                    what: "urgency",
                });
            }
            HostEvent::Osd {
                urgency: urgency.parse()?,
                text: text.replace("\\n", "\n"),
            }
        }
        "module" => {
            let name: ModuleName = args
                .next()
                .ok_or(ParseEventError::Missing {
                    command: "module",
                    what: "name",
                })?
                .parse()?;
            let color = match args.next() {
                Some(arg) => parse_color(arg).ok_or_else(|| invalid("module", arg))?,
                None => RgbColor::BLACK,
            };
            HostEvent::Module { name, color }
        }
        "connect" => HostEvent::Connect,
        "disconnect" => HostEvent::Disconnect,
        "layout" => {
            let arg = args.next().ok_or(ParseEventError::Missing {
                command: "layout",
                what: "layout id",
            })?;
            let id = parse_hex(arg)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| invalid("layout", arg))?;
            let name = args.collect::<Vec<_>>().join(" ");
            HostEvent::Layout(KeyLayout::new(id, name))
        }
        other => return Err(ParseEventError::UnknownCommand(other.to_string())),
    };
    Ok(Some(event))
}

fn invalid(command: &'static str, value: &str) -> ParseEventError {
    ParseEventError::Invalid {
        command,
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(
    arg: Option<&str>,
    command: &'static str,
    what: &'static str,
) -> Result<T, ParseEventError> {
    let arg = arg.ok_or(ParseEventError::Missing { command, what })?;
    arg.parse().map_err(|_| invalid(command, arg))
}

fn parse_hex(s: &str) -> Option<u64> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u64::from_str_radix(hex, 16).ok()
}

/// A single BMP character or a `0xNNNN` code unit.
fn parse_unicode(s: &str) -> Option<u16> {
    if let Some(v) = parse_hex(s) {
        return u16::try_from(v).ok();
    }
    let mut chars = s.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    u16::try_from(u32::from(ch)).ok()
}

/// `#RRGGBB` or `0xRRGGBB`.
fn parse_color(s: &str) -> Option<RgbColor> {
    let v = match s.strip_prefix('#') {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => parse_hex(s)?,
    };
    (v <= 0xFF_FF_FF).then(|| RgbColor(v as u32))
}

fn parse_mouse_action(action: &str) -> Option<MouseFlags> {
    let bits = match action {
        "move" => MouseFlags::MOVE,
        "wheel" => MouseFlags::WHEEL,
        "left-down" => MouseFlags::BUTTON1 | MouseFlags::DOWN,
        "left-up" => MouseFlags::BUTTON1,
        "right-down" => MouseFlags::BUTTON2 | MouseFlags::DOWN,
        "right-up" => MouseFlags::BUTTON2,
        "middle-down" => MouseFlags::BUTTON3 | MouseFlags::DOWN,
        "middle-up" => MouseFlags::BUTTON3,
        _ => return None,
    };
    Some(MouseFlags(bits))
}

impl HostEvent {
    /// Delivers the event to `wrapper` with the help hotkey enabled for
    /// installed modules.
    pub fn apply<G: GraphicApi>(self, wrapper: &mut ModWrapper<G>) {
        self.apply_with(wrapper, true);
    }

    /// Delivers the event to `wrapper`.
    ///
    /// Input events go through the wrapper's callback surface, exactly as a
    /// live front end would deliver them.  `module` installs a [`SolidMod`]
    /// (hotkey active when `enable_osd` is set) and repaints the whole screen
    /// through it.
    pub fn apply_with<G: GraphicApi>(self, wrapper: &mut ModWrapper<G>, enable_osd: bool) {
        match self {
            HostEvent::Key { flags, scancode } => {
                wrapper.get_callback().input_scancode(flags, scancode, 0)
            }
            HostEvent::Unicode { flags, unicode } => {
                wrapper.get_callback().input_unicode(flags, unicode)
            }
            HostEvent::Sync(flags) => wrapper.get_callback().input_synchronize(flags),
            HostEvent::Mouse { flags, x, y } => wrapper.get_callback().input_mouse(flags, x, y),
            HostEvent::Invalidate(rect) => {
                let rect = rect.unwrap_or_else(|| wrapper.screen_info().rect());
                wrapper.get_callback().input_invalidate(rect);
            }
            HostEvent::Osd { urgency, text } => wrapper.display_osd_message(&text, urgency),
            HostEvent::Module { name, color } => {
                let connected = matches!(name, ModuleName::Rdp | ModuleName::Vnc);
                let pack = ModPack::new(Box::new(SolidMod::new(color)))
                    .with_osd(enable_osd)
                    .with_connected(connected);
                wrapper.set_mod(name, pack);
                let screen = wrapper.screen_info().rect();
                wrapper.get_callback().input_invalidate(screen);
            }
            HostEvent::Connect => wrapper.set_connected(true),
            HostEvent::Disconnect => wrapper.disconnect(),
            HostEvent::Layout(layout) => wrapper.set_keyboard_layout(layout),
        }
    }
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Reads [`HostEvent`]s from an async byte stream (file, stdin, socket).
pub struct ScriptReader<R> {
    lines: Lines<BufReader<R>>,
    line_no: usize,
}

impl<R: AsyncRead + Unpin> ScriptReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_no: 0,
        }
    }

    /// Returns the next event, skipping blank and comment lines.
    /// `Ok(None)` means end of script.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Io`] on read failure and [`ScriptError::Parse`]
    /// with the 1-based line number for a malformed line.
    pub async fn next_event(&mut self) -> Result<Option<HostEvent>, ScriptError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            match parse_line(&line) {
                Ok(Some(event)) => {
                    debug!(line = self.line_no, ?event, "host event");
                    return Ok(Some(event));
                }
                Ok(None) => continue,
                Err(source) => {
                    return Err(ScriptError::Parse {
                        line: self.line_no,
                        source,
                    })
                }
            }
        }
        Ok(None)
    }

    /// Number of lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
