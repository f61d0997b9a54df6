//! TOML-based configuration persistence for the session host.
//!
//! Reads and writes `SessionConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\rdproxy\session.toml`
//! - Linux:    `~/.config/rdproxy/session.toml`
//! - macOS:    `~/Library/Application Support/rdproxy/session.toml`
//!
//! # What is TOML? (for beginners)
//!
//! TOML (Tom's Obvious Minimal Language) is a configuration file format designed
//! to be easy to read and write.  Example:
//!
//! ```toml
//! [display]
//! width = 1024
//! height = 768
//! bpp = 16
//!
//! [osd]
//! hotkey = "F12"
//!
//! [target]
//! user = "alice"
//! device = "srv01"
//! session_time_limit_minutes = 30
//! ```
//!
//! # Serde default values
//!
//! Every section and field carries a `#[serde(default ...)]` attribute, so a
//! file holding only the settings an operator cares about still loads, and
//! a missing file yields a complete default configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rdproxy_core::keymap::ParseKeyError;
use rdproxy_core::{BitsPerPixel, CaptureChannels, FixedFont, Scancode, ScreenInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::keyboard_router::SessionInfo;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The OSD hotkey is not a known key name.
    #[error("invalid OSD hotkey: {0}")]
    Hotkey(#[from] ParseKeyError),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level session configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub osd: OsdConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Client display descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u16,
    #[serde(default = "default_height")]
    pub height: u16,
    /// Colour depth: 8, 15, 16, 24 or 32.
    #[serde(default = "default_bpp")]
    pub bpp: BitsPerPixel,
}

/// On-screen display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OsdConfig {
    /// Whether the help hotkey is active for modules that allow it.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Key name (`"F12"`) or hex scancode (`"0x58"`).
    #[serde(default = "default_hotkey")]
    pub hotkey: String,
    /// Cell size of the banner font, in pixels.
    #[serde(default = "default_font_width")]
    pub font_width: u32,
    #[serde(default = "default_font_height")]
    pub font_height: u32,
}

/// Who the session is for.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub device: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_time_limit_minutes: Option<u64>,
}

/// Policy rule sets whose classification selects the capture channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Rules that end the session on match.
    #[serde(default)]
    pub pattern_kill: String,
    /// Rules that only raise a notification on match.
    #[serde(default)]
    pub pattern_notify: String,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_width() -> u16 {
    800
}
fn default_height() -> u16 {
    600
}
fn default_bpp() -> BitsPerPixel {
    BitsPerPixel::Bpp24
}
fn default_true() -> bool {
    true
}
fn default_hotkey() -> String {
    "F12".to_string()
}
fn default_font_width() -> u32 {
    8
}
fn default_font_height() -> u32 {
    16
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            bpp: default_bpp(),
        }
    }
}

impl Default for OsdConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            hotkey: default_hotkey(),
            font_width: default_font_width(),
            font_height: default_font_height(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl DisplayConfig {
    pub fn screen_info(&self) -> ScreenInfo {
        ScreenInfo::new(self.width, self.height, self.bpp)
    }
}

impl OsdConfig {
    /// Parses the configured hotkey.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Hotkey`] for an unknown key name.
    pub fn hotkey_scancode(&self) -> Result<Scancode, ConfigError> {
        Ok(self.hotkey.parse::<Scancode>()?)
    }

    pub fn font(&self) -> FixedFont {
        FixedFont::new(self.font_width, self.font_height)
    }
}

impl TargetConfig {
    pub fn session_info(&self) -> SessionInfo {
        let info = SessionInfo::new(self.user.clone(), self.device.clone());
        match self.session_time_limit_minutes {
            Some(minutes) => info.with_time_limit(Duration::from_secs(minutes.saturating_mul(60))),
            None => info,
        }
    }
}

impl CaptureConfig {
    /// Monitoring channels the configured rule sets need.
    pub fn capture_channels(&self) -> CaptureChannels {
        CaptureChannels::from_rule_sets([self.pattern_kill.as_str(), self.pattern_notify.as_str()])
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("session.toml"))
}

/// Loads `SessionConfig` from the platform config file, returning defaults
/// if the file does not exist yet.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<SessionConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `SessionConfig` from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<SessionConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &SessionConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &SessionConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config directory, including the `rdproxy` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("rdproxy"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("rdproxy"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("rdproxy")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
