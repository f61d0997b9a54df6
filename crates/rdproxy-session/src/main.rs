//! rdproxy session host: entry point.
//!
//! Runs one session wrapper headless.  Host input comes from a line-oriented
//! event script (see `infrastructure::host_script`), drawing lands in an
//! in-memory framebuffer, and the final frame can be saved as a PNG image.
//!
//! # Usage
//!
//! ```text
//! rdproxy-session [OPTIONS]
//!
//! Options:
//!   --config <PATH>      Session config file [default: platform config dir]
//!   --script <PATH>      Host event script [default: stdin]
//!   --dump <PATH>        Write the final frame as a PNG
//!   --log-level <LEVEL>  Overrides `logging.log_level` from the config
//!   --init-config        Write a default config file if none exists
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable          | Description                          |
//! |-------------------|--------------------------------------|
//! | `RDPROXY_CONFIG`  | Same as `--config`                   |
//! | `RDPROXY_SCRIPT`  | Same as `--script`                   |
//! | `RDPROXY_DUMP`    | Same as `--dump`                     |
//! | `RUST_LOG`        | Full `tracing` filter, wins over all |
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load SessionConfig          -- TOML, defaults when absent
//!  └─ ModWrapper<FrameBuffer>     -- hotkey, session info, font from config
//!  └─ event pump (current thread)
//!       ├─ ScriptReader::next_event ──▶ HostEvent::apply_with
//!       └─ Ctrl-C                   ──▶ stop
//!  └─ optional PNG dump
//! ```

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncRead;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rdproxy_session::application::mod_wrapper::ModWrapper;
use rdproxy_session::application::module::DisabledRail;
use rdproxy_session::infrastructure::front::FrameBuffer;
use rdproxy_session::infrastructure::host_script::ScriptReader;
use rdproxy_session::infrastructure::storage::config::{self, SessionConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Headless rdproxy session host.
///
/// Replays a host event script through the session wrapper.
#[derive(Debug, Parser)]
#[command(
    name = "rdproxy-session",
    about = "Headless session wrapper host for rdproxy",
    version
)]
struct Cli {
    /// Path of the TOML session config.
    ///
    /// Defaults to `session.toml` in the platform config directory.
    #[arg(long, env = "RDPROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Host event script to replay.  Reads stdin when absent.
    #[arg(long, env = "RDPROXY_SCRIPT")]
    script: Option<PathBuf>,

    /// Writes the final framebuffer to this path as a PNG.
    #[arg(long, env = "RDPROXY_DUMP")]
    dump: Option<PathBuf>,

    /// Log level, overriding the config file.  `RUST_LOG` still wins.
    #[arg(long)]
    log_level: Option<String>,

    /// Writes a default config file if none exists yet.
    #[arg(long)]
    init_config: bool,
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(config::config_file_path()?),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// The wrapper is single-threaded (`Rc`, `&mut self` everywhere), so the
/// runtime is the current-thread flavour: the event pump and the Ctrl-C
/// listener share the one thread that owns the surface.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = cli.config_path()?;
    if cli.init_config && !config_path.exists() {
        config::save_config_to(&SessionConfig::default(), &config_path)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
    }
    let cfg = config::load_config_from(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins; otherwise `--log-level`, then the config file.
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| cfg.logging.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    info!(config = %config_path.display(), "rdproxy session host starting");

    // ── Session wrapper ───────────────────────────────────────────────────────
    let screen = cfg.display.screen_info();
    let hotkey = cfg.osd.hotkey_scancode().context("reading [osd] hotkey")?;
    let mut wrapper = ModWrapper::new(
        FrameBuffer::new(screen),
        screen,
        Box::new(cfg.osd.font()),
        Rc::new(DisabledRail),
    )
    .with_hotkey(hotkey)
    .with_session_info(cfg.target.session_info());

    let channels = cfg.capture.capture_channels();
    info!(
        session = %wrapper.session_id(),
        hotkey = %wrapper.hotkey(),
        keyboard = channels.keyboard,
        screen_text = channels.screen_text,
        "session configured"
    );

    // ── Event pump ────────────────────────────────────────────────────────────
    let input: Box<dyn AsyncRead + Unpin> = match &cli.script {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening host script {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };
    let mut events = ScriptReader::new(input);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut applied = 0usize;
    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                if let Err(e) = signal {
                    warn!("failed to listen for Ctrl-C: {e}");
                }
                info!("Ctrl-C received, stopping event pump");
                break;
            }
            next = events.next_event() => match next.context("reading host script")? {
                Some(event) => {
                    event.apply_with(&mut wrapper, cfg.osd.enabled);
                    applied += 1;
                }
                None => break,
            },
        }
    }

    info!(
        session = %wrapper.session_id(),
        events = applied,
        module = %wrapper.current_mod_name(),
        osd_shown = wrapper.is_osd_shown(),
        "event pump finished"
    );

    // ── Frame dump ────────────────────────────────────────────────────────────
    if let Some(path) = &cli.dump {
        wrapper
            .graphics()
            .save_png(path)
            .with_context(|| format!("writing frame dump to {}", path.display()))?;
        info!(path = %path.display(), "frame written");
    }

    if wrapper.is_connected() {
        wrapper.disconnect();
    }
    info!("rdproxy session host stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_read_stdin_without_dump() {
        // Arrange: parse with no arguments
        let cli = Cli::parse_from(["rdproxy-session"]);

        // Assert
        assert!(cli.script.is_none());
        assert!(cli.dump.is_none());
        assert!(!cli.init_config);
    }

    #[test]
    fn test_cli_explicit_config_path_is_used() {
        let cli = Cli::parse_from(["rdproxy-session", "--config", "/tmp/s.toml"]);
        assert_eq!(cli.config_path().unwrap(), PathBuf::from("/tmp/s.toml"));
    }

    #[test]
    fn test_cli_accepts_all_options() {
        let cli = Cli::parse_from([
            "rdproxy-session",
            "--script",
            "demo.txt",
            "--dump",
            "out.png",
            "--log-level",
            "debug",
            "--init-config",
        ]);
        assert_eq!(cli.script, Some(PathBuf::from("demo.txt")));
        assert_eq!(cli.dump, Some(PathBuf::from("out.png")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.init_config);
    }
}
