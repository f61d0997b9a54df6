//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate directory.
//! - Writing a configuration back to disk (used to seed a first config file).
//! - Providing sensible defaults when the file does not exist yet (first run).
//!
//! Keeping storage concerns here means the file format can change without
//! touching the application layer.

pub mod config;
