//! Infrastructure layer for the session host.
//!
//! Contains the adapters around the wrapper: the in-memory display surface,
//! file-system storage for the configuration, and the host event script
//! reader that stands in for a live keyboard and mouse.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `rdproxy_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod front;
pub mod host_script;
pub mod storage;
