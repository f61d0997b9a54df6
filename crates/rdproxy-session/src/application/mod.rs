//! Application layer of the session wrapper.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules in `rdproxy-core`) and the infrastructure (surfaces, files,
//! the host event script).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain objects to serve the user, e.g. "show the help
//!   banner while F12 is held, then let the module repaint under it".
//! - **Depends on abstractions** (`GraphicApi`, `Module`,
//!   `WindowIntegration`) rather than concrete implementations.
//! - **Contains no OS calls, no network I/O, no file system access**.
//!
//! # Sub-modules
//!
//! - **`mod_wrapper`**     – Owns the active module, the keymap and the
//!   overlay; the host front end talks only to it.
//!
//! - **`keyboard_router`** – Decides, per input event, whether it toggles the
//!   help banner, dismisses a banner, or goes to the module.
//!
//! - **`osd`**             – Lays out, draws and erases on-screen banners.
//!
//! - **`protected`**       – Drawing proxy that keeps module output off a
//!   visible banner.
//!
//! - **`module`**          – The module contract plus the referenced window
//!   integration and transport collaborators.

pub mod keyboard_router;
pub mod mod_wrapper;
pub mod module;
pub mod osd;
pub mod protected;
