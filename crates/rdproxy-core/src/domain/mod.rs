//! Domain entities shared by the session layer.
//!
//! Pure value types with no I/O: surface geometry and the client display
//! descriptor.  Everything here can be unit-tested without a display.

/// Rectangle arithmetic on the shared surface.
pub mod geometry;

/// Client display descriptor (width, height, colour depth).
pub mod screen;
