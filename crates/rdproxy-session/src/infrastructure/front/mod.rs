//! Host front ends: surfaces the session draws on.
//!
//! Only the headless [`framebuffer::FrameBuffer`] lives here.  A real RDP
//! front encodes the same `GraphicApi` calls as drawing orders for the
//! client; nothing above this module can tell the difference.

pub mod framebuffer;

pub use framebuffer::FrameBuffer;
