//! Platform abstraction layer
//!
//! Browser-only glue: DOM element lookup, viewport size, host clock, and
//! copying each frame onto the page. Native builds have no platform layer.

#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::{Stage, now_ms, viewport};
