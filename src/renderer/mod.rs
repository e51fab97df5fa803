//! Canvas2D rendering module
//!
//! Geometry and the starfield are plain Rust; only the canvas pass needs a
//! browser.

pub mod shapes;
pub mod starfield;

#[cfg(target_arch = "wasm32")]
mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use starfield::Starfield;
