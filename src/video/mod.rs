//! The narrow interfaces that compositor consumes from the rest of renderer.
//!
//! Nothing in here draws pixels. A `Visitor` provides render textures and reports the
//! pixel formats the hardware supports, a `RenderVisitor` executes compiled operation
//! batches, and a `MaterialResolver` hands out the materials used by full-screen quads.
//! The `headless` backend implements both visitors by recording what it was asked to do.

pub mod assets;
pub mod backends;
pub mod capabilities;

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::backends::headless::{HeadlessCall, HeadlessVisitor};
    pub use super::backends::{RenderTarget, RenderVisitor, Visitor};
    pub use super::capabilities::Capabilities;
}
