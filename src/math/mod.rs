//! This module contains the math utils that mainly comes from `cgmath`.

pub use cgmath::*;

pub mod prelude {
    pub use cgmath::Vector2;
}
