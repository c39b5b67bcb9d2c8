//! Render textures. A render texture is a texture object with special format, it can be
//! used as the target of operation batches and sampled later by full-screen quads.

use serde::{Deserialize, Serialize};

use crate::math::prelude::Vector2;

impl_handle!(RenderTextureHandle);

/// The parameters of a render texture object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderTextureParams {
    pub format: RenderTextureFormat,
    pub dimensions: Vector2<u32>,
    /// Could this texture be the source of a texture access from a shader.
    pub sampler: bool,
}

impl Default for RenderTextureParams {
    fn default() -> Self {
        RenderTextureParams {
            format: RenderTextureFormat::RGBA8,
            dimensions: Vector2::new(0, 0),
            sampler: true,
        }
    }
}

/// List of all the possible formats of renderable texture which could be use as
/// attachment of framebuffer.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum RenderTextureFormat {
    RGB8,
    RGBA4,
    RGBA8,
    RGB10A2,
    R16F,
    R32F,
    RGBA16F,
    RGBA32F,
    Depth16,
    Depth24,
    Depth32,
    Depth24Stencil8,
}

impl RenderTextureFormat {
    pub fn is_color(self) -> bool {
        !self.is_depth()
    }

    pub fn is_depth(self) -> bool {
        match self {
            RenderTextureFormat::Depth16
            | RenderTextureFormat::Depth24
            | RenderTextureFormat::Depth32
            | RenderTextureFormat::Depth24Stencil8 => true,
            _ => false,
        }
    }

    /// Returns the number of bits a pixel of this format occupies.
    pub fn bits(self) -> u32 {
        match self {
            RenderTextureFormat::RGBA4 | RenderTextureFormat::R16F => 16,
            RenderTextureFormat::Depth16 => 16,
            RenderTextureFormat::RGB8 | RenderTextureFormat::Depth24 => 24,
            RenderTextureFormat::RGBA8
            | RenderTextureFormat::RGB10A2
            | RenderTextureFormat::R32F => 32,
            RenderTextureFormat::Depth32 | RenderTextureFormat::Depth24Stencil8 => 32,
            RenderTextureFormat::RGBA16F => 64,
            RenderTextureFormat::RGBA32F => 128,
        }
    }

    /// Returns the size in bytes of a texture with this format.
    pub fn size(self, dimensions: Vector2<u32>) -> u32 {
        self.bits() / 8 * dimensions.x * dimensions.y
    }
}
