pub mod material;
pub mod quad;
pub mod render_state;
pub mod texture;
pub mod viewport;

pub mod prelude {
    pub use super::material::{
        Material, MaterialLibrary, MaterialPass, MaterialResolver, MaterialTechnique,
        TextureBinding, TextureUnit, UniformVariable, DEFAULT_SCHEME,
    };
    pub use super::quad::FullscreenQuad;
    pub use super::render_state::{
        queues, Comparison, FrameBuffers, RenderQueueId, StencilOperation, StencilState,
    };
    pub use super::texture::{RenderTextureFormat, RenderTextureHandle, RenderTextureParams};
    pub use super::viewport::{Camera, Viewport, ViewportHandle};
}
