//! The backend of renderer, as far as compositor is concerned it is responsible for two
//! things: providing render textures and executing compiled operation batches.

pub mod headless;

use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::utils::color::Color;
use crate::video::assets::prelude::*;
use crate::video::capabilities::Capabilities;

/// Provides the render textures that compositor instances render into.
pub trait Visitor {
    fn capabilities(&self) -> &Capabilities;

    /// Creates a render texture object named `name`. The texture is never refreshed by
    /// the main render loop.
    fn create_render_texture(
        &mut self,
        name: &str,
        params: RenderTextureParams,
    ) -> Result<RenderTextureHandle>;

    fn delete_render_texture(&mut self, handle: RenderTextureHandle) -> Result<()>;

    /// Gets the parameters of a live render texture.
    fn render_texture(&self, handle: RenderTextureHandle) -> Option<RenderTextureParams>;
}

/// The surface that an operation batch renders into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The viewport that owns the compositor chain.
    Output,
    Texture(RenderTextureHandle),
}

/// Executes compiled operation batches.
///
/// For every batch, compositor calls `bind` and `update_visibility` once, then
/// `find_visible_objects` if the batch renders any scene geometry, and finally drains the
/// requested render queues in increasing order, interleaving the queued operations.
pub trait RenderVisitor {
    fn bind(&mut self, target: RenderTarget, dimensions: Vector2<u32>) -> Result<()>;

    fn update_visibility(&mut self, mask: u32, lod_bias: f32, scheme: &str) -> Result<()>;

    fn find_visible_objects(&mut self) -> Result<()>;

    fn render_queue(&mut self, queue: RenderQueueId) -> Result<()>;

    fn clear(&mut self, buffers: FrameBuffers, color: Color, depth: f32, stencil: u32)
        -> Result<()>;

    fn update_stencil(&mut self, state: &StencilState) -> Result<()>;

    /// Draws the full-screen quad with one pass of a material.
    fn draw_quad(
        &mut self,
        quad: &FullscreenQuad,
        dimensions: Vector2<u32>,
        pass: &MaterialPass,
    ) -> Result<()>;
}

pub fn new_headless() -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new())
}
