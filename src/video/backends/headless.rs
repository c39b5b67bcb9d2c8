use super::{RenderTarget, RenderVisitor, Visitor};

use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::utils::color::Color;
use crate::utils::object_pool::ObjectPool;
use crate::video::assets::prelude::*;
use crate::video::capabilities::Capabilities;

/// Everything a `HeadlessVisitor` has been asked to render, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessCall {
    Bind(RenderTarget),
    UpdateVisibility(u32, f32, String),
    FindVisibleObjects,
    RenderQueue(RenderQueueId),
    Clear(FrameBuffers),
    UpdateStencil(StencilState),
    /// The pass name and the render textures bound to its texture units.
    DrawQuad(String, Vec<Option<RenderTextureHandle>>),
}

/// A backend without any video device. It keeps track of render textures and records
/// render calls, which makes it suitable for servers and tests.
pub struct HeadlessVisitor {
    capabilities: Capabilities,
    render_textures: ObjectPool<RenderTextureHandle, (String, RenderTextureParams)>,
    budget: Option<usize>,
    calls: Vec<HeadlessCall>,
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor::with_capabilities(Capabilities::all())
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        HeadlessVisitor {
            capabilities,
            render_textures: ObjectPool::new(),
            budget: None,
            calls: Vec::new(),
        }
    }

    /// Limits the number of live render textures, creations beyond it fail like an
    /// exhausted video memory would.
    pub fn set_budget(&mut self, budget: Option<usize>) {
        self.budget = budget;
    }

    /// Gets the number of live render textures.
    #[inline]
    pub fn len(&self) -> usize {
        self.render_textures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.render_textures.is_empty()
    }

    /// Finds a live render texture by the name it was created with.
    pub fn find(&self, name: &str) -> Option<RenderTextureHandle> {
        self.render_textures
            .keys()
            .find(|&handle| match self.render_textures.get(handle) {
                Some(v) => v.0 == name,
                None => false,
            })
    }

    #[inline]
    pub fn calls(&self) -> &[HeadlessCall] {
        &self.calls
    }

    /// Takes the recorded calls, leaving the record empty.
    pub fn drain_calls(&mut self) -> Vec<HeadlessCall> {
        ::std::mem::replace(&mut self.calls, Vec::new())
    }
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl Visitor for HeadlessVisitor {
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_render_texture(
        &mut self,
        name: &str,
        params: RenderTextureParams,
    ) -> Result<RenderTextureHandle> {
        if let Some(budget) = self.budget {
            if self.render_textures.len() >= budget {
                return Err(Error::Backend(format!(
                    "out of video memory while creating render texture '{}'.",
                    name
                )));
            }
        }

        if !self.capabilities.has_render_texture_format(params.format) {
            return Err(Error::Backend(format!(
                "render texture format {:?} is not supported.",
                params.format
            )));
        }

        Ok(self.render_textures.create((name.to_owned(), params)))
    }

    fn delete_render_texture(&mut self, handle: RenderTextureHandle) -> Result<()> {
        self.render_textures
            .free(handle)
            .map(|_| ())
            .ok_or_else(|| Error::RenderTextureHandleInvalid(handle))
    }

    fn render_texture(&self, handle: RenderTextureHandle) -> Option<RenderTextureParams> {
        self.render_textures.get(handle).map(|v| v.1)
    }
}

impl RenderVisitor for HeadlessVisitor {
    fn bind(&mut self, target: RenderTarget, _: Vector2<u32>) -> Result<()> {
        self.calls.push(HeadlessCall::Bind(target));
        Ok(())
    }

    fn update_visibility(&mut self, mask: u32, lod_bias: f32, scheme: &str) -> Result<()> {
        self.calls
            .push(HeadlessCall::UpdateVisibility(mask, lod_bias, scheme.to_owned()));
        Ok(())
    }

    fn find_visible_objects(&mut self) -> Result<()> {
        self.calls.push(HeadlessCall::FindVisibleObjects);
        Ok(())
    }

    fn render_queue(&mut self, queue: RenderQueueId) -> Result<()> {
        self.calls.push(HeadlessCall::RenderQueue(queue));
        Ok(())
    }

    fn clear(&mut self, buffers: FrameBuffers, _: Color, _: f32, _: u32) -> Result<()> {
        self.calls.push(HeadlessCall::Clear(buffers));
        Ok(())
    }

    fn update_stencil(&mut self, state: &StencilState) -> Result<()> {
        self.calls.push(HeadlessCall::UpdateStencil(*state));
        Ok(())
    }

    fn draw_quad(&mut self, _: &FullscreenQuad, _: Vector2<u32>, pass: &MaterialPass) -> Result<()> {
        let textures = pass
            .texture_units
            .iter()
            .map(|v| v.render_texture())
            .collect();

        self.calls
            .push(HeadlessCall::DrawQuad(pass.name.clone(), textures));
        Ok(())
    }
}
