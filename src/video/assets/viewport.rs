//! Viewports are the outputs of compositor chains, each one sees the scene through a camera.

use crate::math::prelude::Vector2;
use crate::utils::color::Color;
use crate::video::assets::render_state::FrameBuffers;

impl_handle!(ViewportHandle);

/// The projection state that a viewport binds while rendering.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    aspect: f32,
    auto_aspect: bool,
    viewport: Option<Vector2<u32>>,
}

impl Camera {
    pub fn new() -> Self {
        Camera {
            aspect: 4.0 / 3.0,
            auto_aspect: true,
            viewport: None,
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    #[inline]
    pub fn set_auto_aspect(&mut self, auto: bool) {
        self.auto_aspect = auto;
    }

    /// The dimensions of the viewport this camera was bound to last.
    #[inline]
    pub fn viewport(&self) -> Option<Vector2<u32>> {
        self.viewport
    }

    /// Binds this camera to a viewport of `dimensions`, adjusting the aspect ratio if
    /// it is automatic.
    pub fn bind_viewport(&mut self, dimensions: Vector2<u32>) {
        self.viewport = Some(dimensions);
        if self.auto_aspect && dimensions.y > 0 {
            self.aspect = dimensions.x as f32 / dimensions.y as f32;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new()
    }
}

/// A rectangular region of a render target.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub dimensions: Vector2<u32>,
    pub camera: Camera,
    pub clear_buffers: FrameBuffers,
    pub background: Color,
    /// Whether the viewport clears itself before rendering each frame.
    pub clear_every_frame: bool,
    pub overlays: bool,
    /// Whether the target is refreshed by the main render loop.
    pub auto_updated: bool,
}

impl Viewport {
    pub fn new(dimensions: Vector2<u32>) -> Self {
        let mut camera = Camera::new();
        camera.bind_viewport(dimensions);

        Viewport {
            dimensions,
            camera,
            clear_buffers: FrameBuffers::color_depth(),
            background: Color::black(),
            clear_every_frame: true,
            overlays: true,
            auto_updated: true,
        }
    }

    /// Creates the viewport covering a render texture. It inherits the camera of `owner`
    /// but never clears itself, draws no overlays and is only refreshed when compositor
    /// renders into it.
    pub fn render_texture(owner: &Viewport, dimensions: Vector2<u32>) -> Self {
        Viewport {
            dimensions,
            camera: owner.camera,
            clear_buffers: FrameBuffers::none(),
            background: Color::transparent(),
            clear_every_frame: false,
            overlays: false,
            auto_updated: false,
        }
    }
}
