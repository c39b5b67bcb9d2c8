//! The elementary steps of a target pass.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::utils::color::Color;
use crate::video::assets::material::MaterialResolver;
use crate::video::assets::render_state::{queues, FrameBuffers, RenderQueueId, StencilState};

/// A single step of a target pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pass {
    /// Clears the buffers of the target.
    Clear(ClearPass),
    /// Sets up the stencil state for the following operations.
    Stencil(StencilState),
    /// Renders a range of render queues of the scene.
    RenderScene(RenderScenePass),
    /// Draws a full-screen quad with a material.
    RenderQuad(RenderQuadPass),
}

impl Pass {
    /// Checks if this pass could be executed. Only full-screen quads could fail, when
    /// their material is missing or has no supported technique.
    pub fn is_supported(&self, materials: &dyn MaterialResolver) -> bool {
        match *self {
            Pass::RenderQuad(ref quad) => match materials.material(&quad.material) {
                Some(material) => material.num_supported_techniques() > 0,
                None => false,
            },
            _ => true,
        }
    }
}

impl Default for Pass {
    fn default() -> Self {
        Pass::RenderQuad(RenderQuadPass::default())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearPass {
    pub buffers: FrameBuffers,
    pub color: Color,
    pub depth: f32,
    pub stencil: u32,
}

impl Default for ClearPass {
    fn default() -> Self {
        ClearPass {
            buffers: FrameBuffers::color_depth(),
            color: Color::transparent(),
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// Renders the render queues in `first_queue..=last_queue`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderScenePass {
    pub first_queue: RenderQueueId,
    pub last_queue: RenderQueueId,
}

impl RenderScenePass {
    /// Creates a pass over `first..=last`. The bounds are swapped if they come in
    /// reversed order.
    pub fn new(first: RenderQueueId, last: RenderQueueId) -> Self {
        RenderScenePass {
            first_queue: first.min(last),
            last_queue: first.max(last),
        }
    }
}

impl Default for RenderScenePass {
    fn default() -> Self {
        RenderScenePass::new(queues::SKIES_EARLY, queues::SKIES_LATE)
    }
}

/// Draws a full-screen quad with the passes of a material, binding local textures to
/// its texture units.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderQuadPass {
    /// Identifies this pass to instance listeners.
    pub identifier: u32,
    pub material: String,
    /// The local texture bound to each texture unit, indexed by unit.
    pub inputs: SmallVec<[Option<String>; 4]>,
}

impl RenderQuadPass {
    pub fn new<T: Into<String>>(material: T) -> Self {
        RenderQuadPass {
            identifier: 0,
            material: material.into(),
            inputs: SmallVec::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: u32) -> Self {
        self.identifier = identifier;
        self
    }

    /// Binds the local texture named `texture` to texture unit `unit`.
    pub fn with_input<T: Into<String>>(mut self, unit: usize, texture: T) -> Self {
        self.set_input(unit, texture);
        self
    }

    pub fn set_input<T: Into<String>>(&mut self, unit: usize, texture: T) {
        while self.inputs.len() <= unit {
            self.inputs.push(None);
        }

        self.inputs[unit] = Some(texture.into());
    }

    /// Removes every input binding.
    pub fn clear_inputs(&mut self) {
        self.inputs.clear();
    }
}
