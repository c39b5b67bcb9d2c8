use serde::{Deserialize, Serialize};

use super::target_pass::TargetPass;
use crate::video::assets::material::MaterialResolver;
use crate::video::assets::texture::RenderTextureFormat;
use crate::video::capabilities::Capabilities;

/// Describes a render texture that instances of a technique allocate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDefinition {
    pub name: String,
    /// Zero means the width of the viewport.
    pub width: u32,
    /// Zero means the height of the viewport.
    pub height: u32,
    pub format: RenderTextureFormat,
}

impl TextureDefinition {
    /// A definition that follows the size of viewport.
    pub fn new<T: Into<String>>(name: T, format: RenderTextureFormat) -> Self {
        TextureDefinition {
            name: name.into(),
            width: 0,
            height: 0,
            format,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// One way of realizing a compositor: the local textures it needs, the target passes
/// that render into them, and the output target pass that renders into the viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Technique {
    pub textures: Vec<TextureDefinition>,
    pub targets: Vec<TargetPass>,
    pub output: TargetPass,
}

impl Technique {
    pub fn new() -> Self {
        Technique::default()
    }

    pub fn with_texture(mut self, texture: TextureDefinition) -> Self {
        self.textures.push(texture);
        self
    }

    pub fn with_target(mut self, target: TargetPass) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_output(mut self, output: TargetPass) -> Self {
        self.output = output;
        self
    }

    pub fn texture_definition(&self, name: &str) -> Option<&TextureDefinition> {
        self.textures.iter().find(|v| v.name == name)
    }

    /// Checks if this technique could be rendered with the current backend.
    ///
    /// Every pass must be executable, and every texture definition must be available
    /// in its exact format. With `allow_degraded_format`, a supported format of the
    /// same kind with at least as many bits per pixel is accepted as well.
    pub fn is_supported(
        &self,
        capabilities: &Capabilities,
        materials: &dyn MaterialResolver,
        allow_degraded_format: bool,
    ) -> bool {
        if !self.output.is_supported(materials) {
            return false;
        }

        if !self.targets.iter().all(|v| v.is_supported(materials)) {
            return false;
        }

        self.textures.iter().all(|v| {
            if allow_degraded_format {
                capabilities.is_equivalent_format_supported(v.format)
            } else {
                capabilities.has_render_texture_format(v.format)
            }
        })
    }
}
