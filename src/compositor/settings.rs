//! Functions for loading compositor settings.

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::video::assets::material::DEFAULT_SCHEME;
use crate::video::assets::render_state::{queues, RenderQueueId};

/// A structure containing configuration data for the compositor manager and the chains
/// it creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorSettings {
    /// The horizontal offset in pixels that maps texels to pixels on this backend.
    pub horizontal_texel_offset: f32,
    /// The vertical offset in pixels that maps texels to pixels on this backend.
    pub vertical_texel_offset: f32,
    /// The material scheme of the original scene.
    pub default_scheme: String,
    /// The first render queue drawn by the original scene.
    pub scene_first_queue: RenderQueueId,
    /// The last render queue drawn by the original scene.
    pub scene_last_queue: RenderQueueId,
    /// Whether techniques with substituted texture formats could be selected when no
    /// technique is supported exactly.
    pub allow_degraded_formats: bool,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        CompositorSettings {
            horizontal_texel_offset: 0.0,
            vertical_texel_offset: 0.0,
            default_scheme: DEFAULT_SCHEME.to_owned(),
            scene_first_queue: queues::SKIES_EARLY,
            scene_last_queue: queues::SKIES_LATE,
            allow_degraded_formats: true,
        }
    }
}

impl CompositorSettings {
    /// Parses settings from a JSON object. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(Error::Settings(
                "compositor settings must be a JSON object.".to_owned(),
            ));
        }

        let settings: CompositorSettings = serde_json::from_value(value)?;

        if settings.scene_first_queue > settings.scene_last_queue
            || settings.scene_last_queue > queues::MAX
        {
            return Err(Error::Settings(format!(
                "invalid scene queue range {}..={}.",
                settings.scene_first_queue, settings.scene_last_queue
            )));
        }

        Ok(settings)
    }
}
