use serde::{Deserialize, Serialize};

use super::pass::Pass;
use crate::video::assets::material::{MaterialResolver, DEFAULT_SCHEME};

/// What a target pass starts with before running its own passes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputMode {
    /// Starts with whatever the target already holds.
    None,
    /// Merges the compiled output of the previous instance in chain first.
    Previous,
}

impl Default for InputMode {
    fn default() -> Self {
        InputMode::None
    }
}

/// An ordered list of passes that render into one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetPass {
    /// The texture definition this target pass renders into. Ignored for the output
    /// target pass of a technique.
    pub output: String,
    pub input: InputMode,
    /// Renders only once, the first time the chain is dispatched after compilation.
    pub only_initial: bool,
    pub visibility_mask: u32,
    pub lod_bias: f32,
    pub material_scheme: String,
    pub passes: Vec<Pass>,
}

impl TargetPass {
    /// Creates a target pass rendering into the local texture `output`.
    pub fn new<T: Into<String>>(output: T) -> Self {
        TargetPass {
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: InputMode) -> Self {
        self.input = input;
        self
    }

    pub fn with_pass(mut self, pass: Pass) -> Self {
        self.passes.push(pass);
        self
    }

    /// Checks if every pass could be executed.
    pub fn is_supported(&self, materials: &dyn MaterialResolver) -> bool {
        self.passes.iter().all(|v| v.is_supported(materials))
    }
}

impl Default for TargetPass {
    fn default() -> Self {
        TargetPass {
            output: String::new(),
            input: InputMode::None,
            only_initial: false,
            visibility_mask: 0xFFFF_FFFF,
            lod_bias: 1.0,
            material_scheme: DEFAULT_SCHEME.into(),
            passes: Vec::new(),
        }
    }
}
