//! Compositors are post-processing effects applied to viewports.
//!
//! A `Compositor` is a named list of `Technique`s. Each technique declares the local
//! render textures it needs, the `TargetPass`es that render into them, and one output
//! target pass that renders into whatever follows it. Adding a compositor to a viewport
//! picks the first technique the backend supports and creates a `CompositorInstance` of
//! it in the `CompositorChain` of that viewport.
//!
//! Chains are compiled lazily into `TargetOperation` batches. Each batch is a list of
//! `Operation`s tagged with the render queue they must run before, plus the set of
//! render queues of scene it draws.

pub mod chain;
pub mod compositor;
pub mod diagnostics;
pub mod instance;
pub mod manager;
pub mod operation;
pub mod pass;
pub mod settings;
pub mod target_pass;
pub mod technique;

pub mod prelude {
    pub use super::chain::{CompositorChain, SCENE_COMPOSITOR};
    pub use super::compositor::Compositor;
    pub use super::diagnostics::CompileWarning;
    pub use super::instance::{
        CompositorInstance, InstanceId, InstanceIdGenerator, InstanceListener, ListenerHandle,
        LocalTexture,
    };
    pub use super::manager::CompositorManager;
    pub use super::operation::{Operation, QuadOperation, RenderQueueSet, TargetOperation};
    pub use super::pass::{ClearPass, Pass, RenderQuadPass, RenderScenePass};
    pub use super::settings::CompositorSettings;
    pub use super::target_pass::{InputMode, TargetPass};
    pub use super::technique::{Technique, TextureDefinition};
}
