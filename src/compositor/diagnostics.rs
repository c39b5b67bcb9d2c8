//! Soft failures found while compiling a chain. Each one is logged once when it is
//! found, and kept with the chain until the next compilation.

use std::fmt;

use crate::video::assets::render_state::RenderQueueId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// A scene pass asked for queues that have already been passed in the same target.
    QueueOrder {
        compositor: String,
        requested: RenderQueueId,
        current: RenderQueueId,
    },
    /// A scene pass with its first queue after its last one. The bounds are swapped.
    ReversedQueueRange {
        compositor: String,
        first: RenderQueueId,
        last: RenderQueueId,
    },
    MissingMaterial {
        compositor: String,
        pass_id: u32,
        material: String,
    },
    NoSupportedMaterialTechnique {
        compositor: String,
        pass_id: u32,
        material: String,
    },
    /// A quad input was bound to a texture unit the material pass does not have.
    TextureUnitOutOfBounds {
        compositor: String,
        material: String,
        unit: usize,
    },
    /// A quad input names a texture the technique does not define.
    UnknownInput {
        compositor: String,
        pass_id: u32,
        input: String,
    },
}

impl CompileWarning {
    /// The compositor whose technique caused this warning.
    pub fn compositor(&self) -> &str {
        match *self {
            CompileWarning::QueueOrder { ref compositor, .. }
            | CompileWarning::ReversedQueueRange { ref compositor, .. }
            | CompileWarning::MissingMaterial { ref compositor, .. }
            | CompileWarning::NoSupportedMaterialTechnique { ref compositor, .. }
            | CompileWarning::TextureUnitOutOfBounds { ref compositor, .. }
            | CompileWarning::UnknownInput { ref compositor, .. } => compositor,
        }
    }
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CompileWarning::QueueOrder {
                ref compositor,
                requested,
                current,
            } => write!(
                f,
                "[{}] Render queue {} is requested after queue {} has been rendered, \
                 the scene could be rendered out of order.",
                compositor, requested, current
            ),
            CompileWarning::ReversedQueueRange {
                ref compositor,
                first,
                last,
            } => write!(
                f,
                "[{}] Render queue range {}..={} is reversed, queues {}..={} are rendered \
                 instead.",
                compositor, first, last, last, first
            ),
            CompileWarning::MissingMaterial {
                ref compositor,
                pass_id,
                ref material,
            } => write!(
                f,
                "[{}] Material '{}' of quad pass {} does not exist, the pass is skipped.",
                compositor, material, pass_id
            ),
            CompileWarning::NoSupportedMaterialTechnique {
                ref compositor,
                pass_id,
                ref material,
            } => write!(
                f,
                "[{}] Material '{}' of quad pass {} has no supported technique, the pass is \
                 skipped.",
                compositor, material, pass_id
            ),
            CompileWarning::TextureUnitOutOfBounds {
                ref compositor,
                ref material,
                unit,
            } => write!(
                f,
                "[{}] Texture unit {} is out of bounds of material '{}', the input is skipped.",
                compositor, unit, material
            ),
            CompileWarning::UnknownInput {
                ref compositor,
                pass_id,
                ref input,
            } => write!(
                f,
                "[{}] Input '{}' of quad pass {} is not a local texture, the input is skipped.",
                compositor, input, pass_id
            ),
        }
    }
}

/// Logs `warning` and keeps it with the others found during the same compilation.
pub(crate) fn report(warnings: &mut Vec<CompileWarning>, warning: CompileWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}
