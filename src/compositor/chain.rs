//! An ordered list of compositor instances applied to one viewport.
//!
//! The chain keeps the previous-instance links of its instances in sync with their
//! positions, and recompiles itself into a list of operation batches lazily when it is
//! rendered after any structural change. Compilation starts from the last instance, which
//! recursively pulls in the targets of all the instances in front of it before its own,
//! and finally merges its output pass into the batch that renders into the viewport.

use std::sync::Arc;

use super::diagnostics::CompileWarning;
use super::instance::{CompileContext, CompositorInstance, InstanceId, InstanceIdGenerator};
use super::operation::{Operation, TargetOperation};
use super::pass::{ClearPass, Pass, RenderScenePass};
use super::settings::CompositorSettings;
use super::target_pass::TargetPass;
use super::technique::Technique;
use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::video::assets::prelude::*;
use crate::video::backends::{RenderTarget, RenderVisitor, Visitor};

/// The name of the compositor that renders the original scene.
pub const SCENE_COMPOSITOR: &str = "Scene";

/// Creates the technique of original scene: clears the viewport and renders the scene
/// queues in `first..=last`.
pub fn scene_technique(
    viewport: &Viewport,
    scheme: &str,
    first: RenderQueueId,
    last: RenderQueueId,
) -> Technique {
    let clear = ClearPass {
        buffers: viewport.clear_buffers,
        color: viewport.background,
        ..Default::default()
    };

    let mut output = TargetPass::default();
    output.material_scheme = scheme.to_owned();
    output.passes.push(Pass::Clear(clear));
    output.passes.push(Pass::RenderScene(RenderScenePass::new(first, last)));
    Technique::new().with_output(output)
}

pub struct CompositorChain {
    quad: Arc<FullscreenQuad>,
    scheme: String,
    scene_queues: (RenderQueueId, RenderQueueId),
    scene: CompositorInstance,
    instances: Vec<CompositorInstance>,
    ids: InstanceIdGenerator,
    dirty: bool,
    generation: u64,
    operations: Vec<TargetOperation>,
    output: Option<TargetOperation>,
    warnings: Vec<CompileWarning>,
}

impl CompositorChain {
    pub fn new(quad: Arc<FullscreenQuad>, settings: &CompositorSettings) -> Self {
        CompositorChain::with_ids(quad, settings, InstanceIdGenerator::new())
    }

    /// Creates a chain that takes instance ids from `ids`. Chains sharing a generator
    /// never create render textures or materials with the same name.
    pub fn with_ids(
        quad: Arc<FullscreenQuad>,
        settings: &CompositorSettings,
        ids: InstanceIdGenerator,
    ) -> Self {
        let mut scene = CompositorInstance::new(
            InstanceId(0),
            SCENE_COMPOSITOR.to_owned(),
            Arc::new(Technique::new()),
        );

        // The original scene owns no textures, enabling it never touches the backend.
        scene.enable_without_resources();

        CompositorChain {
            quad,
            scheme: settings.default_scheme.clone(),
            scene_queues: (settings.scene_first_queue, settings.scene_last_queue),
            scene,
            instances: Vec::new(),
            ids,
            dirty: true,
            generation: 0,
            operations: Vec::new(),
            output: None,
            warnings: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[inline]
    pub fn instances(&self) -> &[CompositorInstance] {
        &self.instances
    }

    #[inline]
    pub fn instance(&self, position: usize) -> Option<&CompositorInstance> {
        self.instances.get(position)
    }

    #[inline]
    pub fn instance_mut(&mut self, position: usize) -> Option<&mut CompositorInstance> {
        self.instances.get_mut(position)
    }

    /// The hidden instance that renders the original scene in front of all the others.
    #[inline]
    pub fn scene(&self) -> &CompositorInstance {
        &self.scene
    }

    /// Finds the position of the first instance created from compositor `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.instances.iter().position(|v| v.compositor() == name)
    }

    /// Inserts a disabled instance of `technique` at `position`, or at the end of chain
    /// if `position` is `None`. Returns the position it was inserted at.
    pub fn insert(
        &mut self,
        position: Option<usize>,
        compositor: &str,
        technique: Arc<Technique>,
    ) -> Result<usize> {
        let position = position.unwrap_or_else(|| self.instances.len());
        if position > self.instances.len() {
            return Err(Error::OutOfBounds(position));
        }

        let id = self.ids.next();

        let instance = CompositorInstance::new(id, compositor.to_owned(), technique);
        self.instances.insert(position, instance);
        self.relink();
        Ok(position)
    }

    /// Removes the instance at `position`, releasing its textures.
    pub fn remove(&mut self, position: usize, visitor: &mut dyn Visitor) -> Result<()> {
        if position >= self.instances.len() {
            return Err(Error::OutOfBounds(position));
        }

        let mut instance = self.instances.remove(position);
        instance.free_resources(visitor);
        self.relink();
        Ok(())
    }

    /// Removes every instance, releasing their textures.
    pub fn clear(&mut self, visitor: &mut dyn Visitor) {
        for mut v in self.instances.drain(..) {
            v.free_resources(visitor);
        }

        self.relink();
    }

    /// Enables or disables the instance at `position`. Enabling an enabled instance
    /// rebuilds its textures.
    pub fn set_enabled(
        &mut self,
        position: usize,
        enabled: bool,
        visitor: &mut dyn Visitor,
        viewport: &Viewport,
    ) -> Result<()> {
        let instance = self
            .instances
            .get_mut(position)
            .ok_or_else(|| Error::OutOfBounds(position))?;

        self.dirty = true;
        instance.set_enabled(enabled, visitor, viewport)
    }

    /// Rebuilds the textures of every enabled instance after the viewport has been
    /// resized.
    pub fn notify_viewport_resized(
        &mut self,
        visitor: &mut dyn Visitor,
        viewport: &Viewport,
    ) -> Result<()> {
        self.dirty = true;

        for v in &mut self.instances {
            if v.is_enabled() {
                v.create_resources(visitor, viewport)?;
            }
        }

        Ok(())
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// The number of compilations so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The intermediate batches of the last compilation, in execution order.
    #[inline]
    pub fn operations(&self) -> &[TargetOperation] {
        &self.operations
    }

    /// The batch that renders into the viewport.
    #[inline]
    pub fn output_operation(&self) -> Option<&TargetOperation> {
        self.output.as_ref()
    }

    /// The soft failures found during the last compilation.
    #[inline]
    pub fn warnings(&self) -> &[CompileWarning] {
        &self.warnings
    }

    /// Recompiles the chain into operation batches, discarding the ones of the last
    /// compilation first.
    pub fn compile(&mut self, viewport: &Viewport, materials: &dyn MaterialResolver) -> Result<()> {
        self.generation += 1;
        self.warnings.clear();
        self.operations.clear();
        self.output = None;

        let (first, last) = self.scene_queues;
        let technique = scene_technique(viewport, &self.scheme, first, last);
        self.scene.set_technique(Arc::new(technique));
        self.scene.prepare_for_compilation();
        for v in &mut self.instances {
            v.prepare_for_compilation();
        }

        let mut ctx = CompileContext {
            materials,
            quad: &self.quad,
            generation: self.generation,
            warnings: &mut self.warnings,
        };

        let mut output = TargetOperation::new(RenderTarget::Output, viewport.dimensions);
        match self.instances.split_last_mut() {
            Some((last, before)) => {
                last.compile_target_operations(
                    before,
                    Some(&mut self.scene),
                    &mut ctx,
                    &mut self.operations,
                )?;

                last.compile_output_operation(before, Some(&mut self.scene), &mut ctx, &mut output)?;
            }
            None => {
                self.scene
                    .compile_output_operation(&mut [], None, &mut ctx, &mut output)?;
            }
        }

        debug!(
            "Compiles compositor chain (generation {}) into {} batches with {} warnings.",
            self.generation,
            self.operations.len() + 1,
            self.warnings.len()
        );

        self.output = Some(output);
        self.dirty = false;
        Ok(())
    }

    /// Executes the compiled batches against `renderer`, recompiling first if anything
    /// changed since the last compilation.
    pub fn render(
        &mut self,
        viewport: &Viewport,
        materials: &dyn MaterialResolver,
        renderer: &mut dyn RenderVisitor,
    ) -> Result<()> {
        if self.dirty {
            self.compile(viewport, materials)?;
        }

        let instances = &mut self.instances;
        let scene = &mut self.scene;
        for batch in self.operations.iter_mut().chain(self.output.iter_mut()) {
            execute(batch, instances, scene, renderer)?;
        }

        Ok(())
    }

    fn relink(&mut self) {
        for (i, v) in self.instances.iter_mut().enumerate() {
            v.set_previous(if i == 0 { None } else { Some(i - 1) });
        }

        self.dirty = true;
    }
}

fn execute(
    batch: &mut TargetOperation,
    instances: &mut [CompositorInstance],
    scene: &mut CompositorInstance,
    renderer: &mut dyn RenderVisitor,
) -> Result<()> {
    if batch.only_initial && batch.has_been_rendered {
        trace!("Skips batch of {:?} which renders only once.", batch.target);
        return Ok(());
    }

    batch.has_been_rendered = true;
    renderer.bind(batch.target, batch.dimensions)?;
    renderer.update_visibility(batch.visibility_mask, batch.lod_bias, &batch.material_scheme)?;

    if batch.find_visible_objects {
        renderer.find_visible_objects()?;
    }

    let mut cursor = 0;
    for queue in batch.render_queues.iter() {
        while let Some(&(tag, ref op)) = batch.operations.get(cursor) {
            if tag > queue {
                break;
            }

            execute_operation(op, batch.dimensions, instances, scene, renderer)?;
            cursor += 1;
        }

        renderer.render_queue(queue)?;
    }

    for &(_, ref op) in &batch.operations[cursor..] {
        execute_operation(op, batch.dimensions, instances, scene, renderer)?;
    }

    Ok(())
}

fn execute_operation(
    op: &Operation,
    dimensions: Vector2<u32>,
    instances: &mut [CompositorInstance],
    scene: &mut CompositorInstance,
    renderer: &mut dyn RenderVisitor,
) -> Result<()> {
    match *op {
        Operation::Clear(ref v) => renderer.clear(v.buffers, v.color, v.depth, v.stencil),
        Operation::Stencil(ref v) => renderer.update_stencil(v),
        Operation::Quad(ref v) => {
            let owner = instances
                .iter_mut()
                .chain(Some(scene))
                .find(|i| i.id() == v.instance);

            match owner {
                Some(owner) => owner.render_quad(v, dimensions, renderer),
                None => {
                    warn!("Quad pass {} has lost its instance {}.", v.pass_id, v.instance);
                    Ok(())
                }
            }
        }
    }
}
