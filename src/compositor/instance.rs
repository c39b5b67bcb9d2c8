//! A `CompositorInstance` binds one technique to one position of a chain. It owns the
//! render textures the technique defines while it is enabled, and compiles the target
//! passes of technique into operation batches.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::diagnostics::{self, CompileWarning};
use super::operation::{Operation, QuadOperation, TargetOperation};
use super::pass::{Pass, RenderQuadPass};
use super::target_pass::{InputMode, TargetPass};
use super::technique::Technique;
use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::utils::hash::FastHashMap;
use crate::utils::object_pool::ObjectPool;
use crate::video::assets::prelude::*;
use crate::video::backends::{RenderTarget, RenderVisitor, Visitor};

/// Identifies an instance. Ids are never reused by chains sharing an `InstanceIdGenerator`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out instance ids. Clones share one counter, so chains created with clones of
/// the same generator never hand out the same id twice.
#[derive(Debug, Clone, Default)]
pub struct InstanceIdGenerator(Arc<AtomicU32>);

impl InstanceIdGenerator {
    pub fn new() -> Self {
        InstanceIdGenerator::default()
    }

    /// Returns the next id. Ids start from 1, 0 is the original scene of every chain.
    pub(crate) fn next(&self) -> InstanceId {
        InstanceId(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl_handle!(ListenerHandle);

/// Hooks around the full-screen quads of an instance.
pub trait InstanceListener {
    /// Called when the private material of a quad pass has been set up during
    /// compilation. Parameters that do not change per frame could be set here.
    fn on_material_setup(&mut self, _pass_id: u32, _material: &mut Material) {}

    /// Called every time before a quad pass is rendered.
    fn on_material_render(&mut self, _pass_id: u32, _material: &mut Material) {}
}

/// A render texture owned by an instance.
#[derive(Debug, Clone)]
pub struct LocalTexture {
    /// The name the render texture was created with, unique among the instances of
    /// chains sharing an `InstanceIdGenerator`.
    pub name: String,
    pub handle: RenderTextureHandle,
    pub params: RenderTextureParams,
    /// The viewport covering the whole texture.
    pub viewport: Viewport,
}

/// Shared state of one chain compilation.
pub(crate) struct CompileContext<'a> {
    pub materials: &'a dyn MaterialResolver,
    pub quad: &'a Arc<FullscreenQuad>,
    pub generation: u64,
    pub warnings: &'a mut Vec<CompileWarning>,
}

pub struct CompositorInstance {
    id: InstanceId,
    compositor: String,
    technique: Arc<Technique>,
    enabled: bool,
    previous: Option<usize>,
    textures: FastHashMap<String, LocalTexture>,
    listeners: ObjectPool<ListenerHandle, Box<dyn InstanceListener>>,
    materials: Vec<Material>,
}

impl CompositorInstance {
    pub(crate) fn new(id: InstanceId, compositor: String, technique: Arc<Technique>) -> Self {
        CompositorInstance {
            id,
            compositor,
            technique,
            enabled: false,
            previous: None,
            textures: FastHashMap::default(),
            listeners: ObjectPool::new(),
            materials: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The name of the compositor this instance was created from.
    #[inline]
    pub fn compositor(&self) -> &str {
        &self.compositor
    }

    #[inline]
    pub fn technique(&self) -> &Arc<Technique> {
        &self.technique
    }

    #[inline]
    pub(crate) fn set_technique(&mut self, technique: Arc<Technique>) {
        self.technique = technique;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The position of previous instance in chain.
    #[inline]
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    #[inline]
    pub(crate) fn set_previous(&mut self, previous: Option<usize>) {
        self.previous = previous;
    }

    /// Enables or disables this instance. Enabling always rebuilds the local textures,
    /// and a failure leaves the instance enabled with part of its textures.
    pub(crate) fn set_enabled(
        &mut self,
        enabled: bool,
        visitor: &mut dyn Visitor,
        viewport: &Viewport,
    ) -> Result<()> {
        self.enabled = enabled;

        if enabled {
            self.create_resources(visitor, viewport)
        } else {
            self.free_resources(visitor);
            Ok(())
        }
    }

    #[inline]
    pub(crate) fn enable_without_resources(&mut self) {
        self.enabled = true;
    }

    /// Gets the name of the render texture created for texture definition `name`.
    pub fn texture_instance_name(&self, name: &str) -> Result<&str> {
        self.textures
            .get(name)
            .map(|v| v.name.as_str())
            .ok_or_else(|| Error::LocalTextureNotFound(name.to_owned()))
    }

    #[inline]
    pub fn local_texture(&self, name: &str) -> Option<&LocalTexture> {
        self.textures.get(name)
    }

    pub fn local_textures(&self) -> impl Iterator<Item = &LocalTexture> {
        self.textures.values()
    }

    pub fn add_listener<T: InstanceListener + 'static>(&mut self, listener: T) -> ListenerHandle {
        self.listeners.create(Box::new(listener))
    }

    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.free(handle).is_some()
    }

    /// The private materials created by the last compilation.
    #[inline]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Creates a render texture for every texture definition of technique, sized after
    /// `viewport` unless the definition fixes its size. Textures from a former call are
    /// released first.
    pub(crate) fn create_resources(
        &mut self,
        visitor: &mut dyn Visitor,
        viewport: &Viewport,
    ) -> Result<()> {
        self.free_resources(visitor);

        let technique = self.technique.clone();
        for definition in &technique.textures {
            let width = if definition.width == 0 {
                viewport.dimensions.x
            } else {
                definition.width
            };

            let height = if definition.height == 0 {
                viewport.dimensions.y
            } else {
                definition.height
            };

            let format = visitor
                .capabilities()
                .native_format(definition.format)
                .unwrap_or(definition.format);

            let params = RenderTextureParams {
                format,
                dimensions: Vector2::new(width, height),
                sampler: true,
            };

            let name = format!("{}/{}/{}", self.compositor, self.id, definition.name);
            let handle = visitor.create_render_texture(&name, params)?;
            debug!(
                "Creates render texture '{}' ({:?}, {}x{}).",
                name, format, width, height
            );

            let texture = LocalTexture {
                name,
                handle,
                params,
                viewport: Viewport::render_texture(viewport, params.dimensions),
            };

            self.textures.insert(definition.name.clone(), texture);
        }

        Ok(())
    }

    /// Releases every local texture. It's safe to call this when there is nothing to
    /// release.
    pub(crate) fn free_resources(&mut self, visitor: &mut dyn Visitor) {
        for (_, texture) in self.textures.drain() {
            match visitor.delete_render_texture(texture.handle) {
                Ok(_) => debug!("Deletes render texture '{}'.", texture.name),
                Err(err) => warn!(
                    "Failed to delete render texture '{}'. {}",
                    texture.name, err
                ),
            }
        }
    }

    /// Discards the private materials of the last compilation.
    pub(crate) fn prepare_for_compilation(&mut self) {
        self.materials.clear();
    }

    /// Compiles the target passes of all the instances before this one, and then the
    /// target passes of this one. Disabled instances contribute nothing.
    ///
    /// `chain` holds every instance in front of this one, and `scene` the original
    /// scene that stands in for a missing previous instance.
    pub(crate) fn compile_target_operations(
        &mut self,
        chain: &mut [CompositorInstance],
        mut scene: Option<&mut CompositorInstance>,
        ctx: &mut CompileContext,
        out: &mut Vec<TargetOperation>,
    ) -> Result<()> {
        if let Some((previous, before)) = split_previous(chain, self.previous) {
            previous.compile_target_operations(before, reborrow(&mut scene), ctx, out)?;
        }

        if !self.enabled {
            return Ok(());
        }

        let technique = self.technique.clone();
        for target in &technique.targets {
            let texture = self
                .textures
                .get(&target.output)
                .ok_or_else(|| Error::LocalTextureNotFound(target.output.clone()))?;

            let mut op = TargetOperation::new(
                RenderTarget::Texture(texture.handle),
                texture.params.dimensions,
            );

            op.only_initial = target.only_initial;
            op.visibility_mask = target.visibility_mask;
            op.lod_bias = target.lod_bias;

            if target.input == InputMode::Previous {
                compile_previous_output(self.previous, chain, reborrow(&mut scene), ctx, &mut op)?;
            }

            self.collect_passes(&mut op, target, ctx);
            out.push(op);
        }

        Ok(())
    }

    /// Compiles the output target pass into `op`, which renders into whatever follows
    /// this instance. A disabled instance forwards to its previous one.
    pub(crate) fn compile_output_operation(
        &mut self,
        chain: &mut [CompositorInstance],
        scene: Option<&mut CompositorInstance>,
        ctx: &mut CompileContext,
        op: &mut TargetOperation,
    ) -> Result<()> {
        if !self.enabled {
            return compile_previous_output(self.previous, chain, scene, ctx, op);
        }

        let technique = self.technique.clone();
        let output = &technique.output;

        op.visibility_mask &= output.visibility_mask;
        op.lod_bias *= output.lod_bias;

        if output.input == InputMode::Previous {
            compile_previous_output(self.previous, chain, scene, ctx, op)?;
        }

        self.collect_passes(op, output, ctx);
        Ok(())
    }

    fn collect_passes(
        &mut self,
        op: &mut TargetOperation,
        target: &TargetPass,
        ctx: &mut CompileContext,
    ) {
        for pass in &target.passes {
            match *pass {
                Pass::Clear(ref clear) => op.push(Operation::Clear(*clear)),
                Pass::Stencil(ref stencil) => op.push(Operation::Stencil(*stencil)),
                Pass::RenderScene(ref scene) => {
                    // Passes loaded from data skip the ordering done by `RenderScenePass::new`.
                    let (first, last) = if scene.first_queue > scene.last_queue {
                        let warning = CompileWarning::ReversedQueueRange {
                            compositor: self.compositor.clone(),
                            first: scene.first_queue,
                            last: scene.last_queue,
                        };

                        diagnostics::report(ctx.warnings, warning);
                        (scene.last_queue, scene.first_queue)
                    } else {
                        (scene.first_queue, scene.last_queue)
                    };

                    if first < op.current_queue {
                        let warning = CompileWarning::QueueOrder {
                            compositor: self.compositor.clone(),
                            requested: first,
                            current: op.current_queue,
                        };

                        diagnostics::report(ctx.warnings, warning);
                    }

                    let last = last.min(queues::MAX);
                    op.render_queues.insert_range(first, last);
                    op.current_queue = last + 1;
                    op.find_visible_objects = true;
                    op.material_scheme = target.material_scheme.clone();
                }
                Pass::RenderQuad(ref quad) => self.compile_quad(op, target, quad, ctx),
            }
        }
    }

    fn compile_quad(
        &mut self,
        op: &mut TargetOperation,
        target: &TargetPass,
        quad: &RenderQuadPass,
        ctx: &mut CompileContext,
    ) {
        let materials = ctx.materials;

        let source = match materials.material(&quad.material) {
            Some(material) => material,
            None => {
                let warning = CompileWarning::MissingMaterial {
                    compositor: self.compositor.clone(),
                    pass_id: quad.identifier,
                    material: quad.material.clone(),
                };

                diagnostics::report(ctx.warnings, warning);
                return;
            }
        };

        let technique = match source.best_supported_technique(&target.material_scheme) {
            Some(technique) => technique,
            None => {
                let warning = CompileWarning::NoSupportedMaterialTechnique {
                    compositor: self.compositor.clone(),
                    pass_id: quad.identifier,
                    material: quad.material.clone(),
                };

                diagnostics::report(ctx.warnings, warning);
                return;
            }
        };

        let mut inputs = Vec::with_capacity(quad.inputs.len());
        for input in &quad.inputs {
            let texture = match *input {
                Some(ref name) => match self.textures.get(name) {
                    Some(texture) => Some((texture.handle, texture.name.clone())),
                    None => {
                        let warning = CompileWarning::UnknownInput {
                            compositor: self.compositor.clone(),
                            pass_id: quad.identifier,
                            input: name.clone(),
                        };

                        diagnostics::report(ctx.warnings, warning);
                        None
                    }
                },
                None => None,
            };

            inputs.push(texture);
        }

        let name = format!(
            "{}/{}/{}/{}",
            self.compositor, self.id, ctx.generation, quad.identifier
        );

        let mut material = source.clone_without_passes(name, &target.material_scheme);
        for pass in &technique.passes {
            let mut pass = pass.clone();

            for (unit, input) in inputs.iter().enumerate() {
                if let Some(ref texture) = *input {
                    match pass.texture_units.get_mut(unit) {
                        Some(v) => v.bind_render_texture(texture.0, texture.1.as_str()),
                        None => {
                            let warning = CompileWarning::TextureUnitOutOfBounds {
                                compositor: self.compositor.clone(),
                                material: quad.material.clone(),
                                unit,
                            };

                            diagnostics::report(ctx.warnings, warning);
                        }
                    }
                }
            }

            material.push_pass(pass);
        }

        for listener in self.listeners.values_mut() {
            listener.on_material_setup(quad.identifier, &mut material);
        }

        self.materials.push(material);
        op.push(Operation::Quad(QuadOperation {
            pass_id: quad.identifier,
            instance: self.id,
            material: self.materials.len() - 1,
            quad: ctx.quad.clone(),
        }));
    }

    /// Draws the full-screen quad once for every pass of a private material.
    pub(crate) fn render_quad(
        &mut self,
        op: &QuadOperation,
        dimensions: Vector2<u32>,
        renderer: &mut dyn RenderVisitor,
    ) -> Result<()> {
        let material = match self.materials.get_mut(op.material) {
            Some(material) => material,
            None => {
                warn!(
                    "[{}] Quad pass {} refers to a discarded material.",
                    self.compositor, op.pass_id
                );
                return Ok(());
            }
        };

        for listener in self.listeners.values_mut() {
            listener.on_material_render(op.pass_id, material);
        }

        for pass in material.passes() {
            trace!("[{}] Draws quad with pass '{}'.", self.compositor, pass.name);
            renderer.draw_quad(&op.quad, dimensions, pass)?;
        }

        Ok(())
    }
}

fn split_previous(
    chain: &mut [CompositorInstance],
    previous: Option<usize>,
) -> Option<(&mut CompositorInstance, &mut [CompositorInstance])> {
    match previous {
        Some(index) if index < chain.len() => {
            let (before, rest) = chain.split_at_mut(index);
            rest.first_mut().map(|v| (v, before))
        }
        _ => None,
    }
}

#[inline]
fn reborrow<'a>(
    scene: &'a mut Option<&mut CompositorInstance>,
) -> Option<&'a mut CompositorInstance> {
    scene.as_mut().map(|v| &mut **v)
}

/// Compiles the output of the instance at `previous` into `op`, or the output of the
/// original scene if there is no such instance.
fn compile_previous_output(
    previous: Option<usize>,
    chain: &mut [CompositorInstance],
    scene: Option<&mut CompositorInstance>,
    ctx: &mut CompileContext,
    op: &mut TargetOperation,
) -> Result<()> {
    if let Some((previous, before)) = split_previous(chain, previous) {
        return previous.compile_output_operation(before, scene, ctx, op);
    }

    if let Some(scene) = scene {
        return scene.compile_output_operation(&mut [], None, ctx, op);
    }

    Ok(())
}
