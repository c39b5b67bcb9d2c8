//! The centralized management of compositors.

use std::sync::Arc;

use super::chain::{scene_technique, CompositorChain, SCENE_COMPOSITOR};
use super::compositor::Compositor;
use super::instance::InstanceIdGenerator;
use super::settings::CompositorSettings;
use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::utils::hash::FastHashMap;
use crate::utils::object_pool::ObjectPool;
use crate::video::assets::prelude::*;
use crate::video::backends::{self, RenderVisitor, Visitor};

/// Owns the registered compositors, the viewports and the compositor chain of each
/// viewport, and the full-screen quad shared by all of them.
pub struct CompositorManager {
    visitor: Box<dyn Visitor>,
    settings: CompositorSettings,
    materials: MaterialLibrary,
    compositors: FastHashMap<String, Compositor>,
    viewports: ObjectPool<ViewportHandle, Viewport>,
    chains: FastHashMap<ViewportHandle, CompositorChain>,
    quad: Option<Arc<FullscreenQuad>>,
    ids: InstanceIdGenerator,
}

impl CompositorManager {
    /// Creates a manager with a built-in compositor named `SCENE_COMPOSITOR`. Its
    /// registered technique describes a viewport with default clear settings, while
    /// instances added with `add_compositor` use the clear buffers and background of
    /// the viewport they are added to.
    pub fn new(visitor: Box<dyn Visitor>, settings: CompositorSettings) -> Self {
        let scene = scene_technique(
            &Viewport::new(Vector2::new(0, 0)),
            &settings.default_scheme,
            settings.scene_first_queue,
            settings.scene_last_queue,
        );

        let mut manager = CompositorManager {
            visitor,
            settings,
            materials: MaterialLibrary::new(),
            compositors: FastHashMap::default(),
            viewports: ObjectPool::new(),
            chains: FastHashMap::default(),
            quad: None,
            ids: InstanceIdGenerator::new(),
        };

        manager.register(Compositor::new(SCENE_COMPOSITOR).with_technique(scene));
        manager
    }

    /// Creates a manager with the headless backend.
    pub fn headless(settings: CompositorSettings) -> Self {
        CompositorManager::new(backends::new_headless(), settings)
    }

    #[inline]
    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    #[inline]
    pub fn visitor(&self) -> &dyn Visitor {
        self.visitor.as_ref()
    }

    #[inline]
    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// Gets the material library. Chains are not recompiled automatically when
    /// materials change, see `CompositorChain::mark_dirty`.
    #[inline]
    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    /// Registers a compositor, replacing the one with the same name if any. Instances
    /// created from the replaced compositor keep their techniques.
    pub fn register(&mut self, compositor: Compositor) -> Option<Compositor> {
        self.compositors
            .insert(compositor.name().to_owned(), compositor)
    }

    pub fn unregister(&mut self, name: &str) -> Option<Compositor> {
        self.compositors.remove(name)
    }

    #[inline]
    pub fn compositor(&self, name: &str) -> Option<&Compositor> {
        self.compositors.get(name)
    }

    #[inline]
    pub fn compositor_mut(&mut self, name: &str) -> Option<&mut Compositor> {
        self.compositors.get_mut(name)
    }

    pub fn create_viewport(&mut self, viewport: Viewport) -> ViewportHandle {
        self.viewports.create(viewport)
    }

    #[inline]
    pub fn viewport(&self, handle: ViewportHandle) -> Option<&Viewport> {
        self.viewports.get(handle)
    }

    /// Deletes a viewport along with its compositor chain.
    pub fn delete_viewport(&mut self, handle: ViewportHandle) -> Option<Viewport> {
        self.remove_chain(handle);
        self.viewports.free(handle)
    }

    /// Gets the shared full-screen quad, creating it on first use.
    pub fn quad(&mut self) -> Arc<FullscreenQuad> {
        let settings = &self.settings;
        self.quad
            .get_or_insert_with(|| {
                Arc::new(FullscreenQuad::new(
                    settings.horizontal_texel_offset,
                    settings.vertical_texel_offset,
                ))
            })
            .clone()
    }

    #[inline]
    pub fn has_chain(&self, handle: ViewportHandle) -> bool {
        self.chains.contains_key(&handle)
    }

    /// Gets the compositor chain of a viewport, creating it on first use.
    pub fn chain(&mut self, handle: ViewportHandle) -> Result<&mut CompositorChain> {
        self.ensure_chain(handle)?;
        self.chains
            .get_mut(&handle)
            .ok_or_else(|| Error::ViewportNotExists(handle))
    }

    /// Destroys the compositor chain of a viewport, releasing every texture its
    /// instances own.
    pub fn remove_chain(&mut self, handle: ViewportHandle) -> bool {
        match self.chains.remove(&handle) {
            Some(mut chain) => {
                chain.clear(self.visitor.as_mut());
                true
            }
            None => false,
        }
    }

    /// Appends an instance of compositor `name` to the chain of viewport, or inserts it
    /// at `position`. Returns `None` without touching the chain if no technique of the
    /// compositor is supported by the backend.
    pub fn add_compositor(
        &mut self,
        handle: ViewportHandle,
        name: &str,
        position: Option<usize>,
    ) -> Result<Option<usize>> {
        if !self.viewports.contains(handle) {
            return Err(Error::ViewportNotExists(handle));
        }

        let mut technique = {
            let compositor = self
                .compositors
                .get_mut(name)
                .ok_or_else(|| Error::CompositorNotFound(name.to_owned()))?;

            if compositor.is_compilation_required() {
                compositor.compile(
                    self.visitor.capabilities(),
                    &self.materials,
                    self.settings.allow_degraded_formats,
                );
            }

            match compositor.best_technique() {
                Ok(technique) => technique.clone(),
                Err(err) => {
                    info!("{} It is skipped.", err);
                    return Ok(None);
                }
            }
        };

        if name == SCENE_COMPOSITOR {
            if let Some(viewport) = self.viewports.get(handle) {
                technique = Arc::new(scene_technique(
                    viewport,
                    &self.settings.default_scheme,
                    self.settings.scene_first_queue,
                    self.settings.scene_last_queue,
                ));
            }
        }

        let position = self.chain(handle)?.insert(position, name, technique)?;
        Ok(Some(position))
    }

    /// Removes the first instance of compositor `name` from the chain of viewport.
    pub fn remove_compositor(&mut self, handle: ViewportHandle, name: &str) -> Result<bool> {
        if !self.viewports.contains(handle) {
            return Err(Error::ViewportNotExists(handle));
        }

        if let Some(chain) = self.chains.get_mut(&handle) {
            if let Some(position) = chain.position(name) {
                chain.remove(position, self.visitor.as_mut())?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Enables or disables the first instance of compositor `name` in the chain of
    /// viewport. Returns false if there is no such instance.
    pub fn set_compositor_enabled(
        &mut self,
        handle: ViewportHandle,
        name: &str,
        enabled: bool,
    ) -> Result<bool> {
        let viewport = self
            .viewports
            .get(handle)
            .ok_or_else(|| Error::ViewportNotExists(handle))?;

        if let Some(chain) = self.chains.get_mut(&handle) {
            if let Some(position) = chain.position(name) {
                chain.set_enabled(position, enabled, self.visitor.as_mut(), viewport)?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Resizes a viewport, rebuilding the textures of every enabled instance in its
    /// chain.
    pub fn notify_viewport_resized(
        &mut self,
        handle: ViewportHandle,
        dimensions: Vector2<u32>,
    ) -> Result<()> {
        let viewport = self
            .viewports
            .get_mut(handle)
            .ok_or_else(|| Error::ViewportNotExists(handle))?;

        viewport.dimensions = dimensions;
        viewport.camera.bind_viewport(dimensions);

        if let Some(chain) = self.chains.get_mut(&handle) {
            chain.notify_viewport_resized(self.visitor.as_mut(), viewport)?;
        }

        Ok(())
    }

    /// Renders viewport through its compositor chain.
    pub fn render(&mut self, handle: ViewportHandle, renderer: &mut dyn RenderVisitor) -> Result<()> {
        self.ensure_chain(handle)?;

        let viewport = self
            .viewports
            .get(handle)
            .ok_or_else(|| Error::ViewportNotExists(handle))?;

        match self.chains.get_mut(&handle) {
            Some(chain) => chain.render(viewport, &self.materials, renderer),
            None => Err(Error::ViewportNotExists(handle)),
        }
    }

    fn ensure_chain(&mut self, handle: ViewportHandle) -> Result<()> {
        if !self.viewports.contains(handle) {
            return Err(Error::ViewportNotExists(handle));
        }

        if !self.chains.contains_key(&handle) {
            let quad = self.quad();
            let chain = CompositorChain::with_ids(quad, &self.settings, self.ids.clone());
            self.chains.insert(handle, chain);
            debug!("Creates compositor chain for {}.", handle);
        }

        Ok(())
    }
}
