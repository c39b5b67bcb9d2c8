use std::sync::Arc;

use super::technique::Technique;
use crate::errors::*;
use crate::video::assets::material::MaterialResolver;
use crate::video::capabilities::Capabilities;

/// A named post-processing effect, described by an ordered list of techniques from the
/// most to the least preferred.
#[derive(Debug, Clone)]
pub struct Compositor {
    name: String,
    techniques: Vec<Arc<Technique>>,
    supported: Vec<Arc<Technique>>,
    compilation_required: bool,
}

impl Compositor {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Compositor {
            name: name.into(),
            techniques: Vec::new(),
            supported: Vec::new(),
            compilation_required: true,
        }
    }

    pub fn with_technique(mut self, technique: Technique) -> Self {
        self.add_technique(technique);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_technique(&mut self, technique: Technique) {
        self.techniques.push(Arc::new(technique));
        self.compilation_required = true;
    }

    pub fn remove_technique(&mut self, index: usize) -> Option<Arc<Technique>> {
        if index >= self.techniques.len() {
            return None;
        }

        self.compilation_required = true;
        Some(self.techniques.remove(index))
    }

    #[inline]
    pub fn techniques(&self) -> &[Arc<Technique>] {
        &self.techniques
    }

    /// Gets a mutable reference to a technique. Returns `None` if there is no such
    /// technique, or if it is shared by a live compositor instance.
    pub fn technique_mut(&mut self, index: usize) -> Option<&mut Technique> {
        // The supported list holds clones of the same Arc.
        self.supported.clear();
        self.compilation_required = true;
        self.techniques.get_mut(index).and_then(Arc::get_mut)
    }

    #[inline]
    pub fn is_compilation_required(&self) -> bool {
        self.compilation_required
    }

    /// Selects the techniques supported by the backend. Techniques are first tested with
    /// exact texture formats only; if none qualify and `allow_degraded_formats` is set,
    /// they are tested again accepting equivalent formats.
    pub fn compile(
        &mut self,
        capabilities: &Capabilities,
        materials: &dyn MaterialResolver,
        allow_degraded_formats: bool,
    ) {
        self.supported = self
            .techniques
            .iter()
            .filter(|v| v.is_supported(capabilities, materials, false))
            .cloned()
            .collect();

        if self.supported.is_empty() && allow_degraded_formats {
            self.supported = self
                .techniques
                .iter()
                .filter(|v| v.is_supported(capabilities, materials, true))
                .cloned()
                .collect();

            if !self.supported.is_empty() {
                info!(
                    "Compositor '{}' falls back to techniques with degraded texture formats.",
                    self.name
                );
            }
        }

        self.compilation_required = false;
    }

    /// The supported techniques from the last compilation, in order of preference.
    #[inline]
    pub fn supported_techniques(&self) -> &[Arc<Technique>] {
        &self.supported
    }

    #[inline]
    pub fn supported_technique(&self, index: usize) -> Option<&Arc<Technique>> {
        self.supported.get(index)
    }

    /// The most preferred supported technique.
    pub fn best_technique(&self) -> Result<&Arc<Technique>> {
        self.supported
            .first()
            .ok_or_else(|| Error::NoSupportedTechnique(self.name.clone()))
    }
}
