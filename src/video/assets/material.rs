//! A minimal material model: named materials made of techniques, techniques made of
//! passes, and passes with ordered texture units that compositor rebinds to its render
//! textures.

use smallvec::SmallVec;

use crate::utils::hash::FastHashMap;
use crate::video::assets::texture::RenderTextureHandle;

/// The material scheme used when nothing else is specified.
pub const DEFAULT_SCHEME: &str = "Default";

/// The texture a texture unit samples from.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureBinding {
    None,
    /// A texture resource known by name to the rest of renderer.
    Named(String),
    /// A render texture, tagged with the name it was created with.
    RenderTexture(RenderTextureHandle, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureUnit {
    pub name: String,
    pub binding: TextureBinding,
}

impl TextureUnit {
    pub fn new<T: Into<String>>(name: T) -> Self {
        TextureUnit {
            name: name.into(),
            binding: TextureBinding::None,
        }
    }

    #[inline]
    pub fn bind_render_texture<T: Into<String>>(&mut self, handle: RenderTextureHandle, name: T) {
        self.binding = TextureBinding::RenderTexture(handle, name.into());
    }

    #[inline]
    pub fn render_texture(&self) -> Option<RenderTextureHandle> {
        match self.binding {
            TextureBinding::RenderTexture(handle, _) => Some(handle),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialPass {
    pub name: String,
    pub texture_units: SmallVec<[TextureUnit; 4]>,
    pub variables: SmallVec<[(String, UniformVariable); 4]>,
}

impl MaterialPass {
    pub fn new<T: Into<String>>(name: T) -> Self {
        MaterialPass {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_texture_unit<T: Into<String>>(mut self, name: T) -> Self {
        self.texture_units.push(TextureUnit::new(name));
        self
    }

    /// Binds a named uniform variable, replacing the value if it has been set before.
    pub fn set_uniform_variable<T: Into<String>>(&mut self, field: T, variable: UniformVariable) {
        let field = field.into();
        for pair in &mut self.variables {
            if pair.0 == field {
                pair.1 = variable;
                return;
            }
        }

        self.variables.push((field, variable));
    }

    pub fn uniform_variable(&self, field: &str) -> Option<UniformVariable> {
        self.variables
            .iter()
            .find(|v| v.0 == field)
            .map(|v| v.1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTechnique {
    pub scheme: String,
    /// Whether the hardware could execute this technique.
    pub supported: bool,
    pub passes: Vec<MaterialPass>,
}

impl MaterialTechnique {
    pub fn new() -> Self {
        MaterialTechnique {
            scheme: DEFAULT_SCHEME.into(),
            supported: true,
            passes: Vec::new(),
        }
    }

    pub fn with_pass(mut self, pass: MaterialPass) -> Self {
        self.passes.push(pass);
        self
    }
}

impl Default for MaterialTechnique {
    fn default() -> Self {
        MaterialTechnique::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    techniques: Vec<MaterialTechnique>,
}

impl Material {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Material {
            name: name.into(),
            techniques: Vec::new(),
        }
    }

    pub fn with_technique(mut self, technique: MaterialTechnique) -> Self {
        self.techniques.push(technique);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn techniques(&self) -> &[MaterialTechnique] {
        &self.techniques
    }

    #[inline]
    pub fn techniques_mut(&mut self) -> &mut [MaterialTechnique] {
        &mut self.techniques
    }

    pub fn num_supported_techniques(&self) -> usize {
        self.techniques.iter().filter(|v| v.supported).count()
    }

    /// Picks the first supported technique of `scheme`, or the first supported technique
    /// of any scheme if none matches.
    pub fn best_supported_technique(&self, scheme: &str) -> Option<&MaterialTechnique> {
        self.techniques
            .iter()
            .find(|v| v.supported && v.scheme == scheme)
            .or_else(|| self.techniques.iter().find(|v| v.supported))
    }

    /// Creates a material with a single empty technique that mirrors the scheme of the
    /// best supported technique of this one.
    pub fn clone_without_passes<T: Into<String>>(&self, name: T, scheme: &str) -> Material {
        let mut technique = MaterialTechnique::new();
        if let Some(best) = self.best_supported_technique(scheme) {
            technique.scheme = best.scheme.clone();
        }

        Material {
            name: name.into(),
            techniques: vec![technique],
        }
    }

    /// Appends a pass to the first technique, creating one if necessary.
    pub fn push_pass(&mut self, pass: MaterialPass) {
        if self.techniques.is_empty() {
            self.techniques.push(MaterialTechnique::new());
        }

        self.techniques[0].passes.push(pass);
    }

    /// The passes of the first technique.
    pub fn passes(&self) -> &[MaterialPass] {
        self.techniques
            .first()
            .map(|v| v.passes.as_slice())
            .unwrap_or(&[])
    }

    pub fn passes_mut(&mut self) -> &mut [MaterialPass] {
        match self.techniques.first_mut() {
            Some(v) => v.passes.as_mut_slice(),
            None => &mut [],
        }
    }
}

/// Looks up materials by name.
pub trait MaterialResolver {
    fn material(&self, name: &str) -> Option<&Material>;
}

/// A plain name-indexed collection of materials.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: FastHashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        MaterialLibrary::default()
    }

    /// Adds a material, returning the one it replaces if any.
    pub fn add(&mut self, material: Material) -> Option<Material> {
        self.materials.insert(material.name.clone(), material)
    }

    pub fn remove(&mut self, name: &str) -> Option<Material> {
        self.materials.remove(name)
    }

    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.get_mut(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialResolver for MaterialLibrary {
    fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }
}
