use crate::video::assets::texture::RenderTextureFormat;

/// Represents the capabilities of the backend.
///
/// Contrary to the state, these values never change.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    /// The render texture formats that could be used as attachments of framebuffer.
    pub render_texture_formats: Vec<RenderTextureFormat>,

    /// Maximum width and height of a render texture.
    pub max_render_texture_dims: (u32, u32),
}

impl Capabilities {
    pub fn new(formats: &[RenderTextureFormat]) -> Self {
        Capabilities {
            render_texture_formats: formats.to_vec(),
            max_render_texture_dims: (16384, 16384),
        }
    }

    /// Capabilities of a backend that supports every render texture format.
    pub fn all() -> Self {
        use self::RenderTextureFormat::*;
        Capabilities::new(&[
            RGB8,
            RGBA4,
            RGBA8,
            RGB10A2,
            R16F,
            R32F,
            RGBA16F,
            RGBA32F,
            Depth16,
            Depth24,
            Depth32,
            Depth24Stencil8,
        ])
    }

    #[inline]
    pub fn has_render_texture_format(&self, format: RenderTextureFormat) -> bool {
        self.render_texture_formats.contains(&format)
    }

    /// Returns the format the backend would actually allocate when `desired` is asked
    /// for. That is `desired` itself if supported, otherwise the narrowest supported
    /// format of the same kind with at least as many bits per pixel.
    pub fn native_format(&self, desired: RenderTextureFormat) -> Option<RenderTextureFormat> {
        if self.has_render_texture_format(desired) {
            return Some(desired);
        }

        self.render_texture_formats
            .iter()
            .filter(|v| v.is_depth() == desired.is_depth() && v.bits() >= desired.bits())
            .min_by_key(|v| v.bits())
            .cloned()
    }

    /// Checks if an acceptable substitute of `desired` is supported.
    #[inline]
    pub fn is_equivalent_format_supported(&self, desired: RenderTextureFormat) -> bool {
        self.native_format(desired).is_some()
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::all()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::assets::texture::RenderTextureFormat::*;

    #[test]
    fn native_format() {
        let caps = Capabilities::new(&[RGBA8, RGBA32F, Depth24Stencil8]);
        assert_eq!(caps.native_format(RGBA8), Some(RGBA8));
        assert_eq!(caps.native_format(RGB8), Some(RGBA8));
        assert_eq!(caps.native_format(RGBA16F), Some(RGBA32F));
        assert_eq!(caps.native_format(Depth16), Some(Depth24Stencil8));

        let caps = Capabilities::new(&[RGBA8]);
        assert_eq!(caps.native_format(RGBA16F), None);
        assert_eq!(caps.native_format(Depth24), None);
        assert!(!caps.is_equivalent_format_supported(RGBA32F));
        assert!(caps.is_equivalent_format_supported(RGBA4));
    }
}
