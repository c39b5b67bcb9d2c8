use crate::math::prelude::Vector2;

/// The shared screen-covering rectangle that every full-screen quad operation draws.
///
/// Corners are expressed in normalized device coordinates, shifted by the texel offsets
/// of the backend so that texels map exactly onto pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FullscreenQuad {
    horizontal_texel_offset: f32,
    vertical_texel_offset: f32,
}

impl FullscreenQuad {
    pub fn new(horizontal_texel_offset: f32, vertical_texel_offset: f32) -> Self {
        FullscreenQuad {
            horizontal_texel_offset,
            vertical_texel_offset,
        }
    }

    /// Returns the `(left, top, right, bottom)` corners of the quad when it is drawn
    /// into a target of `dimensions`.
    pub fn corners(&self, dimensions: Vector2<u32>) -> [f32; 4] {
        if dimensions.x == 0 || dimensions.y == 0 {
            return [-1.0, 1.0, 1.0, -1.0];
        }

        let h = self.horizontal_texel_offset * 2.0 / dimensions.x as f32;
        let v = self.vertical_texel_offset * 2.0 / dimensions.y as f32;
        [-1.0 + h, 1.0 - v, 1.0 + h, -1.0 - v]
    }
}

impl Default for FullscreenQuad {
    fn default() -> Self {
        FullscreenQuad::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn corners() {
        let quad = FullscreenQuad::default();
        assert_eq!(quad.corners(Vector2::new(64, 32)), [-1.0, 1.0, 1.0, -1.0]);

        let quad = FullscreenQuad::new(0.5, 0.5);
        let corners = quad.corners(Vector2::new(100, 50));
        assert!((corners[0] - (-0.99)).abs() < 1e-6);
        assert!((corners[1] - 0.98).abs() < 1e-6);
        assert!((corners[2] - 1.01).abs() < 1e-6);
        assert!((corners[3] - (-1.02)).abs() < 1e-6);

        assert_eq!(quad.corners(Vector2::new(0, 0)), [-1.0, 1.0, 1.0, -1.0]);
    }
}
