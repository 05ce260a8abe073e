use glam::{Vec3, Vec4};

/// Everything the renderers draw: one triangle in clip space, one flat colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    /// Triangle corners in normalized device coordinates.
    pub vertices: [Vec3; 3],
    /// Fill colour, RGBA in `0.0..=1.0`.
    pub color: Vec4,
    /// Colour the frame is cleared to before drawing.
    pub clear_color: Vec4,
}

impl Scene {
    /// The demo scene: a pink triangle with its base along the bottom edge and
    /// its apex at the top centre, on black.
    pub const fn triangle() -> Self {
        Self {
            vertices: [
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            // 100% red, 0% green, 50% blue, 100% alpha
            color: Vec4::new(1.0, 0.0, 0.5, 1.0),
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::triangle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_vertex_data_is_nine_floats() {
        let scene = Scene::triangle();
        let floats: &[f32] = bytemuck::cast_slice(&scene.vertices);
        assert_eq!(
            floats,
            &[-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn default_is_the_triangle() {
        assert_eq!(Scene::default(), Scene::triangle());
        assert_eq!(Scene::default().clear_color, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }
}
