/// GLSL ES vertex shader: passes the 3D position straight through to clip space.
pub const VERTEX_SHADER: &str = r#"
attribute vec3 pos;

void main() {
    gl_Position = vec4(pos, 1.0);
}
"#;

/// GLSL ES fragment shader: paints every fragment with the `color` uniform.
pub const FRAGMENT_SHADER: &str = r#"
precision mediump float;

uniform vec4 color;

void main() {
    gl_FragColor = vec4(color);
}
"#;

/// Name of the position attribute in [`VERTEX_SHADER`].
pub(crate) const POSITION_ATTRIBUTE: &str = "pos";

/// Name of the colour uniform in [`FRAGMENT_SHADER`].
pub(crate) const COLOR_UNIFORM: &str = "color";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_declare_the_names_the_renderer_binds() {
        assert!(VERTEX_SHADER.contains(&format!("attribute vec3 {POSITION_ATTRIBUTE};")));
        assert!(FRAGMENT_SHADER.contains(&format!("uniform vec4 {COLOR_UNIFORM};")));
    }

    #[test]
    fn fragment_shader_sets_default_precision() {
        assert!(FRAGMENT_SHADER.contains("precision mediump float;"));
    }
}
