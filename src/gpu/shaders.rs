// ============================================================================
// SHADERS — all WGSL source as inline strings
// ============================================================================

/// Stroke shader: positions arrive in working coordinates, the camera uniform
/// carries the viewport size and pan offset (both in working coordinates).
/// Fragments are flat ink — no texturing, no antialiasing.
pub const STROKE_SHADER: &str = r#"
struct Camera {
    viewport: vec2<f32>,
    offset: vec2<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    let p = position.xy - camera.offset;
    let x = p.x / camera.viewport.x * 2.0 - 1.0;
    let y = 1.0 - p.y / camera.viewport.y * 2.0;
    return vec4<f32>(x, y, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.0, 0.0, 0.0, 1.0);
}
"#;
