// ============================================================================
// GPU MODULE — wgpu rendering backend for the segment chain
// ============================================================================
//
// Architecture:
//   context.rs  — wgpu Device, Queue, adapter init (headless)
//   shaders.rs  — WGSL shader source (inline strings)
//   renderer.rs — GpuBackend: one vertex buffer per segment, offscreen
//                 render pass, RGBA readback for the UI texture
// ============================================================================

pub mod context;
pub mod renderer;
pub mod shaders;

pub use context::GpuContext;
pub use renderer::GpuBackend;

/// WGPU requires `bytes_per_row` to be a multiple of 256 on texture readback.
pub const COPY_BYTES_PER_ROW_ALIGNMENT: u32 = 256;

/// Round a row byte count up to the readback alignment.
pub fn align_bytes_per_row(bytes: u32) -> u32 {
    bytes.div_ceil(COPY_BYTES_PER_ROW_ALIGNMENT) * COPY_BYTES_PER_ROW_ALIGNMENT
}
