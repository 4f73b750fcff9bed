// ============================================================================
// CONSTANTS — geometry layout and input tuning
// ============================================================================

/// How many line segments one vertex buffer holds. When the last slot of the
/// current buffer is written, the next buffer is created eagerly so an append
/// never has to wait on an allocation.
pub const LINES_PER_SEGMENT: usize = 512;

/// Each line segment is extruded into a quad: two triangles.
pub const TRIANGLES_PER_LINE: usize = 2;

/// Vertices per triangle.
pub const POINTS_PER_TRIANGLE: usize = 3;

/// Values per vertex: x, y, z. The z component is always 0 — the layout is
/// kept three-wide so one vertex maps directly onto a `vec3` attribute.
pub const VALUES_PER_POINT: usize = 3;

/// Flat f32 count for one line segment's worth of vertex data.
pub const VALUES_PER_LINE: usize = TRIANGLES_PER_LINE * POINTS_PER_TRIANGLE * VALUES_PER_POINT;

/// Working-coordinate scale. Pointer positions are multiplied by this once at
/// input time and coordinates are divided by it once at export time, so the
/// internal canvas is effectively supersampled.
pub const ZOOM: f32 = 2.0;

/// Stroke extrusion width in working coordinates (ZOOM × the on-screen width).
pub const LINE_WIDTH: f32 = 4.0;

/// Squared working-coordinate distance below which a new pointer sample is
/// dropped. Keeps coincident points out of the line generator and caps the
/// geometry rate while the pointer dwells.
pub const MIN_SAMPLE_DIST_SQ: f32 = 4.0;

/// Stroke width declared in exported SVG documents (output coordinates).
pub const EXPORT_STROKE_WIDTH: f32 = 2.0;
