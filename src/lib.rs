// ============================================================================
// Inkline — freehand drawing with segmented GPU buffers and branching undo
// ============================================================================
//
// Strokes are recorded as line-segment quads packed into a chain of
// fixed-capacity vertex buffers. A single global index addresses the stream
// (`segment = index / capacity`, `slot = index % capacity`); undo and redo
// rewind and re-advance that index and adjust per-segment visible ranges
// without ever regenerating geometry. Committed drawings export as SVG.

pub mod app;
pub mod cli;
pub mod consts;
pub mod engine;
pub mod gpu;
pub mod logger;
pub mod segment;
pub mod svg;
pub mod vector;
