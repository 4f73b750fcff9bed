// ============================================================================
// STROKE ENGINE — append index, stroke history, undo/redo
// ============================================================================
//
// One engine owns one drawing session. It tracks:
//   - the global append index: total line segments committed since the session
//     started (rewound by undo, re-advanced by redo),
//   - the committed stroke sequence: one checkpoint (end index) plus the
//     stroke's point list per flushed stroke — a single sequence so the
//     checkpoint log and the shape list can never truncate out of step,
//   - the cursor: how many committed strokes are currently realized. The
//     implicit checkpoint 0 (empty canvas) sits below the first stroke.
//
// Segment arithmetic: a global index maps to segment `index / capacity`,
// slot `index % capacity`. The chain always holds at least `ordinal + 1`
// segments before the index is dereferenced — writing the last slot of a
// segment eagerly creates the next one, so an append never waits on an
// allocation.

use crate::consts::ZOOM;
use crate::segment::{RenderBackend, SegmentStore};
use crate::svg;
use crate::vector::{LineVertices, Point};

/// One committed stroke: the global index where it ended and every point the
/// sampler accepted while it was drawn (the stroke's start point included).
pub struct Stroke {
    end_index: usize,
    points: Vec<Point>,
}

impl Stroke {
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

pub struct StrokeEngine<B: RenderBackend> {
    store: SegmentStore<B>,
    /// Global index: where the next line segment will be written.
    index: usize,
    /// Committed strokes, oldest first. Entries past `cursor` are redoable
    /// futures; they stay until a new stroke diverges from the cursor.
    strokes: Vec<Stroke>,
    /// Number of realized strokes. 0 means the empty-canvas checkpoint.
    cursor: usize,
    /// The stroke currently being drawn. Discarded wholesale if the pointer
    /// is released without any accepted sample.
    accumulating: Vec<Point>,
}

impl<B: RenderBackend> StrokeEngine<B> {
    /// A fresh session: empty history, one segment ready for the first line.
    pub fn new(backend: B, line_capacity: usize) -> Self {
        let mut store = SegmentStore::new(backend, line_capacity);
        store.create_segment();
        Self {
            store,
            index: 0,
            strokes: Vec::new(),
            cursor: 0,
            accumulating: Vec::new(),
        }
    }

    // -- Observation --------------------------------------------------------

    pub fn store(&self) -> &SegmentStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SegmentStore<B> {
        &mut self.store
    }

    /// Where the next line segment will be written.
    pub fn global_index(&self) -> usize {
        self.index
    }

    /// The checkpoint log: the implicit 0 entry plus each stroke's end index,
    /// including redoable entries past the cursor.
    pub fn history(&self) -> Vec<usize> {
        let mut log = Vec::with_capacity(self.strokes.len() + 1);
        log.push(0);
        log.extend(self.strokes.iter().map(|s| s.end_index));
        log
    }

    /// Cursor position in the checkpoint log (0 = empty canvas).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.strokes.len()
    }

    /// Strokes visible at the current cursor. Redoable futures are excluded —
    /// export and traversal never see past the cursor.
    pub fn committed_strokes(&self) -> &[Stroke] {
        &self.strokes[..self.cursor]
    }

    /// True when the session holds anything a user could lose: committed
    /// strokes (realized or redoable) or an unfinished one.
    pub fn has_content(&self) -> bool {
        !self.strokes.is_empty() || !self.accumulating.is_empty()
    }

    fn checkpoint(&self, cursor: usize) -> usize {
        if cursor == 0 {
            0
        } else {
            self.strokes[cursor - 1].end_index
        }
    }

    // -- Mutation -----------------------------------------------------------

    /// Record one line segment of the in-progress stroke.
    ///
    /// `vertices` is the quad for `a -> b` (see `vector::line_quad`); `a` and
    /// `b` are the raw endpoints, kept for export.
    pub fn append(&mut self, vertices: &LineVertices, a: Point, b: Point) {
        let capacity = self.store.line_capacity();

        // Drawing over an undone state: the redoable future is invalid.
        // Truncate the stroke sequence to the cursor first, then drop every
        // segment past the one the (pre-truncation) index points into.
        if self.cursor < self.strokes.len() {
            self.strokes.truncate(self.cursor);
        }
        let ordinal = self.index / capacity;
        self.store.drop_segments_from(ordinal + 1);

        // First accepted sample of the stroke: keep the true start point,
        // otherwise it would only exist inside the vertex data.
        if self.accumulating.is_empty() {
            self.accumulating.push(a);
        }
        self.accumulating.push(b);

        let slot = self.index % capacity;
        self.store.write_slot(ordinal, slot, vertices);

        // Filled the segment: pre-allocate the next one.
        if slot == capacity - 1 {
            self.store.create_segment();
        }

        self.store.set_visible_count(ordinal, slot + 1);
        self.index += 1;
    }

    /// Commit the in-progress stroke. No-op when nothing was accepted since
    /// the last flush.
    pub fn flush(&mut self) {
        if self.accumulating.is_empty() {
            return;
        }

        // Divergence was already resolved in append; the truncate is a pure
        // no-op here and keeps the sequence consistent regardless.
        self.strokes.truncate(self.cursor);
        self.strokes.push(Stroke {
            end_index: self.index,
            points: std::mem::take(&mut self.accumulating),
        });
        self.cursor = self.strokes.len();
    }

    /// Step back one checkpoint. No-op at the empty-canvas checkpoint.
    pub fn undo(&mut self) {
        if self.cursor == 0 {
            return;
        }

        let previous = self.index / self.store.line_capacity();
        self.cursor -= 1;
        self.index = self.checkpoint(self.cursor);
        let current = self.index / self.store.line_capacity();

        // Segments now fully in the future are hidden outright; the landing
        // segment's count set below is authoritative for its ordinal.
        let mut ordinal = previous;
        while ordinal > current {
            self.store.set_visible_count(ordinal, 0);
            ordinal -= 1;
        }
        self.store
            .set_visible_count(current, self.index % self.store.line_capacity());
    }

    /// Step forward one checkpoint. No-op when the cursor is at the newest
    /// entry. Redo only reveals — the vertex data was never cleared.
    pub fn redo(&mut self) {
        if self.cursor == self.strokes.len() {
            return;
        }

        let capacity = self.store.line_capacity();
        let current = self.index / capacity;
        self.cursor += 1;
        self.index = self.strokes[self.cursor - 1].end_index;
        let next = self.index / capacity;

        for ordinal in current..next {
            self.store.set_visible_count(ordinal, capacity);
        }
        self.store.set_visible_count(next, self.index % capacity);
    }

    /// Reset to the state of a freshly constructed engine: empty history,
    /// a single empty segment.
    pub fn clear(&mut self) {
        self.index = 0;
        self.strokes.clear();
        self.cursor = 0;
        self.accumulating.clear();
        self.store.drop_all();
        self.store.create_segment();
    }

    /// Serialize the realized strokes as an SVG document, translated to the
    /// bounding-box origin and scaled out of working coordinates.
    pub fn export_svg(&self) -> String {
        let shapes: Vec<&[Point]> = self.committed_strokes().iter().map(|s| s.points()).collect();
        svg::write_svg(&shapes, ZOOM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::CpuBackend;
    use crate::vector::line_quad;

    fn engine(capacity: usize) -> StrokeEngine<CpuBackend> {
        StrokeEngine::new(CpuBackend::new(), capacity)
    }

    fn draw_line(engine: &mut StrokeEngine<CpuBackend>, a: (f32, f32), b: (f32, f32)) {
        let a = Point::new(a.0, a.1);
        let b = Point::new(b.0, b.1);
        engine.append(&line_quad(a, b, 4.0), a, b);
    }

    #[test]
    fn flush_without_samples_is_a_no_op() {
        let mut engine = engine(5);
        engine.flush();
        assert_eq!(engine.history(), vec![0]);
        assert_eq!(engine.cursor(), 0);
    }

    #[test]
    fn undo_at_the_empty_checkpoint_is_a_no_op() {
        let mut engine = engine(5);
        engine.undo();
        engine.undo();
        assert_eq!(engine.global_index(), 0);
        assert_eq!(engine.cursor(), 0);
    }

    #[test]
    fn redo_at_the_newest_checkpoint_is_a_no_op() {
        let mut engine = engine(5);
        draw_line(&mut engine, (0.0, 0.0), (3.0, 0.0));
        engine.flush();
        engine.redo();
        assert_eq!(engine.global_index(), 1);
        assert_eq!(engine.cursor(), 1);
    }

    #[test]
    fn first_sample_preserves_the_stroke_start() {
        let mut engine = engine(5);
        draw_line(&mut engine, (1.0, 2.0), (3.0, 4.0));
        draw_line(&mut engine, (3.0, 4.0), (5.0, 6.0));
        engine.flush();

        let points = engine.committed_strokes()[0].points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Point::new(1.0, 2.0));
        assert_eq!(points[2], Point::new(5.0, 6.0));
    }

    #[test]
    fn abandoned_stroke_is_not_committed() {
        let mut engine = engine(5);
        draw_line(&mut engine, (0.0, 0.0), (3.0, 0.0));
        // No flush: the accumulating shape is simply never committed.
        assert_eq!(engine.cursor(), 0);
        assert!(engine.committed_strokes().is_empty());
    }
}
