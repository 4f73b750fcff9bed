// ============================================================================
// SEGMENT STORE — fixed-capacity vertex buffer chain
// ============================================================================
//
// The store owns the chain of buffer segments and the raw write / visibility
// operations. It knows nothing about strokes or history — the engine decides
// when to create, reveal, hide, or drop segments.
//
// Rendering is reached through the `RenderBackend` trait so the same store
// drives the wgpu backend in the GUI, the plain-memory `CpuBackend` in the
// headless CLI, and the assertions in tests.

use crate::vector::LineVertices;

/// The seam to the rendering collaborator. The store holds exclusive logical
/// ownership of every segment; the backend only allocates, uploads, updates
/// draw ranges, and releases on request.
pub trait RenderBackend {
    type Segment;

    /// Allocate a segment sized for `line_capacity` line segments and register
    /// it as a render target. New segments start with visible count 0.
    fn create_segment(&mut self, line_capacity: usize) -> Self::Segment;

    /// Upload one line's vertex data into slot `slot`. A slot is never
    /// rewritten while it stays committed — only the visibility boundary
    /// moves. Rewinding the global index makes tail slots eligible for reuse.
    fn write_slot(&mut self, segment: &mut Self::Segment, slot: usize, vertices: &LineVertices);

    /// Set how many slots, from slot 0, are drawable. This is the only
    /// operation that makes written data observable to rendering.
    fn set_visible_count(&mut self, segment: &mut Self::Segment, lines: usize);

    /// Release a segment's render resources. Only history divergence drops
    /// segments, and only from some ordinal onward.
    fn release_segment(&mut self, segment: Self::Segment);
}

/// Chain of fixed-capacity segments addressed by ordinal.
pub struct SegmentStore<B: RenderBackend> {
    backend: B,
    segments: Vec<B::Segment>,
    line_capacity: usize,
}

impl<B: RenderBackend> SegmentStore<B> {
    /// `line_capacity` is fixed for the lifetime of the store; every segment
    /// in the chain has the same capacity.
    pub fn new(backend: B, line_capacity: usize) -> Self {
        assert!(line_capacity > 0, "segment capacity must be non-zero");
        Self {
            backend,
            segments: Vec::new(),
            line_capacity,
        }
    }

    pub fn line_capacity(&self) -> usize {
        self.line_capacity
    }

    /// Number of segments currently in the chain.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn segments(&self) -> &[B::Segment] {
        &self.segments
    }

    /// Mutable backend together with the segment slice, split-borrowed so a
    /// renderer backend can draw the chain it manages.
    pub fn backend_and_segments(&mut self) -> (&mut B, &[B::Segment]) {
        (&mut self.backend, &self.segments)
    }

    /// Append a fresh segment to the end of the chain.
    pub fn create_segment(&mut self) {
        let segment = self.backend.create_segment(self.line_capacity);
        self.segments.push(segment);
    }

    /// Write one line's vertices into `slot` of segment `ordinal`.
    ///
    /// Out-of-range ordinal/slot is a contract violation by the caller's index
    /// arithmetic: fatal in debug builds, dropped (never written out of
    /// bounds) in release.
    pub fn write_slot(&mut self, ordinal: usize, slot: usize, vertices: &LineVertices) {
        debug_assert!(ordinal < self.segments.len(), "segment ordinal {} out of range", ordinal);
        debug_assert!(slot < self.line_capacity, "slot {} exceeds capacity {}", slot, self.line_capacity);
        if slot >= self.line_capacity {
            return;
        }
        match self.segments.get_mut(ordinal) {
            Some(segment) => self.backend.write_slot(segment, slot, vertices),
            None => {
                crate::log_err!("write_slot: ordinal {} out of range ({})", ordinal, self.segments.len());
            }
        }
    }

    /// Set the visible line count of segment `ordinal`. Counts above the
    /// capacity are a caller bug; clamped in release.
    pub fn set_visible_count(&mut self, ordinal: usize, lines: usize) {
        debug_assert!(ordinal < self.segments.len(), "segment ordinal {} out of range", ordinal);
        debug_assert!(lines <= self.line_capacity, "visible count {} exceeds capacity {}", lines, self.line_capacity);
        let lines = lines.min(self.line_capacity);
        match self.segments.get_mut(ordinal) {
            Some(segment) => self.backend.set_visible_count(segment, lines),
            None => {
                crate::log_err!("set_visible_count: ordinal {} out of range ({})", ordinal, self.segments.len());
            }
        }
    }

    /// Remove every segment with ordinal >= `ordinal` from the chain and
    /// release its render resources. Idempotent when nothing is above the
    /// ordinal. Used exclusively for divergence truncation.
    pub fn drop_segments_from(&mut self, ordinal: usize) {
        if ordinal >= self.segments.len() {
            return;
        }
        for segment in self.segments.drain(ordinal..) {
            self.backend.release_segment(segment);
        }
    }

    /// Drop the whole chain. Used by session clear.
    pub fn drop_all(&mut self) {
        self.drop_segments_from(0);
    }
}

// ============================================================================
// CPU BACKEND — plain-memory segments for the headless CLI and tests
// ============================================================================

/// A segment held entirely in CPU memory: the flat value array plus the
/// visible-range boundary. The storage never shrinks once allocated.
pub struct CpuSegment {
    values: Vec<f32>,
    visible_lines: usize,
    line_capacity: usize,
}

impl CpuSegment {
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn visible_lines(&self) -> usize {
        self.visible_lines
    }

    /// The flat values of one slot.
    pub fn slot(&self, slot: usize) -> &[f32] {
        let width = crate::consts::VALUES_PER_LINE;
        &self.values[slot * width..(slot + 1) * width]
    }

    pub fn line_capacity(&self) -> usize {
        self.line_capacity
    }
}

/// Backend with no GPU behind it. Counts creations and releases so callers
/// can report (and tests can assert) segment lifecycle behavior.
#[derive(Default)]
pub struct CpuBackend {
    created: usize,
    released: usize,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total segments ever created through this backend.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Total segments released through this backend.
    pub fn released(&self) -> usize {
        self.released
    }
}

impl RenderBackend for CpuBackend {
    type Segment = CpuSegment;

    fn create_segment(&mut self, line_capacity: usize) -> CpuSegment {
        self.created += 1;
        CpuSegment {
            values: vec![0.0; line_capacity * crate::consts::VALUES_PER_LINE],
            visible_lines: 0,
            line_capacity,
        }
    }

    fn write_slot(&mut self, segment: &mut CpuSegment, slot: usize, vertices: &LineVertices) {
        let offset = slot * crate::consts::VALUES_PER_LINE;
        segment.values[offset..offset + vertices.len()].copy_from_slice(vertices);
    }

    fn set_visible_count(&mut self, segment: &mut CpuSegment, lines: usize) {
        segment.visible_lines = lines;
    }

    fn release_segment(&mut self, _segment: CpuSegment) {
        self.released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::VALUES_PER_LINE;

    fn filled(value: f32) -> LineVertices {
        [value; VALUES_PER_LINE]
    }

    fn store(capacity: usize) -> SegmentStore<CpuBackend> {
        SegmentStore::new(CpuBackend::new(), capacity)
    }

    #[test]
    fn written_slot_holds_its_values() {
        let mut store = store(4);
        store.create_segment();
        store.write_slot(0, 2, &filled(9.0));

        let segment = &store.segments()[0];
        assert_eq!(segment.slot(2), &filled(9.0)[..]);
        assert_eq!(segment.slot(0), &filled(0.0)[..]);
    }

    #[test]
    fn visible_count_starts_at_zero_and_moves() {
        let mut store = store(4);
        store.create_segment();
        assert_eq!(store.segments()[0].visible_lines(), 0);

        store.set_visible_count(0, 3);
        assert_eq!(store.segments()[0].visible_lines(), 3);
    }

    #[test]
    fn drop_from_releases_the_tail_only() {
        let mut store = store(4);
        for _ in 0..3 {
            store.create_segment();
        }
        store.drop_segments_from(1);

        assert_eq!(store.len(), 1);
        assert_eq!(store.backend().created(), 3);
        assert_eq!(store.backend().released(), 2);

        // Idempotent when nothing is above the ordinal.
        store.drop_segments_from(1);
        assert_eq!(store.backend().released(), 2);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn release_build_clamps_visible_count() {
        let mut store = store(4);
        store.create_segment();
        store.set_visible_count(0, 99);
        assert_eq!(store.segments()[0].visible_lines(), 4);
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn zero_capacity_store_is_rejected() {
        let _ = store(0);
    }
}
