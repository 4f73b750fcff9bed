// Black-box tests for the stroke engine: append/flush/undo/redo/clear over a
// CPU-backed segment chain, where per-segment visible counts are observable.

use inkline::engine::StrokeEngine;
use inkline::segment::CpuBackend;
use inkline::vector::{line_quad, Point};

const CAPACITY: usize = 5;

fn engine() -> StrokeEngine<CpuBackend> {
    StrokeEngine::new(CpuBackend::new(), CAPACITY)
}

/// Append `count` unit line segments, advancing along the x axis.
fn append_lines(engine: &mut StrokeEngine<CpuBackend>, count: usize) {
    for _ in 0..count {
        let i = engine.global_index() as f32;
        let a = Point::new(i * 10.0, 0.0);
        let b = Point::new(i * 10.0 + 10.0, 0.0);
        engine.append(&line_quad(a, b, 4.0), a, b);
    }
}

fn visible_counts(engine: &StrokeEngine<CpuBackend>) -> Vec<usize> {
    engine
        .store()
        .segments()
        .iter()
        .map(|s| s.visible_lines())
        .collect()
}

#[test]
fn index_counts_appends_and_segments_keep_up() {
    let mut engine = engine();
    append_lines(&mut engine, 13);

    assert_eq!(engine.global_index(), 13);
    // floor(13 / 5) + 1 segments must exist; eager creation may have added
    // one more at a boundary.
    assert!(engine.store().len() >= 13 / CAPACITY + 1);
    assert_eq!(engine.store().backend().created(), engine.store().len());
}

#[test]
fn scenario_a_six_lines_span_two_segments() {
    let mut engine = engine();
    append_lines(&mut engine, 6);
    engine.flush();

    assert_eq!(engine.history(), vec![0, 6]);
    assert_eq!(engine.store().len(), 2);
    assert_eq!(visible_counts(&engine), vec![5, 1]);
}

#[test]
fn scenario_b_undo_hides_both_segments() {
    let mut engine = engine();
    append_lines(&mut engine, 6);
    engine.flush();

    engine.undo();

    assert_eq!(engine.global_index(), 0);
    assert_eq!(visible_counts(&engine), vec![0, 0]);
    // History itself is untouched — only the cursor moved.
    assert_eq!(engine.history(), vec![0, 6]);
    assert_eq!(engine.cursor(), 0);
}

#[test]
fn scenario_c_redo_restores_both_segments() {
    let mut engine = engine();
    append_lines(&mut engine, 6);
    engine.flush();

    engine.undo();
    engine.redo();

    assert_eq!(engine.global_index(), 6);
    assert_eq!(engine.cursor(), 1);
    assert_eq!(visible_counts(&engine), vec![5, 1]);
}

#[test]
fn undo_redo_round_trips_across_many_strokes() {
    let mut engine = engine();
    // Three strokes: 4, 4, and 5 lines — checkpoints 4, 8, 13.
    for stroke in [4, 4, 5] {
        append_lines(&mut engine, stroke);
        engine.flush();
    }
    assert_eq!(engine.history(), vec![0, 4, 8, 13]);

    let before = (
        engine.global_index(),
        engine.cursor(),
        visible_counts(&engine),
    );

    engine.undo();
    engine.redo();

    let after = (
        engine.global_index(),
        engine.cursor(),
        visible_counts(&engine),
    );
    assert_eq!(before, after);
}

#[test]
fn undo_across_a_segment_boundary_zeroes_the_tail() {
    let mut engine = engine();
    append_lines(&mut engine, 4);
    engine.flush();
    append_lines(&mut engine, 4);
    engine.flush();

    // Checkpoints [0, 4, 8]; index 8 sits at slot 3 of segment 1.
    engine.undo();
    assert_eq!(engine.global_index(), 4);
    assert_eq!(visible_counts(&engine), vec![4, 0]);

    engine.redo();
    assert_eq!(visible_counts(&engine), vec![5, 3]);
}

#[test]
fn checkpoint_exactly_on_a_boundary_does_not_double_account() {
    let mut engine = engine();
    // First stroke ends exactly on the segment boundary (index 5), the
    // second fills segment 1 exactly (index 10).
    append_lines(&mut engine, 5);
    engine.flush();
    append_lines(&mut engine, 5);
    engine.flush();
    assert_eq!(engine.history(), vec![0, 5, 10]);
    assert_eq!(visible_counts(&engine), vec![5, 5, 0]);

    engine.undo();
    // Landing on index 5: segment 0 stays fully visible, segment 1 is the
    // landing segment and its count (5 mod 5 = 0) is authoritative.
    assert_eq!(engine.global_index(), 5);
    assert_eq!(visible_counts(&engine), vec![5, 0, 0]);

    engine.undo();
    assert_eq!(engine.global_index(), 0);
    assert_eq!(visible_counts(&engine), vec![0, 0, 0]);

    engine.redo();
    assert_eq!(engine.global_index(), 5);
    assert_eq!(visible_counts(&engine), vec![5, 0, 0]);

    engine.redo();
    assert_eq!(engine.global_index(), 10);
    assert_eq!(visible_counts(&engine), vec![5, 5, 0]);
}

#[test]
fn divergence_truncates_history_and_drops_future_segments() {
    let mut engine = engine();
    append_lines(&mut engine, 6);
    engine.flush();
    assert_eq!(engine.history(), vec![0, 6]);
    assert_eq!(engine.store().len(), 2);

    engine.undo();
    // Undo alone leaves history intact.
    assert_eq!(engine.history(), vec![0, 6]);

    // Drawing from the undone state invalidates the redoable future before
    // the new line is recorded.
    append_lines(&mut engine, 1);
    assert_eq!(engine.history(), vec![0]);
    assert_eq!(engine.store().len(), 1);
    assert_eq!(engine.store().backend().released(), 1);

    append_lines(&mut engine, 1);
    engine.flush();
    assert_eq!(engine.history(), vec![0, 2]);
    assert_eq!(visible_counts(&engine), vec![2]);
}

#[test]
fn divergence_mid_segment_keeps_realized_strokes() {
    let mut engine = engine();
    append_lines(&mut engine, 3);
    engine.flush();
    append_lines(&mut engine, 4);
    engine.flush();
    assert_eq!(engine.history(), vec![0, 3, 7]);

    engine.undo();
    assert_eq!(engine.global_index(), 3);

    // New stroke from checkpoint 3: the second stroke's checkpoint and
    // shape go away, the first stroke survives.
    append_lines(&mut engine, 2);
    engine.flush();
    assert_eq!(engine.history(), vec![0, 3, 5]);
    assert_eq!(engine.committed_strokes().len(), 2);
    assert_eq!(visible_counts(&engine), vec![5, 0]);
}

#[test]
fn clear_matches_a_fresh_engine() {
    let mut engine = engine();
    append_lines(&mut engine, 12);
    engine.flush();
    append_lines(&mut engine, 2);
    engine.clear();

    let fresh = self::engine();

    assert_eq!(engine.global_index(), fresh.global_index());
    assert_eq!(engine.history(), fresh.history());
    assert_eq!(engine.cursor(), fresh.cursor());
    assert_eq!(engine.store().len(), fresh.store().len());
    assert_eq!(visible_counts(&engine), visible_counts(&fresh));
    assert!(!engine.can_undo());
    assert!(!engine.can_redo());
    assert!(engine.committed_strokes().is_empty());
}

#[test]
fn export_reproduces_both_polylines() {
    let mut engine = engine();

    let first = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 100.0),
        Point::new(100.0, 100.0),
        Point::new(100.0, 10.0),
        Point::new(10.0, 10.0),
    ];
    for pair in first.windows(2) {
        engine.append(&line_quad(pair[0], pair[1], 4.0), pair[0], pair[1]);
    }
    engine.flush();

    let second = [Point::new(0.0, 0.0), Point::new(110.0, 0.0), Point::new(100.0, 10.0)];
    for pair in second.windows(2) {
        engine.append(&line_quad(pair[0], pair[1], 4.0), pair[0], pair[1]);
    }
    engine.flush();

    let svg = engine.export_svg();
    assert_eq!(svg.matches("<path").count(), 2);
    // The first shape's start point survives (it only otherwise exists
    // inside vertex data).
    assert!(svg.contains("<path d=\"M 0 0 L 5 5 L 5 50 L 50 50 L 50 5 L 5 5\" />"));
    assert!(svg.contains("<path d=\"M 0 0 L 55 0 L 50 5\" />"));
}

#[test]
fn export_skips_undone_strokes() {
    let mut engine = engine();
    append_lines(&mut engine, 2);
    engine.flush();
    append_lines(&mut engine, 2);
    engine.flush();

    engine.undo();
    let svg = engine.export_svg();
    assert_eq!(svg.matches("<path").count(), 1);

    engine.undo();
    let svg = engine.export_svg();
    assert_eq!(svg.matches("<path").count(), 0);
    assert!(svg.contains("width=\"0\""));
}
