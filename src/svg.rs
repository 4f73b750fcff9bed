// ============================================================================
// SVG — export serializer, path parser, stroke replay
// ============================================================================
//
// Export walks the committed shapes, translates every point to the bounding
// box origin, divides the working scale back out, and emits one `<path>` per
// stroke as `M x y L x y …` data.
//
// Import is the reverse, as a caller-side concern: pull the `d="…"` payloads
// out of the document text, parse the move-to/line-to commands into point
// lists, and replay them through the engine as ordinary append/flush calls.

use regex::Regex;

use crate::consts::{EXPORT_STROKE_WIDTH, LINE_WIDTH};
use crate::engine::StrokeEngine;
use crate::segment::RenderBackend;
use crate::vector::{line_quad, Point};

/// Serialize shapes into an SVG document string.
///
/// Coordinates are translated by the bounding-box minimum and divided by
/// `zoom`; the declared width/height are the scaled bounding-box size. Zero
/// shapes produce an explicit zero-sized document — the bounding-box fold has
/// no identity in that case and must not reach the output.
pub fn write_svg(shapes: &[&[Point]], zoom: f32) -> String {
    if shapes.is_empty() {
        return document(0.0, 0.0, &[]);
    }

    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for shape in shapes {
        for point in *shape {
            min_x = min_x.min(point.x);
            max_x = max_x.max(point.x);
            min_y = min_y.min(point.y);
            max_y = max_y.max(point.y);
        }
    }

    let paths: Vec<String> = shapes
        .iter()
        .filter(|shape| !shape.is_empty())
        .map(|shape| {
            let mut data = format!(
                "M {} {}",
                (shape[0].x - min_x) / zoom,
                (shape[0].y - min_y) / zoom
            );
            for point in &shape[1..] {
                data.push_str(&format!(
                    " L {} {}",
                    (point.x - min_x) / zoom,
                    (point.y - min_y) / zoom
                ));
            }
            format!("<path d=\"{}\" />", data)
        })
        .collect();

    document((max_x - min_x) / zoom, (max_y - min_y) / zoom, &paths)
}

fn document(width: f32, height: f32, paths: &[String]) -> String {
    format!(
        "<svg\n  xmlns=\"http://www.w3.org/2000/svg\"\n  width=\"{}\"\n  height=\"{}\"\n  fill=\"transparent\"\n  stroke=\"black\"\n  stroke-width=\"{}\">\n    {}\n</svg>",
        width,
        height,
        EXPORT_STROKE_WIDTH,
        paths.join("\n    ")
    )
}

/// Extract every path's `M/L` commands from an SVG document and parse them
/// into point lists (document coordinates, unscaled).
///
/// Only the subset this application exports is understood: absolute move-to
/// and line-to with whitespace-separated decimal coordinates.
pub fn parse_paths(text: &str) -> Result<Vec<Vec<Point>>, String> {
    // Unwrap is safe: the pattern is a compile-time literal.
    let path_data = Regex::new(r#"d="([^"]*)""#).expect("valid regex");

    let mut shapes: Vec<Vec<Point>> = Vec::new();
    for captures in path_data.captures_iter(text) {
        parse_path_data(&captures[1], &mut shapes)?;
    }
    Ok(shapes)
}

fn parse_path_data(data: &str, shapes: &mut Vec<Vec<Point>>) -> Result<(), String> {
    let mut tokens = data.split_whitespace();

    while let Some(token) = tokens.next() {
        match token {
            "M" => {
                let point = parse_point(&mut tokens)?;
                shapes.push(vec![point]);
            }
            "L" => {
                let point = parse_point(&mut tokens)?;
                shapes
                    .last_mut()
                    .ok_or_else(|| "line-to before any move-to".to_string())?
                    .push(point);
            }
            other => {
                return Err(format!("unsupported path command: {:?}", other));
            }
        }
    }
    Ok(())
}

fn parse_point<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<Point, String> {
    let x = tokens.next().ok_or_else(|| "missing x coordinate".to_string())?;
    let y = tokens.next().ok_or_else(|| "missing y coordinate".to_string())?;
    Ok(Point::new(
        x.parse::<f32>().map_err(|e| format!("bad coordinate {:?}: {}", x, e))?,
        y.parse::<f32>().map_err(|e| format!("bad coordinate {:?}: {}", y, e))?,
    ))
}

/// Replay parsed shapes into the engine as if they had been drawn: scale the
/// document coordinates back into working coordinates, append one line quad
/// per consecutive point pair, flush once per shape.
pub fn replay<B: RenderBackend>(engine: &mut StrokeEngine<B>, shapes: &[Vec<Point>], zoom: f32) {
    for shape in shapes {
        let scaled: Vec<Point> = shape
            .iter()
            .map(|p| Point::new(p.x * zoom, p.y * zoom))
            .collect();

        for pair in scaled.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                // The generator's no-coincident-points precondition; repeated
                // points in a hand-edited file are skipped, not fatal.
                continue;
            }
            engine.append(&line_quad(a, b, LINE_WIDTH), a, b);
        }
        engine.flush();
    }
}
