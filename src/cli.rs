// ============================================================================
// Inkline CLI — headless SVG processing via command-line arguments
// ============================================================================
//
// Usage examples:
//   inkline --input sketch.svg --output clean.svg
//   inkline -i sketch.svg                          (normalized SVG to stdout)
//   inkline -i "sketches/*.svg" --output-dir normalized/
//
// No GUI is opened in CLI mode. Each input document is parsed, replayed
// through a CPU-backed engine (no wgpu in this path), and re-exported with
// normalized coordinates: translated to the bounding-box origin, one path per
// stroke.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use crate::consts::{LINES_PER_SEGMENT, ZOOM};
use crate::engine::StrokeEngine;
use crate::segment::CpuBackend;
use crate::svg;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Inkline headless SVG processor.
///
/// Normalize freehand SVG drawings without opening the GUI.
#[derive(Parser, Debug)]
#[command(
    name = "inkline",
    about = "Inkline headless SVG normalizer",
    long_about = "Replay SVG path drawings through the stroke engine and re-export them\n\
                  with normalized coordinates, without opening the GUI.\n\n\
                  Example:\n  \
                  inkline --input sketch.svg --output clean.svg\n  \
                  inkline -i \"sketches/*.svg\" --output-dir normalized/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.svg", "sketches/*.svg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input; without it the
    /// normalized document is written to stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the .svg extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print per-file shape counts and timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process
    /// arguments. Used by `main()` to route before creating a window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> i32 {
    // Resolve glob patterns / literal paths → concrete PathBufs
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return 1;
    }

    // Multiple inputs require --output-dir, not --output
    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return 1;
    }

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("error: cannot create output directory {}: {}", dir.display(), e);
            return 1;
        }
    }

    let mut failures = 0usize;
    for input in &inputs {
        let started = Instant::now();
        match process_file(input, &args) {
            Ok(summary) => {
                if args.verbose {
                    println!(
                        "{}: {} shape(s), {} segment buffer(s), {:.1?}",
                        input.display(),
                        summary.shapes,
                        summary.segments,
                        started.elapsed()
                    );
                }
            }
            Err(e) => {
                eprintln!("{}: {}", input.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{} of {} file(s) failed.", failures, inputs.len());
        1
    } else {
        0
    }
}

struct FileSummary {
    shapes: usize,
    segments: usize,
}

fn process_file(input: &Path, args: &CliArgs) -> Result<FileSummary, String> {
    let text = std::fs::read_to_string(input).map_err(|e| format!("read error: {}", e))?;
    let shapes = svg::parse_paths(&text).map_err(|e| format!("parse error: {}", e))?;

    let mut engine = StrokeEngine::new(CpuBackend::new(), LINES_PER_SEGMENT);
    svg::replay(&mut engine, &shapes, ZOOM);
    let normalized = engine.export_svg();

    let destination = match (&args.output, &args.output_dir) {
        (Some(path), None) => Some(path.clone()),
        (_, Some(dir)) => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "drawing".to_string());
            Some(dir.join(format!("{}.svg", stem)))
        }
        (None, None) => None,
    };

    match destination {
        Some(path) => {
            std::fs::write(&path, normalized).map_err(|e| format!("write error: {}", e))?;
        }
        None => {
            println!("{}", normalized);
        }
    }

    Ok(FileSummary {
        shapes: shapes.len(),
        segments: engine.store().len(),
    })
}

/// Expand glob patterns and literal paths into a concrete input list.
/// Literal paths are kept even if missing so the per-file error reports them.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        match glob::glob(pattern) {
            Ok(paths) => {
                let mut matched = false;
                for path in paths.flatten() {
                    matched = true;
                    inputs.push(path);
                }
                if !matched && !pattern.contains(['*', '?', '[']) {
                    inputs.push(PathBuf::from(pattern));
                }
            }
            Err(_) => inputs.push(PathBuf::from(pattern)),
        }
    }
    inputs
}
