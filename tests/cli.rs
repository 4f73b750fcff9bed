// Headless CLI round-trip: parse an SVG drawing, replay it through the
// engine, and write the normalized document back out.

use std::fs;

use inkline::cli::{self, CliArgs};
use tempfile::tempdir;

fn args(input: Vec<String>) -> CliArgs {
    CliArgs {
        input,
        output: None,
        output_dir: None,
        verbose: false,
    }
}

#[test]
fn normalizes_a_drawing_into_the_output_file() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("sketch.svg");
    let output = dir.path().join("clean.svg");

    // A drawing offset from the origin; normalization translates it back.
    fs::write(
        &input,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="20">
    <path d="M 20 10 L 30 10 L 30 20" />
</svg>"#,
    )
    .expect("write input");

    let mut args = args(vec![input.to_string_lossy().into_owned()]);
    args.output = Some(output.clone());
    assert_eq!(cli::run(args), 0);

    let normalized = fs::read_to_string(&output).expect("read output");
    assert!(normalized.contains("<path d=\"M 0 0 L 10 0 L 10 10\" />"));
    assert!(normalized.contains("width=\"10\""));
    assert!(normalized.contains("height=\"10\""));
}

#[test]
fn batch_mode_writes_one_output_per_input() {
    let dir = tempdir().expect("tempdir");
    let out_dir = dir.path().join("normalized");

    for name in ["a.svg", "b.svg"] {
        fs::write(
            dir.path().join(name),
            r#"<svg><path d="M 0 0 L 5 5" /></svg>"#,
        )
        .expect("write input");
    }

    let mut args = args(vec![dir
        .path()
        .join("*.svg")
        .to_string_lossy()
        .into_owned()]);
    args.output_dir = Some(out_dir.clone());
    assert_eq!(cli::run(args), 0);

    assert!(out_dir.join("a.svg").is_file());
    assert!(out_dir.join("b.svg").is_file());
}

#[test]
fn missing_input_fails_with_nonzero_exit() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("does_not_exist.svg");
    assert_eq!(cli::run(args(vec![missing.to_string_lossy().into_owned()])), 1);
}

#[test]
fn multiple_inputs_with_single_output_are_rejected() {
    let dir = tempdir().expect("tempdir");
    for name in ["a.svg", "b.svg"] {
        fs::write(dir.path().join(name), "<svg></svg>").expect("write input");
    }

    let mut args = args(vec![
        dir.path().join("a.svg").to_string_lossy().into_owned(),
        dir.path().join("b.svg").to_string_lossy().into_owned(),
    ]);
    args.output = Some(dir.path().join("only.svg"));
    assert_eq!(cli::run(args), 1);
}
