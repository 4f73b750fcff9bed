use clap::Parser;
use eframe::egui;

use inkline::app::InklineApp;
use inkline::cli;

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    // Routed before any window or GPU work: batch processing never touches
    // eframe or wgpu.
    if cli::CliArgs::is_cli_mode() {
        let args = cli::CliArgs::parse();
        std::process::exit(cli::run(args));
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    inkline::logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Inkline"),
        ..Default::default()
    };

    eframe::run_native(
        "Inkline",
        options,
        Box::new(|cc| Box::new(InklineApp::new(cc))),
    )
}
