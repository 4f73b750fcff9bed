// ============================================================================
// APPLICATION — eframe shell: canvas, pointer modes, shortcuts, import/export
// ============================================================================
//
// The canvas is a single egui panel showing the GPU-rendered frame. Pointer
// samples are mapped into working coordinates (pan offset added, working
// scale applied), filtered by a minimum distance, and fed to the engine as
// line quads; releasing the pointer flushes the stroke.
//
// Modes: Drawing and Panning. Holding space pans temporarily; `d` and `m`
// switch modes outright (matching the keyboard map users expect from the
// canvas: d = draw, m = move).

use eframe::egui;
use std::path::Path;

use crate::consts::{LINES_PER_SEGMENT, LINE_WIDTH, MIN_SAMPLE_DIST_SQ, ZOOM};
use crate::engine::StrokeEngine;
use crate::gpu::{GpuBackend, GpuContext};
use crate::svg;
use crate::vector::{line_quad, squared_distance, Point};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Drawing,
    Panning,
}

pub struct InklineApp {
    /// `None` when no GPU adapter could be acquired; the UI then shows the
    /// failure instead of a canvas.
    engine: Option<StrokeEngine<GpuBackend>>,
    gpu_error: Option<String>,
    adapter_name: String,

    mode: Mode,
    /// Last accepted pointer sample, in working coordinates.
    previous: Option<Point>,
    /// Accumulated pan offset in screen pixels.
    pan: egui::Vec2,

    canvas_texture: Option<egui::TextureHandle>,
    /// Set by every engine mutation; cleared when a frame is rendered.
    dirty: bool,
    last_frame: Option<(u32, u32, egui::Vec2)>,

    show_close_confirm: bool,
    allowed_to_close: bool,
}

impl InklineApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (engine, gpu_error, adapter_name) = match GpuContext::new() {
            Some(context) => {
                let adapter = context.adapter_name.clone();
                crate::log_info!("GPU adapter: {}", adapter);
                let backend = GpuBackend::new(context);
                (
                    Some(StrokeEngine::new(backend, LINES_PER_SEGMENT)),
                    None,
                    adapter,
                )
            }
            None => {
                crate::log_err!("No usable GPU adapter (hardware or fallback)");
                (
                    None,
                    Some("No usable GPU adapter found — the canvas cannot be shown.".to_string()),
                    String::new(),
                )
            }
        };

        Self {
            engine,
            gpu_error,
            adapter_name,
            mode: Mode::Drawing,
            previous: None,
            pan: egui::Vec2::ZERO,
            canvas_texture: None,
            dirty: true,
            last_frame: None,
            show_close_confirm: false,
            allowed_to_close: false,
        }
    }

    fn export_to_file(&self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG image", &["svg"])
            .set_file_name("drawing.svg")
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, engine.export_svg()) {
            Ok(()) => crate::log_info!("Exported {} stroke(s) to {}", engine.cursor(), path.display()),
            Err(e) => {
                eprintln!("Export failed: {}", e);
                crate::log_err!("Export to {} failed: {}", path.display(), e);
            }
        }
    }

    fn import_text(&mut self, source: &str, text: &str) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        match svg::parse_paths(text) {
            Ok(shapes) => {
                svg::replay(engine, &shapes, ZOOM);
                self.dirty = true;
                crate::log_info!("Imported {} shape(s) from {}", shapes.len(), source);
            }
            Err(e) => {
                eprintln!("Import of {} failed: {}", source, e);
                crate::log_err!("Import of {} failed: {}", source, e);
            }
        }
    }

    fn import_path(&mut self, path: &Path) {
        match std::fs::read_to_string(path) {
            Ok(text) => self.import_text(&path.display().to_string(), &text),
            Err(e) => {
                eprintln!("Could not read {}: {}", path.display(), e);
                crate::log_err!("Could not read {}: {}", path.display(), e);
            }
        }
    }

    fn import_from_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG image", &["svg"])
            .pick_file()
        else {
            return;
        };
        self.import_path(&path);
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path.as_deref() {
                self.import_path(path);
            } else if let Some(bytes) = file.bytes.as_deref() {
                let text = String::from_utf8_lossy(bytes).into_owned();
                self.import_text(&file.name, &text);
            }
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.mode, Mode::Drawing, "✏ Draw");
                ui.selectable_value(&mut self.mode, Mode::Panning, "✋ Pan");
                ui.separator();

                let (can_undo, can_redo) = self
                    .engine
                    .as_ref()
                    .map_or((false, false), |e| (e.can_undo(), e.can_redo()));

                if ui.add_enabled(can_undo, egui::Button::new("↺ Undo")).clicked() {
                    if let Some(engine) = self.engine.as_mut() {
                        engine.undo();
                        self.dirty = true;
                    }
                }
                if ui.add_enabled(can_redo, egui::Button::new("↻ Redo")).clicked() {
                    if let Some(engine) = self.engine.as_mut() {
                        engine.redo();
                        self.dirty = true;
                    }
                }
                ui.separator();

                if ui.button("Export SVG").clicked() {
                    self.export_to_file();
                }
                if ui.button("Import SVG").clicked() {
                    self.import_from_dialog();
                }
                if ui.button("Clear").clicked() {
                    if let Some(engine) = self.engine.as_mut() {
                        engine.clear();
                        self.previous = None;
                        self.dirty = true;
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !self.adapter_name.is_empty() {
                        ui.weak(&self.adapter_name);
                    }
                });
            });
        });
    }

    fn canvas(&mut self, ctx: &egui::Context, space_down: bool) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                let rect = response.rect;

                let effective = if space_down { Mode::Panning } else { self.mode };
                match effective {
                    Mode::Drawing => {
                        ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
                        self.handle_drawing(&response, rect);
                    }
                    Mode::Panning => {
                        ctx.set_cursor_icon(if response.dragged() {
                            egui::CursorIcon::Grabbing
                        } else {
                            egui::CursorIcon::Grab
                        });
                        if response.dragged() {
                            self.pan -= response.drag_delta();
                        }
                        // A pan interrupted an in-progress stroke boundary.
                        self.previous = None;
                    }
                }

                self.refresh_frame(ctx, rect);

                if let Some(texture) = &self.canvas_texture {
                    painter.image(
                        texture.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                } else if let Some(error) = &self.gpu_error {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        error,
                        egui::FontId::proportional(16.0),
                        ui.visuals().error_fg_color,
                    );
                }
            });
    }

    fn handle_drawing(&mut self, response: &egui::Response, rect: egui::Rect) {
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let rel = pos - rect.min;
                let current = Point::new(
                    (rel.x + self.pan.x) * ZOOM,
                    (rel.y + self.pan.y) * ZOOM,
                );

                match self.previous {
                    None => self.previous = Some(current),
                    Some(previous) => {
                        // Skip samples closer than the minimum distance; this
                        // also keeps coincident points away from the quad
                        // generator.
                        if squared_distance(previous, current) >= MIN_SAMPLE_DIST_SQ {
                            if let Some(engine) = self.engine.as_mut() {
                                engine.append(
                                    &line_quad(previous, current, LINE_WIDTH),
                                    previous,
                                    current,
                                );
                                self.dirty = true;
                            }
                            self.previous = Some(current);
                        }
                    }
                }
            }
        }

        if response.drag_released() {
            if let Some(engine) = self.engine.as_mut() {
                engine.flush();
            }
            self.previous = None;
        }
    }

    /// Re-render the canvas texture when the engine changed or the view moved.
    fn refresh_frame(&mut self, ctx: &egui::Context, rect: egui::Rect) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let width = (rect.width() * ZOOM).round() as u32;
        let height = (rect.height() * ZOOM).round() as u32;
        let frame_key = (width, height, self.pan);
        if !self.dirty && self.last_frame == Some(frame_key) {
            return;
        }

        let offset = (self.pan.x * ZOOM, self.pan.y * ZOOM);
        let (backend, segments) = engine.store_mut().backend_and_segments();
        let Some(pixels) = backend.render(segments, width, height, offset) else {
            return;
        };

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            &pixels,
        );
        match &mut self.canvas_texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.canvas_texture =
                    Some(ctx.load_texture("canvas", image, egui::TextureOptions::LINEAR));
            }
        }
        self.dirty = false;
        self.last_frame = Some(frame_key);
    }

    fn close_confirm_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_close_confirm {
            return;
        }
        egui::Window::new("Unsaved drawing")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("The canvas has strokes that were not exported.");
                ui.horizontal(|ui| {
                    if ui.button("Discard and quit").clicked() {
                        self.allowed_to_close = true;
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ui.button("Keep drawing").clicked() {
                        self.show_close_confirm = false;
                    }
                });
            });
    }
}

impl eframe::App for InklineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Closing with unexported strokes needs a confirmation first.
        if ctx.input(|i| i.viewport().close_requested()) {
            let unsaved = self.engine.as_ref().is_some_and(|e| e.has_content());
            if unsaved && !self.allowed_to_close {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.show_close_confirm = true;
            }
        }

        let (undo_pressed, redo_pressed, save_pressed, space_down, draw_key, pan_key) =
            ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift,
                    i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift,
                    i.key_pressed(egui::Key::S) && i.modifiers.command,
                    i.key_down(egui::Key::Space),
                    i.key_pressed(egui::Key::D),
                    i.key_pressed(egui::Key::M),
                )
            });

        if draw_key {
            self.mode = Mode::Drawing;
        }
        if pan_key {
            self.mode = Mode::Panning;
        }
        if undo_pressed {
            if let Some(engine) = self.engine.as_mut() {
                engine.undo();
                self.dirty = true;
            }
        }
        if redo_pressed {
            if let Some(engine) = self.engine.as_mut() {
                engine.redo();
                self.dirty = true;
            }
        }
        if save_pressed {
            self.export_to_file();
        }

        self.handle_dropped_files(ctx);
        self.toolbar(ctx);
        self.canvas(ctx, space_down);
        self.close_confirm_dialog(ctx);
    }
}
