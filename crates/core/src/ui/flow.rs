//! Main interactive application.
//!
//! `PalmFlowApp` drives the scene state machine each frame: it renders
//! the active scene, keeps the camera stream in step with the scene
//! (acquire on entering a capture scene, release on every way out), and
//! runs the analysis call on a background thread so the UI never blocks.
//! Completions come back through a channel and are applied through the
//! controller's stale-token guard.

use super::forms::{self, FormEvent, ModeEvent};
use super::overlay::{self, OverlayRenderer, selected_line};
use super::pager::ReportPager;
use super::state::AnalysisEvent;
use crate::analysis::ImageSize;
use crate::capture::{CaptureSession, Facing};
use crate::config::Config;
use crate::gateway::AnalysisClient;
use crate::report::parse_report_cards;
use crate::scene::{CaptureMode, Scene, SceneController};
use eframe::egui;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

pub struct PalmFlowApp {
    controller: SceneController,
    capture: CaptureSession,
    config: Config,

    // Analysis completions from the worker thread.
    rx: Receiver<AnalysisEvent>,
    tx: Sender<AnalysisEvent>,

    // Textures
    preview_texture: Option<egui::TextureHandle>,
    still_texture: Option<egui::TextureHandle>,

    // Result views
    overlay: OverlayRenderer,
    pager: ReportPager,

    // User-visible failures
    camera_error: Option<String>,
    alert: Option<String>,
}

impl PalmFlowApp {
    pub fn new(config: Config) -> Self {
        let (tx, rx) = channel();
        let capture = CaptureSession::new(config.camera_index);
        Self {
            controller: SceneController::new(),
            capture,
            config,
            rx,
            tx,
            preview_texture: None,
            still_texture: None,
            overlay: OverlayRenderer::new(),
            pager: ReportPager::new(Vec::new()),
            camera_error: None,
            alert: None,
        }
    }

    /// Applies pending analysis completions. Stale tokens are rejected by
    /// the controller and dropped silently.
    fn process_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                AnalysisEvent::Succeeded { token, result } => {
                    let cards = parse_report_cards(&result.report, &result.line_order());
                    if self.controller.analysis_succeeded(token, *result) {
                        self.pager = ReportPager::new(cards);
                        self.overlay = OverlayRenderer::new();
                    }
                }
                AnalysisEvent::Failed { token, message } => {
                    if self.controller.analysis_failed(token) {
                        self.alert = Some(message);
                    }
                }
            }
        }
    }

    /// Keeps the stream in step with the scene: open while a capture
    /// scene shows live preview, closed everywhere else.
    fn sync_camera(&mut self) {
        match self.controller.capture_mode() {
            Some(mode) => {
                let wants_stream =
                    self.controller.captured_image().is_none() && self.camera_error.is_none();
                if wants_stream && !self.capture.is_open() {
                    let facing = match mode {
                        CaptureMode::Face => Facing::User,
                        CaptureMode::Hand => Facing::Environment,
                    };
                    if let Err(e) = self.capture.open(facing) {
                        self.camera_error = Some(e.to_string());
                    }
                }
                if self.controller.captured_image().is_some() && self.capture.is_open() {
                    self.capture.close();
                }
            }
            None => {
                self.capture.close();
                self.camera_error = None;
            }
        }
    }

    /// Hands the captured still to the gateway on a worker thread. The
    /// call is not cancellable; its completion is token-checked instead.
    fn submit_analysis(&mut self, ctx: &egui::Context) {
        let Some(token) = self.controller.submit_photo() else {
            return;
        };
        let Some(png) = self.controller.captured_image().map(|b| b.to_vec()) else {
            return;
        };

        let tx = self.tx.clone();
        let config = self.config.clone();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();

            match runtime {
                Ok(rt) => {
                    rt.block_on(async {
                        let client = AnalysisClient::new(&config);
                        match client.submit(png).await {
                            Ok(result) => {
                                let _ = tx.send(AnalysisEvent::Succeeded {
                                    token,
                                    result: Box::new(result),
                                });
                            }
                            Err(e) => {
                                let _ = tx.send(AnalysisEvent::Failed {
                                    token,
                                    message: e.to_string(),
                                });
                            }
                        }
                    });
                }
                Err(e) => {
                    let _ = tx.send(AnalysisEvent::Failed {
                        token,
                        message: format!("Failed to create async runtime: {}", e),
                    });
                }
            }
            ctx.request_repaint();
        });
    }

    /// Builds the still texture from the session's PNG bytes when needed.
    fn ensure_still_texture(&mut self, ctx: &egui::Context) {
        if self.still_texture.is_some() {
            return;
        }
        let Some(png) = self.controller.captured_image() else {
            return;
        };
        match image::load_from_memory(png) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let size = [decoded.width() as usize, decoded.height() as usize];
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice());
                self.still_texture =
                    Some(ctx.load_texture("captured_still", color_image, egui::TextureOptions::LINEAR));
            }
            Err(e) => {
                eprintln!("Warning: failed to decode captured still: {}", e);
            }
        }
    }

    fn show_alert(&mut self, ui: &mut egui::Ui) {
        let mut dismissed = false;
        if let Some(message) = &self.alert {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::RED, message.as_str());
                    if ui.small_button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });
        }
        if dismissed {
            self.alert = None;
        }
    }

    fn render_capture(&mut self, ui: &mut egui::Ui, mode: CaptureMode) {
        let (subtitle, title, guide) = match mode {
            CaptureMode::Hand => (
                "The secret of palm lines",
                "Photograph your palm",
                "Fit your palm to the frame",
            ),
            CaptureMode::Face => (
                "A gifted face",
                "Photograph your face",
                "Fit your face to the oval guide",
            ),
        };

        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(subtitle).small().color(egui::Color32::GRAY));
            ui.heading(title);
        });
        ui.add_space(8.0);

        let has_still = self.controller.captured_image().is_some();
        let controls_height = 110.0;
        let preview_size = egui::vec2(
            ui.available_width(),
            (ui.available_height() - controls_height).max(120.0),
        );
        let (preview_rect, _) = ui.allocate_exact_size(preview_size, egui::Sense::hover());

        if has_still {
            self.ensure_still_texture(ui.ctx());
            if let Some(texture) = &self.still_texture {
                paint_fitted(ui, preview_rect, texture);
            }
        } else if let Some(error) = self.camera_error.clone() {
            ui.scope_builder(egui::UiBuilder::new().max_rect(preview_rect), |ui| {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(egui::Color32::RED, error);
                });
            });
        } else {
            match self.capture.preview() {
                Ok(frame) => {
                    let size = [frame.width() as usize, frame.height() as usize];
                    let color_image = egui::ColorImage::from_rgb(size, frame.as_raw());
                    match &mut self.preview_texture {
                        Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
                        None => {
                            self.preview_texture = Some(ui.ctx().load_texture(
                                "camera_preview",
                                color_image,
                                egui::TextureOptions::LINEAR,
                            ));
                        }
                    }
                }
                Err(_) => {
                    // Stream still warming up; keep the last frame if any.
                }
            }
            if let Some(texture) = &self.preview_texture {
                paint_fitted(ui, preview_rect, texture);
            }
            ui.painter().text(
                preview_rect.center_bottom() - egui::vec2(0.0, 18.0),
                egui::Align2::CENTER_CENTER,
                guide,
                egui::FontId::proportional(12.0),
                egui::Color32::WHITE,
            );
            // Live preview needs continuous frames.
            ui.ctx().request_repaint();
        }

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.horizontal(|ui| {
                let shutter_label = if has_still { "Retake" } else { "Capture" };
                if ui
                    .add(egui::Button::new(shutter_label).min_size(egui::vec2(90.0, 40.0)))
                    .clicked()
                {
                    if has_still {
                        self.retake();
                    } else {
                        self.take_still();
                    }
                }

                if ui
                    .add_enabled(
                        has_still,
                        egui::Button::new("Analyze").min_size(egui::vec2(90.0, 40.0)),
                    )
                    .clicked()
                {
                    self.submit_analysis(ui.ctx());
                }
            });

            if ui.small_button("Back").clicked() {
                self.controller.back();
            }
        });
    }

    fn take_still(&mut self) {
        match self.capture.capture() {
            Ok(still) => {
                self.controller.store_capture(still.png);
                self.still_texture = None;
            }
            Err(e) => {
                self.alert = Some(e.to_string());
            }
        }
    }

    fn retake(&mut self) {
        self.controller.discard_capture();
        self.still_texture = None;
        if let Err(e) = self.capture.retake() {
            self.camera_error = Some(e.to_string());
        }
    }

    fn render_loading(&mut self, ui: &mut egui::Ui) {
        let name = self.controller.session().profile.name.clone();
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.4);
            ui.spinner();
            ui.add_space(8.0);
            if name.is_empty() {
                ui.label("Analyzing...");
            } else {
                ui.label(format!("Analyzing... reading {}'s lines", name));
            }
        });
    }

    fn render_result(&mut self, ui: &mut egui::Ui) {
        self.ensure_still_texture(ui.ctx());

        let mut go_back = false;
        ui.horizontal(|ui| {
            if ui.button("←").clicked() {
                go_back = true;
            }
            ui.label(
                egui::RichText::new("PALM ANALYSIS RESULT")
                    .small()
                    .color(egui::Color32::GRAY),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Copy").clicked() {
                    let text = self
                        .pager
                        .cards()
                        .iter()
                        .map(|c| format!("{}\n{}", c.label, c.content_text()))
                        .collect::<Vec<_>>()
                        .join("\n\n");
                    match arboard::Clipboard::new() {
                        Ok(mut clipboard) => {
                            let _ = clipboard.set_text(text);
                        }
                        Err(e) => eprintln!("Warning: could not access clipboard: {}", e),
                    }
                }
            });
        });
        if go_back {
            self.controller.back();
            self.still_texture = None;
            return;
        }

        // Split borrows: the overlay and pager render against the
        // session's result without cloning it.
        let Self {
            controller,
            overlay,
            pager,
            still_texture,
            ..
        } = self;
        let Some(result) = controller.session().analysis.as_ref() else {
            return;
        };

        let selected = selected_line(result, pager.active_index());

        let overlay_height = ui.available_height() * 0.42;
        ui.allocate_ui(egui::vec2(ui.available_width(), overlay_height), |ui| {
            if let Some(texture) = still_texture {
                overlay.show(ui, texture, result, selected);
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Captured image unavailable");
                });
            }
        });

        pager.show(ui);
    }
}

impl eframe::App for PalmFlowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();
        self.sync_camera();
        if self.controller.captured_image().is_none() {
            self.still_texture = None;
        }

        let panel_frame = egui::Frame::default().inner_margin(egui::Margin::same(12));
        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                self.show_alert(ui);
                match self.controller.scene() {
                    Scene::Login => {
                        if forms::login(ui) == FormEvent::Next {
                            self.controller.start();
                        }
                    }
                    Scene::Profile => match forms::profile(ui, self.controller.profile_mut()) {
                        FormEvent::Next => {
                            // Refusal is silent; the button is disabled
                            // until the guard passes anyway.
                            self.controller.complete_profile();
                        }
                        FormEvent::Back => self.controller.back(),
                        FormEvent::None => {}
                    },
                    Scene::ModeChoice => {
                        let name = self.controller.session().profile.name.clone();
                        match forms::mode_choice(ui, &name) {
                            ModeEvent::Pick(mode) => self.controller.choose_mode(mode),
                            ModeEvent::Back => self.controller.back(),
                            ModeEvent::None => {}
                        }
                    }
                    Scene::CaptureFace => self.render_capture(ui, CaptureMode::Face),
                    Scene::CaptureHand => self.render_capture(ui, CaptureMode::Hand),
                    Scene::Loading => self.render_loading(ui),
                    Scene::Result => self.render_result(ui),
                }
            });
    }
}

/// Paints a texture aspect-fitted and centered inside `avail`.
fn paint_fitted(ui: &egui::Ui, avail: egui::Rect, texture: &egui::TextureHandle) {
    let size = texture.size_vec2();
    let image_size = ImageSize {
        width: size.x as u32,
        height: size.y as u32,
    };
    let rect = overlay::fit_rect(avail, image_size);
    ui.painter().image(
        texture.id(),
        rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}
