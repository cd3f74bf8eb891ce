use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::workflow::SearchWorkflow;
use crate::media::IMAGE_EXTENSIONS;
use crate::ui::results::{project, show_results, ArtworkImages, ResultsSection};

const PREVIEW_DISPLAY_HEIGHT: f32 = 300.0;

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

pub struct DesktopGuiApp {
    ui_rx: Receiver<UiEvent>,
    workflow: SearchWorkflow,
    artwork_images: ArtworkImages,
    status_banner: Option<StatusBanner>,
    endpoint: String,
}

impl DesktopGuiApp {
    pub fn bootstrap(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        endpoint: String,
    ) -> Self {
        let mut workflow = SearchWorkflow::new(cmd_tx);
        workflow.check_service_health();
        Self {
            ui_rx,
            workflow,
            artwork_images: ArtworkImages::default(),
            status_banner: None,
            endpoint,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.workflow.on_backend_info(message);
                }
                UiEvent::Error(message) => {
                    self.workflow.set_status(message.clone());
                    self.status_banner = Some(StatusBanner { message });
                }
                UiEvent::SubmissionResolved {
                    request_id,
                    outcome,
                } => {
                    self.workflow.on_submission_resolved(request_id, outcome);
                }
                UiEvent::ArtworkImageLoaded {
                    request_id,
                    url,
                    image,
                } => {
                    self.artwork_images.insert_loaded(request_id, url, image);
                }
                UiEvent::ArtworkImageFailed {
                    request_id,
                    url,
                    reason,
                } => {
                    tracing::debug!(%request_id, %url, %reason, "artwork thumbnail unavailable");
                    self.artwork_images.insert_failed(request_id, url, reason);
                }
            }
        }
        self.artwork_images
            .sync_with(self.workflow.state().latest_request());
    }

    fn pick_image(&mut self) {
        fn default_image_dir() -> Option<PathBuf> {
            dirs::picture_dir()
                .or_else(dirs::desktop_dir)
                .or_else(dirs::home_dir)
        }

        let mut dialog = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
        if let Some(dir) = default_image_dir() {
            dialog = dialog.set_directory(dir);
        }
        if self.workflow.on_file_selected(dialog.pick_file()) {
            self.artwork_images
                .sync_with(self.workflow.state().latest_request());
        }
    }

    /// Queues a download for every listed artwork not yet requested.
    fn request_missing_artwork_images(&mut self) {
        let Some(request_id) = self.workflow.state().latest_request() else {
            return;
        };
        let urls: Vec<String> = match project(self.workflow.state()) {
            ResultsSection::Shown(entries) => entries
                .iter()
                .map(|entry| entry.image_url.to_string())
                .collect(),
            ResultsSection::Hidden => return,
        };
        for url in urls {
            if self.artwork_images.begin_loading(&url)
                && !self.workflow.request_artwork_image(request_id, &url)
            {
                self.artwork_images.insert_failed(
                    request_id,
                    url,
                    "could not queue download".to_string(),
                );
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("app_header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new("Art Recommender").size(28.0).strong());
            });
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.workflow.status());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.endpoint);
                });
            });
        });
    }

    fn show_uploaded_preview(&mut self, ui: &mut egui::Ui) {
        let Some((preview, handle)) = self.workflow.displayed_preview() else {
            return;
        };
        let file_name = preview.file_name.clone();
        let size_kib = handle.size_bytes().div_ceil(1024);

        ui.add_space(12.0);
        ui.label(egui::RichText::new("Your Uploaded Artwork").size(18.0).strong());
        match handle.texture(ui.ctx()) {
            Some(texture) => {
                let [width, height] = texture.size();
                let scale = (PREVIEW_DISPLAY_HEIGHT / height.max(1) as f32).min(1.0);
                let size = egui::vec2(width as f32 * scale, height as f32 * scale);
                ui.add(egui::Image::new((texture.id(), size)).corner_radius(6.0))
                    .on_hover_text(format!("{file_name} ({size_kib} KiB)"));
            }
            None => {
                ui.weak(format!("{file_name} (no preview available)"));
            }
        }
    }

    fn show_main_workspace(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.show_status_banner(ui);

                    ui.vertical_centered(|ui| {
                        ui.add_space(8.0);
                        let upload = egui::Button::new(
                            egui::RichText::new("⬆ Upload Artwork").size(18.0),
                        )
                        .min_size(egui::vec2(200.0, 40.0));
                        if ui.add(upload).clicked() {
                            self.pick_image();
                        }

                        self.show_uploaded_preview(ui);

                        let state = self.workflow.state();
                        if state.is_submitting() {
                            ui.add_space(12.0);
                            ui.add(egui::Spinner::new().size(32.0));
                        }
                        if let Some(message) = state.error_message() {
                            ui.add_space(8.0);
                            ui.colored_label(ui.visuals().error_fg_color, message);
                        }
                    });

                    let section = project(self.workflow.state());
                    show_results(ui, &section, &mut self.artwork_images);
                });
        });
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.request_missing_artwork_images();

        self.show_top_bar(ctx);
        self.show_main_workspace(ctx);

        if self.workflow.state().is_submitting() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
