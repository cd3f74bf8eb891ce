//! Result section: a read-only projection of [`SearchState`] plus the
//! thumbnails fetched for the artworks it lists.

use std::collections::HashMap;

use shared::domain::RequestId;

use crate::controller::reducer::{SearchState, SearchStatus};
use crate::media::PreviewImage;

const CARD_WIDTH: f32 = 260.0;
const CARD_IMAGE_HEIGHT: f32 = 220.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry<'a> {
    /// 1-based position in the service's ranking.
    pub rank: usize,
    pub title: &'a str,
    pub artist: &'a str,
    pub date: &'a str,
    pub image_url: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsSection<'a> {
    Hidden,
    Shown(Vec<ResultEntry<'a>>),
}

pub fn project(state: &SearchState) -> ResultsSection<'_> {
    let shown = match state.status() {
        SearchStatus::Idle => false,
        SearchStatus::Succeeded => true,
        SearchStatus::Submitting | SearchStatus::Failed => !state.results().is_empty(),
    };
    if !shown {
        return ResultsSection::Hidden;
    }

    ResultsSection::Shown(
        state
            .results()
            .iter()
            .enumerate()
            .map(|(index, record)| ResultEntry {
                rank: index + 1,
                title: &record.title,
                artist: &record.artist,
                date: &record.date,
                image_url: &record.image_url,
            })
            .collect(),
    )
}

pub enum ArtworkImageState {
    Loading,
    Ready {
        image: PreviewImage,
        texture: Option<egui::TextureHandle>,
    },
    Error(String),
}

/// Thumbnails for the entries of one submission, keyed by image URL.
#[derive(Default)]
pub struct ArtworkImages {
    request_id: Option<RequestId>,
    images: HashMap<String, ArtworkImageState>,
}

impl ArtworkImages {
    /// Drops every thumbnail once the submission they belong to is superseded.
    pub fn sync_with(&mut self, latest: Option<RequestId>) {
        if self.request_id != latest {
            self.request_id = latest;
            self.images.clear();
        }
    }

    /// Marks `url` as in flight. Returns `true` only the first time, so each
    /// image is requested once per submission.
    pub fn begin_loading(&mut self, url: &str) -> bool {
        if self.images.contains_key(url) {
            return false;
        }
        self.images
            .insert(url.to_string(), ArtworkImageState::Loading);
        true
    }

    pub fn insert_loaded(&mut self, request_id: RequestId, url: String, image: PreviewImage) {
        if self.request_id == Some(request_id) {
            self.images.insert(
                url,
                ArtworkImageState::Ready {
                    image,
                    texture: None,
                },
            );
        }
    }

    pub fn insert_failed(&mut self, request_id: RequestId, url: String, reason: String) {
        if self.request_id == Some(request_id) {
            self.images.insert(url, ArtworkImageState::Error(reason));
        }
    }

    fn get_mut(&mut self, url: &str) -> Option<&mut ArtworkImageState> {
        self.images.get_mut(url)
    }
}

pub fn show_results(ui: &mut egui::Ui, section: &ResultsSection<'_>, images: &mut ArtworkImages) {
    let ResultsSection::Shown(entries) = section else {
        return;
    };

    ui.add_space(12.0);
    ui.heading("Similar Artworks");
    ui.add_space(6.0);

    if entries.is_empty() {
        ui.weak("No similar artworks were returned for this image.");
        return;
    }

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
        for entry in entries {
            show_result_card(ui, entry, images);
        }
    });
}

fn show_result_card(ui: &mut egui::Ui, entry: &ResultEntry<'_>, images: &mut ArtworkImages) {
    egui::Frame::group(ui.style())
        .corner_radius(8.0)
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH);
            ui.vertical(|ui| {
                show_artwork_image(ui, entry, images);
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(format!("{}. {}", entry.rank, entry.title))
                        .strong()
                        .size(16.0),
                );
                if !entry.artist.is_empty() {
                    ui.weak(entry.artist);
                }
                if !entry.date.is_empty() {
                    ui.weak(entry.date);
                }
            });
        });
}

fn show_artwork_image(ui: &mut egui::Ui, entry: &ResultEntry<'_>, images: &mut ArtworkImages) {
    let ctx = ui.ctx().clone();
    let slot = egui::vec2(CARD_WIDTH, CARD_IMAGE_HEIGHT);

    match images.get_mut(entry.image_url) {
        Some(ArtworkImageState::Ready { image, texture }) => {
            let texture = texture.get_or_insert_with(|| {
                ctx.load_texture(
                    format!("artwork_{}", entry.image_url),
                    image.to_color_image(),
                    egui::TextureOptions::LINEAR,
                )
            });
            let size = fit_within(egui::vec2(image.width as f32, image.height as f32), slot);
            ui.allocate_ui(slot, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.add(egui::Image::new((texture.id(), size)).corner_radius(4.0))
                        .on_hover_text(entry.title);
                });
            });
        }
        Some(ArtworkImageState::Error(reason)) => {
            ui.allocate_ui(slot, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(
                        ui.visuals().error_fg_color,
                        format!("Couldn't load image: {reason}"),
                    );
                });
            });
        }
        Some(ArtworkImageState::Loading) | None => {
            ui.allocate_ui(slot, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            });
        }
    }
}

fn fit_within(size: egui::Vec2, bounds: egui::Vec2) -> egui::Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.x / size.x).min(bounds.y / size.y).min(1.0);
    size * scale
}
