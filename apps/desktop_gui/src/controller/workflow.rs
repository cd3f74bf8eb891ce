//! Owns the single [`SearchState`] and is the only place that issues network work.

use std::path::PathBuf;

use client_core::SubmissionFailed;
use crossbeam_channel::Sender;
use shared::domain::{MatchRecord, RequestId};
use tracing::{debug, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{reduce, Effect, SearchAction, SearchState};
use crate::media::{ImageAcquisition, LocalImageHandle, PreviewRef};

pub struct SearchWorkflow {
    cmd_tx: Sender<BackendCommand>,
    state: SearchState,
    acquisition: ImageAcquisition,
    status: String,
}

impl SearchWorkflow {
    pub fn new(cmd_tx: Sender<BackendCommand>) -> Self {
        Self {
            cmd_tx,
            state: SearchState::default(),
            acquisition: ImageAcquisition::new(),
            status: "Choose an artwork image to find similar pieces".to_string(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Free-form status line; never part of the search state.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// The preview the state refers to, with the local handle that backs it.
    /// `None` when nothing is selected or the handle belongs to another selection.
    pub fn displayed_preview(&mut self) -> Option<(&PreviewRef, &mut LocalImageHandle)> {
        let preview = self.state.preview()?;
        let handle = self.acquisition.current_mut()?;
        if handle.preview_id() != preview.id {
            warn!(
                expected = %preview.id,
                held = %handle.preview_id(),
                "local preview does not match search state"
            );
            return None;
        }
        Some((preview, handle))
    }

    /// Handles a file-picker result. Returns `true` when a submission was queued.
    pub fn on_file_selected(&mut self, selection: Option<PathBuf>) -> bool {
        let (image, preview) = match self.acquisition.select(selection) {
            Ok(Some(selected)) => selected,
            Ok(None) => {
                debug!("file picker closed without a selection");
                return false;
            }
            Err(err) => {
                warn!(error = format!("{err:#}"), "could not read selected image");
                self.status = format!("Could not read the selected file: {err:#}");
                return false;
            }
        };

        let transition = reduce(&self.state, SearchAction::ImageSelected(preview));
        self.state = transition.state;
        let Some(Effect::Submit(request_id)) = transition.effect else {
            return false;
        };

        info!(
            %request_id,
            file = %image.file_name,
            size_bytes = image.bytes.len(),
            "submitting image for similarity search"
        );
        self.status = format!("Searching for artworks similar to {}", image.file_name);

        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Submit { request_id, image },
            &mut self.status,
        );
        if !queued {
            let queue_status = std::mem::take(&mut self.status);
            self.on_submission_resolved(
                request_id,
                Err(SubmissionFailed::new("submission could not be queued")),
            );
            self.status = queue_status;
        }
        queued
    }

    pub fn on_submission_resolved(
        &mut self,
        request_id: RequestId,
        outcome: Result<Vec<MatchRecord>, SubmissionFailed>,
    ) {
        if !self.state.accepts(request_id) {
            debug!(
                %request_id,
                latest = ?self.state.latest_request(),
                "discarding result of superseded submission"
            );
            return;
        }

        match &outcome {
            Ok(records) => {
                info!(%request_id, matches = records.len(), "similarity search succeeded");
                self.status = match records.len() {
                    0 => "No similar artworks found".to_string(),
                    1 => "Found 1 similar artwork".to_string(),
                    n => format!("Found {n} similar artworks"),
                };
            }
            Err(err) => {
                warn!(%request_id, cause = err.cause(), "similarity search failed");
                self.status = "Search failed".to_string();
            }
        }

        self.state = reduce(
            &self.state,
            SearchAction::ResponseReceived {
                request_id,
                outcome,
            },
        )
        .state;
    }

    /// Informational worker messages never replace the progress line of a
    /// running search.
    pub fn on_backend_info(&mut self, message: String) {
        if self.state.is_submitting() {
            debug!(%message, "keeping search status over backend info");
            return;
        }
        self.status = message;
    }

    pub fn request_artwork_image(&mut self, request_id: RequestId, url: &str) -> bool {
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchArtworkImage {
                request_id,
                url: url.to_string(),
            },
            &mut self.status,
        )
    }

    pub fn check_service_health(&mut self) {
        dispatch_backend_command(&self.cmd_tx, BackendCommand::CheckHealth, &mut self.status);
    }
}
