//! Backend commands queued from UI to backend worker.

use client_core::ImagePayload;
use shared::domain::RequestId;

#[derive(Debug)]
pub enum BackendCommand {
    Submit {
        request_id: RequestId,
        image: ImagePayload,
    },
    FetchArtworkImage {
        request_id: RequestId,
        url: String,
    },
    CheckHealth,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Submit { .. } => "submit",
            BackendCommand::FetchArtworkImage { .. } => "fetch_artwork_image",
            BackendCommand::CheckHealth => "check_health",
        }
    }
}
