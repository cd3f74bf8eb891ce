//! Events flowing from the backend worker back to the UI thread.

use client_core::SubmissionFailed;
use shared::domain::{MatchRecord, RequestId};

use crate::media::PreviewImage;

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    Error(String),
    SubmissionResolved {
        request_id: RequestId,
        outcome: Result<Vec<MatchRecord>, SubmissionFailed>,
    },
    ArtworkImageLoaded {
        request_id: RequestId,
        url: String,
        image: PreviewImage,
    },
    ArtworkImageFailed {
        request_id: RequestId,
        url: String,
        reason: String,
    },
}
