//! Search workflow state and its pure transition function.
//!
//! ```text
//! Idle ──select──▶ Submitting ──2xx──▶ Succeeded
//!                     │  ▲                 │
//!            failure  │  └─────select──────┤
//!                     ▼                    │
//!                   Failed ───select───────┘
//! ```
//!
//! Every selection allocates a fresh [`RequestId`]. Only the response for the
//! latest request, and only while still `Submitting`, can move the state;
//! anything else is dropped without effect.

use client_core::SubmissionFailed;
use shared::domain::{MatchRecord, RequestId};

use crate::media::PreviewRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    status: SearchStatus,
    preview: Option<PreviewRef>,
    results: Vec<MatchRecord>,
    error_message: Option<String>,
    latest_request: Option<RequestId>,
}

impl SearchState {
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn preview(&self) -> Option<&PreviewRef> {
        self.preview.as_ref()
    }

    /// Matches in the order the service ranked them.
    pub fn results(&self) -> &[MatchRecord] {
        &self.results
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest_request
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SearchStatus::Submitting
    }

    /// Whether a response for `request_id` would be applied.
    pub fn accepts(&self, request_id: RequestId) -> bool {
        self.is_submitting() && self.latest_request == Some(request_id)
    }
}

#[derive(Debug, Clone)]
pub enum SearchAction {
    ImageSelected(PreviewRef),
    ResponseReceived {
        request_id: RequestId,
        outcome: Result<Vec<MatchRecord>, SubmissionFailed>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Dispatch exactly one upload tagged with this id.
    Submit(RequestId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SearchState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn unchanged(state: &SearchState) -> Self {
        Self {
            state: state.clone(),
            effect: None,
        }
    }
}

pub fn reduce(state: &SearchState, action: SearchAction) -> Transition {
    match action {
        SearchAction::ImageSelected(preview) => {
            let request_id = state
                .latest_request
                .map_or(RequestId(1), RequestId::next);
            Transition {
                state: SearchState {
                    status: SearchStatus::Submitting,
                    preview: Some(preview),
                    results: Vec::new(),
                    error_message: None,
                    latest_request: Some(request_id),
                },
                effect: Some(Effect::Submit(request_id)),
            }
        }
        SearchAction::ResponseReceived {
            request_id,
            outcome,
        } => {
            if !state.accepts(request_id) {
                return Transition::unchanged(state);
            }
            let next = match outcome {
                Ok(records) => SearchState {
                    status: SearchStatus::Succeeded,
                    results: records,
                    error_message: None,
                    ..state.clone()
                },
                // results stay as they were
                Err(err) => SearchState {
                    status: SearchStatus::Failed,
                    error_message: Some(err.user_message().to_string()),
                    ..state.clone()
                },
            };
            Transition {
                state: next,
                effect: None,
            }
        }
    }
}
