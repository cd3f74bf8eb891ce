use thiserror::Error;

pub const SUBMISSION_FAILED_MESSAGE: &str = "Error finding similar artworks. Please try again.";

/// The only failure a submission can surface. Transport faults, non-2xx
/// statuses, timeouts and undecodable bodies all collapse into it; `cause`
/// is kept for logs and never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error finding similar artworks. Please try again.")]
pub struct SubmissionFailed {
    cause: String,
}

impl SubmissionFailed {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }

    pub fn user_message(&self) -> &'static str {
        SUBMISSION_FAILED_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_hides_cause_behind_fixed_message() {
        let err = SubmissionFailed::new("connection refused (os error 111)");
        assert_eq!(err.to_string(), SUBMISSION_FAILED_MESSAGE);
        assert_eq!(err.user_message(), SUBMISSION_FAILED_MESSAGE);
        assert_eq!(err.cause(), "connection refused (os error 111)");
    }
}
