use std::time::Duration;

use thiserror::Error;

pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Every way an analysis attempt can fail.
///
/// The session collapses all of them into one display string through
/// [`AnalysisError::user_message`]; the kind is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("{message}")]
    Transport { message: String },
    #[error("analysis request timed out after {after:?}")]
    Timeout { after: Duration },
    #[error("analysis service returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("{message}")]
    Decode { message: String },
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Transport { .. } => "transport",
            AnalysisError::Timeout { .. } => "timeout",
            AnalysisError::Rejected { .. } => "rejected",
            AnalysisError::Decode { .. } => "decode",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Rejected { body, .. } => non_empty_or(body, UPLOAD_FAILED_MESSAGE),
            AnalysisError::Transport { message } | AnalysisError::Decode { message } => {
                non_empty_or(message, GENERIC_FAILURE_MESSAGE)
            }
            AnalysisError::Timeout { .. } => self.to_string(),
        }
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
