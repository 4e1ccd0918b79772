// src/core/error.rs
//! Typed failures the HTTP layer maps to status codes. Everything else
//! travels as a plain `anyhow::Error`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    MissingUserId,
    MissingResume,
    InvalidInput(String),
    UpstreamMalformed(String),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::MissingUserId => "USER_ID_REQUIRED",
            PipelineError::MissingResume => "RESUME_REQUIRED",
            PipelineError::InvalidInput(_) => "INVALID_INPUT",
            PipelineError::UpstreamMalformed(_) => "UPSTREAM_MALFORMED",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            PipelineError::MissingUserId => vec!["Pass the userId of the current user".to_string()],
            PipelineError::MissingResume => vec![
                "Upload your resume first".to_string(),
                "Job discovery needs the skills extracted from a resume".to_string(),
            ],
            PipelineError::InvalidInput(_) => {
                vec!["Check the request fields and try again".to_string()]
            }
            PipelineError::UpstreamMalformed(_) => vec![
                "The AI service returned an unexpected answer".to_string(),
                "Try again in a few moments".to_string(),
            ],
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::MissingUserId => write!(f, "User ID required"),
            PipelineError::MissingResume => write!(f, "Please upload your resume first"),
            PipelineError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PipelineError::UpstreamMalformed(msg) => {
                write!(f, "Upstream returned a malformed response: {}", msg)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// Reject blank user ids before touching the store
pub fn require_user_id(user_id: &str) -> anyhow::Result<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::MissingUserId.into());
    }
    Ok(trimmed)
}
