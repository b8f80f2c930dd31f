//! Centralized error types for GenzFact.

use thiserror::Error;

/// Warning shown when a submission carries neither text nor a file.
pub const EMPTY_SUBMISSION_MESSAGE: &str = "Please provide some text or upload a file to analyze.";

/// Main error type for GenzFact operations.
#[derive(Error, Debug)]
pub enum GenzError {
    #[error("{}", EMPTY_SUBMISSION_MESSAGE)]
    EmptySubmission,

    #[error("Unsupported file type: '{0}' (accepted: pdf, doc, txt, png, jpg, jpeg, mp3, wav)")]
    UnsupportedFileType(String),

    #[error("Upload too large: {size} bytes exceeds the limit of {limit} bytes")]
    UploadTooLarge { size: usize, limit: usize },

    #[error("{0}")]
    Model(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("The model returned no text")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for GenzFact operations.
pub type GenzResult<T> = Result<T, GenzError>;

impl GenzError {
    /// Create a model (remote call) error.
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is a problem with the user's input rather than a failure.
    ///
    /// Input errors are surfaced as warnings and never reach the model.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptySubmission | Self::UnsupportedFileType(_) | Self::UploadTooLarge { .. }
        )
    }
}
