//! Error types for Tubechat.

use thiserror::Error;

/// Library-level error type for Tubechat operations.
///
/// Variants fall into two groups: caller mistakes (invalid input, operating on
/// state that does not exist) and external failures (transcript fetch, embedding,
/// LLM calls). The HTTP layer maps the former to 400 and the latter to 500.
#[derive(Error, Debug)]
pub enum TubechatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No videos loaded. Process at least one video first.")]
    NoSession,

    #[error("Video {0} is already loaded.")]
    DuplicateVideo(String),

    #[error("Video {0} not found in session.")]
    UnknownVideo(String),

    #[error("Cannot remove the last video in the session.")]
    LastVideo,

    #[error("Failed to download transcript: {0}")]
    Transcript(String),

    #[error("Transcript is empty or unavailable for video {0}.")]
    EmptyTranscript(String),

    #[error("Failed to build RAG pipeline: {0}")]
    PipelineBuild(String),

    #[error("Error while querying: {0}")]
    Query(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TubechatError {
    /// True for errors caused by the caller rather than an external service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TubechatError::InvalidInput(_)
                | TubechatError::NoSession
                | TubechatError::DuplicateVideo(_)
                | TubechatError::UnknownVideo(_)
                | TubechatError::LastVideo
        )
    }
}

/// Result type alias for Tubechat operations.
pub type Result<T> = std::result::Result<T, TubechatError>;
