//! Error types for sapi-client.

use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by the platform speech engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EngineError(String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Usage(String),

    #[error("option -s requires -v")]
    SsmlRequiresVoice,

    #[error("nothing to speak")]
    NoText,

    #[error("voice not found: {0}")]
    VoiceNotFound(String),

    #[error("rate is out of range: {0}")]
    RateOutOfRange(i32),

    #[error("voice token id carries no locale: {0}")]
    MalformedVoiceId(String),

    #[error("failed to read {}: {source}", .path.display())]
    Input { path: PathBuf, source: IoError },

    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("speech engine error: {0}")]
    Engine(#[from] EngineError),
}

impl ClientError {
    /// Whether the usage text should follow the message.
    pub fn shows_usage(&self) -> bool {
        matches!(
            self,
            Self::Usage(_) | Self::SsmlRequiresVoice | Self::NoText
        )
    }
}

impl From<clap::Error> for ClientError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.to_string();
        let first = rendered.lines().next().unwrap_or_default();
        Self::Usage(first.trim_start_matches("error: ").to_string())
    }
}
