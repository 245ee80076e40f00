//! Error types for the upload workflow.
//!
//! None of these reach the user as text: intake rejections show up as the
//! reject border on the drop target and upload errors collapse into
//! [`ClassificationResult::Failure`](crate::ClassificationResult::Failure).
//! They exist so the causes can be logged and tested.

use thiserror::Error;

/// Why a drop or picker selection did not become a selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeRejection {
    #[error("no file was offered")]
    Empty,
    #[error("{count} files offered, at most {max} accepted")]
    TooManyFiles { count: usize, max: usize },
    #[error("{mime:?} is not an image type")]
    NotAnImage { mime: String },
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("file could not be read: {0}")]
    Unreadable(String),
    #[error("image could not be decoded: {0}")]
    Undecodable(String),
    #[error("an upload is in flight")]
    Busy,
}

/// Failure causes of a single classification request.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
    #[error("upload worker exited without a result")]
    WorkerLost,
}

/// An action was requested in a state that does not offer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {state}")]
pub struct TransitionError {
    pub action: &'static str,
    pub state: &'static str,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("config file could not be parsed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("http client could not be built: {0}")]
    Client(#[from] reqwest::Error),
}
