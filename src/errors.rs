use tokio::task::JoinError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AvatarError>;

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unsupported source: {0}")]
    Unsupported(String),
    #[error("Invalid color: {0}")]
    Color(String),
    #[error("Parsing error")]
    Parse,
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Request was cancelled")]
    Cancelled,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for AvatarError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}

impl From<url::ParseError> for AvatarError {
    fn from(_: url::ParseError) -> Self {
        Self::Parse
    }
}

impl From<JoinError> for AvatarError {
    fn from(value: JoinError) -> Self {
        Self::Other(anyhow::anyhow!(value.to_string()))
    }
}
