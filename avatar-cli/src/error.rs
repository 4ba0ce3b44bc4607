use avatarlib::AvatarError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not load theme: {0}")]
    ThemeLoadError(String),

    #[error("Invalid image reference: {0}")]
    InvalidImageReference(String),

    #[error("Failed to save image: {0}")]
    ImageSaveError(String),

    #[error("Nothing was rendered")]
    NothingRendered,

    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error(transparent)]
    AvatarError(#[from] AvatarError),
}
