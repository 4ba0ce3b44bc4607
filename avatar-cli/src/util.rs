use std::path::{Path, PathBuf};
use std::sync::Arc;

use avatarlib::Theme;
use image::RgbaImage;

use crate::error::AppError;

pub fn load_theme(path: &Option<PathBuf>) -> Result<Arc<Theme>, AppError> {
    match path {
        Some(path) => {
            println!("Theme provided explicitly:\n\t{}", path.display());
            Theme::load(path)
                .map(Arc::new)
                .map_err(|e| AppError::ThemeLoadError(e.to_string()))
        }
        None => Ok(Arc::new(Theme::default())),
    }
}

pub fn save_png(image: &RgbaImage, out: &Path) -> Result<(), AppError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AppError::NothingRendered);
    }
    image
        .save(out)
        .map_err(|e| AppError::ImageSaveError(e.to_string()))?;
    println!("Saved {}x{} image to {}", image.width(), image.height(), out.display());
    Ok(())
}
