use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::trace;
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, Mask, Path, PathBuilder, Transform};

use crate::surface::{image_from_pixmap, pixmap_from_image};
use crate::{AvatarError, Result};

#[derive(PartialEq, Clone, Copy, Debug, Deserialize, Serialize)]
pub enum Transformation {
    CircleCrop,
    RoundedCorners(f32),
    /// Use the frame at `millis` of a video instead of a still image.
    VideoFrame { millis: u64 },
}

/// Requested output size. `None` on one side keeps the aspect ratio.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct TargetSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl TargetSize {
    pub const ORIGINAL: TargetSize = TargetSize {
        width: None,
        height: None,
    };

    pub fn square(side: u32) -> Self {
        Self {
            width: Some(side),
            height: Some(side),
        }
    }

    pub fn height(height: u32) -> Self {
        Self {
            width: None,
            height: Some(height),
        }
    }

    /// Scales `image` to fit inside the requested box.
    pub fn apply(&self, image: RgbaImage) -> RgbaImage {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return image;
        }
        let (target_width, target_height) = match (self.width, self.height) {
            (None, None) => return image,
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, scale_side(height, w, width)),
            (None, Some(h)) => (scale_side(width, h, height), h),
        };
        if (target_width, target_height) == (width, height) {
            return image;
        }

        let ratio = f64::min(
            target_width as f64 / width as f64,
            target_height as f64 / height as f64,
        );
        let fitted_width = ((width as f64 * ratio).round() as u32).max(1);
        let fitted_height = ((height as f64 * ratio).round() as u32).max(1);
        imageops::resize(&image, fitted_width, fitted_height, FilterType::Triangle)
    }
}

fn scale_side(side: u32, target: u32, reference: u32) -> u32 {
    ((side as u64 * target as u64) / reference.max(1) as u64).max(1) as u32
}

impl Transformation {
    /// Measured in output pixels, so it runs after the image is scaled.
    pub fn is_output_sized(&self) -> bool {
        matches!(self, Transformation::RoundedCorners(_))
    }

    pub fn apply(&self, image: RgbaImage) -> Result<RgbaImage> {
        trace!("Applying {:?} to {}x{} image", self, image.width(), image.height());
        match *self {
            Transformation::CircleCrop => circle_crop(&image),
            Transformation::RoundedCorners(radius) => {
                rounded_corners(&image, radius)
            }
            Transformation::VideoFrame { .. } => Err(AvatarError::Unsupported(
                "video frame extraction".to_owned(),
            )),
        }
    }
}

pub fn apply_all(
    mut image: RgbaImage,
    transformations: &[Transformation],
) -> Result<RgbaImage> {
    for transformation in transformations {
        image = transformation.apply(image)?;
    }
    Ok(image)
}

/// Center square of the image, masked by its inscribed circle.
pub fn circle_crop(image: &RgbaImage) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    let side = width.min(height);
    let square = imageops::crop_imm(
        image,
        (width - side) / 2,
        (height - side) / 2,
        side,
        side,
    )
    .to_image();

    let half = side as f32 / 2.0;
    let circle = PathBuilder::from_circle(half, half, half)
        .ok_or_else(|| AvatarError::Surface("empty circle".to_owned()))?;
    mask_with(&square, &circle)
}

pub fn rounded_corners(image: &RgbaImage, radius: f32) -> Result<RgbaImage> {
    let (width, height) = (image.width() as f32, image.height() as f32);
    let radius = radius.clamp(0.0, width.min(height) / 2.0);

    let mut pb = PathBuilder::new();
    pb.move_to(radius, 0.0);
    pb.line_to(width - radius, 0.0);
    pb.quad_to(width, 0.0, width, radius);
    pb.line_to(width, height - radius);
    pb.quad_to(width, height, width - radius, height);
    pb.line_to(radius, height);
    pb.quad_to(0.0, height, 0.0, height - radius);
    pb.line_to(0.0, radius);
    pb.quad_to(0.0, 0.0, radius, 0.0);
    pb.close();
    let path = pb
        .finish()
        .ok_or_else(|| AvatarError::Surface("empty rounded rect".to_owned()))?;
    mask_with(image, &path)
}

fn mask_with(image: &RgbaImage, path: &Path) -> Result<RgbaImage> {
    let mut pixmap = pixmap_from_image(image)?;
    let mut mask = Mask::new(pixmap.width(), pixmap.height())
        .ok_or_else(|| AvatarError::Surface("cannot allocate mask".to_owned()))?;
    mask.fill_path(path, FillRule::Winding, true, Transform::identity());
    pixmap.apply_mask(&mask);
    Ok(image_from_pixmap(&pixmap))
}
