//! Image previews inside chat bubbles.

use std::str::FromStr;
use std::sync::Arc;

use image::RgbaImage;
use log::error;
use tokio_util::sync::CancellationToken;

use crate::descriptor::{ImageSource, PlaceholderIcon};
use crate::loader::{ImageLoader, LoadRequest};
use crate::theme::{Dimen, ResourceProvider};
use crate::transform::{TargetSize, Transformation};
use crate::{AvatarError, Result};

const VIDEO_EXTENSIONS: &[&str] =
    &["mp4", "m4v", "mkv", "webm", "3gp", "mov", "avi", "mpeg", "mpg", "ts"];

/// Shown in the bubble while the preview is loading.
pub const BUBBLE_PLACEHOLDER: PlaceholderIcon = PlaceholderIcon::ImageSquare;

pub fn is_video_extension(extension: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum BubbleLayout {
    /// One cell of a multi-file grid: fixed square.
    Grid,
    /// A lone file: bounded height, free width.
    Single,
}

#[derive(Clone, Debug)]
pub enum BubblePreview {
    /// Nothing to show, no load was attempted.
    Empty,
    Loaded(RgbaImage),
    /// The load failed; the bubble hides its image view.
    Hidden,
}

pub struct BubblePreviewer {
    loader: Arc<dyn ImageLoader>,
    resources: Arc<dyn ResourceProvider>,
}

impl BubblePreviewer {
    pub fn new(
        loader: Arc<dyn ImageLoader>,
        resources: Arc<dyn ResourceProvider>,
    ) -> Self {
        Self { loader, resources }
    }

    pub fn request(
        &self,
        source: ImageSource,
        layout: BubbleLayout,
    ) -> LoadRequest {
        let dimen = match layout {
            BubbleLayout::Grid => Dimen::ChatBubbleGridImageSize,
            BubbleLayout::Single => Dimen::ChatBubbleBigImageMaxSize,
        };
        let side = self.resources.dimension_px(dimen);
        let size = match layout {
            BubbleLayout::Grid => TargetSize::square(side),
            BubbleLayout::Single => TargetSize::height(side),
        };
        let radius = self
            .resources
            .dimension(Dimen::ChatBubbleImagesRoundedCornerRadius);

        let request = LoadRequest::new(source).size(size);
        match request.source.extension().as_deref() {
            Some(ext) if is_video_extension(ext) => request
                .transform(Transformation::VideoFrame { millis: 0 })
                .transform(Transformation::RoundedCorners(radius)),
            // rounding would flatten the animation
            Some("gif") => request,
            _ => request.transform(Transformation::RoundedCorners(radius)),
        }
    }

    pub async fn load(
        &self,
        file: &str,
        layout: BubbleLayout,
        cancel: &CancellationToken,
    ) -> Result<BubblePreview> {
        if file.is_empty() {
            return Ok(BubblePreview::Empty);
        }
        let source = match ImageSource::from_str(file) {
            Ok(source) => source,
            Err(e) => {
                error!("Invalid chat bubble file reference [{}]: {}", file, e);
                return Ok(BubblePreview::Hidden);
            }
        };
        let is_video = source
            .extension()
            .map(|ext| is_video_extension(&ext))
            .unwrap_or(false);
        let request = self.request(source, layout);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AvatarError::Cancelled),
            result = self.loader.load(request) => result,
        };
        match result {
            Ok(image) => Ok(BubblePreview::Loaded(image)),
            Err(e) if is_video => {
                error!("Error getting preview picture from video? [{}]: {}", file, e);
                Ok(BubblePreview::Hidden)
            }
            Err(e) => {
                error!("Error getting picture from file [{}]: {}", file, e);
                Ok(BubblePreview::Hidden)
            }
        }
    }
}
