use std::path::Path;

use async_trait::async_trait;
use image::RgbaImage;
use log::{debug, trace};
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::descriptor::ImageSource;
use crate::transform::{apply_all, TargetSize, Transformation};
use crate::{AvatarError, Result};

/// Everything a loader needs to turn a reference into pixels.
#[derive(PartialEq, Clone, Debug)]
pub struct LoadRequest {
    pub source: ImageSource,
    pub transformations: Vec<Transformation>,
    pub size: TargetSize,
}

impl LoadRequest {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            transformations: vec![],
            size: TargetSize::ORIGINAL,
        }
    }

    pub fn transform(mut self, transformation: Transformation) -> Self {
        self.transformations.push(transformation);
        self
    }

    pub fn size(mut self, size: TargetSize) -> Self {
        self.size = size;
        self
    }

    /// Shapes and scales a decoded image. Corner radii are given in output
    /// pixels, so those transformations run after scaling; the rest run on
    /// the source pixels.
    pub fn finish(&self, image: RgbaImage) -> Result<RgbaImage> {
        let (sized, shaping): (Vec<Transformation>, Vec<Transformation>) = self
            .transformations
            .iter()
            .copied()
            .partition(|t| t.is_output_sized());
        let image = apply_all(image, &shaping)?;
        apply_all(self.size.apply(image), &sized)
    }
}

#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, request: LoadRequest) -> Result<RgbaImage>;
}

/// Reads local files and fetches remote images over HTTP(S), then decodes
/// and transforms them off the async threads.
pub struct DefaultImageLoader {
    client: reqwest::Client,
}

impl DefaultImageLoader {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "User-Agent",
            HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read_local(&self, path: &Path) -> Result<Vec<u8>> {
        trace!("Reading image from {}", path.display());
        Ok(tokio::fs::read(path).await?)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Vec<u8>> {
        trace!("Fetching image from {}", url);
        let bytes = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageLoader for DefaultImageLoader {
    async fn load(&self, request: LoadRequest) -> Result<RgbaImage> {
        if let Some(frame) = request
            .transformations
            .iter()
            .find(|t| matches!(t, Transformation::VideoFrame { .. }))
        {
            return Err(AvatarError::Unsupported(format!(
                "{:?} of {}",
                frame, request.source
            )));
        }

        let bytes = match &request.source {
            ImageSource::Local(path) => self.read_local(path).await?,
            ImageSource::Remote(url) => self.fetch_remote(url).await?,
        };
        debug!("Loaded {} bytes from {}", bytes.len(), request.source);

        tokio::task::spawn_blocking(move || -> Result<RgbaImage> {
            let image = image::load_from_memory(&bytes)?.to_rgba8();
            request.finish(image)
        })
        .await?
    }
}
