use std::sync::Arc;

use futures::future::join_all;
use image::RgbaImage;
use log::{debug, trace, warn};
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::compositor::{Compositor, GridCompositor, MOSAIC_MAX_TILES};
use crate::descriptor::{
    AvatarDescriptor, AvatarState, Fallback, ImageSource, PlaceholderIcon,
};
use crate::loader::{ImageLoader, LoadRequest};
use crate::renderer::{AvatarRenderer, RenderSpec};
use crate::theme::{AvatarSize, ResourceProvider};
use crate::transform::{circle_crop, TargetSize, Transformation};
use crate::{AvatarError, Result};

/// The one thing an avatar ends up showing.
#[derive(Clone, Debug)]
pub enum Avatar {
    Placeholder(PlaceholderIcon),
    Image(RgbaImage),
    Mosaic(RgbaImage),
    Initials(RgbaImage),
}

#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum AvatarKind {
    Placeholder(PlaceholderIcon),
    Image,
    Mosaic,
    Initials,
}

impl Avatar {
    pub fn kind(&self) -> AvatarKind {
        match self {
            Avatar::Placeholder(icon) => AvatarKind::Placeholder(*icon),
            Avatar::Image(_) => AvatarKind::Image,
            Avatar::Mosaic(_) => AvatarKind::Mosaic,
            Avatar::Initials(_) => AvatarKind::Initials,
        }
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            Avatar::Placeholder(_) => None,
            Avatar::Image(image)
            | Avatar::Mosaic(image)
            | Avatar::Initials(image) => Some(image),
        }
    }
}

pub struct AvatarResolver {
    loader: Arc<dyn ImageLoader>,
    compositor: Arc<dyn Compositor>,
    resources: Arc<dyn ResourceProvider>,
}

impl AvatarResolver {
    pub fn new(
        loader: Arc<dyn ImageLoader>,
        resources: Arc<dyn ResourceProvider>,
    ) -> Self {
        Self {
            loader,
            compositor: Arc::new(GridCompositor),
            resources,
        }
    }

    pub fn with_compositor(self, compositor: Arc<dyn Compositor>) -> Self {
        Self { compositor, ..self }
    }

    pub fn resources(&self) -> &dyn ResourceProvider {
        self.resources.as_ref()
    }

    pub fn renderer(&self, preset: AvatarSize) -> AvatarRenderer {
        AvatarRenderer::new(RenderSpec::for_preset(self.resources(), preset))
    }

    /// Picks and produces exactly one representation for `descriptor`.
    ///
    /// Load failures never surface here: they fall back to a placeholder
    /// or to rendered initials. The only error is [`AvatarError::Cancelled`].
    pub async fn resolve(
        &self,
        descriptor: &AvatarDescriptor,
        preset: AvatarSize,
        cancel: &CancellationToken,
    ) -> Result<Avatar> {
        if cancel.is_cancelled() {
            return Err(AvatarError::Cancelled);
        }

        let state = descriptor.state();
        trace!("Resolving avatar {:?} at {:?}", state, preset);
        let avatar = match state {
            AvatarState::ForcedConference => {
                Avatar::Placeholder(PlaceholderIcon::Conference)
            }
            AvatarState::ForcedConversation => {
                Avatar::Placeholder(PlaceholderIcon::Conversation)
            }
            AvatarState::Single(source) => {
                match self.load_single(source, preset, cancel).await? {
                    Some(image) => Avatar::Image(image),
                    None => self.fallback(descriptor.fallback(), preset),
                }
            }
            AvatarState::Mosaic(images) => {
                match self.load_mosaic(images, preset, cancel).await? {
                    Some(image) => Avatar::Mosaic(image),
                    None => self.fallback(descriptor.fallback(), preset),
                }
            }
            AvatarState::Fallback(fallback) => self.fallback(fallback, preset),
        };
        debug!("Avatar resolved to {:?}", avatar.kind());
        Ok(avatar)
    }

    /// Runs [`resolve`](Self::resolve) on the current tokio runtime.
    ///
    /// Dropping the returned handle cancels the pending request.
    ///
    /// # Panics
    ///
    /// Panics when called outside the context of a tokio runtime.
    pub fn spawn(
        self: &Arc<Self>,
        descriptor: AvatarDescriptor,
        preset: AvatarSize,
    ) -> AvatarHandle {
        let token = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        let resolver = Arc::clone(self);
        let cancel = token.clone();
        tokio::spawn(async move {
            let result = resolver.resolve(&descriptor, preset, &cancel).await;
            if tx.send(result).is_err() {
                trace!("Avatar handle dropped before the request finished");
            }
        });
        AvatarHandle {
            token: token.clone(),
            rx,
            _guard: token.drop_guard(),
        }
    }

    /// Circle-cropped image; load errors are returned, not absorbed.
    pub async fn load_circle(
        &self,
        source: ImageSource,
        cancel: &CancellationToken,
    ) -> Result<RgbaImage> {
        let request =
            LoadRequest::new(source).transform(Transformation::CircleCrop);
        self.load_or_cancel(request, cancel).await?
    }

    /// The image as decoded, without any transformation.
    pub async fn load_plain(
        &self,
        source: ImageSource,
        cancel: &CancellationToken,
    ) -> Result<RgbaImage> {
        self.load_or_cancel(LoadRequest::new(source), cancel)
            .await?
    }

    pub fn initials_badge(&self, initials: &str) -> RgbaImage {
        self.renderer(AvatarSize::ListCell).build(initials)
    }

    fn fallback(&self, fallback: Fallback<'_>, preset: AvatarSize) -> Avatar {
        match fallback {
            Fallback::Placeholder(icon) => Avatar::Placeholder(icon),
            Fallback::Initials(initials) => {
                Avatar::Initials(self.renderer(preset).build(initials))
            }
        }
    }

    fn preset_px(&self, preset: AvatarSize) -> u32 {
        self.resources.dimension_px(preset.size_token())
    }

    async fn load_single(
        &self,
        source: &ImageSource,
        preset: AvatarSize,
        cancel: &CancellationToken,
    ) -> Result<Option<RgbaImage>> {
        let request = LoadRequest::new(source.clone())
            .transform(Transformation::CircleCrop)
            .size(TargetSize::square(self.preset_px(preset)));
        match self.load_or_cancel(request, cancel).await? {
            Ok(image) => Ok(Some(image)),
            Err(e) => {
                warn!("Failed to load avatar picture {}: {}", source, e);
                Ok(None)
            }
        }
    }

    /// Tiles that fail to load are left out. `None` when none loaded.
    async fn load_mosaic(
        &self,
        images: &[ImageSource],
        preset: AvatarSize,
        cancel: &CancellationToken,
    ) -> Result<Option<RgbaImage>> {
        let size = self.preset_px(preset);
        let loads = images.iter().take(MOSAIC_MAX_TILES).map(|source| {
            let request = LoadRequest::new(source.clone());
            async move { (source, self.load_or_cancel(request, cancel).await) }
        });

        let mut tiles = Vec::with_capacity(MOSAIC_MAX_TILES);
        for (source, result) in join_all(loads).await {
            match result? {
                Ok(tile) => tiles.push(tile),
                Err(e) => {
                    warn!("Skipping mosaic tile {}: {}", source, e);
                }
            }
        }
        if tiles.is_empty() {
            warn!("No mosaic tile could be loaded");
            return Ok(None);
        }

        match self
            .compositor
            .compose(&tiles, size)
            .and_then(|mosaic| circle_crop(&mosaic))
        {
            Ok(mosaic) => Ok(Some(mosaic)),
            Err(e) => {
                warn!("Failed to compose mosaic: {}", e);
                Ok(None)
            }
        }
    }

    /// Outer error: cancelled. Inner: whatever the loader reported.
    async fn load_or_cancel(
        &self,
        request: LoadRequest,
        cancel: &CancellationToken,
    ) -> Result<Result<RgbaImage>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AvatarError::Cancelled),
            result = self.loader.load(request) => Ok(result),
        }
    }
}

/// A resolution running in the background.
pub struct AvatarHandle {
    token: CancellationToken,
    rx: oneshot::Receiver<Result<Avatar>>,
    _guard: DropGuard,
}

impl AvatarHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn wait(self) -> Result<Avatar> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(AvatarError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use async_trait::async_trait;
    use image::Rgba;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves solid squares; names starting with `missing` fail and names
    /// starting with `slow` never finish in test time.
    #[derive(Default)]
    struct StubLoader {
        requests: Mutex<Vec<LoadRequest>>,
    }

    impl StubLoader {
        fn requests(&self) -> Vec<LoadRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageLoader for StubLoader {
        async fn load(&self, request: LoadRequest) -> Result<RgbaImage> {
            self.requests.lock().unwrap().push(request.clone());
            let name = request.source.to_string();
            if name.starts_with("missing") {
                return Err(AvatarError::Io(std::io::ErrorKind::NotFound.into()));
            }
            if name.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            request.finish(RgbaImage::from_pixel(64, 64, Rgba([200, 10, 10, 255])))
        }
    }

    fn source(name: &str) -> ImageSource {
        ImageSource::Local(PathBuf::from(name))
    }

    fn resolver() -> (Arc<StubLoader>, AvatarResolver) {
        let loader = Arc::new(StubLoader::default());
        let resolver =
            AvatarResolver::new(loader.clone(), Arc::new(Theme::default()));
        (loader, resolver)
    }

    async fn resolve(descriptor: &AvatarDescriptor) -> Avatar {
        let (_, resolver) = resolver();
        resolver
            .resolve(descriptor, AvatarSize::ListCell, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn forced_conference_never_loads() {
        let (loader, resolver) = resolver();
        let descriptor = AvatarDescriptor {
            images: vec![source("a.png"), source("b.png")],
            initials: "JD".to_owned(),
            force_conference_icon: true,
            ..Default::default()
        };
        let avatar = resolver
            .resolve(&descriptor, AvatarSize::Big, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            avatar.kind(),
            AvatarKind::Placeholder(PlaceholderIcon::Conference)
        );
        assert!(loader.requests().is_empty());
    }

    #[tokio::test]
    async fn forced_conversation_icon() {
        let descriptor = AvatarDescriptor {
            images: vec![source("a.png")],
            force_conversation_icon: true,
            ..Default::default()
        };
        assert_eq!(
            resolve(&descriptor).await.kind(),
            AvatarKind::Placeholder(PlaceholderIcon::Conversation)
        );
    }

    #[tokio::test]
    async fn single_image_is_circle_cropped() {
        let (loader, resolver) = resolver();
        let descriptor = AvatarDescriptor::with_images([source("a.png")]);
        let avatar = resolver
            .resolve(&descriptor, AvatarSize::ListCell, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(avatar.kind(), AvatarKind::Image);
        let image = avatar.image().unwrap();
        assert_eq!(image.dimensions(), (45, 45));
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(22, 22).0[3], 255);

        let requests = loader.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].transformations, vec![Transformation::CircleCrop]);
        assert_eq!(requests[0].size, TargetSize::square(45));
    }

    #[tokio::test]
    async fn failed_single_image_falls_back_to_initials() {
        let descriptor = AvatarDescriptor {
            images: vec![source("missing.png")],
            initials: "JD".to_owned(),
            ..Default::default()
        };
        let avatar = resolve(&descriptor).await;
        assert_eq!(avatar.kind(), AvatarKind::Initials);
        assert_eq!(avatar.image().unwrap().dimensions(), (45, 45));
    }

    #[tokio::test]
    async fn failed_single_image_with_plus_gives_placeholder() {
        let descriptor = AvatarDescriptor {
            images: vec![source("missing.png")],
            initials: "+".to_owned(),
            default_to_conversation_icon: true,
            ..Default::default()
        };
        assert_eq!(
            resolve(&descriptor).await.kind(),
            AvatarKind::Placeholder(PlaceholderIcon::Conversation)
        );
    }

    #[tokio::test]
    async fn several_images_make_a_mosaic() {
        let (loader, resolver) = resolver();
        let descriptor = AvatarDescriptor::with_images([
            source("a.png"),
            source("b.png"),
            source("c.png"),
            source("d.png"),
            source("e.png"),
        ]);
        let avatar = resolver
            .resolve(&descriptor, AvatarSize::Big, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(avatar.kind(), AvatarKind::Mosaic);
        let image = avatar.image().unwrap();
        assert_eq!(image.dimensions(), (100, 100));
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(loader.requests().len(), MOSAIC_MAX_TILES);
    }

    #[tokio::test]
    async fn partially_failed_mosaic_uses_remaining_tiles() {
        let descriptor = AvatarDescriptor {
            images: vec![source("missing.png"), source("b.png")],
            initials: "JD".to_owned(),
            ..Default::default()
        };
        assert_eq!(resolve(&descriptor).await.kind(), AvatarKind::Mosaic);
    }

    #[tokio::test]
    async fn fully_failed_mosaic_falls_back() {
        let descriptor = AvatarDescriptor {
            images: vec![source("missing-a.png"), source("missing-b.png")],
            default_to_conference_icon: true,
            ..Default::default()
        };
        assert_eq!(
            resolve(&descriptor).await.kind(),
            AvatarKind::Placeholder(PlaceholderIcon::Conference)
        );
    }

    #[tokio::test]
    async fn empty_descriptor_is_a_person() {
        assert_eq!(
            resolve(&AvatarDescriptor::default()).await.kind(),
            AvatarKind::Placeholder(PlaceholderIcon::Person)
        );
    }

    #[tokio::test]
    async fn initials_follow_the_preset() {
        let (_, resolver) = resolver();
        let avatar = resolver
            .resolve(
                &AvatarDescriptor::with_initials("JD"),
                AvatarSize::InCall,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(avatar.kind(), AvatarKind::Initials);
        assert_eq!(avatar.image().unwrap().dimensions(), (120, 120));
    }

    #[tokio::test]
    async fn same_descriptor_same_branch() {
        let descriptors = [
            AvatarDescriptor::with_images([source("a.png")]),
            AvatarDescriptor::with_images([source("a.png"), source("b.png")]),
            AvatarDescriptor::with_initials("+"),
            AvatarDescriptor::with_initials("AB"),
        ];
        for descriptor in descriptors.iter() {
            assert_eq!(
                resolve(descriptor).await.kind(),
                resolve(descriptor).await.kind()
            );
        }
    }

    #[tokio::test]
    async fn cancelled_token_yields_no_avatar() {
        let (_, resolver) = resolver();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = resolver
            .resolve(&AvatarDescriptor::default(), AvatarSize::ListCell, &cancel)
            .await;
        assert!(matches!(result, Err(AvatarError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelling_a_pending_load() {
        let (_, resolver) = resolver();
        let descriptor = AvatarDescriptor {
            images: vec![source("slow.png")],
            initials: "JD".to_owned(),
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let result = resolver
            .resolve(&descriptor, AvatarSize::ListCell, &cancel)
            .await;
        assert!(matches!(result, Err(AvatarError::Cancelled)));
    }

    #[tokio::test]
    async fn spawned_request_delivers_the_avatar() {
        let (_, resolver) = resolver();
        let handle = Arc::new(resolver)
            .spawn(AvatarDescriptor::with_initials("JD"), AvatarSize::Bubble);
        let avatar = handle.wait().await.unwrap();
        assert_eq!(avatar.image().unwrap().dimensions(), (24, 24));
    }

    #[tokio::test]
    async fn spawned_request_can_be_cancelled() {
        let (_, resolver) = resolver();
        let handle = Arc::new(resolver).spawn(
            AvatarDescriptor::with_images([source("slow.png")]),
            AvatarSize::ListCell,
        );
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(matches!(handle.wait().await, Err(AvatarError::Cancelled)));
    }

    #[test]
    #[should_panic]
    fn spawn_outside_a_runtime_panics() {
        let (_, resolver) = resolver();
        Arc::new(resolver)
            .spawn(AvatarDescriptor::with_initials("JD"), AvatarSize::Bubble);
    }

    #[tokio::test]
    async fn convenience_loads() {
        let (loader, resolver) = resolver();
        let cancel = CancellationToken::new();
        let circle = resolver.load_circle(source("a.png"), &cancel).await.unwrap();
        assert_eq!(circle.get_pixel(0, 0).0[3], 0);
        let plain = resolver.load_plain(source("a.png"), &cancel).await.unwrap();
        assert_eq!(plain.get_pixel(0, 0).0[3], 255);
        assert!(resolver
            .load_circle(source("missing.png"), &cancel)
            .await
            .is_err());
        assert_eq!(loader.requests().len(), 3);
        assert_eq!(resolver.initials_badge("JD").dimensions(), (45, 45));
    }
}
