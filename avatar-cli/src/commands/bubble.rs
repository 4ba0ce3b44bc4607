use std::path::PathBuf;
use std::sync::Arc;

use avatarlib::{
    BubbleLayout, BubblePreview, BubblePreviewer, CancellationToken,
    DefaultImageLoader, Theme,
};

use crate::error::AppError;
use crate::util::save_png;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "bubble", about = "Render a chat bubble preview of a file")]
pub struct Bubble {
    #[clap(help = "Local path or http(s) URL of the file")]
    file: String,
    #[clap(long, help = "Size the preview as a grid cell")]
    grid: bool,
    #[clap(long, default_value = "preview.png")]
    out: PathBuf,
}

impl Bubble {
    pub async fn run(&self, theme: Arc<Theme>) -> Result<(), AppError> {
        let previewer =
            BubblePreviewer::new(Arc::new(DefaultImageLoader::new()?), theme);
        let layout = if self.grid {
            BubbleLayout::Grid
        } else {
            BubbleLayout::Single
        };
        match previewer
            .load(&self.file, layout, &CancellationToken::new())
            .await?
        {
            BubblePreview::Loaded(image) => save_png(&image, &self.out),
            BubblePreview::Empty | BubblePreview::Hidden => {
                Err(AppError::NothingRendered)
            }
        }
    }
}
