use std::path::PathBuf;
use std::sync::Arc;

use avatarlib::{AvatarRenderer, RenderSpec, Theme};

use super::Preset;
use crate::error::AppError;
use crate::util::save_png;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "initials", about = "Render an initials badge to a PNG file")]
pub struct Initials {
    #[clap(help = "The letters to draw")]
    text: String,
    #[clap(long, value_enum, default_value_t = Preset::List)]
    preset: Preset,
    #[clap(long, help = "Badge size in pixels, overrides the preset")]
    size: Option<u32>,
    #[clap(long, default_value = "initials.png")]
    out: PathBuf,
}

impl Initials {
    pub fn run(&self, theme: Arc<Theme>) -> Result<(), AppError> {
        let mut spec = RenderSpec::for_preset(theme.as_ref(), self.preset.into());
        if let Some(size) = self.size {
            spec = spec.with_size(size);
        }
        let image = AvatarRenderer::new(spec).build(&self.text);
        save_png(&image, &self.out)
    }
}
