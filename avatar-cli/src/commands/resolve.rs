use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use avatarlib::{
    initials_from_name, Avatar, AvatarDescriptor, AvatarResolver,
    CancellationToken, DefaultImageLoader, ImageSource, Theme,
};

use super::Preset;
use crate::error::AppError;
use crate::util::save_png;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "resolve", about = "Resolve what an avatar shows and render it")]
pub struct Resolve {
    #[clap(long = "image", help = "Local path or http(s) URL, repeatable")]
    images: Vec<String>,
    #[clap(long)]
    initials: Option<String>,
    #[clap(long, help = "Derive initials from a display name")]
    name: Option<String>,
    #[clap(long)]
    force_conference: bool,
    #[clap(long)]
    force_conversation: bool,
    #[clap(long)]
    default_conference: bool,
    #[clap(long)]
    default_conversation: bool,
    #[clap(long)]
    skip_initials: bool,
    #[clap(long, value_enum, default_value_t = Preset::List)]
    preset: Preset,
    #[clap(long, default_value = "avatar.png")]
    out: PathBuf,
}

impl Resolve {
    fn descriptor(&self) -> Result<AvatarDescriptor, AppError> {
        let images = self
            .images
            .iter()
            .map(|raw| {
                ImageSource::from_str(raw)
                    .map_err(|_| AppError::InvalidImageReference(raw.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let initials = match (&self.initials, &self.name) {
            (Some(initials), _) => initials.clone(),
            (None, Some(name)) => initials_from_name(name),
            (None, None) => String::new(),
        };
        Ok(AvatarDescriptor {
            images,
            initials,
            force_conference_icon: self.force_conference,
            force_conversation_icon: self.force_conversation,
            default_to_conference_icon: self.default_conference,
            default_to_conversation_icon: self.default_conversation,
            skip_initials: self.skip_initials,
        })
    }

    pub async fn run(&self, theme: Arc<Theme>) -> Result<(), AppError> {
        let descriptor = self.descriptor()?;
        let resolver =
            AvatarResolver::new(Arc::new(DefaultImageLoader::new()?), theme);
        let avatar = resolver
            .resolve(&descriptor, self.preset.into(), &CancellationToken::new())
            .await?;

        println!("Resolved to {:?}", avatar.kind());
        match avatar {
            Avatar::Placeholder(icon) => {
                println!("{}", icon.asset_name());
                Ok(())
            }
            Avatar::Image(image)
            | Avatar::Mosaic(image)
            | Avatar::Initials(image) => save_png(&image, &self.out),
        }
    }
}
