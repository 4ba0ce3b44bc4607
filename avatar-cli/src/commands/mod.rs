use clap::{Subcommand, ValueEnum};

use avatarlib::AvatarSize;

mod bubble;
mod initials;
mod resolve;

#[derive(Debug, Subcommand)]
pub enum Commands {
    Initials(initials::Initials),
    Resolve(resolve::Resolve),
    Bubble(bubble::Bubble),
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Preset {
    #[default]
    List,
    Bubble,
    Big,
    Call,
}

impl From<Preset> for AvatarSize {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::List => AvatarSize::ListCell,
            Preset::Bubble => AvatarSize::Bubble,
            Preset::Big => AvatarSize::Big,
            Preset::Call => AvatarSize::InCall,
        }
    }
}
