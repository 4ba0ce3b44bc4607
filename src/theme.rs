use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::Result;

/// Named dimension tokens, resolved to pixels by a [`ResourceProvider`].
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum Dimen {
    AvatarListCellSize,
    AvatarBubbleSize,
    AvatarBigSize,
    AvatarInCallSize,
    AvatarInitialsTextSize,
    AvatarInitialsBubbleTextSize,
    AvatarInitialsBigTextSize,
    AvatarInitialsCallTextSize,
    ChatBubbleGridImageSize,
    ChatBubbleBigImageMaxSize,
    ChatBubbleImagesRoundedCornerRadius,
}

#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum ColorToken {
    AvatarBackground,
    AvatarInitials,
}

pub trait ResourceProvider: Send + Sync {
    fn dimension(&self, token: Dimen) -> f32;

    fn color(&self, token: ColorToken) -> Color;

    fn dimension_px(&self, token: Dimen) -> u32 {
        self.dimension(token).max(0.0) as u32
    }
}

/// Avatar size presets used by the different places an avatar is shown.
#[derive(
    Eq, PartialEq, Hash, Clone, Copy, Debug, Default, Deserialize, Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AvatarSize {
    #[default]
    ListCell,
    Bubble,
    Big,
    InCall,
}

impl AvatarSize {
    pub fn size_token(self) -> Dimen {
        match self {
            AvatarSize::ListCell => Dimen::AvatarListCellSize,
            AvatarSize::Bubble => Dimen::AvatarBubbleSize,
            AvatarSize::Big => Dimen::AvatarBigSize,
            AvatarSize::InCall => Dimen::AvatarInCallSize,
        }
    }

    pub fn text_size_token(self) -> Dimen {
        match self {
            AvatarSize::ListCell => Dimen::AvatarInitialsTextSize,
            AvatarSize::Bubble => Dimen::AvatarInitialsBubbleTextSize,
            AvatarSize::Big => Dimen::AvatarInitialsBigTextSize,
            AvatarSize::InCall => Dimen::AvatarInitialsCallTextSize,
        }
    }
}

/// Style values for avatars and chat previews.
///
/// Loaded from JSON; any field missing from the file keeps its default.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Theme {
    pub avatar_list_cell_size: f32,
    pub avatar_bubble_size: f32,
    pub avatar_big_size: f32,
    pub avatar_in_call_size: f32,
    pub avatar_initials_text_size: f32,
    pub avatar_initials_bubble_text_size: f32,
    pub avatar_initials_big_text_size: f32,
    pub avatar_initials_call_text_size: f32,
    pub chat_bubble_grid_image_size: f32,
    pub chat_bubble_big_image_max_size: f32,
    pub chat_bubble_images_rounded_corner_radius: f32,
    pub avatar_background_color: Color,
    pub avatar_initials_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            avatar_list_cell_size: 45.0,
            avatar_bubble_size: 24.0,
            avatar_big_size: 100.0,
            avatar_in_call_size: 120.0,
            avatar_initials_text_size: 16.0,
            avatar_initials_bubble_text_size: 10.0,
            avatar_initials_big_text_size: 36.0,
            avatar_initials_call_text_size: 44.0,
            chat_bubble_grid_image_size: 100.0,
            chat_bubble_big_image_max_size: 250.0,
            chat_bubble_images_rounded_corner_radius: 10.0,
            avatar_background_color: Color::from_argb(0xFFC0D1D9),
            avatar_initials_color: Color::from_argb(0xFF4E6074),
        }
    }
}

impl Theme {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Loading theme from {}", path.as_ref().display());
        let bytes = fs::read(path.as_ref())?;
        let theme: Theme = serde_json::from_slice(&bytes)?;
        Ok(theme)
    }
}

impl ResourceProvider for Theme {
    fn dimension(&self, token: Dimen) -> f32 {
        match token {
            Dimen::AvatarListCellSize => self.avatar_list_cell_size,
            Dimen::AvatarBubbleSize => self.avatar_bubble_size,
            Dimen::AvatarBigSize => self.avatar_big_size,
            Dimen::AvatarInCallSize => self.avatar_in_call_size,
            Dimen::AvatarInitialsTextSize => self.avatar_initials_text_size,
            Dimen::AvatarInitialsBubbleTextSize => {
                self.avatar_initials_bubble_text_size
            }
            Dimen::AvatarInitialsBigTextSize => {
                self.avatar_initials_big_text_size
            }
            Dimen::AvatarInitialsCallTextSize => {
                self.avatar_initials_call_text_size
            }
            Dimen::ChatBubbleGridImageSize => self.chat_bubble_grid_image_size,
            Dimen::ChatBubbleBigImageMaxSize => {
                self.chat_bubble_big_image_max_size
            }
            Dimen::ChatBubbleImagesRoundedCornerRadius => {
                self.chat_bubble_images_rounded_corner_radius
            }
        }
    }

    fn color(&self, token: ColorToken) -> Color {
        match token {
            ColorToken::AvatarBackground => self.avatar_background_color,
            ColorToken::AvatarInitials => self.avatar_initials_color,
        }
    }
}
