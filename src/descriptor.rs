use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{AvatarError, Result, PLUS_INITIALS};

/// Reference to loadable image data.
#[derive(Eq, PartialEq, Hash, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Local(PathBuf),
    Remote(Url),
}

impl ImageSource {
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            ImageSource::Local(path) => path.file_name()?.to_str()?.to_owned(),
            ImageSource::Remote(url) => {
                url.path_segments()?.last()?.to_owned()
            }
        };
        let (_, extension) = name.rsplit_once('.')?;
        if extension.is_empty() {
            return None;
        }
        Some(extension.to_lowercase())
    }
}

impl FromStr for ImageSource {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(AvatarError::Parse);
        }
        match Url::parse(s) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                Ok(ImageSource::Remote(url))
            }
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(ImageSource::Local)
                .map_err(|_| AvatarError::Parse),
            _ => Ok(ImageSource::Local(PathBuf::from(s))),
        }
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Local(path.to_path_buf())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Local(path)
    }
}

impl From<Url> for ImageSource {
    fn from(url: Url) -> Self {
        ImageSource::Remote(url)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Local(path) => write!(f, "{}", path.display()),
            ImageSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Static icons shown instead of a picture.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Deserialize, Serialize)]
pub enum PlaceholderIcon {
    Conference,
    Conversation,
    Person,
    ImageSquare,
}

impl PlaceholderIcon {
    pub fn asset_name(self) -> &'static str {
        match self {
            PlaceholderIcon::Conference => "inset_meeting",
            PlaceholderIcon::Conversation => "inset_users_three",
            PlaceholderIcon::Person => "inset_user_circle",
            PlaceholderIcon::ImageSquare => "image_square",
        }
    }
}

/// Everything needed to decide what an avatar depicts.
#[derive(Eq, PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AvatarDescriptor {
    pub images: Vec<ImageSource>,
    pub initials: String,
    pub force_conference_icon: bool,
    pub force_conversation_icon: bool,
    pub default_to_conference_icon: bool,
    pub default_to_conversation_icon: bool,
    pub skip_initials: bool,
}

/// What a descriptor resolves to before any image is loaded.
///
/// Variants are listed in priority order.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum AvatarState<'a> {
    ForcedConference,
    ForcedConversation,
    Single(&'a ImageSource),
    Mosaic(&'a [ImageSource]),
    Fallback(Fallback<'a>),
}

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum Fallback<'a> {
    Placeholder(PlaceholderIcon),
    Initials(&'a str),
}

impl AvatarDescriptor {
    pub fn with_initials<S: Into<String>>(initials: S) -> Self {
        Self {
            initials: initials.into(),
            ..Default::default()
        }
    }

    pub fn with_images<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ImageSource>,
    {
        Self {
            images: images.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn state(&self) -> AvatarState<'_> {
        match (
            self.force_conference_icon,
            self.force_conversation_icon,
            self.images.as_slice(),
        ) {
            (true, _, _) => AvatarState::ForcedConference,
            (false, true, _) => AvatarState::ForcedConversation,
            (false, false, [single]) => AvatarState::Single(single),
            (false, false, images @ [_, _, ..]) => AvatarState::Mosaic(images),
            (false, false, []) => AvatarState::Fallback(self.fallback()),
        }
    }

    /// Used when there are no images, or when loading them failed.
    pub fn fallback(&self) -> Fallback<'_> {
        let initials = self.initials.as_str();
        if initials.is_empty() || initials == PLUS_INITIALS || self.skip_initials
        {
            Fallback::Placeholder(self.placeholder())
        } else {
            Fallback::Initials(initials)
        }
    }

    fn placeholder(&self) -> PlaceholderIcon {
        if self.default_to_conference_icon {
            PlaceholderIcon::Conference
        } else if self.default_to_conversation_icon {
            PlaceholderIcon::Conversation
        } else {
            PlaceholderIcon::Person
        }
    }
}

/// Upper-cased first letters of the first two words of a display name.
pub fn initials_from_name(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}
