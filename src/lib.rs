pub mod bubble;
pub mod color;
pub mod compositor;
pub mod descriptor;
mod errors;
pub mod loader;
pub mod renderer;
pub mod resolver;
pub mod surface;
pub mod theme;
pub mod transform;

pub use errors::{AvatarError, Result};

pub use bubble::{BubbleLayout, BubblePreview, BubblePreviewer};
pub use color::Color;
pub use compositor::{Compositor, GridCompositor};
pub use descriptor::{
    initials_from_name, AvatarDescriptor, AvatarState, Fallback, ImageSource,
    PlaceholderIcon,
};
pub use loader::{DefaultImageLoader, ImageLoader, LoadRequest};
pub use renderer::{AvatarRenderer, RenderSpec, Typeface};
pub use resolver::{Avatar, AvatarHandle, AvatarKind, AvatarResolver};
pub use theme::{AvatarSize, ColorToken, Dimen, ResourceProvider, Theme};
pub use transform::{TargetSize, Transformation};

pub use tokio_util::sync::CancellationToken;

/// Initials value that stands for "no initials" (e.g. a bare phone prefix).
pub const PLUS_INITIALS: &str = "+";
