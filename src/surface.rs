//! Conversions between `image` buffers and `tiny_skia` pixmaps.
//!
//! `image` works with straight alpha, `tiny_skia` with premultiplied alpha.

use image::{Rgba, RgbaImage};
use tiny_skia::{ColorU8, Pixmap};

use crate::{AvatarError, Result};

pub fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or_else(|| {
        AvatarError::Surface(format!(
            "cannot allocate a {}x{} surface",
            width, height
        ))
    })
}

pub fn pixmap_from_image(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = new_pixmap(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let Rgba([r, g, b, a]) = *src;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

pub fn image_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}
