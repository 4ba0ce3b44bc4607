use std::convert::Infallible;

use embedded_graphics::{
    mono_font::{iso_8859_1, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{renderer::TextRenderer, Baseline, Text},
};
use image::RgbaImage;
use log::{trace, warn};
use tiny_skia::{FillRule, PathBuilder, Pixmap, Rect, Transform};

use crate::color::Color;
use crate::surface::{image_from_pixmap, new_pixmap};
use crate::theme::{AvatarSize, ColorToken, ResourceProvider};

const MAX_TEXT_SCALE: u32 = 8;

const BOLD_FONTS: [&MonoFont<'static>; 6] = [
    &iso_8859_1::FONT_6X13_BOLD,
    &iso_8859_1::FONT_7X13_BOLD,
    &iso_8859_1::FONT_7X14_BOLD,
    &iso_8859_1::FONT_8X13_BOLD,
    &iso_8859_1::FONT_9X15_BOLD,
    &iso_8859_1::FONT_9X18_BOLD,
];

const REGULAR_FONTS: [&MonoFont<'static>; 7] = [
    &iso_8859_1::FONT_6X10,
    &iso_8859_1::FONT_6X13,
    &iso_8859_1::FONT_7X14,
    &iso_8859_1::FONT_8X13,
    &iso_8859_1::FONT_9X15,
    &iso_8859_1::FONT_9X18,
    &iso_8859_1::FONT_10X20,
];

#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Default)]
pub enum Typeface {
    #[default]
    Bold,
    Regular,
}

impl Typeface {
    fn fonts(self) -> &'static [&'static MonoFont<'static>] {
        match self {
            Typeface::Bold => &BOLD_FONTS,
            Typeface::Regular => &REGULAR_FONTS,
        }
    }

    /// Font and integer scale whose rendered height is closest to `text_size`.
    fn select(self, text_size: f32) -> (&'static MonoFont<'static>, u32) {
        let mut best = (self.fonts()[0], 1);
        let mut best_error = f32::MAX;
        for &font in self.fonts() {
            for scale in 1..=MAX_TEXT_SCALE {
                let height = (font.character_size.height * scale) as f32;
                let error = (height - text_size).abs();
                if error < best_error {
                    best = (font, scale);
                    best_error = error;
                }
            }
        }
        best
    }
}

/// Everything the renderer needs, resolved up front.
#[derive(PartialEq, Clone, Debug)]
pub struct RenderSpec {
    pub size: u32,
    pub text_size: f32,
    pub text_color: Color,
    pub background_color: Color,
    pub typeface: Typeface,
}

impl RenderSpec {
    pub fn new(resources: &dyn ResourceProvider) -> Self {
        Self::for_preset(resources, AvatarSize::default())
    }

    pub fn for_preset(
        resources: &dyn ResourceProvider,
        preset: AvatarSize,
    ) -> Self {
        Self {
            size: resources.dimension_px(preset.size_token()),
            text_size: resources.dimension(preset.text_size_token()),
            text_color: resources.color(ColorToken::AvatarInitials),
            background_color: resources.color(ColorToken::AvatarBackground),
            typeface: Typeface::default(),
        }
    }

    pub fn with_size(self, size: u32) -> Self {
        Self { size, ..self }
    }

    pub fn with_text_size(self, text_size: f32) -> Self {
        Self { text_size, ..self }
    }

    pub fn with_text_color(self, text_color: Color) -> Self {
        Self { text_color, ..self }
    }

    pub fn with_background_color(self, background_color: Color) -> Self {
        Self {
            background_color,
            ..self
        }
    }

    pub fn with_typeface(self, typeface: Typeface) -> Self {
        Self { typeface, ..self }
    }
}

/// Placement of the initials inside the badge, in pixels.
///
/// `ascent` is negative (above the baseline), `descent` positive.
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub struct TextLayout {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub ascent: i32,
    pub descent: i32,
}

impl TextLayout {
    pub fn height(&self) -> i32 {
        self.descent - self.ascent
    }

    pub fn baseline(&self) -> i32 {
        self.top - self.ascent
    }
}

pub struct AvatarRenderer {
    spec: RenderSpec,
}

impl AvatarRenderer {
    pub fn new(spec: RenderSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &RenderSpec {
        &self.spec
    }

    pub fn layout(&self, initials: &str) -> TextLayout {
        let (font, scale) = self.spec.typeface.select(self.spec.text_size);
        let scale = scale as i32;
        let style = MonoTextStyle::new(font, BinaryColor::On);
        let metrics =
            style.measure_string(initials, Point::zero(), Baseline::Alphabetic);

        let width = metrics.bounding_box.size.width as i32 * scale;
        let ascent = -(font.baseline as i32) * scale;
        let descent =
            (font.character_size.height as i32 - font.baseline as i32) * scale;
        let size = self.spec.size as i32;

        TextLayout {
            left: (size - width) / 2,
            top: (size - (descent - ascent)) / 2,
            width,
            ascent,
            descent,
        }
    }

    /// Circle filled with the background color, initials centered on top.
    pub fn build(&self, initials: &str) -> RgbaImage {
        let size = self.spec.size;
        let mut pixmap = match new_pixmap(size, size) {
            Ok(pixmap) => pixmap,
            Err(e) => {
                warn!("Cannot render avatar for {:?}: {}", initials, e);
                return RgbaImage::new(0, 0);
            }
        };

        let half = size as f32 / 2.0;
        if let Some(circle) = PathBuilder::from_circle(half, half, half) {
            pixmap.fill_path(
                &circle,
                &self.spec.background_color.to_paint(),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }

        if !initials.is_empty() {
            self.draw_initials(&mut pixmap, initials);
        }

        image_from_pixmap(&pixmap)
    }

    fn draw_initials(&self, pixmap: &mut Pixmap, initials: &str) {
        let (font, scale) = self.spec.typeface.select(self.spec.text_size);
        let layout = self.layout(initials);
        trace!(
            "Drawing {:?} with {}x{} font at scale {}: {:?}",
            initials,
            font.character_size.width,
            font.character_size.height,
            scale,
            layout
        );

        let mut paint = self.spec.text_color.to_paint();
        paint.anti_alias = false;
        let mut canvas = GlyphCanvas {
            pixmap,
            paint,
            origin: Point::new(layout.left, layout.baseline()),
            scale,
        };
        let style = MonoTextStyle::new(font, BinaryColor::On);
        Text::with_baseline(initials, Point::zero(), style, Baseline::Alphabetic)
            .draw(&mut canvas)
            .unwrap_or_else(|never| match never {});
    }
}

/// Draw target that blows every glyph pixel up into a `scale`-sized block.
struct GlyphCanvas<'a> {
    pixmap: &'a mut Pixmap,
    paint: tiny_skia::Paint<'static>,
    origin: Point,
    scale: u32,
}

impl OriginDimensions for GlyphCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(
            self.pixmap.width() / self.scale,
            self.pixmap.height() / self.scale,
        )
    }
}

impl DrawTarget for GlyphCanvas<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i32;
        for Pixel(point, color) in pixels {
            if color != BinaryColor::On {
                continue;
            }
            let x = self.origin.x + point.x * scale;
            let y = self.origin.y + point.y * scale;
            if let Some(rect) = Rect::from_xywh(
                x as f32,
                y as f32,
                self.scale as f32,
                self.scale as f32,
            ) {
                self.pixmap.fill_rect(
                    rect,
                    &self.paint,
                    Transform::identity(),
                    None,
                );
            }
        }
        Ok(())
    }
}
