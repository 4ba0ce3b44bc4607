use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use log::trace;

use crate::{AvatarError, Result};

pub const MOSAIC_MAX_TILES: usize = 4;

/// Combines several decoded images into one square raster.
pub trait Compositor: Send + Sync {
    fn compose(&self, tiles: &[RgbaImage], size: u32) -> Result<RgbaImage>;
}

/// Lays out up to four tiles:
/// two side by side, three as a half plus two quarters, four as quadrants.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridCompositor;

/// A cell of the grid: x, y, width, height.
pub type Cell = (u32, u32, u32, u32);

impl GridCompositor {
    pub fn cells(count: usize, size: u32) -> Vec<Cell> {
        let half = size / 2;
        let rest = size - half;
        match count.min(MOSAIC_MAX_TILES) {
            0 => vec![],
            1 => vec![(0, 0, size, size)],
            2 => vec![(0, 0, half, size), (half, 0, rest, size)],
            3 => vec![
                (0, 0, half, size),
                (half, 0, rest, half),
                (half, half, rest, rest),
            ],
            _ => vec![
                (0, 0, half, half),
                (half, 0, rest, half),
                (0, half, half, rest),
                (half, half, rest, rest),
            ],
        }
    }
}

impl Compositor for GridCompositor {
    fn compose(&self, tiles: &[RgbaImage], size: u32) -> Result<RgbaImage> {
        if tiles.is_empty() || size == 0 {
            return Err(AvatarError::Surface(format!(
                "cannot compose {} tiles into a {}px mosaic",
                tiles.len(),
                size
            )));
        }

        let mut canvas = RgbaImage::new(size, size);
        for (tile, (x, y, width, height)) in
            tiles.iter().zip(Self::cells(tiles.len(), size))
        {
            if width == 0 || height == 0 {
                continue;
            }
            trace!("Placing tile at {},{} ({}x{})", x, y, width, height);
            let cell = DynamicImage::ImageRgba8(tile.clone())
                .resize_to_fill(width, height, FilterType::Triangle)
                .to_rgba8();
            imageops::overlay(&mut canvas, &cell, x as i64, y as i64);
        }
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rstest::rstest;

    fn solid(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(16, 16, Rgba(color))
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[rstest]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(3, 3)]
    #[case(4, 4)]
    #[case(7, 4)]
    fn at_most_four_cells(#[case] count: usize, #[case] cells: usize) {
        assert_eq!(GridCompositor::cells(count, 45).len(), cells);
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    #[case(45)]
    fn cells_cover_the_square(#[case] count: usize) {
        let size = 45;
        let area: u32 = GridCompositor::cells(count, size)
            .iter()
            .map(|(_, _, w, h)| w * h)
            .sum();
        assert_eq!(area, size * size);
    }

    #[test]
    fn two_tiles_split_left_and_right() {
        let mosaic = GridCompositor
            .compose(&[solid(RED), solid(GREEN)], 40)
            .unwrap();
        assert_eq!(mosaic.dimensions(), (40, 40));
        assert_eq!(mosaic.get_pixel(5, 20).0, RED);
        assert_eq!(mosaic.get_pixel(35, 20).0, GREEN);
    }

    #[test]
    fn three_tiles_use_a_half_and_two_quarters() {
        let mosaic = GridCompositor
            .compose(&[solid(RED), solid(GREEN), solid(BLUE)], 40)
            .unwrap();
        assert_eq!(mosaic.get_pixel(5, 35).0, RED);
        assert_eq!(mosaic.get_pixel(35, 5).0, GREEN);
        assert_eq!(mosaic.get_pixel(35, 35).0, BLUE);
    }

    #[test]
    fn extra_tiles_are_ignored() {
        let tiles = [solid(RED), solid(GREEN), solid(BLUE), solid(WHITE), solid(RED)];
        let mosaic = GridCompositor.compose(&tiles, 40).unwrap();
        assert_eq!(mosaic.get_pixel(5, 5).0, RED);
        assert_eq!(mosaic.get_pixel(35, 5).0, GREEN);
        assert_eq!(mosaic.get_pixel(5, 35).0, BLUE);
        assert_eq!(mosaic.get_pixel(35, 35).0, WHITE);
    }

    #[test]
    fn nothing_to_compose_is_an_error() {
        assert!(GridCompositor.compose(&[], 40).is_err());
    }
}
