//! Split inference: partition an image into a grid of tiles, and merge the
//! per-tile detections back into one full-image set.
//!
//! Without overlap the tiles partition the image exactly: every tile is
//! `W / split_width` by `H / split_height` pixels (floored) and the last column
//! and row absorb the remainder. A non-zero overlap grows each tile by that many
//! pixels on every side that borders another tile.
//!
//! Merging never suppresses across tiles, so an object cut by a seam may be
//! reported once per tile it touches. A global suppression pass over the merged
//! set is available through `DetectorConfig::merge_nms`.

use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};
use crate::common::{Detection, DetectionSet};
use crate::errors::DetectError;
use crate::Result;

/// Sub-rectangle of the original image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x_offset: u32,
    pub y_offset: u32,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    pub fn x_end(&self) -> u32 {
        self.x_offset + self.width
    }

    pub fn y_end(&self) -> u32 {
        self.y_offset + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    pub split_width: u32,
    pub split_height: u32,
    pub overlap: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Builds the grid for an `image_w x image_h` image. Tiles are stored row-major.
    pub fn new(image_w: u32, image_h: u32, split_width: u32, split_height: u32, overlap: u32) -> Result<Self> {
        if split_width < 1 || split_height < 1 {
            return Err(DetectError::InvalidTileConfig(format!(
                "split counts must be at least 1, got {}x{}",
                split_width, split_height
            )));
        }
        if image_w == 0 || image_h == 0 {
            return Err(DetectError::InvalidImage(format!("image has zero area ({}x{})", image_w, image_h)));
        }

        let (base_w, base_h) = (image_w / split_width, image_h / split_height);
        if base_w == 0 || base_h == 0 {
            return Err(DetectError::InvalidTileConfig(format!(
                "a {}x{} split of a {}x{} image produces empty tiles",
                split_width, split_height, image_w, image_h
            )));
        }

        let span = |i: u32, n: u32, base: u32, total: u32| {
            let start = i * base;
            let end = if i == n - 1 { total } else { start + base };
            (start.saturating_sub(overlap), (end + overlap).min(total))
        };

        let mut tiles = Vec::with_capacity(split_width as usize * split_height as usize);
        for row in 0..split_height {
            let (y0, y1) = span(row, split_height, base_h, image_h);
            for col in 0..split_width {
                let (x0, x1) = span(col, split_width, base_w, image_w);
                tiles.push(Tile {
                    x_offset: x0,
                    y_offset: y0,
                    width: x1 - x0,
                    height: y1 - y0,
                });
            }
        }

        Ok(Self {
            split_width,
            split_height,
            overlap,
            tiles,
        })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Copies the tile's pixels out of `image`.
pub fn crop_tile(image: &RgbImage, tile: &Tile) -> RgbImage {
    imageops::crop_imm(image, tile.x_offset, tile.y_offset, tile.width, tile.height).to_image()
}

/// Moves every tile's detections into full-image space and groups them by class.
/// Tiles are appended in iteration order.
pub fn merge_tiles<I>(tile_results: I) -> DetectionSet
where
    I: IntoIterator<Item = (Tile, Vec<Detection>)>,
{
    let mut merged = DetectionSet::new();
    for (tile, detections) in tile_results {
        let (dx, dy) = (tile.x_offset as f32, tile.y_offset as f32);
        merged.extend(detections.into_iter().map(|d| d.translate(dx, dy)));
    }
    merged
}
