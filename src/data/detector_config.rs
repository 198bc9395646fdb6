//! Options for the detection pipeline.

use std::collections::HashSet;
use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::data::PredsLayout;
use crate::errors::DetectError;

/// Letterbox resize options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterboxOptions {
    /// Constant grey level of the padding.
    pub fill: u8,
    /// When false the image is only ever shrunk, never enlarged.
    pub scale_up: bool,
    /// Pad only up to the next multiple of `stride` instead of the full target size.
    pub stride: Option<u32>,
}

impl Default for LetterboxOptions {
    fn default() -> Self {
        Self {
            fill: 114,
            scale_up: true,
            stride: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub conf_thres: f32,
    pub iou_thres: f32,
    pub classes: Option<HashSet<usize>>,
    pub agnostic_nms: bool,
    pub xcycwh: bool,

    // tiling
    pub split_width: u32,
    pub split_height: u32,
    pub tile_overlap: u32,
    pub merge_nms: bool,
    pub parallel_tiles: bool,

    pub max_det: usize,
    pub max_nms: usize,
    pub round_coords: bool,
    pub layout: PredsLayout,
    pub nc: Option<usize>,
    pub letterbox: LetterboxOptions,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            conf_thres: 0.4,
            iou_thres: 0.3,
            classes: None,
            agnostic_nms: false,
            xcycwh: true,

            split_width: 1,
            split_height: 1,
            tile_overlap: 0,
            merge_nms: false,
            parallel_tiles: false,

            max_det: 300,
            max_nms: 30000,
            round_coords: true,
            layout: PredsLayout::default(),
            nc: None,
            letterbox: LetterboxOptions::default(),
        }
    }
}

impl DetectorConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detector config {}", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn with_conf_thres(mut self, x: f32) -> Self {
        self.conf_thres = x;
        self
    }

    pub fn with_iou_thres(mut self, x: f32) -> Self {
        self.iou_thres = x;
        self
    }

    pub fn with_classes(mut self, classes: &[usize]) -> Self {
        self.classes = Some(classes.iter().copied().collect());
        self
    }

    pub fn with_agnostic_nms(mut self, x: bool) -> Self {
        self.agnostic_nms = x;
        self
    }

    pub fn with_xcycwh(mut self, x: bool) -> Self {
        self.xcycwh = x;
        self
    }

    pub fn with_split(mut self, split_width: u32, split_height: u32) -> Self {
        self.split_width = split_width;
        self.split_height = split_height;
        self
    }

    pub fn with_tile_overlap(mut self, x: u32) -> Self {
        self.tile_overlap = x;
        self
    }

    pub fn with_merge_nms(mut self, x: bool) -> Self {
        self.merge_nms = x;
        self
    }

    pub fn with_parallel_tiles(mut self, x: bool) -> Self {
        self.parallel_tiles = x;
        self
    }

    pub fn with_max_det(mut self, n: usize) -> Self {
        self.max_det = n;
        self
    }

    pub fn with_max_nms(mut self, n: usize) -> Self {
        self.max_nms = n;
        self
    }

    pub fn with_round_coords(mut self, x: bool) -> Self {
        self.round_coords = x;
        self
    }

    pub fn with_layout(mut self, x: PredsLayout) -> Self {
        self.layout = x;
        self
    }

    pub fn with_nc(mut self, nc: usize) -> Self {
        self.nc = Some(nc);
        self
    }

    pub fn with_letterbox(mut self, x: LetterboxOptions) -> Self {
        self.letterbox = x;
        self
    }

    pub fn validate(&self) -> Result<(), DetectError> {
        if !(0.0..=1.0).contains(&self.conf_thres) {
            return Err(DetectError::InvalidConfig(format!("conf_thres {} is outside [0, 1]", self.conf_thres)));
        }
        if !(0.0..=1.0).contains(&self.iou_thres) {
            return Err(DetectError::InvalidConfig(format!("iou_thres {} is outside [0, 1]", self.iou_thres)));
        }
        if self.max_det == 0 || self.max_nms == 0 {
            return Err(DetectError::InvalidConfig("max_det and max_nms must be at least 1".to_string()));
        }
        if self.nc == Some(0) {
            return Err(DetectError::InvalidConfig("nc must be at least 1".to_string()));
        }
        if self.letterbox.stride == Some(0) {
            return Err(DetectError::InvalidConfig("letterbox stride must be at least 1".to_string()));
        }
        if self.split_width < 1 || self.split_height < 1 {
            return Err(DetectError::InvalidTileConfig(format!(
                "split counts must be at least 1, got {}x{}",
                self.split_width, self.split_height
            )));
        }
        Ok(())
    }
}
