mod config_ort;
mod detector_config;
mod preds_layout;

pub use config_ort::ConfigOrt;
pub use detector_config::{DetectorConfig, LetterboxOptions};
pub use preds_layout::PredsLayout;

pub use crate::detection_runners::letterbox::LetterboxTransform;
pub use crate::detection_runners::decoder::RawPrediction;
pub use crate::detection_runners::tiling::{Tile, TileGrid};

pub(crate) const CROSS_MARK: &str = "❌";
