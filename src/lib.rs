mod utils;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod detectors;
pub mod errors;
pub mod send_channels;

use std::time::Instant;
use image::RgbImage;
use crate::common::DetectOutput;
use crate::data::{ConfigOrt, DetectorConfig};
use crate::detection_runners::{Model, OrtEngine};

pub use crate::detectors::Detector;
pub use crate::errors::DetectError;

pub type Result<T, E = DetectError> = std::result::Result<T, E>;

/// Builds an ONNX Runtime backed detector and warms it up with one dry run.
pub fn init_detector(ort_options: &ConfigOrt, config: DetectorConfig) -> anyhow::Result<Detector<OrtEngine>> {
    log::info!("Initializing ORT session with ({}) execution provider", ort_options.device);
    let engine = OrtEngine::new(ort_options)?;
    let detector = Detector::new(engine, config)?;

    let (w, h) = detector.input_size();
    detector.detect_image(&RgbImage::new(w, h))?;

    Ok(detector)
}

/// One detection using the split grid from the detector's configuration.
pub fn run_detection<M: Model>(detector: &Detector<M>, image: &RgbImage) -> Result<DetectOutput> {
    let now = Instant::now();

    let output = detector.run(image)?;

    log::debug!("Detected {} objects | Processing time: {:?}", output.len(), now.elapsed());

    Ok(output)
}
