use std::time::Instant;
use image::RgbImage;
use ndarray::{Array4, ArrayD};
use parking_lot::Mutex;
use rayon::prelude::*;
use crate::common::{BoxFormat, DetectOutput, Detection, DetectionSet};
use crate::data::{DetectorConfig, LetterboxTransform, Tile, TileGrid};
use crate::detection_runners::decoder::decode_predictions;
use crate::detection_runners::letterbox::{letterbox, to_nchw_tensor};
use crate::detection_runners::rescale::{round_detections, scale_detections};
use crate::detection_runners::tiling::{crop_tile, merge_tiles};
use crate::detection_runners::{non_max_suppression, Model, NmsParams};
use crate::errors::DetectError;
use crate::{utils, Result};

/// Runs the detection pipeline around a model handle.
///
/// The model sits behind a mutex: every forward pass is serialized, while
/// letterboxing and post-processing of independent tiles may run concurrently.
#[derive(Debug)]
pub struct Detector<M: Model> {
    model: Mutex<M>,
    input_size: (u32, u32),
    config: DetectorConfig,
    names: Option<Vec<String>>,
}

impl<M: Model> Detector<M> {
    pub fn new(model: M, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        let input_size = model.input_size();
        if input_size.0 == 0 || input_size.1 == 0 {
            return Err(DetectError::InvalidConfig(format!(
                "model input size {}x{} has zero area",
                input_size.0, input_size.1
            )));
        }
        let names = model.names();

        Ok(Self {
            model: Mutex::new(model),
            input_size,
            config,
            names,
        })
    }

    /// Overrides the class names used to label detections.
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    pub fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    pub fn into_model(self) -> M {
        self.model.into_inner()
    }

    /// Letterboxes `image` to the model input size.
    fn preprocess(&self, image: &RgbImage) -> Result<(Array4<f32>, LetterboxTransform)> {
        let (w, h) = self.input_size;
        let (letterboxed, transform) = letterbox(image, w, h, &self.config.letterbox)?;
        Ok((to_nchw_tensor(&letterboxed)?, transform))
    }

    fn inference(&self, input: Array4<f32>) -> Result<ArrayD<f32>> {
        let mut model = self.model.lock();
        Ok(model.forward(input)?)
    }

    /// Decode, suppress and map back into the space of the letterboxed image.
    fn postprocess(&self, output: &ArrayD<f32>, transform: &LetterboxTransform) -> Result<Vec<Detection>> {
        let candidates = decode_predictions(
            output,
            self.config.layout,
            self.config.nc,
            self.config.conf_thres,
            self.config.classes.as_ref(),
        )?;
        let n_candidates = candidates.len();

        let mut detections = non_max_suppression(candidates, &NmsParams::from(&self.config));
        scale_detections(&mut detections, transform);
        if self.config.round_coords {
            round_detections(&mut detections);
        }
        if let Some(names) = &self.names {
            for detection in detections.iter_mut() {
                if let Some(name) = names.get(detection.class_id) {
                    detection.label = Some(name.clone());
                }
            }
        }

        log::debug!("{} candidates -> {} detections", n_candidates, detections.len());
        Ok(detections)
    }

    /// Single image pipeline. Boxes are in `image` space, sorted by score.
    pub fn detect_image(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let detect_time = Instant::now();
        let mut elapsed = detect_time.elapsed();

        let (input, transform) = self.preprocess(image)?;
        elapsed = utils::trace("TIME", "Preprocessing input", detect_time, elapsed);

        let output = self.inference(input)?;
        elapsed = utils::trace("TIME", "Detection run", detect_time, elapsed);

        let detections = self.postprocess(&output, &transform)?;
        utils::trace("TIME", "Postprocessing", detect_time, elapsed);

        Ok(detections)
    }

    /// Tiled pipeline: every tile goes through [`Detector::detect_image`] on its own and
    /// the results are merged per class in full-image coordinates.
    pub fn detect_split(&self, image: &RgbImage, split_width: u32, split_height: u32) -> Result<DetectionSet> {
        let (w, h) = image.dimensions();
        let grid = TileGrid::new(w, h, split_width, split_height, self.config.tile_overlap)?;

        let run_tile = |tile: &Tile| -> Result<(Tile, Vec<Detection>)> {
            let sub_image = crop_tile(image, tile);
            Ok((*tile, self.detect_image(&sub_image)?))
        };

        let tile_results: Vec<(Tile, Vec<Detection>)> = if self.config.parallel_tiles {
            grid.tiles().par_iter().map(run_tile).collect::<Result<_>>()?
        } else {
            grid.tiles().iter().map(run_tile).collect::<Result<_>>()?
        };

        let merged = merge_tiles(tile_results);
        if !self.config.merge_nms {
            return Ok(merged);
        }

        let n_merged = merged.len();
        let merged: DetectionSet = non_max_suppression(merged.into_detections(), &NmsParams::from(&self.config))
            .into_iter()
            .collect();
        log::debug!("cross-tile suppression: {} -> {} detections", n_merged, merged.len());
        Ok(merged)
    }

    /// Detects objects in `image`, splitting it into `split_width x split_height`
    /// tiles when either count is above 1.
    pub fn detect(&self, image: &RgbImage, split_width: u32, split_height: u32) -> Result<DetectOutput> {
        let format = BoxFormat::from_xcycwh(self.config.xcycwh);
        if split_width == 1 && split_height == 1 {
            let detections = self.detect_image(image)?;
            return Ok(DetectOutput::from_detections(&detections, format));
        }

        let merged = self.detect_split(image, split_width, split_height)?;
        Ok(DetectOutput::from_detections(&merged.into_detections(), format))
    }

    /// [`Detector::detect`] with the split grid from the configuration.
    pub fn run(&self, image: &RgbImage) -> Result<DetectOutput> {
        self.detect(image, self.config.split_width, self.config.split_height)
    }
}
