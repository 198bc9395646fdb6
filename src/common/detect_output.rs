use serde::{Deserialize, Serialize};
use crate::common::Detection;

/// Output box representation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxFormat {
    /// `(center_x, center_y, width, height)`
    #[default]
    Cxcywh,
    /// `(x_min, y_min, x_max, y_max)`
    Xyxy,
}

impl BoxFormat {
    pub fn from_xcycwh(xcycwh: bool) -> Self {
        if xcycwh {
            BoxFormat::Cxcywh
        } else {
            BoxFormat::Xyxy
        }
    }
}

/// Three index-aligned sequences: box `i`, score `i` and class `i` describe the
/// same detection.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DetectOutput {
    pub boxes: Vec<[f32; 4]>,
    pub scores: Vec<f32>,
    pub class_ids: Vec<usize>,
    pub format: BoxFormat,
}

impl DetectOutput {
    pub fn from_detections<'a, I>(detections: I, format: BoxFormat) -> Self
    where
        I: IntoIterator<Item = &'a Detection>,
    {
        let mut output = Self {
            format,
            ..Default::default()
        };
        for detection in detections {
            let (a, b, c, d) = match format {
                BoxFormat::Cxcywh => detection.bbox.cxy_wh(),
                BoxFormat::Xyxy => detection.bbox.xy1_xy2(),
            };
            output.boxes.push([a, b, c, d]);
            output.scores.push(detection.confidence);
            output.class_ids.push(detection.class_id);
        }
        output
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Maps every class id through `names`. Ids without a name map to `"Unknown"`.
    pub fn labels(&self, names: &[String]) -> Vec<String> {
        self.class_ids
            .iter()
            .map(|&id| names.get(id).cloned().unwrap_or("Unknown".to_string()))
            .collect()
    }
}
