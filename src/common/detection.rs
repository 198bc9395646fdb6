use serde::{Deserialize, Serialize};
use crate::common::BBox;

/// A single detected object. The coordinate space of `bbox` depends on the
/// pipeline stage: network input space after decoding, original image space
/// after rescaling.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: usize,
    pub bbox: BBox,
    pub confidence: f32,
    pub label: Option<String>,
}

impl Detection {
    pub fn new(class_id: usize, bbox: BBox, confidence: f32) -> Self {
        Self {
            class_id,
            bbox,
            confidence,
            label: None,
        }
    }

    /// Sets the bounding box's coordinates using `(cx, cy, w, h)`.
    ///
    /// # Arguments
    ///
    /// * `cx` - The x-coordinate of the horizontal center.
    /// * `cy` - The y-coordinate of the vertical center.
    /// * `w` - The width of the bounding box.
    /// * `h` - The height of the bounding box.
    ///
    /// # Returns
    ///
    /// A `Detection` instance with updated coordinates.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = BBox::from_cxcywh(cx, cy, w, h);
        self
    }

    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    pub fn with_class_id(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn get_label(&self) -> String {
        self.label.clone().unwrap_or("Unknown".to_string())
    }

    /// Moves the detection from a tile's local space into the parent image space.
    pub fn translate(mut self, dx: f32, dy: f32) -> Self {
        self.bbox = self.bbox.translate(dx, dy);
        self
    }

    /// Computes the intersection over union with another detection, ignoring class.
    pub fn iou(&self, other: &Detection) -> f32 {
        self.bbox.iou(&other.bbox)
    }
}
