use crate::common::Detection;
use crate::data::DetectorConfig;

pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    fn class_id(&self) -> usize;
}

impl Nms for Detection {
    /// Computes the intersection over union (IoU) between this bounding box and another.
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    /// Returns the confidence score of the bounding box.
    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn class_id(&self) -> usize {
        self.class_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NmsParams {
    /// Boxes overlapping a kept box with IoU at or above this value are removed.
    pub iou_thres: f32,
    /// Suppress across classes instead of within each class.
    pub agnostic: bool,
    /// Candidates considered, highest scores first.
    pub max_nms: usize,
    /// Detections returned.
    pub max_det: usize,
}

impl Default for NmsParams {
    fn default() -> Self {
        Self {
            iou_thres: 0.3,
            agnostic: false,
            max_nms: 30000,
            max_det: 300,
        }
    }
}

impl From<&DetectorConfig> for NmsParams {
    fn from(config: &DetectorConfig) -> Self {
        Self {
            iou_thres: config.iou_thres,
            agnostic: config.agnostic_nms,
            max_nms: config.max_nms,
            max_det: config.max_det,
        }
    }
}

impl NmsParams {
    pub fn new(iou_thres: f32, agnostic: bool) -> Self {
        Self {
            iou_thres,
            agnostic,
            ..Default::default()
        }
    }
}

/// Greedy non-maximum suppression.
///
/// Boxes are stably sorted by descending confidence, so on equal scores the box
/// that came first in `boxes` is kept. Unless `agnostic` is set a box only
/// suppresses boxes of its own class, which gives the same result as running
/// suppression on each class separately. The output stays sorted by score.
pub fn non_max_suppression<T: Nms>(mut boxes: Vec<T>, params: &NmsParams) -> Vec<T> {
    // `sort_by` is stable
    boxes.sort_by(|b1, b2| b2.confidence().total_cmp(&b1.confidence()));
    boxes.truncate(params.max_nms);

    let mut suppressed = vec![false; boxes.len()];
    let mut keep = Vec::with_capacity(boxes.len().min(params.max_det));
    for i in 0..boxes.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        if keep.len() == params.max_det {
            break;
        }
        for j in (i + 1)..boxes.len() {
            if suppressed[j] {
                continue;
            }
            if !params.agnostic && boxes[i].class_id() != boxes[j].class_id() {
                continue;
            }
            if boxes[i].iou(&boxes[j]) >= params.iou_thres {
                suppressed[j] = true;
            }
        }
    }

    let mut kept = vec![false; boxes.len()];
    for i in keep {
        kept[i] = true;
    }
    boxes
        .into_iter()
        .zip(kept)
        .filter_map(|(b, k)| k.then_some(b))
        .collect()
}
