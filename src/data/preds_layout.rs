use serde::{Deserialize, Serialize};

/// Row layout of the raw prediction tensor a YOLO style network emits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredsLayout {
    /// YOLOv5 | YOLOv6 | YOLOv7 : anchors first, `cx cy w h obj cls0..clsN`
    #[default]
    CxcywhObjClss,
    /// YOLOv8 | YOLOv11 : anchors last, `cx cy w h cls0..clsN`, no objectness
    CxcywhClss,
}

impl PredsLayout {
    pub fn from(version: &str) -> PredsLayout {
        match version.to_lowercase().as_str() {
            "yolov5" | "yolov6" | "yolov7" => PredsLayout::CxcywhObjClss,
            "yolov8" | "yolov9" | "yolov11" => PredsLayout::CxcywhClss,
            _ => PredsLayout::CxcywhObjClss,
        }
    }

    pub fn has_objectness(&self) -> bool {
        matches!(self, PredsLayout::CxcywhObjClss)
    }

    pub fn is_anchors_first(&self) -> bool {
        matches!(self, PredsLayout::CxcywhObjClss)
    }

    /// Number of leading non-class values in a row.
    pub fn header_len(&self) -> usize {
        if self.has_objectness() { 5 } else { 4 }
    }

    pub fn row_len(&self, nc: usize) -> usize {
        self.header_len() + nc
    }
}
