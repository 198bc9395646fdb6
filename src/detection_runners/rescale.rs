use crate::common::Detection;
use crate::data::LetterboxTransform;

/// Maps detections from letterboxed space back into the space of the image the
/// letterbox was computed from, clipping every coordinate into that image.
pub fn scale_detections(detections: &mut [Detection], transform: &LetterboxTransform) {
    for detection in detections.iter_mut() {
        detection.bbox = transform.inverse_box(&detection.bbox);
    }
}

/// Snaps coordinates to whole pixels.
pub fn round_detections(detections: &mut [Detection]) {
    for detection in detections.iter_mut() {
        detection.bbox = detection.bbox.round();
    }
}
