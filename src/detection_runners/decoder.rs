//! Turns the raw network output into confidence-filtered candidate detections.

use std::collections::HashSet;
use ndarray::{ArrayD, ArrayView1, ArrayView2, Axis, Ix2};
use crate::common::Detection;
use crate::data::PredsLayout;
use crate::errors::DetectError;
use crate::Result;

/// One row of network output, in network input pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    pub objectness: f32,
    pub class_scores: Vec<f32>,
}

impl RawPrediction {
    /// Parses a row. Layouts without an objectness column report an objectness of 1.
    pub fn from_row(row: ArrayView1<f32>, layout: PredsLayout) -> Self {
        let header = layout.header_len();
        Self {
            cx: row[0],
            cy: row[1],
            w: row[2],
            h: row[3],
            objectness: if layout.has_objectness() { row[4] } else { 1.0 },
            class_scores: row.iter().skip(header).copied().collect(),
        }
    }

    /// Objectness and class scores must lie in `[0, 1]`. NaN scores are not
    /// range errors, they simply never produce a detection.
    pub fn validate(&self) -> Result<()> {
        let out_of_range = |score: f32| !score.is_nan() && !(0.0..=1.0).contains(&score);
        if out_of_range(self.objectness) {
            return Err(DetectError::ModelOutputShape(format!(
                "objectness {} is outside [0, 1]",
                self.objectness
            )));
        }
        if let Some(score) = self.class_scores.iter().copied().find(|&s| out_of_range(s)) {
            return Err(DetectError::ModelOutputShape(format!("class score {} is outside [0, 1]", score)));
        }
        Ok(())
    }

    /// `(class_id, class_score)` of the best class. The first maximum wins ties.
    pub fn best_class(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (id, &score) in self.class_scores.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((id, score));
            }
        }
        best
    }

    /// `objectness * best class score` together with the class id.
    pub fn confidence(&self) -> Option<(usize, f32)> {
        self.best_class().map(|(id, score)| (id, self.objectness * score))
    }

    /// Corner-form detection, or `None` when the row has no usable class or box.
    pub fn to_detection(&self) -> Option<Detection> {
        let (class_id, confidence) = self.confidence()?;
        let detection = Detection::default()
            .with_cxcy_wh(self.cx, self.cy, self.w, self.h)
            .with_confidence(confidence)
            .with_class_id(class_id);
        detection.bbox.is_finite().then_some(detection)
    }
}

/// Normalizes the output tensor into an anchors-first `(N, row_len)` view.
pub fn prediction_rows<'a>(
    output: &'a ArrayD<f32>,
    layout: PredsLayout,
    nc: Option<usize>,
) -> Result<ArrayView2<'a, f32>> {
    let view = match output.ndim() {
        2 => output.view(),
        3 => {
            if output.shape()[0] != 1 {
                return Err(DetectError::ModelOutputShape(format!(
                    "expected a batch of 1, got {}",
                    output.shape()[0]
                )));
            }
            output.index_axis(Axis(0), 0)
        }
        n => {
            return Err(DetectError::ModelOutputShape(format!(
                "expected a 2D or 3D prediction tensor, got {}D {:?}",
                n,
                output.shape()
            )))
        }
    };
    let view = view
        .into_dimensionality::<Ix2>()
        .map_err(|e| DetectError::ModelOutputShape(e.to_string()))?;
    let rows = if layout.is_anchors_first() { view } else { view.reversed_axes() };

    let row_len = rows.ncols();
    let min_len = layout.row_len(1);
    if row_len < min_len {
        return Err(DetectError::ModelOutputShape(format!(
            "prediction rows hold {} values, at least {} are needed",
            row_len, min_len
        )));
    }
    if let Some(nc) = nc {
        if row_len != layout.row_len(nc) {
            return Err(DetectError::ModelOutputShape(format!(
                "prediction rows hold {} values, expected {} for {} classes",
                row_len,
                layout.row_len(nc),
                nc
            )));
        }
    }
    Ok(rows)
}

fn predictions<'a>(rows: ArrayView2<'a, f32>, layout: PredsLayout) -> impl Iterator<Item = RawPrediction> + 'a {
    (0..rows.nrows()).map(move |i| RawPrediction::from_row(rows.row(i), layout))
}

/// Parses every row of the output tensor.
pub fn raw_predictions(output: &ArrayD<f32>, layout: PredsLayout, nc: Option<usize>) -> Result<Vec<RawPrediction>> {
    let rows = prediction_rows(output, layout, nc)?;
    Ok(predictions(rows, layout).collect())
}

/// Filters raw predictions by confidence and class, returning corner-form
/// detections in network input space, in input order.
///
/// A score outside `[0, 1]` fails the whole output with `ModelOutputShape`.
pub fn decode_predictions(
    output: &ArrayD<f32>,
    layout: PredsLayout,
    nc: Option<usize>,
    conf_thres: f32,
    classes: Option<&HashSet<usize>>,
) -> Result<Vec<Detection>> {
    let rows = prediction_rows(output, layout, nc)?;

    let mut detections = Vec::new();
    for pred in predictions(rows, layout) {
        pred.validate()?;
        // with every score in [0, 1] objectness bounds the confidence
        if !(pred.objectness >= conf_thres) {
            continue;
        }
        let Some(detection) = pred.to_detection() else {
            continue;
        };
        if !(detection.confidence >= conf_thres) {
            continue;
        }
        if classes.is_some_and(|classes| !classes.contains(&detection.class_id)) {
            continue;
        }
        detections.push(detection);
    }

    Ok(detections)
}
