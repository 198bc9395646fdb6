use std::collections::BTreeMap;
use serde::Serialize;
use crate::common::Detection;

/// Detections grouped by class id. Classes iterate in ascending order and each
/// class keeps its insertion order, so merged tile results are deterministic.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSet {
    classes: BTreeMap<usize, Vec<Detection>>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, detection: Detection) {
        self.classes.entry(detection.class_id).or_default().push(detection);
    }

    pub fn get(&self, class_id: usize) -> Option<&Vec<Detection>> {
        self.classes.get(&class_id)
    }

    pub fn class_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.classes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Vec<Detection>)> {
        self.classes.iter().map(|(k, v)| (*k, v))
    }

    /// Total number of detections over all classes.
    pub fn len(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens the set, class by class.
    pub fn into_detections(self) -> Vec<Detection> {
        self.classes.into_values().flatten().collect()
    }
}

impl Extend<Detection> for DetectionSet {
    fn extend<T: IntoIterator<Item = Detection>>(&mut self, iter: T) {
        for detection in iter {
            self.push(detection);
        }
    }
}

impl FromIterator<Detection> for DetectionSet {
    fn from_iter<T: IntoIterator<Item = Detection>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
