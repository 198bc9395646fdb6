pub mod decoder;
pub mod letterbox;
pub mod model;
pub mod nms;
pub mod ort_detector;
pub mod rescale;
pub mod tiling;

pub use model::Model;
pub use nms::{non_max_suppression, Nms, NmsParams};
pub use ort_detector::*;
