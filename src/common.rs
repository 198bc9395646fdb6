mod bbox;
mod detect_output;
mod detection;
mod detection_set;
mod inference_device;
mod model_scale;

pub use bbox::*;
pub use detect_output::*;
pub use detection::*;
pub use detection_set::*;
pub use inference_device::*;
pub use model_scale::*;
