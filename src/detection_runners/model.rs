use ndarray::{Array4, ArrayD};

/// The network forward pass, treated as a black box.
///
/// Implementations take a `(1, 3, h, w)` tensor normalized to `[0, 1]` and
/// return the raw predictions of every anchor at every scale, concatenated.
/// Output must be deterministic for identical input.
pub trait Model: Send {
    /// Network input size as `(width, height)`.
    fn input_size(&self) -> (u32, u32);

    fn forward(&mut self, input: Array4<f32>) -> anyhow::Result<ArrayD<f32>>;

    /// Class names embedded in the model, if any.
    fn names(&self) -> Option<Vec<String>> {
        None
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn input_size(&self) -> (u32, u32) {
        (**self).input_size()
    }

    fn forward(&mut self, input: Array4<f32>) -> anyhow::Result<ArrayD<f32>> {
        (**self).forward(input)
    }

    fn names(&self) -> Option<Vec<String>> {
        (**self).names()
    }
}
