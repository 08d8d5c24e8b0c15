use ndarray::{Array1, ArrayView1};

use crate::{
    Label,
    arch::{
        activations::Sigmoid,
        loss::{BinaryCrossEntropy, LossFn},
    },
    optimization::{GradientDescent, Optimizer},
};

/// Logistic regression over a fixed amount of features extracted from a frame.
pub struct Discriminator {
    features: usize,
    params: Vec<f32>,
    grad: Vec<f32>,
    act: Sigmoid,
    loss: BinaryCrossEntropy,
    optimizer: GradientDescent,
}

impl Discriminator {
    /// Creates a new `Discriminator` with all parameters set to zero.
    ///
    /// # Arguments
    /// * `features` - How many features each frame is reduced to.
    /// * `learning_rate` - The optimizer step length.
    pub fn new(features: usize, learning_rate: f32) -> Self {
        Self {
            features,
            params: vec![0.0; features + 1],
            grad: vec![0.0; features + 1],
            act: Sigmoid::default(),
            loss: BinaryCrossEntropy::new(),
            optimizer: GradientDescent::new(learning_rate),
        }
    }

    /// The probability of `frame` belonging to the positive class.
    pub fn predict(&self, frame: &[u8]) -> f32 {
        let x = extract_features(frame, self.features);
        self.act.f(self.logit(x.view()))
    }

    /// Makes one gradient descent step on a single sample.
    ///
    /// # Returns
    /// The sample loss before the update.
    pub fn step(&mut self, frame: &[u8], label: Label) -> f32 {
        let Self {
            features,
            params,
            grad,
            act,
            loss,
            optimizer,
        } = self;

        let n = *features;
        let x = extract_features(frame, n);
        let z = ArrayView1::from(&params[..n]).dot(&x) + params[n];
        let p = act.f(z);
        let y = label.target();

        let delta = loss.loss_prime(p, y);
        for (g, xi) in grad[..n].iter_mut().zip(x.iter()) {
            *g = delta * xi;
        }
        grad[n] = delta;

        optimizer.update_params(params, grad);
        loss.loss(p, y)
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    fn logit(&self, x: ArrayView1<f32>) -> f32 {
        let n = self.features;
        ArrayView1::from(&self.params[..n]).dot(&x) + self.params[n]
    }
}

/// Reduces a frame of any length to `n` features in `[0, 1]`.
///
/// The frame is split into `n` contiguous buckets whose mean byte value is
/// the feature. Frames shorter than `n` repeat bytes, empty frames map to
/// all zeros.
pub fn extract_features(frame: &[u8], n: usize) -> Array1<f32> {
    let mut x = Array1::zeros(n);
    let len = frame.len();

    if len == 0 {
        return x;
    }

    for (i, v) in x.iter_mut().enumerate() {
        let start = i * len / n;
        let end = ((i + 1) * len / n).max(start + 1);
        let bucket = &frame[start..end];
        let sum: f32 = bucket.iter().map(|&b| b as f32).sum();
        *v = sum / (bucket.len() as f32 * 255.0);
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_average_buckets() {
        let x = extract_features(&[0, 255, 255, 255], 2);
        assert_eq!(x.to_vec(), vec![0.5, 1.0]);

        let x = extract_features(&[255], 3);
        assert_eq!(x.to_vec(), vec![1.0, 1.0, 1.0]);

        let x = extract_features(&[], 3);
        assert_eq!(x.to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn learns_bright_from_dark() {
        let mut d = Discriminator::new(8, 0.5);
        let bright = vec![230u8; 32];
        let dark = vec![20u8; 32];

        let first = d.step(&bright, Label::Positive);
        let mut last = first;
        for _ in 0..200 {
            last = d.step(&bright, Label::Positive);
            d.step(&dark, Label::Negative);
        }

        assert!(last < first);
        assert!(d.predict(&bright) > 0.5);
        assert!(d.predict(&dark) < 0.5);
    }
}
