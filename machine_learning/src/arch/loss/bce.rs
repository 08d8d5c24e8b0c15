use super::LossFn;

const EPS: f32 = 1e-7;

/// Binary cross entropy over a single probability.
#[derive(Default, Clone, Copy)]
pub struct BinaryCrossEntropy;

impl BinaryCrossEntropy {
    /// Returns a new `BinaryCrossEntropy`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for BinaryCrossEntropy {
    fn loss(&self, y_pred: f32, y: f32) -> f32 {
        let p = y_pred.clamp(EPS, 1. - EPS);
        -(y * p.ln() + (1. - y) * (1. - p).ln())
    }

    /// Derivative with respect to the pre-activation of a sigmoid output,
    /// where the chain rule collapses to `p - y`.
    fn loss_prime(&self, y_pred: f32, y: f32) -> f32 {
        y_pred - y
    }
}
