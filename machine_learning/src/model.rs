use std::{num::NonZeroUsize, path::Path};

use log::debug;

use crate::Result;

/// The binary class attached to a frame.
///
/// In adversarial sessions `Negative` marks synthetic frames and `Positive`
/// frames coming from the real source.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Negative = 0,
    Positive = 1,
}

impl Label {
    /// Parses a label byte.
    ///
    /// # Returns
    /// `None` for any value other than 0 or 1.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Label::Negative),
            1 => Some(Label::Positive),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// The numeric training target of this label.
    pub fn target(self) -> f32 {
        match self {
            Label::Negative => 0.0,
            Label::Positive => 1.0,
        }
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        if value { Label::Positive } else { Label::Negative }
    }
}

/// A single supervised sample, an opaque frame and its class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub frame: Vec<u8>,
    pub label: Label,
}

impl Sample {
    pub fn new(frame: Vec<u8>, label: Label) -> Self {
        Self { frame, label }
    }
}

/// The capabilities a training session needs from a model.
///
/// The session never looks inside a model, it only moves frames, labels and
/// scalar losses between these calls and the network.
pub trait Model {
    /// Produces a synthetic frame.
    fn generate(&mut self) -> Vec<u8>;

    /// Predicts the class of `frame`.
    fn classify(&mut self, frame: &[u8]) -> Label;

    /// Makes a single training step on one sample.
    ///
    /// # Returns
    /// The loss of the sample before the update.
    fn train(&mut self, frame: &[u8], label: Label) -> f64;

    /// Trains `epochs` passes over `batch`.
    ///
    /// # Returns
    /// The mean sample loss of the last pass, zero for an empty batch.
    fn train_batch(&mut self, batch: &[Sample], epochs: NonZeroUsize) -> f64 {
        if batch.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        for epoch in 0..epochs.get() {
            total = batch
                .iter()
                .map(|sample| self.train(&sample.frame, sample.label))
                .sum();

            debug!(epoch = epoch + 1, loss = total; "batch epoch done");
        }

        total / batch.len() as f64
    }

    /// Feeds a loss computed elsewhere back into the generative part.
    ///
    /// # Returns
    /// The loss value that was applied.
    fn apply_loss(&mut self, loss: f64) -> f64;

    /// Persists the model parameters at `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Replaces the model parameters with the ones stored at `path`.
    fn load(&mut self, path: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_bytes() {
        assert_eq!(Label::from_byte(0), Some(Label::Negative));
        assert_eq!(Label::from_byte(1), Some(Label::Positive));
        assert_eq!(Label::from_byte(2), None);
        assert_eq!(Label::from_byte(255), None);
        assert_eq!(Label::Positive.as_byte(), 1);
        assert_eq!(Label::from(false), Label::Negative);
    }
}
