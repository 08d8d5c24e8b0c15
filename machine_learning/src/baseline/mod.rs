//! A small model that is good enough to exercise a training session end to end.
//!
//! The discriminator is a logistic regression over bucketed byte means and
//! the generator a gaussian around a learned per-byte mean. Real deployments
//! plug their own `Model` implementation instead.

mod discriminator;
mod generator;

use std::{fs, path::Path};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{Label, MlErr, Model, Result};

pub use discriminator::{Discriminator, extract_features};
pub use generator::Generator;

const FEATURES: usize = 64;
const DISCRIMINATOR_LR: f32 = 0.05;
const GENERATOR_LR: f32 = 0.1;
const NOISE: f32 = 0.1;

/// On disk representation of a `Baseline` model.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    discriminator: Vec<f32>,
    generator: Vec<f32>,
}

/// The default model of the harness.
pub struct Baseline {
    discriminator: Discriminator,
    generator: Generator,
    rng: StdRng,
}

impl Baseline {
    /// Creates a new `Baseline` model.
    ///
    /// # Arguments
    /// * `frame_len` - The size of the generated frames.
    /// * `seed` - Seed for the generator noise, `None` seeds from the os.
    pub fn new(frame_len: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            discriminator: Discriminator::new(FEATURES, DISCRIMINATOR_LR),
            generator: Generator::new(frame_len, NOISE, GENERATOR_LR),
            rng,
        }
    }

    /// The probability the discriminator assigns to `frame` being real.
    pub fn score(&self, frame: &[u8]) -> f32 {
        self.discriminator.predict(frame)
    }
}

impl Model for Baseline {
    fn generate(&mut self) -> Vec<u8> {
        self.generator.generate(&mut self.rng)
    }

    fn classify(&mut self, frame: &[u8]) -> Label {
        Label::from(self.discriminator.predict(frame) >= 0.5)
    }

    fn train(&mut self, frame: &[u8], label: Label) -> f64 {
        self.discriminator.step(frame, label) as f64
    }

    fn apply_loss(&mut self, loss: f64) -> f64 {
        self.generator.feedback(loss);
        loss
    }

    fn save(&self, path: &Path) -> Result<()> {
        let snapshot = Snapshot {
            discriminator: self.discriminator.params().to_vec(),
            generator: self.generator.mean().to_vec(),
        };

        fs::write(path, serde_json::to_vec(&snapshot)?)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let snapshot: Snapshot = serde_json::from_slice(&fs::read(path)?)?;

        let params = self.discriminator.params_mut();
        if snapshot.discriminator.len() != params.len() {
            return Err(MlErr::SizeMismatch {
                what: "discriminator parameters",
                got: snapshot.discriminator.len(),
                expected: params.len(),
            });
        }
        params.copy_from_slice(&snapshot.discriminator);

        // The generated frame size follows the stored model.
        *self.generator.mean_mut() = snapshot.generator;

        Ok(())
    }
}
