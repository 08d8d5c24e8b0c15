use rand::Rng;
use rand_distr::StandardNormal;

/// Produces frames by perturbing a learned per-byte mean with gaussian noise.
pub struct Generator {
    mean: Vec<f32>,
    noise: f32,
    learning_rate: f32,
    last: Option<Vec<f32>>,
}

impl Generator {
    /// Creates a new `Generator` centered at mid gray.
    ///
    /// # Arguments
    /// * `frame_len` - The size of every generated frame.
    /// * `noise` - Standard deviation of the noise, in `[0, 1]` pixel units.
    /// * `learning_rate` - How far a single feedback moves the mean.
    pub fn new(frame_len: usize, noise: f32, learning_rate: f32) -> Self {
        Self {
            mean: vec![0.5; frame_len],
            noise,
            learning_rate,
            last: None,
        }
    }

    /// Samples a new frame, remembering it for the next feedback.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> Vec<u8> {
        let sample: Vec<f32> = self
            .mean
            .iter()
            .map(|&m| {
                let n: f32 = rng.sample(StandardNormal);
                (m + self.noise * n).clamp(0.0, 1.0)
            })
            .collect();

        let frame = sample.iter().map(|&v| (v * 255.0).round() as u8).collect();
        self.last = Some(sample);
        frame
    }

    /// Moves the mean towards the last sample when `loss` is below one half
    /// and away from it otherwise.
    ///
    /// Feedback without a previous sample is ignored.
    pub fn feedback(&mut self, loss: f64) {
        let Some(last) = self.last.take() else {
            return;
        };

        let advantage = 0.5 - loss.clamp(0.0, 1.0) as f32;
        let step = self.learning_rate * advantage;

        for (m, x) in self.mean.iter_mut().zip(last) {
            *m = (*m + step * (x - *m)).clamp(0.0, 1.0);
        }
    }

    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    pub fn mean_mut(&mut self) -> &mut Vec<f32> {
        &mut self.mean
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn same_seed_same_frames() {
        let mut a = Generator::new(16, 0.2, 0.1);
        let mut b = Generator::new(16, 0.2, 0.1);
        let mut ra = StdRng::seed_from_u64(7);
        let mut rb = StdRng::seed_from_u64(7);

        let fa = a.generate(&mut ra);
        assert_eq!(fa.len(), 16);
        assert_eq!(fa, b.generate(&mut rb));
    }

    #[test]
    fn low_loss_pulls_the_mean_towards_the_sample() {
        let mut g = Generator::new(4, 0.3, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let frame = g.generate(&mut rng);

        g.feedback(0.0);

        for (m, b) in g.mean().iter().zip(frame) {
            let x = b as f32 / 255.0;
            assert!((m - 0.5).abs() <= (x - 0.5).abs() + 1e-6);
            assert!((m - x).abs() <= (0.5 - x).abs() + 1e-2);
        }
    }

    #[test]
    fn feedback_without_sample_is_ignored() {
        let mut g = Generator::new(3, 0.3, 1.0);
        g.feedback(0.0);
        assert_eq!(g.mean(), &[0.5, 0.5, 0.5]);
    }
}
