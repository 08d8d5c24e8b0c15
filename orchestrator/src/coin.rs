use rand::{Rng, SeedableRng, rngs::StdRng};

/// A source of fair binary decisions.
pub trait Coin {
    fn toss(&mut self) -> bool;
}

/// A fair coin backed by a random number generator.
pub struct FairCoin<R> {
    rng: R,
}

impl<R: Rng> FairCoin<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl FairCoin<StdRng> {
    /// A coin seeded with `seed`, or from the os entropy when there is none.
    pub fn seeded(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self::new(rng)
    }
}

impl<R: Rng> Coin for FairCoin<R> {
    fn toss(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}
