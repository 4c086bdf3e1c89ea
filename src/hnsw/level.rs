//! Random layer assignment.
//!
//! A new slot's top layer is `floor(-ln(U) * mL)` with `U ~ Uniform(0, 1]` and
//! `mL = 1 / ln(M)`, so each layer holds roughly `1/M` of the slots of the
//! layer below it (Malkov & Yashunin, 2018).

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Hard ceiling on assigned levels; reaching it requires `U < M^-32`.
pub const MAX_LEVEL: usize = 32;

/// Draws layer assignments from an injectable random source.
pub struct LevelGenerator {
    ml: f64,
    rng: Box<dyn RngCore + Send>,
}

impl LevelGenerator {
    /// Generator over any random source.
    pub fn new(m: usize, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            ml: 1.0 / (m as f64).ln(),
            rng,
        }
    }

    /// Generator seeded deterministically, or from the OS when `seed` is `None`.
    pub fn seeded(m: usize, seed: Option<u64>) -> Self {
        let rng: Box<dyn RngCore + Send> = match seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(StdRng::from_os_rng()),
        };
        Self::new(m, rng)
    }

    /// Level multiplier `1 / ln(M)`.
    pub fn ml(&self) -> f64 {
        self.ml
    }

    pub fn sample(&mut self) -> usize {
        // `random` yields [0, 1); flip it so ln never sees zero.
        let u = 1.0 - self.rng.random::<f64>();
        let level = (-u.ln() * self.ml).floor();
        (level as usize).min(MAX_LEVEL)
    }
}

impl std::fmt::Debug for LevelGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelGenerator")
            .field("ml", &self.ml)
            .finish_non_exhaustive()
    }
}
