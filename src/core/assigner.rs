use crate::domain::model::Professional;
use crate::utils::error::{EngineError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Returns `k` distinct members of `pool` chosen uniformly at random.
///
/// Partial Fisher-Yates: position `i` is swapped with a uniformly chosen
/// position in `i..n`, so every k-subset (and every ordering of it) is
/// equally likely. `k` is clamped to the pool size.
pub fn draw_without_replacement<T, R: Rng + ?Sized>(mut pool: Vec<T>, k: usize, rng: &mut R) -> Vec<T> {
    let n = pool.len();
    let k = k.min(n);
    for i in 0..k {
        let j = rng.gen_range(i..n);
        pool.swap(i, j);
    }
    pool.truncate(k);
    pool
}

/// Picks one eligible professional with equal probability. No load or
/// rating bias.
pub struct Assigner<R: Rng + Send = StdRng> {
    rng: Mutex<R>,
}

impl Assigner<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng + Send> Assigner<R> {
    pub fn new(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    pub fn assign(&self, eligible: Vec<Professional>) -> Result<Professional> {
        if eligible.is_empty() {
            return Err(EngineError::NoEligibleProfessional);
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        draw_without_replacement(eligible, 1, &mut *rng)
            .pop()
            .ok_or(EngineError::NoEligibleProfessional)
    }
}
