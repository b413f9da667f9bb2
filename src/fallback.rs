//! Synthetic readings shown when the status endpoint is unusable.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::reading::Reading;

/// Five independent draws, each uniform in [0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draws {
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub cycle: f64,
    pub noise: f64,
}

pub trait SyntheticSource {
    fn draws(&mut self) -> Draws;
}

/// Draws from any `rand` generator.
pub struct RngSource<R: RngCore> {
    rng: R,
}

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Seeded when `seed` is given, OS entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::new(StdRng::seed_from_u64(s)),
            None => Self::new(StdRng::from_entropy()),
        }
    }
}

impl<R: RngCore> SyntheticSource for RngSource<R> {
    fn draws(&mut self) -> Draws {
        Draws {
            voltage: self.rng.gen(),
            current: self.rng.gen(),
            temperature: self.rng.gen(),
            cycle: self.rng.gen(),
            noise: self.rng.gen(),
        }
    }
}

/// Always returns the same draws.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub Draws);

impl SyntheticSource for FixedSource {
    fn draws(&mut self) -> Draws {
        self.0
    }
}

pub const MAX_CYCLE: u32 = 199;

/// voltage ∈ [3.0, 4.2), current ∈ [-2.0, -0.5), temperature ∈ [20, 35),
/// cycle ∈ 0..=199, soh = 100 - cycle * 0.05 - noise * 5.
pub fn synthesize(d: Draws) -> Reading {
    let cycle = ((d.cycle * 200.0).floor() as u32).min(MAX_CYCLE);
    Reading {
        voltage: below(3.0 + d.voltage * 1.2, 4.2),
        current: below(-2.0 + d.current * 1.5, -0.5),
        temperature: below(20.0 + d.temperature * 15.0, 35.0),
        cycle,
        soh: 100.0 - (cycle as f64 * 0.05) - (d.noise * 5.0),
    }
}

/// Scaling a draw just under 1.0 can round up onto the open bound.
fn below(x: f64, hi: f64) -> f64 {
    if x < hi {
        return x;
    }
    // largest f64 strictly less than a finite non-zero `hi`
    let bits = hi.to_bits();
    f64::from_bits(if hi > 0.0 { bits - 1 } else { bits + 1 })
}

pub fn generate(source: &mut dyn SyntheticSource) -> Reading {
    synthesize(source.draws())
}
