//! Random-walk update for live sensor values.
//!
//! Each tick nudges a sensor by a jitter proportional to 2% of its limit,
//! normalized by the current value. With a small probability the value is
//! forced just above its limit so the alerting path gets exercised.
//!
//! The division by the current value is kept as observed: the relative swing
//! grows as the value approaches zero. At exactly zero the formula is not
//! defined, so the value is held and the reported change is zero.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Jitter magnitude as a fraction of the sensor limit.
const JITTER_FRACTION_OF_LIMIT: f64 = 0.02;

/// Maximum spike overshoot as a fraction of the sensor limit.
const SPIKE_OVERSHOOT: f64 = 0.1;

/// RNG driving the simulation. Seed it to make ticks reproducible.
pub type SimulationRng = StdRng;

/// Build the simulation RNG from an optional seed.
pub fn simulation_rng(seed: Option<u64>) -> SimulationRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Outcome of one random-walk step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkStep {
    pub value: f64,
    pub change_percent: f64,
    pub spiked: bool,
}

/// Advance `value` by one random-walk step.
///
/// Draw order is fixed (jitter, spike roll, then spike magnitude only when
/// the spike fires) so that a seeded RNG reproduces the same sequence.
pub fn random_walk<R>(value: f64, limit: f64, spike_probability: f64, rng: &mut R) -> WalkStep
where
    R: Rng + ?Sized,
{
    // ---
    let r = rng.gen::<f64>() - 0.5;
    let mut change_percent = r * (limit * JITTER_FRACTION_OF_LIMIT) / value * 100.0;
    let mut candidate = (value * (1.0 + change_percent / 100.0)).max(0.0);

    if !change_percent.is_finite() || !candidate.is_finite() {
        change_percent = 0.0;
        candidate = if value.is_finite() { value.max(0.0) } else { 0.0 };
    }

    let spiked = rng.gen::<f64>() < spike_probability;
    if spiked {
        let u = rng.gen::<f64>();
        candidate = limit * (1.0 + u * SPIKE_OVERSHOOT);
    }

    WalkStep {
        value: candidate,
        change_percent,
        spiked,
    }
}
