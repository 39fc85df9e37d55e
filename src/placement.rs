//! Probability of an entrant finishing inside the first `depth` positions of a sampled
//! ordering. The summed ordering probabilities are divided by `depth`, so the result is
//! bounded by `1/depth` rather than 1; the scaling is deliberate and callers compensate
//! where a plain probability is needed.

use rustc_hash::FxHashMap;

use crate::mc::{MonteCarloEngine, OrderingDistribution, SampleError};
use crate::pool::Pool;

pub const DEFAULT_DEPTH: usize = 3;

pub fn place_probability(dist: &OrderingDistribution, runner: usize, depth: usize) -> f64 {
    debug_assert!(depth > 0);
    let mut total = 0.0;
    for (ordering, prob) in dist.probs() {
        let placed = &ordering[..usize::min(depth, ordering.len())];
        if placed.contains(&runner) {
            total += prob;
        }
    }
    total / depth as f64
}

/// Placement values for runners `0..runners` in a single pass over the distribution.
pub fn place_probabilities(dist: &OrderingDistribution, runners: usize, depth: usize) -> Vec<f64> {
    debug_assert!(depth > 0);
    let mut totals = vec![0.0; runners];
    for (ordering, prob) in dist.probs() {
        for &runner in &ordering[..usize::min(depth, ordering.len())] {
            totals[runner] += prob;
        }
    }
    for total in &mut totals {
        *total /= depth as f64;
    }
    totals
}

/// Samples a fresh distribution for the pool and maps every entrant to its placement value.
pub fn place_table(
    pool: &Pool,
    trials: u64,
    depth: usize,
    seed: Option<u64>,
) -> Result<FxHashMap<String, f64>, SampleError> {
    let mut engine = MonteCarloEngine::default().with_trials(trials);
    if let Some(seed) = seed {
        engine = engine.with_seed(seed);
    }
    let dist = engine.estimate(pool)?;
    let probs = place_probabilities(&dist, pool.len(), depth);
    Ok(pool.runners().iter().cloned().zip(probs).collect())
}
