//! Monte Carlo sampling of finishing orders. One trial draws entrants without replacement,
//! each selection proportional to the remaining weight; repeated trials tally into an
//! empirical distribution over the observed orderings.

use rustc_hash::FxHashMap;
use thiserror::Error;
use tinyrand::{Rand, Seeded, StdRand};
use tinyrand_std::clock_seed::ClockSeed;
use tracing::debug;

use crate::pool::Pool;
use crate::probs::SliceExt;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("sample size {requested} exceeds pool size {available}")]
    InvalidSampleSize { requested: usize, available: usize },

    #[error("remaining weight {remaining} is not positive")]
    DegenerateWeights { remaining: f64 },
}

/// Draws one weighted ordering of length `podium.len()` into `podium`. Entrants are selected
/// with probability proportional to their weight among those not yet drawn; the remaining
/// weight total must stay positive for every selection step.
pub fn run_once(
    weights: &[f64],
    podium: &mut [usize],
    bitmap: &mut [bool],
    rand: &mut impl Rand,
) -> Result<(), SampleError> {
    debug_assert_eq!(weights.len(), bitmap.len());
    debug_assert!(!podium.is_empty());
    if podium.len() > weights.len() {
        return Err(SampleError::InvalidSampleSize {
            requested: podium.len(),
            available: weights.len(),
        });
    }

    reset_bitmap(bitmap);
    let mut remaining = weights.sum();
    for rank in 0..podium.len() {
        if remaining <= 0.0 {
            return Err(SampleError::DegenerateWeights { remaining });
        }
        let random = random_f64(rand) * remaining;
        let mut cumulative = 0.0;
        let mut chosen = usize::MAX;
        for (runner, &weight) in weights.iter().enumerate() {
            if bitmap[runner] {
                // rounding in `remaining` can leave `random` above the final cumulative sum,
                // in which case the scan settles on the last undrawn entrant
                chosen = runner;
                cumulative += weight;
                if cumulative >= random {
                    break;
                }
            }
        }
        podium[rank] = chosen;
        bitmap[chosen] = false;
        remaining -= weights[chosen];
    }
    Ok(())
}

fn reset_bitmap(bitmap: &mut [bool]) {
    for flag in bitmap {
        *flag = true;
    }
}

#[inline]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

/// Occurrence counts per distinct full-length ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingTally {
    counts: FxHashMap<Vec<usize>, u64>,
    trials: u64,
    truncated: bool,
}
impl OrderingTally {
    pub fn counts(&self) -> &FxHashMap<Vec<usize>, u64> {
        &self.counts
    }

    /// Trials actually performed, which is less than the number requested when a cap halted
    /// the run early.
    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Divides every count by the performed trial count, yielding empirical probabilities
    /// over the observed orderings.
    pub fn normalise(self) -> OrderingDistribution {
        let trials = self.trials;
        let probs = self
            .counts
            .into_iter()
            .map(|(ordering, count)| (ordering, count as f64 / trials as f64))
            .collect();
        OrderingDistribution {
            probs,
            trials,
            truncated: self.truncated,
        }
    }
}

/// Empirical probabilities over the orderings observed in a sampling run. The values sum to 1
/// across observed orderings only; combinatorially possible but unobserved orderings carry no
/// entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingDistribution {
    probs: FxHashMap<Vec<usize>, f64>,
    trials: u64,
    truncated: bool,
}
impl OrderingDistribution {
    pub fn from_probs(entries: impl IntoIterator<Item = (Vec<usize>, f64)>, trials: u64) -> Self {
        Self {
            probs: entries.into_iter().collect(),
            trials,
            truncated: false,
        }
    }

    pub fn probs(&self) -> &FxHashMap<Vec<usize>, f64> {
        &self.probs
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

/// Repeatedly invokes [run_once] over full-length orderings and tallies the outcomes.
///
/// A fixed seed makes two runs over the same pool and trial count identical; without one,
/// each run is seeded from the system clock.
#[derive(Debug, Clone)]
pub struct MonteCarloEngine {
    trials: u64,
    max_trials: Option<u64>,
    seed: Option<u64>,
}
impl Default for MonteCarloEngine {
    fn default() -> Self {
        Self {
            trials: 100_000,
            max_trials: None,
            seed: None,
        }
    }
}
impl MonteCarloEngine {
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    /// Caps the run at `max_trials` regardless of the requested trial count. A capped run
    /// yields a partial tally flagged as truncated; the estimate remains consistent, only
    /// wider in its confidence interval.
    pub fn with_max_trials(mut self, max_trials: u64) -> Self {
        self.max_trials = Some(max_trials);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn tally(&self, pool: &Pool) -> Result<OrderingTally, SampleError> {
        let performed = match self.max_trials {
            Some(max_trials) => u64::min(self.trials, max_trials),
            None => self.trials,
        };
        let mut rand = match self.seed {
            Some(seed) => StdRand::seed(seed),
            None => StdRand::seed(ClockSeed::default().next_u64()),
        };

        let runners = pool.len();
        let mut podium = vec![usize::MAX; runners];
        let mut bitmap = vec![true; runners];
        let mut counts: FxHashMap<Vec<usize>, u64> = FxHashMap::default();
        for _ in 0..performed {
            run_once(pool.weights(), &mut podium, &mut bitmap, &mut rand)?;
            *counts.entry(podium.clone()).or_insert(0) += 1;
        }

        let truncated = performed < self.trials;
        if truncated {
            debug!(
                "halted after {performed} of {} requested trials",
                self.trials
            );
        }
        debug!("tallied {} distinct orderings over {performed} trials", counts.len());
        Ok(OrderingTally {
            counts,
            trials: performed,
            truncated,
        })
    }

    pub fn estimate(&self, pool: &Pool) -> Result<OrderingDistribution, SampleError> {
        self.tally(pool).map(OrderingTally::normalise)
    }
}

/// Estimates the ordering distribution for a pool in one call.
pub fn estimate_distribution(
    pool: &Pool,
    trials: u64,
    seed: Option<u64>,
) -> Result<OrderingDistribution, SampleError> {
    let mut engine = MonteCarloEngine::default().with_trials(trials);
    if let Some(seed) = seed {
        engine = engine.with_seed(seed);
    }
    engine.estimate(pool)
}
