//! A [Pool] maps race entrants to non-negative weights: win-market money when used as sampling
//! input, show-market money when used as the payout denominator.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::probs::SliceExt;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("a pool requires at least one entrant")]
    Empty,

    #[error("negative weight {weight} for '{runner}'")]
    NegativeWeight { runner: String, weight: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    runners: Vec<String>,
    weights: Vec<f64>,
}
impl Pool {
    pub fn new(entries: Vec<(String, f64)>) -> Result<Self, PoolError> {
        if entries.is_empty() {
            return Err(PoolError::Empty);
        }
        let mut runners = Vec::with_capacity(entries.len());
        let mut weights = Vec::with_capacity(entries.len());
        for (runner, weight) in entries {
            if weight < 0.0 {
                return Err(PoolError::NegativeWeight { runner, weight });
            }
            runners.push(runner);
            weights.push(weight);
        }
        Ok(Self { runners, weights })
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    pub fn runners(&self) -> &[String] {
        &self.runners
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn runner(&self, index: usize) -> &str {
        &self.runners[index]
    }

    pub fn index_of(&self, runner: &str) -> Option<usize> {
        self.runners.iter().position(|candidate| candidate == runner)
    }

    pub fn weight_of(&self, runner: &str) -> Option<f64> {
        self.index_of(runner).map(|index| self.weights[index])
    }

    pub fn total(&self) -> f64 {
        self.weights.sum()
    }

    /// Each entrant's share of the total weight. A pool whose weights sum to zero maps every
    /// entrant to exactly 0.0 rather than dividing.
    pub fn relative(&self) -> FxHashMap<String, f64> {
        let total = self.total();
        self.runners
            .iter()
            .zip(&self.weights)
            .map(|(runner, &weight)| {
                let share = if total > 0.0 { weight / total } else { 0.0 };
                (runner.clone(), share)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn fixture() -> Pool {
        Pool::new(vec![
            ("Diamond's Honor".into(), 456.0),
            ("Queen McKinzie".into(), 2103.0),
            ("Sunna".into(), 595.0),
        ])
        .unwrap()
    }

    #[test]
    fn empty() {
        assert!(matches!(Pool::new(vec![]), Err(PoolError::Empty)));
    }

    #[test]
    fn negative_weight() {
        let result = Pool::new(vec![("Sunna".into(), -1.0)]);
        assert!(matches!(
            result,
            Err(PoolError::NegativeWeight { weight, .. }) if weight == -1.0
        ));
    }

    #[test]
    fn lookup() {
        let pool = fixture();
        assert_eq!(3, pool.len());
        assert_eq!(Some(1), pool.index_of("Queen McKinzie"));
        assert_eq!(None, pool.index_of("Phar Lap"));
        assert_eq!("Sunna", pool.runner(2));
        assert_eq!(Some(595.0), pool.weight_of("Sunna"));
        assert_f64_near!(3154.0, pool.total());
    }

    #[test]
    fn relative() {
        let pool = fixture();
        let relative = pool.relative();
        assert_float_absolute_eq!(456.0 / 3154.0, relative["Diamond's Honor"], 1e-9);
        assert_float_absolute_eq!(2103.0 / 3154.0, relative["Queen McKinzie"], 1e-9);
        assert_float_absolute_eq!(595.0 / 3154.0, relative["Sunna"], 1e-9);
    }

    #[test]
    fn relative_zero_total() {
        let pool = Pool::new(vec![("A".into(), 0.0), ("B".into(), 0.0)]).unwrap();
        let relative = pool.relative();
        assert_eq!(0.0, relative["A"]);
        assert_eq!(0.0, relative["B"]);
    }
}
