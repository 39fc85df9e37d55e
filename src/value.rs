//! Expected net winnings per unit staked, under either a parimutuel split of the show pool
//! or posted fixed odds.

use std::str::FromStr;

use rustc_hash::FxHashMap;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::mc::{MonteCarloEngine, OrderingDistribution, SampleError};
use crate::placement::{place_probabilities, DEFAULT_DEPTH};
use crate::pool::Pool;

#[derive(Debug, Clone, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum Method {
    #[strum(serialize = "parimutuel")]
    Parimutuel,

    #[strum(serialize = "fixed_odds")]
    FixedOdds,
}
impl Method {
    pub fn parse(name: &str) -> Result<Self, ValueError> {
        Self::from_str(name).map_err(|_| ValueError::UnknownMethod(name.into()))
    }
}

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("unknown method '{0}'")]
    UnknownMethod(String),

    #[error("{method} valuation requires {parameter}")]
    MissingParameter {
        method: Method,
        parameter: &'static str,
    },

    #[error("no posted odds for '{0}'")]
    MissingPrice(String),

    #[error("{0}")]
    Sample(#[from] SampleError),
}

/// Auxiliary market inputs. Each payout method reads only the datum it needs and fails if
/// that datum is absent.
#[derive(Debug, Clone, Default)]
pub struct MarketData<'a> {
    pub show_pool: Option<&'a Pool>,
    pub odds: Option<&'a FxHashMap<String, f64>>,
}

/// Expected net winnings per unit staked, keyed by entrant. `expected` is unconditional;
/// `conditional` assumes the entrant actually places.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub expected: FxHashMap<String, f64>,
    pub conditional: FxHashMap<String, f64>,
}

/// A moneyless show pool is a legitimate market state (betting not yet open), not an error;
/// it prices nothing and is reported as [ValuationOutcome::NoMarketMoney] for the caller to
/// skip.
#[derive(Debug, Clone, PartialEq)]
pub enum ValuationOutcome {
    Priced(Valuation),
    NoMarketMoney,
}

/// Prices an existing ordering distribution. Reusing one distribution across methods is
/// valid; it is a pure function of the pool, trial count and seed.
pub fn evaluate(
    pool: &Pool,
    dist: &OrderingDistribution,
    method: &Method,
    market: &MarketData,
) -> Result<ValuationOutcome, ValueError> {
    match method {
        Method::Parimutuel => {
            let show_pool = market.show_pool.ok_or(ValueError::MissingParameter {
                method: Method::Parimutuel,
                parameter: "show_pool",
            })?;
            Ok(evaluate_parimutuel(pool, dist, show_pool))
        }
        Method::FixedOdds => {
            let odds = market.odds.ok_or(ValueError::MissingParameter {
                method: Method::FixedOdds,
                parameter: "odds",
            })?;
            evaluate_fixed_odds(pool, dist, odds).map(ValuationOutcome::Priced)
        }
    }
}

/// Samples a fresh distribution for the pool, then prices it.
pub fn expected_value(
    pool: &Pool,
    method: &Method,
    trials: u64,
    market: &MarketData,
    seed: Option<u64>,
) -> Result<ValuationOutcome, ValueError> {
    let mut engine = MonteCarloEngine::default().with_trials(trials);
    if let Some(seed) = seed {
        engine = engine.with_seed(seed);
    }
    let dist = engine.estimate(pool)?;
    evaluate(pool, &dist, method, market)
}

fn evaluate_parimutuel(
    pool: &Pool,
    dist: &OrderingDistribution,
    show_pool: &Pool,
) -> ValuationOutcome {
    let total = show_pool.total();
    if total <= 0.0 {
        return ValuationOutcome::NoMarketMoney;
    }

    // show money aligned to the win pool's entrant order; an entrant nobody backed carries 0
    let show_money: Vec<f64> = pool
        .runners()
        .iter()
        .map(|runner| show_pool.weight_of(runner).unwrap_or(0.0))
        .collect();

    let mut gross = vec![0.0; pool.len()];
    for (ordering, prob) in dist.probs() {
        let placed = &ordering[..usize::min(DEFAULT_DEPTH, ordering.len())];
        let combined: f64 = placed.iter().map(|&runner| show_money[runner]).sum();
        if combined <= 0.0 {
            // a moneyless podium cannot be split
            continue;
        }
        let multiplier = total / combined;
        for &runner in placed {
            gross[runner] += prob * multiplier;
        }
    }

    let place_probs = place_probabilities(dist, pool.len(), DEFAULT_DEPTH);
    let mut expected = FxHashMap::default();
    let mut conditional = FxHashMap::default();
    for (runner, name) in pool.runners().iter().enumerate() {
        expected.insert(name.clone(), gross[runner] - 1.0);
        let given_place = if place_probs[runner] == 0.0 {
            // an entrant that never places loses the stake with certainty
            -1.0
        } else {
            gross[runner] / place_probs[runner] - 1.0
        };
        conditional.insert(name.clone(), given_place);
    }
    ValuationOutcome::Priced(Valuation {
        expected,
        conditional,
    })
}

fn evaluate_fixed_odds(
    pool: &Pool,
    dist: &OrderingDistribution,
    odds: &FxHashMap<String, f64>,
) -> Result<Valuation, ValueError> {
    let place_probs = place_probabilities(dist, pool.len(), DEFAULT_DEPTH);
    let mut expected = FxHashMap::default();
    let mut conditional = FxHashMap::default();
    for (runner, name) in pool.runners().iter().enumerate() {
        let &price = odds
            .get(name)
            .ok_or_else(|| ValueError::MissingPrice(name.clone()))?;
        expected.insert(name.clone(), place_probs[runner] * price);
        // posted odds do not depend on how the rest of the market wagered
        conditional.insert(name.clone(), price);
    }
    Ok(Valuation {
        expected,
        conditional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::estimate_distribution;
    use crate::placement::place_probability;
    use assert_float_eq::*;

    fn pool(weights: &[(&str, f64)]) -> Pool {
        Pool::new(
            weights
                .iter()
                .map(|(runner, weight)| (runner.to_string(), *weight))
                .collect(),
        )
        .unwrap()
    }

    fn priced(outcome: ValuationOutcome) -> Valuation {
        match outcome {
            ValuationOutcome::Priced(valuation) => valuation,
            ValuationOutcome::NoMarketMoney => panic!("expected a priced outcome"),
        }
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Parimutuel, Method::parse("parimutuel").unwrap());
        assert_eq!(Method::FixedOdds, Method::parse("fixed_odds").unwrap());
        assert_eq!("parimutuel", Method::Parimutuel.to_string());
    }

    #[test]
    fn unknown_method() {
        let result = Method::parse("exacta");
        assert!(matches!(result, Err(ValueError::UnknownMethod(name)) if name == "exacta"));
    }

    #[test]
    fn missing_show_pool() {
        let pool = pool(&[("A", 1.0), ("B", 1.0)]);
        let dist = estimate_distribution(&pool, 100, Some(42)).unwrap();
        let result = evaluate(&pool, &dist, &Method::Parimutuel, &MarketData::default());
        assert!(matches!(
            result,
            Err(ValueError::MissingParameter {
                method: Method::Parimutuel,
                parameter: "show_pool"
            })
        ));
    }

    #[test]
    fn missing_odds() {
        let pool = pool(&[("A", 1.0), ("B", 1.0)]);
        let dist = estimate_distribution(&pool, 100, Some(42)).unwrap();
        let result = evaluate(&pool, &dist, &Method::FixedOdds, &MarketData::default());
        assert!(matches!(
            result,
            Err(ValueError::MissingParameter {
                method: Method::FixedOdds,
                parameter: "odds"
            })
        ));
    }

    #[test]
    fn missing_price_for_runner() {
        let pool = pool(&[("A", 1.0), ("B", 1.0)]);
        let dist = estimate_distribution(&pool, 100, Some(42)).unwrap();
        let odds: FxHashMap<String, f64> = [("A".to_string(), 2.0)].into_iter().collect();
        let market = MarketData {
            odds: Some(&odds),
            ..MarketData::default()
        };
        let result = evaluate(&pool, &dist, &Method::FixedOdds, &market);
        assert!(matches!(result, Err(ValueError::MissingPrice(name)) if name == "B"));
    }

    #[test]
    fn parimutuel_no_market_money() {
        let win = pool(&[("A", 2.0), ("B", 1.0), ("C", 1.0)]);
        let show = pool(&[("A", 0.0), ("B", 0.0), ("C", 0.0)]);
        let dist = estimate_distribution(&win, 1_000, Some(42)).unwrap();
        let market = MarketData {
            show_pool: Some(&show),
            ..MarketData::default()
        };
        let outcome = evaluate(&win, &dist, &Method::Parimutuel, &market).unwrap();
        assert_eq!(ValuationOutcome::NoMarketMoney, outcome);
    }

    #[test]
    fn parimutuel_sole_backer_breaks_even() {
        // in a three-horse field every entrant places, so the sole show-pool backer always
        // receives exactly the stake back
        let win = pool(&[("A", 2.0), ("B", 1.0), ("C", 1.0)]);
        let show = pool(&[("A", 500.0), ("B", 0.0), ("C", 0.0)]);
        let dist = estimate_distribution(&win, 10_000, Some(42)).unwrap();
        let market = MarketData {
            show_pool: Some(&show),
            ..MarketData::default()
        };
        let valuation = priced(evaluate(&win, &dist, &Method::Parimutuel, &market).unwrap());
        assert_float_absolute_eq!(0.0, valuation.expected["A"], 1e-9);
        assert_float_absolute_eq!(2.0, valuation.conditional["A"], 1e-9);
    }

    #[test]
    fn parimutuel_never_placing_runner_is_certain_loss() {
        let win = pool(&[("A", 1.0), ("B", 1.0), ("C", 1.0), ("D", 1.0)]);
        let show = pool(&[("A", 100.0), ("B", 100.0), ("C", 100.0), ("D", 100.0)]);
        let dist = OrderingDistribution::from_probs(
            vec![(vec![0, 1, 2, 3], 0.5), (vec![1, 2, 0, 3], 0.5)],
            1,
        );
        let market = MarketData {
            show_pool: Some(&show),
            ..MarketData::default()
        };
        let valuation = priced(evaluate(&win, &dist, &Method::Parimutuel, &market).unwrap());
        assert_float_absolute_eq!(-1.0, valuation.expected["D"], 1e-9);
        assert_float_absolute_eq!(-1.0, valuation.conditional["D"], 1e-9);
    }

    #[test]
    fn parimutuel_skips_moneyless_podium() {
        // all show money sits on D, which finishes last in half the orderings; those
        // orderings cannot be split and drop out of the accumulation
        let win = pool(&[("A", 1.0), ("B", 1.0), ("C", 1.0), ("D", 1.0)]);
        let show = pool(&[("A", 0.0), ("B", 0.0), ("C", 0.0), ("D", 400.0)]);
        let dist = OrderingDistribution::from_probs(
            vec![(vec![0, 1, 2, 3], 0.5), (vec![3, 0, 1, 2], 0.5)],
            1,
        );
        let market = MarketData {
            show_pool: Some(&show),
            ..MarketData::default()
        };
        let valuation = priced(evaluate(&win, &dist, &Method::Parimutuel, &market).unwrap());
        // D collects the whole pool at its own stake in the ordering it places
        assert_float_absolute_eq!(0.5 - 1.0, valuation.expected["D"], 1e-9);
        // C never appears in a paying podium, so nothing accumulates against its stake
        assert_float_absolute_eq!(-1.0, valuation.expected["C"], 1e-9);
    }

    #[test]
    fn fixed_odds_uniform_pool() {
        let win = pool(&[("A", 1.0), ("B", 1.0), ("C", 1.0), ("D", 1.0), ("E", 1.0)]);
        let odds: FxHashMap<String, f64> = win
            .runners()
            .iter()
            .map(|runner| (runner.clone(), 2.0))
            .collect();
        let dist = estimate_distribution(&win, 100_000, Some(42)).unwrap();
        let market = MarketData {
            odds: Some(&odds),
            ..MarketData::default()
        };
        let valuation = priced(evaluate(&win, &dist, &Method::FixedOdds, &market).unwrap());
        for (runner, name) in win.runners().iter().enumerate() {
            let place_prob = place_probability(&dist, runner, DEFAULT_DEPTH);
            assert_float_absolute_eq!(place_prob * 2.0, valuation.expected[name], 1e-9);
            assert_float_absolute_eq!(0.4, valuation.expected[name], 0.02);
            assert_eq!(2.0, valuation.conditional[name]);
        }
    }

    #[test]
    fn expected_value_end_to_end() {
        let win = pool(&[("A", 2.0), ("B", 1.0), ("C", 1.0)]);
        let show = pool(&[("A", 300.0), ("B", 100.0), ("C", 100.0)]);
        let market = MarketData {
            show_pool: Some(&show),
            ..MarketData::default()
        };
        let outcome = expected_value(&win, &Method::Parimutuel, 10_000, &market, Some(42)).unwrap();
        let valuation = priced(outcome);
        // every entrant places in a three-horse field; the gross multipliers partition the
        // pool, so the probability-weighted expectations net out against the stakes
        for name in win.runners() {
            assert!(valuation.expected.contains_key(name));
            assert!(valuation.conditional.contains_key(name));
        }
    }
}
