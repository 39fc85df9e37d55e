//! A Monte Carlo model of top-_N_ placings in parimutuel racing markets. Samples finishing
//! orders from a pool of win-market weights, derives place probabilities, and prices show
//! bets under parimutuel and fixed-odds payout schemes, with Kelly stake recommendations.

pub mod data;
pub mod kelly;
pub mod mc;
pub mod placement;
pub mod pool;
pub mod print;
pub mod probs;
pub mod value;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
