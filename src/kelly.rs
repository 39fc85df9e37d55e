//! Kelly-criterion stake sizing from a placement probability and a takeout-adjusted payout.

use thiserror::Error;

/// Fraction of winnings retained by the operator of a typical US show pool.
pub const DEFAULT_TAKEOUT: f64 = 0.15;

#[derive(Debug, Error)]
pub enum KellyError {
    #[error("takeout-adjusted payout is zero")]
    ZeroPayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KellyAdvice {
    /// Recommended fraction of bankroll to stake. Negative means the bet has no edge.
    pub fraction: f64,
    /// Expected value of the bet per unit staked at the advised size.
    pub expected_value: f64,
}
impl KellyAdvice {
    pub fn is_favourable(&self) -> bool {
        self.fraction > 0.0
    }
}

/// `prob` is the probability of the bet landing, `payout` the expected net return given that
/// it lands, `takeout` the fraction the operator removes from winnings.
pub fn advise(prob: f64, payout: f64, takeout: f64) -> Result<KellyAdvice, KellyError> {
    let adjusted = payout * (1.0 - takeout);
    if adjusted == 0.0 {
        return Err(KellyError::ZeroPayout);
    }
    let fraction = prob - (1.0 - prob) / adjusted;
    let expected_value = adjusted * prob;
    Ok(KellyAdvice {
        fraction,
        expected_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn favourable_bet() {
        let advice = advise(0.5, 3.0, 0.0).unwrap();
        assert_float_absolute_eq!(0.5 - 0.5 / 3.0, advice.fraction, 1e-9);
        assert_float_absolute_eq!(1.5, advice.expected_value, 1e-9);
        assert!(advice.is_favourable());
    }

    #[test]
    fn takeout_erodes_the_edge() {
        let advice = advise(0.25, 3.0, DEFAULT_TAKEOUT).unwrap();
        assert_float_absolute_eq!(0.25 - 0.75 / 2.55, advice.fraction, 1e-9);
        assert_float_absolute_eq!(2.55 * 0.25, advice.expected_value, 1e-9);
        assert!(!advice.is_favourable());
    }

    #[test]
    fn zero_payout() {
        assert!(matches!(advise(0.5, 0.0, 0.1), Err(KellyError::ZeroPayout)));
    }

    #[test]
    fn full_takeout() {
        assert!(matches!(advise(0.5, 2.0, 1.0), Err(KellyError::ZeroPayout)));
    }

    #[test]
    fn certain_winner_stakes_everything() {
        let advice = advise(1.0, 2.0, 0.0).unwrap();
        assert_float_absolute_eq!(1.0, advice.fraction, 1e-9);
    }
}
