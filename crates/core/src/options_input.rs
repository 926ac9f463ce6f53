//! Validated input for the Black-Scholes-Merton pricer.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Call or put leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
}

/// Parameters for a European option under Black-Scholes-Merton.
///
/// Construction enforces every domain constraint, so the pricer itself
/// never fails at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlackScholesInput {
    spot_price: f64,
    strike: f64,
    /// Time to expiry in years.
    time_to_expiry: f64,
    /// Annualized volatility (e.g. 0.20 for 20%).
    volatility: f64,
    /// Annualized continuously compounded risk-free rate.
    risk_free_rate: f64,
    /// Annualized continuous dividend yield.
    dividend_yield: f64,
    option_type: OptionType,
}

impl BlackScholesInput {
    /// # Errors
    /// Returns `AnalysisError::Validation` unless spot, strike, expiry
    /// and volatility are strictly positive and the rates are
    /// non-negative (all finite).
    #[allow(clippy::similar_names)]
    pub fn new(
        spot_price: f64,
        strike: f64,
        time_to_expiry: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        option_type: OptionType,
    ) -> Result<Self> {
        let strictly_positive = [
            ("spot_price", spot_price),
            ("strike", strike),
            ("time_to_expiry", time_to_expiry),
            ("volatility", volatility),
        ];
        for (name, value) in strictly_positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::validation(format!(
                    "{name} must be strictly positive, got {value}"
                )));
            }
        }
        let non_negative = [
            ("risk_free_rate", risk_free_rate),
            ("dividend_yield", dividend_yield),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::validation(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(Self {
            spot_price,
            strike,
            time_to_expiry,
            volatility,
            risk_free_rate,
            dividend_yield,
            option_type,
        })
    }

    #[must_use]
    pub fn spot_price(&self) -> f64 {
        self.spot_price
    }

    #[must_use]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    #[must_use]
    pub fn time_to_expiry(&self) -> f64 {
        self.time_to_expiry
    }

    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    #[must_use]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    #[must_use]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    #[must_use]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_input() {
        let input =
            BlackScholesInput::new(100.0, 100.0, 1.0, 0.20, 0.05, 0.0, OptionType::Call);
        assert!(input.is_ok());
    }

    #[test]
    fn rejects_zero_volatility_and_expired_options() {
        assert!(
            BlackScholesInput::new(100.0, 100.0, 1.0, 0.0, 0.05, 0.0, OptionType::Call).is_err()
        );
        assert!(
            BlackScholesInput::new(100.0, 100.0, 0.0, 0.20, 0.05, 0.0, OptionType::Put).is_err()
        );
    }

    #[test]
    fn rejects_negative_rates() {
        assert!(
            BlackScholesInput::new(100.0, 100.0, 1.0, 0.20, -0.01, 0.0, OptionType::Call)
                .is_err()
        );
        assert!(
            BlackScholesInput::new(100.0, 100.0, 1.0, 0.20, 0.05, -0.01, OptionType::Call)
                .is_err()
        );
    }
}
