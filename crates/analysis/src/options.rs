//! Black-Scholes-Merton pricing and Greeks for European options.
//!
//! Closed-form evaluation with a continuous dividend yield. The input
//! type enforces every domain constraint, so pricing itself is
//! infallible for a constructed input.

use serde::{Deserialize, Serialize};

use portfolio_quant_core::{stats, BlackScholesInput, OptionType};

/// Spot relative to strike. A 2% band around the strike counts as
/// at-the-money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Moneyness {
    InTheMoney,
    AtTheMoney,
    OutOfTheMoney,
}

/// Price, Greeks, and value decomposition for one option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionAnalysis {
    /// Present value of the option, floored at zero.
    pub price: f64,
    /// Sensitivity to a one-unit spot move.
    pub delta: f64,
    /// Rate of change of delta, identical for calls and puts.
    pub gamma: f64,
    /// Time decay per calendar day.
    pub theta: f64,
    /// Sensitivity per one-percentage-point volatility change.
    pub vega: f64,
    /// Sensitivity per one-percentage-point rate change.
    pub rho: f64,
    /// Immediate exercise value.
    pub intrinsic_value: f64,
    /// Price minus intrinsic value.
    pub time_value: f64,
    pub moneyness: Moneyness,
    pub d1: f64,
    pub d2: f64,
}

/// Prices a European option and computes its five Greeks.
#[must_use]
pub fn price(input: &BlackScholesInput) -> OptionAnalysis {
    let s = input.spot_price();
    let k = input.strike();
    let t = input.time_to_expiry();
    let sigma = input.volatility();
    let r = input.risk_free_rate();
    let q = input.dividend_yield();

    let sqrt_t = t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
    let d2 = d1 - sigma * sqrt_t;

    let disc_r = (-r * t).exp();
    let disc_q = (-q * t).exp();
    let nd1 = stats::norm_cdf(d1);
    let nd2 = stats::norm_cdf(d2);
    let pdf_d1 = stats::norm_pdf(d1);

    let (price, delta, theta, rho) = match input.option_type() {
        OptionType::Call => {
            let price = (s * disc_q * nd1 - k * disc_r * nd2).max(0.0);
            let delta = disc_q * nd1;
            let theta = (-s * disc_q * pdf_d1 * sigma / (2.0 * sqrt_t) - r * k * disc_r * nd2
                + q * s * disc_q * nd1)
                / 365.0;
            let rho = k * t * disc_r * nd2 / 100.0;
            (price, delta, theta, rho)
        }
        OptionType::Put => {
            let n_neg_d1 = stats::norm_cdf(-d1);
            let n_neg_d2 = stats::norm_cdf(-d2);
            let price = (k * disc_r * n_neg_d2 - s * disc_q * n_neg_d1).max(0.0);
            let delta = disc_q * (nd1 - 1.0);
            let theta = (-s * disc_q * pdf_d1 * sigma / (2.0 * sqrt_t)
                + r * k * disc_r * n_neg_d2
                - q * s * disc_q * n_neg_d1)
                / 365.0;
            let rho = -k * t * disc_r * n_neg_d2 / 100.0;
            (price, delta, theta, rho)
        }
    };

    let gamma = (disc_q * pdf_d1 / (s * sigma * sqrt_t)).max(0.0);
    let vega = s * disc_q * sqrt_t * pdf_d1 / 100.0;

    let intrinsic_value = match input.option_type() {
        OptionType::Call => (s - k).max(0.0),
        OptionType::Put => (k - s).max(0.0),
    };
    let time_value = price - intrinsic_value;

    OptionAnalysis {
        price,
        delta,
        gamma,
        theta,
        vega,
        rho,
        intrinsic_value,
        time_value,
        moneyness: moneyness(s, k, input.option_type()),
        d1,
        d2,
    }
}

/// Classifies moneyness with a 2% band around the strike.
#[must_use]
pub fn moneyness(spot: f64, strike: f64, option_type: OptionType) -> Moneyness {
    let upper = 1.02 * strike;
    let lower = 0.98 * strike;
    match option_type {
        OptionType::Call => {
            if spot > upper {
                Moneyness::InTheMoney
            } else if spot < lower {
                Moneyness::OutOfTheMoney
            } else {
                Moneyness::AtTheMoney
            }
        }
        OptionType::Put => {
            if spot < lower {
                Moneyness::InTheMoney
            } else if spot > upper {
                Moneyness::OutOfTheMoney
            } else {
                Moneyness::AtTheMoney
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use portfolio_quant_core::BlackScholesInput;

    fn input(spot: f64, option_type: OptionType) -> BlackScholesInput {
        BlackScholesInput::new(spot, 100.0, 1.0, 0.20, 0.05, 0.0, option_type).unwrap()
    }

    #[test]
    fn textbook_call_and_put_values() {
        // S=100, K=100, T=1, sigma=0.20, r=0.05, q=0.
        let call = price(&input(100.0, OptionType::Call));
        let put = price(&input(100.0, OptionType::Put));

        assert_relative_eq!(call.price, 10.4506, epsilon = 1e-3);
        assert_relative_eq!(put.price, 5.5735, epsilon = 1e-3);
        assert_relative_eq!(call.delta, 0.6368, epsilon = 1e-3);
        assert_relative_eq!(put.delta, call.delta - 1.0, epsilon = 1e-12);
        assert_relative_eq!(call.gamma, put.gamma, epsilon = 1e-12);
        assert_relative_eq!(call.vega, put.vega, epsilon = 1e-12);
    }

    #[test]
    fn put_call_parity_holds() {
        for spot in [70.0, 90.0, 100.0, 110.0, 140.0] {
            let call = price(&input(spot, OptionType::Call));
            let put = price(&input(spot, OptionType::Put));
            let parity = spot - 100.0 * (-0.05f64).exp();
            assert_relative_eq!(call.price - put.price, parity, epsilon = 1e-9);
        }
    }

    #[test]
    fn parity_with_dividend_yield() {
        let call = BlackScholesInput::new(100.0, 95.0, 0.5, 0.25, 0.03, 0.02, OptionType::Call)
            .unwrap();
        let put = BlackScholesInput::new(100.0, 95.0, 0.5, 0.25, 0.03, 0.02, OptionType::Put)
            .unwrap();
        let parity = 100.0 * (-0.02f64 * 0.5).exp() - 95.0 * (-0.03f64 * 0.5).exp();
        assert_relative_eq!(
            price(&call).price - price(&put).price,
            parity,
            epsilon = 1e-9
        );
    }

    #[test]
    fn price_increases_with_volatility() {
        for option_type in [OptionType::Call, OptionType::Put] {
            let mut prev = 0.0;
            for vol in [0.10, 0.20, 0.30, 0.40] {
                let input =
                    BlackScholesInput::new(100.0, 100.0, 1.0, vol, 0.05, 0.0, option_type)
                        .unwrap();
                let p = price(&input).price;
                assert!(p > prev, "price must increase with volatility");
                prev = p;
            }
        }
    }

    #[test]
    fn intrinsic_and_time_value_decompose_the_price() {
        let call = price(&input(120.0, OptionType::Call));
        assert_relative_eq!(call.intrinsic_value, 20.0);
        assert_relative_eq!(call.time_value, call.price - 20.0, epsilon = 1e-12);

        let put = price(&input(120.0, OptionType::Put));
        assert_relative_eq!(put.intrinsic_value, 0.0);
        assert_relative_eq!(put.time_value, put.price, epsilon = 1e-12);
    }

    #[test]
    fn moneyness_uses_two_percent_band() {
        assert_eq!(moneyness(103.0, 100.0, OptionType::Call), Moneyness::InTheMoney);
        assert_eq!(moneyness(97.0, 100.0, OptionType::Call), Moneyness::OutOfTheMoney);
        assert_eq!(moneyness(101.0, 100.0, OptionType::Call), Moneyness::AtTheMoney);

        assert_eq!(moneyness(97.0, 100.0, OptionType::Put), Moneyness::InTheMoney);
        assert_eq!(moneyness(103.0, 100.0, OptionType::Put), Moneyness::OutOfTheMoney);
        assert_eq!(moneyness(99.0, 100.0, OptionType::Put), Moneyness::AtTheMoney);
    }

    #[test]
    fn greeks_have_expected_signs() {
        let call = price(&input(100.0, OptionType::Call));
        let put = price(&input(100.0, OptionType::Put));

        assert!(call.gamma > 0.0);
        assert!(call.vega > 0.0);
        assert!(call.theta < 0.0);
        assert!(put.theta < 0.0);
        assert!(call.rho > 0.0);
        assert!(put.rho < 0.0);
        assert!((0.0..=1.0).contains(&call.delta));
        assert!((-1.0..=0.0).contains(&put.delta));
    }

    #[test]
    fn deep_itm_call_approaches_forward_intrinsic() {
        let call = price(&input(200.0, OptionType::Call));
        // Way in the money: delta near 1, almost no optionality left.
        assert!(call.delta > 0.99);
        assert!(call.time_value < call.price * 0.05);
    }
}
