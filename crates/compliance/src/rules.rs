//! The five compliance rules.
//!
//! Each rule is a pure function over the portfolio and the configured
//! limits, returning zero or more severity-graded violations. Cash
//! lines are excluded from the concentration rules and handled by the
//! dedicated cash-bounds rule.

use rust_decimal::Decimal;

use portfolio_quant_core::{ComplianceConfig, Portfolio};

use crate::report::{Severity, Violation};

/// Currency-rule affected-position lists are capped at this many names.
pub const MAX_AFFECTED_POSITIONS: usize = 5;

/// Escalation multiplier: a single position this far over its limit is
/// critical rather than high.
const POSITION_CRITICAL_FACTOR: f64 = 1.5;
const ASSET_CLASS_HIGH_FACTOR: f64 = 1.2;
const CURRENCY_MEDIUM_FACTOR: f64 = 1.1;

/// CHF amount of portfolio value representing `excess_pct` percent.
fn chf_amount(total_value: Decimal, excess_pct: f64) -> Decimal {
    let excess = Decimal::from_f64_retain(excess_pct).unwrap_or_default();
    (total_value * excess / Decimal::from(100)).round_dp(2)
}

/// POS-01: no single non-cash position may exceed the per-position cap.
#[must_use]
pub fn check_position_concentration(
    portfolio: &Portfolio,
    config: &ComplianceConfig,
) -> Vec<Violation> {
    let limit = config.max_single_position_pct;
    portfolio
        .non_cash_positions()
        .iter()
        .filter(|p| p.weight_pct > limit)
        .map(|p| {
            let severity = if p.weight_pct > POSITION_CRITICAL_FACTOR * limit {
                Severity::Critical
            } else {
                Severity::High
            };
            let trim = chf_amount(portfolio.total_value, p.weight_pct - limit);
            Violation {
                code: "POS-01".to_string(),
                severity,
                message: format!(
                    "position {} is {:.1}% of the portfolio, above the {:.1}% single-position limit",
                    p.name, p.weight_pct, limit
                ),
                affected_positions: vec![p.name.clone()],
                recommendation: format!(
                    "Reduce {} by CHF {trim} to return within the {:.1}% limit",
                    p.name, limit
                ),
            }
        })
        .collect()
}

/// AC-01: no non-cash asset class may exceed the asset-class cap.
#[must_use]
pub fn check_asset_class_concentration(
    portfolio: &Portfolio,
    config: &ComplianceConfig,
) -> Vec<Violation> {
    let limit = config.max_asset_class_pct;
    portfolio
        .allocation_by_asset_class()
        .into_iter()
        .filter(|(class, weight)| {
            !class.eq_ignore_ascii_case("cash")
                && !class.eq_ignore_ascii_case("liquidity")
                && *weight > limit
        })
        .map(|(class, weight)| {
            let severity = if weight > ASSET_CLASS_HIGH_FACTOR * limit {
                Severity::High
            } else {
                Severity::Medium
            };
            let affected: Vec<String> = portfolio
                .positions_in_asset_class(&class)
                .iter()
                .map(|p| p.name.clone())
                .collect();
            Violation {
                code: "AC-01".to_string(),
                severity,
                message: format!(
                    "asset class {class} is {weight:.1}% of the portfolio, above the {limit:.1}% limit"
                ),
                affected_positions: affected,
                recommendation: format!(
                    "Rebalance {:.1}% out of {class} into under-represented asset classes",
                    weight - limit
                ),
            }
        })
        .collect()
}

/// CUR-01: no single currency may exceed the currency-exposure cap.
#[must_use]
pub fn check_currency_concentration(
    portfolio: &Portfolio,
    config: &ComplianceConfig,
) -> Vec<Violation> {
    let limit = config.max_currency_pct;
    portfolio
        .exposure_by_currency()
        .into_iter()
        .filter(|(_, weight)| *weight > limit)
        .map(|(currency, weight)| {
            let severity = if weight > CURRENCY_MEDIUM_FACTOR * limit {
                Severity::Medium
            } else {
                Severity::Low
            };
            let mut affected: Vec<String> = portfolio
                .positions_in_currency(&currency)
                .iter()
                .map(|p| p.name.clone())
                .collect();
            affected.truncate(MAX_AFFECTED_POSITIONS);
            Violation {
                code: "CUR-01".to_string(),
                severity,
                message: format!(
                    "currency {currency} exposure is {weight:.1}%, above the {limit:.1}% limit"
                ),
                affected_positions: affected,
                recommendation: format!(
                    "Hedge or diversify {:.1}% of {currency} exposure into other currencies",
                    weight - limit
                ),
            }
        })
        .collect()
}

/// DIV-01: the portfolio must hold a minimum number of non-cash
/// positions. At most one violation.
#[must_use]
pub fn check_min_diversification(
    portfolio: &Portfolio,
    config: &ComplianceConfig,
) -> Vec<Violation> {
    let count = portfolio.non_cash_positions().len();
    if count >= config.min_positions_count {
        return Vec::new();
    }
    let missing = config.min_positions_count - count;
    vec![Violation {
        code: "DIV-01".to_string(),
        severity: Severity::High,
        message: format!(
            "only {count} non-cash positions held, below the minimum of {}",
            config.min_positions_count
        ),
        affected_positions: Vec::new(),
        recommendation: format!(
            "Add at least {missing} more position{} to reach the {} position minimum",
            if missing == 1 { "" } else { "s" },
            config.min_positions_count
        ),
    }]
}

/// CASH-01/CASH-02: cash allocation must stay within the configured
/// band. A portfolio with no cash line at all is treated as 0% cash
/// when a minimum is required.
#[must_use]
pub fn check_cash_bounds(portfolio: &Portfolio, config: &ComplianceConfig) -> Vec<Violation> {
    match portfolio.cash_weight_pct() {
        None if config.min_cash_pct > 0.0 => vec![Violation {
            code: "CASH-01".to_string(),
            severity: Severity::Medium,
            message: format!(
                "no cash allocation reported (treated as 0%), below the {:.1}% minimum",
                config.min_cash_pct
            ),
            affected_positions: Vec::new(),
            recommendation: format!(
                "Hold at least {:.1}% of the portfolio in cash for liquidity",
                config.min_cash_pct
            ),
        }],
        Some(cash) if cash < config.min_cash_pct => vec![Violation {
            code: "CASH-01".to_string(),
            severity: Severity::Medium,
            message: format!(
                "cash allocation is {cash:.1}%, below the {:.1}% minimum",
                config.min_cash_pct
            ),
            affected_positions: Vec::new(),
            recommendation: format!(
                "Raise cash by {:.1}% of the portfolio to meet the liquidity floor",
                config.min_cash_pct - cash
            ),
        }],
        Some(cash) if cash > config.max_cash_pct => vec![Violation {
            code: "CASH-02".to_string(),
            severity: Severity::Low,
            message: format!(
                "cash allocation is {cash:.1}%, above the {:.1}% maximum",
                config.max_cash_pct
            ),
            affected_positions: Vec::new(),
            recommendation: format!(
                "Deploy {:.1}% of the portfolio from cash into invested positions",
                cash - config.max_cash_pct
            ),
        }],
        _ => Vec::new(),
    }
}
