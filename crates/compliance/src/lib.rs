//! Rule-based compliance checking for realized portfolios.
//!
//! Evaluates a portfolio against concentration, diversification, and
//! cash-allocation limits, producing severity-graded violations and a
//! capped, severity-sorted recommendation list.

pub mod report;
pub mod rules;

use tracing::debug;

use portfolio_quant_core::{ComplianceConfig, Portfolio, Result};

pub use report::{ComplianceReport, Severity, Violation};

/// Maximum recommendations surfaced on a report.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Number of independent rules evaluated.
const RULE_COUNT: usize = 5;

/// Evaluates all compliance rules against the portfolio.
///
/// # Errors
/// `AnalysisError::Config` when limits in `config` are out of range.
pub fn check(portfolio: &Portfolio, config: &ComplianceConfig) -> Result<ComplianceReport> {
    config.validate()?;

    let rule_results = [
        rules::check_position_concentration(portfolio, config),
        rules::check_asset_class_concentration(portfolio, config),
        rules::check_currency_concentration(portfolio, config),
        rules::check_min_diversification(portfolio, config),
        rules::check_cash_bounds(portfolio, config),
    ];

    let rules_passed = rule_results.iter().filter(|v| v.is_empty()).count();
    let mut violations: Vec<Violation> = rule_results.into_iter().flatten().collect();
    violations.sort_by_key(|v| v.severity);

    debug!(
        violations = violations.len(),
        rules_passed, "compliance check complete"
    );

    let is_compliant = violations.is_empty();
    let status = if is_compliant {
        "COMPLIANT".to_string()
    } else if violations.iter().any(|v| v.severity.is_blocking()) {
        "NON-COMPLIANT".to_string()
    } else {
        "COMPLIANT with warnings".to_string()
    };

    let mut recommendations: Vec<String> = violations
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|v| v.recommendation.clone())
        .collect();
    let suppressed = violations.len().saturating_sub(MAX_RECOMMENDATIONS);
    if suppressed > 0 {
        recommendations.push(format!(
            "{suppressed} further recommendation{} suppressed",
            if suppressed == 1 { "" } else { "s" }
        ));
    }

    Ok(ComplianceReport {
        is_compliant,
        status,
        violations,
        recommendations,
        rules_checked: RULE_COUNT,
        rules_passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_quant_core::Position;
    use rust_decimal_macros::dec;

    fn position(asset_class: &str, name: &str, currency: &str, weight: f64) -> Position {
        Position {
            asset_class: asset_class.to_string(),
            name: name.to_string(),
            currency: currency.to_string(),
            weight_pct: weight,
            value: dec!(0),
        }
    }

    fn balanced_portfolio() -> Portfolio {
        Portfolio::new(
            vec![
                position("Equities", "Nestlé", "CHF", 18.0),
                position("Equities", "Roche", "CHF", 15.0),
                position("Bonds", "Confederation 2031", "CHF", 20.0),
                position("Bonds", "US Treasury 2030", "USD", 15.0),
                position("Funds", "Global equity fund", "USD", 14.0),
                position("Funds", "Real estate fund", "USD", 10.0),
                position("Cash", "CHF account", "CHF", 8.0),
            ],
            dec!(5000000),
        )
    }

    #[test]
    fn balanced_portfolio_is_compliant() {
        let report = check(&balanced_portfolio(), &ComplianceConfig::default()).unwrap();
        assert!(report.is_compliant);
        assert_eq!(report.status, "COMPLIANT");
        assert!(report.violations.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.rules_checked, 5);
        assert_eq!(report.rules_passed, 5);
    }

    #[test]
    fn concentrated_portfolio_is_non_compliant() {
        let config = ComplianceConfig {
            max_single_position_pct: 30.0,
            ..ComplianceConfig::default()
        };
        let portfolio = Portfolio::new(
            vec![
                position("Equities", "Big Bet AG", "CHF", 55.0),
                position("Bonds", "Bond A", "CHF", 20.0),
                position("Bonds", "Bond B", "CHF", 10.0),
                position("Funds", "Fund A", "CHF", 7.0),
                position("Funds", "Fund B", "CHF", 5.0),
                position("Cash", "CHF account", "CHF", 3.0),
            ],
            dec!(2000000),
        );
        let report = check(&portfolio, &config).unwrap();
        assert!(!report.is_compliant);
        assert_eq!(report.status, "NON-COMPLIANT");

        let pos_violations: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.code == "POS-01")
            .collect();
        assert_eq!(pos_violations.len(), 1);
        assert_eq!(pos_violations[0].severity, Severity::Critical);
        // total_value * (55 - 30) / 100 = 500000.
        assert!(pos_violations[0].recommendation.contains("500000.00"));
    }

    #[test]
    fn warnings_only_portfolio_keeps_soft_status() {
        // Over max cash only: a single low-severity violation.
        let portfolio = Portfolio::new(
            vec![
                position("Equities", "A", "CHF", 15.0),
                position("Equities", "B", "CHF", 15.0),
                position("Bonds", "C", "CHF", 15.0),
                position("Bonds", "D", "CHF", 15.0),
                position("Funds", "E", "CHF", 10.0),
                position("Cash", "CHF account", "CHF", 30.0),
            ],
            dec!(1000000),
        );
        let config = ComplianceConfig {
            max_currency_pct: 100.0,
            ..ComplianceConfig::default()
        };
        let report = check(&portfolio, &config).unwrap();
        assert!(!report.is_compliant);
        assert_eq!(report.status, "COMPLIANT with warnings");
        assert!(report.violations.iter().all(|v| !v.severity.is_blocking()));
    }

    #[test]
    fn recommendations_are_sorted_and_capped() {
        // Many simultaneous breaches: several oversized positions in
        // one currency and one asset class, no cash, too few holdings.
        let portfolio = Portfolio::new(
            vec![
                position("Equities", "Huge A", "USD", 40.0),
                position("Equities", "Huge B", "USD", 35.0),
                position("Equities", "Big C", "USD", 25.0),
            ],
            dec!(1000000),
        );
        let config = ComplianceConfig {
            max_single_position_pct: 20.0,
            max_asset_class_pct: 50.0,
            max_currency_pct: 60.0,
            min_positions_count: 5,
            min_cash_pct: 2.0,
            max_cash_pct: 20.0,
        };
        let report = check(&portfolio, &config).unwrap();
        assert!(report.violations.len() > MAX_RECOMMENDATIONS);

        // Sorted most severe first.
        for pair in report.violations.windows(2) {
            assert!(pair[0].severity <= pair[1].severity);
        }

        // Capped at five plus the suppression note.
        assert_eq!(report.recommendations.len(), MAX_RECOMMENDATIONS + 1);
        assert!(report
            .recommendations
            .last()
            .unwrap()
            .contains("suppressed"));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = check(&balanced_portfolio(), &ComplianceConfig::default()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"is_compliant\":true"));
    }
}
