//! Violation and report types for compliance checking.

use serde::{Deserialize, Serialize};

/// Severity of a compliance violation, most severe first. The derived
/// ordering (`Critical < High < Medium < Low`) is the sort rank used
/// for recommendations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Whether this severity makes the whole portfolio non-compliant
    /// (rather than merely flagged with warnings).
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A single rule breach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Stable rule code (e.g. "POS-01").
    pub code: String,
    pub severity: Severity,
    /// Human-readable description of the breach.
    pub message: String,
    /// Position names involved; the currency rule caps this at five.
    pub affected_positions: Vec<String>,
    /// Concrete remediation, including CHF amounts where applicable.
    pub recommendation: String,
}

/// Aggregated result of all compliance checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// True only when no rule produced any violation.
    pub is_compliant: bool,
    /// "COMPLIANT", "NON-COMPLIANT", or "COMPLIANT with warnings".
    pub status: String,
    pub violations: Vec<Violation>,
    /// Violation recommendations sorted by severity, capped at five
    /// with a trailing suppression note when more exist.
    pub recommendations: Vec<String>,
    /// Number of rules evaluated.
    pub rules_checked: usize,
    /// Number of rules that produced no violation.
    pub rules_passed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_most_severe_first() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
    }

    #[test]
    fn blocking_severities() {
        assert!(Severity::Critical.is_blocking());
        assert!(Severity::High.is_blocking());
        assert!(!Severity::Medium.is_blocking());
        assert!(!Severity::Low.is_blocking());
    }

    #[test]
    fn severity_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
    }
}
