//! Realized portfolio positions as consumed by the compliance checker.
//!
//! Weights are stored in percent (0-100) because that is how wealth
//! statements express them; monetary values stay in `Decimal`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single holding on a valuation statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Asset class label as reported (e.g. "Equities", "Bonds", "Cash").
    pub asset_class: String,
    /// Instrument name.
    pub name: String,
    /// ISO currency code.
    pub currency: String,
    /// Weight of the position in percent of total portfolio value.
    pub weight_pct: f64,
    /// Market value of the position.
    pub value: Decimal,
}

impl Position {
    /// Whether this line is a cash/liquidity holding.
    #[must_use]
    pub fn is_cash(&self) -> bool {
        self.asset_class.eq_ignore_ascii_case("cash")
            || self.asset_class.eq_ignore_ascii_case("liquidity")
    }
}

/// An ordered collection of positions plus the statement total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub positions: Vec<Position>,
    pub total_value: Decimal,
}

impl Portfolio {
    #[must_use]
    pub fn new(positions: Vec<Position>, total_value: Decimal) -> Self {
        Self { positions, total_value }
    }

    /// Positions that are not cash/liquidity lines.
    #[must_use]
    pub fn non_cash_positions(&self) -> Vec<&Position> {
        self.positions.iter().filter(|p| !p.is_cash()).collect()
    }

    /// Combined weight of all cash/liquidity lines, in percent.
    /// Returns `None` when no cash line exists at all, so callers can
    /// distinguish "0% cash" from "no cash allocation reported".
    #[must_use]
    pub fn cash_weight_pct(&self) -> Option<f64> {
        let cash: Vec<&Position> = self.positions.iter().filter(|p| p.is_cash()).collect();
        if cash.is_empty() {
            None
        } else {
            Some(cash.iter().map(|p| p.weight_pct).sum())
        }
    }

    /// Total weight per asset class, in percent.
    #[must_use]
    pub fn allocation_by_asset_class(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for p in &self.positions {
            *out.entry(p.asset_class.clone()).or_insert(0.0) += p.weight_pct;
        }
        out
    }

    /// Total weight per currency, in percent.
    #[must_use]
    pub fn exposure_by_currency(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for p in &self.positions {
            *out.entry(p.currency.clone()).or_insert(0.0) += p.weight_pct;
        }
        out
    }

    /// Positions held in the given currency, by name.
    #[must_use]
    pub fn positions_in_currency(&self, currency: &str) -> Vec<&Position> {
        self.positions
            .iter()
            .filter(|p| p.currency == currency)
            .collect()
    }

    /// Positions in the given asset class, by name.
    #[must_use]
    pub fn positions_in_asset_class(&self, asset_class: &str) -> Vec<&Position> {
        self.positions
            .iter()
            .filter(|p| p.asset_class == asset_class)
            .collect()
    }
}
