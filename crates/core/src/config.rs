//! Configuration records for the calculators.
//!
//! Each config is a plain struct with documented defaults and a
//! `validate()` enforcing its field ranges. Callers construct these
//! directly per call; no calculator holds one across calls.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// How Value-at-Risk is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
    /// Empirical percentile of the return distribution.
    Historical,
    /// Normal approximation `mean + z * std`.
    Parametric,
}

/// Configuration for risk-metric calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// VaR/CVaR confidence level, in [0.50, 0.99].
    pub confidence_level: f64,
    pub var_method: VarMethod,
    /// Rolling window in trading days, in [30, 756].
    pub rolling_window: usize,
    /// Annualized risk-free rate, in [0, 0.20].
    pub risk_free_rate: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            var_method: VarMethod::Historical,
            rolling_window: 252,
            risk_free_rate: 0.045,
        }
    }
}

impl RiskConfig {
    /// # Errors
    /// Returns `AnalysisError::Config` if any field is out of range.
    pub fn validate(&self) -> Result<()> {
        if !(0.50..=0.99).contains(&self.confidence_level) {
            return Err(AnalysisError::config(format!(
                "confidence_level must be in [0.50, 0.99], got {}",
                self.confidence_level
            )));
        }
        if !(30..=756).contains(&self.rolling_window) {
            return Err(AnalysisError::config(format!(
                "rolling_window must be in [30, 756], got {}",
                self.rolling_window
            )));
        }
        if !(0.0..=0.20).contains(&self.risk_free_rate) {
            return Err(AnalysisError::config(format!(
                "risk_free_rate must be in [0, 0.20], got {}",
                self.risk_free_rate
            )));
        }
        Ok(())
    }
}

/// Per-indicator periods for the momentum calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
    pub williams_period: usize,
    pub roc_period: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stoch_k_period: 14,
            stoch_d_period: 3,
            williams_period: 14,
            roc_period: 10,
        }
    }
}

impl MomentumConfig {
    /// # Errors
    /// Returns `AnalysisError::Config` if any period is zero or the
    /// MACD fast period is not shorter than the slow period.
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("stoch_k_period", self.stoch_k_period),
            ("stoch_d_period", self.stoch_d_period),
            ("williams_period", self.williams_period),
            ("roc_period", self.roc_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(AnalysisError::config(format!("{name} must be positive")));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::config(format!(
                "macd_fast ({}) must be less than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }
}

/// Correlation estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

/// Configuration for the correlation calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    pub method: CorrelationMethod,
    /// Optional rolling window; `None` uses the full sample.
    pub rolling_window: Option<usize>,
    /// Minimum number of return observations per asset.
    pub min_periods: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            method: CorrelationMethod::Pearson,
            rolling_window: None,
            min_periods: 30,
        }
    }
}

impl CorrelationConfig {
    /// # Errors
    /// Returns `AnalysisError::Config` if `min_periods` is below 2 or
    /// a rolling window is smaller than `min_periods`.
    pub fn validate(&self) -> Result<()> {
        if self.min_periods < 2 {
            return Err(AnalysisError::config(format!(
                "min_periods must be at least 2, got {}",
                self.min_periods
            )));
        }
        if let Some(window) = self.rolling_window {
            if window < self.min_periods {
                return Err(AnalysisError::config(format!(
                    "rolling_window ({window}) must be at least min_periods ({})",
                    self.min_periods
                )));
            }
        }
        Ok(())
    }
}

/// Portfolio allocation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMethod {
    MeanVariance,
    RiskParity,
    MinVariance,
    MaxSharpe,
    BlackLitterman,
}

/// Configuration for the portfolio optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    pub method: OptimizationMethod,
    /// Annualized risk-free rate used by Sharpe-based objectives.
    pub risk_free_rate: f64,
    /// (min, max) weight bound applied uniformly to every asset.
    pub position_limits: (f64, f64),
    /// Minimum annualized portfolio return (mean-variance only).
    pub target_return: Option<f64>,
    /// Ticker -> expected annualized return view (Black-Litterman only).
    pub views: Option<HashMap<String, f64>>,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            method: OptimizationMethod::MeanVariance,
            risk_free_rate: 0.045,
            position_limits: (0.0, 1.0),
            target_return: None,
            views: None,
        }
    }
}

impl OptimizationConfig {
    /// # Errors
    /// Returns `AnalysisError::Config` if the position limits are
    /// inverted or outside [0, 1], or the risk-free rate is negative.
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = self.position_limits;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo >= hi {
            return Err(AnalysisError::config(format!(
                "position_limits must satisfy 0 <= min < max <= 1, got ({lo}, {hi})"
            )));
        }
        if !(0.0..=0.20).contains(&self.risk_free_rate) {
            return Err(AnalysisError::config(format!(
                "risk_free_rate must be in [0, 0.20], got {}",
                self.risk_free_rate
            )));
        }
        Ok(())
    }
}

/// Limits evaluated by the compliance checker. All percentage fields
/// are expressed in portfolio weight percent (0-100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    pub max_single_position_pct: f64,
    pub max_asset_class_pct: f64,
    pub max_currency_pct: f64,
    pub min_positions_count: usize,
    pub min_cash_pct: f64,
    pub max_cash_pct: f64,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            max_single_position_pct: 25.0,
            max_asset_class_pct: 50.0,
            max_currency_pct: 70.0,
            min_positions_count: 5,
            min_cash_pct: 2.0,
            max_cash_pct: 20.0,
        }
    }
}

impl ComplianceConfig {
    /// # Errors
    /// Returns `AnalysisError::Config` if any limit is outside (0, 100]
    /// or the cash bounds are inverted.
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("max_single_position_pct", self.max_single_position_pct),
            ("max_asset_class_pct", self.max_asset_class_pct),
            ("max_currency_pct", self.max_currency_pct),
            ("max_cash_pct", self.max_cash_pct),
        ];
        for (name, value) in limits {
            if !(0.0..=100.0).contains(&value) || value == 0.0 {
                return Err(AnalysisError::config(format!(
                    "{name} must be in (0, 100], got {value}"
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.min_cash_pct) {
            return Err(AnalysisError::config(format!(
                "min_cash_pct must be in [0, 100], got {}",
                self.min_cash_pct
            )));
        }
        if self.min_cash_pct >= self.max_cash_pct {
            return Err(AnalysisError::config(format!(
                "min_cash_pct ({}) must be below max_cash_pct ({})",
                self.min_cash_pct, self.max_cash_pct
            )));
        }
        Ok(())
    }
}
