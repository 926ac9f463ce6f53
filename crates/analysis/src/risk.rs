//! Risk metrics from a daily price series.
//!
//! VaR/CVaR, Sharpe/Sortino, max drawdown, Calmar, annualized
//! volatility, and beta/alpha against an optional benchmark. Numerical
//! degeneracies (empty CVaR tail, no negative returns, zero drawdown)
//! fall back to documented substitutes and are surfaced as warnings on
//! the output, never as errors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use portfolio_quant_core::{
    stats, AnalysisError, PriceSeries, Result, RiskConfig, VarMethod,
};

/// Minimum number of daily returns required (31 prices).
pub const MIN_OBSERVATIONS: usize = 30;

/// Trading days per year for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Computed risk metrics for one price series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Value-at-Risk at the configured confidence level (a daily
    /// return, negative in the loss direction).
    pub var: f64,
    /// Conditional VaR: mean of returns at or below the VaR.
    pub cvar: f64,
    /// Annualized Sharpe ratio over the risk-free rate.
    pub sharpe_ratio: f64,
    /// Annualized Sortino ratio (downside deviation denominator).
    pub sortino_ratio: f64,
    /// Maximum peak-to-trough drawdown, always <= 0.
    pub max_drawdown: f64,
    /// Annualized mean return over |max drawdown|.
    pub calmar_ratio: f64,
    /// Daily standard deviation scaled by sqrt(252).
    pub annual_volatility: f64,
    /// Mean daily simple return.
    pub mean_daily_return: f64,
    /// Number of daily returns used.
    pub observations: usize,
    /// CAPM beta vs the benchmark, when one was supplied with enough
    /// date-aligned overlap.
    pub beta: Option<f64>,
    /// CAPM alpha (annualized) vs the benchmark.
    pub alpha: Option<f64>,
    /// Non-fatal degeneracy fallbacks taken during the computation.
    pub warnings: Vec<String>,
}

/// Calculates all risk metrics for a price series.
///
/// When the series is longer than `config.rolling_window`, only the
/// trailing window of returns (and the matching price path) is used.
///
/// # Arguments
/// * `series` - Validated daily price series
/// * `config` - Confidence level, VaR method, window, risk-free rate
/// * `benchmark` - Optional benchmark series for beta/alpha
///
/// # Errors
/// `AnalysisError::Config` for out-of-range config values;
/// `AnalysisError::Validation` when fewer than 31 prices are supplied.
pub fn calculate(
    series: &PriceSeries,
    config: &RiskConfig,
    benchmark: Option<&PriceSeries>,
) -> Result<RiskMetrics> {
    config.validate()?;

    let all_returns = series.returns();
    if all_returns.len() < MIN_OBSERVATIONS {
        return Err(AnalysisError::validation(format!(
            "risk metrics require at least {} prices ({} returns), got {} prices",
            MIN_OBSERVATIONS + 1,
            MIN_OBSERVATIONS,
            series.len()
        )));
    }
    let window = config.rolling_window.min(all_returns.len());
    let returns = &all_returns[all_returns.len() - window..];

    let mut warnings = Vec::new();

    let var = value_at_risk(returns, config);
    let cvar = conditional_var(returns, var, series.ticker(), &mut warnings);

    let daily_rf = config.risk_free_rate / TRADING_DAYS;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let sharpe_ratio = sharpe(&excess);
    let sortino_ratio = sortino(returns, &excess, sharpe_ratio, series.ticker(), &mut warnings);

    // Price path covering exactly the windowed returns.
    let closes = series.closes();
    let max_drawdown = max_drawdown(&closes[closes.len() - (window + 1)..]);
    debug_assert!(max_drawdown <= 0.0);

    let mean_daily_return = stats::mean(returns);
    let calmar_ratio = if max_drawdown == 0.0 {
        push_warning(
            &mut warnings,
            format!(
                "{}: max drawdown is zero, Calmar ratio is undefined (+inf)",
                series.ticker()
            ),
        );
        f64::INFINITY
    } else {
        mean_daily_return * TRADING_DAYS / max_drawdown.abs()
    };

    let annual_volatility = stats::std_dev(returns) * TRADING_DAYS.sqrt();

    let (beta, alpha) = match benchmark {
        Some(bench) => benchmark_relative(series, bench, window, config, &mut warnings),
        None => (None, None),
    };

    Ok(RiskMetrics {
        var,
        cvar,
        sharpe_ratio,
        sortino_ratio,
        max_drawdown,
        calmar_ratio,
        annual_volatility,
        mean_daily_return,
        observations: returns.len(),
        beta,
        alpha,
        warnings,
    })
}

fn value_at_risk(returns: &[f64], config: &RiskConfig) -> f64 {
    match config.var_method {
        VarMethod::Historical => {
            stats::percentile(returns, (1.0 - config.confidence_level) * 100.0)
        }
        VarMethod::Parametric => {
            let z = stats::norm_inv_cdf(1.0 - config.confidence_level);
            stats::mean(returns) + z * stats::std_dev(returns)
        }
    }
}

fn conditional_var(
    returns: &[f64],
    var: f64,
    ticker: &str,
    warnings: &mut Vec<String>,
) -> f64 {
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    if tail.is_empty() {
        push_warning(
            warnings,
            format!("{ticker}: no returns at or below VaR, CVaR falls back to VaR"),
        );
        var
    } else {
        stats::mean(&tail)
    }
}

fn sharpe(excess: &[f64]) -> f64 {
    let std = stats::std_dev(excess);
    if std < f64::EPSILON {
        return 0.0;
    }
    stats::mean(excess) / std * TRADING_DAYS.sqrt()
}

fn sortino(
    returns: &[f64],
    excess: &[f64],
    sharpe_ratio: f64,
    ticker: &str,
    warnings: &mut Vec<String>,
) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_std = stats::std_dev(&downside);
    if downside.is_empty() || downside_std < f64::EPSILON {
        push_warning(
            warnings,
            format!("{ticker}: no downside deviation, Sortino falls back to Sharpe"),
        );
        return sharpe_ratio;
    }
    stats::mean(excess) / downside_std * TRADING_DAYS.sqrt()
}

/// Maximum drawdown of a price path: min over time of
/// `(price - running_max) / running_max`. Zero for a monotone rise.
#[must_use]
pub fn max_drawdown(prices: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0f64;
    for &price in prices {
        if price > peak {
            peak = price;
        }
        let drawdown = (price - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }
    worst.min(0.0)
}

fn benchmark_relative(
    series: &PriceSeries,
    benchmark: &PriceSeries,
    window: usize,
    config: &RiskConfig,
    warnings: &mut Vec<String>,
) -> (Option<f64>, Option<f64>) {
    let bench_by_date: HashMap<_, _> = benchmark.dated_returns().into_iter().collect();

    let dated = series.dated_returns();
    let mut asset = Vec::new();
    let mut bench = Vec::new();
    for &(date, ret) in &dated[dated.len() - window.min(dated.len())..] {
        if let Some(&b) = bench_by_date.get(&date) {
            asset.push(ret);
            bench.push(b);
        }
    }

    if asset.len() < MIN_OBSERVATIONS {
        push_warning(
            warnings,
            format!(
                "{}: only {} date-aligned returns overlap benchmark {}, need {} for beta/alpha",
                series.ticker(),
                asset.len(),
                benchmark.ticker(),
                MIN_OBSERVATIONS
            ),
        );
        return (None, None);
    }

    let bench_var = stats::variance(&bench);
    if bench_var < f64::EPSILON {
        push_warning(
            warnings,
            format!(
                "{}: benchmark {} has zero variance, beta is undefined",
                series.ticker(),
                benchmark.ticker()
            ),
        );
        return (None, None);
    }

    let beta = stats::covariance(&asset, &bench) / bench_var;
    let asset_excess = stats::mean(&asset) * TRADING_DAYS - config.risk_free_rate;
    let bench_excess = stats::mean(&bench) * TRADING_DAYS - config.risk_free_rate;
    let alpha = asset_excess - beta * bench_excess;

    (Some(beta), Some(alpha))
}

fn push_warning(warnings: &mut Vec<String>, msg: String) {
    warn!("{msg}");
    warnings.push(msg);
}
