//! Portfolio optimization: five allocation strategies over a common
//! constrained solver, plus efficient-frontier generation.
//!
//! Every method minimizes an objective over
//! `{ lo <= w_i <= hi, sum w = 1 }` starting from equal weight.
//! Expected returns are annualized geometric means of daily returns;
//! the covariance matrix is the daily sample covariance scaled by 252.

mod solver;

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use portfolio_quant_core::{
    AnalysisError, OptimizationConfig, OptimizationMethod, PriceGrid, Result,
};

/// Trading days per year for annualization.
const TRADING_DAYS: f64 = 252.0;

/// Minimum daily return observations required per asset.
pub const MIN_OBSERVATIONS: usize = 30;

/// Black-Litterman market risk-aversion coefficient.
pub const RISK_AVERSION: f64 = 2.5;

/// Black-Litterman prior-uncertainty scalar.
pub const TAU: f64 = 0.025;

/// Penalty returned by ratio objectives when portfolio volatility is
/// numerically zero.
const DEGENERATE_PENALTY: f64 = 1.0e6;

/// Weight multiplying constraint-violation penalties in the
/// mean-variance objective.
const TARGET_PENALTY: f64 = 1.0e6;

/// Tolerance for the post-solve target-return feasibility check.
const TARGET_TOL: f64 = 1.0e-4;

/// Optimized allocation plus portfolio-level metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationOutput {
    pub method: OptimizationMethod,
    /// Asset order for `weights` and the per-asset vectors.
    pub tickers: Vec<String>,
    /// Optimal weights, renormalized to sum exactly to 1.0.
    pub weights: Vec<f64>,
    /// Annualized expected portfolio return under the method's return
    /// vector (posterior returns for Black-Litterman).
    pub expected_return: f64,
    /// Annualized portfolio volatility.
    pub volatility: f64,
    /// `(expected_return - risk_free_rate) / volatility`.
    pub sharpe_ratio: f64,
    /// Weighted-average individual volatility over portfolio volatility.
    pub diversification_ratio: f64,
    /// Annualized expected return per asset.
    pub asset_expected_returns: Vec<f64>,
    /// Annualized volatility per asset.
    pub asset_volatilities: Vec<f64>,
}

/// One point on the efficient frontier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// Return floor this point was solved for.
    pub target_return: f64,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub weights: Vec<f64>,
    /// True for the frontier point with the highest Sharpe ratio.
    pub optimal: bool,
}

struct MarketInputs {
    tickers: Vec<String>,
    /// Annualized expected returns (geometric).
    mu: DVector<f64>,
    /// Annualized covariance matrix.
    sigma: DMatrix<f64>,
}

/// Optimizes an allocation over the grid with the configured method.
///
/// # Errors
/// `AnalysisError::Config` for invalid configuration (including
/// Black-Litterman without views); `AnalysisError::Validation` for an
/// unusable grid; `AnalysisError::Computation` when the solver cannot
/// converge or the Black-Litterman posterior is singular.
pub fn optimize(grid: &PriceGrid, config: &OptimizationConfig) -> Result<OptimizationOutput> {
    config.validate()?;
    let inputs = prepare(grid)?;

    let (mu_used, weights) = match config.method {
        OptimizationMethod::MeanVariance => {
            let w = solve_mean_variance(&inputs, config, config.target_return)?;
            (inputs.mu.clone(), w)
        }
        OptimizationMethod::MinVariance => {
            let w = solve_mean_variance(&inputs, config, None)?;
            (inputs.mu.clone(), w)
        }
        OptimizationMethod::RiskParity => {
            let w = solve_risk_parity(&inputs, config)?;
            (inputs.mu.clone(), w)
        }
        OptimizationMethod::MaxSharpe => {
            let w = solve_max_sharpe(&inputs, config)?;
            (inputs.mu.clone(), w)
        }
        OptimizationMethod::BlackLitterman => {
            let posterior = black_litterman_posterior(&inputs, config)?;
            let w = minimize_variance_objective(&inputs, config)?;
            (posterior, w)
        }
    };

    Ok(build_output(config.method, &inputs, &mu_used, weights, config))
}

/// Generates the efficient frontier: `num_points` mean-variance solves
/// at return targets linearly spaced between the minimum-variance
/// portfolio's return and 95% of the best individual expected return.
/// Targets that fail to solve are skipped.
///
/// # Errors
/// `AnalysisError::Config` if `num_points < 2`; validation and
/// computation errors from the underlying minimum-variance solve.
pub fn efficient_frontier(
    grid: &PriceGrid,
    config: &OptimizationConfig,
    num_points: usize,
) -> Result<Vec<FrontierPoint>> {
    config.validate()?;
    if num_points < 2 {
        return Err(AnalysisError::config(format!(
            "efficient frontier needs at least 2 points, got {num_points}"
        )));
    }
    let inputs = prepare(grid)?;

    let min_var_weights = solve_mean_variance(&inputs, config, None)?;
    let w = DVector::from_vec(min_var_weights);
    let return_floor = inputs.mu.dot(&w);
    let return_ceiling = 0.95 * inputs.mu.iter().copied().fold(f64::MIN, f64::max);

    let step = (return_ceiling - return_floor) / (num_points - 1) as f64;
    let mut points = Vec::with_capacity(num_points);
    for i in 0..num_points {
        let target = return_floor + step * i as f64;
        let Ok(weights) = solve_mean_variance(&inputs, config, Some(target)) else {
            continue;
        };
        let weights = renormalize(weights);
        let wv = DVector::from_vec(weights.clone());
        let expected_return = inputs.mu.dot(&wv);
        let volatility = portfolio_volatility(&inputs.sigma, &wv);
        let sharpe_ratio = if volatility > f64::EPSILON {
            (expected_return - config.risk_free_rate) / volatility
        } else {
            0.0
        };
        points.push(FrontierPoint {
            target_return: target,
            expected_return,
            volatility,
            sharpe_ratio,
            weights,
            optimal: false,
        });
    }

    if let Some(best) = points
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.sharpe_ratio
                .partial_cmp(&b.sharpe_ratio)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
    {
        points[best].optimal = true;
    }

    Ok(points)
}

fn prepare(grid: &PriceGrid) -> Result<MarketInputs> {
    let n = grid.n_assets();
    if n < 2 {
        return Err(AnalysisError::validation(format!(
            "optimization requires at least 2 assets, got {n}"
        )));
    }
    let returns = grid.returns();
    let rows = returns.nrows();
    if rows < MIN_OBSERVATIONS {
        return Err(AnalysisError::validation(format!(
            "optimization requires at least {MIN_OBSERVATIONS} return observations, got {rows}"
        )));
    }

    // Annualized geometric mean return per asset.
    let mut mu = DVector::zeros(n);
    for c in 0..n {
        let growth: f64 = (0..rows).map(|r| 1.0 + returns[(r, c)]).product();
        mu[c] = growth.powf(TRADING_DAYS / rows as f64) - 1.0;
    }

    // Daily sample covariance, annualized.
    let means: Vec<f64> = (0..n)
        .map(|c| returns.column(c).iter().sum::<f64>() / rows as f64)
        .collect();
    let mut sigma = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let mut cov = 0.0;
            for r in 0..rows {
                cov += (returns[(r, i)] - means[i]) * (returns[(r, j)] - means[j]);
            }
            cov = cov / (rows - 1) as f64 * TRADING_DAYS;
            sigma[(i, j)] = cov;
            sigma[(j, i)] = cov;
        }
    }

    Ok(MarketInputs {
        tickers: grid.tickers().to_vec(),
        mu,
        sigma,
    })
}

fn solve_mean_variance(
    inputs: &MarketInputs,
    config: &OptimizationConfig,
    target_return: Option<f64>,
) -> Result<Vec<f64>> {
    let sigma = &inputs.sigma;
    let mu = &inputs.mu;
    let (lo, hi) = config.position_limits;
    let weights = solver::minimize(
        |w| {
            let wv = DVector::from_column_slice(w);
            let mut objective = wv.dot(&(sigma * &wv));
            if let Some(target) = target_return {
                let shortfall = (target - mu.dot(&wv)).max(0.0);
                objective += TARGET_PENALTY * shortfall * shortfall;
            }
            objective
        },
        inputs.mu.len(),
        lo,
        hi,
    )?;

    // The penalty steers the solver toward the return floor; this
    // check makes it a hard constraint rather than a preference.
    if let Some(target) = target_return {
        let wv = DVector::from_column_slice(&weights);
        let achieved = mu.dot(&wv);
        if achieved < target - TARGET_TOL {
            return Err(AnalysisError::computation(format!(
                "target return {target:.6} is unattainable under the position limits: \
                 best achieved {achieved:.6}"
            )));
        }
    }

    Ok(weights)
}

fn minimize_variance_objective(
    inputs: &MarketInputs,
    config: &OptimizationConfig,
) -> Result<Vec<f64>> {
    solve_mean_variance(inputs, config, None)
}

fn solve_risk_parity(inputs: &MarketInputs, config: &OptimizationConfig) -> Result<Vec<f64>> {
    let sigma = &inputs.sigma;
    let n = inputs.mu.len();
    let target = 1.0 / n as f64;
    let (lo, hi) = config.position_limits;
    solver::minimize(
        |w| {
            let wv = DVector::from_column_slice(w);
            let marginal = sigma * &wv;
            let vol = wv.dot(&marginal).max(0.0).sqrt();
            if vol < 1e-8 {
                return DEGENERATE_PENALTY;
            }
            (0..n)
                .map(|i| {
                    let contribution = w[i] * marginal[i] / vol;
                    (contribution - target).powi(2)
                })
                .sum()
        },
        n,
        lo,
        hi,
    )
}

fn solve_max_sharpe(inputs: &MarketInputs, config: &OptimizationConfig) -> Result<Vec<f64>> {
    let sigma = &inputs.sigma;
    let mu = &inputs.mu;
    let rf = config.risk_free_rate;
    let (lo, hi) = config.position_limits;
    solver::minimize(
        |w| {
            let wv = DVector::from_column_slice(w);
            let vol = wv.dot(&(sigma * &wv)).max(0.0).sqrt();
            if vol < 1e-8 {
                return DEGENERATE_PENALTY;
            }
            -(mu.dot(&wv) - rf) / vol
        },
        mu.len(),
        lo,
        hi,
    )
}

/// Black-Litterman posterior expected returns.
///
/// Equilibrium returns come from reverse optimization against
/// equal-market weights, views enter through a per-ticker selector
/// matrix, and view uncertainty is the diagonal of `P * Sigma * P^T`.
fn black_litterman_posterior(
    inputs: &MarketInputs,
    config: &OptimizationConfig,
) -> Result<DVector<f64>> {
    let views = match &config.views {
        Some(views) if !views.is_empty() => views,
        _ => {
            return Err(AnalysisError::config(
                "Black-Litterman requires at least one return view",
            ))
        }
    };

    let n = inputs.mu.len();
    // Deterministic view order regardless of map iteration order.
    let ordered: BTreeMap<&String, &f64> = views.iter().collect();
    let mut rows = Vec::with_capacity(ordered.len());
    for (ticker, &view) in &ordered {
        let Some(idx) = inputs.tickers.iter().position(|t| &t == ticker) else {
            return Err(AnalysisError::config(format!(
                "view references unknown ticker {ticker}"
            )));
        };
        rows.push((idx, *view));
    }

    let k = rows.len();
    let mut p = DMatrix::zeros(k, n);
    let mut q = DVector::zeros(k);
    for (row, (idx, view)) in rows.iter().copied().enumerate() {
        p[(row, idx)] = 1.0;
        q[row] = view;
    }

    let sigma = &inputs.sigma;
    let w_market = DVector::from_element(n, 1.0 / n as f64);
    let pi = (sigma * w_market) * RISK_AVERSION;

    let omega = &p * sigma * p.transpose();
    let mut omega_inv = DMatrix::zeros(k, k);
    for i in 0..k {
        let d = omega[(i, i)];
        if d.abs() < 1e-12 {
            return Err(AnalysisError::computation(
                "Black-Litterman view uncertainty is singular",
            ));
        }
        omega_inv[(i, i)] = 1.0 / d;
    }

    let tau_sigma_inv = (sigma * TAU).try_inverse().ok_or_else(|| {
        AnalysisError::computation("Black-Litterman prior covariance is singular")
    })?;

    let a = &tau_sigma_inv + p.transpose() * &omega_inv * &p;
    let a_inv = a
        .try_inverse()
        .ok_or_else(|| AnalysisError::computation("Black-Litterman posterior is singular"))?;

    Ok(a_inv * (tau_sigma_inv * pi + p.transpose() * omega_inv * q))
}

fn portfolio_volatility(sigma: &DMatrix<f64>, w: &DVector<f64>) -> f64 {
    w.dot(&(sigma * w)).max(0.0).sqrt()
}

fn renormalize(mut weights: Vec<f64>) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum.abs() > f64::EPSILON {
        for w in &mut weights {
            *w /= sum;
        }
    }
    weights
}

fn build_output(
    method: OptimizationMethod,
    inputs: &MarketInputs,
    mu_used: &DVector<f64>,
    weights: Vec<f64>,
    config: &OptimizationConfig,
) -> OptimizationOutput {
    let weights = renormalize(weights);
    let wv = DVector::from_vec(weights.clone());

    let expected_return = mu_used.dot(&wv);
    let volatility = portfolio_volatility(&inputs.sigma, &wv);
    let sharpe_ratio = if volatility > f64::EPSILON {
        (expected_return - config.risk_free_rate) / volatility
    } else {
        0.0
    };

    let asset_volatilities: Vec<f64> = (0..inputs.mu.len())
        .map(|i| inputs.sigma[(i, i)].max(0.0).sqrt())
        .collect();
    let weighted_avg_vol: f64 = weights
        .iter()
        .zip(asset_volatilities.iter())
        .map(|(w, v)| w * v)
        .sum();
    let diversification_ratio = if volatility > f64::EPSILON {
        weighted_avg_vol / volatility
    } else {
        0.0
    };

    OptimizationOutput {
        method,
        tickers: inputs.tickers.clone(),
        weights,
        expected_return,
        volatility,
        sharpe_ratio,
        diversification_ratio,
        asset_expected_returns: mu_used.iter().copied().collect(),
        asset_volatilities,
    }
}
