//! Pairwise correlation and covariance across a multi-asset grid.
//!
//! Produces the correlation matrix (Pearson or Spearman), the daily
//! covariance matrix (annualization is the optimizer's job), the
//! average pairwise correlation, and a diversification score.

use serde::{Deserialize, Serialize};

use portfolio_quant_core::{
    stats, AnalysisError, CorrelationConfig, CorrelationMethod, PriceGrid, Result,
};

/// Average pairwise correlation above this trips the concentration flag.
pub const CONCENTRATION_THRESHOLD: f64 = 0.70;

/// Correlation analysis across two or more assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationOutput {
    /// Column/row order of both matrices.
    pub tickers: Vec<String>,
    /// Symmetric correlation matrix, diagonal exactly 1.0.
    pub correlation_matrix: Vec<Vec<f64>>,
    /// Symmetric sample covariance matrix of daily returns.
    pub covariance_matrix: Vec<Vec<f64>>,
    /// Mean of the strictly-upper-triangular correlations, clamped to [-1, 1].
    pub average_correlation: f64,
    /// `1 - average_correlation`, clamped to [0, 2].
    pub diversification_score: f64,
    /// True when the portfolio is concentrated (average correlation > 0.70).
    pub concentration_warning: bool,
    pub method: CorrelationMethod,
    /// Number of return observations per asset.
    pub observations: usize,
}

/// Diversification score from an average pairwise correlation.
///
/// A single-asset portfolio scores 1.0 by convention: there are no
/// peers to correlate against.
#[must_use]
pub fn diversification_score(average_correlation: f64, n_assets: usize) -> f64 {
    if n_assets < 2 {
        return 1.0;
    }
    (1.0 - average_correlation).clamp(0.0, 2.0)
}

/// Calculates pairwise correlation/covariance over the grid.
///
/// When a rolling window is configured, only the trailing `window`
/// return rows are used.
///
/// # Errors
/// `AnalysisError::Config` for invalid config;
/// `AnalysisError::Validation` with fewer than two tickers or fewer
/// than `min_periods` return observations per asset.
pub fn calculate(grid: &PriceGrid, config: &CorrelationConfig) -> Result<CorrelationOutput> {
    config.validate()?;

    let n = grid.n_assets();
    if n < 2 {
        return Err(AnalysisError::validation(format!(
            "correlation requires at least 2 tickers, got {n}"
        )));
    }

    let full = grid.returns();
    let window_rows = match config.rolling_window {
        Some(window) => window.min(full.nrows()),
        None => full.nrows(),
    };
    if window_rows < config.min_periods {
        return Err(AnalysisError::validation(format!(
            "correlation requires at least {} return observations per asset, got {window_rows}",
            config.min_periods
        )));
    }
    let start = full.nrows() - window_rows;

    let columns: Vec<Vec<f64>> = (0..n)
        .map(|c| (start..full.nrows()).map(|r| full[(r, c)]).collect())
        .collect();

    let mut correlation = vec![vec![0.0; n]; n];
    let mut covariance = vec![vec![0.0; n]; n];
    for i in 0..n {
        correlation[i][i] = 1.0;
        covariance[i][i] = stats::variance(&columns[i]);
        for j in (i + 1)..n {
            let corr = match config.method {
                CorrelationMethod::Pearson => {
                    stats::pearson_correlation(&columns[i], &columns[j])
                }
                CorrelationMethod::Spearman => {
                    stats::spearman_correlation(&columns[i], &columns[j])
                }
            };
            let cov = stats::covariance(&columns[i], &columns[j]);
            correlation[i][j] = corr;
            correlation[j][i] = corr;
            covariance[i][j] = cov;
            covariance[j][i] = cov;
        }
    }

    // Strictly-upper-triangular mean; n >= 2 guarantees at least one pair.
    let mut sum = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            sum += correlation[i][j];
            pairs += 1;
        }
    }
    let average_correlation = (sum / pairs as f64).clamp(-1.0, 1.0);

    Ok(CorrelationOutput {
        tickers: grid.tickers().to_vec(),
        correlation_matrix: correlation,
        covariance_matrix: covariance,
        average_correlation,
        diversification_score: diversification_score(average_correlation, n),
        concentration_warning: average_correlation > CONCENTRATION_THRESHOLD,
        method: config.method,
        observations: window_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};
    use portfolio_quant_core::{PricePoint, PriceSeries};

    fn series_from(ticker: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + Days::new(i as u64),
                close,
            })
            .collect();
        PriceSeries::new(ticker, points).unwrap()
    }

    /// Three price paths long enough for the default min_periods.
    fn test_grid() -> PriceGrid {
        let mut a = vec![100.0];
        let mut b = vec![50.0];
        let mut c = vec![200.0];
        for i in 0..40 {
            let up = i % 2 == 0;
            a.push(a.last().unwrap() * if up { 1.01 } else { 0.995 });
            // b moves with a, c moves against it.
            b.push(b.last().unwrap() * if up { 1.008 } else { 0.997 });
            c.push(c.last().unwrap() * if up { 0.994 } else { 1.006 });
        }
        PriceGrid::from_series(&[
            series_from("A", &a),
            series_from("B", &b),
            series_from("C", &c),
        ])
        .unwrap()
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let out = calculate(&test_grid(), &CorrelationConfig::default()).unwrap();
        let m = &out.correlation_matrix;
        for i in 0..3 {
            assert_relative_eq!(m[i][i], 1.0);
            for j in 0..3 {
                assert_relative_eq!(m[i][j], m[j][i], epsilon = 1e-12);
                assert!((-1.0..=1.0).contains(&m[i][j]));
                assert_relative_eq!(
                    out.covariance_matrix[i][j],
                    out.covariance_matrix[j][i],
                    epsilon = 1e-15
                );
            }
        }
    }

    #[test]
    fn comoving_assets_correlate_positively_and_inverse_negatively() {
        let out = calculate(&test_grid(), &CorrelationConfig::default()).unwrap();
        assert!(out.correlation_matrix[0][1] > 0.9);
        assert!(out.correlation_matrix[0][2] < -0.9);
    }

    #[test]
    fn average_correlation_stays_clamped() {
        let out = calculate(&test_grid(), &CorrelationConfig::default()).unwrap();
        assert!((-1.0..=1.0).contains(&out.average_correlation));
        assert!((0.0..=2.0).contains(&out.diversification_score));
        assert_relative_eq!(
            out.diversification_score,
            (1.0 - out.average_correlation).clamp(0.0, 2.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn single_asset_scores_one_by_convention() {
        assert_relative_eq!(diversification_score(0.5, 1), 1.0);
        assert_relative_eq!(diversification_score(-0.5, 3), 1.5);
    }

    #[test]
    fn rejects_single_ticker_grid() {
        let closes: Vec<f64> = (0..41).map(|i| 100.0 + i as f64).collect();
        let grid = PriceGrid::from_series(&[series_from("A", &closes)]).unwrap();
        let err = calculate(&grid, &CorrelationConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
    }

    #[test]
    fn rejects_too_few_observations() {
        let a: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let b: Vec<f64> = (0..10).map(|i| 50.0 + i as f64).collect();
        let grid =
            PriceGrid::from_series(&[series_from("A", &a), series_from("B", &b)]).unwrap();
        let err = calculate(&grid, &CorrelationConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
    }

    #[test]
    fn spearman_agrees_with_pearson_on_monotone_comovement() {
        let config = CorrelationConfig {
            method: CorrelationMethod::Spearman,
            ..CorrelationConfig::default()
        };
        let out = calculate(&test_grid(), &config).unwrap();
        assert!(out.correlation_matrix[0][1] > 0.9);
        assert!(out.correlation_matrix[0][2] < -0.9);
    }

    #[test]
    fn concentration_warning_trips_on_lockstep_assets() {
        // Two assets with identical return paths.
        let mut a = vec![100.0];
        let mut b = vec![200.0];
        for i in 0..40 {
            let step = if i % 2 == 0 { 1.01 } else { 0.99 };
            a.push(a.last().unwrap() * step);
            b.push(b.last().unwrap() * step);
        }
        let grid =
            PriceGrid::from_series(&[series_from("A", &a), series_from("B", &b)]).unwrap();
        let out = calculate(&grid, &CorrelationConfig::default()).unwrap();
        assert!(out.average_correlation > CONCENTRATION_THRESHOLD);
        assert!(out.concentration_warning);
        assert!(out.diversification_score < 0.3);
    }

    #[test]
    fn rolling_window_limits_the_sample() {
        let config = CorrelationConfig {
            rolling_window: Some(30),
            ..CorrelationConfig::default()
        };
        let out = calculate(&test_grid(), &config).unwrap();
        assert_eq!(out.observations, 30);
    }
}
