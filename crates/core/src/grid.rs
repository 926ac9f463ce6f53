//! Multi-asset price grid.
//!
//! A grid is a set of tickers sharing one ordered date axis with one
//! price per (date, ticker) cell. Alignment is the caller's job: this
//! type verifies the axes match exactly and refuses to interpolate.

use chrono::NaiveDate;
use nalgebra::DMatrix;

use crate::error::{AnalysisError, Result};
use crate::series::PriceSeries;

/// Aligned multi-asset prices: rows are dates, columns are tickers.
#[derive(Debug, Clone)]
pub struct PriceGrid {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    prices: DMatrix<f64>,
}

impl PriceGrid {
    /// Builds a grid from per-ticker series that must already share an
    /// identical date axis.
    ///
    /// # Errors
    /// Returns `AnalysisError::Validation` if no series are supplied,
    /// a ticker repeats, or any series' dates differ from the first
    /// series' dates (different length, order, or members).
    pub fn from_series(series: &[PriceSeries]) -> Result<Self> {
        if series.is_empty() {
            return Err(AnalysisError::validation(
                "price grid requires at least one series",
            ));
        }

        let dates = series[0].dates();
        let mut tickers = Vec::with_capacity(series.len());
        for s in series {
            if tickers.iter().any(|t| t == s.ticker()) {
                return Err(AnalysisError::validation(format!(
                    "duplicate ticker {} in price grid",
                    s.ticker()
                )));
            }
            if s.dates() != dates {
                return Err(AnalysisError::validation(format!(
                    "date axis for {} does not match {}: grids must be pre-aligned",
                    s.ticker(),
                    series[0].ticker()
                )));
            }
            tickers.push(s.ticker().to_string());
        }

        let mut prices = DMatrix::zeros(dates.len(), series.len());
        for (col, s) in series.iter().enumerate() {
            for (row, p) in s.points().iter().enumerate() {
                prices[(row, col)] = p.close;
            }
        }

        Ok(Self { tickers, dates, prices })
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Number of date rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn prices(&self) -> &DMatrix<f64> {
        &self.prices
    }

    /// Daily simple-returns matrix: one row fewer than the price grid,
    /// same column order as `tickers()`.
    #[must_use]
    pub fn returns(&self) -> DMatrix<f64> {
        let rows = self.prices.nrows().saturating_sub(1);
        let cols = self.prices.ncols();
        let mut out = DMatrix::zeros(rows, cols);
        for c in 0..cols {
            for r in 0..rows {
                let prev = self.prices[(r, c)];
                out[(r, c)] = (self.prices[(r + 1, c)] - prev) / prev;
            }
        }
        out
    }

    /// One asset's daily returns as a plain vector.
    #[must_use]
    pub fn asset_returns(&self, col: usize) -> Vec<f64> {
        let rets = self.returns();
        rets.column(col).iter().copied().collect()
    }
}
