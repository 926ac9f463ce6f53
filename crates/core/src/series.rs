//! Price and OHLC series value types.
//!
//! Series are validated once at construction: prices strictly
//! positive, dates strictly increasing (which also rules out
//! duplicates). Minimum-length requirements are per-metric and are
//! checked by the calculators, not here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// A single (date, close) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// An ordered daily closing-price series for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a validated price series.
    ///
    /// # Errors
    /// Returns `AnalysisError::Validation` if the series is empty,
    /// contains a non-positive or non-finite price, or the dates are
    /// not strictly increasing.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let ticker = ticker.into();
        if points.is_empty() {
            return Err(AnalysisError::validation(format!(
                "price series for {ticker} is empty"
            )));
        }
        for (i, p) in points.iter().enumerate() {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(AnalysisError::validation(format!(
                    "price series for {ticker} has non-positive price {} at {}",
                    p.close, p.date
                )));
            }
            if i > 0 && p.date <= points[i - 1].date {
                return Err(AnalysisError::validation(format!(
                    "price series for {ticker} has non-increasing date {} after {}",
                    p.date,
                    points[i - 1].date
                )));
            }
        }
        Ok(Self { ticker, points })
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Dates in order.
    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Daily simple returns (percentage change of consecutive closes).
    /// One element shorter than the series itself.
    #[must_use]
    pub fn returns(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|w| (w[1].close - w[0].close) / w[0].close)
            .collect()
    }

    /// Returns paired with the date each return realizes on (the
    /// second date of each consecutive pair). Used for benchmark
    /// alignment.
    #[must_use]
    pub fn dated_returns(&self) -> Vec<(NaiveDate, f64)> {
        self.points
            .windows(2)
            .map(|w| (w[1].date, (w[1].close - w[0].close) / w[0].close))
            .collect()
    }
}

/// A single OHLC bar. Open/high/low are optional because some feeds
/// supply close-only history; indicators that need high/low fail fast
/// when the fields are absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
}

impl OhlcBar {
    /// A close-only bar.
    #[must_use]
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
        }
    }
}

/// An ordered OHLC series for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcSeries {
    ticker: String,
    bars: Vec<OhlcBar>,
}

impl OhlcSeries {
    /// Creates a validated OHLC series.
    ///
    /// # Errors
    /// Returns `AnalysisError::Validation` if the series is empty, any
    /// close (or supplied high/low) is non-positive, a bar's high is
    /// below its low, or the dates are not strictly increasing.
    pub fn new(ticker: impl Into<String>, bars: Vec<OhlcBar>) -> Result<Self> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(AnalysisError::validation(format!(
                "OHLC series for {ticker} is empty"
            )));
        }
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(AnalysisError::validation(format!(
                    "OHLC series for {ticker} has non-positive close {} at {}",
                    bar.close, bar.date
                )));
            }
            for (label, field) in [("open", bar.open), ("high", bar.high), ("low", bar.low)] {
                if let Some(v) = field {
                    if !v.is_finite() || v <= 0.0 {
                        return Err(AnalysisError::validation(format!(
                            "OHLC series for {ticker} has non-positive {label} {v} at {}",
                            bar.date
                        )));
                    }
                }
            }
            if let (Some(h), Some(l)) = (bar.high, bar.low) {
                if h < l {
                    return Err(AnalysisError::validation(format!(
                        "OHLC series for {ticker} has high {h} below low {l} at {}",
                        bar.date
                    )));
                }
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(AnalysisError::validation(format!(
                    "OHLC series for {ticker} has non-increasing date {} after {}",
                    bar.date,
                    bars[i - 1].date
                )));
            }
        }
        Ok(Self { ticker, bars })
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[must_use]
    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices in date order.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// High prices in date order.
    ///
    /// # Errors
    /// Returns `AnalysisError::Validation` if any bar lacks a high.
    pub fn highs(&self) -> Result<Vec<f64>> {
        self.bars
            .iter()
            .map(|b| {
                b.high.ok_or_else(|| {
                    AnalysisError::validation(format!(
                        "OHLC series for {} is missing a high at {}",
                        self.ticker, b.date
                    ))
                })
            })
            .collect()
    }

    /// Low prices in date order.
    ///
    /// # Errors
    /// Returns `AnalysisError::Validation` if any bar lacks a low.
    pub fn lows(&self) -> Result<Vec<f64>> {
        self.bars
            .iter()
            .map(|b| {
                b.low.ok_or_else(|| {
                    AnalysisError::validation(format!(
                        "OHLC series for {} is missing a low at {}",
                        self.ticker, b.date
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn rejects_non_positive_prices() {
        let points = vec![
            PricePoint { date: d(1), close: 100.0 },
            PricePoint { date: d(2), close: 0.0 },
        ];
        let err = PriceSeries::new("AAPL", points).unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_and_backward_dates() {
        let dup = vec![
            PricePoint { date: d(1), close: 100.0 },
            PricePoint { date: d(1), close: 101.0 },
        ];
        assert!(PriceSeries::new("AAPL", dup).is_err());

        let backward = vec![
            PricePoint { date: d(2), close: 100.0 },
            PricePoint { date: d(1), close: 101.0 },
        ];
        assert!(PriceSeries::new("AAPL", backward).is_err());
    }

    #[test]
    fn returns_are_pct_changes() {
        let points = vec![
            PricePoint { date: d(1), close: 100.0 },
            PricePoint { date: d(2), close: 110.0 },
            PricePoint { date: d(3), close: 99.0 },
        ];
        let series = PriceSeries::new("AAPL", points).unwrap();
        let rets = series.returns();
        assert_eq!(rets.len(), 2);
        assert_relative_eq!(rets[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(rets[1], -0.10, epsilon = 1e-12);
    }

    #[test]
    fn ohlc_highs_require_field() {
        let bars = vec![OhlcBar::close_only(d(1), 100.0)];
        let series = OhlcSeries::new("AAPL", bars).unwrap();
        assert!(series.highs().is_err());
        assert_eq!(series.closes(), vec![100.0]);
    }

    #[test]
    fn ohlc_rejects_high_below_low() {
        let bars = vec![OhlcBar {
            date: d(1),
            open: Some(100.0),
            high: Some(99.0),
            low: Some(101.0),
            close: 100.0,
        }];
        assert!(OhlcSeries::new("AAPL", bars).is_err());
    }
}
