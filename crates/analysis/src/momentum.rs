//! Momentum indicators from an OHLC series.
//!
//! RSI (Wilder smoothing), MACD, Stochastic Oscillator, Williams %R
//! and Rate-of-Change, each as an independent function returning the
//! latest indicator value plus a classified signal. `calculate_all`
//! aggregates the five and a majority-vote composite.

use serde::{Deserialize, Serialize};

use portfolio_quant_core::{stats, AnalysisError, MomentumConfig, OhlcSeries, Result};

/// Classified reading of a single indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSignal {
    Overbought,
    Oversold,
    Bullish,
    Bearish,
    Neutral,
}

/// Relative Strength Index reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiOutput {
    /// RSI in [0, 100].
    pub value: f64,
    pub signal: IndicatorSignal,
}

/// MACD reading: line, signal line, and histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal_line: f64,
    pub histogram: f64,
    pub signal: IndicatorSignal,
}

/// Stochastic oscillator reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// %K in [0, 100].
    pub percent_k: f64,
    /// %D (SMA of %K) in [0, 100].
    pub percent_d: f64,
    pub signal: IndicatorSignal,
}

/// Williams %R reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WilliamsROutput {
    /// Williams %R in [-100, 0].
    pub value: f64,
    pub signal: IndicatorSignal,
}

/// Rate-of-Change reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocOutput {
    /// Percentage change over the configured period.
    pub value: f64,
    pub signal: IndicatorSignal,
}

/// All five indicators plus a composite majority-vote signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumSummary {
    pub rsi: RsiOutput,
    pub macd: MacdOutput,
    pub stochastic: StochasticOutput,
    pub williams_r: WilliamsROutput,
    pub roc: RocOutput,
    /// Majority vote across the five signals. Oversold counts as a
    /// bullish (contrarian buy) vote, overbought as bearish; ties are
    /// neutral.
    pub composite: IndicatorSignal,
}

fn require_len(series: &OhlcSeries, needed: usize, indicator: &str) -> Result<()> {
    if series.len() < needed {
        return Err(AnalysisError::validation(format!(
            "{indicator} requires at least {needed} bars, got {}",
            series.len()
        )));
    }
    Ok(())
}

/// RSI over `config.rsi_period` using Wilder's smoothing.
///
/// The running averages are the explicit recurrence
/// `avg[i] = (avg[i-1] * (n-1) + value[i]) / n`, seeded by the simple
/// mean of the first window, so the result is exactly order-dependent.
///
/// # Errors
/// `AnalysisError::Validation` with fewer than `rsi_period + 1` bars.
pub fn rsi(series: &OhlcSeries, config: &MomentumConfig) -> Result<RsiOutput> {
    config.validate()?;
    let period = config.rsi_period;
    require_len(series, period + 1, "RSI")?;

    let closes = series.closes();
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let mut avg_gain = stats::mean(&gains[..period]);
    let mut avg_loss = stats::mean(&losses[..period]);
    let n = period as f64;
    for i in period..deltas.len() {
        avg_gain = (avg_gain * (n - 1.0) + gains[i]) / n;
        avg_loss = (avg_loss * (n - 1.0) + losses[i]) / n;
    }

    let value = if avg_loss < f64::EPSILON {
        // Flat window has no direction; all-gain windows are maximally
        // overbought.
        if avg_gain < f64::EPSILON {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    let signal = if value > 70.0 {
        IndicatorSignal::Overbought
    } else if value < 30.0 {
        IndicatorSignal::Oversold
    } else {
        IndicatorSignal::Neutral
    };

    Ok(RsiOutput { value, signal })
}

/// MACD line (fast EMA - slow EMA), signal line (EMA of the MACD
/// line), and histogram. EMAs use span-based recursive smoothing with
/// no forward bias.
///
/// # Errors
/// `AnalysisError::Validation` with fewer than `macd_slow` bars.
pub fn macd(series: &OhlcSeries, config: &MomentumConfig) -> Result<MacdOutput> {
    config.validate()?;
    require_len(series, config.macd_slow, "MACD")?;

    let closes = series.closes();
    let fast = stats::ema(&closes, config.macd_fast);
    let slow = stats::ema(&closes, config.macd_slow);
    let macd_line: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
    let signal_series = stats::ema(&macd_line, config.macd_signal);

    let macd_value = *macd_line.last().unwrap();
    let signal_line = *signal_series.last().unwrap();
    let histogram = macd_value - signal_line;

    let signal = if macd_value > signal_line {
        IndicatorSignal::Bullish
    } else {
        IndicatorSignal::Bearish
    };

    Ok(MacdOutput {
        macd: macd_value,
        signal_line,
        histogram,
        signal,
    })
}

/// Stochastic oscillator: %K over `stoch_k_period` and its SMA %D over
/// `stoch_d_period`. Requires high/low fields on every bar.
///
/// # Errors
/// `AnalysisError::Validation` with fewer than
/// `stoch_k_period + stoch_d_period - 1` bars or missing high/low.
pub fn stochastic(series: &OhlcSeries, config: &MomentumConfig) -> Result<StochasticOutput> {
    config.validate()?;
    let k_period = config.stoch_k_period;
    let d_period = config.stoch_d_period;
    require_len(series, k_period + d_period - 1, "Stochastic")?;

    let closes = series.closes();
    let highs = series.highs()?;
    let lows = series.lows()?;

    // %K for the last d_period bars, oldest first.
    let last = closes.len() - 1;
    let mut k_values = Vec::with_capacity(d_period);
    for end in (last + 1 - d_period)..=last {
        let highest = stats::rolling_max(&highs, end, k_period);
        let lowest = stats::rolling_min(&lows, end, k_period);
        let range = highest - lowest;
        let k = if range < f64::EPSILON {
            // Flat window: close sits mid-range by convention.
            50.0
        } else {
            100.0 * (closes[end] - lowest) / range
        };
        k_values.push(k.clamp(0.0, 100.0));
    }

    let percent_k = *k_values.last().unwrap();
    let percent_d = stats::mean(&k_values);

    let signal = if percent_k > 80.0 {
        IndicatorSignal::Overbought
    } else if percent_k < 20.0 {
        IndicatorSignal::Oversold
    } else {
        IndicatorSignal::Neutral
    };

    Ok(StochasticOutput {
        percent_k,
        percent_d,
        signal,
    })
}

/// Williams %R over `williams_period`. Requires high/low fields.
///
/// # Errors
/// `AnalysisError::Validation` with fewer than `williams_period` bars
/// or missing high/low.
pub fn williams_r(series: &OhlcSeries, config: &MomentumConfig) -> Result<WilliamsROutput> {
    config.validate()?;
    let period = config.williams_period;
    require_len(series, period, "Williams %R")?;

    let closes = series.closes();
    let highs = series.highs()?;
    let lows = series.lows()?;

    let last = closes.len() - 1;
    let highest = stats::rolling_max(&highs, last, period);
    let lowest = stats::rolling_min(&lows, last, period);
    let range = highest - lowest;

    let value = if range < f64::EPSILON {
        -50.0
    } else {
        (-100.0 * (highest - closes[last]) / range).clamp(-100.0, 0.0)
    };

    let signal = if value > -20.0 {
        IndicatorSignal::Overbought
    } else if value < -80.0 {
        IndicatorSignal::Oversold
    } else {
        IndicatorSignal::Neutral
    };

    Ok(WilliamsROutput { value, signal })
}

/// Rate-of-Change: percentage move over `roc_period` bars.
///
/// # Errors
/// `AnalysisError::Validation` with fewer than `roc_period + 1` bars.
pub fn roc(series: &OhlcSeries, config: &MomentumConfig) -> Result<RocOutput> {
    config.validate()?;
    let period = config.roc_period;
    require_len(series, period + 1, "ROC")?;

    let closes = series.closes();
    let last = closes.len() - 1;
    let value = (closes[last] / closes[last - period] - 1.0) * 100.0;

    let signal = if value > 0.0 {
        IndicatorSignal::Bullish
    } else if value < 0.0 {
        IndicatorSignal::Bearish
    } else {
        IndicatorSignal::Neutral
    };

    Ok(RocOutput { value, signal })
}

/// Runs all five indicators and derives the composite signal.
///
/// # Errors
/// `AnalysisError::Validation` if the series is too short for any
/// indicator or lacks high/low fields.
pub fn calculate_all(series: &OhlcSeries, config: &MomentumConfig) -> Result<MomentumSummary> {
    let rsi = rsi(series, config)?;
    let macd = macd(series, config)?;
    let stochastic = stochastic(series, config)?;
    let williams_r = williams_r(series, config)?;
    let roc = roc(series, config)?;

    let signals = [
        rsi.signal,
        macd.signal,
        stochastic.signal,
        williams_r.signal,
        roc.signal,
    ];
    let bullish = signals
        .iter()
        .filter(|s| matches!(s, IndicatorSignal::Bullish | IndicatorSignal::Oversold))
        .count();
    let bearish = signals
        .iter()
        .filter(|s| matches!(s, IndicatorSignal::Bearish | IndicatorSignal::Overbought))
        .count();
    let composite = match bullish.cmp(&bearish) {
        std::cmp::Ordering::Greater => IndicatorSignal::Bullish,
        std::cmp::Ordering::Less => IndicatorSignal::Bearish,
        std::cmp::Ordering::Equal => IndicatorSignal::Neutral,
    };

    Ok(MomentumSummary {
        rsi,
        macd,
        stochastic,
        williams_r,
        roc,
        composite,
    })
}
