//! Shared statistics primitives.
//!
//! Every calculator builds on these routines: sample moments,
//! percentiles, covariance/correlation, exponential moving averages,
//! rolling extrema, and standard-normal distribution helpers.
//! All sample statistics use the n-1 (Bessel) denominator.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Arithmetic mean. Returns 0.0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n-1 denominator). Returns 0.0 with fewer than two values.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Sample standard deviation (n-1 denominator).
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Sample covariance between two equal-length series (n-1 denominator).
///
/// Returns 0.0 when the lengths differ or fewer than two pairs exist.
#[must_use]
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    let mx = mean(x);
    let my = mean(y);
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / (x.len() - 1) as f64
}

/// Pearson correlation coefficient between two equal-length series.
///
/// Returns 0.0 when either series is degenerate (zero variance) or the
/// inputs are too short to correlate.
#[must_use]
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator < f64::EPSILON {
        return 0.0;
    }

    (cov / denominator).clamp(-1.0, 1.0)
}

/// Spearman rank correlation: Pearson correlation of the rank
/// transforms, with tied values sharing their average rank.
#[must_use]
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    pearson_correlation(&ranks(x), &ranks(y))
}

/// Average ranks (1-based) of a series; ties share the mean rank.
#[must_use]
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));

    let mut out = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Average rank across the tie group [i, j].
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            out[idx] = rank;
        }
        i = j + 1;
    }
    out
}

/// Linear-interpolation percentile (the numpy "linear" method).
///
/// `pct` is in [0, 100]. Returns 0.0 for an empty slice.
#[must_use]
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Recursive exponential moving average with span-based smoothing,
/// `alpha = 2 / (span + 1)`, seeded with the first value.
///
/// Each output depends only on past values and the seed (pandas
/// `adjust=False` semantics), so there is no forward bias.
#[must_use]
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    out.push(values[0]);
    for &v in &values[1..] {
        let prev = *out.last().unwrap();
        out.push(alpha * v + (1.0 - alpha) * prev);
    }
    out
}

/// Maximum over the trailing `window` values ending at `end` (inclusive).
#[must_use]
pub fn rolling_max(values: &[f64], end: usize, window: usize) -> f64 {
    let start = (end + 1).saturating_sub(window);
    values[start..=end].iter().copied().fold(f64::MIN, f64::max)
}

/// Minimum over the trailing `window` values ending at `end` (inclusive).
#[must_use]
pub fn rolling_min(values: &[f64], end: usize, window: usize) -> f64 {
    let start = (end + 1).saturating_sub(window);
    values[start..=end].iter().copied().fold(f64::MAX, f64::min)
}

// Normal::new only rejects non-finite parameters, so the standard
// normal construction cannot fail.
fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("standard normal parameters are finite")
}

/// Standard normal cumulative distribution function Φ(x).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    standard_normal().cdf(x)
}

/// Standard normal probability density function φ(x).
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    standard_normal().pdf(x)
}

/// Standard normal inverse CDF (quantile function).
#[must_use]
pub fn norm_inv_cdf(p: f64) -> f64 {
    standard_normal().inverse_cdf(p)
}
