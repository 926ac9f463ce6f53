//! Quantitative analysis calculators for portfolio intelligence:
//! risk metrics, momentum indicators, correlation analysis,
//! Black-Scholes-Merton option pricing, and portfolio optimization.
//!
//! Every calculator is a stateless pure function of its inputs and a
//! per-call configuration; calls are independent and safe to run
//! concurrently.

pub mod correlation;
pub mod momentum;
pub mod options;
pub mod optimizer;
pub mod risk;

pub use correlation::CorrelationOutput;
pub use momentum::{IndicatorSignal, MomentumSummary};
pub use optimizer::{FrontierPoint, OptimizationOutput};
pub use options::{Moneyness, OptionAnalysis};
pub use risk::RiskMetrics;
