//! Shared data model, configuration, and statistics primitives for the
//! portfolio analytics workspace.

pub mod config;
pub mod error;
pub mod grid;
pub mod options_input;
pub mod portfolio;
pub mod series;
pub mod stats;

pub use config::{
    ComplianceConfig, CorrelationConfig, CorrelationMethod, MomentumConfig, OptimizationConfig,
    OptimizationMethod, RiskConfig, VarMethod,
};
pub use error::{AnalysisError, Result};
pub use grid::PriceGrid;
pub use options_input::{BlackScholesInput, OptionType};
pub use portfolio::{Portfolio, Position};
pub use series::{OhlcBar, OhlcSeries, PricePoint, PriceSeries};
