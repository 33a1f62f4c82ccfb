//! GMP Core - Analytics engine for the global market portfolio dashboards.
//!
//! This crate turns raw per-asset price series into everything the dashboards
//! render:
//!
//! - **Alignment**: inner join of every asset's history onto one date axis
//! - **Returns**: simple period returns plus a weighted `Portfolio` column
//! - **Performance**: growth-of-one cumulative index
//! - **Risk metrics**: annualized return and volatility, Sharpe ratio,
//!   correlation matrix, rolling volatility
//! - **Drawdowns**: running peak, drawdown curve, maximum drawdown
//!
//! The engine never performs I/O. Price acquisition happens before it is
//! called; the optional `gmp` binary reads an already-fetched snapshot from disk.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use gmp_core::{analyze, AnalyticsConfig, AssetSeries};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let assets = vec![
//!     AssetSeries::new("Equities", 0.6)
//!         .with_observations([(day(2), 100.0), (day(3), 102.0), (day(4), 101.0), (day(5), 104.0)]),
//!     AssetSeries::new("Bonds", 0.4)
//!         .with_observations([(day(2), 50.0), (day(3), 49.5), (day(4), 50.5), (day(5), 50.0)]),
//! ];
//!
//! let config = AnalyticsConfig { window: 2, ..Default::default() };
//! let report = analyze(&assets, &config).unwrap();
//!
//! assert_eq!(report.returns.len(), 3);
//! assert!(report.max_drawdowns["Portfolio"] <= 0.0);
//! ```

pub mod config;
pub mod engine;
pub mod market;
pub mod portfolio;
pub mod types;

// Re-export commonly used types
pub use types::{ApiResponse, AssetSeries, PriceObservation, PriceSnapshot};

// Re-export main functionality
pub use config::{horizon_years_between, AnalyticsConfig, AssetClass, Universe};
pub use engine::{analyze, AnalyticsReport, AssetSnapshot};
pub use market::{align, AlignedMatrix, DateFrame, PORTFOLIO_COLUMN};
pub use portfolio::{
    allocate_amount, allocation, compute_returns, correlation_matrix, cumulative, drawdowns,
    rolling_volatility, summarize, AllocationSlice, AssetRisk, CorrelationMatrix,
    CumulativeMatrix, DrawdownSeries, InvestmentSlice, ReturnMatrix, RiskSummary,
    RollingVolatility,
};

/// Error types for gmp-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Degenerate volatility: {0}")]
    DegenerateVolatility(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for gmp-core operations.
pub type Result<T> = std::result::Result<T, Error>;
