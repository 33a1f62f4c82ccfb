//! Portfolio analytics module.
//!
//! Provides returns, cumulative performance, risk metrics, drawdowns, and the
//! allocation breakdown.

mod allocation;
mod drawdown;
mod performance;
mod returns;
mod risk;

pub use allocation::{allocate_amount, allocation, AllocationSlice, InvestmentSlice};
pub use drawdown::{drawdown_curve, drawdowns, max_drawdown, running_peak, DrawdownSeries};
pub use performance::{annualize_growth, cumulative, growth_index, total_return, CumulativeMatrix};
pub use returns::{compute_returns, simple_returns, weights_of, ReturnMatrix};
pub(crate) use returns::is_valid_price;
pub use risk::{
    annualized_volatility, correlation_matrix, mean, pearson, risk_summary, rolling_std_dev,
    rolling_volatility, sample_std_dev, sharpe_ratio, summarize, AssetRisk, CorrelationMatrix,
    RiskSummary, RollingVolatility,
};
