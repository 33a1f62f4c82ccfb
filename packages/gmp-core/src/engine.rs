//! Full analytics pipeline.

use crate::config::AnalyticsConfig;
use crate::market::align;
use crate::portfolio::{
    allocate_amount, allocation, compute_returns, correlation_matrix, cumulative, drawdowns,
    is_valid_price, risk_summary, rolling_volatility, weights_of, AllocationSlice,
    CorrelationMatrix, CumulativeMatrix, DrawdownSeries, InvestmentSlice, ReturnMatrix,
    RiskSummary, RollingVolatility,
};
use crate::types::AssetSeries;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Latest price and period performance of one asset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssetSnapshot {
    /// Asset identifier
    pub id: String,
    /// Ticker, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Date of the latest observation
    pub as_of: NaiveDate,
    /// Latest observed price
    pub latest_price: f64,
    /// Earliest observed price
    pub first_price: f64,
    /// Price return over the asset's full history (`latest / first - 1`)
    pub period_return: f64,
}

/// Every output of one analytics run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    /// Parameters the run used
    pub config: AnalyticsConfig,
    /// Dates in the union of all histories dropped by alignment
    pub dropped_dates: usize,
    pub returns: ReturnMatrix,
    pub cumulative: CumulativeMatrix,
    pub summary: RiskSummary,
    pub correlation: CorrelationMatrix,
    pub rolling_volatility: RollingVolatility,
    pub drawdowns: DrawdownSeries,
    pub max_drawdowns: BTreeMap<String, f64>,
    pub snapshots: Vec<AssetSnapshot>,
    pub allocation: Vec<AllocationSlice>,
    /// Breakdown of an investment amount, when one was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment: Option<Vec<InvestmentSlice>>,
}

impl AnalyticsReport {
    /// Attach the breakdown of `amount` across the assets, priced at each
    /// asset's latest price.
    pub fn with_investment(mut self, amount: f64) -> Result<Self> {
        let holdings = self.allocation.iter().zip(&self.snapshots).map(|(slice, snap)| {
            (slice.id.as_str(), slice.ticker.as_deref(), slice.weight, snap.latest_price)
        });
        self.investment = Some(allocate_amount(amount, holdings)?);
        Ok(self)
    }
}

/// Run the whole pipeline over a set of asset histories.
///
/// Aligns the histories, derives returns and the weighted portfolio, compounds
/// them, and computes risk statistics, correlation, rolling volatility and
/// drawdowns. Any failure is returned unmodified; nothing is substituted.
pub fn analyze(assets: &[AssetSeries], config: &AnalyticsConfig) -> Result<AnalyticsReport> {
    config.validate()?;

    let aligned = align(assets)?;
    let returns = compute_returns(&aligned, &weights_of(assets))?;
    let cumulative = cumulative(&returns);
    let (drawdowns, max_drawdowns) = drawdowns(&cumulative);

    let summary = risk_summary(
        &returns,
        &cumulative,
        &max_drawdowns,
        config.periods_per_year,
        config.horizon_years,
    )?;
    let correlation = correlation_matrix(&returns)?;
    let rolling_volatility = rolling_volatility(&returns, config.window, config.periods_per_year)?;

    let snapshots = assets
        .iter()
        .map(snapshot)
        .collect::<Result<Vec<_>>>()?;
    let allocation = allocation(
        assets
            .iter()
            .map(|asset| (asset.id.as_str(), asset.ticker.as_deref(), asset.weight)),
    )?;

    tracing::info!(
        "Analyzed {} assets over {} return periods",
        assets.len(),
        returns.len()
    );

    Ok(AnalyticsReport {
        config: *config,
        dropped_dates: aligned.dropped_dates(),
        returns,
        cumulative,
        summary,
        correlation,
        rolling_volatility,
        drawdowns,
        max_drawdowns,
        snapshots,
        allocation,
        investment: None,
    })
}

fn snapshot(asset: &AssetSeries) -> Result<AssetSnapshot> {
    let (Some(first), Some(latest)) = (asset.first(), asset.latest()) else {
        return Err(Error::InsufficientData(format!(
            "'{}' has no observations",
            asset.id
        )));
    };
    for observation in [first, latest] {
        if !is_valid_price(observation.price) {
            return Err(Error::InvalidPrice(format!(
                "'{}' has price {} on {}",
                asset.id, observation.price, observation.date
            )));
        }
    }

    Ok(AssetSnapshot {
        id: asset.id.clone(),
        ticker: asset.ticker.clone(),
        as_of: latest.date,
        latest_price: latest.price,
        first_price: first.price,
        period_return: latest.price / first.price - 1.0,
    })
}
