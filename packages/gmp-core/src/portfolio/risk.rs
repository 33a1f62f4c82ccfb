//! Portfolio risk metrics calculation.
//!
//! Provides annualized return and volatility, Sharpe ratio, Pearson
//! correlation, and rolling volatility. Every statistic is recomputed from the
//! full return history on each call.

use super::drawdown::drawdowns;
use super::performance::{annualize_growth, cumulative};
use super::{CumulativeMatrix, ReturnMatrix};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Risk and return statistics of one column.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssetRisk {
    /// Asset identifier, or `Portfolio`
    pub id: String,
    /// Geometric (CAGR-style) return per year over the horizon
    pub annualized_return: f64,
    /// Sample standard deviation of returns scaled to one year
    pub annualized_volatility: f64,
    /// Annualized return divided by annualized volatility
    pub sharpe_ratio: f64,
    /// Most negative drawdown of the cumulative series
    pub max_drawdown: f64,
}

/// Per-column risk statistics in return-matrix column order.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct RiskSummary {
    entries: Vec<AssetRisk>,
}

impl RiskSummary {
    /// Statistics of one column.
    pub fn get(&self, id: &str) -> Option<&AssetRisk> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// All entries in column order.
    pub fn entries(&self) -> &[AssetRisk] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Symmetric matrix of pairwise Pearson correlations.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlation between two columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Column identifiers (row and column order).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major correlation values.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }
}

/// Trailing-window annualized volatility per column.
///
/// Aligned to the return matrix's dates. The first `window - 1` entries of
/// every column are `None`: there is not yet a full window of history.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RollingVolatility {
    window: usize,
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl RollingVolatility {
    /// Window length in periods.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Date axis (same as the return matrix).
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column identifiers.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Volatility series of one column.
    pub fn column(&self, id: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|c| c == id)
            .map(|c| self.values[c].as_slice())
    }
}

/// Compute the risk summary, correlation matrix and rolling volatility.
///
/// # Arguments
///
/// * `returns` - Aligned return matrix including the portfolio column
/// * `periods_per_year` - Return periods in a year (252 for daily trading data)
/// * `horizon_years` - Span of the return history in years
/// * `window` - Rolling volatility window in periods (typically 90)
///
/// # Errors
///
/// Propagates the first failure met, naming the column:
///
/// * `InsufficientData` with fewer than two return observations
/// * `DegenerateVolatility` when a column has zero variance, since both its
///   Sharpe ratio and its correlations are undefined
/// * `InvalidInput` for a zero `periods_per_year`, a non-positive horizon, or a
///   window shorter than two periods
pub fn summarize(
    returns: &ReturnMatrix,
    periods_per_year: u32,
    horizon_years: f64,
    window: usize,
) -> Result<(RiskSummary, CorrelationMatrix, RollingVolatility)> {
    let cumulative = cumulative(returns);
    let (_, max_drawdowns) = drawdowns(&cumulative);

    let summary = risk_summary(
        returns,
        &cumulative,
        &max_drawdowns,
        periods_per_year,
        horizon_years,
    )?;
    let correlation = correlation_matrix(returns)?;
    let rolling = rolling_volatility(returns, window, periods_per_year)?;

    Ok((summary, correlation, rolling))
}

/// Build the per-column summary from already compounded series.
///
/// `cumulative` and `max_drawdowns` must come from the same `returns`.
pub fn risk_summary(
    returns: &ReturnMatrix,
    cumulative: &CumulativeMatrix,
    max_drawdowns: &BTreeMap<String, f64>,
    periods_per_year: u32,
    horizon_years: f64,
) -> Result<RiskSummary> {
    let mut entries = Vec::with_capacity(returns.width());

    for (id, column) in returns.iter_columns() {
        let final_growth = cumulative.final_value(id).unwrap_or(1.0);
        let annualized_return = annualize_growth(final_growth, horizon_years)?;
        let annualized_volatility =
            annualized_volatility(column, periods_per_year).map_err(|e| in_column(id, e))?;
        let sharpe_ratio =
            sharpe_ratio(annualized_return, annualized_volatility).map_err(|e| in_column(id, e))?;

        entries.push(AssetRisk {
            id: id.to_string(),
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: max_drawdowns.get(id).copied().unwrap_or(0.0),
        });
    }

    Ok(RiskSummary { entries })
}

/// Pairwise Pearson correlation of every return column.
///
/// The diagonal is 1.0 by construction and the lower triangle mirrors the
/// upper one, so the result is exactly symmetric.
pub fn correlation_matrix(returns: &ReturnMatrix) -> Result<CorrelationMatrix> {
    if returns.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "correlation needs at least 2 return observations, got {}",
            returns.len()
        )));
    }

    let columns: Vec<(&str, &[f64])> = returns.iter_columns().collect();
    let n = columns.len();
    let mut values = vec![vec![1.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (a_id, a) = columns[i];
            let (b_id, b) = columns[j];
            let rho = pearson(a, b).map_err(|e| match e {
                Error::DegenerateVolatility(_) => Error::DegenerateVolatility(format!(
                    "correlation of '{}' and '{}' is undefined: one series has zero variance",
                    a_id, b_id
                )),
                other => other,
            })?;
            values[i][j] = rho;
            values[j][i] = rho;
        }
    }

    Ok(CorrelationMatrix {
        columns: returns.columns().to_vec(),
        values,
    })
}

/// Annualized rolling volatility of every return column.
///
/// # Errors
///
/// `InvalidInput` when `window < 2` or `periods_per_year == 0`. A window
/// longer than the history is not an error; every entry is then `None`.
pub fn rolling_volatility(
    returns: &ReturnMatrix,
    window: usize,
    periods_per_year: u32,
) -> Result<RollingVolatility> {
    let scale = annualization_factor(periods_per_year)?;

    let values = returns
        .iter_columns()
        .map(|(_, column)| {
            rolling_std_dev(column, window).map(|stds| {
                stds.into_iter()
                    .map(|std| std.map(|s| s * scale))
                    .collect()
            })
        })
        .collect::<Result<Vec<Vec<Option<f64>>>>>()?;

    Ok(RollingVolatility {
        window,
        dates: returns.dates().to_vec(),
        columns: returns.columns().to_vec(),
        values,
    })
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N−1 denominator).
///
/// # Errors
///
/// `InsufficientData` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    let Some(mean) = mean(values).filter(|_| values.len() >= 2) else {
        return Err(Error::InsufficientData(format!(
            "sample standard deviation needs at least 2 values, got {}",
            values.len()
        )));
    };

    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Annualized volatility: sample standard deviation times `sqrt(periods_per_year)`.
pub fn annualized_volatility(returns: &[f64], periods_per_year: u32) -> Result<f64> {
    Ok(sample_std_dev(returns)? * annualization_factor(periods_per_year)?)
}

/// Sharpe ratio as annualized return over annualized volatility.
///
/// # Errors
///
/// `DegenerateVolatility` when volatility is exactly zero. The ratio is never
/// replaced by zero or infinity.
pub fn sharpe_ratio(annualized_return: f64, annualized_volatility: f64) -> Result<f64> {
    if annualized_volatility == 0.0 {
        return Err(Error::DegenerateVolatility(
            "volatility is zero, Sharpe ratio is undefined".to_string(),
        ));
    }
    Ok(annualized_return / annualized_volatility)
}

/// Pearson correlation of two equally long series.
///
/// Rounding is clamped into `[-1, 1]`.
///
/// # Errors
///
/// * `InvalidInput` if the lengths differ
/// * `InsufficientData` with fewer than two observations
/// * `DegenerateVolatility` if either series has zero variance
pub fn pearson(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::InvalidInput(format!(
            "correlated series differ in length ({} vs {})",
            a.len(),
            b.len()
        )));
    }
    if a.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "correlation needs at least 2 observations, got {}",
            a.len()
        )));
    }

    let mean_a = a.iter().sum::<f64>() / a.len() as f64;
    let mean_b = b.iter().sum::<f64>() / b.len() as f64;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    if variance_a == 0.0 || variance_b == 0.0 {
        return Err(Error::DegenerateVolatility(
            "series has zero variance, correlation is undefined".to_string(),
        ));
    }

    Ok((covariance / (variance_a.sqrt() * variance_b.sqrt())).clamp(-1.0, 1.0))
}

/// Sample standard deviation over a trailing window.
///
/// Entry `t` covers `values[t + 1 - window ..= t]`; entries before the first
/// full window are `None`.
pub fn rolling_std_dev(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window < 2 {
        return Err(Error::InvalidInput(format!(
            "rolling window must span at least 2 periods, got {}",
            window
        )));
    }

    let mut result = vec![None; values.len()];
    for end in (window - 1)..values.len() {
        result[end] = Some(sample_std_dev(&values[end + 1 - window..=end])?);
    }

    Ok(result)
}

fn annualization_factor(periods_per_year: u32) -> Result<f64> {
    if periods_per_year == 0 {
        return Err(Error::InvalidInput(
            "periods_per_year must be positive".to_string(),
        ));
    }
    Ok(f64::from(periods_per_year).sqrt())
}

fn in_column(id: &str, error: Error) -> Error {
    match error {
        Error::InsufficientData(msg) => Error::InsufficientData(format!("'{}': {}", id, msg)),
        Error::DegenerateVolatility(msg) => {
            Error::DegenerateVolatility(format!("'{}': {}", id, msg))
        }
        other => other,
    }
}
