//! Period-over-period returns and the weighted portfolio column.

use crate::market::{AlignedMatrix, DateFrame, PORTFOLIO_COLUMN};
use crate::types::AssetSeries;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Deref;

/// Simple returns per asset plus the weighted `Portfolio` column.
///
/// Has one row fewer than the aligned prices it was derived from; the first
/// aligned date has no predecessor.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ReturnMatrix(DateFrame);

impl ReturnMatrix {
    pub(crate) fn from_frame(frame: DateFrame) -> Self {
        Self(frame)
    }

    /// Returns of the weighted portfolio.
    pub fn portfolio(&self) -> &[f64] {
        // compute_returns always appends the portfolio column
        self.0.column(PORTFOLIO_COLUMN).unwrap_or(&[])
    }

    /// Underlying frame.
    pub fn frame(&self) -> &DateFrame {
        &self.0
    }
}

impl Deref for ReturnMatrix {
    type Target = DateFrame;

    fn deref(&self) -> &DateFrame {
        &self.0
    }
}

/// Weight map of a set of assets, keyed by asset id.
pub fn weights_of(assets: &[AssetSeries]) -> HashMap<String, f64> {
    assets
        .iter()
        .map(|asset| (asset.id.clone(), asset.weight))
        .collect()
}

/// Compute simple returns for every aligned asset and the weighted portfolio.
///
/// `return[t] = price[t] / price[t-1] - 1`, and the portfolio return on each
/// date is `Σ weight[asset] * return[asset]`. Weights are used exactly as
/// given; if they do not sum to one the portfolio return is scaled
/// accordingly.
///
/// # Errors
///
/// * `InvalidPrice` if any aligned price is zero, negative or not finite
/// * `InvalidInput` if an aligned asset has no weight or a non-finite one, or
///   if the weights produce a portfolio return of -100% or worse
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use gmp_core::portfolio::weights_of;
/// use gmp_core::{align, compute_returns, AssetSeries};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let assets = vec![
///     AssetSeries::new("A", 0.6).with_observations([(day(1), 100.0), (day(2), 102.0)]),
///     AssetSeries::new("B", 0.4).with_observations([(day(1), 100.0), (day(2), 99.0)]),
/// ];
///
/// let aligned = align(&assets).unwrap();
/// let returns = compute_returns(&aligned, &weights_of(&assets)).unwrap();
///
/// // 0.6 * 0.02 + 0.4 * -0.01
/// assert!((returns.portfolio()[0] - 0.008).abs() < 1e-12);
/// ```
pub fn compute_returns(
    matrix: &AlignedMatrix,
    weights: &HashMap<String, f64>,
) -> Result<ReturnMatrix> {
    let asset_weights = matrix
        .columns()
        .iter()
        .map(|id| match weights.get(id) {
            Some(weight) if weight.is_finite() => Ok(*weight),
            Some(weight) => Err(Error::InvalidInput(format!(
                "weight for '{}' is not finite: {}",
                id, weight
            ))),
            None => Err(Error::InvalidInput(format!("no weight supplied for '{}'", id))),
        })
        .collect::<Result<Vec<f64>>>()?;

    let mut values = Vec::with_capacity(matrix.width() + 1);
    for (id, prices) in matrix.iter_columns() {
        if let Some(row) = prices.iter().position(|p| !is_valid_price(*p)) {
            return Err(Error::InvalidPrice(format!(
                "'{}' has price {} on {}",
                id,
                prices[row],
                matrix.dates()[row]
            )));
        }
        values.push(simple_returns(prices)?);
    }

    let periods = matrix.len().saturating_sub(1);
    let portfolio: Vec<f64> = (0..periods)
        .map(|t| {
            values
                .iter()
                .zip(&asset_weights)
                .map(|(returns, weight)| weight * returns[t])
                .sum()
        })
        .collect();
    if let Some(t) = portfolio.iter().position(|r| *r <= -1.0) {
        return Err(Error::InvalidInput(format!(
            "portfolio return {} on {} wipes out the portfolio; check the weights",
            portfolio[t],
            matrix.dates()[t + 1]
        )));
    }
    values.push(portfolio);

    let mut columns = matrix.columns().to_vec();
    columns.push(PORTFOLIO_COLUMN.to_string());
    let dates = matrix.dates().iter().skip(1).copied().collect();

    Ok(ReturnMatrix::from_frame(DateFrame::new(dates, columns, values)))
}

/// Simple returns of a price series: `p[t] / p[t-1] - 1`.
///
/// Returns an empty vector for fewer than two prices.
///
/// # Errors
///
/// `InvalidPrice` if any price is zero, negative or not finite.
pub fn simple_returns(prices: &[f64]) -> Result<Vec<f64>> {
    if let Some(row) = prices.iter().position(|p| !is_valid_price(*p)) {
        return Err(Error::InvalidPrice(format!(
            "price {} at position {}",
            prices[row], row
        )));
    }

    Ok(prices
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect())
}

pub(crate) fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
