//! Cumulative performance of return series.

use super::ReturnMatrix;
use crate::market::DateFrame;
use crate::{Error, Result};
use serde::Serialize;
use std::ops::Deref;

/// Growth of one unit invested at the start of the return history.
///
/// Same shape and columns as the [`ReturnMatrix`] it was compounded from.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CumulativeMatrix(DateFrame);

impl CumulativeMatrix {
    /// Final growth value of a column.
    pub fn final_value(&self, id: &str) -> Option<f64> {
        self.0.column(id).and_then(|values| values.last().copied())
    }

    /// Underlying frame.
    pub fn frame(&self) -> &DateFrame {
        &self.0
    }
}

impl Deref for CumulativeMatrix {
    type Target = DateFrame;

    fn deref(&self) -> &DateFrame {
        &self.0
    }
}

/// Compound every column of a return matrix into a growth index.
///
/// `cum[0] = 1 + r[0]` and `cum[t] = cum[t-1] * (1 + r[t])`. Values fall
/// whenever returns are negative; that is what drawdown analysis measures.
pub fn cumulative(returns: &ReturnMatrix) -> CumulativeMatrix {
    let values = returns
        .iter_columns()
        .map(|(_, column)| growth_index(column))
        .collect();

    CumulativeMatrix(DateFrame::new(
        returns.dates().to_vec(),
        returns.columns().to_vec(),
        values,
    ))
}

/// Running product of `(1 + r)` over a return series.
pub fn growth_index(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |growth, r| {
            *growth *= 1.0 + r;
            Some(*growth)
        })
        .collect()
}

/// Total compounded return of a series (final growth minus one).
pub fn total_return(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |growth, r| growth * (1.0 + r)) - 1.0
}

/// Geometric annualization of a final growth value over a horizon in years.
///
/// `final_growth^(1 / horizon_years) - 1`, CAGR-style.
///
/// # Errors
///
/// * `InvalidInput` if the horizon is not a positive finite number
/// * `InvalidPrice` if the growth value is negative, which only happens when
///   a period lost more than everything invested
pub fn annualize_growth(final_growth: f64, horizon_years: f64) -> Result<f64> {
    if !horizon_years.is_finite() || horizon_years <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "horizon must be a positive number of years, got {}",
            horizon_years
        )));
    }
    if !final_growth.is_finite() || final_growth < 0.0 {
        return Err(Error::InvalidPrice(format!(
            "cumulative growth {} cannot be annualized",
            final_growth
        )));
    }

    Ok(final_growth.powf(1.0 / horizon_years) - 1.0)
}
