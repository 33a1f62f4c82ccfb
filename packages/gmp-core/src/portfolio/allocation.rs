//! Allocation breakdown for display.

use super::is_valid_price;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One slice of the allocation pie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationSlice {
    /// Asset identifier
    pub id: String,
    /// Ticker, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Target weight as given
    pub weight: f64,
    /// Weight as a share of the total weight (sums to 1 across slices)
    pub share: f64,
}

/// Calculate each holding's share of the total target weight.
///
/// Shares are for display only; return calculations always use the raw
/// weights.
///
/// # Errors
///
/// `InvalidInput` if a weight is negative or not finite, or if the weights do
/// not add up to a positive total.
pub fn allocation<'a, I>(holdings: I) -> Result<Vec<AllocationSlice>>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>, f64)>,
{
    let holdings: Vec<_> = holdings.into_iter().collect();

    if let Some((id, _, weight)) = holdings
        .iter()
        .find(|(_, _, weight)| !weight.is_finite() || *weight < 0.0)
    {
        return Err(Error::InvalidInput(format!(
            "weight for '{}' must be a non-negative number, got {}",
            id, weight
        )));
    }

    let total: f64 = holdings.iter().map(|(_, _, weight)| weight).sum();
    if total <= 0.0 {
        return Err(Error::InvalidInput(
            "allocation weights must add up to a positive total".to_string(),
        ));
    }

    Ok(holdings
        .into_iter()
        .map(|(id, ticker, weight)| AllocationSlice {
            id: id.to_string(),
            ticker: ticker.map(str::to_string),
            weight,
            share: weight / total,
        })
        .collect())
}

/// Dollar allocation of an investment amount to one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestmentSlice {
    /// Asset identifier
    pub id: String,
    /// Ticker, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Target weight as given
    pub weight: f64,
    /// Price the share count is estimated at
    pub price: f64,
    /// `amount * weight`
    pub allocated: f64,
    /// Whole shares the allocation buys at `price`
    pub shares: u64,
}

/// Split an investment amount across holdings by target weight.
///
/// Each holding receives `amount * weight` (raw weight, as the return math
/// uses it) and an estimate of the whole shares that buys at its price.
/// Holdings are `(id, ticker, weight, price)`.
///
/// # Errors
///
/// * `InvalidInput` if the amount is not a positive number, or a weight is
///   negative or not finite
/// * `InvalidPrice` if a price is zero, negative or not finite
pub fn allocate_amount<'a, I>(amount: f64, holdings: I) -> Result<Vec<InvestmentSlice>>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>, f64, f64)>,
{
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "investment amount must be a positive number, got {}",
            amount
        )));
    }

    holdings
        .into_iter()
        .map(|(id, ticker, weight, price)| {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "weight for '{}' must be a non-negative number, got {}",
                    id, weight
                )));
            }
            if !is_valid_price(price) {
                return Err(Error::InvalidPrice(format!("'{}' has price {}", id, price)));
            }

            let allocated = amount * weight;
            Ok(InvestmentSlice {
                id: id.to_string(),
                ticker: ticker.map(str::to_string),
                weight,
                price,
                allocated,
                shares: (allocated / price).floor() as u64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_allocation_shares() {
        let slices = allocation([
            ("Global Equities", Some("VT"), 0.55),
            ("Global Bonds", Some("AGG"), 0.25),
            ("Gold", None, 0.20),
        ])
        .unwrap();

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].ticker.as_deref(), Some("VT"));
        assert_abs_diff_eq!(slices[0].share, 0.55, epsilon = 1e-12);
        assert_abs_diff_eq!(slices.iter().map(|s| s.share).sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_allocation_normalizes_shares_only() {
        let slices = allocation([("A", None, 1.0), ("B", None, 3.0)]).unwrap();

        assert_eq!(slices[1].weight, 3.0);
        assert_abs_diff_eq!(slices[0].share, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(slices[1].share, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_allocation_rejects_zero_total() {
        let result = allocation([("A", None, 0.0), ("B", None, 0.0)]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = allocation(Vec::<(&str, Option<&str>, f64)>::new());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_allocation_rejects_negative_weight() {
        let result = allocation([("A", None, 0.8), ("Short", None, -0.2)]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_allocate_amount() {
        let slices = allocate_amount(
            10_000.0,
            [
                ("Global Equities", Some("VT"), 0.55, 110.0),
                ("Gold", Some("GLD"), 0.03, 185.5),
                ("Cash", Some("BIL"), 0.02, 91.6),
            ],
        )
        .unwrap();

        assert_eq!(slices.len(), 3);
        assert_abs_diff_eq!(slices[0].allocated, 5_500.0, epsilon = 1e-9);
        assert_eq!(slices[0].shares, 50);
        // 300 / 185.5 buys one whole share
        assert_abs_diff_eq!(slices[1].allocated, 300.0, epsilon = 1e-9);
        assert_eq!(slices[1].shares, 1);
        assert_eq!(slices[2].shares, 2);
        assert_eq!(slices[2].ticker.as_deref(), Some("BIL"));
    }

    #[test]
    fn test_allocate_amount_below_one_share() {
        let slices = allocate_amount(100.0, [("Gold", None, 0.03, 185.5)]).unwrap();

        assert_abs_diff_eq!(slices[0].allocated, 3.0, epsilon = 1e-12);
        assert_eq!(slices[0].shares, 0);
    }

    #[test]
    fn test_allocate_amount_rejects_bad_amount() {
        for amount in [0.0, -500.0, f64::NAN, f64::INFINITY] {
            let result = allocate_amount(amount, [("A", None, 1.0, 10.0)]);
            assert!(matches!(result, Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_allocate_amount_rejects_bad_price() {
        let result = allocate_amount(1_000.0, [("A", None, 0.5, 0.0)]);
        assert!(matches!(result, Err(Error::InvalidPrice(_))));

        let result = allocate_amount(1_000.0, [("A", None, -0.5, 10.0)]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
