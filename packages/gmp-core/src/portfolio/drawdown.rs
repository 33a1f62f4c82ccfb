//! Peak-to-trough drawdown analysis.

use super::CumulativeMatrix;
use crate::market::DateFrame;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Deref;

/// Drawdown from the running peak for every column of a cumulative matrix.
///
/// Values are `(cumulative - running_max) / running_max` and never positive.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct DrawdownSeries(DateFrame);

impl DrawdownSeries {
    /// Date and depth of the deepest drawdown of a column.
    ///
    /// Returns the first date on which the minimum is reached.
    pub fn trough(&self, id: &str) -> Option<(NaiveDate, f64)> {
        let values = self.0.column(id)?;
        let (row, depth) = values
            .iter()
            .copied()
            .enumerate()
            .fold(None, |deepest: Option<(usize, f64)>, (row, value)| match deepest {
                Some((_, min)) if min <= value => deepest,
                _ => Some((row, value)),
            })?;

        Some((self.0.dates()[row], depth))
    }

    /// Underlying frame.
    pub fn frame(&self) -> &DateFrame {
        &self.0
    }
}

impl Deref for DrawdownSeries {
    type Target = DateFrame;

    fn deref(&self) -> &DateFrame {
        &self.0
    }
}

/// Compute drawdown curves and the maximum drawdown of every column.
///
/// The maximum drawdown is the most negative point of each curve, and zero
/// when a column never falls below an earlier peak.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use gmp_core::portfolio::weights_of;
/// use gmp_core::{align, compute_returns, cumulative, drawdowns, AssetSeries};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let assets = vec![AssetSeries::new("A", 1.0)
///     .with_observations([(day(1), 100.0), (day(2), 110.0), (day(3), 99.0)])];
///
/// let aligned = align(&assets).unwrap();
/// let returns = compute_returns(&aligned, &weights_of(&assets)).unwrap();
/// let (_, max_drawdowns) = drawdowns(&cumulative(&returns));
///
/// assert!((max_drawdowns["A"] + 0.1).abs() < 1e-12);
/// ```
pub fn drawdowns(cumulative: &CumulativeMatrix) -> (DrawdownSeries, BTreeMap<String, f64>) {
    let mut values = Vec::with_capacity(cumulative.width());
    let mut max_drawdowns = BTreeMap::new();

    for (id, column) in cumulative.iter_columns() {
        let curve = drawdown_curve(column);
        max_drawdowns.insert(id.to_string(), deepest(&curve));
        values.push(curve);
    }

    let series = DrawdownSeries(DateFrame::new(
        cumulative.dates().to_vec(),
        cumulative.columns().to_vec(),
        values,
    ));

    (series, max_drawdowns)
}

/// Running maximum of a series; never decreases.
pub fn running_peak(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(f64::NEG_INFINITY, |peak, &value| {
            *peak = peak.max(value);
            Some(*peak)
        })
        .collect()
}

/// Proportional distance of each value below its running peak.
pub fn drawdown_curve(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .zip(running_peak(values))
        .map(|(value, peak)| (value - peak) / peak)
        .collect()
}

/// Maximum drawdown of a growth series as a non-positive fraction.
///
/// Returns -0.15 for a 15% peak-to-trough decline, and 0.0 for an empty or
/// never-declining series.
pub fn max_drawdown(values: &[f64]) -> f64 {
    deepest(&drawdown_curve(values))
}

fn deepest(curve: &[f64]) -> f64 {
    curve.iter().copied().fold(0.0, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::align;
    use crate::portfolio::performance::growth_index;
    use crate::portfolio::{compute_returns, cumulative, weights_of};
    use crate::types::AssetSeries;
    use approx::assert_abs_diff_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 9, d).unwrap()
    }

    fn cumulative_for(columns: &[(&str, &[f64])]) -> CumulativeMatrix {
        let assets: Vec<AssetSeries> = columns
            .iter()
            .map(|(id, prices)| {
                AssetSeries::new(*id, 1.0 / columns.len() as f64).with_observations(
                    prices
                        .iter()
                        .enumerate()
                        .map(|(i, &p)| (day(i as u32 + 1), p)),
                )
            })
            .collect();
        let aligned = align(&assets).unwrap();
        cumulative(&compute_returns(&aligned, &weights_of(&assets)).unwrap())
    }

    #[test]
    fn test_drawdowns_identical_moves() {
        let cum = cumulative_for(&[("A", &[100.0, 110.0, 99.0]), ("B", &[50.0, 55.0, 49.5])]);
        let (series, max_drawdowns) = drawdowns(&cum);

        assert_eq!(series.dates(), cum.dates());
        for id in ["A", "B", "Portfolio"] {
            let curve = series.column(id).unwrap();
            assert_eq!(curve[0], 0.0);
            assert_abs_diff_eq!(curve[1], (0.99 - 1.10) / 1.10, epsilon = 1e-12);
            assert_abs_diff_eq!(max_drawdowns[id], -0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_drawdowns_non_decreasing_series() {
        let cum = cumulative_for(&[("A", &[100.0, 101.0, 101.0, 105.0])]);
        let (series, max_drawdowns) = drawdowns(&cum);

        assert!(series.column("A").unwrap().iter().all(|v| *v == 0.0));
        assert_eq!(max_drawdowns["A"], 0.0);
    }

    #[test]
    fn test_trough_date() {
        let cum = cumulative_for(&[("A", &[100.0, 120.0, 90.0, 95.0, 130.0])]);
        let (series, max_drawdowns) = drawdowns(&cum);

        let (date, depth) = series.trough("A").unwrap();
        // Returns start on the second price date, so 90.0 sits on day 3.
        assert_eq!(date, day(3));
        assert_abs_diff_eq!(depth, -0.25, epsilon = 1e-12);
        assert_eq!(depth, max_drawdowns["A"]);
        assert!(series.trough("Missing").is_none());
    }

    #[test]
    fn test_recovery_resets_to_zero() {
        let curve = drawdown_curve(&[1.0, 0.8, 1.0, 1.2, 0.9]);

        assert_abs_diff_eq!(curve[1], -0.2, epsilon = 1e-12);
        assert_eq!(curve[2], 0.0);
        assert_eq!(curve[3], 0.0);
        assert_abs_diff_eq!(curve[4], -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_running_peak_never_decreases() {
        let peaks = running_peak(&[1.0, 1.5, 1.2, 1.7, 0.4]);
        assert_eq!(peaks, vec![1.0, 1.5, 1.5, 1.7, 1.7]);
    }

    #[test]
    fn test_max_drawdown() {
        // Series that goes up, then down significantly
        let growth = growth_index(&[0.10, 0.05, -0.15, -0.10, 0.05]);

        let mdd = max_drawdown(&growth);

        // Peak: 1.10 * 1.05 = 1.155, trough: 1.155 * 0.85 * 0.90
        assert_abs_diff_eq!(mdd, 0.85 * 0.90 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_no_loss() {
        let growth = growth_index(&[0.01, 0.02, 0.03, 0.01, 0.02]);

        assert_eq!(max_drawdown(&growth), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_max_drawdown_never_positive() {
        let samples: [&[f64]; 4] = [
            &[1.0, 2.0, 3.0],
            &[3.0, 2.0, 1.0],
            &[1.0, 0.5, 2.0, 0.1],
            &[0.9],
        ];

        for values in samples {
            let mdd = max_drawdown(values);
            assert!(mdd <= 0.0);
            let non_decreasing = values.windows(2).all(|w| w[1] >= w[0]);
            assert_eq!(mdd == 0.0, non_decreasing);
        }
    }
}
