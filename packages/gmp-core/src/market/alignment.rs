//! Alignment of per-asset price histories onto a common date axis.

use super::DateFrame;
use crate::types::AssetSeries;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::ops::Deref;

/// Column name reserved for the weighted portfolio.
pub const PORTFOLIO_COLUMN: &str = "Portfolio";

/// Below this kept/available ratio the alignment logs a warning.
pub const ALIGNMENT_WARN_RATIO: f64 = 0.5;

/// Prices of every asset on the dates all assets have in common.
#[derive(Debug, Clone, Serialize)]
pub struct AlignedMatrix {
    #[serde(flatten)]
    frame: DateFrame,
    dropped_dates: usize,
}

impl AlignedMatrix {
    /// Exact-date price lookup.
    pub fn price(&self, date: NaiveDate, id: &str) -> Option<f64> {
        self.frame.get(date, id)
    }

    /// Number of dates seen in any asset that did not survive the join.
    pub fn dropped_dates(&self) -> usize {
        self.dropped_dates
    }

    /// Underlying frame.
    pub fn frame(&self) -> &DateFrame {
        &self.frame
    }
}

impl Deref for AlignedMatrix {
    type Target = DateFrame;

    fn deref(&self) -> &DateFrame {
        &self.frame
    }
}

/// Align a set of asset histories by inner join on date.
///
/// Only dates present in every asset are kept, in ascending order, and each
/// asset contributes its price on exactly that date. Nothing is interpolated
/// or carried forward.
///
/// # Errors
///
/// * `InvalidInput` for an empty set, duplicate or reserved ids, or
///   observations that are not strictly increasing by date
/// * `InsufficientData` when fewer than two common dates remain
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use gmp_core::{align, AssetSeries};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let assets = vec![
///     AssetSeries::new("A", 0.5).with_observations([(day(1), 10.0), (day(2), 11.0), (day(3), 12.0)]),
///     AssetSeries::new("B", 0.5).with_observations([(day(2), 20.0), (day(3), 21.0)]),
/// ];
///
/// let aligned = align(&assets).unwrap();
/// assert_eq!(aligned.dates(), &[day(2), day(3)]);
/// assert_eq!(aligned.price(day(2), "A"), Some(11.0));
/// ```
pub fn align(assets: &[AssetSeries]) -> Result<AlignedMatrix> {
    let Some((head, rest)) = assets.split_first() else {
        return Err(Error::InvalidInput("no asset series supplied".to_string()));
    };

    let mut ids = HashSet::new();
    for asset in assets {
        if asset.id == PORTFOLIO_COLUMN {
            return Err(Error::InvalidInput(format!(
                "asset id '{}' is reserved for the weighted portfolio",
                PORTFOLIO_COLUMN
            )));
        }
        if !ids.insert(asset.id.as_str()) {
            return Err(Error::InvalidInput(format!("duplicate asset id '{}'", asset.id)));
        }
        check_ordering(asset)?;
    }

    let mut common: BTreeSet<NaiveDate> = head.observations.iter().map(|o| o.date).collect();
    let mut union = common.clone();
    for asset in rest {
        let dates: BTreeSet<NaiveDate> = asset.observations.iter().map(|o| o.date).collect();
        common.retain(|date| dates.contains(date));
        union.extend(dates);
    }

    if common.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "{} date(s) common to all {} assets, need at least 2",
            common.len(),
            assets.len()
        )));
    }

    let densest = assets
        .iter()
        .map(|asset| asset.observations.len())
        .max()
        .unwrap_or(0);
    let kept_ratio = common.len() as f64 / densest as f64;
    if kept_ratio < ALIGNMENT_WARN_RATIO {
        tracing::warn!(
            "Alignment kept {} of {} dates from the densest asset ({:.0}%)",
            common.len(),
            densest,
            kept_ratio * 100.0
        );
    }

    // Observations are strictly increasing, so filtering preserves axis order.
    let values: Vec<Vec<f64>> = assets
        .iter()
        .map(|asset| {
            asset
                .observations
                .iter()
                .filter(|o| common.contains(&o.date))
                .map(|o| o.price)
                .collect()
        })
        .collect();

    let dropped_dates = union.len() - common.len();
    let columns = assets.iter().map(|asset| asset.id.clone()).collect();
    let dates: Vec<NaiveDate> = common.into_iter().collect();

    tracing::debug!(
        "Aligned {} assets on {} dates ({} dropped)",
        assets.len(),
        dates.len(),
        dropped_dates
    );

    Ok(AlignedMatrix {
        frame: DateFrame::new(dates, columns, values),
        dropped_dates,
    })
}

fn check_ordering(asset: &AssetSeries) -> Result<()> {
    for pair in asset.observations.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(Error::InvalidInput(format!(
                "observations for '{}' are not strictly increasing at {}",
                asset.id, pair[1].date
            )));
        }
    }
    Ok(())
}
