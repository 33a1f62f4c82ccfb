//! Core data types for the portfolio analytics engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single closing price observed on a given date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceObservation {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price on that date
    pub price: f64,
}

impl PriceObservation {
    /// Create a new observation.
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Price history of one asset together with its target allocation.
///
/// Observations must be strictly increasing by date. The weight is a
/// fractional target allocation; weights across a set of assets are not
/// required to sum to one and are never renormalized by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetSeries {
    /// Asset identifier (e.g. "Global Equities")
    pub id: String,
    /// Exchange ticker the prices were taken from, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Target allocation as a fraction (0.55 for 55%)
    pub weight: f64,
    /// Ordered price observations
    #[serde(default)]
    pub observations: Vec<PriceObservation>,
}

impl AssetSeries {
    /// Create an asset with no observations yet.
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            ticker: None,
            weight,
            observations: Vec::new(),
        }
    }

    /// Attach the ticker the prices were sourced from.
    pub fn with_ticker(mut self, ticker: &str) -> Self {
        self.ticker = Some(ticker.to_uppercase());
        self
    }

    /// Append `(date, price)` pairs in the order given.
    pub fn with_observations<I>(mut self, observations: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        self.observations.extend(
            observations
                .into_iter()
                .map(|(date, price)| PriceObservation::new(date, price)),
        );
        self
    }

    /// Append a single observation.
    pub fn push(&mut self, date: NaiveDate, price: f64) {
        self.observations.push(PriceObservation::new(date, price));
    }

    /// Earliest observation, if any.
    pub fn first(&self) -> Option<&PriceObservation> {
        self.observations.first()
    }

    /// Latest observation, if any.
    pub fn latest(&self) -> Option<&PriceObservation> {
        self.observations.last()
    }
}

/// A price snapshot handed over by a data-acquisition collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PriceSnapshot {
    /// Every tracked asset with its history
    pub assets: Vec<AssetSeries>,
}

/// API response wrapper used for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
