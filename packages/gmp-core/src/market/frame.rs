//! Date-indexed column storage.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// A set of equally long `f64` columns sharing one ascending date axis.
///
/// Values are stored column-major: `values[c][t]` is column `c` on `dates[t]`.
/// The date→row lookup is built once when the frame is constructed.
#[derive(Debug, Clone, Serialize)]
pub struct DateFrame {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
    #[serde(skip)]
    index: HashMap<NaiveDate, usize>,
}

impl DateFrame {
    /// Build a frame. Every column must have one value per date.
    pub(crate) fn new(dates: Vec<NaiveDate>, columns: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        debug_assert!(values.iter().all(|column| column.len() == dates.len()));
        debug_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));

        let index = dates
            .iter()
            .enumerate()
            .map(|(row, date)| (*date, row))
            .collect();

        Self {
            dates,
            columns,
            values,
            index,
        }
    }

    /// Ordered date axis.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column identifiers in storage order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Values of a column by identifier.
    pub fn column(&self, id: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == id)
            .map(|c| self.values[c].as_slice())
    }

    /// Row position of a date on the axis.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.index.get(&date).copied()
    }

    /// Value of a column on an exact date.
    pub fn get(&self, date: NaiveDate, id: &str) -> Option<f64> {
        let row = self.position(date)?;
        self.column(id).map(|values| values[row])
    }

    /// All `(column, value)` pairs for one date.
    pub fn row(&self, date: NaiveDate) -> Option<Vec<(&str, f64)>> {
        let row = self.position(date)?;
        Some(
            self.columns
                .iter()
                .zip(&self.values)
                .map(|(id, values)| (id.as_str(), values[row]))
                .collect(),
        )
    }

    /// Iterate over `(column, values)` pairs in storage order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(id, values)| (id.as_str(), values.as_slice()))
    }

    /// First and last date on the axis.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn sample() -> DateFrame {
        DateFrame::new(
            vec![day(1), day(2), day(3)],
            vec!["A".to_string(), "B".to_string()],
            vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]],
        )
    }

    #[test]
    fn test_lookup_by_date_and_column() {
        let frame = sample();

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.position(day(2)), Some(1));
        assert_eq!(frame.get(day(3), "B"), Some(30.0));
        assert_eq!(frame.get(day(4), "B"), None);
        assert_eq!(frame.get(day(1), "C"), None);
        assert_eq!(frame.column("A"), Some(&[1.0, 2.0, 3.0][..]));
    }

    #[test]
    fn test_row_and_span() {
        let frame = sample();

        assert_eq!(frame.row(day(2)), Some(vec![("A", 2.0), ("B", 20.0)]));
        assert_eq!(frame.span(), Some((day(1), day(3))));

        let ids: Vec<&str> = frame.iter_columns().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_serializes_without_index() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["columns"], serde_json::json!(["A", "B"]));
        assert_eq!(json["dates"][0], "2024-05-01");
        assert!(json.get("index").is_none());
    }
}
