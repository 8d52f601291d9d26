//! Dated rate and FX observations used as calibration input.
//!
//! Rates are quoted in percent (`7.5` means 7.5%), matching the central-bank
//! key-rate sources such tables are assembled from. Assembling the table
//! (scraping, file I/O) is an upstream concern; this module only validates
//! and serves the in-memory result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::EngineError;

/// Dated observations of a single market quantity.
///
/// Dates are strictly increasing and values finite; both are checked once at
/// construction so downstream consumers can assume a clean series.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl RateSeries {
    /// Builds a series from parallel date and value vectors.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, EngineError> {
        if dates.is_empty() {
            return Err(EngineError::InvalidInput(
                "series must not be empty".to_string(),
            ));
        }
        if dates.len() != values.len() {
            return Err(EngineError::InvalidInput(format!(
                "{} dates vs {} values",
                dates.len(),
                values.len()
            )));
        }
        if dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(EngineError::InvalidInput(
                "dates must be strictly increasing".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::InvalidInput(
                "observations must be finite".to_string(),
            ));
        }
        Ok(Self { dates, values })
    }

    /// Number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: construction rejects empty series.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observation dates, ascending.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed values in date order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Most recent observation.
    #[inline]
    pub fn latest(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
}

/// One observation row of the joint history table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    /// Observation date.
    pub date: NaiveDate,
    /// Domestic key rate, in percent.
    pub domestic: f64,
    /// Foreign key rate, in percent.
    pub foreign: f64,
    /// FX spot, domestic currency units per unit of foreign.
    pub fx: f64,
}

/// Joint `(date, domestic, foreign, fx)` history, stored column-wise.
///
/// Rows are sorted by date at construction, so callers may supply them in
/// any order; duplicate dates are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RateHistory {
    dates: Vec<NaiveDate>,
    domestic: Vec<f64>,
    foreign: Vec<f64>,
    fx: Vec<f64>,
}

impl RateHistory {
    /// Builds the history table from observation rows.
    pub fn from_rows(mut rows: Vec<HistoryRow>) -> Result<Self, EngineError> {
        if rows.is_empty() {
            return Err(EngineError::InvalidInput(
                "history must not be empty".to_string(),
            ));
        }
        rows.sort_by_key(|row| row.date);
        if rows.windows(2).any(|w| w[1].date == w[0].date) {
            return Err(EngineError::InvalidInput(
                "history dates must be unique".to_string(),
            ));
        }
        if rows
            .iter()
            .any(|r| !(r.domestic.is_finite() && r.foreign.is_finite() && r.fx.is_finite()))
        {
            return Err(EngineError::InvalidInput(
                "history values must be finite".to_string(),
            ));
        }

        let mut dates = Vec::with_capacity(rows.len());
        let mut domestic = Vec::with_capacity(rows.len());
        let mut foreign = Vec::with_capacity(rows.len());
        let mut fx = Vec::with_capacity(rows.len());
        for row in rows {
            dates.push(row.date);
            domestic.push(row.domestic);
            foreign.push(row.foreign);
            fx.push(row.fx);
        }

        Ok(Self {
            dates,
            domestic,
            foreign,
            fx,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always `false`: construction rejects empty tables.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Observation dates, ascending.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Domestic rate column, in percent.
    #[inline]
    pub fn domestic(&self) -> &[f64] {
        &self.domestic
    }

    /// Foreign rate column, in percent.
    #[inline]
    pub fn foreign(&self) -> &[f64] {
        &self.foreign
    }

    /// FX spot column.
    #[inline]
    pub fn fx(&self) -> &[f64] {
        &self.fx
    }

    /// The domestic column as a standalone series.
    pub fn domestic_series(&self) -> RateSeries {
        RateSeries {
            dates: self.dates.clone(),
            values: self.domestic.clone(),
        }
    }

    /// The foreign column as a standalone series.
    pub fn foreign_series(&self) -> RateSeries {
        RateSeries {
            dates: self.dates.clone(),
            values: self.foreign.clone(),
        }
    }

    /// The most recent row, which simulation uses as its start point.
    pub fn latest(&self) -> HistoryRow {
        let last = self.dates.len() - 1;
        HistoryRow {
            date: self.dates[last],
            domestic: self.domestic[last],
            foreign: self.foreign[last],
            fx: self.fx[last],
        }
    }
}
