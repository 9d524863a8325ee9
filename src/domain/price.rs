//! OHLCV price history for a single symbol.
//!
//! `PriceBar` is the row form used by data adapters; `PriceSeries` is the
//! columnar, date-indexed form the indicators consume. Missing values are
//! forward-filled then back-filled before any indicator runs, so downstream
//! code never observes a gap. The adjustment ratio (`adj_close / close`) is
//! applied uniformly to open/high/low when adjusted fields are required.

use crate::domain::error::SigtraderError;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub adj_close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl PriceSeries {
    /// Build a columnar series from bars. Dates must be strictly increasing.
    pub fn from_bars(bars: &[PriceBar]) -> Result<Self, SigtraderError> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SigtraderError::Data {
                    reason: format!(
                        "price dates not strictly increasing: {} then {}",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }

        let symbol = bars.first().map(|b| b.symbol.clone()).unwrap_or_default();

        Ok(PriceSeries {
            symbol,
            dates: bars.iter().map(|b| b.date).collect(),
            open: bars.iter().map(|b| b.open).collect(),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
            adj_close: bars.iter().map(|b| b.adj_close).collect(),
            volume: bars.iter().map(|b| b.volume).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Resolve missing (NaN) values: forward-fill, then back-fill whatever
    /// leading gaps remain. After this no column contains NaN unless it was
    /// NaN for every date.
    pub fn fill_gaps(&mut self) {
        for column in [
            &mut self.open,
            &mut self.high,
            &mut self.low,
            &mut self.close,
            &mut self.adj_close,
            &mut self.volume,
        ] {
            forward_fill(column);
            back_fill(column);
        }
    }

    /// Per-date adjustment ratio `adj_close / close`. Falls back to 1.0 when
    /// close is zero or missing.
    pub fn adj_ratio(&self) -> Vec<f64> {
        self.close
            .iter()
            .zip(&self.adj_close)
            .map(|(&c, &a)| if c > 0.0 { a / c } else { 1.0 })
            .collect()
    }

    pub fn adj_open(&self) -> Vec<f64> {
        apply_ratio(&self.open, &self.adj_ratio())
    }

    pub fn adj_high(&self) -> Vec<f64> {
        apply_ratio(&self.high, &self.adj_ratio())
    }

    pub fn adj_low(&self) -> Vec<f64> {
        apply_ratio(&self.low, &self.adj_ratio())
    }
}

fn apply_ratio(values: &[f64], ratio: &[f64]) -> Vec<f64> {
    values.iter().zip(ratio).map(|(&v, &r)| v * r).collect()
}

/// Replace each NaN with the last preceding finite value, if any.
pub fn forward_fill(values: &mut [f64]) {
    let mut last = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = last;
        } else {
            last = *v;
        }
    }
}

/// Replace each NaN with the next following finite value, if any.
pub fn back_fill(values: &mut [f64]) {
    let mut next = f64::NAN;
    for v in values.iter_mut().rev() {
        if v.is_nan() {
            *v = next;
        } else {
            next = *v;
        }
    }
}
