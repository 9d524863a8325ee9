//! Performance analytics over a cumulative-return or equity series.
//!
//! Drawdown is measured against the running watermark (peak). Episode
//! segmentation breaks the series at every date where drawdown returns to
//! exactly zero, i.e. a new all-time high; a series still underwater at the
//! end gets a synthetic closing breakpoint at the final date. Episodes are
//! recomputed on demand, never cached or mutated.

use crate::domain::error::SigtraderError;
use chrono::{Datelike, NaiveDate};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharpeMethod {
    Log,
    PctChange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownEpisode {
    /// Watermark date opening the episode.
    pub start: NaiveDate,
    /// Next watermark date, or the final date if still in drawdown.
    pub end: NaiveDate,
    pub days: i64,
    /// Peak-to-trough magnitude within the episode, in cumulative-return
    /// units.
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnualReturn {
    pub year: i32,
    pub return_pct: f64,
    pub above_mean: bool,
}

#[derive(Debug, Clone)]
pub struct Performance {
    dates: Vec<NaiveDate>,
    cumulative: Vec<f64>,
}

impl Performance {
    pub fn from_cumulative(
        dates: Vec<NaiveDate>,
        cumulative: Vec<f64>,
    ) -> Result<Self, SigtraderError> {
        if dates.len() != cumulative.len() {
            return Err(SigtraderError::MisalignedIndex {
                left: "cumulative returns".into(),
                right: "dates".into(),
            });
        }
        if dates.is_empty() {
            return Err(SigtraderError::Data {
                reason: "cannot analyze an empty series".into(),
            });
        }
        Ok(Performance { dates, cumulative })
    }

    /// Build from daily log returns; an undefined (NaN) day-0 return counts
    /// as zero, so the cumulative series starts at 1.0.
    pub fn from_log_returns(
        dates: Vec<NaiveDate>,
        log_returns: &[f64],
    ) -> Result<Self, SigtraderError> {
        let mut sum = 0.0;
        let cumulative = log_returns
            .iter()
            .map(|&r| {
                if !r.is_nan() {
                    sum += r;
                }
                sum.exp()
            })
            .collect();
        Self::from_cumulative(dates, cumulative)
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Per-date drawdown: watermark minus current value, always >= 0.
    pub fn drawdown(&self) -> Vec<f64> {
        let mut watermark = f64::MIN;
        self.cumulative
            .iter()
            .map(|&v| {
                watermark = watermark.max(v);
                watermark - v
            })
            .collect()
    }

    pub fn max_drawdown(&self) -> f64 {
        self.drawdown().into_iter().fold(0.0, f64::max)
    }

    /// Segment the series at zero-drawdown dates and return the `n` episodes
    /// with largest magnitude and, separately, the `n` with longest
    /// duration. Zero-magnitude gaps between consecutive watermark dates are
    /// not episodes.
    pub fn drawdown_episodes(&self, n: usize) -> (Vec<DrawdownEpisode>, Vec<DrawdownEpisode>) {
        let drawdown = self.drawdown();
        let last = self.cumulative.len() - 1;

        let mut breakpoints: Vec<usize> =
            (0..=last).filter(|&i| drawdown[i] == 0.0).collect();
        // Still underwater at the end: close the open episode at the final
        // date.
        if drawdown[last] > 0.0 {
            breakpoints.push(last);
        }

        let mut episodes = Vec::new();
        for pair in breakpoints.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let magnitude = drawdown[start..=end].iter().fold(0.0, |a: f64, &b| a.max(b));
            if magnitude == 0.0 {
                continue;
            }
            episodes.push(DrawdownEpisode {
                start: self.dates[start],
                end: self.dates[end],
                days: (self.dates[end] - self.dates[start]).num_days(),
                max_drawdown: magnitude,
            });
        }

        let mut by_magnitude = episodes.clone();
        by_magnitude.sort_by(|a, b| {
            b.max_drawdown
                .partial_cmp(&a.max_drawdown)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        by_magnitude.truncate(n);

        let mut by_duration = episodes;
        by_duration.sort_by(|a, b| b.days.cmp(&a.days));
        by_duration.truncate(n);

        (by_magnitude, by_duration)
    }

    /// Annualized Sharpe ratio of the daily returns implied by the
    /// cumulative series. Returns 0.0 for a zero-variance series.
    pub fn sharpe_ratio(&self, method: SharpeMethod) -> f64 {
        let returns: Vec<f64> = self
            .cumulative
            .windows(2)
            .map(|w| match method {
                SharpeMethod::Log => (w[1] / w[0]).ln(),
                SharpeMethod::PctChange => w[1] / w[0] - 1.0,
            })
            .collect();
        if returns.len() < 2 {
            return 0.0;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let stdev = variance.sqrt();
        if stdev > 0.0 {
            TRADING_DAYS_PER_YEAR.sqrt() * mean / stdev
        } else {
            0.0
        }
    }

    /// Compound annual growth rate on a calendar-day (365) basis.
    pub fn cagr(&self) -> f64 {
        let days = (*self.dates.last().unwrap_or(&self.dates[0]) - self.dates[0]).num_days();
        if days <= 0 {
            return 0.0;
        }
        let start = self.cumulative[0];
        let end = self.cumulative[self.cumulative.len() - 1];
        if start <= 0.0 {
            return 0.0;
        }
        (end / start).powf(365.0 / days as f64) - 1.0
    }

    /// Per-calendar-year compounded return (percent), each flagged as above
    /// or below the across-years mean.
    pub fn annual_returns(&self) -> Vec<AnnualReturn> {
        let mut spans: Vec<(i32, usize, usize)> = Vec::new();
        for (i, date) in self.dates.iter().enumerate() {
            match spans.last_mut() {
                Some((year, _, end)) if *year == date.year() => *end = i,
                _ => spans.push((date.year(), i, i)),
            }
        }

        let returns: Vec<(i32, f64)> = spans
            .into_iter()
            .map(|(year, first, last)| {
                (
                    year,
                    (self.cumulative[last] / self.cumulative[first] - 1.0) * 100.0,
                )
            })
            .collect();

        let mean = returns.iter().map(|(_, r)| r).sum::<f64>() / returns.len() as f64;
        returns
            .into_iter()
            .map(|(year, return_pct)| AnnualReturn {
                year,
                return_pct,
                above_mean: return_pct > mean,
            })
            .collect()
    }
}
