//! RSI (relative strength index) with Wilder smoothing.
//!
//! Average gain/loss seed with a simple rolling mean over the first `period`
//! entries (the day-0 slot, which has no price change, counts as zero), then
//! follow the recursion `avg = (avg_prev * (period - 1) + current) / period`.
//! RSI = 100 - 100/(1 + avg_gain/avg_loss), saturating at exactly 100 when
//! avg_loss is zero instead of propagating an infinite ratio.
//!
//! Entries and exits are strict crossings of the configurable lower/upper
//! thresholds; an optional exit threshold flattens the position on any date
//! where (RSI - exit) changes sign between consecutive days.

use crate::domain::indicator::helpers::{crossed_above, crossed_below};
use crate::domain::indicator::{Cross, Signal};
use crate::domain::position::Position;
use crate::domain::price::PriceSeries;

#[allow(clippy::too_many_arguments)]
pub(super) fn compute(
    prices: &PriceSeries,
    period: usize,
    lower_threshold: f64,
    upper_threshold: f64,
    long_when: Cross,
    short_when: Cross,
    exit_threshold: Option<f64>,
) -> (Signal, Vec<Option<Position>>) {
    let rsi = compute_rsi(&prices.adj_close, period);

    let lower = vec![lower_threshold; rsi.len()];
    let upper = vec![upper_threshold; rsi.len()];

    let buy = match long_when {
        Cross::Above => crossed_above(&rsi, &lower),
        Cross::Below => crossed_below(&rsi, &lower),
    };
    let sell = match short_when {
        Cross::Above => crossed_above(&rsi, &upper),
        Cross::Below => crossed_below(&rsi, &upper),
    };

    let mut raw: Vec<Option<Position>> = buy
        .iter()
        .zip(&sell)
        .map(|(&b, &s)| {
            if s {
                Some(Position::Short)
            } else if b {
                Some(Position::Long)
            } else {
                None
            }
        })
        .collect();

    // Exit rule overrides entries on its dates.
    if let Some(exit) = exit_threshold {
        for t in 1..rsi.len() {
            if (rsi[t] - exit) * (rsi[t - 1] - exit) < 0.0 {
                raw[t] = Some(Position::Flat);
            }
        }
    }

    (Signal::Rsi { rsi }, raw)
}

/// Wilder-smoothed RSI; NaN for the first `period - 1` indices.
fn compute_rsi(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut rsi = vec![f64::NAN; n];
    if n < period || period == 0 {
        return rsi;
    }

    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for t in 1..n {
        let change = values[t] - values[t - 1];
        if change > 0.0 {
            gains[t] = change;
        } else {
            losses[t] = -change;
        }
    }

    // Seed: simple mean over the first `period` slots (slot 0 is zero).
    let mut avg_gain: f64 = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses[..period].iter().sum::<f64>() / period as f64;
    rsi[period - 1] = rsi_from_averages(avg_gain, avg_loss);

    for t in period..n {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[t]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[t]) / period as f64;
        rsi[t] = rsi_from_averages(avg_gain, avg_loss);
    }

    rsi
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
