//! SMA mean reversion.
//!
//! Signal = adjusted close minus its SMA. Above the upper band is overbought
//! (short); below the lower band is oversold (long); the position resets to
//! flat on the day the signed difference crosses zero, which takes precedence
//! over a same-day band breach. The band is either a constant offset or a
//! multiple of the rolling standard deviation.

use crate::domain::indicator::helpers::{rolling_std, sma};
use crate::domain::indicator::{Band, Signal};
use crate::domain::position::Position;
use crate::domain::price::PriceSeries;

pub(super) fn compute(
    prices: &PriceSeries,
    period: usize,
    band: Band,
) -> (Signal, Vec<Option<Position>>) {
    let sma_values = sma(&prices.adj_close, period);
    let diff: Vec<f64> = prices
        .adj_close
        .iter()
        .zip(&sma_values)
        .map(|(&p, &m)| p - m)
        .collect();

    let upper: Vec<f64> = match band {
        Band::Constant(c) => vec![c; diff.len()],
        Band::StdevMult(k) => rolling_std(&prices.adj_close, period)
            .into_iter()
            .map(|s| k * s)
            .collect(),
    };
    let lower: Vec<f64> = upper.iter().map(|&u| -u).collect();

    let mut raw: Vec<Option<Position>> = diff
        .iter()
        .zip(upper.iter().zip(&lower))
        .map(|(&d, (&u, &l))| {
            if d > u {
                Some(Position::Short)
            } else if d < l {
                Some(Position::Long)
            } else {
                None
            }
        })
        .collect();

    // Zero crossing of the diff flattens, overriding a band breach.
    for t in 1..diff.len() {
        if diff[t] * diff[t - 1] < 0.0 {
            raw[t] = Some(Position::Flat);
        }
    }

    (
        Signal::MeanReversion {
            sma: sma_values,
            diff,
            upper,
            lower,
        },
        raw,
    )
}
