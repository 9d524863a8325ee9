//! MACD (moving average convergence divergence).
//!
//! MACD line = EMA(short) - EMA(long) of adjusted close; signal line =
//! EMA(MACD, signal_period). Positions change only on crossing events: the
//! MACD line crossing above the signal line goes long, crossing below goes
//! short. Between crossings the position holds, and before the first crossing
//! it is flat.

use crate::domain::indicator::helpers::{crossed_above, crossed_below, ewm_mean};
use crate::domain::indicator::Signal;
use crate::domain::position::Position;
use crate::domain::price::PriceSeries;

pub(super) fn compute(
    prices: &PriceSeries,
    short_period: usize,
    long_period: usize,
    signal_period: usize,
) -> (Signal, Vec<Option<Position>>) {
    let ema_short = ewm_mean(&prices.adj_close, short_period);
    let ema_long = ewm_mean(&prices.adj_close, long_period);

    let macd: Vec<f64> = ema_short
        .iter()
        .zip(&ema_long)
        .map(|(&s, &l)| s - l)
        .collect();
    let signal_line = ewm_mean(&macd, signal_period);

    let buy = crossed_above(&macd, &signal_line);
    let sell = crossed_below(&macd, &signal_line);

    let raw = buy
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

    (Signal::Macd { macd, signal_line }, raw)
}
