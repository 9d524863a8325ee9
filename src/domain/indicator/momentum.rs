//! Simple momentum baseline: the stance is the sign of the day's log return,
//! which the simulator's one-day execution lag turns into "ride yesterday's
//! direction".

use crate::domain::indicator::helpers::{log_returns, sign};
use crate::domain::indicator::Signal;
use crate::domain::position::Position;
use crate::domain::price::PriceSeries;

pub(super) fn compute(prices: &PriceSeries) -> (Signal, Vec<Option<Position>>) {
    let returns = log_returns(&prices.adj_close);

    let raw = returns
        .iter()
        .map(|&r| {
            let s = sign(r);
            if s.is_nan() {
                None
            } else {
                Some(Position::from_sign(s))
            }
        })
        .collect();

    (
        Signal::Momentum {
            log_returns: returns,
        },
        raw,
    )
}
