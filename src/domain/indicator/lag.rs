//! Lagged-regression momentum.
//!
//! Builds lagged log-return regressors (lags 1..N) and fits two independent
//! no-intercept OLS regressions over the fully defined rows: next-day log
//! return, and the sign of the next-day log return, each against the lagged
//! regressors. The predicted sign, shifted back one day so only returns up to
//! date t inform the stance held on date t, becomes the raw position.

use crate::domain::indicator::helpers::{log_returns, ols_no_intercept, sign};
use crate::domain::indicator::Signal;
use crate::domain::position::Position;
use crate::domain::price::PriceSeries;

pub(super) fn compute(prices: &PriceSeries, lag_days: usize) -> (Signal, Vec<Option<Position>>) {
    let returns = log_returns(&prices.adj_close);
    let n = returns.len();

    let mut prediction_return = vec![f64::NAN; n];
    let mut prediction_sign = vec![f64::NAN; n];

    // Row t regresses returns[t] on returns[t-1] .. returns[t-lag_days];
    // returns[0] is undefined, so the first usable row is lag_days + 1.
    let start = lag_days + 1;
    if start < n {
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(lag_days);
        for lag in 1..=lag_days {
            columns.push((start..n).map(|t| returns[t - lag]).collect());
        }
        let y: Vec<f64> = returns[start..].to_vec();
        let y_sign: Vec<f64> = y.iter().map(|&r| sign(r)).collect();

        if let (Some(beta_return), Some(beta_sign)) = (
            ols_no_intercept(&columns, &y),
            ols_no_intercept(&columns, &y_sign),
        ) {
            for t in start..n {
                let mut pred_ret = 0.0;
                let mut pred_sig = 0.0;
                for lag in 1..=lag_days {
                    pred_ret += beta_return[lag - 1] * returns[t - lag];
                    pred_sig += beta_sign[lag - 1] * returns[t - lag];
                }
                prediction_return[t] = pred_ret;
                prediction_sign[t] = sign(pred_sig);
            }
        }
    }

    // Hold on date t the sign predicted for date t + 1.
    let raw: Vec<Option<Position>> = (0..n)
        .map(|t| {
            let pred = if t + 1 < n {
                prediction_sign[t + 1]
            } else {
                f64::NAN
            };
            if pred.is_nan() {
                None
            } else {
                Some(Position::from_sign(pred))
            }
        })
        .collect();

    (
        Signal::Lag {
            log_returns: returns,
            prediction_return,
            prediction_sign,
        },
        raw,
    )
}
