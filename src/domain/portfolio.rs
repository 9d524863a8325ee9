//! Portfolio simulation: apply a resolved position sequence to a capital
//! base with transaction fees.
//!
//! Two accounting modes. Return-based compounds daily log returns, with the
//! position decided on date t applied to date t+1's return (one-day fill
//! lag), and subtracts the running commission before rebasing the net
//! cumulative return so day 0 is exactly 1.0. Share-based keeps an explicit
//! share count and cash ledger. Both are strict left-to-right passes: a day
//! only reads the previous day's state and is never revised.

use crate::domain::error::SigtraderError;
use crate::domain::position::Position;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct EquitySeries {
    pub dates: Vec<NaiveDate>,
    /// Daily log return of the underlying (0.0 on day 0).
    pub log_returns: Vec<f64>,
    /// Passive cumulative return (buy and hold), 1.0 on day 0.
    pub cum_returns: Vec<f64>,
    pub strategy_log_returns: Vec<f64>,
    /// Strategy cumulative return gross of fees.
    pub strategy_cum_returns: Vec<f64>,
    /// Running total of commission paid, in currency units.
    pub commission: Vec<f64>,
    /// Strategy value in currency units, net of commission.
    pub capital: Vec<f64>,
    /// Net cumulative return, rebased so day 0 is exactly 1.0.
    pub net_cum_returns: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct HoldingsSeries {
    pub dates: Vec<NaiveDate>,
    pub shares: Vec<f64>,
    pub cash: Vec<f64>,
    /// Cash plus market value of shares held.
    pub holdings: Vec<f64>,
    /// Holdings net of the running fee.
    pub net_holdings: Vec<f64>,
    /// Net holdings normalized by day-0 holdings.
    pub net_cum_returns: Vec<f64>,
}

/// Return-based simulation over adjusted close prices.
pub fn simulate_returns(
    dates: &[NaiveDate],
    prices: &[f64],
    positions: &[Position],
    buy_or_sell: &[i8],
    capital: f64,
    transaction_fee: f64,
) -> Result<EquitySeries, SigtraderError> {
    check_inputs(dates, prices, positions, buy_or_sell, capital, transaction_fee)?;
    let n = dates.len();

    let mut log_returns = vec![0.0; n];
    for t in 1..n {
        log_returns[t] = (prices[t] / prices[t - 1]).ln();
    }

    let cum_returns = cumulative_from_log(&log_returns);

    let mut strategy_log_returns = vec![0.0; n];
    for t in 1..n {
        strategy_log_returns[t] = positions[t - 1].value() as f64 * log_returns[t];
    }
    let strategy_cum_returns = cumulative_from_log(&strategy_log_returns);

    let mut commission = vec![0.0; n];
    let mut fees = 0.0;
    for t in 0..n {
        fees += buy_or_sell[t].unsigned_abs() as f64 * transaction_fee;
        commission[t] = fees;
    }

    let mut capital_curve: Vec<f64> = strategy_cum_returns
        .iter()
        .zip(&commission)
        .map(|(&cum, &fee)| cum * capital - fee)
        .collect();
    capital_curve[0] = capital;

    let net_cum_returns = capital_curve.iter().map(|&c| c / capital).collect();

    Ok(EquitySeries {
        dates: dates.to_vec(),
        log_returns,
        cum_returns,
        strategy_log_returns,
        strategy_cum_returns,
        commission,
        capital: capital_curve,
        net_cum_returns,
    })
}

/// Share-based simulation: hold `num_shares * position` shares, settle the
/// difference through cash each day.
pub fn simulate_shares(
    dates: &[NaiveDate],
    prices: &[f64],
    positions: &[Position],
    buy_or_sell: &[i8],
    capital: f64,
    transaction_fee: f64,
    num_shares: f64,
) -> Result<HoldingsSeries, SigtraderError> {
    check_inputs(dates, prices, positions, buy_or_sell, capital, transaction_fee)?;
    if num_shares <= 0.0 {
        return Err(SigtraderError::InvalidConfig {
            reason: "num_shares must be positive".into(),
        });
    }
    let n = dates.len();

    let shares: Vec<f64> = positions
        .iter()
        .map(|p| num_shares * p.value() as f64)
        .collect();

    let mut cash = vec![0.0; n];
    let mut holdings = vec![0.0; n];
    let mut net_holdings = vec![0.0; n];
    let mut spent = 0.0;
    let mut fees = 0.0;
    for t in 0..n {
        let prev_shares = if t == 0 { 0.0 } else { shares[t - 1] };
        spent += (shares[t] - prev_shares) * prices[t];
        fees += buy_or_sell[t].unsigned_abs() as f64 * transaction_fee;
        cash[t] = capital - spent;
        holdings[t] = cash[t] + shares[t] * prices[t];
        net_holdings[t] = holdings[t] - fees;
    }

    let base = holdings[0];
    let net_cum_returns = net_holdings.iter().map(|&h| h / base).collect();

    Ok(HoldingsSeries {
        dates: dates.to_vec(),
        shares,
        cash,
        holdings,
        net_holdings,
        net_cum_returns,
    })
}

fn check_inputs(
    dates: &[NaiveDate],
    prices: &[f64],
    positions: &[Position],
    buy_or_sell: &[i8],
    capital: f64,
    transaction_fee: f64,
) -> Result<(), SigtraderError> {
    if prices.len() != dates.len() {
        return Err(SigtraderError::MisalignedIndex {
            left: "prices".into(),
            right: "dates".into(),
        });
    }
    if positions.len() != dates.len() || buy_or_sell.len() != dates.len() {
        return Err(SigtraderError::MisalignedIndex {
            left: "positions".into(),
            right: "dates".into(),
        });
    }
    if dates.is_empty() {
        return Err(SigtraderError::Data {
            reason: "cannot simulate an empty series".into(),
        });
    }
    if capital <= 0.0 {
        return Err(SigtraderError::InvalidConfig {
            reason: "capital must be positive".into(),
        });
    }
    if transaction_fee < 0.0 {
        return Err(SigtraderError::InvalidConfig {
            reason: "transaction_fee cannot be negative".into(),
        });
    }
    Ok(())
}

/// exp of the running sum of log returns; index 0 is 1.0 when the first
/// entry is 0.
fn cumulative_from_log(log_returns: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(log_returns.len());
    let mut sum = 0.0;
    for &r in log_returns {
        sum += r;
        out.push(sum.exp());
    }
    out
}
