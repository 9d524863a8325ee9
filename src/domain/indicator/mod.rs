//! Technical indicator family.
//!
//! Each strategy is a variant of [`IndicatorKind`]; [`IndicatorKind::run`]
//! executes the same three-phase pipeline for every variant: compute the
//! internal signal series, threshold it into raw per-date stances, then
//! resolve those stances with the shared forward-fill/default-flat/clamp
//! rules and derive the buy/sell transition flags. The variants only differ
//! in phases one and two.

pub mod helpers;
pub mod lag;
pub mod ma_crossover;
pub mod macd;
pub mod mean_reversion;
pub mod momentum;
pub mod rsi;

use crate::domain::error::SigtraderError;
use crate::domain::position::{self, Position, PositionBound};
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;
use std::fmt;

/// Which side of a threshold a crossing must come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Above,
    Below,
}

/// Mean-reversion band: a fixed offset around the SMA, or a multiple of the
/// rolling standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    Constant(f64),
    StdevMult(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorKind {
    MaCrossover {
        short_period: usize,
        long_period: usize,
    },
    Macd {
        short_period: usize,
        long_period: usize,
        signal_period: usize,
    },
    Rsi {
        period: usize,
        lower_threshold: f64,
        upper_threshold: f64,
        long_when: Cross,
        short_when: Cross,
        exit_threshold: Option<f64>,
    },
    MeanReversion {
        period: usize,
        band: Band,
    },
    Lag {
        lag_days: usize,
    },
    Momentum,
}

impl IndicatorKind {
    pub fn ma_crossover_default() -> Self {
        IndicatorKind::MaCrossover {
            short_period: 20,
            long_period: 60,
        }
    }

    pub fn macd_default() -> Self {
        IndicatorKind::Macd {
            short_period: 12,
            long_period: 26,
            signal_period: 9,
        }
    }

    pub fn rsi_default() -> Self {
        IndicatorKind::Rsi {
            period: 14,
            lower_threshold: 30.0,
            upper_threshold: 70.0,
            long_when: Cross::Above,
            short_when: Cross::Below,
            exit_threshold: None,
        }
    }

    pub fn mean_reversion_default() -> Self {
        IndicatorKind::MeanReversion {
            period: 41,
            band: Band::Constant(4.0),
        }
    }

    /// Run the three-phase pipeline against a gap-free price series. The
    /// caller's series is only read; the output owns its own columns.
    pub fn run(
        &self,
        prices: &PriceSeries,
        bound: PositionBound,
    ) -> Result<IndicatorOutput, SigtraderError> {
        self.validate()?;

        let (signal, raw) = match *self {
            IndicatorKind::MaCrossover {
                short_period,
                long_period,
            } => ma_crossover::compute(prices, short_period, long_period),
            IndicatorKind::Macd {
                short_period,
                long_period,
                signal_period,
            } => macd::compute(prices, short_period, long_period, signal_period),
            IndicatorKind::Rsi {
                period,
                lower_threshold,
                upper_threshold,
                long_when,
                short_when,
                exit_threshold,
            } => rsi::compute(
                prices,
                period,
                lower_threshold,
                upper_threshold,
                long_when,
                short_when,
                exit_threshold,
            ),
            IndicatorKind::MeanReversion { period, band } => {
                mean_reversion::compute(prices, period, band)
            }
            IndicatorKind::Lag { lag_days } => lag::compute(prices, lag_days),
            IndicatorKind::Momentum => momentum::compute(prices),
        };

        let positions = position::resolve_positions(&raw, bound);
        let buy_or_sell = position::buy_or_sell(&positions);

        Ok(IndicatorOutput {
            kind: self.clone(),
            dates: prices.dates.clone(),
            signal,
            positions,
            buy_or_sell,
        })
    }

    fn validate(&self) -> Result<(), SigtraderError> {
        let bad = |reason: String| Err(SigtraderError::InvalidConfig { reason });
        match *self {
            IndicatorKind::MaCrossover {
                short_period,
                long_period,
            } if short_period == 0 || long_period == 0 => {
                bad(format!("{self}: periods must be positive"))
            }
            IndicatorKind::Macd {
                short_period,
                long_period,
                signal_period,
            } if short_period == 0 || long_period == 0 || signal_period == 0 => {
                bad(format!("{self}: periods must be positive"))
            }
            IndicatorKind::Rsi { period, .. } if period == 0 => {
                bad(format!("{self}: period must be positive"))
            }
            IndicatorKind::MeanReversion { period, .. } if period == 0 => {
                bad(format!("{self}: period must be positive"))
            }
            IndicatorKind::Lag { lag_days } if lag_days == 0 => {
                bad(format!("{self}: lag_days must be positive"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::MaCrossover {
                short_period,
                long_period,
            } => write!(f, "MA_CROSSOVER({},{})", short_period, long_period),
            IndicatorKind::Macd {
                short_period,
                long_period,
                signal_period,
            } => write!(f, "MACD({},{},{})", short_period, long_period, signal_period),
            IndicatorKind::Rsi {
                period,
                lower_threshold,
                upper_threshold,
                ..
            } => write!(f, "RSI({},{},{})", period, lower_threshold, upper_threshold),
            IndicatorKind::MeanReversion { period, band } => match band {
                Band::Constant(c) => write!(f, "SMA_MEAN_REVERSION({},{})", period, c),
                Band::StdevMult(k) => write!(f, "SMA_MEAN_REVERSION({},{}sd)", period, k),
            },
            IndicatorKind::Lag { lag_days } => write!(f, "LAG({})", lag_days),
            IndicatorKind::Momentum => write!(f, "MOMENTUM"),
        }
    }
}

/// Variant-specific internal signal columns, aligned to the price dates.
#[derive(Debug, Clone)]
pub enum Signal {
    MaCrossover {
        sma_short: Vec<f64>,
        sma_long: Vec<f64>,
    },
    Macd {
        macd: Vec<f64>,
        signal_line: Vec<f64>,
    },
    Rsi {
        rsi: Vec<f64>,
    },
    MeanReversion {
        sma: Vec<f64>,
        diff: Vec<f64>,
        upper: Vec<f64>,
        lower: Vec<f64>,
    },
    Lag {
        log_returns: Vec<f64>,
        prediction_return: Vec<f64>,
        prediction_sign: Vec<f64>,
    },
    Momentum {
        log_returns: Vec<f64>,
    },
}

/// A fully resolved indicator run: the signal columns plus the gap-free
/// position sequence and its buy/sell transitions.
#[derive(Debug, Clone)]
pub struct IndicatorOutput {
    pub kind: IndicatorKind,
    pub dates: Vec<NaiveDate>,
    pub signal: Signal,
    pub positions: Vec<Position>,
    pub buy_or_sell: Vec<i8>,
}
