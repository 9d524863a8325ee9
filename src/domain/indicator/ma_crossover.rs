//! Moving-average crossover.
//!
//! Short and long SMAs of adjusted close; long when the short average is
//! above the long average, short otherwise. Always fully invested, by
//! contrast with the other indicators there is no flat state.

use crate::domain::indicator::helpers::sma;
use crate::domain::indicator::Signal;
use crate::domain::position::Position;
use crate::domain::price::PriceSeries;

pub(super) fn compute(
    prices: &PriceSeries,
    short_period: usize,
    long_period: usize,
) -> (Signal, Vec<Option<Position>>) {
    let sma_short = sma(&prices.adj_close, short_period);
    let sma_long = sma(&prices.adj_close, long_period);

    let raw = sma_short
        .iter()
        .zip(&sma_long)
        .map(|(&s, &l)| {
            if s > l {
                Some(Position::Long)
            } else {
                Some(Position::Short)
            }
        })
        .collect();

    (
        Signal::MaCrossover {
            sma_short,
            sma_long,
        },
        raw,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::testutil::series;
    use crate::domain::indicator::IndicatorKind;
    use crate::domain::position::PositionBound;
    use approx::assert_relative_eq;

    #[test]
    fn five_day_reference_sequence() {
        // Short SMA overtakes the long SMA on day 2.
        let prices = series(&[100.0, 102.0, 101.0, 105.0, 103.0]);
        let kind = IndicatorKind::MaCrossover {
            short_period: 2,
            long_period: 3,
        };
        let out = kind.run(&prices, PositionBound::LongShort).unwrap();

        let expected = [
            Position::Short,
            Position::Short,
            Position::Long,
            Position::Long,
            Position::Long,
        ];
        assert_eq!(out.positions, expected);
        assert_eq!(out.buy_or_sell, vec![0, 0, 1, 0, 0]);
    }

    #[test]
    fn equal_averages_mean_short() {
        // Day 0: both SMAs equal the first price, so not short > long.
        let prices = series(&[100.0, 100.0, 100.0]);
        let kind = IndicatorKind::MaCrossover {
            short_period: 2,
            long_period: 3,
        };
        let out = kind.run(&prices, PositionBound::LongShort).unwrap();
        assert!(out.positions.iter().all(|&p| p == Position::Short));
    }

    #[test]
    fn always_invested_in_long_short_mode() {
        let prices = series(&[100.0, 102.0, 99.0, 104.0, 98.0, 105.0, 103.0]);
        let out = IndicatorKind::MaCrossover {
            short_period: 2,
            long_period: 4,
        }
        .run(&prices, PositionBound::LongShort)
        .unwrap();
        assert!(out.positions.iter().all(|&p| p != Position::Flat));
    }

    #[test]
    fn long_only_clamps_short_legs_to_flat() {
        let prices = series(&[105.0, 103.0, 101.0, 99.0, 97.0]);
        let out = IndicatorKind::MaCrossover {
            short_period: 2,
            long_period: 3,
        }
        .run(&prices, PositionBound::LongOnly)
        .unwrap();
        assert!(out
            .positions
            .iter()
            .all(|&p| p == Position::Flat || p == Position::Long));
    }

    #[test]
    fn signal_columns_match_sma() {
        let prices = series(&[100.0, 102.0, 101.0]);
        let out = IndicatorKind::MaCrossover {
            short_period: 2,
            long_period: 3,
        }
        .run(&prices, PositionBound::LongShort)
        .unwrap();

        let Signal::MaCrossover {
            sma_short,
            sma_long,
        } = &out.signal
        else {
            panic!("wrong signal variant");
        };
        assert_relative_eq!(sma_short[2], (102.0 + 101.0) / 2.0);
        assert_relative_eq!(sma_long[2], (100.0 + 102.0 + 101.0) / 3.0);
    }
}
