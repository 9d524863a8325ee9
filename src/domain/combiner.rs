//! Consensus position from multiple indicators.
//!
//! Per-date vote: the sum of the indicators' positions, a value in [-N, +N].
//! At or above `min_to_long` the consensus goes long; at or below
//! `-min_to_short` it goes short; strictly between the thresholds it holds
//! the previous consensus, defaulting to flat before any threshold is
//! crossed. All inputs must share an identical date index; misalignment is
//! fatal, never silently reindexed.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::IndicatorOutput;
use crate::domain::position::{self, Position, PositionBound};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct ConsensusOutput {
    pub dates: Vec<NaiveDate>,
    pub votes: Vec<i32>,
    pub positions: Vec<Position>,
    pub buy_or_sell: Vec<i8>,
}

pub fn combine(
    outputs: &[IndicatorOutput],
    min_to_long: u32,
    min_to_short: u32,
    bound: PositionBound,
) -> Result<ConsensusOutput, SigtraderError> {
    if outputs.len() < 2 {
        return Err(SigtraderError::InvalidConfig {
            reason: format!(
                "consensus needs at least two indicators, got {}",
                outputs.len()
            ),
        });
    }
    if min_to_long == 0 || min_to_short == 0 {
        return Err(SigtraderError::InvalidConfig {
            reason: "vote thresholds must be at least 1".into(),
        });
    }

    let first = &outputs[0];
    for other in &outputs[1..] {
        if other.dates != first.dates {
            return Err(SigtraderError::MisalignedIndex {
                left: first.kind.to_string(),
                right: other.kind.to_string(),
            });
        }
    }

    let n = first.dates.len();
    let mut votes = vec![0i32; n];
    for output in outputs {
        for (vote, p) in votes.iter_mut().zip(&output.positions) {
            *vote += p.value() as i32;
        }
    }

    let raw: Vec<Option<Position>> = votes
        .iter()
        .map(|&v| {
            if v >= min_to_long as i32 {
                Some(Position::Long)
            } else if v <= -(min_to_short as i32) {
                Some(Position::Short)
            } else {
                None
            }
        })
        .collect();

    let positions = position::resolve_positions(&raw, bound);
    let buy_or_sell = position::buy_or_sell(&positions);

    Ok(ConsensusOutput {
        dates: first.dates.clone(),
        votes,
        positions,
        buy_or_sell,
    })
}
