//! Discrete trading positions and the shared resolution rules.
//!
//! Every indicator produces raw per-date signals in {-1, 0, +1, undefined}.
//! The undefined entries mean "no signal yet": they hold the previous
//! position (forward-fill) and default to flat before any signal exists.
//! Resolution and the buy/sell first difference are hoisted here so each
//! indicator variant applies identical rules.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Short,
    Flat,
    Long,
}

impl Position {
    pub fn value(self) -> i8 {
        match self {
            Position::Short => -1,
            Position::Flat => 0,
            Position::Long => 1,
        }
    }

    /// Sign of a raw signal value. NaN has no sign and maps to flat; callers
    /// that need "undefined" semantics check for NaN before calling.
    pub fn from_sign(value: f64) -> Position {
        if value > 0.0 {
            Position::Long
        } else if value < 0.0 {
            Position::Short
        } else {
            Position::Flat
        }
    }
}

/// Which positions an indicator is allowed to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionBound {
    LongOnly,
    ShortOnly,
    LongShort,
}

impl PositionBound {
    pub fn clamp(self, position: Position) -> Position {
        match (self, position) {
            (PositionBound::LongOnly, Position::Short) => Position::Flat,
            (PositionBound::ShortOnly, Position::Long) => Position::Flat,
            _ => position,
        }
    }
}

/// Resolve raw signals into a gap-free position sequence: forward-fill
/// undefined entries, default leading undefined entries to flat, then clamp
/// to the configured bound.
pub fn resolve_positions(raw: &[Option<Position>], bound: PositionBound) -> Vec<Position> {
    let mut held = Position::Flat;
    raw.iter()
        .map(|entry| {
            if let Some(p) = entry {
                held = *p;
            }
            bound.clamp(held)
        })
        .collect()
}

/// Day-over-day position change, clipped to [-1, +1]. A jump from short to
/// long still registers as a single-unit transition flag. The first entry is
/// 0 (no prior position to diff against).
pub fn buy_or_sell(positions: &[Position]) -> Vec<i8> {
    let mut out = Vec::with_capacity(positions.len());
    for (i, p) in positions.iter().enumerate() {
        if i == 0 {
            out.push(0);
        } else {
            let diff = p.value() - positions[i - 1].value();
            out.push(diff.clamp(-1, 1));
        }
    }
    out
}
