//! Delta-event vocabulary: four contiguous token ranges.
//!
//! | Category   | Base | Size |
//! |------------|------|------|
//! | note value |    0 |  128 |
//! | length     |  128 |   64 |
//! | time-shift |  192 |   64 |
//! | velocity   |  256 |  100 |
//!
//! Local values above a range maximum saturate to that maximum; negative
//! local values saturate to zero.

use crate::Token;

pub const RANGE_NOTES: i64 = 128;
pub const RANGE_LENGTH: i64 = 64;
pub const RANGE_TIME_SHIFT: i64 = 64;
pub const RANGE_VELOCITY: i64 = 100;

pub const NOTE_BASE: Token = 0;
pub const LENGTH_BASE: Token = NOTE_BASE + RANGE_NOTES;
pub const TIME_SHIFT_BASE: Token = LENGTH_BASE + RANGE_LENGTH;
pub const VELOCITY_BASE: Token = TIME_SHIFT_BASE + RANGE_TIME_SHIFT;

/// Total number of delta-event tokens.
pub const VOCAB_SIZE: Token = VELOCITY_BASE + RANGE_VELOCITY;

const NOTE_LAST: Token = LENGTH_BASE - 1;
const LENGTH_LAST: Token = TIME_SHIFT_BASE - 1;
const TIME_SHIFT_LAST: Token = VELOCITY_BASE - 1;
const VELOCITY_LAST: Token = VOCAB_SIZE - 1;

/// One delta-event token, decoded into its category and local value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaEvent {
    NoteValue(u8),
    Length(u8),
    TimeShift(u8),
    Velocity(u8),
}

fn saturate(value: i64, range: i64) -> u8 {
    value.clamp(0, range - 1) as u8
}

impl DeltaEvent {
    pub fn note_value(pitch: i64) -> Self {
        Self::NoteValue(saturate(pitch, RANGE_NOTES))
    }

    pub fn length(steps: i64) -> Self {
        Self::Length(saturate(steps, RANGE_LENGTH))
    }

    pub fn time_shift(steps: i64) -> Self {
        Self::TimeShift(saturate(steps, RANGE_TIME_SHIFT))
    }

    pub fn velocity(level: i64) -> Self {
        Self::Velocity(saturate(level, RANGE_VELOCITY))
    }

    pub fn to_token(self) -> Token {
        match self {
            Self::NoteValue(v) => NOTE_BASE + v as Token,
            Self::Length(v) => LENGTH_BASE + v as Token,
            Self::TimeShift(v) => TIME_SHIFT_BASE + v as Token,
            Self::Velocity(v) => VELOCITY_BASE + v as Token,
        }
    }

    /// Classify a token. Returns `None` for anything outside the vocabulary.
    pub fn from_token(token: Token) -> Option<Self> {
        match token {
            NOTE_BASE..=NOTE_LAST => Some(Self::NoteValue((token - NOTE_BASE) as u8)),
            LENGTH_BASE..=LENGTH_LAST => Some(Self::Length((token - LENGTH_BASE) as u8)),
            TIME_SHIFT_BASE..=TIME_SHIFT_LAST => {
                Some(Self::TimeShift((token - TIME_SHIFT_BASE) as u8))
            }
            VELOCITY_BASE..=VELOCITY_LAST => Some(Self::Velocity((token - VELOCITY_BASE) as u8)),
            _ => None,
        }
    }

    /// Local value within the category's range.
    pub fn local_value(self) -> u8 {
        match self {
            Self::NoteValue(v) | Self::Length(v) | Self::TimeShift(v) | Self::Velocity(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_contiguous() {
        assert_eq!(LENGTH_BASE, 128);
        assert_eq!(TIME_SHIFT_BASE, 192);
        assert_eq!(VELOCITY_BASE, 256);
        assert_eq!(VOCAB_SIZE, 356);
    }

    #[test]
    fn range_boundaries_classify_correctly() {
        assert_eq!(DeltaEvent::from_token(0), Some(DeltaEvent::NoteValue(0)));
        assert_eq!(DeltaEvent::from_token(127), Some(DeltaEvent::NoteValue(127)));
        assert_eq!(DeltaEvent::from_token(128), Some(DeltaEvent::Length(0)));
        assert_eq!(DeltaEvent::from_token(191), Some(DeltaEvent::Length(63)));
        assert_eq!(DeltaEvent::from_token(192), Some(DeltaEvent::TimeShift(0)));
        assert_eq!(DeltaEvent::from_token(255), Some(DeltaEvent::TimeShift(63)));
        assert_eq!(DeltaEvent::from_token(256), Some(DeltaEvent::Velocity(0)));
        assert_eq!(DeltaEvent::from_token(355), Some(DeltaEvent::Velocity(99)));
        assert_eq!(DeltaEvent::from_token(356), None);
        assert_eq!(DeltaEvent::from_token(-1), None);
    }

    #[test]
    fn constructors_saturate() {
        assert_eq!(DeltaEvent::note_value(200), DeltaEvent::NoteValue(127));
        assert_eq!(DeltaEvent::length(64), DeltaEvent::Length(63));
        assert_eq!(DeltaEvent::time_shift(100), DeltaEvent::TimeShift(63));
        assert_eq!(DeltaEvent::velocity(100), DeltaEvent::Velocity(99));
        assert_eq!(DeltaEvent::length(-1), DeltaEvent::Length(0));
    }

    #[test]
    fn to_token_inverts_from_token() {
        for token in 0..VOCAB_SIZE {
            let event = DeltaEvent::from_token(token).unwrap();
            assert_eq!(event.to_token(), token);
        }
    }
}
