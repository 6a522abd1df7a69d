//! Quantized-grid codec.
//!
//! Each note at the playhead becomes one token,
//! `pitch * steps_per_bar + duration_within_bar + 1`. Token `0` advances the
//! playhead one grid step. The resolution is not stored in the stream: the
//! same [`GridCodec`] (or one built with the same `steps_per_bar`) must be used
//! on both sides.
//!
//! Encode and decode are asymmetric. Encoding emits at most one
//! note per playhead position and drops anything that starts behind the
//! playhead, so the stream is monophonic per step. Decoding never advances the
//! playhead on a note token, so consecutive note tokens stack into a chord.

use crate::note::{sort_midi_notes, MidiNote};
use crate::{Error, Result, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed tempo the grid is laid over.
pub const BEATS_PER_MINUTE: f64 = 120.0;
pub const BEATS_PER_BAR: f64 = 4.0;

/// Reserved token that advances the playhead.
pub const FILLER: Token = 0;

/// Velocity given to every decoded note; the grid does not carry dynamics.
pub const DECODED_VELOCITY: u8 = 100;

const PITCH_COUNT: i64 = 128;

/// A decoded note token: pitch and duration in grid steps minus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridEvent {
    pub pitch: i64,
    pub duration: i64,
}

/// Grid codec bound to one tokenization resolution.
///
/// Serializes as its `steps_per_bar`; deserializing goes through
/// [`GridCodec::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GridCodec {
    steps_per_bar: u32,
    seconds_per_step: f64,
}

impl GridCodec {
    pub fn new(steps_per_bar: u32) -> Result<Self> {
        if steps_per_bar == 0 {
            return Err(Error::InvalidResolution(steps_per_bar));
        }
        let seconds_per_bar = BEATS_PER_BAR / (BEATS_PER_MINUTE / 60.0);
        Ok(Self {
            steps_per_bar,
            seconds_per_step: seconds_per_bar / steps_per_bar as f64,
        })
    }

    pub fn steps_per_bar(&self) -> u32 {
        self.steps_per_bar
    }

    pub fn seconds_per_step(&self) -> f64 {
        self.seconds_per_step
    }

    /// Number of distinct tokens: the filler plus every (pitch, duration) pair.
    pub fn vocab_size(&self) -> Token {
        PITCH_COUNT * self.steps_per_bar as Token + 1
    }

    fn playhead(&self, step: u64) -> f64 {
        step as f64 * self.seconds_per_step
    }

    /// Build the token for a pitch held for `duration + 1` steps.
    ///
    /// `duration` saturates at the last step of the bar.
    pub fn encode_token(&self, pitch: u8, duration: u32) -> Token {
        let duration = duration.min(self.steps_per_bar - 1);
        pitch as Token * self.steps_per_bar as Token + duration as Token + 1
    }

    /// Split a note token into pitch and duration.
    ///
    /// Tokens at or below zero are not note tokens and are rejected.
    pub fn decode_token(&self, token: Token) -> Result<GridEvent> {
        if token <= 0 {
            return Err(Error::InvalidToken(token));
        }
        let body = token - 1;
        let steps = self.steps_per_bar as Token;
        Ok(GridEvent {
            pitch: body / steps,
            duration: body % steps,
        })
    }

    /// Encode notes (in seconds) to grid tokens.
    ///
    /// Notes are taken in start order. A note is dropped when its times are
    /// not finite, it starts behind the playhead, has no duration, or lands on
    /// a step that already carries a note. Encoding stops once the playhead
    /// passes the end of the last-starting note.
    pub fn encode(&self, notes: &[MidiNote]) -> Vec<Token> {
        let input_len = notes.len();
        let mut notes: Vec<MidiNote> = notes
            .iter()
            .filter(|n| n.start.is_finite() && n.end.is_finite())
            .copied()
            .collect();
        sort_midi_notes(&mut notes);

        let Some(last_end) = notes.last().map(|n| n.end) else {
            return Vec::new();
        };

        let mut tokens = Vec::new();
        let mut step: u64 = 0;
        let mut index = 0;
        let mut dropped = input_len - notes.len();
        // Step that already holds a note token; later notes on it are dropped.
        let mut occupied: Option<u64> = None;

        while index < notes.len() {
            let note = &notes[index];
            let head = self.playhead(step);

            if note.start < head {
                dropped += 1;
                index += 1;
                continue;
            }

            let span = note.duration() / self.seconds_per_step;
            if span <= 0.0 {
                dropped += 1;
                index += 1;
                continue;
            }

            if note.start == head {
                index += 1;
                if occupied == Some(step) {
                    dropped += 1;
                    continue;
                }
                let steps = if span > self.steps_per_bar as f64 {
                    self.steps_per_bar
                } else {
                    span.ceil() as u32
                };
                tokens.push(self.encode_token(note.pitch, steps - 1));
                occupied = Some(step);
            } else {
                if head > last_end {
                    break;
                }
                tokens.push(FILLER);
                step += 1;
            }
        }

        debug!(
            steps_per_bar = self.steps_per_bar,
            notes = input_len,
            tokens = tokens.len(),
            dropped,
            "grid encode"
        );
        tokens
    }

    /// Decode grid tokens to notes (in seconds) at [`DECODED_VELOCITY`].
    ///
    /// Pitches above 127 saturate to 127. A negative token is an error.
    pub fn decode(&self, tokens: &[Token]) -> Result<Vec<MidiNote>> {
        let mut step: u64 = 0;
        let mut notes = Vec::new();

        for &token in tokens {
            if token == FILLER {
                step += 1;
                continue;
            }

            let event = self.decode_token(token)?;
            let pitch = if event.pitch >= PITCH_COUNT {
                warn!(token, pitch = event.pitch, "grid pitch out of MIDI range, saturating");
                (PITCH_COUNT - 1) as u8
            } else {
                event.pitch as u8
            };

            let start = self.playhead(step);
            let end = start + (event.duration + 1) as f64 * self.seconds_per_step;
            notes.push(MidiNote::new(pitch, start, end, DECODED_VELOCITY));
        }

        debug!(
            steps_per_bar = self.steps_per_bar,
            tokens = tokens.len(),
            notes = notes.len(),
            "grid decode"
        );
        Ok(notes)
    }
}

impl TryFrom<u32> for GridCodec {
    type Error = Error;

    fn try_from(steps_per_bar: u32) -> Result<Self> {
        Self::new(steps_per_bar)
    }
}

impl From<GridCodec> for u32 {
    fn from(codec: GridCodec) -> u32 {
        codec.steps_per_bar
    }
}
