//! Delta-event codec.
//!
//! Each note becomes `[time-shift?] [velocity?] value length`. Time-shift and
//! velocity tokens are only emitted when the running value changes, so runs of
//! notes at the same onset and velocity cost two tokens each.
//!
//! Lossy edges:
//! - a gap of more than 63 steps is emitted as a single shift of 63; shifts
//!   are never chained, so the excess is lost.
//! - decode ignores tokens outside the vocabulary.

use crate::note::Note;
use crate::vocab::DeltaEvent;
use crate::Token;
use tracing::debug;

/// Encode notes into delta-event tokens.
///
/// Notes are processed in ascending `time` order; ties keep input order.
pub fn encode(notes: &[Note]) -> Vec<Token> {
    encode_events(notes)
        .into_iter()
        .map(DeltaEvent::to_token)
        .collect()
}

/// Encode notes into typed events, before flattening to tokens.
pub fn encode_events(notes: &[Note]) -> Vec<DeltaEvent> {
    let mut sorted = notes.to_vec();
    sorted.sort_by_key(|n| n.time);

    let mut prev_time = 0;
    let mut prev_velocity = 0;
    let mut events = Vec::with_capacity(sorted.len() * 2);
    let mut truncated_gaps = 0usize;

    for note in &sorted {
        if note.time != prev_time {
            let delta = note.time - prev_time;
            let event = DeltaEvent::time_shift(delta);
            if i64::from(event.local_value()) < delta {
                truncated_gaps += 1;
            }
            events.push(event);
            prev_time = note.time;
        }
        if note.velocity != prev_velocity {
            events.push(DeltaEvent::velocity(note.velocity));
            prev_velocity = note.velocity;
        }
        events.push(DeltaEvent::note_value(note.value));
        events.push(DeltaEvent::length(note.length));
    }

    debug!(
        notes = sorted.len(),
        events = events.len(),
        truncated_gaps,
        "delta encode"
    );
    events
}

/// Pairing state for the decoder: a note is emitted once both halves arrive.
#[derive(Debug, Default)]
struct PendingNote {
    value: Option<u8>,
    length: Option<u8>,
}

impl PendingNote {
    /// Take the completed pair, clearing both halves.
    fn take_ready(&mut self) -> Option<(u8, u8)> {
        match (self.value, self.length) {
            (Some(value), Some(length)) => {
                self.value = None;
                self.length = None;
                Some((value, length))
            }
            _ => None,
        }
    }
}

/// Decode delta-event tokens into notes.
///
/// Unrecognized tokens are skipped. A value or length with no partner by the
/// end of the stream produces nothing.
pub fn decode(tokens: &[Token]) -> Vec<Note> {
    let mut time: i64 = 0;
    let mut velocity: i64 = 0;
    let mut pending = PendingNote::default();
    let mut notes = Vec::new();
    let mut ignored = 0usize;

    for &token in tokens {
        match DeltaEvent::from_token(token) {
            Some(DeltaEvent::TimeShift(shift)) => time += i64::from(shift),
            Some(DeltaEvent::Velocity(level)) => velocity = i64::from(level),
            Some(DeltaEvent::NoteValue(value)) => pending.value = Some(value),
            Some(DeltaEvent::Length(length)) => pending.length = Some(length),
            None => ignored += 1,
        }

        if let Some((value, length)) = pending.take_ready() {
            notes.push(Note::new(
                i64::from(value),
                time,
                i64::from(length),
                velocity,
            ));
        }
    }

    debug!(tokens = tokens.len(), notes = notes.len(), ignored, "delta decode");
    notes
}
