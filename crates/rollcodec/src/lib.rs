//! Note ↔ token codecs for piano-roll sequence models.
//!
//! Two independent, mutually incompatible schemes live here:
//!
//! - [`delta`]: a typed-token stream over four contiguous vocabulary ranges
//!   (note value, length, time-shift, velocity). Time and velocity are only
//!   emitted when they change.
//! - [`grid`]: one token per note, `pitch * steps_per_bar + duration + 1`, with
//!   token `0` advancing a shared playhead by one grid step.
//!
//! Both codecs work in integer codec-domain units. The [`units`] module
//! converts to and from MIDI seconds/velocity and the piano-roll wire format,
//! and [`midi`] / [`midi_writer`] move notes in and out of Standard MIDI Files.
//!
//! # Example
//!
//! ```
//! use rollcodec::{delta, Note};
//!
//! let notes = vec![Note::new(60, 0, 4, 80), Note::new(64, 4, 4, 80)];
//! let tokens = delta::encode(&notes);
//! assert_eq!(delta::decode(&tokens), notes);
//! ```

pub mod delta;
pub mod grid;
pub mod midi;
pub mod midi_writer;
pub mod note;
pub mod pipeline;
pub mod units;
pub mod vocab;
pub mod wire;

pub use grid::{GridCodec, GridEvent};
pub use midi::{read_midi, read_midi_file};
pub use midi_writer::{write_midi, write_midi_file, MidiExportOptions};
pub use note::{MidiNote, Note};
pub use vocab::{DeltaEvent, VOCAB_SIZE};
pub use wire::WireNote;

/// A single codec token.
///
/// Signed so that model output containing negative noise can be classified
/// (and rejected or ignored) rather than failing to deserialize.
pub type Token = i64;

/// Errors from codec and boundary operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid grid token {0}: must be greater than 0")]
    InvalidToken(Token),

    #[error("invalid resolution {0}: steps per bar must be at least 1")]
    InvalidResolution(u32),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error("wire format error: {0}")]
    WireFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
