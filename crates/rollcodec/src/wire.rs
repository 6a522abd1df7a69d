//! Piano-roll wire document: a JSON array of note objects.
//!
//! ```json
//! [{"value": 60, "time": 24, "length": 12, "velocity": 0.5}]
//! ```
//!
//! `time` and `length` are in editor ticks (12 per codec step), `velocity` is a
//! 0–1 fraction.

use crate::note::Note;
use crate::units;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireNote {
    pub value: i64,
    pub time: i64,
    pub length: i64,
    pub velocity: f64,
}

impl WireNote {
    pub fn from_note(note: &Note) -> Self {
        Self {
            value: note.value,
            time: units::steps_to_ticks(note.time),
            length: units::steps_to_ticks(note.length),
            velocity: units::codec_to_wire_velocity(note.velocity),
        }
    }

    pub fn to_note(&self) -> Note {
        Note::new(
            self.value,
            units::ticks_to_steps(self.time),
            units::ticks_to_steps(self.length),
            units::wire_to_codec_velocity(self.velocity),
        )
    }
}

/// Parse a wire document. Anything but an array of note objects is rejected.
pub fn parse_document(json: &str) -> Result<Vec<WireNote>> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| Error::WireFormat(e.to_string()))?;
    if !value.is_array() {
        return Err(Error::WireFormat(
            "document must be a list of note objects".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| Error::WireFormat(e.to_string()))
}

pub fn render_document(notes: &[WireNote]) -> Result<String> {
    serde_json::to_string_pretty(notes).map_err(|e| Error::WireFormat(e.to_string()))
}

/// Parse a wire document straight into codec-domain notes.
pub fn notes_from_document(json: &str) -> Result<Vec<Note>> {
    Ok(parse_document(json)?.iter().map(WireNote::to_note).collect())
}

/// Render codec-domain notes as a wire document.
pub fn notes_to_document(notes: &[Note]) -> Result<String> {
    let wire: Vec<WireNote> = notes.iter().map(WireNote::from_note).collect();
    render_document(&wire)
}
