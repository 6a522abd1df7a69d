use serde::{Deserialize, Serialize};

/// A note in codec-domain units: integer steps and a 0–99 velocity level.
///
/// This is what both codecs consume and produce. Conversion to and from
/// seconds or wire ticks happens in [`crate::units`], never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// Pitch (MIDI key number).
    pub value: i64,
    /// Onset in steps.
    pub time: i64,
    /// Duration in steps, or [`Note::UNSET_LENGTH`].
    pub length: i64,
    pub velocity: i64,
}

impl Note {
    /// Sentinel length for a note whose duration is not known yet.
    pub const UNSET_LENGTH: i64 = -1;

    pub fn new(value: i64, time: i64, length: i64, velocity: i64) -> Self {
        Self {
            value,
            time,
            length,
            velocity,
        }
    }

    pub fn has_length(&self) -> bool {
        self.length != Self::UNSET_LENGTH
    }

    /// First step after the note ends.
    pub fn end(&self) -> i64 {
        self.time + self.length.max(0)
    }
}

/// A note as a MIDI library sees it: seconds and 0–127 velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MidiNote {
    pub pitch: u8,
    /// Onset in seconds.
    pub start: f64,
    /// Release in seconds.
    pub end: f64,
    pub velocity: u8,
}

impl MidiNote {
    pub fn new(pitch: u8, start: f64, end: f64, velocity: u8) -> Self {
        Self {
            pitch,
            start,
            end,
            velocity,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Stable sort by onset; notes sharing a start keep their input order.
pub(crate) fn sort_midi_notes(notes: &mut [MidiNote]) {
    notes.sort_by(|a, b| a.start.total_cmp(&b.start));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_length_is_detected() {
        let n = Note::new(60, 0, Note::UNSET_LENGTH, 50);
        assert!(!n.has_length());
        assert_eq!(n.end(), 0);
        assert!(Note::new(60, 0, 1, 50).has_length());
    }

    #[test]
    fn sort_is_stable_for_shared_onsets() {
        let mut notes = vec![
            MidiNote::new(67, 1.0, 2.0, 90),
            MidiNote::new(60, 0.0, 1.0, 90),
            MidiNote::new(64, 0.0, 1.0, 90),
        ];
        sort_midi_notes(&mut notes);
        let pitches: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 64, 67]);
    }
}
