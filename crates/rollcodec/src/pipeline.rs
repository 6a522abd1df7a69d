//! End-to-end conversions across the MIDI and wire boundaries.
//!
//! Unit conversion happens exactly once here, on the way in and on the way
//! out; the codecs in between only see codec-domain values.

use crate::grid::GridCodec;
use crate::midi::read_midi;
use crate::midi_writer::{write_midi, MidiExportOptions};
use crate::note::{MidiNote, Note};
use crate::{delta, units, wire, Result, Token};

/// MIDI notes → codec-domain notes, sorted by onset.
///
/// Lengths shorter than one step are raised to one step.
pub fn notes_from_midi(notes: &[MidiNote]) -> Vec<Note> {
    let mut converted: Vec<Note> = notes
        .iter()
        .map(|n| {
            Note::new(
                i64::from(n.pitch),
                units::seconds_to_steps(n.start),
                units::seconds_to_steps(n.duration()).max(1),
                units::midi_to_codec_velocity(n.velocity),
            )
        })
        .collect();
    converted.sort_by_key(|n| n.time);
    converted
}

/// Codec-domain notes → MIDI notes. Pitches saturate to 0–127.
pub fn notes_to_midi(notes: &[Note]) -> Vec<MidiNote> {
    notes
        .iter()
        .map(|n| {
            let start = units::steps_to_seconds(n.time);
            MidiNote::new(
                n.value.clamp(0, 127) as u8,
                start,
                units::steps_to_seconds(n.end()),
                units::codec_to_midi_velocity(n.velocity),
            )
        })
        .collect()
}

pub fn encode_midi_delta(bytes: &[u8]) -> Result<Vec<Token>> {
    let notes = notes_from_midi(&read_midi(bytes)?);
    Ok(delta::encode(&notes))
}

/// Decode delta tokens straight to MIDI file bytes.
///
/// Notes decoded before any velocity token carry velocity 0. A note-on with
/// velocity 0 is a note-off in MIDI, so those notes are silent and do not
/// read back as notes.
pub fn decode_delta_to_midi(tokens: &[Token], options: &MidiExportOptions) -> Vec<u8> {
    write_midi(&notes_to_midi(&delta::decode(tokens)), options)
}

pub fn encode_wire_delta(json: &str) -> Result<Vec<Token>> {
    Ok(delta::encode(&wire::notes_from_document(json)?))
}

pub fn decode_delta_to_wire(tokens: &[Token]) -> Result<String> {
    wire::notes_to_document(&delta::decode(tokens))
}

impl GridCodec {
    pub fn encode_midi(&self, bytes: &[u8]) -> Result<Vec<Token>> {
        Ok(self.encode(&read_midi(bytes)?))
    }

    pub fn decode_to_midi(&self, tokens: &[Token], options: &MidiExportOptions) -> Result<Vec<u8>> {
        Ok(write_midi(&self.decode(tokens)?, options))
    }

    /// Encode a wire document on the grid.
    ///
    /// Wire notes go through codec-domain steps and then MIDI seconds, so the
    /// grid sees the same timing it would from the equivalent MIDI file.
    pub fn encode_wire(&self, json: &str) -> Result<Vec<Token>> {
        let notes = wire::notes_from_document(json)?;
        Ok(self.encode(&notes_to_midi(&notes)))
    }

    /// Decode grid tokens into a wire document.
    pub fn decode_to_wire(&self, tokens: &[Token]) -> Result<String> {
        let notes = notes_from_midi(&self.decode(tokens)?);
        wire::notes_to_document(&notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn midi_notes_quantize_to_sixteenth_steps() {
        let notes = notes_from_midi(&[
            MidiNote::new(64, 0.5, 0.75, 64),
            MidiNote::new(60, 0.0, 0.01, 127),
        ]);
        assert_eq!(
            notes,
            vec![Note::new(60, 0, 1, 99), Note::new(64, 8, 4, 50)]
        );
    }

    #[test]
    fn codec_notes_expand_to_seconds() {
        let midi = notes_to_midi(&[Note::new(60, 8, 4, 50)]);
        assert_eq!(midi, vec![MidiNote::new(60, 0.5, 0.75, 64)]);
    }

    #[test]
    fn delta_midi_round_trip() {
        let notes = vec![
            MidiNote::new(60, 0.0, 0.25, 64),
            MidiNote::new(64, 0.25, 0.5, 64),
            MidiNote::new(67, 0.5, 1.0, 96),
        ];
        let bytes = write_midi(&notes, &MidiExportOptions::default());
        let tokens = encode_midi_delta(&bytes).unwrap();
        let back = read_midi(&decode_delta_to_midi(&tokens, &MidiExportOptions::default())).unwrap();
        assert_eq!(back, notes);
    }

    #[test]
    fn zero_length_delta_note_stays_short_in_midi() {
        use crate::vocab::{LENGTH_BASE, TIME_SHIFT_BASE, VELOCITY_BASE};

        let tokens = vec![
            VELOCITY_BASE + 80,
            60,
            LENGTH_BASE,
            64,
            LENGTH_BASE + 8,
            TIME_SHIFT_BASE + 32,
            67,
            LENGTH_BASE + 4,
        ];
        let notes = read_midi(&decode_delta_to_midi(&tokens, &MidiExportOptions::default())).unwrap();

        let short = notes.iter().find(|n| n.pitch == 60).unwrap();
        assert_eq!(short.start, 0.0);
        assert!(short.end < 0.01);
        assert_eq!(notes.len(), 3);
    }

    #[test]
    fn unset_length_note_stays_short_in_midi() {
        let midi = notes_to_midi(&[Note::new(60, 4, Note::UNSET_LENGTH, 50)]);
        let bytes = write_midi(&midi, &MidiExportOptions::default());
        let back = read_midi(&bytes).unwrap();
        assert_eq!(back.len(), 1);
        assert!(back[0].duration() < 0.01);
    }

    #[test]
    fn notes_without_velocity_are_silent_in_midi() {
        use crate::vocab::LENGTH_BASE;

        let tokens = vec![60, LENGTH_BASE + 4];
        assert_eq!(delta::decode(&tokens)[0].velocity, 0);
        let bytes = decode_delta_to_midi(&tokens, &MidiExportOptions::default());
        assert!(read_midi(&bytes).unwrap().is_empty());
    }

    #[test]
    fn delta_wire_round_trip() {
        let json = r#"[
            {"value": 60, "time": 0, "length": 48, "velocity": 0.8},
            {"value": 67, "time": 48, "length": 96, "velocity": 0.6}
        ]"#;
        let tokens = encode_wire_delta(json).unwrap();
        let out = decode_delta_to_wire(&tokens).unwrap();
        assert_eq!(
            wire::parse_document(&out).unwrap(),
            wire::parse_document(json).unwrap()
        );
    }

    #[test]
    fn grid_midi_round_trip_keeps_monophonic_line() {
        let codec = GridCodec::new(8).unwrap();
        let notes = vec![
            MidiNote::new(60, 0.0, 0.25, 100),
            MidiNote::new(62, 0.5, 1.0, 100),
        ];
        let bytes = write_midi(&notes, &MidiExportOptions::default());
        let tokens = codec.encode_midi(&bytes).unwrap();
        let out = codec
            .decode_to_midi(&tokens, &MidiExportOptions::default())
            .unwrap();
        assert_eq!(read_midi(&out).unwrap(), notes);
    }

    #[test]
    fn grid_wire_encoding_uses_step_timing() {
        let codec = GridCodec::new(8).unwrap();
        // 4 codec steps = 0.25 s = one grid step at 8 steps per bar
        let json = r#"[{"value": 60, "time": 48, "length": 48, "velocity": 0.5}]"#;
        let tokens = codec.encode_wire(json).unwrap();
        assert_eq!(tokens, vec![0, codec.encode_token(60, 0)]);
    }
}
