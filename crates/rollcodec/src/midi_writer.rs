use crate::grid::BEATS_PER_MINUTE;
use crate::note::MidiNote;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for MIDI export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiExportOptions {
    /// Ticks per quarter note. Default: 480.
    pub ppq: u16,
    /// GM program for the note track. Default: 0 (piano).
    pub program: u8,
    /// MIDI channel, 0–15. Default: 0.
    pub channel: u8,
    /// Track name meta event. Default: "rollcodec".
    pub track_name: String,
}

impl Default for MidiExportOptions {
    fn default() -> Self {
        Self {
            ppq: 480,
            program: 0,
            channel: 0,
            track_name: "rollcodec".to_string(),
        }
    }
}

/// Write notes to Standard MIDI File format 1 bytes.
///
/// Track 0: a single 120 BPM tempo event.
/// Track 1: track name, program change, note events.
pub fn write_midi(notes: &[MidiNote], options: &MidiExportOptions) -> Vec<u8> {
    let tracks = vec![build_tempo_track(), build_note_track(notes, options)];
    build_midi_file(options.ppq, &tracks)
}

pub fn write_midi_file(path: &Path, notes: &[MidiNote], options: &MidiExportOptions) -> Result<()> {
    std::fs::write(path, write_midi(notes, options))?;
    Ok(())
}

fn microseconds_per_beat() -> u32 {
    (60_000_000.0 / BEATS_PER_MINUTE) as u32
}

fn seconds_to_ticks(seconds: f64, ppq: u16) -> u64 {
    let beats = seconds.max(0.0) * BEATS_PER_MINUTE / 60.0;
    (beats * f64::from(ppq)).round() as u64
}

fn build_tempo_track() -> Vec<u8> {
    let usec = microseconds_per_beat();
    let mut track_data = Vec::new();

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[
        0xFF,
        0x51,
        0x03,
        (usec >> 16) as u8,
        (usec >> 8) as u8,
        usec as u8,
    ]);

    // 4/4
    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x58, 0x04, 4, 2, 0x18, 0x08]);

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

    track_data
}

fn build_note_track(notes: &[MidiNote], options: &MidiExportOptions) -> Vec<u8> {
    let channel = options.channel.min(15);
    let mut events: Vec<(u64, Vec<u8>)> = Vec::new();

    let name_bytes = options.track_name.as_bytes();
    let mut name_event = vec![0xFF, 0x03];
    write_vlq(&mut name_event, name_bytes.len() as u32);
    name_event.extend_from_slice(name_bytes);
    events.push((0, name_event));

    events.push((0, vec![0xC0 | channel, options.program.min(127)]));

    for note in notes {
        let pitch = note.pitch.min(127);
        let onset = seconds_to_ticks(note.start, options.ppq);
        // Zero-length notes still get a closing note-off one tick later.
        let offset = seconds_to_ticks(note.end, options.ppq).max(onset + 1);
        events.push((onset, vec![0x90 | channel, pitch, note.velocity.min(127)]));
        events.push((offset, vec![0x80 | channel, pitch, 0]));
    }

    // Note-offs before note-ons at the same tick, so repeated pitches retrigger.
    events.sort_by(|a, b| {
        a.0.cmp(&b.0).then_with(|| {
            let a_is_off = a.1.first().is_some_and(|status| status & 0xF0 == 0x80);
            let b_is_off = b.1.first().is_some_and(|status| status & 0xF0 == 0x80);
            b_is_off.cmp(&a_is_off)
        })
    });

    let mut track_data = Vec::new();
    let mut last_tick = 0u64;

    for (tick, data) in events {
        write_delta(&mut track_data, tick.saturating_sub(last_tick));
        track_data.extend_from_slice(&data);
        last_tick = tick;
    }

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

    track_data
}

fn build_midi_file(ppq: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(b"MThd");
    buf.extend_from_slice(&6u32.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes()); // format 1
    buf.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    buf.extend_from_slice(&ppq.to_be_bytes());

    for track_data in tracks {
        buf.extend_from_slice(b"MTrk");
        buf.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
        buf.extend_from_slice(track_data);
    }

    buf
}

/// Largest value a four-byte variable-length quantity can hold.
const MAX_VLQ: u32 = 0x0FFF_FFFF;

/// Write an event delta, padding with empty text events when it does not fit
/// in one variable-length quantity.
fn write_delta(buf: &mut Vec<u8>, mut delta: u64) {
    while delta > u64::from(MAX_VLQ) {
        write_vlq(buf, MAX_VLQ);
        buf.extend_from_slice(&[0xFF, 0x01, 0x00]);
        delta -= u64::from(MAX_VLQ);
    }
    write_vlq(buf, delta as u32);
}

/// Write a variable-length quantity.
fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    let mut bytes = vec![(value & 0x7F) as u8];
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    buf.extend_from_slice(&bytes);
}
