use crate::note::{sort_midi_notes, MidiNote};
use crate::{Error, Result};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Tempo assumed until the file says otherwise: 120 BPM.
pub const DEFAULT_MICROSECONDS_PER_BEAT: u32 = 500_000;

/// Ticks per beat assumed for SMPTE-timed files.
pub const TIMECODE_FALLBACK_PPQ: u16 = 480;

/// Tick → seconds conversion built from a file's tempo changes.
#[derive(Debug, Clone)]
pub struct TempoMap {
    timing: Timing,
    /// `(tick, microseconds_per_beat)`, sorted by tick.
    changes: Vec<(u64, u32)>,
}

impl TempoMap {
    pub fn new(timing: Timing, mut changes: Vec<(u64, u32)>) -> Self {
        changes.sort_by_key(|(tick, _)| *tick);
        Self { timing, changes }
    }

    pub fn seconds_at(&self, tick: u64) -> f64 {
        let ppq = match self.timing {
            Timing::Metrical(ticks) if ticks.as_int() > 0 => f64::from(ticks.as_int()),
            Timing::Metrical(_) | Timing::Timecode(_, _) => f64::from(TIMECODE_FALLBACK_PPQ),
        };

        let mut seconds = 0.0;
        let mut last_tick = 0u64;
        let mut usec_per_beat = DEFAULT_MICROSECONDS_PER_BEAT;

        for &(change_tick, usec) in &self.changes {
            if change_tick >= tick {
                break;
            }
            seconds += ticks_to_seconds(change_tick - last_tick, ppq, usec_per_beat);
            last_tick = change_tick;
            usec_per_beat = usec;
        }

        seconds + ticks_to_seconds(tick - last_tick, ppq, usec_per_beat)
    }
}

fn ticks_to_seconds(ticks: u64, ppq: f64, usec_per_beat: u32) -> f64 {
    ticks as f64 / ppq * (f64::from(usec_per_beat) / 1_000_000.0)
}

/// A note-on/note-off pair still in tick units.
struct TickNote {
    onset: u64,
    offset: u64,
    pitch: u8,
    velocity: u8,
}

/// Read every note from every track of a Standard MIDI File.
///
/// Note-ons are paired with the next note-off (or zero-velocity note-on) for
/// the same channel and key; stacked notes on one key close last-in first-out.
/// Notes still sounding at the end of a track close on its final tick.
pub fn read_midi(bytes: &[u8]) -> Result<Vec<MidiNote>> {
    let smf = Smf::parse(bytes).map_err(|e| Error::MidiParse(e.to_string()))?;

    let mut tick_notes = Vec::new();
    let mut tempo_changes = Vec::new();

    for track in &smf.tracks {
        let mut current_tick: u64 = 0;
        // (channel, key) → stack of (onset_tick, velocity)
        let mut pending: HashMap<(u8, u8), Vec<(u64, u8)>> = HashMap::new();

        for event in track {
            current_tick += u64::from(event.delta.as_int());

            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                    tempo_changes.push((current_tick, tempo.as_int()));
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch = channel.as_int();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            pending
                                .entry((ch, key.as_int()))
                                .or_default()
                                .push((current_tick, vel.as_int()));
                        }
                        MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                            if let Some((onset, velocity)) = pending
                                .get_mut(&(ch, key.as_int()))
                                .and_then(|stack| stack.pop())
                            {
                                tick_notes.push(TickNote {
                                    onset,
                                    offset: current_tick,
                                    pitch: key.as_int(),
                                    velocity,
                                });
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        for ((_, pitch), stack) in pending {
            for (onset, velocity) in stack {
                tick_notes.push(TickNote {
                    onset,
                    offset: current_tick,
                    pitch,
                    velocity,
                });
            }
        }
    }

    // Dangling notes come out of a HashMap; settle ties before the stable sort.
    tick_notes.sort_by_key(|n| (n.onset, n.offset, n.pitch));

    let tempo = TempoMap::new(smf.header.timing, tempo_changes);
    let mut notes: Vec<MidiNote> = tick_notes
        .iter()
        .map(|n| {
            MidiNote::new(
                n.pitch,
                tempo.seconds_at(n.onset),
                tempo.seconds_at(n.offset),
                n.velocity,
            )
        })
        .collect();
    sort_midi_notes(&mut notes);

    debug!(
        tracks = smf.tracks.len(),
        notes = notes.len(),
        "read MIDI notes"
    );
    Ok(notes)
}

pub fn read_midi_file(path: &Path) -> Result<Vec<MidiNote>> {
    let bytes = std::fs::read(path)?;
    read_midi(&bytes)
}
