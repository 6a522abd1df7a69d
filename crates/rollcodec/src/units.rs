//! Conversions between MIDI units, codec-domain units, and wire units.
//!
//! These run once at each boundary. The codecs themselves only see integer
//! steps and 0–99 velocity levels.

/// Seconds per codec step on the MIDI-file boundary.
pub const TIME_PER_STEP: f64 = 1.0 / 16.0;

/// Wire ticks per codec step.
pub const TICKS_PER_RES: i64 = 12;

/// Codec → MIDI velocity scale, 1.28 as an exact ratio.
const MIDI_VELOCITY_NUM: i64 = 128;
const MIDI_VELOCITY_DEN: i64 = 100;

/// Codec velocity levels per unit of wire velocity.
pub const WIRE_VELOCITY_SCALE: f64 = 100.0;

pub fn seconds_to_steps(seconds: f64) -> i64 {
    (seconds / TIME_PER_STEP).round() as i64
}

pub fn steps_to_seconds(steps: i64) -> f64 {
    steps as f64 * TIME_PER_STEP
}

/// `round(level * 1.28)`, saturated to the MIDI range.
pub fn codec_to_midi_velocity(level: i64) -> u8 {
    let scaled = (level.clamp(0, 100) * MIDI_VELOCITY_NUM + MIDI_VELOCITY_DEN / 2) / MIDI_VELOCITY_DEN;
    scaled.min(127) as u8
}

/// `floor(velocity / 1.28)`. Not an exact inverse of [`codec_to_midi_velocity`].
pub fn midi_to_codec_velocity(velocity: u8) -> i64 {
    i64::from(velocity) * MIDI_VELOCITY_DEN / MIDI_VELOCITY_NUM
}

pub fn steps_to_ticks(steps: i64) -> i64 {
    steps * TICKS_PER_RES
}

/// Integer division; ticks that are not a multiple of 12 lose the remainder.
pub fn ticks_to_steps(ticks: i64) -> i64 {
    ticks / TICKS_PER_RES
}

pub fn codec_to_wire_velocity(level: i64) -> f64 {
    level as f64 / WIRE_VELOCITY_SCALE
}

pub fn wire_to_codec_velocity(fraction: f64) -> i64 {
    (fraction * WIRE_VELOCITY_SCALE).round() as i64
}
