//! Cursor scheduling of compiled sequences
//!
//! Walks the events once, keeping a clock cursor that starts at the device's
//! current time. Tones and rests schedule a frequency change and a gain
//! change at the cursor and then move it forward; volume and tempo changes
//! only update the running state.

use super::device::{AudioDevice, Voice, Waveform};
use crate::error::Result;
use crate::sequence::PlaybackEvent;
use crate::settings::Settings;
use log::{debug, trace, warn};
use serde::Serialize;

/// Tempo at which one beat unit lasts exactly one second.
pub const BASE_TEMPO: f64 = 240.0;

/// Volume is divided by this before it reaches the gain stage, so the
/// nominal volume range 0..4 maps onto gain 0..1.
pub const GAIN_HEADROOM: f64 = 4.0;

/// Volume used when none is given.
pub const DEFAULT_VOLUME: f64 = 0.5;

/// Seconds that `beats` last at `tempo`.
pub fn beats_to_seconds(beats: f64, tempo: f64) -> f64 {
    beats * BASE_TEMPO / tempo
}

pub fn volume_to_gain(volume: f64) -> f64 {
    volume / GAIN_HEADROOM
}

/// Tempos the clock can run at: positive and finite.
fn is_usable_tempo(tempo: f64) -> bool {
    tempo > 0.0 && tempo.is_finite()
}

/// How a sequence is played.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Volume until the first `VolumeSet`.
    pub volume: f64,
    pub waveform: Waveform,
    /// Tempo until the first `TempoSet`.
    pub tempo: f64,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            waveform: Waveform::default(),
            tempo: BASE_TEMPO,
        }
    }
}

impl From<&Settings> for PlaybackOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            volume: settings.volume,
            waveform: settings.waveform,
            tempo: settings.tempo,
        }
    }
}

/// What a call to [`schedule()`] put on the device timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Schedule {
    /// Device time at which the voice starts.
    pub start: f64,
    /// Device time at which the voice stops.
    pub end: f64,
    /// Number of tones and rests scheduled.
    pub steps: usize,
}

impl Schedule {
    pub fn seconds(&self) -> f64 {
        self.end - self.start
    }
}

/// Running state while walking a sequence.
#[derive(Debug, Clone, Copy)]
struct PlaybackState {
    volume: f64,
    tempo: f64,
    cursor: f64,
}

/// Open one voice on `device` and schedule every event of `events` on it.
///
/// Returns as soon as everything is scheduled; the device plays it later.
/// An empty sequence still opens a voice and stops it at its start time.
/// A starting tempo that is not positive and finite is replaced by
/// [`BASE_TEMPO`]; such a `TempoSet` is skipped.
pub fn schedule<D: AudioDevice + ?Sized>(
    device: &D,
    events: &[PlaybackEvent],
    options: &PlaybackOptions,
) -> Result<Schedule> {
    let start = device.now();
    let mut voice = device.open_voice(options.waveform, volume_to_gain(options.volume), start)?;

    let tempo = if is_usable_tempo(options.tempo) {
        options.tempo
    } else {
        warn!("ignoring starting tempo {}; using {BASE_TEMPO}", options.tempo);
        BASE_TEMPO
    };

    let mut state = PlaybackState {
        volume: options.volume,
        tempo,
        cursor: start,
    };
    let mut steps = 0;

    for event in events {
        match *event {
            PlaybackEvent::VolumeSet { value } => state.volume = value,
            PlaybackEvent::TempoSet { value } if is_usable_tempo(value) => {
                state.tempo = value
            }
            PlaybackEvent::TempoSet { value } => {
                warn!("ignoring tempo {value}; keeping {}", state.tempo)
            }
            PlaybackEvent::Tone {
                frequency,
                duration,
            } if frequency > 0.0 => {
                let gain = volume_to_gain(state.volume);
                trace!("{:.4}s: {frequency} Hz at gain {gain}", state.cursor);
                voice.set_frequency_at(frequency, state.cursor);
                voice.set_gain_at(gain, state.cursor);
                state.cursor += beats_to_seconds(duration, state.tempo);
                steps += 1;
            }
            // a zero frequency is silence, same as a rest
            PlaybackEvent::Tone { duration, .. } | PlaybackEvent::Rest { duration } => {
                trace!("{:.4}s: rest", state.cursor);
                voice.set_frequency_at(0.0, state.cursor);
                voice.set_gain_at(0.0, state.cursor);
                state.cursor += beats_to_seconds(duration, state.tempo);
                steps += 1;
            }
        }
    }

    voice.stop_at(state.cursor);
    debug!(
        "scheduled {steps} step(s) from {start:.4}s to {:.4}s",
        state.cursor
    );

    Ok(Schedule {
        start,
        end: state.cursor,
        steps,
    })
}
