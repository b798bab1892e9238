//! # Playback Module
//!
//! Turns compiled sequences into timed automation on an audio device.
//!
//! ## Purpose
//! A compiled sequence only says *what* to play, in tempo-relative beat
//! units. This module decides *when*: it walks the sequence with a clock
//! cursor, converts beats to seconds with the tempo in effect, and schedules
//! frequency and gain changes on a single voice.
//!
//! ## Sub-modules
//! - `device` - [`AudioDevice`] / [`Voice`] traits and [`Waveform`]
//! - `scheduler` - the cursor walk, [`schedule()`]
//! - `beeper` - [`Beeper`], a handle owning a lazily created device
//! - `offline` - [`OfflineDevice`], a recording device with a manual clock
//!
//! ## Timing
//! - Start: the device's current time
//! - Tone / rest: schedule at the cursor, then advance it by
//!   `beats * 240 / tempo` seconds
//! - `VolumeSet` / `TempoSet`: update state, cursor stays put
//! - End: the voice is stopped at the final cursor
//!
//! Gain is always `volume / 4`, so volumes 0..4 map to gain 0..1.
//!
//! ## Example
//! ```rust
//! use beep::compile;
//! use beep::playback::{schedule, OfflineDevice, PlaybackOptions};
//!
//! let device = OfflineDevice::new();
//! let sequence = compile("bpm=120 1/2 c d");
//! let plan = schedule(&device, sequence.events(), &PlaybackOptions::default())?;
//!
//! // two half beats at 120 bpm
//! assert_eq!(plan.end, 2.0);
//! # Ok::<(), beep::BeepError>(())
//! ```
//!
//! ## Concurrency
//! Scheduling never blocks and never touches other voices. Several calls can
//! overlap on one device; each gets its own voice.

mod beeper;
mod device;
mod offline;
mod scheduler;

#[cfg(test)]
mod tests;

pub use beeper::{
    Beeper, DeviceFactory, DEFAULT_BEEP_FREQUENCY, WARM_UP_FREQUENCY, WARM_UP_SECONDS,
    WARM_UP_VOLUME,
};
pub use device::{AudioDevice, Voice, Waveform};
pub use offline::{
    Automation, OfflineDevice, OfflineVoice, VoiceTimeline, MAX_RENDER_SECONDS,
};
pub use scheduler::{
    beats_to_seconds, schedule, volume_to_gain, PlaybackOptions, Schedule, BASE_TEMPO,
    DEFAULT_VOLUME, GAIN_HEADROOM,
};
