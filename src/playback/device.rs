//! Audio output device abstraction
//!
//! A device owns a monotonic clock (seconds) and hands out voices. A voice is
//! one oscillator feeding one gain stage. Parameter changes are scheduled
//! ahead of time and take effect when the device clock reaches them; nothing
//! here blocks.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use strum_macros::{Display, EnumIter, EnumString};

/// Oscillator shape of a voice.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Waveform {
    Sine,
    #[default]
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// One sample of the shape at `phase` in `[0, 1)`, ranging over `[-1, 1]`.
    pub fn sample(&self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
        }
    }
}

/// Something that can play scheduled voices against its own clock.
pub trait AudioDevice {
    type Voice: Voice;

    /// Current device time in seconds.
    fn now(&self) -> f64;

    /// Create a voice whose gain starts at `gain` and whose oscillator starts
    /// at device time `start`.
    fn open_voice(&self, waveform: Waveform, gain: f64, start: f64) -> Result<Self::Voice>;
}

/// A single oscillator + gain pair.
///
/// Every setter holds its value from `time` until the next change of the
/// same parameter.
pub trait Voice {
    fn set_frequency_at(&mut self, frequency: f64, time: f64);

    fn set_gain_at(&mut self, gain: f64, time: f64);

    /// Schedule the end of the voice. The voice cannot be used afterwards.
    fn stop_at(self, time: f64);
}
