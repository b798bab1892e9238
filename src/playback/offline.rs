//! An in-memory audio device
//!
//! [`OfflineDevice`] keeps a manually advanced clock and records every voice
//! scheduled on it as a [`VoiceTimeline`]. The recorded timelines can be
//! inspected directly or rendered into mono PCM samples, which is how the
//! command line tool writes WAV files.

use super::device::{AudioDevice, Voice, Waveform};
use crate::error::{BeepError, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Frequency an oscillator plays before its first scheduled change.
pub const DEFAULT_OSCILLATOR_FREQUENCY: f64 = 440.0;

/// Longest stretch of device time [`OfflineDevice::render`] will produce.
pub const MAX_RENDER_SECONDS: f64 = 3600.0;

/// A parameter value taking effect at a device time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Automation {
    pub time: f64,
    pub value: f64,
}

/// Everything scheduled on one voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceTimeline {
    pub waveform: Waveform,
    pub start: f64,
    pub stop: f64,
    pub initial_gain: f64,
    pub frequency: Vec<Automation>,
    pub gain: Vec<Automation>,
}

impl VoiceTimeline {
    /// Oscillator frequency in effect at `time`.
    pub fn frequency_at(&self, time: f64) -> f64 {
        value_at(&self.frequency, time).unwrap_or(DEFAULT_OSCILLATOR_FREQUENCY)
    }

    /// Gain in effect at `time`.
    pub fn gain_at(&self, time: f64) -> f64 {
        value_at(&self.gain, time).unwrap_or(self.initial_gain)
    }

    pub fn is_sounding(&self, time: f64) -> bool {
        self.start <= time && time < self.stop
    }

    pub fn seconds(&self) -> f64 {
        self.stop - self.start
    }
}

/// Last value scheduled at or before `time`. Later entries win ties.
fn value_at(points: &[Automation], time: f64) -> Option<f64> {
    let index = points.partition_point(|point| point.time <= time);
    index.checked_sub(1).map(|i| points[i].value)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Device with a hand-driven clock that records instead of sounding.
#[derive(Debug, Default)]
pub struct OfflineDevice {
    clock: Mutex<f64>,
    finished: Arc<Mutex<Vec<VoiceTimeline>>>,
}

impl OfflineDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose clock starts at `time` seconds.
    pub fn starting_at(time: f64) -> Self {
        Self {
            clock: Mutex::new(time),
            ..Self::default()
        }
    }

    /// Move the clock forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        *lock(&self.clock) += seconds;
    }

    /// Voices that have been stopped, in the order they were stopped.
    pub fn voices(&self) -> Vec<VoiceTimeline> {
        lock(&self.finished).clone()
    }

    /// Device time at which the last voice stops, or zero.
    pub fn end(&self) -> f64 {
        lock(&self.finished)
            .iter()
            .map(|voice| voice.stop)
            .fold(0.0, f64::max)
    }

    /// Mix every recorded voice into mono samples covering `0..end()`.
    ///
    /// Fails with [`BeepError::RenderTooLong`] when `end()` is not finite or
    /// lies beyond [`MAX_RENDER_SECONDS`].
    pub fn render(&self, sample_rate: u32) -> Result<Vec<f32>> {
        let end = self.end();
        if !end.is_finite() || end > MAX_RENDER_SECONDS {
            return Err(BeepError::RenderTooLong {
                seconds: end,
                limit: MAX_RENDER_SECONDS,
            });
        }

        let rate = sample_rate as f64;
        let length = (end * rate).ceil() as usize;
        let mut samples = vec![0.0f32; length];

        for voice in lock(&self.finished).iter() {
            let first = (voice.start * rate).ceil().max(0.0) as usize;
            let last = ((voice.stop * rate).ceil() as usize).min(length);
            let mut phase = 0.0;
            for (i, sample) in samples.iter_mut().enumerate().take(last).skip(first) {
                let time = i as f64 / rate;
                let frequency = voice.frequency_at(time);
                *sample += (voice.gain_at(time) * voice.waveform.sample(phase)) as f32;
                phase = (phase + frequency / rate).fract();
            }
        }

        Ok(samples)
    }
}

impl AudioDevice for OfflineDevice {
    type Voice = OfflineVoice;

    fn now(&self) -> f64 {
        *lock(&self.clock)
    }

    fn open_voice(&self, waveform: Waveform, gain: f64, start: f64) -> Result<OfflineVoice> {
        Ok(OfflineVoice {
            timeline: VoiceTimeline {
                waveform,
                start,
                stop: start,
                initial_gain: gain,
                frequency: Vec::new(),
                gain: Vec::new(),
            },
            finished: Arc::clone(&self.finished),
        })
    }
}

/// A voice being scheduled on an [`OfflineDevice`].
///
/// The timeline is handed to the device when the voice is stopped.
#[derive(Debug)]
pub struct OfflineVoice {
    timeline: VoiceTimeline,
    finished: Arc<Mutex<Vec<VoiceTimeline>>>,
}

impl Voice for OfflineVoice {
    fn set_frequency_at(&mut self, frequency: f64, time: f64) {
        self.timeline.frequency.push(Automation {
            time,
            value: frequency,
        });
    }

    fn set_gain_at(&mut self, gain: f64, time: f64) {
        self.timeline.gain.push(Automation { time, value: gain });
    }

    fn stop_at(mut self, time: f64) {
        self.timeline.stop = time;
        lock(&self.finished).push(self.timeline);
    }
}
