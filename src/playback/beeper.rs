//! The [`Beeper`] handle
//!
//! Owns a lazily created audio device and plays notation on it. The device
//! is built by a factory the first time it is needed; concurrent first calls
//! still build exactly one device. Right after creation the device plays an
//! inaudible warm-up tone, which unlocks audio on platforms that only allow
//! sound after a user gesture.

use super::device::{AudioDevice, Waveform};
use super::scheduler::{schedule, PlaybackOptions, Schedule, BASE_TEMPO};
use crate::compiler::Compiler;
use crate::error::{BeepError, Result};
use crate::sequence::{CompiledSequence, Notation, PlaybackEvent};
use crate::settings::Settings;
use log::{debug, warn};
use once_cell::sync::OnceCell;
use std::borrow::Cow;

/// Warm-up tone: the top note of a piano, for five milliseconds, at a
/// volume nobody will hear.
pub const WARM_UP_FREQUENCY: f64 = 4186.01;
pub const WARM_UP_SECONDS: f64 = 0.005;
pub const WARM_UP_VOLUME: f64 = 0.01;

/// Frequency of a plain [`Beeper::beep()`].
pub const DEFAULT_BEEP_FREQUENCY: f64 = 400.0;

/// Builds the device on first use.
pub type DeviceFactory<D> = Box<dyn Fn() -> Result<D> + Send + Sync>;

/// Plays notation on a lazily created device.
///
/// # Example
/// ```rust
/// use beep::playback::{Beeper, OfflineDevice};
///
/// let beeper = Beeper::new(|| Ok(OfflineDevice::new()));
/// let schedule = beeper.play("1/4 c e g")?;
/// assert_eq!(schedule.seconds(), 0.75);
/// # Ok::<(), beep::BeepError>(())
/// ```
pub struct Beeper<D> {
    device: OnceCell<D>,
    factory: DeviceFactory<D>,
    settings: Settings,
}

impl<D> std::fmt::Debug for Beeper<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Beeper")
            .field("initialized", &self.device.get().is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

impl<D: AudioDevice> Beeper<D> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<D> + Send + Sync + 'static,
    {
        Self {
            device: OnceCell::new(),
            factory: Box::new(factory),
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.device.get().is_some()
    }

    /// The device, created and warmed up on first call.
    pub fn device(&self) -> Result<&D> {
        self.device.get_or_try_init(|| {
            let device = (self.factory)().map_err(|e| {
                warn!("audio device unavailable: {e}");
                match e {
                    BeepError::DeviceUnavailable(_) => e,
                    other => BeepError::DeviceUnavailable(other.to_string()),
                }
            })?;
            debug!("audio device created, playing warm-up tone");
            let warm_up = [PlaybackEvent::Tone {
                frequency: WARM_UP_FREQUENCY,
                duration: WARM_UP_SECONDS,
            }];
            schedule(
                &device,
                &warm_up,
                &PlaybackOptions {
                    volume: WARM_UP_VOLUME,
                    tempo: BASE_TEMPO,
                    ..PlaybackOptions::default()
                },
            )?;
            Ok(device)
        })
    }

    /// Create the device if it does not exist yet. Safe to call repeatedly.
    pub fn init(&self) -> Result<()> {
        self.device().map(|_| ())
    }

    /// Compile notation with this handle's strictness, logging diagnostics.
    pub fn compile(&self, text: &str) -> CompiledSequence {
        let compilation = Compiler::new().strict(self.settings.strict).compile(text);
        for diagnostic in &compilation.diagnostics {
            warn!("{diagnostic}");
        }
        compilation.sequence
    }

    /// Play notation text or a compiled sequence at the configured volume and
    /// waveform.
    pub fn play<'a>(&self, input: impl Into<Notation<'a>>) -> Result<Schedule> {
        self.play_with(input, self.settings.volume, self.settings.waveform)
    }

    pub fn play_with<'a>(
        &self,
        input: impl Into<Notation<'a>>,
        volume: f64,
        waveform: Waveform,
    ) -> Result<Schedule> {
        let sequence: Cow<'_, CompiledSequence> = match input.into() {
            Notation::Text(text) => Cow::Owned(self.compile(&text)),
            Notation::Compiled(sequence) => sequence,
        };
        let options = PlaybackOptions {
            volume,
            waveform,
            tempo: self.settings.tempo,
        };
        schedule(self.device()?, sequence.events(), &options)
    }

    /// Sound `frequency` Hz for `seconds` wall-clock seconds.
    pub fn tone(&self, frequency: f64, seconds: f64, volume: f64) -> Result<Schedule> {
        let events = [PlaybackEvent::Tone {
            frequency,
            duration: seconds,
        }];
        let options = PlaybackOptions {
            volume,
            waveform: self.settings.waveform,
            tempo: BASE_TEMPO,
        };
        schedule(self.device()?, &events, &options)
    }

    /// The classic beep: 400 Hz for one beat.
    pub fn beep(&self) -> Result<Schedule> {
        let default_beep = CompiledSequence::new(vec![PlaybackEvent::Tone {
            frequency: DEFAULT_BEEP_FREQUENCY,
            duration: 1.0,
        }]);
        self.play(default_beep)
    }
}
