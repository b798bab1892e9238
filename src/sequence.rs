//! # Compiled Sequences
//!
//! The output of the compiler and the input of the scheduler.
//!
//! ## Type Hierarchy
//! ```text
//! CompiledSequence
//!   └── Vec<PlaybackEvent>
//!         ├── Tone { frequency, duration }   (Hz, beat units)
//!         ├── Rest { duration }              (beat units)
//!         ├── VolumeSet { value }            (0..4)
//!         └── TempoSet { value }             (beats per minute)
//!
//! Notation (what `compile` and `play` accept)
//!   ├── Text(..)       notation text, compiled on use
//!   └── Compiled(..)   an already compiled sequence, passed through
//! ```
//!
//! ## Beat Units
//! Durations are tempo-relative. At the default tempo of 240 bpm one beat
//! unit lasts one second, so `1/4` is a quarter of a second. A `TempoSet`
//! changes how long every following unit lasts.
//!
//! ## Serialization
//! Sequences serialize as a plain list of tagged events, so they can be
//! stored next to the notation or handed to JavaScript:
//! ```json
//! [{"type":"tone","frequency":261.63,"duration":1.0},{"type":"rest","duration":0.5}]
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One compiled unit of playback intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PlaybackEvent {
    /// Sound `frequency` Hz for `duration` beat units.
    Tone { frequency: f64, duration: f64 },
    /// Silence for `duration` beat units.
    Rest { duration: f64 },
    /// Change the playback volume from here on. Takes no time.
    VolumeSet { value: f64 },
    /// Change the tempo from here on. Takes no time.
    TempoSet { value: f64 },
}

impl PlaybackEvent {
    /// Beat units this event occupies; zero for control changes.
    pub fn duration(&self) -> f64 {
        match self {
            PlaybackEvent::Tone { duration, .. } | PlaybackEvent::Rest { duration } => *duration,
            PlaybackEvent::VolumeSet { .. } | PlaybackEvent::TempoSet { .. } => 0.0,
        }
    }

    /// Whether the event advances the playback clock.
    pub fn is_timed(&self) -> bool {
        matches!(self, PlaybackEvent::Tone { .. } | PlaybackEvent::Rest { .. })
    }
}

/// An ordered, immutable list of playback events.
///
/// Compile once, play any number of times:
/// ```rust
/// use beep::compile;
///
/// let jingle = compile("1/4 e e 1/2 e");
/// assert_eq!(jingle.len(), 3);
/// assert_eq!(compile(&jingle), jingle);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompiledSequence {
    events: Vec<PlaybackEvent>,
}

impl CompiledSequence {
    pub fn new(events: Vec<PlaybackEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[PlaybackEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlaybackEvent> {
        self.events.iter()
    }

    /// Total length in beat units, ignoring tempo changes.
    pub fn beats(&self) -> f64 {
        self.events.iter().map(PlaybackEvent::duration).sum()
    }

    pub fn into_events(self) -> Vec<PlaybackEvent> {
        self.events
    }
}

impl From<Vec<PlaybackEvent>> for CompiledSequence {
    fn from(events: Vec<PlaybackEvent>) -> Self {
        Self::new(events)
    }
}

impl FromIterator<PlaybackEvent> for CompiledSequence {
    fn from_iter<I: IntoIterator<Item = PlaybackEvent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CompiledSequence {
    type Item = &'a PlaybackEvent;
    type IntoIter = std::slice::Iter<'a, PlaybackEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Input accepted by [`compile()`](crate::compile) and the players: either
/// notation text or a sequence that has already been compiled.
#[derive(Debug, Clone, PartialEq)]
pub enum Notation<'a> {
    Text(Cow<'a, str>),
    Compiled(Cow<'a, CompiledSequence>),
}

impl<'a> From<&'a str> for Notation<'a> {
    fn from(text: &'a str) -> Self {
        Notation::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Notation<'a> {
    fn from(text: &'a String) -> Self {
        Notation::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for Notation<'static> {
    fn from(text: String) -> Self {
        Notation::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a CompiledSequence> for Notation<'a> {
    fn from(sequence: &'a CompiledSequence) -> Self {
        Notation::Compiled(Cow::Borrowed(sequence))
    }
}

impl From<CompiledSequence> for Notation<'static> {
    fn from(sequence: CompiledSequence) -> Self {
        Notation::Compiled(Cow::Owned(sequence))
    }
}
