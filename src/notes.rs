//! # Note Table
//!
//! Frozen mapping from note names to frequencies in Hz.
//!
//! ## Naming
//! - Letters `c d e f g a b`, plus `h` as the German spelling of `b`
//! - Optional accidental: `#` raises a half step, `b` lowers one
//!   (`d#4` and `eb4` are the same pitch)
//! - Octave digit `0`..=`8`; `c4` is middle C, `a4` is 440 Hz
//! - Piano keys `k1`..=`k88`, where `k1` is A0, `k40` is middle C and `k49`
//!   is A4
//!
//! ## Tuning
//! Frequencies follow twelve-tone equal temperament anchored at A4 = 440 Hz:
//! `f = 440 * 2^((midi - 69) / 12)`. The table is built once, on first use,
//! and never changes afterwards.
//!
//! ## Example
//! ```rust
//! use beep::NoteTable;
//!
//! let table = NoteTable::global();
//! assert_eq!(table.get("a4"), Some(440.0));
//! assert_eq!(table.get("d#4"), table.get("eb4"));
//! assert_eq!(table.get("k40"), table.get("c4"));
//! ```

use crate::error::{BeepError, Result};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Concert pitch of A4 in Hz.
pub const CONCERT_A: f64 = 440.0;

/// MIDI note number of A4.
const CONCERT_A_MIDI: i32 = 69;

/// Number of keys on a standard piano.
pub const PIANO_KEYS: u8 = 88;

/// MIDI number of piano key 1 (A0) minus one.
const PIANO_KEY_OFFSET: i32 = 20;

const LETTERS: [(char, i32); 8] = [
    ('c', 0),
    ('d', 2),
    ('e', 4),
    ('f', 5),
    ('g', 7),
    ('a', 9),
    ('b', 11),
    ('h', 11),
];

const ACCIDENTALS: [(&str, i32); 3] = [("", 0), ("#", 1), ("b", -1)];

const SHARP_NAMES: [&str; 12] = [
    "c", "c#", "d", "d#", "e", "f", "f#", "g", "g#", "a", "a#", "b",
];

const FLAT_NAMES: [Option<&str>; 12] = [
    None,
    Some("db"),
    None,
    Some("eb"),
    None,
    None,
    Some("gb"),
    None,
    Some("ab"),
    None,
    Some("bb"),
    None,
];

static GLOBAL: Lazy<NoteTable> = Lazy::new(NoteTable::build);

/// Equal-tempered frequency of a MIDI note number.
pub fn midi_to_frequency(midi: i32) -> f64 {
    CONCERT_A * 2f64.powf((midi - CONCERT_A_MIDI) as f64 / 12.0)
}

/// One row of the piano key overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PianoKey {
    pub number: u8,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub frequency: f64,
}

/// Read-only note name lookup.
#[derive(Debug, Clone)]
pub struct NoteTable {
    entries: HashMap<String, f64>,
}

impl NoteTable {
    /// The process-wide table.
    pub fn global() -> &'static NoteTable {
        &GLOBAL
    }

    fn build() -> Self {
        let mut entries = HashMap::new();

        for octave in 0..=8 {
            for (letter, semitone) in LETTERS {
                for (accidental, shift) in ACCIDENTALS {
                    let midi = 12 * (octave + 1) + semitone + shift;
                    let name = format!("{letter}{accidental}{octave}");
                    entries.insert(name, midi_to_frequency(midi));
                }
            }
        }

        for key in 1..=PIANO_KEYS {
            let midi = key as i32 + PIANO_KEY_OFFSET;
            entries.insert(format!("k{key}"), midi_to_frequency(midi));
        }

        Self { entries }
    }

    /// Frequency for `name`, if the table has it.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.get(name).copied()
    }

    /// Frequency for `name`, or [`BeepError::Resolution`].
    pub fn resolve(&self, name: &str) -> Result<f64> {
        self.get(name).ok_or_else(|| BeepError::Resolution {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The 88 piano keys from A0 up to C8, with their canonical note names.
    pub fn piano_keys(&self) -> Vec<PianoKey> {
        (1..=PIANO_KEYS)
            .map(|number| {
                let midi = number as i32 + PIANO_KEY_OFFSET;
                let octave = midi / 12 - 1;
                let pitch_class = (midi % 12) as usize;
                PianoKey {
                    number,
                    name: format!("{}{octave}", SHARP_NAMES[pitch_class]),
                    alias: FLAT_NAMES[pitch_class].map(|flat| format!("{flat}{octave}")),
                    frequency: self
                        .get(&format!("k{number}"))
                        .unwrap_or_else(|| midi_to_frequency(midi)),
                }
            })
            .collect()
    }
}
