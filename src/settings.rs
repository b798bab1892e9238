//! Playback and compiler settings.
//!
//! Settings are read from YAML, the same format the notation metadata uses.
//! Every field is optional:
//!
//! ```yaml
//! volume: 0.5        # 0..4, initial volume
//! waveform: square   # sine | square | sawtooth | triangle
//! tempo: 240         # initial beats per minute; 240 makes one beat one second
//! strict: false      # report dropped tokens
//! sample-rate: 44100 # used when rendering to a file
//! ```

use crate::error::Result;
use crate::playback::{Waveform, BASE_TEMPO, DEFAULT_VOLUME};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Settings {
    pub volume: f64,
    pub waveform: Waveform,
    pub tempo: f64,
    pub strict: bool,
    pub sample_rate: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            waveform: Waveform::default(),
            tempo: BASE_TEMPO,
            strict: false,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Settings {
    pub fn from_yaml(source: &str) -> Result<Self> {
        // an empty document means "all defaults"
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
