pub mod api;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod notes;
pub mod playback;
pub mod sequence;
pub mod settings;

pub use api::{compile, compile_checked, lint};
pub use compiler::{Compilation, Compiler};
pub use error::*;
pub use notes::{NoteTable, PianoKey};
pub use playback::{AudioDevice, Beeper, OfflineDevice, PlaybackOptions, Schedule, Voice, Waveform};
pub use sequence::{CompiledSequence, Notation, PlaybackEvent};
pub use settings::Settings;

/// Crate version, reported by the command line tool.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
