//! # Public API
//!
//! Main entry points for the beep notation compiler.
//!
//! ## Compilation Functions
//!
//! - [`compile()`] - Lenient compilation; unknown tokens are dropped
//! - [`compile_checked()`] - Strict compilation, reporting what was dropped
//! - [`lint()`] - Only the diagnostics, for validating notation
//!
//! Playback lives on [`Beeper`](crate::playback::Beeper).
//!
//! ## Typical Usage
//!
//! ```rust
//! use beep::{compile, PlaybackEvent};
//!
//! let sequence = compile("vol=0.2 1/4 c # quiet and short");
//! assert_eq!(sequence.events()[0], PlaybackEvent::VolumeSet { value: 0.2 });
//! assert_eq!(sequence.events()[1].duration(), 0.25);
//! ```
//!
//! ## Precompiling
//!
//! Anything that accepts notation also accepts a compiled sequence, which is
//! returned as is. Compile once and replay as often as needed:
//!
//! ```rust
//! use beep::compile;
//!
//! let jingle = compile("1/4 e e 1/2 e");
//! assert_eq!(compile(&jingle), jingle);
//! ```

use crate::compiler::{Compilation, Compiler};
use crate::error::Diagnostic;
use crate::sequence::{CompiledSequence, Notation};

/// Compile notation text into a playable sequence.
///
/// Never fails: tokens that cannot be understood are skipped. A compiled
/// sequence passes through unchanged.
///
/// # Example
/// ```rust
/// use beep::compile;
///
/// let sequence = compile("gap=1/4 1 c");
/// assert_eq!(sequence.len(), 2);
/// assert_eq!(sequence.beats(), 1.0);
/// ```
pub fn compile<'a>(input: impl Into<Notation<'a>>) -> CompiledSequence {
    match input.into() {
        Notation::Text(text) => Compiler::new().compile(&text).sequence,
        Notation::Compiled(sequence) => sequence.into_owned(),
    }
}

/// Compile in strict mode.
///
/// The sequence is the same one [`compile()`] produces; the diagnostics list
/// every token that was dropped on the way. Compiled input has no
/// diagnostics.
///
/// # Example
/// ```rust
/// use beep::{compile_checked, Diagnostic};
///
/// let compilation = compile_checked("c 1/0 d");
/// assert_eq!(compilation.sequence.len(), 2);
/// assert!(matches!(
///     compilation.diagnostics[0],
///     Diagnostic::DivisionByZero { index: 1, .. }
/// ));
/// ```
pub fn compile_checked<'a>(input: impl Into<Notation<'a>>) -> Compilation {
    match input.into() {
        Notation::Text(text) => Compiler::new().strict(true).compile(&text),
        Notation::Compiled(sequence) => Compilation {
            sequence: sequence.into_owned(),
            diagnostics: Vec::new(),
        },
    }
}

/// Diagnostics for notation text, empty when every token was understood.
pub fn lint(text: &str) -> Vec<Diagnostic> {
    compile_checked(text).diagnostics
}
