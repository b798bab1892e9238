//! # Compiler
//!
//! Folds classified tokens into a [`CompiledSequence`].
//!
//! ## Fold State
//! The scan carries two values from token to token:
//! - **duration** (default `1`) - set by duration tokens such as `1/4`;
//!   applies to every following note and pause
//! - **gap** (default `0`) - set by `gap=`; the part of each following note
//!   that is turned into silence
//!
//! Neither value shows up in the output directly. Only their effect does.
//!
//! ## Gap Splitting
//! When `0 < gap < duration`, a note becomes `Tone(duration - gap)` followed
//! by `Rest(gap)`. Otherwise the note is a single `Tone(duration)`. Pauses are
//! never split.
//!
//! ## Control Events
//! `vol=` and `bpm=` emit `VolumeSet` / `TempoSet` at their position, so a
//! tempo change only affects the notes after it.
//!
//! ## Leniency
//! Tokens that cannot be used are dropped: unrecognized text, fractions
//! dividing by zero, and note names the table cannot resolve. In strict mode
//! each drop is also recorded as a [`Diagnostic`].
//!
//! ## Example
//! ```rust
//! use beep::compiler::Compiler;
//! use beep::PlaybackEvent;
//!
//! let compilation = Compiler::new().strict(true).compile("gap=1/4 c oops");
//! assert_eq!(compilation.sequence.len(), 2);
//! assert_eq!(
//!     compilation.sequence.events()[1],
//!     PlaybackEvent::Rest { duration: 0.25 }
//! );
//! assert_eq!(compilation.diagnostics.len(), 1);
//! ```

use crate::error::{BeepError, Diagnostic, Result};
use crate::lexer::{Fraction, Lexer, LocatedToken, Token, Variable};
use crate::notes::NoteTable;
use crate::sequence::{CompiledSequence, PlaybackEvent};
use log::debug;

/// Duration of a note before any duration token, in beat units.
pub const DEFAULT_DURATION: f64 = 1.0;

/// Context threaded through the token scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldState {
    pub duration: f64,
    pub gap: f64,
}

impl Default for FoldState {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            gap: 0.0,
        }
    }
}

/// The result of compiling notation text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    pub sequence: CompiledSequence,
    /// Empty unless the compiler ran in strict mode.
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The sequence, or [`BeepError::Rejected`] if anything was dropped.
    pub fn into_result(self) -> Result<CompiledSequence> {
        if self.diagnostics.is_empty() {
            Ok(self.sequence)
        } else {
            Err(BeepError::Rejected(self.diagnostics))
        }
    }
}

/// Notation compiler
///
/// Holds no state between calls; a single compiler can be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'t> {
    table: &'t NoteTable,
    strict: bool,
}

impl Default for Compiler<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler<'static> {
    /// A lenient compiler using the global note table.
    pub fn new() -> Self {
        Self::with_table(NoteTable::global())
    }
}

impl<'t> Compiler<'t> {
    pub fn with_table(table: &'t NoteTable) -> Self {
        Self {
            table,
            strict: false,
        }
    }

    /// Record a diagnostic for every dropped token.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn compile(&self, text: &str) -> Compilation {
        let tokens = Lexer::new(text).tokenize();

        let mut compilation = Compilation::default();
        let mut events = Vec::with_capacity(tokens.len());
        let state = tokens.iter().fold(FoldState::default(), |state, token| {
            self.step(state, token, &mut events, &mut compilation.diagnostics)
        });
        debug!(
            "compiled {} token(s) into {} event(s), final duration {} gap {}",
            tokens.len(),
            events.len(),
            state.duration,
            state.gap
        );

        compilation.sequence = CompiledSequence::new(events);
        compilation
    }

    /// Fold one token into the state, appending any events it produces.
    fn step(
        &self,
        state: FoldState,
        located: &LocatedToken,
        events: &mut Vec<PlaybackEvent>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> FoldState {
        match &located.token {
            Token::Pause => {
                events.push(PlaybackEvent::Rest {
                    duration: state.duration,
                });
                state
            }
            Token::Note(name) => {
                match self.table.resolve(name) {
                    Ok(frequency) => push_note(state, frequency, events),
                    Err(_) => self.drop_token(
                        Diagnostic::UnresolvedNote {
                            name: name.clone(),
                            index: located.index,
                        },
                        diagnostics,
                    ),
                }
                state
            }
            Token::Duration(fraction) => match self.evaluate(fraction, located, diagnostics) {
                Some(duration) => FoldState { duration, ..state },
                None => state,
            },
            Token::Assign(variable, fraction) => {
                let Some(value) = self.evaluate(fraction, located, diagnostics) else {
                    return state;
                };
                match variable {
                    Variable::Gap => return FoldState { gap: value, ..state },
                    Variable::Vol => events.push(PlaybackEvent::VolumeSet { value }),
                    Variable::Bpm => events.push(PlaybackEvent::TempoSet { value }),
                }
                state
            }
            // a lone empty token is what empty input looks like, not a mistake
            Token::Unrecognized if located.text.is_empty() => state,
            Token::Unrecognized => {
                self.drop_token(
                    Diagnostic::UnrecognizedToken {
                        token: located.text.clone(),
                        index: located.index,
                    },
                    diagnostics,
                );
                state
            }
        }
    }

    fn evaluate(
        &self,
        fraction: &Fraction,
        located: &LocatedToken,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<f64> {
        let value = fraction.value();
        if value.is_none() {
            self.drop_token(
                Diagnostic::DivisionByZero {
                    token: located.text.clone(),
                    index: located.index,
                },
                diagnostics,
            );
        }
        value
    }

    fn drop_token(&self, diagnostic: Diagnostic, diagnostics: &mut Vec<Diagnostic>) {
        debug!("dropped: {diagnostic}");
        if self.strict {
            diagnostics.push(diagnostic);
        }
    }
}

fn push_note(state: FoldState, frequency: f64, events: &mut Vec<PlaybackEvent>) {
    if state.gap > 0.0 && state.gap < state.duration {
        events.push(PlaybackEvent::Tone {
            frequency,
            duration: state.duration - state.gap,
        });
        events.push(PlaybackEvent::Rest {
            duration: state.gap,
        });
    } else {
        events.push(PlaybackEvent::Tone {
            frequency,
            duration: state.duration,
        });
    }
}
