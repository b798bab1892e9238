//! # Error Types
//!
//! This module defines the error and diagnostic types for the beep compiler
//! and scheduler.
//!
//! ## Error Types
//! - `Resolution` - A note name with no entry in the note table
//! - `DivisionByZero` - A fraction such as `1/0`
//! - `DeviceUnavailable` - The audio output device could not be created
//! - `Rejected` - Strict validation reported one or more diagnostics
//! - `RenderTooLong` - Offline rendering would exceed its time budget
//! - `Settings` / `Io` - Configuration could not be loaded
//!
//! ## Diagnostics
//! Compilation is lenient: bad tokens are dropped instead of failing the
//! whole sequence. [`compile_checked()`](crate::compile_checked) collects a
//! [`Diagnostic`] for every dropped token so callers can validate notation
//! without changing what gets played.
//!
//! ## Usage
//! ```rust
//! use beep::{compile_checked, BeepError};
//!
//! match compile_checked("c d x e").into_result() {
//!     Ok(sequence) => println!("{} events", sequence.len()),
//!     Err(BeepError::Rejected(diagnostics)) => {
//!         for d in diagnostics {
//!             eprintln!("{d}");
//!         }
//!     }
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeepError {
    /// A note name matched the note pattern but has no frequency.
    ///
    /// # Example
    /// ```
    /// # use beep::BeepError;
    /// let err = BeepError::Resolution { name: "c9".to_string() };
    /// assert_eq!(err.to_string(), "Unknown note 'c9'");
    /// ```
    #[error("Unknown note '{name}'")]
    Resolution { name: String },

    /// A fraction with a zero denominator.
    ///
    /// # Example
    /// ```
    /// # use beep::BeepError;
    /// let err = BeepError::DivisionByZero { token: "1/0".to_string() };
    /// assert_eq!(err.to_string(), "Division by zero in '1/0'");
    /// ```
    #[error("Division by zero in '{token}'")]
    DivisionByZero { token: String },

    /// The audio output device could not be obtained (unsupported platform,
    /// permission denied, no output hardware).
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The recorded audio is too long, or endless, to render into memory.
    ///
    /// # Example
    /// ```
    /// # use beep::BeepError;
    /// let err = BeepError::RenderTooLong { seconds: 7200.0, limit: 3600.0 };
    /// assert_eq!(err.to_string(), "Cannot render 7200s of audio (limit 3600s)");
    /// ```
    #[error("Cannot render {seconds}s of audio (limit {limit}s)")]
    RenderTooLong { seconds: f64, limit: f64 },

    /// Strict validation found problems in the notation.
    ///
    /// # Example
    /// ```
    /// # use beep::{BeepError, Diagnostic};
    /// let err = BeepError::Rejected(vec![Diagnostic::UnrecognizedToken {
    ///     token: "x".to_string(),
    ///     index: 2,
    /// }]);
    /// assert_eq!(err.to_string(), "Notation rejected with 1 diagnostic(s)");
    /// ```
    #[error("Notation rejected with {} diagnostic(s)", .0.len())]
    Rejected(Vec<Diagnostic>),

    /// A settings document could not be parsed.
    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A problem found in one token during strict compilation.
///
/// `index` is the 0-based position of the token in the normalized input.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    #[error("Token {index}: unrecognized token '{token}'")]
    UnrecognizedToken { token: String, index: usize },

    #[error("Token {index}: division by zero in '{token}'")]
    DivisionByZero { token: String, index: usize },

    #[error("Token {index}: unknown note '{name}'")]
    UnresolvedNote { name: String, index: usize },
}

impl Diagnostic {
    /// Position of the offending token.
    pub fn index(&self) -> usize {
        match self {
            Diagnostic::UnrecognizedToken { index, .. }
            | Diagnostic::DivisionByZero { index, .. }
            | Diagnostic::UnresolvedNote { index, .. } => *index,
        }
    }
}

impl From<Diagnostic> for BeepError {
    fn from(diagnostic: Diagnostic) -> Self {
        match diagnostic {
            Diagnostic::DivisionByZero { token, .. } => BeepError::DivisionByZero { token },
            Diagnostic::UnresolvedNote { name, .. } => BeepError::Resolution { name },
            unrecognized => BeepError::Rejected(vec![unrecognized]),
        }
    }
}

pub type Result<T> = std::result::Result<T, BeepError>;
