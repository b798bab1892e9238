//! # Lexer
//!
//! Turns raw notation text into classified tokens.
//!
//! ## Pipeline
//! 1. [`normalize()`] - strip ` # ` comments, collapse whitespace, trim,
//!    lowercase
//! 2. [`split_tokens()`] - split on single spaces
//! 3. [`classify()`] - decide what each token is
//!
//! ## Token Classes
//! Checked in this order, first match wins:
//!
//! | Pattern                         | Example            | Token               |
//! |---------------------------------|--------------------|---------------------|
//! | letter, accidental?, octave?    | `c`, `eb3`, `-`    | `Note` / `Pause`    |
//! | number (`/` number)?            | `3`, `1/4`, `0.5`  | `Duration`          |
//! | (`gap`\|`vol`\|`bpm`) `=` value | `gap=1/40`         | `Assign`            |
//! | anything else                   | `x`, `c##`         | `Unrecognized`      |
//!
//! Letters are `c d e f g a b h` and the pause mark `-`. A note without an
//! octave digit is placed in octave 4.

use strum_macros::{Display, EnumString};

/// Octave applied to notes written without one.
pub const DEFAULT_OCTAVE: char = '4';

const NOTE_LETTERS: &[char] = &['c', 'd', 'e', 'f', 'g', 'a', 'b', 'h', '-'];

/// Variables that can be assigned inline with `name=value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Variable {
    /// Trailing silence carved out of each following note.
    Gap,
    /// Playback volume, 0..4.
    Vol,
    /// Tempo in beats per minute.
    Bpm,
}

/// A number or a fraction as written, before division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fraction {
    pub numerator: f64,
    pub denominator: Option<f64>,
}

impl Fraction {
    pub fn whole(numerator: f64) -> Self {
        Self {
            numerator,
            denominator: None,
        }
    }

    /// The value of the fraction, or `None` when the denominator is zero or
    /// the quotient overflows.
    pub fn value(&self) -> Option<f64> {
        match self.denominator {
            None => Some(self.numerator),
            Some(d) if d == 0.0 => None,
            Some(d) => Some(self.numerator / d).filter(|value| value.is_finite()),
        }
    }
}

/// Token types for the notation
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A note name with its octave filled in, e.g. `c4`, `eb3`.
    Note(String),
    /// `-`
    Pause,
    Duration(Fraction),
    Assign(Variable, Fraction),
    Unrecognized,
}

/// A classified token with its position and source text
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedToken {
    pub token: Token,
    pub index: usize,
    pub text: String,
}

/// Lexer for tokenizing notation text
pub struct Lexer {
    normalized: String,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            normalized: normalize(input),
        }
    }

    /// The input after normalization.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn tokenize(&self) -> Vec<LocatedToken> {
        split_tokens(&self.normalized)
            .into_iter()
            .enumerate()
            .map(|(index, text)| LocatedToken {
                token: classify(text),
                index,
                text: text.to_string(),
            })
            .collect()
    }
}

/// Strip comments, collapse whitespace, trim and lowercase.
///
/// A comment starts at a `#` with a plain space on both sides and runs to the
/// end of its line. A `#` touching other characters is an accidental, not a
/// comment.
///
/// Normalizing twice gives the same result, except when a `#` is separated
/// from its neighbors by tabs or other non-space whitespace: the first pass
/// turns `"c\t# x"` into `"c # x"`, which the second pass reads as a comment.
///
/// ```
/// use beep::lexer::normalize;
///
/// assert_eq!(normalize("  C  D#\tE # the end\n F "), "c d# e f");
/// ```
pub fn normalize(input: &str) -> String {
    let mut uncommented = String::with_capacity(input.len());
    for line in input.split(['\n', '\r']) {
        let code = match line.find(" # ") {
            Some(start) => &line[..start],
            None => line,
        };
        uncommented.push_str(code);
        uncommented.push('\n');
    }

    uncommented
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split normalized text on single spaces.
///
/// Empty text yields a single empty token, which classifies as
/// [`Token::Unrecognized`].
pub fn split_tokens(normalized: &str) -> Vec<&str> {
    normalized.split(' ').collect()
}

/// Classify one normalized token.
pub fn classify(text: &str) -> Token {
    if let Some(token) = classify_note(text) {
        return token;
    }
    if let Some(fraction) = parse_fraction(text) {
        return Token::Duration(fraction);
    }
    if let Some((name, value)) = text.split_once('=') {
        if let (Ok(variable), Some(fraction)) = (name.parse::<Variable>(), parse_fraction(value)) {
            return Token::Assign(variable, fraction);
        }
    }
    Token::Unrecognized
}

fn classify_note(text: &str) -> Option<Token> {
    let mut chars = text.chars().peekable();

    let letter = chars.next().filter(|c| NOTE_LETTERS.contains(c))?;
    let accidental = chars.next_if(|&c| c == '#' || c == 'b');
    let octave = chars.next_if(|c| c.is_ascii_digit());
    if chars.next().is_some() {
        return None;
    }

    if letter == '-' && accidental.is_none() && octave.is_none() {
        return Some(Token::Pause);
    }

    let mut name = String::with_capacity(3);
    name.push(letter);
    name.extend(accidental);
    name.push(octave.unwrap_or(DEFAULT_OCTAVE));
    Some(Token::Note(name))
}

/// `number` or `number/number`.
fn parse_fraction(text: &str) -> Option<Fraction> {
    match text.split_once('/') {
        Some((numerator, denominator)) => Some(Fraction {
            numerator: parse_number(numerator)?,
            denominator: Some(parse_number(denominator)?),
        }),
        None => parse_number(text).map(Fraction::whole),
    }
}

/// Digits, optionally followed by a dot and more digits. Numbers too large
/// for an `f64` are rejected.
fn parse_number(text: &str) -> Option<f64> {
    let (whole, fractional) = match text.split_once('.') {
        Some((whole, fractional)) => (whole, Some(fractional)),
        None => (text, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fractional.map_or(true, all_digits) {
        return None;
    }
    text.parse().ok().filter(|value: &f64| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  c\t\td \n\n e  "), "c d e");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize("C D# Eb BPM=120"), "c d# eb bpm=120");
    }

    #[test]
    fn test_normalize_strips_comments_per_line() {
        let input = "vol=0.5   # Volume 50%\n1/4 E4    # Jin\n1/4 E4 # -gle";
        assert_eq!(normalize(input), "vol=0.5 1/4 e4 1/4 e4");
    }

    #[test]
    fn test_normalize_keeps_bare_hash() {
        assert_eq!(normalize("c# d #e f#4"), "c# d #e f#4");
        assert_eq!(normalize("c #"), "c #");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "C D E",
            "  bpm=130 gap=1/40 # jingle\n 1/4 E4 E4 1/2 E4 ",
            "c# # comment",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_tab_delimited_hash() {
        let once = normalize("c\t# x");
        assert_eq!(once, "c # x");
        assert_eq!(normalize(&once), "c");
    }

    #[test]
    fn test_classify_rejects_overflowing_numbers() {
        let huge = "9".repeat(400);
        assert_eq!(classify(&huge), Token::Unrecognized);
        assert_eq!(classify(&format!("1/{huge}")), Token::Unrecognized);
        assert_eq!(classify(&format!("bpm={huge}")), Token::Unrecognized);
        assert_eq!(classify("99999999"), Token::Duration(Fraction::whole(99_999_999.0)));
    }

    #[test]
    fn test_split_empty() {
        assert_eq!(split_tokens(""), vec![""]);
        assert_eq!(classify(""), Token::Unrecognized);
    }

    #[test]
    fn test_classify_notes() {
        assert_eq!(classify("c"), Token::Note("c4".to_string()));
        assert_eq!(classify("c5"), Token::Note("c5".to_string()));
        assert_eq!(classify("eb"), Token::Note("eb4".to_string()));
        assert_eq!(classify("f#2"), Token::Note("f#2".to_string()));
        assert_eq!(classify("bb"), Token::Note("bb4".to_string()));
        assert_eq!(classify("h"), Token::Note("h4".to_string()));
        assert_eq!(classify("-"), Token::Pause);
    }

    #[test]
    fn test_classify_malformed_pause_is_a_note() {
        // matches the note pattern, but no table entry will exist for it
        assert_eq!(classify("-#"), Token::Note("-#4".to_string()));
        assert_eq!(classify("-3"), Token::Note("-3".to_string()));
    }

    #[test]
    fn test_classify_rejects_non_notes() {
        assert_eq!(classify("c##"), Token::Unrecognized);
        assert_eq!(classify("c45"), Token::Unrecognized);
        assert_eq!(classify("x"), Token::Unrecognized);
        assert_eq!(classify("k40"), Token::Unrecognized);
    }

    #[test]
    fn test_classify_durations() {
        assert_eq!(classify("3"), Token::Duration(Fraction::whole(3.0)));
        assert_eq!(classify("0.5"), Token::Duration(Fraction::whole(0.5)));
        assert_eq!(
            classify("3/8"),
            Token::Duration(Fraction {
                numerator: 3.0,
                denominator: Some(8.0)
            })
        );
        assert_eq!(classify(".5"), Token::Unrecognized);
        assert_eq!(classify("1."), Token::Unrecognized);
        assert_eq!(classify("1/2/3"), Token::Unrecognized);
    }

    #[test]
    fn test_classify_assignments() {
        assert_eq!(
            classify("gap=1/40"),
            Token::Assign(
                Variable::Gap,
                Fraction {
                    numerator: 1.0,
                    denominator: Some(40.0)
                }
            )
        );
        assert_eq!(
            classify("vol=0.2"),
            Token::Assign(Variable::Vol, Fraction::whole(0.2))
        );
        assert_eq!(
            classify("bpm=120"),
            Token::Assign(Variable::Bpm, Fraction::whole(120.0))
        );
        assert_eq!(classify("tempo=120"), Token::Unrecognized);
        assert_eq!(classify("bpm="), Token::Unrecognized);
        assert_eq!(classify("bpm=fast"), Token::Unrecognized);
    }

    #[test]
    fn test_fraction_value() {
        assert_eq!(Fraction::whole(2.0).value(), Some(2.0));
        let quarter = Fraction {
            numerator: 1.0,
            denominator: Some(4.0),
        };
        assert_eq!(quarter.value(), Some(0.25));
        let broken = Fraction {
            numerator: 1.0,
            denominator: Some(0.0),
        };
        assert_eq!(broken.value(), None);
        let overflowing = Fraction {
            numerator: 1e300,
            denominator: Some(1e-300),
        };
        assert_eq!(overflowing.value(), None);
    }

    #[test]
    fn test_lexer_indexes_tokens() {
        let tokens = Lexer::new("1/4 C x").tokenize();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].token, Token::Note("c4".to_string()));
        assert_eq!(tokens[2].index, 2);
        assert_eq!(tokens[2].text, "x");
        assert_eq!(tokens[2].token, Token::Unrecognized);
    }
}
