//! Session options and the compact option-string parser.
//!
//! Option letters are case-insensitive and whitespace between them is ignored:
//!
//! | Letter | Effect |
//! |--------|--------|
//! | `B` | Backspace is not treated as undo |
//! | `C` | Case-sensitive matching |
//! | `I[n]` | Ignore input below send level `n` (bare `I` means 1) |
//! | `L<n>` | Buffer capacity in characters (`L0` disables text collection) |
//! | `T<secs>` | Timeout in seconds, decimals allowed |
//! | `V` | Text and non-text keys stay visible |
//! | `*` | Match phrases anywhere in the buffer |

use crate::error::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;
use std::str::FromStr;
use std::time::Duration;

/// Highest synthetic input level accepted by `I<n>`.
pub const MAX_SEND_LEVEL: u8 = 100;

/// Default buffer capacity in characters.
pub const DEFAULT_CAPACITY: usize = 1023;

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub case_sensitive: bool,
    pub find_anywhere: bool,
    pub backspace_is_undo: bool,
    pub min_send_level: u8,
    pub visible_text: bool,
    pub visible_non_text: bool,
    /// Zero means no timeout.
    pub timeout: Duration,
    pub capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            case_sensitive: false,
            find_anywhere: false,
            backspace_is_undo: true,
            min_send_level: 0,
            visible_text: false,
            visible_non_text: true,
            timeout: Duration::ZERO,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Options {
    /// Apply an option string on top of the current values.
    ///
    /// Either every option in `spec` is applied or, on error, none is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] naming the offending letter for unknown
    /// letters, missing or malformed numbers, and out-of-range send levels.
    pub fn apply(&mut self, spec: &str) -> Result<()> {
        let mut next = self.clone();
        let mut chars = spec.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch.to_ascii_uppercase() {
                ' ' | '\t' => {}
                'B' => next.backspace_is_undo = false,
                'C' => next.case_sensitive = true,
                'V' => {
                    next.visible_text = true;
                    next.visible_non_text = true;
                }
                '*' => next.find_anywhere = true,
                'I' => {
                    let digits = take_number(&mut chars);
                    next.min_send_level = if digits.is_empty() {
                        1
                    } else {
                        digits
                            .parse::<u8>()
                            .ok()
                            .filter(|level| *level <= MAX_SEND_LEVEL)
                            .ok_or_else(|| Error::parse(ch, spec))?
                    };
                }
                'L' => {
                    next.capacity = take_number(&mut chars)
                        .parse()
                        .map_err(|_| Error::parse(ch, spec))?;
                }
                'T' => {
                    let secs: f64 = take_number(&mut chars)
                        .parse()
                        .map_err(|_| Error::parse(ch, spec))?;
                    next.timeout = Duration::try_from_secs_f64(secs)
                        .map_err(|_| Error::parse(ch, spec))?;
                }
                _ => return Err(Error::parse(ch, spec)),
            }
        }
        *self = next;
        Ok(())
    }

    /// Timeout in whole milliseconds, 0 when disabled.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

impl FromStr for Options {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut options = Options::default();
        options.apply(s)?;
        Ok(options)
    }
}

/// Collect the digits and decimal points immediately following an option letter.
fn take_number(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut number = String::new();
    while let Some(&ch) = chars.peek() {
        if !(ch.is_ascii_digit() || ch == '.') {
            break;
        }
        number.push(ch);
        chars.next();
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert!(opts.backspace_is_undo);
        assert!(!opts.case_sensitive);
        assert!(!opts.visible_text);
        assert!(opts.visible_non_text);
        assert_eq!(opts.capacity, DEFAULT_CAPACITY);
        assert_eq!(opts.timeout_ms(), 0);
    }

    #[test]
    fn test_parse_flags() {
        let opts: Options = "b c v *".parse().unwrap();
        assert!(!opts.backspace_is_undo);
        assert!(opts.case_sensitive);
        assert!(opts.visible_text);
        assert!(opts.visible_non_text);
        assert!(opts.find_anywhere);
    }

    #[test]
    fn test_parse_numbers() {
        let opts: Options = "T2.5 L10 I50".parse().unwrap();
        assert_eq!(opts.timeout, Duration::from_millis(2500));
        assert_eq!(opts.capacity, 10);
        assert_eq!(opts.min_send_level, 50);
    }

    #[test]
    fn test_bare_send_level() {
        let opts: Options = "I".parse().unwrap();
        assert_eq!(opts.min_send_level, 1);
        let opts: Options = "IC".parse().unwrap();
        assert_eq!(opts.min_send_level, 1);
        assert!(opts.case_sensitive);
    }

    #[test]
    fn test_unknown_letter_names_character() {
        let err = "CQ".parse::<Options>().unwrap_err();
        assert_eq!(err, Error::parse('Q', "CQ"));
        assert!(err.to_string().contains("'Q'"));
    }

    #[test]
    fn test_malformed_numbers() {
        assert!("T".parse::<Options>().is_err());
        assert!("T1.2.3".parse::<Options>().is_err());
        assert!("L".parse::<Options>().is_err());
        assert!("I101".parse::<Options>().is_err());
    }

    #[test]
    fn test_failed_apply_keeps_previous() {
        let mut opts = Options::default();
        opts.apply("C").unwrap();
        assert!(opts.apply("* Z").is_err());
        assert!(opts.case_sensitive);
        assert!(!opts.find_anywhere);
    }
}
