//! Name-based access to session state and options.

use crate::error::{Error, Result};
use crate::session::{Session, Verbosity};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Input,
    InProgress,
    EndReason,
    EndKey,
    Match,
    BackspaceIsUndo,
    CaseSensitive,
    FindAnywhere,
    MinSendLevel,
    Timeout,
    VisibleText,
    VisibleNonText,
}

static NAMES: &[(&str, Property)] = &[
    ("Input", Property::Input),
    ("InProgress", Property::InProgress),
    ("EndReason", Property::EndReason),
    ("EndKey", Property::EndKey),
    ("Match", Property::Match),
    ("BackspaceIsUndo", Property::BackspaceIsUndo),
    ("CaseSensitive", Property::CaseSensitive),
    ("FindAnywhere", Property::FindAnywhere),
    ("MinSendLevel", Property::MinSendLevel),
    ("Timeout", Property::Timeout),
    ("VisibleText", Property::VisibleText),
    ("VisibleNonText", Property::VisibleNonText),
];

impl Property {
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, property)| *property == self)
            .map_or("", |(name, _)| name)
    }

    pub fn is_writable(self) -> bool {
        !matches!(
            self,
            Property::Input
                | Property::InProgress
                | Property::EndReason
                | Property::EndKey
                | Property::Match
        )
    }
}

impl FromStr for Property {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(_, property)| *property)
            .ok_or_else(|| Error::InvalidUsage(format!("Unknown property: {}", s.trim())))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value as read from a session.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
    Int(i64),
    /// Seconds; used for `Timeout`.
    Seconds(f64),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(text) => f.write_str(text),
            PropertyValue::Bool(value) => write!(f, "{}", i32::from(*value)),
            PropertyValue::Int(value) => write!(f, "{value}"),
            PropertyValue::Seconds(value) => write!(f, "{value}"),
        }
    }
}

fn parse_bool(property: Property, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" | "" => Ok(false),
        other => Err(Error::InvalidUsage(format!(
            "{property} expects a boolean, got '{other}'"
        ))),
    }
}

impl Session {
    pub fn get(&self, property: Property) -> PropertyValue {
        let options = self.options();
        match property {
            Property::Input => PropertyValue::Text(self.input()),
            Property::InProgress => PropertyValue::Bool(self.in_progress()),
            Property::EndReason => PropertyValue::Text(self.end_reason(Verbosity::Kind)),
            Property::EndKey => PropertyValue::Text(self.end_key()),
            Property::Match => PropertyValue::Text(self.end_match()),
            Property::BackspaceIsUndo => PropertyValue::Bool(options.backspace_is_undo),
            Property::CaseSensitive => PropertyValue::Bool(options.case_sensitive),
            Property::FindAnywhere => PropertyValue::Bool(options.find_anywhere),
            Property::MinSendLevel => PropertyValue::Int(i64::from(options.min_send_level)),
            Property::Timeout => PropertyValue::Seconds(options.timeout.as_secs_f64()),
            Property::VisibleText => PropertyValue::Bool(options.visible_text),
            Property::VisibleNonText => PropertyValue::Bool(options.visible_non_text),
        }
    }

    /// Write an option property from its textual value.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUsage`] for read-only properties and unparsable values.
    pub fn set(&self, property: Property, value: &str) -> Result<()> {
        match property {
            Property::BackspaceIsUndo => self.set_backspace_is_undo(parse_bool(property, value)?),
            Property::CaseSensitive => self.set_case_sensitive(parse_bool(property, value)?),
            Property::FindAnywhere => self.set_find_anywhere(parse_bool(property, value)?),
            Property::VisibleText => self.set_visible_text(parse_bool(property, value)?),
            Property::VisibleNonText => self.set_visible_non_text(parse_bool(property, value)?),
            Property::MinSendLevel => {
                let level = value.trim().parse::<u8>().map_err(|_| {
                    Error::InvalidUsage(format!("MinSendLevel expects 0-100, got '{value}'"))
                })?;
                self.set_min_send_level(level)?;
            }
            Property::Timeout => {
                let timeout = value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                    .ok_or_else(|| {
                        Error::InvalidUsage(format!("Timeout expects seconds, got '{value}'"))
                    })?;
                self.set_timeout(timeout);
            }
            _ => {
                return Err(Error::InvalidUsage(format!(
                    "{property} is read-only"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyEvent;
    use crate::source::KeyBus;
    use std::sync::Arc;

    fn session() -> Session {
        Session::create(Arc::new(KeyBus::new()), "", "{Enter}", "hello").unwrap()
    }

    #[test]
    fn test_parse_names_case_insensitive() {
        assert_eq!("input".parse::<Property>().unwrap(), Property::Input);
        assert_eq!("MINSENDLEVEL".parse::<Property>().unwrap(), Property::MinSendLevel);
        assert!(matches!(
            "Bogus".parse::<Property>(),
            Err(Error::InvalidUsage(_))
        ));
    }

    #[test]
    fn test_read_state() {
        let session = session();
        session.start();
        session.handle_key(&KeyEvent::char('h'));
        assert_eq!(session.get(Property::Input), PropertyValue::Text("h".into()));
        assert_eq!(session.get(Property::InProgress).to_string(), "1");
        session.handle_key(&KeyEvent::named("Enter"));
        assert_eq!(session.get(Property::EndReason).to_string(), "EndKey");
        assert_eq!(session.get(Property::EndKey).to_string(), "enter");
        assert_eq!(session.get(Property::Match).to_string(), "");
    }

    #[test]
    fn test_write_options() {
        let session = session();
        session.set(Property::CaseSensitive, "true").unwrap();
        session.set(Property::MinSendLevel, "20").unwrap();
        session.set(Property::Timeout, "1.5").unwrap();
        assert_eq!(session.get(Property::CaseSensitive), PropertyValue::Bool(true));
        assert_eq!(session.get(Property::MinSendLevel), PropertyValue::Int(20));
        assert_eq!(session.get(Property::Timeout), PropertyValue::Seconds(1.5));
    }

    #[test]
    fn test_write_errors() {
        let session = session();
        assert!(matches!(
            session.set(Property::Input, "x"),
            Err(Error::InvalidUsage(_))
        ));
        assert!(session.set(Property::FindAnywhere, "maybe").is_err());
        assert!(session.set(Property::MinSendLevel, "300").is_err());
        assert!(session.set(Property::Timeout, "-1").is_err());
    }

    #[test]
    fn test_huge_timeout_while_in_progress() {
        let session = session();
        session.start();
        session.set(Property::Timeout, "1e19").unwrap();
        session.handle_key(&KeyEvent::char('h'));
        assert!(session.in_progress());
        assert_eq!(session.get(Property::Timeout), PropertyValue::Seconds(1e19));
    }
}
