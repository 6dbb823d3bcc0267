//! Per-key flags: end keys, ignored keys and visibility overrides.

use crate::error::{Error, Result};
use crate::event::normalize_key;
use bitflags::bitflags;
use std::collections::HashMap;

bitflags! {
    /// Flags attached to a single key.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyFlags: u8 {
        /// Pressing the key terminates the session.
        const ENABLED = 0b0001;
        /// The key never contributes text to the buffer.
        const IGNORE_TEXT = 0b0010;
        /// The key stays visible to other applications.
        const VISIBLE = 0b0100;
        /// `VISIBLE` takes precedence over the session-wide visibility defaults.
        const VISIBILITY_OVERRIDE = 0b1000;
    }
}

/// A key reference from a key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRef {
    /// `{All}`: every key, including ones not yet listed.
    All,
    Key(String),
}

/// Parse a key list such as `{Enter}{Esc}.,`.
///
/// Braced names are looked up case-insensitively; any other character stands
/// for itself. `{}}` and `{{}` name the brace keys and `{ }` names the space key.
pub fn parse_key_list(list: &str) -> Result<Vec<KeyRef>> {
    let mut keys = Vec::new();
    let mut rest = list;
    while let Some(ch) = rest.chars().next() {
        if ch == '{' {
            let body = &rest[1..];
            // Skip one character before searching so `{}}` names the brace.
            let first = body.chars().next().ok_or_else(|| Error::parse("{", list))?;
            let close = body[first.len_utf8()..]
                .find('}')
                .map(|i| i + first.len_utf8())
                .ok_or_else(|| Error::parse(rest, list))?;
            let name = &body[..close];
            if name.trim().is_empty() && name != " " {
                return Err(Error::parse(&rest[..close + 2], list));
            }
            if name.eq_ignore_ascii_case("all") {
                keys.push(KeyRef::All);
            } else {
                keys.push(KeyRef::Key(normalize_key(name)));
            }
            rest = &body[close + 1..];
        } else {
            keys.push(KeyRef::Key(normalize_key(&ch.to_string())));
            rest = &rest[ch.len_utf8()..];
        }
    }
    Ok(keys)
}

/// Parse a `+`/`-` flag block into flags to add and flags to remove.
///
/// A later letter overrides an earlier one for the same flag. `V` in either
/// direction also marks the visibility as overridden.
pub fn parse_flag_ops(options: &str) -> Result<(KeyFlags, KeyFlags)> {
    let mut adding = true;
    let mut add = KeyFlags::empty();
    let mut remove = KeyFlags::empty();
    for ch in options.chars() {
        let flag = match ch.to_ascii_uppercase() {
            '+' => {
                adding = true;
                continue;
            }
            '-' => {
                adding = false;
                continue;
            }
            ' ' | '\t' => continue,
            'E' => KeyFlags::ENABLED,
            'I' => KeyFlags::IGNORE_TEXT,
            'V' => {
                add |= KeyFlags::VISIBILITY_OVERRIDE;
                KeyFlags::VISIBLE
            }
            _ => return Err(Error::InvalidOption(ch)),
        };
        if adding {
            add |= flag;
            remove &= !flag;
        } else {
            remove |= flag;
            add &= !flag;
        }
    }
    Ok((add, remove))
}

/// Map from key identifier to flags, with a default for unlisted keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndKeyTable {
    default: KeyFlags,
    keys: HashMap<String, KeyFlags>,
}

impl EndKeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an end-key spec: a key list, optionally followed by
    /// whitespace and a flag block applied on top of the default `+E`.
    ///
    /// # Example
    ///
    /// ```
    /// use inputhook::keys::{EndKeyTable, KeyFlags};
    ///
    /// let table = EndKeyTable::build("{Enter}{Esc} +V").unwrap();
    /// assert!(table.flags("escape").contains(KeyFlags::ENABLED | KeyFlags::VISIBLE));
    /// assert!(table.flags("a").is_empty());
    /// ```
    pub fn build(spec: &str) -> Result<Self> {
        let (list, block) = split_key_spec(spec);
        let (add, remove) = parse_flag_ops(block).map_err(|err| match err {
            Error::InvalidOption(ch) => Error::parse(ch, spec),
            other => other,
        })?;
        let mut table = Self::new();
        let keys = parse_key_list(list)?;
        table.apply(&keys, KeyFlags::empty(), KeyFlags::ENABLED);
        table.apply(&keys, remove, add);
        Ok(table)
    }

    /// Apply a `KeyOpt`-style flag block to every key in `keys`.
    pub fn mutate(&mut self, keys: &str, options: &str) -> Result<()> {
        let (add, remove) = parse_flag_ops(options)?;
        let keys = parse_key_list(keys)?;
        self.apply(&keys, remove, add);
        Ok(())
    }

    fn apply(&mut self, keys: &[KeyRef], remove: KeyFlags, add: KeyFlags) {
        for key in keys {
            match key {
                KeyRef::All => {
                    self.default = (self.default & !remove) | add;
                    for flags in self.keys.values_mut() {
                        *flags = (*flags & !remove) | add;
                    }
                }
                KeyRef::Key(name) => {
                    let flags = self.keys.entry(name.clone()).or_insert(self.default);
                    *flags = (*flags & !remove) | add;
                }
            }
        }
    }

    /// Flags for a key identifier; unlisted keys get the `{All}` default.
    pub fn flags(&self, key: &str) -> KeyFlags {
        self.keys
            .get(key)
            .or_else(|| self.keys.get(&normalize_key(key)))
            .copied()
            .unwrap_or(self.default)
    }
}

/// Split at the first whitespace outside braces.
fn split_key_spec(spec: &str) -> (&str, &str) {
    let mut open: Option<usize> = None;
    for (i, ch) in spec.char_indices() {
        match (ch, open) {
            ('{', None) => open = Some(i),
            // The first character after `{` is always part of the name.
            ('}', Some(start)) if i > start + 1 => open = None,
            (c, None) if c.is_whitespace() => return (&spec[..i], spec[i..].trim()),
            _ => {}
        }
    }
    (spec, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_list() {
        let keys = parse_key_list("{Enter}{ESC}.a").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyRef::Key("enter".into()),
                KeyRef::Key("escape".into()),
                KeyRef::Key(".".into()),
                KeyRef::Key("a".into()),
            ]
        );
    }

    #[test]
    fn test_parse_key_list_braces_and_all() {
        let keys = parse_key_list("{}}{{}{all}").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyRef::Key("}".into()),
                KeyRef::Key("{".into()),
                KeyRef::All,
            ]
        );
    }

    #[test]
    fn test_parse_key_list_unclosed() {
        assert!(matches!(parse_key_list("{Enter"), Err(Error::Parse { .. })));
        assert!(parse_key_list("{}").is_err());
    }

    #[test]
    fn test_flag_ops_precedence() {
        let (add, remove) = parse_flag_ops("+E-I").unwrap();
        assert_eq!(add, KeyFlags::ENABLED);
        assert_eq!(remove, KeyFlags::IGNORE_TEXT);

        let (add, remove) = parse_flag_ops("-E +E").unwrap();
        assert_eq!(add, KeyFlags::ENABLED);
        assert!(remove.is_empty());
    }

    #[test]
    fn test_flag_ops_minus_v_overrides_visibility() {
        let (add, remove) = parse_flag_ops("-V").unwrap();
        assert_eq!(add, KeyFlags::VISIBILITY_OVERRIDE);
        assert_eq!(remove, KeyFlags::VISIBLE);
    }

    #[test]
    fn test_flag_ops_invalid() {
        assert_eq!(parse_flag_ops("+Q"), Err(Error::InvalidOption('Q')));
    }

    #[test]
    fn test_build_enables_listed_keys() {
        let table = EndKeyTable::build("{Enter}.").unwrap();
        assert_eq!(table.flags("enter"), KeyFlags::ENABLED);
        assert_eq!(table.flags("."), KeyFlags::ENABLED);
        assert!(table.flags("a").is_empty());
    }

    #[test]
    fn test_build_with_block() {
        let table = EndKeyTable::build("{Tab} -E +I").unwrap();
        assert_eq!(table.flags("tab"), KeyFlags::IGNORE_TEXT);
        assert!(matches!(
            EndKeyTable::build("{Tab} +Z"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_build_space_key_in_braces() {
        let table = EndKeyTable::build("{Space}").unwrap();
        assert!(table.flags("space").contains(KeyFlags::ENABLED));

        let table = EndKeyTable::build("{ }{Enter} +V").unwrap();
        assert!(table.flags("space").contains(KeyFlags::ENABLED | KeyFlags::VISIBLE));
        assert!(EndKeyTable::build("{  }").is_err());
    }

    #[test]
    fn test_mutate_is_idempotent() {
        let mut table = EndKeyTable::build("a").unwrap();
        table.mutate("a", "+E").unwrap();
        assert_eq!(table.flags("a"), KeyFlags::ENABLED);
        table.mutate("b", "-I").unwrap();
        assert!(table.flags("b").is_empty());
    }

    #[test]
    fn test_mutate_all() {
        let mut table = EndKeyTable::build("{Enter}").unwrap();
        table.mutate("{All}", "+I").unwrap();
        assert_eq!(
            table.flags("enter"),
            KeyFlags::ENABLED | KeyFlags::IGNORE_TEXT
        );
        assert_eq!(table.flags("z"), KeyFlags::IGNORE_TEXT);
        table.mutate("{All}", "-I").unwrap();
        assert_eq!(table.flags("enter"), KeyFlags::ENABLED);
        assert!(table.flags("z").is_empty());
    }
}
