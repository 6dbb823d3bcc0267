//! Key events as delivered by a key-event source.

/// A single low-level key transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Normalized key identifier (`"a"`, `"enter"`, `"backspace"`).
    pub key: String,
    /// `true` for key-down, `false` for key-up.
    pub down: bool,
    /// Synthetic input level; 0 for physical keystrokes.
    pub send_level: u8,
    /// The character this key produces, if it is printable.
    pub text: Option<char>,
}

impl KeyEvent {
    /// Key-down event for a printable character.
    pub fn char(ch: char) -> Self {
        match ch {
            '\n' => Self::named("Enter"),
            '\t' => Self::named("Tab"),
            '\u{8}' => Self::named("Backspace"),
            _ => KeyEvent {
                key: normalize_key(&ch.to_string()),
                down: true,
                send_level: 0,
                text: Some(ch),
            },
        }
    }

    /// Key-down event for a named key such as `Enter` or `Backspace`.
    ///
    /// A single-character name behaves like [`KeyEvent::char`].
    pub fn named(name: &str) -> Self {
        let key = normalize_key(name);
        let mut chars = key.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Self::char(ch);
        }
        let text = match key.as_str() {
            "enter" => Some('\n'),
            "tab" => Some('\t'),
            "space" => Some(' '),
            _ => None,
        };
        KeyEvent {
            key,
            down: true,
            send_level: 0,
            text,
        }
    }

    /// Set the synthetic input level.
    pub fn with_level(mut self, level: u8) -> Self {
        self.send_level = level;
        self
    }

    /// The matching key-up event.
    pub fn up(&self) -> Self {
        KeyEvent {
            down: false,
            ..self.clone()
        }
    }

    pub fn is_backspace(&self) -> bool {
        self.key == "backspace"
    }
}

/// Normalize a key name: lowercase and resolve common aliases.
///
/// Single characters keep their identity apart from case.
pub fn normalize_key(name: &str) -> String {
    let name = if name.chars().count() == 1 {
        name
    } else {
        name.trim()
    };
    let lower = name.to_lowercase();
    match lower.as_str() {
        "esc" => "escape".to_string(),
        "bs" => "backspace".to_string(),
        "return" => "enter".to_string(),
        " " => "space".to_string(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_event() {
        let ev = KeyEvent::char('A');
        assert_eq!(ev.key, "a");
        assert_eq!(ev.text, Some('A'));
        assert!(ev.down);
        assert_eq!(ev.send_level, 0);
    }

    #[test]
    fn test_named_event() {
        let ev = KeyEvent::named("Return");
        assert_eq!(ev.key, "enter");
        assert_eq!(ev.text, Some('\n'));

        let ev = KeyEvent::named("BS");
        assert!(ev.is_backspace());
        assert_eq!(ev.text, None);
    }

    #[test]
    fn test_single_char_name_is_char() {
        assert_eq!(KeyEvent::named("x"), KeyEvent::char('x'));
    }

    #[test]
    fn test_up_and_level() {
        let ev = KeyEvent::char('q').with_level(40);
        let up = ev.up();
        assert!(!up.down);
        assert_eq!(up.send_level, 40);
        assert_eq!(up.key, "q");
    }

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_key("Esc"), "escape");
        assert_eq!(normalize_key("ENTER"), "enter");
        assert_eq!(normalize_key(" "), "space");
        assert_eq!(normalize_key("Space"), "space");
    }
}
