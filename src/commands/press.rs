//! [`Press`] command — delivers one key press to the session.
//!
//! Script syntax:
//! - `press a` — a printable key
//! - `press {Enter}` — a named key
//! - `press {Enter} 50` — sent at synthetic input level 50

use crate::command::{Context, ScriptCommand};
use crate::event::KeyEvent;
use crate::parser::{parse_key, parse_level, split_args};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

/// Sends a key-down and key-up pair through the key bus.
pub struct Press {
    pub event: KeyEvent,
}

impl Press {
    pub const NAME: &'static str = "press";
}

#[async_trait(?Send)]
impl ScriptCommand for Press {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        // Quoting is optional so `press " "` can name the space bar.
        let args = split_args(args)?;
        let key = args
            .first()
            .ok_or_else(|| anyhow!("Expected a key after 'press'"))?;
        if args.len() > 2 {
            return Err(anyhow!("Too many arguments for 'press'"));
        }
        let level = parse_level(args.get(1))?;
        Ok(Self {
            event: parse_key(key)?.with_level(level),
        })
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        ctx.press(self.event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_char() {
        let cmd = Press::parse("a").unwrap();
        assert_eq!(cmd.event, KeyEvent::char('a'));
    }

    #[test]
    fn test_parse_named_with_level() {
        let cmd = Press::parse("{Esc} 30").unwrap();
        assert_eq!(cmd.event.key, "escape");
        assert_eq!(cmd.event.send_level, 30);
    }

    #[test]
    fn test_parse_quoted_space() {
        let cmd = Press::parse(r#"" ""#).unwrap();
        assert_eq!(cmd.event.key, "space");
        assert_eq!(cmd.event.text, Some(' '));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Press::parse("").is_err());
        assert!(Press::parse("a 101").is_err());
        assert!(Press::parse("a 1 2").is_err());
    }
}
