//! [`SendInput`] command — injects characters instantly at a send level.
//!
//! Script syntax: `send "text"` or `send "text" 50`

use crate::command::{Context, ScriptCommand};
use crate::event::KeyEvent;
use crate::parser::{parse_level, split_args};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

/// Presses every character of `text` back to back, tagged with `level`.
///
/// Models synthetic input; sessions with a higher minimum send level ignore it.
pub struct SendInput {
    pub text: String,
    pub level: u8,
}

impl SendInput {
    pub const NAME: &'static str = "send";
}

#[async_trait(?Send)]
impl ScriptCommand for SendInput {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        if !args.trim_start().starts_with('"') {
            return Err(anyhow!("Expected quoted string after 'send'"));
        }
        let args = split_args(args)?;
        if args.len() > 2 {
            return Err(anyhow!("Too many arguments for 'send'"));
        }
        Ok(Self {
            text: args[0].clone(),
            level: parse_level(args.get(1))?,
        })
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        for ch in self.text.chars() {
            ctx.press(KeyEvent::char(ch).with_level(self.level));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_level() {
        let cmd = SendInput::parse(r#""hello""#).unwrap();
        assert_eq!(cmd.text, "hello");
        assert_eq!(cmd.level, 0);
    }

    #[test]
    fn test_parse_level() {
        let cmd = SendInput::parse(r#""x" 75"#).unwrap();
        assert_eq!(cmd.level, 75);
    }

    #[test]
    fn test_parse_requires_quotes() {
        assert!(SendInput::parse("hello").is_err());
        assert!(SendInput::parse("").is_err());
    }
}
