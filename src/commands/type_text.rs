//! [`TypeText`] command — simulates a human typing characters one at a time.
//!
//! Script syntax: `type "text here"`

use crate::command::{Context, ScriptCommand};
use crate::event::KeyEvent;
use crate::parser::parse_quoted_string;
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Presses each character of `text` at send level 0 with a random delay
/// between keystrokes, so timers and waiters run while "typing".
///
/// Typing stops early once the session is no longer in progress, like a user
/// who notices the prompt has closed.
pub struct TypeText {
    pub text: String,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl TypeText {
    pub const NAME: &'static str = "type";

    /// Create a `TypeText` command with default timing (20–60 ms per character).
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_timing(text, Duration::from_millis(20), Duration::from_millis(60))
    }

    /// Create a `TypeText` command with custom per-character timing.
    pub fn with_timing(text: impl Into<String>, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            text: text.into(),
            min_delay,
            max_delay,
        }
    }

    /// A random delay between the two bounds, whichever order they were given in.
    fn next_delay(&self) -> Duration {
        let low = self.min_delay.min(self.max_delay).as_millis();
        let high = self.min_delay.max(self.max_delay).as_millis();
        // The rng is dropped here, before the caller awaits.
        let ms = rand::thread_rng().gen_range(low..=high);
        Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
    }
}

#[async_trait(?Send)]
impl ScriptCommand for TypeText {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        Ok(Self::new(parse_quoted_string(args)?))
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        for ch in self.text.chars() {
            if !ctx.session().in_progress() {
                break;
            }
            ctx.press(KeyEvent::char(ch));
            sleep(self.next_delay()).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let cmd = TypeText::parse(r#""hello world""#).unwrap();
        assert_eq!(cmd.text, "hello world");
    }

    #[test]
    fn test_parse_escapes() {
        let cmd = TypeText::parse(r#""say \"hi\"\n""#).unwrap();
        assert_eq!(cmd.text, "say \"hi\"\n");
    }

    #[test]
    fn test_default_timing() {
        let cmd = TypeText::new("hello");
        assert_eq!(cmd.min_delay, Duration::from_millis(20));
        assert_eq!(cmd.max_delay, Duration::from_millis(60));
    }

    #[test]
    fn test_reversed_timing_bounds() {
        let cmd = TypeText::with_timing("x", Duration::from_millis(50), Duration::from_millis(10));
        for _ in 0..20 {
            let delay = cmd.next_delay();
            assert!(delay >= Duration::from_millis(10) && delay <= Duration::from_millis(50));
        }
    }
}
