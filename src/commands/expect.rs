//! [`Expect`] command — waits for the session to end with a given reason.
//!
//! Script syntax:
//! - `expect "Match"` — 5-second default timeout
//! - `expect "EndKey" 10s` — custom timeout

use crate::command::{Context, ScriptCommand};
use crate::parser::{parse_duration, split_args};
use crate::session::Status;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;

/// Waits until the session leaves `InProgress`, then checks the end reason.
///
/// Fails if the timeout elapses first or the session ended for another reason.
pub struct Expect {
    pub reason: String,
    pub timeout: Duration,
}

impl Expect {
    pub const NAME: &'static str = "expect";

    /// Create an `Expect` command with the default 5-second timeout.
    pub fn new(reason: impl Into<String>) -> Self {
        Self::with_timeout(reason, Duration::from_secs(5))
    }

    pub fn with_timeout(reason: impl Into<String>, timeout: Duration) -> Self {
        Self {
            reason: reason.into(),
            timeout,
        }
    }
}

#[async_trait(?Send)]
impl ScriptCommand for Expect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        if !args.trim_start().starts_with('"') {
            return Err(anyhow!("Expected quoted end reason after 'expect'"));
        }
        let args = split_args(args)?;
        match args.as_slice() {
            [reason] => Ok(Self::new(reason.clone())),
            [reason, timeout] => Ok(Self::with_timeout(reason.clone(), parse_duration(timeout)?)),
            _ => Err(anyhow!("Too many arguments for 'expect'")),
        }
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        if ctx.session().status() == Status::Idle {
            return Err(anyhow!("Session was never started"));
        }
        let reason = ctx.session().wait(Some(self.timeout)).await;
        if reason.is_empty() {
            return Err(anyhow!(
                "Timeout waiting for end reason: '{}'",
                self.reason
            ));
        }
        if !reason.eq_ignore_ascii_case(&self.reason) {
            return Err(anyhow!(
                "Expected end reason '{}', got '{}'",
                self.reason,
                reason
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_timeout() {
        let cmd = Expect::parse(r#""Match""#).unwrap();
        assert_eq!(cmd.reason, "Match");
        assert_eq!(cmd.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_custom_timeout() {
        let cmd = Expect::parse(r#""Timeout" 500ms"#).unwrap();
        assert_eq!(cmd.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Expect::parse(r#""unclosed"#).is_err());
        assert!(Expect::parse("Match").is_err());
        assert!(Expect::parse(r#""Match" 1s 2s"#).is_err());
    }
}
