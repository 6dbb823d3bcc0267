//! [`Start`] command — arms the session.
//!
//! Script syntax: `start`

use crate::command::{Context, ScriptCommand};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

/// Clears the buffer and starts capturing. Does nothing while already in progress.
pub struct Start;

impl Start {
    pub const NAME: &'static str = "start";
}

#[async_trait(?Send)]
impl ScriptCommand for Start {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        if !args.trim().is_empty() {
            return Err(anyhow!("'start' takes no arguments"));
        }
        Ok(Self)
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        ctx.session().start();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert!(Start::parse("").is_ok());
        assert!(Start::parse("now").is_err());
    }
}
