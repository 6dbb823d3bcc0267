//! [`Stop`] command — ends an in-progress capture.
//!
//! Script syntax: `stop`

use crate::command::{Context, ScriptCommand};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

pub struct Stop;

impl Stop {
    pub const NAME: &'static str = "stop";
}

#[async_trait(?Send)]
impl ScriptCommand for Stop {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        if !args.trim().is_empty() {
            return Err(anyhow!("'stop' takes no arguments"));
        }
        Ok(Self)
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        ctx.session().stop();
        Ok(())
    }
}
