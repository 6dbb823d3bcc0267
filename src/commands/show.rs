//! [`Show`] command — writes a line of text to the output handler.
//!
//! Script syntax: `show "== round two =="`

use crate::command::{Context, ScriptCommand};
use crate::parser::parse_quoted_string;
use anyhow::Result;
use async_trait::async_trait;

/// Annotates the script output; nothing is sent to the session.
pub struct Show {
    pub text: String,
}

impl Show {
    pub const NAME: &'static str = "show";
}

#[async_trait(?Send)]
impl ScriptCommand for Show {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        Ok(Self {
            text: parse_quoted_string(args)?,
        })
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        ctx.emit_line(&self.text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unclosed_quote() {
        assert!(Show::parse(r#""unclosed"#).is_err());
    }
}
