//! [`Print`] command — emits a property as `Name: value`.
//!
//! Script syntax: `print Input`

use crate::command::{Context, ScriptCommand};
use crate::property::Property;
use anyhow::Result;
use async_trait::async_trait;

pub struct Print {
    pub property: Property,
}

impl Print {
    pub const NAME: &'static str = "print";
}

#[async_trait(?Send)]
impl ScriptCommand for Print {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        Ok(Self {
            property: args.parse()?,
        })
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        let value = ctx.session().get(self.property);
        ctx.emit_line(&format!("{}: {}", self.property, value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Print::parse("endreason").unwrap().property, Property::EndReason);
        assert!(Print::parse("Nope").is_err());
    }
}
