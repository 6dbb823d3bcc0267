//! [`SetProperty`] command — writes a session option.
//!
//! Script syntax: `set Timeout 2.5`, `set CaseSensitive 1`

use crate::command::{Context, ScriptCommand};
use crate::error::Error;
use crate::parser::split_args;
use crate::property::Property;
use anyhow::{Result, anyhow};
use async_trait::async_trait;

pub struct SetProperty {
    pub property: Property,
    pub value: String,
}

impl SetProperty {
    pub const NAME: &'static str = "set";
}

#[async_trait(?Send)]
impl ScriptCommand for SetProperty {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        let mut args = split_args(args)?.into_iter();
        let (Some(name), Some(value), None) = (args.next(), args.next(), args.next()) else {
            return Err(anyhow!("Expected 'set <Property> <value>'"));
        };
        let property: Property = name.parse()?;
        if !property.is_writable() {
            return Err(Error::InvalidUsage(format!("{property} is read-only")).into());
        }
        Ok(Self { property, value })
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        ctx.session().set(self.property, &self.value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let cmd = SetProperty::parse("findanywhere 1").unwrap();
        assert_eq!(cmd.property, Property::FindAnywhere);
        assert_eq!(cmd.value, "1");
    }

    #[test]
    fn test_parse_read_only() {
        let err = SetProperty::parse("Input abc").err().unwrap();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidUsage(_))
        ));
    }

    #[test]
    fn test_parse_missing_value() {
        assert!(SetProperty::parse("Timeout").is_err());
    }
}
