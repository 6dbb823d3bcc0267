//! [`KeyOpt`] command — changes end-key, ignore and visibility flags.
//!
//! Script syntax: `keyopt "{Enter}{Esc}" "-E +V"`

use crate::command::{Context, ScriptCommand};
use crate::error::Error;
use crate::parser::split_args;
use anyhow::{Result, anyhow};
use async_trait::async_trait;

pub struct KeyOpt {
    pub keys: String,
    pub options: String,
}

impl KeyOpt {
    pub const NAME: &'static str = "keyopt";
}

#[async_trait(?Send)]
impl ScriptCommand for KeyOpt {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        let mut args = split_args(args)?.into_iter();
        match (args.next(), args.next(), args.next()) {
            (Some(keys), Some(options), None) => Ok(Self { keys, options }),
            (_, None, _) => Err(Error::TooFewParams.into()),
            _ => Err(anyhow!("Too many arguments for 'keyopt'")),
        }
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        ctx.session().key_opt(&self.keys, &self.options)?;
        Ok(())
    }
}
