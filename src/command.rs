//! The [`ScriptCommand`] trait and the [`Context`] type commands receive when executed.

use crate::event::KeyEvent;
use crate::session::Session;
use crate::source::{Disposition, KeyBus};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub(crate) type OutputHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Execution context passed to [`ScriptCommand::execute`].
///
/// Provides the session under test, the key bus it subscribes to, and the
/// output handler.
pub struct Context {
    pub(crate) session: Session,
    pub(crate) bus: Arc<KeyBus>,
    pub(crate) output_handler: OutputHandler,
}

impl Context {
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Deliver a key-down and key-up pair through the bus.
    ///
    /// Returns what the sessions decided for the key-down event.
    pub fn press(&self, event: KeyEvent) -> Disposition {
        let disposition = self.bus.dispatch(&event);
        self.bus.dispatch(&event.up());
        disposition
    }

    /// Pass bytes through the output handler (e.g. to stdout or a custom sink).
    pub fn emit(&self, data: &[u8]) {
        (self.output_handler)(data);
    }

    /// Emit one line of text.
    pub fn emit_line(&self, line: &str) {
        let mut data = line.as_bytes().to_vec();
        data.push(b'\n');
        self.emit(&data);
    }
}

/// A single replay-script command.
///
/// Implement this trait to add a new command to the engine. Then:
///
/// 1. Define `pub const NAME: &'static str` on your struct — the script
///    keyword (e.g. `"press"`, `"expect"`) used by the parser.
/// 2. Re-export the struct from `src/commands/mod.rs`.
/// 3. Add one entry to the `REGISTRY` in [`crate::parser`]:
///    `(MyCmd::NAME, MyCmd::parse_boxed)`.
#[async_trait(?Send)]
pub trait ScriptCommand: 'static {
    /// The command name, accessible at runtime through a trait object.
    fn name(&self) -> &'static str;

    /// Parse this command from the argument string (everything after the
    /// command keyword on the script line).
    fn parse(args: &str) -> Result<Self>
    where
        Self: Sized;

    /// Parse and box this command. Used as the function-pointer type stored in
    /// the command registry.
    fn parse_boxed(args: &str) -> Result<Box<dyn ScriptCommand>>
    where
        Self: Sized,
    {
        Ok(Box::new(Self::parse(args)?))
    }

    /// Execute the command using the provided engine context.
    async fn execute(&self, ctx: &mut Context) -> Result<()>;
}
