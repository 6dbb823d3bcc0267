use crate::command::{Context, OutputHandler, ScriptCommand};
use crate::session::Session;
use crate::source::KeyBus;
use anyhow::{Context as _, Result};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

/// Replays scripts against a capture session through an in-process key bus.
pub struct Engine {
    ctx: Context,
}

impl Engine {
    /// Create a session from `Setup` arguments and write output to stdout.
    pub fn new(options: &str, end_keys: &str, match_list: &str) -> Result<Self> {
        Self::with_handler(options, end_keys, match_list, |data| {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(data);
            let _ = stdout.flush();
        })
    }

    /// Like [`Engine::new`], with a custom output handler.
    pub fn with_handler(
        options: &str,
        end_keys: &str,
        match_list: &str,
        handler: impl Fn(&[u8]) + Send + Sync + 'static,
    ) -> Result<Self> {
        let bus = Arc::new(KeyBus::new());
        let session = Session::create(bus.clone(), options, end_keys, match_list)
            .context("Failed to set up input session")?;
        let output_handler: OutputHandler = Arc::new(handler);
        Ok(Engine {
            ctx: Context {
                session,
                bus,
                output_handler,
            },
        })
    }

    pub fn session(&self) -> &Session {
        &self.ctx.session
    }

    pub fn bus(&self) -> &Arc<KeyBus> {
        &self.ctx.bus
    }

    /// Execute a sequence of commands, stopping at the first failure.
    pub async fn execute(&mut self, commands: Vec<Box<dyn ScriptCommand>>) -> Result<()> {
        for (index, cmd) in commands.iter().enumerate() {
            debug!(step = index + 1, command = cmd.name(), "Executing");
            cmd.execute(&mut self.ctx)
                .await
                .with_context(|| format!("Command {} ({}) failed", index + 1, cmd.name()))?;
        }
        Ok(())
    }
}
