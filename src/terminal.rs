//! Live key source backed by the terminal.
//!
//! A background thread reads crossterm key events and forwards them over a
//! channel; [`capture`] feeds them into a [`KeyBus`] until the session ends.

use crate::event::KeyEvent;
use crate::session::Session;
use crate::source::KeyBus;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::debug;

/// Input read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalInput {
    Key(KeyEvent),
    /// Ctrl+C; raw mode swallows the signal, so it is reported instead.
    Interrupt,
}

/// Spawns a background thread reading terminal key events.
pub fn spawn_reader() -> UnboundedReceiver<TerminalInput> {
    let (tx, rx) = unbounded_channel();

    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(Event::Key(key)) => {
                    let Some(input) = translate(key) else {
                        continue;
                    };
                    if tx.send(input).is_err() {
                        break; // Receiver dropped
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });

    rx
}

/// Convert a crossterm key event. Keys without a name are dropped.
pub fn translate(key: event::KeyEvent) -> Option<TerminalInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(TerminalInput::Interrupt);
    }
    let down = key.kind != KeyEventKind::Release;
    let mut ev = match key.code {
        KeyCode::Char(ch) => {
            let mut ev = KeyEvent::char(ch);
            // Control and Alt chords do not produce text.
            if key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            {
                ev.text = None;
            }
            ev
        }
        KeyCode::Enter => KeyEvent::named("Enter"),
        KeyCode::Tab => KeyEvent::named("Tab"),
        KeyCode::BackTab => KeyEvent::named("BackTab"),
        KeyCode::Backspace => KeyEvent::named("Backspace"),
        KeyCode::Esc => KeyEvent::named("Escape"),
        KeyCode::Delete => KeyEvent::named("Delete"),
        KeyCode::Insert => KeyEvent::named("Insert"),
        KeyCode::Home => KeyEvent::named("Home"),
        KeyCode::End => KeyEvent::named("End"),
        KeyCode::PageUp => KeyEvent::named("PgUp"),
        KeyCode::PageDown => KeyEvent::named("PgDn"),
        KeyCode::Left => KeyEvent::named("Left"),
        KeyCode::Right => KeyEvent::named("Right"),
        KeyCode::Up => KeyEvent::named("Up"),
        KeyCode::Down => KeyEvent::named("Down"),
        KeyCode::F(n) => KeyEvent::named(&format!("F{n}")),
        _ => return None,
    };
    ev.down = down;
    Some(TerminalInput::Key(ev))
}

/// Restores cooked mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Start `session` and feed it terminal keys until it is no longer in progress.
///
/// Ctrl+C stops the session.
pub async fn capture(session: &Session, bus: &KeyBus) -> Result<()> {
    let _raw = RawModeGuard::enable()?;
    let mut rx = spawn_reader();
    session.start();
    while session.in_progress() {
        match tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
            Ok(Some(TerminalInput::Key(ev))) => {
                bus.dispatch(&ev);
            }
            Ok(Some(TerminalInput::Interrupt)) => {
                debug!("Interrupted from terminal");
                session.stop();
            }
            Ok(None) => {
                debug!("Terminal reader closed");
                session.stop();
            }
            Err(_) => {}
        }
    }
    Ok(())
}
