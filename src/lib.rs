//! # Inputhook
//!
//! An asynchronous keystroke capture engine.
//!
//! A [`Session`] is armed with [`Session::start`], observes key events from a
//! [`KeySource`], accumulates the text they produce into a bounded buffer and
//! terminates itself when one of several conditions fires:
//!
//! | End reason | Trigger |
//! |------------|---------|
//! | `EndKey` | a key flagged as end key is pressed |
//! | `Match` | a match-list phrase ends the buffer (or occurs anywhere with `*`) |
//! | `Max` | a printable key arrives while the buffer is full |
//! | `Stopped` | [`Session::stop`] is called |
//! | `Timeout` | the session timeout elapses |
//!
//! ## Quick start
//!
//! ```
//! use inputhook::{KeyBus, KeyEvent, Session, Status};
//! use std::sync::Arc;
//!
//! let bus = Arc::new(KeyBus::new());
//! let session = Session::create(bus.clone(), "C", "{Enter}{Esc}", "yes,no")?;
//! session.start();
//!
//! for ch in "maybe yes".chars() {
//!     bus.dispatch(&KeyEvent::char(ch));
//! }
//!
//! assert_eq!(session.status(), Status::Match);
//! assert_eq!(session.end_match(), "yes");
//! assert_eq!(session.input(), "maybe yes");
//! # Ok::<(), inputhook::Error>(())
//! ```
//!
//! ## Waiting
//!
//! [`Session::wait`] yields to the tokio runtime between polls, so key events,
//! timeouts and other tasks keep running while a caller waits:
//!
//! ```no_run
//! use inputhook::{KeyBus, Session};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bus = Arc::new(KeyBus::new());
//!     let session = Session::create(bus, "T5", "{Enter}", "")?;
//!     session.start();
//!     let reason = session.wait(Some(Duration::from_secs(1))).await;
//!     println!("ended with {reason:?}, still running: {}", session.in_progress());
//!     Ok(())
//! }
//! ```
//!
//! ## Option string
//!
//! See [`options`] for the letters accepted by [`Session::setup`]. End keys are
//! written as a key list (`{Enter}{Esc}.`) optionally followed by a flag block
//! (`{Tab} -E +I`); see [`keys`]. Match lists are comma separated, with `,,`
//! standing for a literal comma.
//!
//! ## Replay scripts
//!
//! The [`Engine`] drives a session from a small script language, useful for
//! testing capture configurations without a real keyboard:
//!
//! ```no_run
//! use inputhook::{Engine, parse_str};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let script = r#"
//! start
//! type "hello wor"
//! press {Backspace}
//! type "rld"
//! expect "Match" 2s
//! print Input
//! "#;
//!
//!     let mut engine = Engine::new("", "{Esc}", "world")?;
//!     engine.execute(parse_str(script)?).await?;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod commands;
pub mod engine;
pub mod error;
pub mod event;
pub mod keys;
pub mod matcher;
pub mod options;
pub mod parser;
pub mod property;
pub mod session;
pub mod source;
pub mod terminal;
pub mod wait;

pub use command::{Context, ScriptCommand};
pub use engine::Engine;
pub use error::{Error, Result};
pub use event::KeyEvent;
pub use keys::{EndKeyTable, KeyFlags};
pub use matcher::MatchList;
pub use options::Options;
pub use parser::{parse_file, parse_str};
pub use property::{Property, PropertyValue};
pub use session::{OnEnd, Session, SessionId, Status, Verbosity, WeakSession};
pub use source::{Disposition, KeyBus, KeySource};
pub use wait::{HostPump, TokioPump};
