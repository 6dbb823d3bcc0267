//! The capture session: a key-driven state machine with a bounded text buffer.

use crate::error::{Error, Result};
use crate::event::KeyEvent;
use crate::keys::{EndKeyTable, KeyFlags};
use crate::matcher::MatchList;
use crate::options::{MAX_SEND_LEVEL, Options};
use crate::source::{Disposition, KeySource};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-unique session identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SessionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session status. Terminal values stay until the session is started again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Idle,
    InProgress,
    /// An enabled end key was pressed.
    EndKey,
    /// A match-list phrase was typed.
    Match,
    /// [`Session::stop`] was called.
    Stopped,
    Timeout,
    /// A printable key arrived while the buffer was full.
    Max,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Idle | Status::InProgress)
    }

    /// The end-reason name; empty while idle or in progress.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle | Status::InProgress => "",
            Status::EndKey => "EndKey",
            Status::Match => "Match",
            Status::Stopped => "Stopped",
            Status::Timeout => "Timeout",
            Status::Max => "Max",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much detail [`Session::end_reason`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `EndKey`, `Match`, `Stopped`, `Timeout` or `Max`.
    #[default]
    Kind,
    /// The end key's identifier, or the matched phrase's index.
    Index,
    /// The end key's identifier, or the matched phrase itself.
    Text,
}

/// Completion callback, invoked once per run with the terminated session.
pub type OnEnd = Arc<dyn Fn(&Session) + Send + Sync>;

struct Capture {
    status: Status,
    buffer: Vec<char>,
    ending_key: Option<String>,
    ending_match: Option<usize>,
    options: Options,
    keys: EndKeyTable,
    matches: MatchList,
    deadline: Option<Instant>,
    run: u64,
}

impl Capture {
    fn new() -> Self {
        Capture {
            status: Status::Idle,
            buffer: Vec::new(),
            ending_key: None,
            ending_match: None,
            options: Options::default(),
            keys: EndKeyTable::new(),
            matches: MatchList::default(),
            deadline: None,
            run: 0,
        }
    }

    fn is_visible(&self, event: &KeyEvent, flags: KeyFlags) -> bool {
        if flags.contains(KeyFlags::VISIBILITY_OVERRIDE) {
            return flags.contains(KeyFlags::VISIBLE);
        }
        let is_text = if event.is_backspace() {
            self.options.backspace_is_undo
        } else {
            event.text.is_some()
                && !flags.intersects(KeyFlags::ENABLED | KeyFlags::IGNORE_TEXT)
        };
        if is_text {
            self.options.visible_text
        } else {
            self.options.visible_non_text
        }
    }

    /// Apply one key-down event. Returns the terminal status if it ended the run.
    fn collect(&mut self, event: &KeyEvent, flags: KeyFlags) -> Option<Status> {
        if flags.contains(KeyFlags::ENABLED) {
            self.ending_key = Some(event.key.clone());
            return Some(self.end(Status::EndKey));
        }
        if event.is_backspace() {
            if self.options.backspace_is_undo && self.buffer.pop().is_some() {
                return self.check_match();
            }
            return None;
        }
        let ch = event.text?;
        if flags.contains(KeyFlags::IGNORE_TEXT) || self.options.capacity == 0 {
            return None;
        }
        if self.buffer.len() >= self.options.capacity {
            return Some(self.end(Status::Max));
        }
        self.buffer.push(ch);
        self.check_match()
    }

    fn check_match(&mut self) -> Option<Status> {
        let index = self.matches.find(
            &self.buffer,
            self.options.find_anywhere,
            self.options.case_sensitive,
        )?;
        self.ending_match = Some(index);
        Some(self.end(Status::Match))
    }

    fn end(&mut self, status: Status) -> Status {
        self.status = status;
        self.deadline = None;
        status
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Deadline for a run; zero and unrepresentably far timeouts never expire.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    if timeout.is_zero() {
        return None;
    }
    Instant::now().checked_add(timeout)
}

struct Inner {
    id: SessionId,
    source: Arc<dyn KeySource>,
    capture: Mutex<Capture>,
    on_end: Mutex<Option<OnEnd>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = timer.take() {
            timer.abort();
        }
        let capture = self.capture.get_mut().unwrap_or_else(PoisonError::into_inner);
        if capture.status == Status::InProgress {
            self.source.unsubscribe(self.id);
        }
    }
}

/// A keystroke capture session.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

/// A non-owning session handle, as held by key sources.
#[derive(Clone)]
pub struct WeakSession {
    inner: Weak<Inner>,
}

impl WeakSession {
    pub fn upgrade(&self) -> Option<Session> {
        self.inner.upgrade().map(|inner| Session { inner })
    }

    /// Whether the session still exists, without taking a strong reference.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("status", &self.status())
            .finish()
    }
}

impl Session {
    /// Create an idle session with default options and no end keys or phrases.
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Session {
            inner: Arc::new(Inner {
                id: SessionId::next(),
                source,
                capture: Mutex::new(Capture::new()),
                on_end: Mutex::new(None),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Create a session and run [`Session::setup`] on it.
    pub fn create(
        source: Arc<dyn KeySource>,
        options: &str,
        end_keys: &str,
        match_list: &str,
    ) -> Result<Self> {
        let session = Self::new(source);
        session.setup(options, end_keys, match_list)?;
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn downgrade(&self) -> WeakSession {
        WeakSession {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Replace options, end keys and match list.
    ///
    /// Options start from their defaults before `options` is applied. On
    /// error nothing changes.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] for a malformed option string or end-key spec, and
    /// [`Error::InvalidUsage`] while a capture is in progress.
    pub fn setup(&self, options: &str, end_keys: &str, match_list: &str) -> Result<()> {
        let options: Options = options.parse()?;
        let keys = EndKeyTable::build(end_keys)?;
        let matches = MatchList::parse(match_list)?;

        let mut capture = lock(&self.inner.capture);
        if capture.status == Status::InProgress {
            return Err(Error::InvalidUsage(
                "Setup is not allowed while input is in progress".to_string(),
            ));
        }
        debug!(
            session = %self.inner.id,
            phrases = matches.len(),
            capacity = options.capacity,
            "Session configured"
        );
        capture.options = options;
        capture.keys = keys;
        capture.matches = matches;
        Ok(())
    }

    /// Arm the session: clear the buffer and end state and subscribe to keys.
    ///
    /// Does nothing while already in progress.
    pub fn start(&self) {
        let mut capture = lock(&self.inner.capture);
        if capture.status == Status::InProgress {
            return;
        }
        capture.buffer.clear();
        capture.ending_key = None;
        capture.ending_match = None;
        capture.status = Status::InProgress;
        capture.run += 1;
        capture.deadline = deadline_after(capture.options.timeout);
        debug!(session = %self.inner.id, run = capture.run, "Input started");
        self.inner.source.subscribe(self);
        self.arm_timer_locked(&capture);
    }

    /// Terminate an in-progress capture. Does nothing otherwise.
    pub fn stop(&self) {
        let run = {
            let mut capture = lock(&self.inner.capture);
            if capture.status != Status::InProgress {
                return;
            }
            capture.end(Status::Stopped);
            self.disarm();
            capture.run
        };
        self.finish(Status::Stopped, run);
    }

    /// Feed one key event into the session.
    ///
    /// Events arriving while the session is not in progress are ignored.
    pub fn handle_key(&self, event: &KeyEvent) -> Disposition {
        let (disposition, ended) = {
            let mut capture = lock(&self.inner.capture);
            if capture.status != Status::InProgress {
                return Disposition::PassThrough;
            }
            if event.send_level < capture.options.min_send_level {
                trace!(key = %event.key, level = event.send_level, "Ignoring low-level input");
                return Disposition::PassThrough;
            }
            let flags = capture.keys.flags(&event.key);
            let disposition = if capture.is_visible(event, flags) {
                Disposition::PassThrough
            } else {
                Disposition::Suppress
            };
            if !event.down {
                return disposition;
            }
            let mut ended = capture.collect(event, flags);
            // Keys win over a timeout that expired while no timer could run.
            if ended.is_none() && capture.deadline_passed() {
                ended = Some(capture.end(Status::Timeout));
            }
            if ended.is_some() {
                self.disarm();
            }
            (disposition, ended.map(|status| (status, capture.run)))
        };
        if let Some((status, run)) = ended {
            self.finish(status, run);
        }
        disposition
    }

    /// Replace flags on `keys` using a `+E-I+V` style option string.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOption`] for an unknown flag letter and
    /// [`Error::Parse`] for a malformed key list.
    pub fn key_opt(&self, keys: &str, options: &str) -> Result<()> {
        lock(&self.inner.capture).keys.mutate(keys, options)
    }

    pub fn key_flags(&self, key: &str) -> KeyFlags {
        lock(&self.inner.capture).keys.flags(key)
    }

    /// Text captured so far.
    pub fn input(&self) -> String {
        lock(&self.inner.capture).buffer.iter().collect()
    }

    pub fn in_progress(&self) -> bool {
        self.status() == Status::InProgress
    }

    pub fn status(&self) -> Status {
        lock(&self.inner.capture).status
    }

    /// Describe why the last run ended; empty while idle or in progress.
    pub fn end_reason(&self, verbosity: Verbosity) -> String {
        let capture = lock(&self.inner.capture);
        match (capture.status, verbosity) {
            (_, Verbosity::Kind) => capture.status.to_string(),
            (Status::EndKey, _) => capture.ending_key.clone().unwrap_or_default(),
            (Status::Match, Verbosity::Index) => capture
                .ending_match
                .map(|index| index.to_string())
                .unwrap_or_default(),
            (Status::Match, _) => capture
                .ending_match
                .and_then(|index| capture.matches.get(index))
                .unwrap_or_default()
                .to_string(),
            (status, _) => status.to_string(),
        }
    }

    /// The end key that terminated the run, or an empty string.
    pub fn end_key(&self) -> String {
        let capture = lock(&self.inner.capture);
        match capture.status {
            Status::EndKey => capture.ending_key.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// The phrase that terminated the run, or an empty string.
    pub fn end_match(&self) -> String {
        let capture = lock(&self.inner.capture);
        match (capture.status, capture.ending_match) {
            (Status::Match, Some(index)) => capture.matches.get(index).unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }

    pub fn ending_match_index(&self) -> Option<usize> {
        let capture = lock(&self.inner.capture);
        match capture.status {
            Status::Match => capture.ending_match,
            _ => None,
        }
    }

    pub fn options(&self) -> Options {
        lock(&self.inner.capture).options.clone()
    }

    pub fn match_list(&self) -> MatchList {
        lock(&self.inner.capture).matches.clone()
    }

    pub fn end_keys(&self) -> EndKeyTable {
        lock(&self.inner.capture).keys.clone()
    }

    fn update_options(&self, update: impl FnOnce(&mut Options)) {
        update(&mut lock(&self.inner.capture).options);
    }

    pub fn set_case_sensitive(&self, value: bool) {
        self.update_options(|options| options.case_sensitive = value);
    }

    pub fn set_find_anywhere(&self, value: bool) {
        self.update_options(|options| options.find_anywhere = value);
    }

    pub fn set_backspace_is_undo(&self, value: bool) {
        self.update_options(|options| options.backspace_is_undo = value);
    }

    pub fn set_visible_text(&self, value: bool) {
        self.update_options(|options| options.visible_text = value);
    }

    pub fn set_visible_non_text(&self, value: bool) {
        self.update_options(|options| options.visible_non_text = value);
    }

    pub fn set_min_send_level(&self, level: u8) -> Result<()> {
        if level > MAX_SEND_LEVEL {
            return Err(Error::InvalidUsage(format!(
                "MinSendLevel must be between 0 and {MAX_SEND_LEVEL}, got {level}"
            )));
        }
        self.update_options(|options| options.min_send_level = level);
        Ok(())
    }

    /// Change the timeout. While in progress the alarm is re-armed relative to now.
    pub fn set_timeout(&self, timeout: Duration) {
        let mut capture = lock(&self.inner.capture);
        capture.options.timeout = timeout;
        if capture.status == Status::InProgress {
            capture.deadline = deadline_after(timeout);
            self.arm_timer_locked(&capture);
        }
    }

    pub fn on_end(&self) -> Option<OnEnd> {
        lock(&self.inner.on_end).clone()
    }

    /// Replace the completion callback; the previous one is released.
    pub fn set_on_end(&self, callback: Option<OnEnd>) {
        let previous = std::mem::replace(&mut *lock(&self.inner.on_end), callback);
        drop(previous);
    }

    /// Arm the timeout alarm if the run has a deadline but no timer yet.
    pub(crate) fn ensure_timer(&self) {
        let capture = lock(&self.inner.capture);
        let armed = lock(&self.inner.timer).is_some();
        if !armed {
            self.arm_timer_locked(&capture);
        }
    }

    /// Replace the alarm for the current run. Callers hold the capture lock.
    fn arm_timer_locked(&self, capture: &Capture) {
        let mut timer = lock(&self.inner.timer);
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        if capture.status != Status::InProgress {
            return;
        }
        let Some(deadline) = capture.deadline else {
            return;
        };
        let run = capture.run;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let session = self.downgrade();
                *timer = Some(runtime.spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    if let Some(session) = session.upgrade() {
                        session.expire(run);
                    }
                }));
            }
            Err(_) => warn!(
                session = %self.inner.id,
                "No async runtime, timeout is only checked when keys arrive"
            ),
        }
    }

    fn expire(&self, run: u64) {
        {
            let mut capture = lock(&self.inner.capture);
            if capture.status != Status::InProgress || capture.run != run || !capture.deadline_passed()
            {
                return;
            }
            capture.end(Status::Timeout);
            self.disarm();
        }
        self.finish(Status::Timeout, run);
    }

    /// Drop the alarm and the subscription of a run that just ended.
    ///
    /// Callers hold the capture lock, so a concurrent `start` either happens
    /// before the run ended or re-subscribes after this returns.
    fn disarm(&self) {
        if let Some(timer) = lock(&self.inner.timer).take() {
            timer.abort();
        }
        self.inner.source.unsubscribe(self.inner.id);
    }

    /// Notify the callback that `run` ended, unless it has already been restarted.
    fn finish(&self, status: Status, run: u64) {
        info!(session = %self.inner.id, reason = %status, "Input ended");
        if lock(&self.inner.capture).run != run {
            debug!(session = %self.inner.id, run, "Restarted before notification");
            return;
        }
        let callback = self.on_end();
        if let Some(callback) = callback {
            callback(self);
        }
    }
}
