//! Blocking-style connection facade over a non-blocking [`RecordEngine`].
//!
//! Every operation either completes or returns `-1` with a
//! [`RetryIntent`] telling the caller which readiness event to wait for
//! before repeating the same call. Resumable progress (strict writes,
//! shutdown) lives on the [`Connection`], never in locals.

mod read;
mod shutdown;
mod state;
mod stream;
mod write;

pub use state::{RetryIntent, ShutdownFlags};

use crate::config::ShimConfig;
use crate::error::ErrorQueue;
use crate::record::{EngineError, IoOutcome, RecordEngine};
use crate::wire::{Endpoint, WireState};
use state::LegacyState;

/// How the last numeric return should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call succeeded.
    None,
    /// The peer closed the connection with close_notify.
    ZeroReturn,
    /// Repeat the call once the transport is readable.
    WantRead,
    /// Repeat the call once the transport is writable.
    WantWrite,
    /// Transport-level failure or unexpected end of stream, no diagnostic.
    Syscall,
    /// Protocol or usage failure; see the error queue.
    Protocol,
}

/// Per-session state, created when the handshake begins.
#[derive(Debug)]
pub struct ConnectionContext<E> {
    engine: E,
    handshake_completed: bool,
    close_notify_sent: bool,
    close_notify_received: bool,
    last_error: Option<EngineError>,
}

impl<E: RecordEngine> ConnectionContext<E> {
    fn new(engine: E) -> Self {
        Self {
            engine,
            handshake_completed: false,
            close_notify_sent: false,
            close_notify_received: false,
            last_error: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn is_handshake_completed(&self) -> bool {
        self.handshake_completed
    }

    pub fn close_notify_sent(&self) -> bool {
        self.close_notify_sent
    }

    pub fn close_notify_received(&self) -> bool {
        self.close_notify_received
    }

    pub fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    /// Pull what the engine's alert and error layers recorded during the call
    /// that just returned.
    fn observe(&mut self, state: &mut LegacyState) {
        if !self.close_notify_received && self.engine.close_notify_received() {
            tracing::debug!("peer close_notify received");
            self.close_notify_received = true;
            state.shutdown.insert(ShutdownFlags::RECEIVED);
        }
        if let Some(description) = self.engine.fatal_alert() {
            state.record_fatal_alert(description);
        }
        if let Some(err) = self.engine.take_error() {
            self.last_error = Some(err);
        }
    }

    /// Advance an unfinished handshake. A completed handshake is reported as
    /// `resume` so the caller comes back for the operation it asked for.
    fn step_handshake(&mut self, state: &mut LegacyState, resume: IoOutcome) -> i32 {
        let outcome = self.engine.drive_handshake(state);
        self.observe(state);
        match outcome {
            IoOutcome::Success => {
                tracing::debug!("handshake completed");
                self.handshake_completed = true;
                state.return_code(resume, None)
            }
            IoOutcome::Bytes(n) if n > 0 => state.return_code(resume, None),
            other => state.return_code(other, self.last_error.as_ref()),
        }
    }
}

/// A connection speaking the legacy synchronous read/write/shutdown contract.
#[derive(Debug)]
pub struct Connection<E> {
    state: LegacyState,
    ctx: Option<ConnectionContext<E>>,
}

impl<E: RecordEngine> Connection<E> {
    pub fn new(config: ShimConfig) -> Self {
        Self {
            state: LegacyState::new(&config),
            ctx: None,
        }
    }

    /// Endpoint the record engine reads from.
    pub fn set_read_endpoint(&mut self, endpoint: impl Endpoint + 'static) {
        self.state.wire.set_read_endpoint(Box::new(endpoint));
    }

    /// Endpoint the record engine writes to.
    pub fn set_write_endpoint(&mut self, endpoint: impl Endpoint + 'static) {
        self.state.wire.set_write_endpoint(Box::new(endpoint));
    }

    /// Start a new session driven by `engine`. Any previous session is
    /// dropped.
    pub fn begin(&mut self, engine: E) {
        if self.ctx.is_some() {
            self.state.reset_session();
        }
        self.ctx = Some(ConnectionContext::new(engine));
    }

    /// Drop the current session, keeping endpoints and configuration.
    pub fn clear(&mut self) -> Option<E> {
        self.state.reset_session();
        self.ctx.take().map(|ctx| ctx.engine)
    }

    pub fn context(&self) -> Option<&ConnectionContext<E>> {
        self.ctx.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut ConnectionContext<E>> {
        self.ctx.as_mut()
    }

    pub fn is_handshake_completed(&self) -> bool {
        self.ctx.as_ref().is_some_and(|ctx| ctx.handshake_completed)
    }

    pub fn retry_intent(&self) -> RetryIntent {
        self.state.retry_intent
    }

    pub fn wire_state(&self) -> WireState {
        self.state.wire_state()
    }

    /// Bytes of an unfinished strict write already accepted.
    pub fn carried_sent(&self) -> usize {
        self.state.carried_sent
    }

    pub fn partial_write(&self) -> bool {
        self.state.partial_write
    }

    pub fn set_partial_write(&mut self, enabled: bool) {
        self.state.partial_write = enabled;
    }

    pub fn quiet_shutdown(&self) -> bool {
        self.state.quiet_shutdown
    }

    pub fn set_quiet_shutdown(&mut self, enabled: bool) {
        self.state.quiet_shutdown = enabled;
    }

    pub fn shutdown_flags(&self) -> ShutdownFlags {
        self.state.shutdown
    }

    pub fn set_shutdown_flags(&mut self, flags: ShutdownFlags) {
        self.state.shutdown = flags;
    }

    pub fn errors(&self) -> &ErrorQueue {
        &self.state.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorQueue {
        &mut self.state.errors
    }

    /// Decrypted application bytes ready to read. Never negative; 0 when
    /// there is no session or the count does not fit the return type.
    pub fn pending(&self) -> i32 {
        let Some(ctx) = self.ctx.as_ref() else {
            return 0;
        };
        i32::try_from(ctx.engine.pending_application_data()).unwrap_or(0)
    }

    /// Classify the value returned by the last numeric call.
    pub fn error_kind(&self, ret: i32) -> ErrorKind {
        if ret > 0 {
            return ErrorKind::None;
        }
        match self.state.retry_intent {
            RetryIntent::WantsRead => return ErrorKind::WantRead,
            RetryIntent::WantsWrite => return ErrorKind::WantWrite,
            RetryIntent::None => {}
        }
        if ret == 0 && self.state.shutdown.contains(ShutdownFlags::RECEIVED) {
            return ErrorKind::ZeroReturn;
        }
        if self.state.errors.is_empty() {
            ErrorKind::Syscall
        } else {
            ErrorKind::Protocol
        }
    }
}
