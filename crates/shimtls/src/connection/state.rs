//! Facade-side connection state and the outcome → legacy return translation.

use bitflags::bitflags;

use crate::alert::AlertDescription;
use crate::config::ShimConfig;
use crate::error::{report_failure, Diagnostic, ErrorQueue};
use crate::record::{EngineError, IoOutcome, WireIo};
use crate::wire::{Wire, WireOutcome, WireState};
use shimtls_types::ReasonCode;

/// Readiness the caller must wait for before repeating the last call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryIntent {
    #[default]
    None,
    WantsRead,
    WantsWrite,
}

bitflags! {
    /// Which directions of the connection are closed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShutdownFlags: u8 {
        /// Our close_notify has been sent.
        const SENT = 0x01;
        /// The peer's close_notify has been received.
        const RECEIVED = 0x02;
    }
}

/// State the legacy facade keeps for its whole lifetime, across sessions.
#[derive(Debug, Default)]
pub(crate) struct LegacyState {
    pub(crate) wire: Wire,
    pub(crate) retry_intent: RetryIntent,
    pub(crate) partial_write: bool,
    pub(crate) quiet_shutdown: bool,
    /// Bytes of the in-progress strict write already accepted by the engine.
    pub(crate) carried_sent: usize,
    pub(crate) shutdown: ShutdownFlags,
    pub(crate) fatal_alert: Option<AlertDescription>,
    pub(crate) errors: ErrorQueue,
}

impl LegacyState {
    pub(crate) fn new(config: &ShimConfig) -> Self {
        Self {
            partial_write: config.partial_write,
            quiet_shutdown: config.quiet_shutdown,
            ..Self::default()
        }
    }

    /// Forget everything tied to the previous session.
    pub(crate) fn reset_session(&mut self) {
        self.retry_intent = RetryIntent::None;
        self.carried_sent = 0;
        self.shutdown = ShutdownFlags::empty();
        self.fatal_alert = None;
        self.errors.clear();
    }

    pub(crate) fn wire_state(&self) -> WireState {
        self.wire.state()
    }

    /// Note a fatal alert from the alert layer, queueing its diagnostic once.
    #[track_caller]
    pub(crate) fn record_fatal_alert(&mut self, description: AlertDescription) {
        if self.fatal_alert.is_some() {
            return;
        }
        tracing::debug!(alert = %description, "fatal alert recorded");
        self.fatal_alert = Some(description);
        self.errors
            .push(Diagnostic::new(ReasonCode::FatalAlert(description as u8)));
    }

    /// Fail the call without involving the engine.
    #[track_caller]
    pub(crate) fn reject(&mut self, reason: ReasonCode) -> i32 {
        self.retry_intent = RetryIntent::None;
        self.errors.push(Diagnostic::new(reason));
        -1
    }

    /// Validate a caller-supplied length against its buffer.
    #[track_caller]
    pub(crate) fn check_len(&mut self, buf_len: usize, len: i32) -> Result<usize, i32> {
        match usize::try_from(len) {
            Ok(len) if len <= buf_len => Ok(len),
            _ => Err(self.reject(ReasonCode::BadLength)),
        }
    }

    #[track_caller]
    pub(crate) fn internal_error(&mut self) -> i32 {
        tracing::warn!("record engine broke its outcome contract");
        self.reject(ReasonCode::InternalError)
    }

    /// Translate an engine outcome into the legacy return contract, updating
    /// the retry intent and the diagnostic queue.
    #[track_caller]
    pub(crate) fn return_code(&mut self, outcome: IoOutcome, last_error: Option<&EngineError>) -> i32 {
        match outcome {
            IoOutcome::Bytes(n) if n > 0 => match i32::try_from(n) {
                Ok(ret) => {
                    self.retry_intent = RetryIntent::None;
                    ret
                }
                Err(_) => self.internal_error(),
            },
            IoOutcome::Success => {
                self.retry_intent = RetryIntent::None;
                1
            }
            IoOutcome::Bytes(_) | IoOutcome::Eof => {
                self.retry_intent = RetryIntent::None;
                0
            }
            IoOutcome::Failure | IoOutcome::Alert => {
                self.retry_intent = RetryIntent::None;
                report_failure(&mut self.errors, self.fatal_alert, last_error);
                -1
            }
            IoOutcome::WantPollIn => {
                tracing::debug!("retry once readable");
                self.retry_intent = RetryIntent::WantsRead;
                -1
            }
            IoOutcome::WantPollOut => {
                tracing::debug!("retry once writable");
                self.retry_intent = RetryIntent::WantsWrite;
                -1
            }
            IoOutcome::WantRetry => self.internal_error(),
        }
    }
}

impl WireIo for LegacyState {
    fn wire_read(&mut self, buf: &mut [u8]) -> WireOutcome {
        self.wire.read(buf, &mut self.errors)
    }

    fn wire_write(&mut self, buf: &[u8]) -> WireOutcome {
        self.wire.write(buf, &mut self.errors)
    }
}
