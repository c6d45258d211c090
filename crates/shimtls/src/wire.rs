//! Transport endpoints and the adapter the record engine reads and writes
//! raw bytes through.

use std::fmt;
use std::io::{self, Read, Write};

use crate::error::{Diagnostic, ErrorQueue};
use shimtls_types::ReasonCode;

/// Readiness event a blocked transport is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Readable,
    Writable,
}

/// Outcome of a single transport operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireOutcome {
    Bytes(usize),
    /// Zero bytes read without error. Never produced by writes.
    Eof,
    WantPollIn,
    WantPollOut,
    Failure,
}

impl From<Readiness> for WireOutcome {
    fn from(readiness: Readiness) -> Self {
        match readiness {
            Readiness::Readable => WireOutcome::WantPollIn,
            Readiness::Writable => WireOutcome::WantPollOut,
        }
    }
}

/// Direction the transport was last busy in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireState {
    #[default]
    Idle,
    Reading,
    Writing,
}

/// A byte-stream transport endpoint.
///
/// `WouldBlock` and `Interrupted` errors are readiness signals. When the
/// endpoint needs the opposite readiness from the operation it was asked to
/// do (a write that must first read), it says so through
/// [`retry_hint`](Endpoint::retry_hint).
pub trait Endpoint {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Readiness the last blocked operation is waiting on.
    fn retry_hint(&self) -> Option<Readiness> {
        None
    }
}

/// [`Endpoint`] over any `Read + Write` stream.
pub struct IoEndpoint<S> {
    inner: S,
}

impl<S: Read + Write> IoEndpoint<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: Read + Write> Endpoint for IoEndpoint<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }
}

/// The read and write endpoints bound to a connection.
#[derive(Default)]
pub(crate) struct Wire {
    read_endpoint: Option<Box<dyn Endpoint>>,
    write_endpoint: Option<Box<dyn Endpoint>>,
    state: WireState,
}

impl fmt::Debug for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wire")
            .field("read_endpoint", &self.read_endpoint.is_some())
            .field("write_endpoint", &self.write_endpoint.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl Wire {
    pub(crate) fn set_read_endpoint(&mut self, endpoint: Box<dyn Endpoint>) {
        self.read_endpoint = Some(endpoint);
    }

    pub(crate) fn set_write_endpoint(&mut self, endpoint: Box<dyn Endpoint>) {
        self.write_endpoint = Some(endpoint);
    }

    pub(crate) fn state(&self) -> WireState {
        self.state
    }

    pub(crate) fn read(&mut self, buf: &mut [u8], errors: &mut ErrorQueue) -> WireOutcome {
        let Some(endpoint) = self.read_endpoint.as_mut() else {
            errors.push(Diagnostic::new(ReasonCode::EndpointNotSet));
            return WireOutcome::Failure;
        };

        self.state = WireState::Reading;
        match endpoint.read(buf) {
            Ok(n) if n > 0 => {
                if n == buf.len() {
                    self.state = WireState::Idle;
                }
                tracing::trace!(requested = buf.len(), read = n, "wire read");
                WireOutcome::Bytes(n)
            }
            Ok(_) => WireOutcome::Eof,
            Err(e) => blocked_or_failed(&**endpoint, &e, Readiness::Readable),
        }
    }

    pub(crate) fn write(&mut self, buf: &[u8], errors: &mut ErrorQueue) -> WireOutcome {
        let Some(endpoint) = self.write_endpoint.as_mut() else {
            errors.push(Diagnostic::new(ReasonCode::EndpointNotSet));
            return WireOutcome::Failure;
        };

        self.state = WireState::Writing;
        match endpoint.write(buf) {
            Ok(n) if n > 0 => {
                if n == buf.len() {
                    self.state = WireState::Idle;
                }
                tracing::trace!(requested = buf.len(), written = n, "wire write");
                WireOutcome::Bytes(n)
            }
            Ok(_) => WireOutcome::Failure,
            Err(e) => blocked_or_failed(&**endpoint, &e, Readiness::Writable),
        }
    }
}

fn blocked_or_failed(endpoint: &dyn Endpoint, err: &io::Error, natural: Readiness) -> WireOutcome {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
            endpoint.retry_hint().unwrap_or(natural).into()
        }
        _ => {
            tracing::debug!(error = %err, "transport failure");
            WireOutcome::Failure
        }
    }
}
