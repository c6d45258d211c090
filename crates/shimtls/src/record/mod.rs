//! Interface to the non-blocking record engine.
//!
//! The engine owns record framing, encryption and the handshake state
//! machine. Every I/O method is handed the connection's wire as a
//! [`WireIo`] capability and reports its result as an [`IoOutcome`]; none of
//! them may block.

use std::panic::Location;

use crate::alert::AlertDescription;
use crate::wire::WireOutcome;
use shimtls_types::ErrorCode;

/// TLS record content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ContentType {
    ChangeCipherSpec = 20,
    Alert = 21,
    Handshake = 22,
    ApplicationData = 23,
}

/// Result of one engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOutcome {
    /// Bytes of application data moved.
    Bytes(usize),
    /// A non-data operation (handshake step, alert, flush) completed.
    Success,
    /// Peer closed its sending direction.
    Eof,
    /// Unrecoverable failure; the engine has recorded an [`EngineError`].
    Failure,
    /// A fatal alert was sent or received.
    Alert,
    /// Retry once the transport is readable.
    WantPollIn,
    /// Retry once the transport is writable.
    WantPollOut,
    /// Engine-internal restart request. Must be consumed inside the engine.
    WantRetry,
}

impl IoOutcome {
    /// True for the readiness outcomes that leave the operation resumable.
    pub fn is_retry(self) -> bool {
        matches!(self, IoOutcome::WantPollIn | IoOutcome::WantPollOut)
    }
}

impl From<WireOutcome> for IoOutcome {
    fn from(outcome: WireOutcome) -> Self {
        match outcome {
            WireOutcome::Bytes(n) => IoOutcome::Bytes(n),
            WireOutcome::Eof => IoOutcome::Eof,
            WireOutcome::WantPollIn => IoOutcome::WantPollIn,
            WireOutcome::WantPollOut => IoOutcome::WantPollOut,
            WireOutcome::Failure => IoOutcome::Failure,
        }
    }
}

/// Failure classification plus the place it was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineError {
    pub code: ErrorCode,
    pub location: &'static Location<'static>,
}

impl EngineError {
    /// Record `code` at the caller's location.
    #[track_caller]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            location: Location::caller(),
        }
    }
}

/// Byte transport handed to the engine on every call.
pub trait WireIo {
    /// Read raw bytes from the transport.
    fn wire_read(&mut self, buf: &mut [u8]) -> WireOutcome;
    /// Write raw bytes to the transport.
    fn wire_write(&mut self, buf: &[u8]) -> WireOutcome;
}

/// The non-blocking TLS 1.3 record engine driven by a [`Connection`].
///
/// [`Connection`]: crate::connection::Connection
pub trait RecordEngine {
    /// Advance the handshake by one step. `Success` means the handshake is
    /// complete.
    fn drive_handshake(&mut self, wire: &mut dyn WireIo) -> IoOutcome;

    /// Move decrypted application data into `buf`, consuming it.
    fn read_application_data(&mut self, wire: &mut dyn WireIo, buf: &mut [u8]) -> IoOutcome;

    /// Copy decrypted application data into `buf` without consuming it.
    fn peek_application_data(&mut self, wire: &mut dyn WireIo, buf: &mut [u8]) -> IoOutcome;

    /// Accept application data for sending. May accept a prefix only.
    fn write_application_data(&mut self, wire: &mut dyn WireIo, buf: &[u8]) -> IoOutcome;

    /// Decrypted application bytes buffered and not yet delivered.
    fn pending_application_data(&self) -> usize;

    /// Queue an alert and attempt to send it.
    fn send_alert(&mut self, wire: &mut dyn WireIo, description: AlertDescription) -> IoOutcome;

    /// Push any queued outbound records to the wire. `Success` once empty.
    fn flush_pending(&mut self, wire: &mut dyn WireIo) -> IoOutcome;

    /// Whether the peer's close_notify alert has been processed.
    fn close_notify_received(&self) -> bool;

    /// Fatal alert sent or received by the engine's alert layer, if any.
    fn fatal_alert(&self) -> Option<AlertDescription>;

    /// Hand over the error recorded by the last failing operation.
    fn take_error(&mut self) -> Option<EngineError>;
}
