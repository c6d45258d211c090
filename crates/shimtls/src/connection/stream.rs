//! `std::io` view of a [`Connection`].
//!
//! Readiness results become `WouldBlock`, so the connection can sit behind
//! code written for non-blocking sockets.

use std::io;

use super::{Connection, ErrorKind};
use crate::record::{ContentType, IoOutcome, RecordEngine};
use shimtls_types::ShimError;

/// Clamp a buffer length to the numeric contract.
fn request_len(buf_len: usize) -> i32 {
    i32::try_from(buf_len).unwrap_or(i32::MAX)
}

impl<E: RecordEngine> Connection<E> {
    fn io_result(&self, ret: i32) -> io::Result<usize> {
        match self.error_kind(ret) {
            ErrorKind::None => Ok(ret.unsigned_abs() as usize),
            ErrorKind::ZeroReturn => Ok(0),
            ErrorKind::WantRead | ErrorKind::WantWrite => Err(io::ErrorKind::WouldBlock.into()),
            ErrorKind::Syscall if ret == 0 => Err(io::ErrorKind::UnexpectedEof.into()),
            ErrorKind::Syscall | ErrorKind::Protocol => {
                let err = self
                    .state
                    .errors
                    .peek_last()
                    .map(|d| ShimError::Reason(d.reason))
                    .unwrap_or(ShimError::Unreported);
                Err(io::Error::other(err))
            }
        }
    }

    /// Run `op`, repeating it once when the call only finished the handshake.
    fn after_handshake(&mut self, mut op: impl FnMut(&mut Self) -> i32) -> io::Result<usize> {
        let established = self.is_handshake_completed();
        let mut ret = op(self);
        if ret < 0 && !established && self.is_handshake_completed() {
            ret = op(self);
        }
        self.io_result(ret)
    }
}

impl<E: RecordEngine> io::Read for Connection<E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = request_len(buf.len());
        self.after_handshake(|conn| conn.read_bytes(ContentType::ApplicationData, buf, len, false))
    }
}

/// In strict mode a `WouldBlock` from `write` may follow bytes the engine
/// already accepted. Those bytes are carried on the connection, so the
/// caller must retry with the same buffer; the `Ok(n)` that completes the
/// write covers the whole of it. Partial-write mode keeps the usual
/// `io::Write` meaning.
impl<E: RecordEngine> io::Write for Connection<E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = request_len(buf.len());
        self.after_handshake(|conn| conn.write_bytes(ContentType::ApplicationData, buf, len))
    }

    fn flush(&mut self) -> io::Result<()> {
        let Some(ctx) = self.ctx.as_mut() else {
            return Ok(());
        };
        let outcome = ctx.engine.flush_pending(&mut self.state);
        ctx.observe(&mut self.state);
        if outcome == IoOutcome::Success {
            return Ok(());
        }
        let ret = self.state.return_code(outcome, ctx.last_error.as_ref());
        self.io_result(ret).map(|_| ())
    }
}
