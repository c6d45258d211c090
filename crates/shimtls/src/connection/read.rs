use super::Connection;
use crate::record::{ContentType, IoOutcome, RecordEngine};
use shimtls_types::ReasonCode;

impl<E: RecordEngine> Connection<E> {
    /// Read up to `len` bytes of application data into `buf`.
    ///
    /// Until the handshake completes this only drives the handshake and
    /// returns `-1` with [`RetryIntent::WantsRead`](super::RetryIntent) on
    /// progress. With `peek` set the data stays buffered for the next read.
    pub fn read_bytes(&mut self, content_type: ContentType, buf: &mut [u8], len: i32, peek: bool) -> i32 {
        let Some(ctx) = self.ctx.as_mut() else {
            return self.state.reject(ReasonCode::UninitializedSession);
        };
        if !ctx.handshake_completed {
            return ctx.step_handshake(&mut self.state, IoOutcome::WantPollIn);
        }

        if content_type != ContentType::ApplicationData {
            return self.state.reject(ReasonCode::ShouldNotHaveBeenCalled);
        }
        let len = match self.state.check_len(buf.len(), len) {
            Ok(len) => len,
            Err(ret) => return ret,
        };

        let buf = &mut buf[..len];
        let outcome = if peek {
            ctx.engine.peek_application_data(&mut self.state, buf)
        } else {
            ctx.engine.read_application_data(&mut self.state, buf)
        };
        ctx.observe(&mut self.state);
        self.state.return_code(outcome, ctx.last_error.as_ref())
    }
}
