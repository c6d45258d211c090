use super::Connection;
use crate::record::{ContentType, IoOutcome, RecordEngine};
use shimtls_types::ReasonCode;

/// What one engine write attempt achieved.
enum Accepted {
    /// This many bytes of the offered suffix were taken.
    Bytes(usize),
    /// Nothing was taken; report this outcome.
    Stalled(IoOutcome),
    /// The engine claimed more than it was offered or reported a non-data
    /// result.
    Violation,
}

fn accepted(outcome: IoOutcome, offered: usize) -> Accepted {
    match outcome {
        IoOutcome::Bytes(n) if n > offered => Accepted::Violation,
        IoOutcome::Bytes(n) if n > 0 => Accepted::Bytes(n),
        IoOutcome::Success => Accepted::Violation,
        other => Accepted::Stalled(other),
    }
}

impl<E: RecordEngine> Connection<E> {
    /// Write `len` bytes of application data from `buf`.
    ///
    /// In partial-write mode a single engine attempt is made and its count
    /// returned. Otherwise the call returns `len` only once every byte has
    /// been accepted; after a `-1` the caller must repeat the call with the
    /// same buffer and length, and the write resumes where it stopped.
    pub fn write_bytes(&mut self, content_type: ContentType, buf: &[u8], len: i32) -> i32 {
        let Some(ctx) = self.ctx.as_mut() else {
            return self.state.reject(ReasonCode::UninitializedSession);
        };
        if !ctx.handshake_completed {
            return ctx.step_handshake(&mut self.state, IoOutcome::WantPollOut);
        }

        if content_type != ContentType::ApplicationData {
            return self.state.reject(ReasonCode::ShouldNotHaveBeenCalled);
        }
        let len = match self.state.check_len(buf.len(), len) {
            Ok(len) => len,
            Err(ret) => return ret,
        };

        if self.state.partial_write {
            let outcome = ctx.engine.write_application_data(&mut self.state, &buf[..len]);
            ctx.observe(&mut self.state);
            return match accepted(outcome, len) {
                Accepted::Bytes(n) => self.state.return_code(IoOutcome::Bytes(n), None),
                Accepted::Stalled(outcome) => {
                    self.state.return_code(outcome, ctx.last_error.as_ref())
                }
                Accepted::Violation => self.state.internal_error(),
            };
        }

        let mut sent = self.state.carried_sent;
        if len < sent {
            tracing::debug!(len, carried = sent, "write buffer shrank between retries");
            return self.state.reject(ReasonCode::BadLength);
        }

        loop {
            let remaining = len - sent;
            if remaining == 0 {
                self.state.carried_sent = 0;
                return self.state.return_code(IoOutcome::Bytes(sent), None);
            }

            let outcome = ctx
                .engine
                .write_application_data(&mut self.state, &buf[sent..len]);
            ctx.observe(&mut self.state);
            match accepted(outcome, remaining) {
                Accepted::Bytes(n) => sent += n,
                Accepted::Stalled(outcome) => {
                    self.state.carried_sent = sent;
                    if outcome.is_retry() {
                        tracing::debug!(sent, len, "strict write suspended");
                    }
                    return self.state.return_code(outcome, ctx.last_error.as_ref());
                }
                Accepted::Violation => {
                    self.state.carried_sent = sent;
                    return self.state.internal_error();
                }
            }
        }
    }
}
