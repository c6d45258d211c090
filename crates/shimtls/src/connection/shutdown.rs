use zeroize::Zeroize;

use super::{Connection, RetryIntent, ShutdownFlags};
use crate::alert::AlertDescription;
use crate::record::{IoOutcome, RecordEngine};

/// Scratch space for application data discarded while waiting for the
/// peer's close_notify.
const DRAIN_BUF_LEN: usize = 512;

impl<E: RecordEngine> Connection<E> {
    /// Close the connection in both directions.
    ///
    /// Returns `1` once close_notify has been both sent and received, `0`
    /// when ours is on the wire but the stream ended without the peer's, and
    /// `-1` while a step is waiting on readiness or has failed. Safe to call
    /// repeatedly; the alert is sent at most once.
    pub fn shutdown(&mut self) -> i32 {
        let ctx = match self.ctx.as_mut() {
            Some(ctx) if !self.state.quiet_shutdown => ctx,
            _ => {
                self.state.shutdown = ShutdownFlags::all();
                self.state.retry_intent = RetryIntent::None;
                return 1;
            }
        };

        if !ctx.close_notify_sent {
            // Set before sending so a retry flushes instead of re-queueing.
            ctx.close_notify_sent = true;
            self.state.shutdown.insert(ShutdownFlags::SENT);
            tracing::debug!("sending close_notify");
            let outcome = ctx
                .engine
                .send_alert(&mut self.state, AlertDescription::CloseNotify);
            ctx.observe(&mut self.state);
            match outcome {
                IoOutcome::Success | IoOutcome::Bytes(_) | IoOutcome::Eof => {}
                other => return self.state.return_code(other, ctx.last_error.as_ref()),
            }
        }

        let outcome = ctx.engine.flush_pending(&mut self.state);
        ctx.observe(&mut self.state);
        if outcome != IoOutcome::Success {
            return self.state.return_code(outcome, ctx.last_error.as_ref());
        }

        if !ctx.close_notify_received {
            // Application data still in flight is dropped; readers should
            // have drained it before shutting down.
            let mut scratch = [0u8; DRAIN_BUF_LEN];
            let mut discarded = 0usize;
            let outcome = loop {
                let outcome = ctx
                    .engine
                    .read_application_data(&mut self.state, &mut scratch);
                ctx.observe(&mut self.state);
                match outcome {
                    IoOutcome::Bytes(n) if n > 0 => discarded += n,
                    other => break other,
                }
            };
            scratch.zeroize();
            if discarded > 0 {
                tracing::debug!(discarded, "discarded application data during shutdown");
            }
            if outcome != IoOutcome::Eof {
                return self.state.return_code(outcome, ctx.last_error.as_ref());
            }
        }

        self.state.retry_intent = RetryIntent::None;
        if ctx.close_notify_received {
            self.state.shutdown = ShutdownFlags::all();
            1
        } else {
            tracing::debug!("stream ended without peer close_notify");
            0
        }
    }
}
