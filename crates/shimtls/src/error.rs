//! Caller-visible diagnostic queue and the mapping of engine failures onto it.

use std::collections::VecDeque;
use std::fmt;
use std::panic::Location;

use crate::alert::AlertDescription;
use crate::record::EngineError;
use shimtls_types::ReasonCode;

/// One caller-visible error entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    pub reason: ReasonCode,
    pub location: &'static Location<'static>,
}

impl Diagnostic {
    /// Diagnostic raised at the caller's location.
    #[track_caller]
    pub fn new(reason: ReasonCode) -> Self {
        Self {
            reason,
            location: Location::caller(),
        }
    }

    pub fn at(reason: ReasonCode, location: &'static Location<'static>) -> Self {
        Self { reason, location }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.reason,
            self.location.file(),
            self.location.line()
        )
    }
}

/// FIFO of diagnostics, oldest first.
#[derive(Debug, Default, Clone)]
pub struct ErrorQueue {
    entries: VecDeque<Diagnostic>,
}

impl ErrorQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(reason = %diagnostic.reason, at = %diagnostic.location, "diagnostic");
        self.entries.push_back(diagnostic);
    }

    /// Oldest entry.
    pub fn peek(&self) -> Option<&Diagnostic> {
        self.entries.front()
    }

    /// Most recent entry.
    pub fn peek_last(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }

    /// Remove and return the oldest entry.
    pub fn pop(&mut self) -> Option<Diagnostic> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}

/// Surface a failed operation to the caller.
///
/// Emits nothing when the alert layer already recorded a fatal alert, or when
/// the failure has no specific reason and something below has already
/// queued a diagnostic.
#[track_caller]
pub(crate) fn report_failure(
    errors: &mut ErrorQueue,
    fatal_alert: Option<AlertDescription>,
    last_error: Option<&EngineError>,
) {
    if fatal_alert.is_some() {
        return;
    }

    let reason = last_error
        .map(|e| ReasonCode::from_error_code(e.code))
        .unwrap_or(ReasonCode::Unknown);

    if reason == ReasonCode::Unknown && !errors.is_empty() {
        return;
    }

    let location = match last_error {
        Some(e) => e.location,
        None => Location::caller(),
    };
    errors.push(Diagnostic::at(reason, location));
}

#[cfg(test)]
mod tests {
    use super::*;
    use shimtls_types::ErrorCode;

    #[test]
    fn test_queue_order() {
        let mut q = ErrorQueue::new();
        assert!(q.peek().is_none());
        q.push(Diagnostic::new(ReasonCode::BadLength));
        q.push(Diagnostic::new(ReasonCode::InternalError));
        assert_eq!(q.len(), 2);
        assert_eq!(q.peek().unwrap().reason, ReasonCode::BadLength);
        assert_eq!(q.peek_last().unwrap().reason, ReasonCode::InternalError);
        assert_eq!(q.pop().unwrap().reason, ReasonCode::BadLength);
        assert_eq!(q.iter().count(), 1);
        q.clear();
        assert!(q.is_empty());
    }

    #[test]
    fn test_report_maps_code_and_keeps_location() {
        let mut q = ErrorQueue::new();
        let err = EngineError::new(ErrorCode::NoSharedCipher);
        report_failure(&mut q, None, Some(&err));
        let d = q.pop().unwrap();
        assert_eq!(d.reason, ReasonCode::NoSharedCipher);
        assert_eq!(d.location, err.location);
    }

    #[test]
    fn test_report_suppressed_after_fatal_alert() {
        let mut q = ErrorQueue::new();
        let err = EngineError::new(ErrorCode::VerifyFailed);
        report_failure(&mut q, Some(AlertDescription::BadCertificate), Some(&err));
        assert!(q.is_empty());
    }

    #[test]
    fn test_unknown_suppressed_when_queue_has_entry() {
        let mut q = ErrorQueue::new();
        q.push(Diagnostic::new(ReasonCode::EndpointNotSet));
        report_failure(&mut q, None, None);
        report_failure(&mut q, None, Some(&EngineError::new(ErrorCode::Internal)));
        assert_eq!(q.len(), 1);

        // A specific reason is still reported.
        report_failure(&mut q, None, Some(&EngineError::new(ErrorCode::HrrFailed)));
        assert_eq!(q.len(), 2);
        assert_eq!(q.peek_last().unwrap().reason, ReasonCode::NoCiphersAvailable);
    }

    #[test]
    fn test_unknown_reported_on_empty_queue() {
        let mut q = ErrorQueue::new();
        report_failure(&mut q, None, None);
        assert_eq!(q.pop().unwrap().reason, ReasonCode::Unknown);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(ReasonCode::BadLength);
        let s = d.to_string();
        assert!(s.starts_with("bad length ("));
        assert!(s.contains("error.rs"));
    }
}
