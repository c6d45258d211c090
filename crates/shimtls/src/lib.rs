#![forbid(unsafe_code)]
#![doc = "Blocking-style read/write/shutdown facade over a non-blocking TLS 1.3 record engine."]

pub mod alert;
pub mod config;
pub mod connection;
pub mod error;
pub mod record;
pub mod wire;

pub use alert::AlertDescription;
pub use config::ShimConfig;
pub use connection::{Connection, ConnectionContext, ErrorKind, RetryIntent, ShutdownFlags};
pub use error::{Diagnostic, ErrorQueue};
pub use record::{ContentType, EngineError, IoOutcome, RecordEngine, WireIo};
pub use shimtls_types::{ErrorCode, ReasonCode, ShimError};
pub use wire::{Endpoint, IoEndpoint, Readiness, WireOutcome, WireState};
