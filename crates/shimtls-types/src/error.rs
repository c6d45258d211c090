/// Failure classification recorded by the record engine for the operation that
/// last failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Peer certificate or CertificateVerify did not verify.
    VerifyFailed,
    /// HelloRetryRequest could not be satisfied.
    HrrFailed,
    /// A handshake message carried bytes past its end.
    TrailingData,
    /// No cipher suite in common with the peer.
    NoSharedCipher,
    /// Malformed message from the peer.
    DecodeError,
    /// The engine hit an internal inconsistency.
    Internal,
}

/// Caller-visible reason attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ReasonCode {
    // Protocol reasons
    #[error("certificate verify failed")]
    CertificateVerifyFailed,
    #[error("no ciphers available")]
    NoCiphersAvailable,
    #[error("extra data in message")]
    ExtraDataInMessage,
    #[error("no shared cipher")]
    NoSharedCipher,
    #[error("fatal alert: {0}")]
    FatalAlert(u8),
    #[error("unknown error")]
    Unknown,

    // Caller and configuration reasons
    #[error("bad length")]
    BadLength,
    #[error("should not have been called")]
    ShouldNotHaveBeenCalled,
    #[error("transport endpoint not set")]
    EndpointNotSet,
    #[error("uninitialized session")]
    UninitializedSession,

    // Contract violations
    #[error("internal error")]
    InternalError,
}

impl ReasonCode {
    /// Map an engine error classification to the reason surfaced to callers.
    pub fn from_error_code(code: ErrorCode) -> Self {
        match code {
            ErrorCode::VerifyFailed => ReasonCode::CertificateVerifyFailed,
            ErrorCode::HrrFailed => ReasonCode::NoCiphersAvailable,
            ErrorCode::TrailingData => ReasonCode::ExtraDataInMessage,
            ErrorCode::NoSharedCipher => ReasonCode::NoSharedCipher,
            ErrorCode::DecodeError | ErrorCode::Internal => ReasonCode::Unknown,
        }
    }
}

/// Errors returned by the `std::io` facade.
#[derive(Debug, thiserror::Error)]
pub enum ShimError {
    #[error("tls failure: {0}")]
    Reason(#[from] ReasonCode),
    #[error("connection failed without a recorded diagnostic")]
    Unreported,
}
