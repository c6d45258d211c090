//! Connection configuration with builder pattern.

/// Legacy facade configuration.
#[derive(Debug, Clone, Default)]
pub struct ShimConfig {
    /// Let a write return after the record engine accepted only part of the
    /// buffer. When false, a write reports success only once the whole buffer
    /// has been accepted, resuming across calls.
    pub partial_write: bool,
    /// Shut down without exchanging close_notify alerts.
    pub quiet_shutdown: bool,
}

impl ShimConfig {
    pub fn builder() -> ShimConfigBuilder {
        ShimConfigBuilder::default()
    }
}

/// Builder for [`ShimConfig`].
#[derive(Debug, Default)]
pub struct ShimConfigBuilder {
    partial_write: bool,
    quiet_shutdown: bool,
}

impl ShimConfigBuilder {
    pub fn partial_write(mut self, enabled: bool) -> Self {
        self.partial_write = enabled;
        self
    }

    pub fn quiet_shutdown(mut self, enabled: bool) -> Self {
        self.quiet_shutdown = enabled;
        self
    }

    pub fn build(self) -> ShimConfig {
        ShimConfig {
            partial_write: self.partial_write,
            quiet_shutdown: self.quiet_shutdown,
        }
    }
}
