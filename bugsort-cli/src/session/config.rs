//! Session limits with builder pattern

use std::time::Duration;

/// Largest upload accepted, in bytes (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// How long a success banner stays up before dismissing itself
pub const DEFAULT_SUCCESS_BANNER_TTL: Duration = Duration::from_secs(5);

/// Limits applied by a [`Session`](super::Session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub max_upload_bytes: u64,
    pub success_banner_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            success_banner_ttl: DEFAULT_SUCCESS_BANNER_TTL,
        }
    }
}

impl SessionConfig {
    /// Create a new builder for SessionConfig
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }
}

/// Builder for SessionConfig
#[derive(Debug)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    /// Set the upload size ceiling; the front end always uses the default
    #[cfg(test)]
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Set how long success banners stay visible
    pub fn success_banner_ttl(mut self, ttl: Duration) -> Self {
        self.config.success_banner_ttl = ttl;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
