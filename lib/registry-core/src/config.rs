//! Session configuration

use std::time::Duration;

/// Registry session configuration
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long a request/response exchange waits for its reply
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}
