//! Delivery settings

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how to deliver the document
#[derive(Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Base URL of the collection service; `/hosts` is appended
    pub url: String,
    /// HTTP Basic user
    pub user: String,
    /// HTTP Basic password
    pub password: String,
    /// Verify the collector's TLS certificate
    #[serde(default = "default_true")]
    pub enable_server_validation: bool,
    /// Whole-request timeout, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Write a pretty-printed copy of every document before sending
    #[serde(default)]
    pub verbose: bool,
    /// Directory for the pretty-printed copies, the OS temp dir when unset
    #[serde(default)]
    pub diagnostic_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl DeliveryConfig {
    /// Settings with certificate validation on and default timeouts
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
            enable_server_validation: true,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            verbose: false,
            diagnostic_dir: None,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Directory diagnostic copies are written to
    #[must_use]
    pub fn diagnostic_dir(&self) -> PathBuf {
        self.diagnostic_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"***")
            .field("enable_server_validation", &self.enable_server_validation)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("verbose", &self.verbose)
            .field("diagnostic_dir", &self.diagnostic_dir)
            .finish()
    }
}
