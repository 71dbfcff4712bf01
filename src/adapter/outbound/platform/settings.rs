//! Platform backend configuration.

use serde::Deserialize;

/// Environment variable holding the platform service key.
///
/// The key is never read from the config file.
pub const SERVICE_KEY_ENV: &str = "PLATFORM_SERVICE_KEY";

/// Platform backend settings (`[platform]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformConfig {
    /// When false the coordinator never calls the platform.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of the platform project.
    #[serde(default = "default_url")]
    pub url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

const fn default_true() -> bool {
    true
}

fn default_url() -> String {
    "http://127.0.0.1:54321".into()
}

const fn default_timeout_ms() -> u64 {
    5000
}

const fn default_connect_timeout_ms() -> u64 {
    2000
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_url(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}
