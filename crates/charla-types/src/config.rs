//! Client configuration.

use serde::{Deserialize, Serialize};

/// Settings loaded from `{data_dir}/config.toml`.
///
/// Every field has a default so a missing or partial file still yields a
/// usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the chat endpoints (send, list, messages, create, delete).
    pub chat_base_url: String,
    /// Base URL of the auth endpoints (register, login, logout).
    pub auth_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chat_base_url: "http://localhost:8080".to_string(),
            auth_base_url: "http://localhost:8080/api/auth".to_string(),
            request_timeout_secs: 30,
        }
    }
}
