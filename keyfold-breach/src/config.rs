//! Breach-check configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the breach range-query client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BreachConfig {
    /// Base URL of the k-anonymity range service
    /// (e.g., "https://api.pwnedpasswords.com/range").
    pub api_base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.pwnedpasswords.com/range".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BreachConfig {
    /// Points the client at a different range service (local mirrors,
    /// test servers).
    pub fn with_base_url(url: impl Into<String>) -> Self {
        Self {
            api_base_url: url.into(),
            ..Self::default()
        }
    }
}
