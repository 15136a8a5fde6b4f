//! K-anonymity breach lookup client.
//!
//! Hashes the password locally (SHA-1, the corpus's index) and sends only
//! the first 5 hex characters — 20 bits — to the range service. The
//! service answers with every known suffix sharing that prefix; the exact
//! match happens locally, so the full hash and the password never leave
//! the device. Responses are requested padded so their size does not
//! reveal which prefix was queried.

use crate::config::BreachConfig;
use crate::error::{BreachError, BreachResult};
use reqwest::Client;
use sha1::{Digest, Sha1};
use tracing::debug;

/// Length of the transmitted hash prefix in hex characters.
const PREFIX_LEN: usize = 5;

/// Outcome of a breach corpus lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreachReport {
    /// Whether the password appeared in the corpus.
    pub breached: bool,
    /// How many times it appeared; 0 when not found.
    pub count: u64,
}

/// HTTP client for the breach range service.
pub struct BreachClient {
    client: Client,
    config: BreachConfig,
}

impl BreachClient {
    pub fn new(config: BreachConfig) -> BreachResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Checks a password against the breach corpus.
    ///
    /// A transport or service failure means the answer is unknown, not
    /// "not breached"; the same holds when the returned future is dropped
    /// mid-flight. Callers never gate their primary action on this call.
    pub async fn check_password(&self, password: &str) -> BreachResult<BreachReport> {
        let digest = hex::encode_upper(Sha1::digest(password.as_bytes()));
        let (prefix, suffix) = digest.split_at(PREFIX_LEN);

        let url = format!("{}/{prefix}", self.config.api_base_url);
        debug!("querying breach range service with {PREFIX_LEN}-char prefix");

        let resp = self
            .client
            .get(&url)
            .header("Add-Padding", "true")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BreachError::Service {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        Ok(match_suffix(&body, suffix))
    }
}

/// Scans a newline-delimited `SUFFIX:COUNT` batch for an exact local
/// match. Padding entries carry a count of 0 and therefore never mark a
/// password as breached even if a suffix collides.
fn match_suffix(body: &str, suffix: &str) -> BreachReport {
    for line in body.lines() {
        let Some((candidate, count)) = line.trim().split_once(':') else {
            continue;
        };
        if candidate.eq_ignore_ascii_case(suffix) {
            let count: u64 = count.trim().parse().unwrap_or(0);
            return BreachReport {
                breached: count > 0,
                count,
            };
        }
    }
    BreachReport {
        breached: false,
        count: 0,
    }
}
