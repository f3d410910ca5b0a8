//! Snapshot Transport
//!
//! Fetches the primary's current collection and decodes it. The sync agent
//! depends only on the `SnapshotSource` trait, so tests can substitute an
//! in-process source for the HTTP one.

use crate::directory::protocol::ENDPOINT_USERS;
use crate::directory::types::User;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Returns the primary's full collection as of this call.
    async fn fetch(&self) -> Result<Vec<User>>;
}

/// Pulls `GET {primary}/users` over HTTP.
///
/// One attempt per call; retrying is the caller's business.
pub struct HttpSnapshotSource {
    http_client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpSnapshotSource {
    pub fn new(primary_url: &str, timeout: Duration) -> Self {
        let base = primary_url.trim_end_matches('/');
        Self {
            http_client: reqwest::Client::new(),
            url: format!("{}{}", base, ENDPOINT_USERS),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<Vec<User>> {
        let response = self
            .http_client
            .get(self.url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach primary at {}: {}", self.url, e))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Snapshot request failed {}",
                response.status()
            ));
        }

        // A primary with no records may answer `null` instead of `[]`.
        let users: Option<Vec<User>> = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to decode snapshot: {}", e))?;

        Ok(users.unwrap_or_default())
    }
}
