//! HTTP peer directory: `GET <url>` returning `[{host, port, user}]`.

use crate::domain::errors::RegistryError;
use crate::ports::outbound::{DirectoryEntry, PeerDirectory};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpPeerDirectory {
    client: Client,
    url: String,
}

impl HttpPeerDirectory {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RegistryError::DirectoryUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl PeerDirectory for HttpPeerDirectory {
    async fn lookup(&self) -> Result<Vec<DirectoryEntry>, RegistryError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RegistryError::DirectoryUnavailable(e.to_string()))?;

        let entries: Vec<DirectoryEntry> = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidListing(e.to_string()))?;
        tracing::debug!(url = %self.url, count = entries.len(), "Peer directory answered");
        Ok(entries)
    }
}
