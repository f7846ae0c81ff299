//! HttpMediaFetcher -- plain GET of a signed URL's bytes.

use std::time::Duration;

use parley_core::media::MediaFetcher;
use parley_types::error::MediaError;

/// Fetches media bytes over HTTP.
pub struct HttpMediaFetcher {
    client: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");
        Self { client }
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Fetch(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
