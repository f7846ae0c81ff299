//! SupabaseSigner -- concrete [`UrlSigner`] over the Supabase Storage
//! `/object/sign` endpoint.
//!
//! Image and voice assets live in separate buckets; both are signed with
//! the same time-boxed expiry.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use parley_core::media::{AssetKind, UrlSigner};
use parley_types::error::MediaError;

/// Supabase Storage URL signer.
pub struct SupabaseSigner {
    client: reqwest::Client,
    /// Storage API root, e.g. `https://<project>.supabase.co/storage/v1`.
    base_url: String,
    service_role: SecretString,
    image_bucket: String,
    voice_bucket: String,
    expires_in_secs: u64,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl SupabaseSigner {
    pub fn new(
        project_url: &str,
        service_role: SecretString,
        image_bucket: String,
        voice_bucket: String,
        expires_in_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: format!("{}/storage/v1", project_url.trim_end_matches('/')),
            service_role,
            image_bucket,
            voice_bucket,
            expires_in_secs,
        }
    }

    fn bucket(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Image => &self.image_bucket,
            AssetKind::Voice => &self.voice_bucket,
        }
    }
}

impl UrlSigner for SupabaseSigner {
    async fn signed_url(&self, kind: AssetKind, path: &str) -> Result<String, MediaError> {
        let resolve = |message: String| MediaError::Resolve { path: path.to_string(), message };

        let url = format!(
            "{}/object/sign/{}/{}",
            self.base_url,
            self.bucket(kind),
            path.trim_start_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.service_role.expose_secret())
            .json(&json!({ "expiresIn": self.expires_in_secs }))
            .send()
            .await
            .map_err(|e| resolve(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(resolve(format!("HTTP {status}: {body}")));
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| resolve(format!("bad response: {e}")))?;

        // The API returns a path relative to the storage root.
        Ok(format!("{}{}", self.base_url, signed.signed_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_response_parses_provider_field_name() {
        let body = r#"{"signedURL":"/object/sign/images/a.png?token=abc"}"#;
        let resp: SignResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.signed_url, "/object/sign/images/a.png?token=abc");
    }
}
