//! OpenAiTranscriber -- Whisper transcription over multipart upload.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use parley_core::media::Transcriber;
use parley_types::error::MediaError;

use super::types::TranscriptionResponse;

/// Whisper model used for voice transcription.
const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// OpenAI audio-transcription provider.
pub struct OpenAiTranscriber {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiTranscriber {
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.openai.com".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, MediaError> {
        let url = format!("{}/v1/audio/transcriptions", self.base_url);

        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio).file_name("audio.m4a"),
            );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Transcription(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Transcription(format!("HTTP {status}: {body}")));
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Transcription(format!("bad response: {e}")))?;

        Ok(transcription.text)
    }
}
