//! Audio fetch and transcription capabilities.

use parley_types::error::MediaError;

/// Transcribes raw audio bytes to plain text.
pub trait Transcriber: Send + Sync {
    fn transcribe(
        &self,
        audio: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<String, MediaError>> + Send;
}

/// Fetches the bytes behind a signed URL.
pub trait MediaFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, MediaError>> + Send;
}
