//! Voice transcription pipeline: sign, fetch, transcribe.
//!
//! Runs once per turn, synchronously, before assembly. The resulting text
//! is both fed to the model and persisted as the user message's cached
//! transcription.

use parley_types::error::MediaError;
use tracing::warn;

use crate::media::signer::{AssetKind, UrlSigner};
use crate::media::transcriber::{MediaFetcher, Transcriber};

/// Transcribe the new turn's voice recordings into one text block.
///
/// Returns `Ok(None)` when there are no voice refs. Individual recordings
/// that fail to sign, fetch, or transcribe are skipped with a warning;
/// when refs are present but not a single one transcribes, the whole turn
/// is not viable and this fails.
pub async fn transcribe_voice_refs<S, F, T>(
    signer: &S,
    fetcher: &F,
    transcriber: &T,
    voice_refs: &[String],
) -> Result<Option<String>, MediaError>
where
    S: UrlSigner,
    F: MediaFetcher,
    T: Transcriber,
{
    if voice_refs.is_empty() {
        return Ok(None);
    }

    let mut transcripts = Vec::new();
    for path in voice_refs {
        let url = match signer.signed_url(AssetKind::Voice, path).await {
            Ok(url) => url,
            Err(err) => {
                warn!(path = %path, error = %err, "failed to sign voice url, skipping recording");
                continue;
            }
        };
        let audio = match fetcher.fetch(&url).await {
            Ok(audio) => audio,
            Err(err) => {
                warn!(path = %path, error = %err, "failed to fetch voice recording, skipping");
                continue;
            }
        };
        match transcriber.transcribe(audio).await {
            Ok(text) if !text.is_empty() => transcripts.push(text),
            Ok(_) => {}
            Err(err) => {
                warn!(path = %path, error = %err, "transcription failed, skipping recording");
            }
        }
    }

    if transcripts.is_empty() {
        return Err(MediaError::Transcription(
            "no voice recording could be transcribed".to_string(),
        ));
    }

    Ok(Some(transcripts.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct OkSigner;

    impl UrlSigner for OkSigner {
        async fn signed_url(&self, _kind: AssetKind, path: &str) -> Result<String, MediaError> {
            Ok(format!("https://signed.example/{path}"))
        }
    }

    struct OkFetcher;

    impl MediaFetcher for OkFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaError> {
            Ok(url.as_bytes().to_vec())
        }
    }

    /// Transcriber that fails for audio whose decoded url ends in a flagged path.
    struct SelectiveTranscriber {
        failing: HashSet<String>,
    }

    impl Transcriber for SelectiveTranscriber {
        async fn transcribe(&self, audio: Vec<u8>) -> Result<String, MediaError> {
            let url = String::from_utf8(audio).unwrap();
            let path = url.rsplit('/').next().unwrap().to_string();
            if self.failing.contains(&path) {
                Err(MediaError::Transcription("bad audio".to_string()))
            } else {
                Ok(format!("text of {path}"))
            }
        }
    }

    #[tokio::test]
    async fn no_refs_is_none() {
        let t = SelectiveTranscriber { failing: HashSet::new() };
        let out = transcribe_voice_refs(&OkSigner, &OkFetcher, &t, &[]).await.unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn transcripts_join_in_order() {
        let t = SelectiveTranscriber { failing: HashSet::new() };
        let refs = vec!["a.m4a".to_string(), "b.m4a".to_string()];
        let out = transcribe_voice_refs(&OkSigner, &OkFetcher, &t, &refs)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out, "text of a.m4a\ntext of b.m4a");
    }

    #[tokio::test]
    async fn partial_failure_is_tolerated() {
        let t = SelectiveTranscriber {
            failing: HashSet::from(["a.m4a".to_string()]),
        };
        let refs = vec!["a.m4a".to_string(), "b.m4a".to_string()];
        let out = transcribe_voice_refs(&OkSigner, &OkFetcher, &t, &refs)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out, "text of b.m4a");
    }

    #[tokio::test]
    async fn total_failure_is_fatal() {
        let t = SelectiveTranscriber {
            failing: HashSet::from(["a.m4a".to_string(), "b.m4a".to_string()]),
        };
        let refs = vec!["a.m4a".to_string(), "b.m4a".to_string()];
        let err = transcribe_voice_refs(&OkSigner, &OkFetcher, &t, &refs)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Transcription(_)));
    }
}
