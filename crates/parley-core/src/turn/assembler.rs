//! Content assembly: conversation history plus the new turn, flattened into
//! one ordered multi-part payload for a vision-capable model.
//!
//! Part order is the model's reading order of the conversation; every step
//! below preserves it.

use parley_types::chat::Message;
use parley_types::error::TurnError;
use parley_types::model::ContentPart;
use tracing::warn;

use crate::media::signer::{AssetKind, UrlSigner};

/// Structural tag marking a message's content as a stored-image reference.
pub const IMAGE_REF_PREFIX: &str = "image:";

/// Assemble the ordered content parts for a turn.
///
/// `history` is the model projection of the chat (system message included,
/// transcriptions attached) WITHOUT the just-persisted user turn -- the new
/// turn's prompt, images, and transcript are appended here, once.
///
/// Signing failures for historical images are logged and skipped; a signing
/// failure for a new-turn image aborts the turn, since the user is actively
/// trying to send that image now.
pub async fn assemble<S: UrlSigner>(
    signer: &S,
    history: &[Message],
    prompt: &str,
    image_refs: &[String],
    transcript: Option<&str>,
) -> Result<Vec<ContentPart>, TurnError> {
    let mut parts = Vec::with_capacity(history.len() + image_refs.len() + 2);

    for message in history {
        if let Some(path) = message.content.strip_prefix(IMAGE_REF_PREFIX) {
            let path = path.trim();
            match signer.signed_url(AssetKind::Image, path).await {
                Ok(url) => parts.push(ContentPart::image(url)),
                Err(err) => {
                    warn!(path = %path, error = %err, "failed to sign historical image, skipping");
                }
            }
        } else {
            parts.push(ContentPart::text(message.content.clone()));
        }

        if let Some(text) = message.voice_transcription.as_deref() {
            if !text.is_empty() {
                parts.push(ContentPart::text(text));
            }
        }
    }

    parts.push(ContentPart::text(prompt));

    for path in image_refs {
        let url = signer
            .signed_url(AssetKind::Image, path)
            .await
            .map_err(|e| TurnError::UpstreamResolution(e.to_string()))?;
        parts.push(ContentPart::image(url));
    }

    if let Some(text) = transcript {
        if !text.is_empty() {
            parts.push(ContentPart::text(text));
        }
    }

    Ok(parts)
}
