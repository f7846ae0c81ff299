//! Chat title derivation.

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 50;

/// Title used when the first prompt is empty.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Derive a chat title from the first user prompt.
///
/// The prompt is trimmed and truncated to [`MAX_TITLE_LEN`] characters on a
/// char boundary; an empty prompt falls back to [`DEFAULT_TITLE`].
pub fn derive_title(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    match trimmed.char_indices().nth(MAX_TITLE_LEN) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}
