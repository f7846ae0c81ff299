//! Model request/response shapes for the vision-capable inference capability.
//!
//! The assembler flattens a whole conversation into the ordered content
//! parts of a single user-role message; providers serialize these shapes
//! onto their own wire format.

use serde::{Deserialize, Serialize};

use crate::chat::MessageRole;

/// One element of a multi-modal message payload.
///
/// Part order is the model's reading order of the conversation and must be
/// preserved end to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// An image part with the default fidelity hint.
    pub fn image(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: ImageDetail::Auto,
            },
        }
    }
}

/// A fetchable, time-limited image URL plus fidelity hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: ImageDetail,
}

/// Fidelity hint for image parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Auto,
    Low,
    High,
}

/// A role-tagged list of content parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: MessageRole,
    pub content: Vec<ContentPart>,
}

/// A complete inference request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ModelMessage>,
}

/// The best completion returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_part_wire_shape() {
        let part = ContentPart::text("hello");
        let json = serde_json::to_string(&part).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hello"}"#);
    }

    #[test]
    fn test_image_part_wire_shape() {
        let part = ContentPart::image("https://signed.example/img.png");
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains(r#""type":"image_url""#));
        assert!(json.contains(r#""detail":"auto""#));
    }

    #[test]
    fn test_model_request_roundtrip() {
        let req = ModelRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ModelMessage {
                role: MessageRole::User,
                content: vec![ContentPart::text("a"), ContentPart::image("u")],
            }],
        };
        let json = serde_json::to_string(&req).unwrap();
        let parsed: ModelRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.messages[0].content.len(), 2);
    }
}
