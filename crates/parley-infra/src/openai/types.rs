//! Wire types for the OpenAI API responses.
//!
//! Requests need no mirror types here: `ModelRequest` and `ContentPart`
//! from parley-types serialize to exactly the chat-completions wire shape.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptionResponse {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_response_parses() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.choices[0].message.content, "hi");
    }

    #[test]
    fn empty_choice_list_parses_to_empty_vec() {
        let body = r#"{"choices":[]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(resp.choices.is_empty());
    }

    #[test]
    fn transcription_response_parses() {
        let body = r#"{"text":"spoken words"}"#;
        let resp: TranscriptionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.text, "spoken words");
    }
}
