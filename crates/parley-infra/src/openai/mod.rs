//! OpenAI adapters: vision chat completions and Whisper transcription.

pub mod model;
pub mod transcriber;
mod types;

pub use model::OpenAiModel;
pub use transcriber::OpenAiTranscriber;
