//! Media capabilities: storage URL signing, audio fetch, transcription.

pub mod signer;
pub mod transcriber;
pub mod voice;

pub use signer::{AssetKind, UrlSigner};
pub use transcriber::{MediaFetcher, Transcriber};
