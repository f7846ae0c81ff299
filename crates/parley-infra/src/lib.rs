//! Infrastructure implementations for Parley.
//!
//! SQLite repositories (WAL, split read/write pools), reqwest-backed
//! adapters for the model, transcription, storage-signing, and billing
//! capabilities, and environment-driven configuration.

pub mod billing;
pub mod config;
pub mod openai;
pub mod sqlite;
pub mod storage;
