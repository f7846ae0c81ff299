//! Repository trait definitions.
//!
//! Implementations live in parley-infra (SQLite via sqlx). All traits use
//! native async fn in traits (RPITIT, Rust 2024 edition).

pub mod chat;
pub mod ledger;
pub mod user;
