//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley backend:
//! users, chats, messages, entitlement balances, billing purchases, model
//! request shapes, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod billing;
pub mod chat;
pub mod entitlement;
pub mod error;
pub mod model;
pub mod user;
