//! Business logic for Parley.
//!
//! Defines the repository and capability traits (implemented in
//! parley-infra), the entitlement and conversation services, the content
//! assembler, the entitlement-gated turn engine, and the purchase
//! reconciler. This crate never depends on infrastructure.

pub mod billing;
pub mod chat;
pub mod entitlement;
pub mod media;
pub mod model;
pub mod repository;
pub mod turn;
