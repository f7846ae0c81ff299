//! Entitlement gate and ledger service.

pub mod service;

pub use service::EntitlementService;
