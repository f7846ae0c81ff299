//! Billing-provider adapter.

pub mod revenuecat;

pub use revenuecat::RevenueCatClient;
