//! HTTP adapters - RPC and webhook endpoint implementations.

pub mod billing;
pub mod health;
pub mod middleware;

// Re-export key types for convenience
pub use billing::billing_router;
pub use billing::BillingAppState;
pub use health::health_routes;
