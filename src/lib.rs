//! Payment Service - Subscription Lifecycle Orchestrator
//!
//! Creates, cancels and reads Stripe subscriptions on behalf of authenticated
//! callers, and verifies and dispatches Stripe webhook deliveries.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
