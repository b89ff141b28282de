//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, call context, validation errors)
//! - `billing` - Plan catalog, status mapping, outcomes and processor events

pub mod billing;
pub mod foundation;
