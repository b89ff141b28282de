//! HTTP middleware for axum.
//!
//! This module contains extractors for cross-cutting request concerns:
//!
//! - `call_context` - Caller identity and correlation id extraction

pub mod call_context;

pub use call_context::{RequestContext, REQUEST_ID_HEADER, USER_ID_HEADER};
