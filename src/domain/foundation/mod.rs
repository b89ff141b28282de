//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the request-scoped call context and the error
//! types that form the vocabulary of the payment domain.

mod context;
mod errors;
mod ids;

pub use context::{CallContext, IdentityError};
pub use errors::ValidationError;
pub use ids::{RequestId, UserId};
