//! Domain error taxonomy.
//!
//! The API layer maps each variant onto an HTTP status; nothing here knows
//! about HTTP.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced row does not exist.
    #[error("{entity} with id {id} does not exist")]
    NotFound { entity: &'static str, id: DbId },

    /// A caller-supplied value (query parameter, filter, payload field) is invalid.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The write would violate a uniqueness rule.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No usable credentials were presented.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but lacks the required role.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}
