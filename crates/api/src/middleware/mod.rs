//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated caller, from a JWT Bearer token.
//!   Role checks are made in the handler with [`auth::AuthUser::require_role`]
//!   so each operation reports its own permission message.

pub mod auth;
