//! Domain building blocks shared by the database and API layers.
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod incident_type;
pub mod roles;
pub mod search;
pub mod types;
