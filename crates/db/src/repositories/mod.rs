//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod incident_type_repo;

pub use incident_type_repo::IncidentTypeRepo;
