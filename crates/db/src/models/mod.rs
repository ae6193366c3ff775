//! Row types and request DTOs.

pub mod incident_type;
pub mod page;
