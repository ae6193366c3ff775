//! Primitive aliases used by every layer.

/// Primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Timestamps are stored and serialized in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
