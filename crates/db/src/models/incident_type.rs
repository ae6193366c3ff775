//! Incident type entity model and DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use triage_core::incident_type as rules;
use triage_core::types::{DbId, Timestamp};
use validator::{Validate, ValidationError};

/// A row from the `incident_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IncidentType {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub visibility: String,
    pub exclude_from_metrics: bool,
    #[serde(rename = "default")]
    pub is_default: bool,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new incident type.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIncidentType {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Defaults to `Open` if omitted.
    #[validate(custom(function = "validate_visibility"))]
    pub visibility: Option<String>,
    pub exclude_from_metrics: Option<bool>,
    #[serde(rename = "default")]
    pub is_default: Option<bool>,
    pub enabled: Option<bool>,
}

/// DTO for updating an existing incident type. All fields are optional;
/// absent fields keep their stored value.
///
/// `description` is the only nullable column: `None` leaves it untouched,
/// `Some(None)` (an explicit JSON `null`) clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateIncidentType {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 2000))]
    pub description: Option<Option<String>>,
    #[validate(custom(function = "validate_visibility"))]
    pub visibility: Option<String>,
    pub exclude_from_metrics: Option<bool>,
    #[serde(rename = "default")]
    pub is_default: Option<bool>,
    pub enabled: Option<bool>,
}

/// Wrap any value that was present in the payload, `null` included, in `Some`.
/// Combined with `#[serde(default)]`, a missing key stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_visibility(value: &str) -> Result<(), ValidationError> {
    rules::validate_visibility(value).map_err(|msg| {
        let mut err = ValidationError::new("visibility");
        err.message = Some(msg.into());
        err
    })
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
