//! Incident type rules: visibility values and slug derivation.

pub const VISIBILITY_OPEN: &str = "Open";
pub const VISIBILITY_RESTRICTED: &str = "Restricted";

pub const VALID_VISIBILITIES: &[&str] = &[VISIBILITY_OPEN, VISIBILITY_RESTRICTED];

/// Check a visibility value against [`VALID_VISIBILITIES`].
pub fn validate_visibility(value: &str) -> Result<(), String> {
    if VALID_VISIBILITIES.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid visibility '{value}'. Must be one of: {}",
            VALID_VISIBILITIES.join(", ")
        ))
    }
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases ASCII letters, keeps digits, and collapses every other run of
/// characters into a single `-`. Leading and trailing separators are dropped.
///
/// ```
/// use triage_core::incident_type::slugify;
/// assert_eq!(slugify("Security Breach"), "security-breach");
/// assert_eq!(slugify("  P1 -- Outage!  "), "p1-outage");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}
