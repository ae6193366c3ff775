pub mod health;
pub mod incident_type;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /incident-types                        list, create
/// /incident-types/{incident_type_id}     get, update
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/incident-types", incident_type::router())
}
