use axum::routing::get;
use axum::Router;

use crate::handlers::incident_type;
use crate::state::AppState;

/// Routes mounted at `/incident-types`.
///
/// ```text
/// GET    /                       -> list
/// POST   /                       -> create
/// GET    /{incident_type_id}     -> get_by_id
/// PUT    /{incident_type_id}     -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(incident_type::list).post(incident_type::create))
        .route(
            "/{incident_type_id}",
            get(incident_type::get_by_id).put(incident_type::update),
        )
}
