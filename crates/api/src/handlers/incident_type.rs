//! Handlers for the `/incident-types` resource.
//!
//! Reads are open to any authenticated caller; writes require the `admin`
//! role. Write handlers take the raw [`Request`] and only read the body once
//! the role check has passed. `update` resolves the target row before
//! checking the role, so an unknown id yields 404 for every caller.

use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::Json;
use axum_extra::extract::{Query, QueryRejection};
use triage_core::error::CoreError;
use triage_core::roles::Role;
use triage_core::search::SearchQuery;
use triage_core::types::DbId;
use triage_db::models::incident_type::{CreateIncidentType, IncidentType, UpdateIncidentType};
use triage_db::models::page::Page;
use triage_db::repositories::IncidentTypeRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::ListParams;
use crate::state::AppState;

const ENTITY: &str = "IncidentType";

/// GET /api/v1/incident-types
///
/// Search, filter, sort and paginate incident types.
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<Page<IncidentType>>> {
    let Query(params) = params?;
    let query = SearchQuery::from_params(params.into())?;
    let page = IncidentTypeRepo::search(&state.pool, &query).await?;
    Ok(Json(page))
}

/// POST /api/v1/incident-types
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<IncidentType>> {
    user.require_role(
        Role::Admin,
        "You do not have permission to create incident types.",
    )?;

    let Json(input) = Json::<CreateIncidentType>::from_request(request, &state).await?;
    input.validate()?;

    let incident_type = IncidentTypeRepo::create(&state.pool, &input).await?;

    tracing::info!(
        incident_type_id = incident_type.id,
        user_id = user.user_id,
        name = %incident_type.name,
        "Incident type created",
    );

    Ok(Json(incident_type))
}

/// GET /api/v1/incident-types/{incident_type_id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<IncidentType>> {
    let Path(incident_type_id) = path?;
    let incident_type = IncidentTypeRepo::find_by_id(&state.pool, incident_type_id)
        .await?
        .ok_or_else(|| CoreError::not_found(ENTITY, incident_type_id))?;
    Ok(Json(incident_type))
}

/// PUT /api/v1/incident-types/{incident_type_id}
///
/// Order of checks: existence (404), role (403), payload (422).
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    request: Request,
) -> AppResult<Json<IncidentType>> {
    let Path(incident_type_id) = path?;

    if IncidentTypeRepo::find_by_id(&state.pool, incident_type_id)
        .await?
        .is_none()
    {
        return Err(CoreError::not_found(ENTITY, incident_type_id).into());
    }

    user.require_role(
        Role::Admin,
        "You do not have permission to update incident types.",
    )?;

    let Json(input) = Json::<UpdateIncidentType>::from_request(request, &state).await?;
    input.validate()?;

    // The row may have been removed between the lookup and the write.
    let incident_type = IncidentTypeRepo::update(&state.pool, incident_type_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found(ENTITY, incident_type_id))?;

    tracing::info!(
        incident_type_id,
        user_id = user.user_id,
        "Incident type updated",
    );

    Ok(Json(incident_type))
}
