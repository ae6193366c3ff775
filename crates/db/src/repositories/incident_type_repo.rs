//! Repository for the `incident_types` table.

use sqlx::{PgConnection, PgPool};
use triage_core::incident_type::{slugify, VISIBILITY_OPEN};
use triage_core::search::SearchQuery;
use triage_core::types::DbId;

use crate::models::incident_type::{CreateIncidentType, IncidentType, UpdateIncidentType};
use crate::models::page::Page;
use crate::search::{search_filter_sort_paginate, Column, ColumnKind, SearchError, Searchable};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, description, visibility, exclude_from_metrics, \
    is_default, enabled, created_at, updated_at";

impl Searchable for IncidentType {
    const TABLE: &'static str = "incident_types";
    const COLUMNS: &'static str = COLUMNS;
    // Must match the expression of `idx_incident_types_search`.
    const SEARCH_VECTOR: &'static str =
        "to_tsvector('simple', name || ' ' || COALESCE(description, ''))";

    fn column(field: &str) -> Option<Column> {
        let column = match field {
            "id" => Column::new("id", ColumnKind::Integer),
            "name" => Column::new("name", ColumnKind::Text),
            "slug" => Column::new("slug", ColumnKind::Text),
            "description" => Column::new("description", ColumnKind::Text),
            "visibility" => Column::new("visibility", ColumnKind::Text),
            "exclude_from_metrics" => Column::new("exclude_from_metrics", ColumnKind::Boolean),
            "default" => Column::new("is_default", ColumnKind::Boolean),
            "enabled" => Column::new("enabled", ColumnKind::Boolean),
            "created_at" => Column::new("created_at", ColumnKind::Timestamp),
            "updated_at" => Column::new("updated_at", ColumnKind::Timestamp),
            _ => return None,
        };
        Some(column)
    }
}

/// Provides create, read, update and search for incident types.
pub struct IncidentTypeRepo;

impl IncidentTypeRepo {
    /// Find an incident type by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<IncidentType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM incident_types WHERE id = $1");
        sqlx::query_as::<_, IncidentType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new incident type, returning the created row.
    ///
    /// The slug is derived from the name. If `visibility` is `None` it
    /// defaults to `Open`; `enabled` defaults to `true`. When the new row is
    /// the default, every other row loses the flag in the same transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateIncidentType,
    ) -> Result<IncidentType, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if input.is_default == Some(true) {
            clear_default(&mut *tx, None).await?;
        }

        let query = format!(
            "INSERT INTO incident_types
                (name, slug, description, visibility, exclude_from_metrics, is_default, enabled)
             VALUES ($1, $2, $3, COALESCE($4, $5), COALESCE($6, false),
                     COALESCE($7, false), COALESCE($8, true))
             RETURNING {COLUMNS}"
        );
        let incident_type = sqlx::query_as::<_, IncidentType>(&query)
            .bind(&input.name)
            .bind(slugify(&input.name))
            .bind(&input.description)
            .bind(&input.visibility)
            .bind(VISIBILITY_OPEN)
            .bind(input.exclude_from_metrics)
            .bind(input.is_default)
            .bind(input.enabled)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(incident_type)
    }

    /// Update an incident type. Only non-`None` fields in `input` are applied
    /// (`description: Some(None)` clears the description); a new name also
    /// regenerates the slug.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIncidentType,
    ) -> Result<Option<IncidentType>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if input.is_default == Some(true) {
            clear_default(&mut *tx, Some(id)).await?;
        }

        let query = format!(
            "UPDATE incident_types SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                visibility = COALESCE($6, visibility),
                exclude_from_metrics = COALESCE($7, exclude_from_metrics),
                is_default = COALESCE($8, is_default),
                enabled = COALESCE($9, enabled),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let incident_type = sqlx::query_as::<_, IncidentType>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.name.as_deref().map(slugify))
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(&input.visibility)
            .bind(input.exclude_from_metrics)
            .bind(input.is_default)
            .bind(input.enabled)
            .fetch_optional(&mut *tx)
            .await?;

        // A missing row must not leave the default flag cleared elsewhere.
        if incident_type.is_some() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(incident_type)
    }

    /// Filter, sort and paginate incident types.
    pub async fn search(
        pool: &PgPool,
        query: &SearchQuery,
    ) -> Result<Page<IncidentType>, SearchError> {
        search_filter_sort_paginate::<IncidentType>(pool, query).await
    }
}

/// Unset `is_default` on every row except `keep`.
async fn clear_default(conn: &mut PgConnection, keep: Option<DbId>) -> Result<(), sqlx::Error> {
    let cleared = sqlx::query(
        "UPDATE incident_types SET is_default = false, updated_at = NOW()
         WHERE is_default AND id IS DISTINCT FROM $1",
    )
    .bind(keep)
    .execute(conn)
    .await?
    .rows_affected();

    if cleared > 0 {
        tracing::debug!(cleared, "Cleared previous default incident type");
    }
    Ok(())
}
