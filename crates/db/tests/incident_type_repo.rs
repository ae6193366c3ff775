use assert_matches::assert_matches;
use sqlx::PgPool;
use triage_core::error::CoreError;
use triage_core::search::{Filter, FilterOp, PageRequest, SearchQuery, SortKey};
use triage_db::models::incident_type::{CreateIncidentType, UpdateIncidentType};
use triage_db::repositories::IncidentTypeRepo;
use triage_db::search::SearchError;

fn new_type(name: &str) -> CreateIncidentType {
    CreateIncidentType {
        name: name.to_string(),
        description: None,
        visibility: None,
        exclude_from_metrics: None,
        is_default: None,
        enabled: None,
    }
}

/// Migrations apply and the pool answers the health probe.
#[sqlx::test(migrations = "./migrations")]
async fn test_bootstrap(pool: PgPool) {
    triage_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_applies_defaults(pool: PgPool) {
    let created = IncidentTypeRepo::create(&pool, &new_type("Lost Device"))
        .await
        .unwrap();

    assert_eq!(created.slug, "lost-device");
    assert_eq!(created.visibility, "Open");
    assert!(created.enabled);
    assert!(!created.is_default);
    assert!(!created.exclude_from_metrics);
    assert_eq!(created.created_at, created.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_missing_row_keeps_existing_default(pool: PgPool) {
    let input = CreateIncidentType {
        is_default: Some(true),
        ..new_type("Current Default")
    };
    let current = IncidentTypeRepo::create(&pool, &input).await.unwrap();

    let update = UpdateIncidentType {
        is_default: Some(true),
        ..Default::default()
    };
    let result = IncidentTypeRepo::update(&pool, 999_999, &update).await.unwrap();
    assert!(result.is_none());

    let reloaded = IncidentTypeRepo::find_by_id(&pool, current.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.is_default, "rolled-back update must not clear the flag");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_bumps_updated_at(pool: PgPool) {
    let created = IncidentTypeRepo::create(&pool, &new_type("Audit Finding"))
        .await
        .unwrap();

    let update = UpdateIncidentType {
        description: Some(Some("Raised by external audit".into())),
        ..Default::default()
    };
    let updated = IncidentTypeRepo::update(&pool, created.id, &update)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.description.as_deref(), Some("Raised by external audit"));
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_clears_description_only_when_sent(pool: PgPool) {
    let input = CreateIncidentType {
        description: Some("old".into()),
        ..new_type("Spam")
    };
    let created = IncidentTypeRepo::create(&pool, &input).await.unwrap();

    let untouched = UpdateIncidentType {
        enabled: Some(false),
        ..Default::default()
    };
    let kept = IncidentTypeRepo::update(&pool, created.id, &untouched)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.description.as_deref(), Some("old"));

    let clear = UpdateIncidentType {
        description: Some(None),
        ..Default::default()
    };
    let cleared = IncidentTypeRepo::update(&pool, created.id, &clear)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.description, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_filters_on_boolean_column(pool: PgPool) {
    IncidentTypeRepo::create(&pool, &new_type("Enabled One")).await.unwrap();
    let disabled = CreateIncidentType {
        enabled: Some(false),
        ..new_type("Disabled One")
    };
    IncidentTypeRepo::create(&pool, &disabled).await.unwrap();

    let query = SearchQuery {
        filters: vec![Filter {
            field: "enabled".into(),
            op: FilterOp::Eq,
            value: "false".into(),
        }],
        sort: vec![SortKey {
            field: "name".into(),
            descending: false,
        }],
        page: PageRequest::new(None, Some(-1)),
        ..Default::default()
    };
    let page = IncidentTypeRepo::search(&pool, &query).await.unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Disabled One");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_rejects_unknown_sort_field(pool: PgPool) {
    let query = SearchQuery {
        sort: vec![SortKey {
            field: "secret".into(),
            descending: true,
        }],
        ..Default::default()
    };

    let result = IncidentTypeRepo::search(&pool, &query).await;

    assert_matches!(result, Err(SearchError::Invalid(CoreError::Validation(_))));
}
