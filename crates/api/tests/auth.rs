//! Authentication and authorization rejections that happen before any
//! database access. These run against a pool that never connects.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, member_token, post_json, post_json_auth, token_for};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use triage_api::auth::jwt::Claims;
use triage_core::roles::Role;

const BASE: &str = "/api/v1/incident-types";

#[tokio::test]
async fn list_without_token_is_unauthorized() {
    let response = get(common::build_offline_app(), BASE).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["detail"], "Missing Authorization header");
}

#[tokio::test]
async fn get_without_token_is_unauthorized() {
    let response = get(common::build_offline_app(), &format!("{BASE}/1")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_without_token_is_unauthorized() {
    let response = post_json(common::build_offline_app(), BASE, json!({ "name": "X" })).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let response = get_auth(common::build_offline_app(), BASE, "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "Invalid or expired token");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_unauthorized() {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: 1,
        role: "admin".to_string(),
        exp: now + 600,
        iat: now,
        jti: "forged".to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let response = get_auth(common::build_offline_app(), BASE, &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_with_unknown_role_is_unauthorized() {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: 1,
        role: "superuser".to_string(),
        exp: now + 600,
        iat: now,
        jti: "unknown-role".to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(common::test_config().jwt.secret.as_bytes()),
    )
    .unwrap();

    let response = get_auth(common::build_offline_app(), BASE, &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_roles_cannot_create() {
    for role in [Role::Member, Role::PowerUser, Role::Owner] {
        let response = post_json_auth(
            common::build_offline_app(),
            BASE,
            json!({ "name": "Denied" }),
            &token_for(7, role),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "role {role}");
    }
}

#[tokio::test]
async fn non_admin_create_with_malformed_payload_is_forbidden() {
    let response = post_json_auth(
        common::build_offline_app(),
        BASE,
        json!(["not", "an", "object"]),
        &member_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(
        json["detail"],
        "You do not have permission to create incident types."
    );
}
