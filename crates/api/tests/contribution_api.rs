//! HTTP-level tests for the submission and moderation workflow, run over the
//! in-memory store.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{admin_token, body_json, get_auth, post_json, post_json_auth};
use serde_json::{json, Value};
use tower::ServiceExt;

use atlas_core::contribution::ContributionStatus;
use atlas_core::entity::EntityKind;
use atlas_core::memory::MemoryStore;
use atlas_core::store::ContributionStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Submit a contribution and return its id.
async fn submit(app: axum::Router, contribution_type: &str, payload: Value) -> String {
    let body = json!({
        "type": contribution_type,
        "proposed_payload": payload,
        "contributor_email": "amina@example.org",
    });
    let response = post_json(app, "/api/v1/contributions", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    json["data"]["id"].as_str().unwrap().to_string()
}

async fn moderate(app: axum::Router, id: &str, body: Value) -> axum::response::Response {
    post_json_auth(
        app,
        &format!("/api/v1/admin/contributions/{id}/moderate"),
        body,
        &admin_token(),
    )
    .await
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_submission_is_stored_as_pending() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let id = submit(
        app,
        "new_country",
        json!({"slug": "xy", "name_fr": "Pays X", "region_id": "r1", "population_2025": 1000}),
    )
    .await;

    let pending = store.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id.to_string(), id);
    assert!(pending[0].reviewed_at.is_none());
    assert_eq!(pending[0].contributor_email.as_deref(), Some("amina@example.org"));
}

#[tokio::test]
async fn test_unknown_type_reports_field_error() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let body = json!({"type": "new_city", "proposed_payload": {"slug": "x"}});
    let response = post_json(app, "/api/v1/contributions", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let details = json["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "type"));
    assert!(store.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_email_and_missing_payload_are_both_reported() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()));

    let body = json!({"type": "new_region", "contributor_email": "not-an-email"});
    let response = post_json(app, "/api/v1/contributions", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"contributor_email"));
    assert!(fields.contains(&"proposed_payload"));
}

#[tokio::test]
async fn test_honeypot_submission_looks_accepted_but_is_discarded() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let body = json!({
        "type": "new_region",
        "proposed_payload": {"code": "x", "name_fr": "X"},
        "honeypot": "http://spam.example",
    });
    let response = post_json(app, "/api/v1/contributions", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["id"].is_string());
    assert!(store.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()));

    let body = json!({"type": "new_region", "honeypot": 42});
    let response = post_json(app, "/api/v1/contributions", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_approve_new_country_creates_row() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let id = submit(
        app.clone(),
        "new_country",
        json!({"slug": "xy", "name_fr": "Pays X", "region_id": "r1", "population_2025": 1000}),
    )
    .await;

    let response = moderate(app, &id, json!({"action": "approve", "moderator_notes": "sourced"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "approved");
    assert_eq!(json["data"]["moderator_notes"], "sourced");
    assert!(json["data"]["reviewed_at"].is_string());
    assert_eq!(json["merge"]["entity"], "country");
    assert_eq!(json["merge"]["rows_affected"], 1);

    let country = store
        .find_entity(EntityKind::Country, "slug", "xy")
        .await
        .expect("country should exist");
    assert_eq!(country["population_2025"], 1000);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_approve_update_region_sets_population() {
    let store = Arc::new(MemoryStore::with_african_regions());
    let app = common::build_test_app(store.clone());

    let id = submit(
        app.clone(),
        "update_region",
        json!({"code": "afrique_du_nord", "total_population": 999}),
    )
    .await;
    let response = moderate(app, &id, json!({"action": "approve"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let row = store
        .find_entity(EntityKind::Region, "code", "afrique_du_nord")
        .await
        .unwrap();
    assert_eq!(row["total_population"], 999);
    assert_eq!(row["name_fr"], "Afrique du Nord");
}

#[tokio::test]
async fn test_reject_marks_rejected_without_writing() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let id = submit(app.clone(), "new_region", json!({"code": "x", "name_fr": "X"})).await;
    let response = moderate(app, &id, json!({"action": "reject", "moderator_notes": "duplicate"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "rejected");
    assert!(json["data"]["reviewed_at"].is_string());
    assert!(json.get("merge").is_none());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_merge_failure_rolls_back_to_pending() {
    let store = Arc::new(MemoryStore::new());
    store
        .fail_writes_to(EntityKind::Country, "connection reset by peer")
        .await;
    let app = common::build_test_app(store.clone());

    let id = submit(app.clone(), "new_country", json!({"slug": "xy", "name_fr": "Pays X"})).await;
    let response = moderate(app, &id, json!({"action": "approve"})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "MERGE_FAILED");
    assert!(json["error"].as_str().unwrap().contains("connection reset by peer"));
    assert_eq!(json["details"]["contribution_id"], id.as_str());

    let contribution = store
        .find_by_id(id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contribution.status, ContributionStatus::Pending);
    assert!(contribution.reviewed_at.is_none());
}

#[tokio::test]
async fn test_duplicate_insert_reports_constraint() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let payload = json!({"slug": "xy", "name_fr": "Pays X"});
    let first = submit(app.clone(), "new_country", payload.clone()).await;
    let second = submit(app.clone(), "new_country", payload).await;

    assert_eq!(moderate(app.clone(), &first, json!({"action": "approve"})).await.status(), StatusCode::OK);

    let response = moderate(app, &second, json!({"action": "approve"})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("uq_countries_slug"));
}

#[tokio::test]
async fn test_invalid_action_changes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let id = submit(app.clone(), "new_region", json!({"code": "x", "name_fr": "X"})).await;
    let response = moderate(app, &id, json!({"action": "delete"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_ACTION");
    assert_eq!(
        json["error"],
        "Invalid moderation action 'delete'. Must be one of: approve, reject"
    );
    assert_eq!(store.list_pending().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_action_is_invalid() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()));
    let id = submit(app.clone(), "new_region", json!({"code": "x", "name_fr": "X"})).await;

    let response = moderate(app, &id, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ACTION");
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let response = moderate(
        app,
        "00000000-0000-0000-0000-000000000000",
        json!({"action": "approve"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let response = moderate(app.clone(), "not-a-uuid", json!({"action": "approve"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Contribution with id not-a-uuid not found");

    let response = get_auth(app, "/api/v1/admin/contributions/not-a-uuid", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_unparseable_moderation_body_is_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());
    let id = submit(app.clone(), "new_region", json!({"code": "x", "name_fr": "X"})).await;

    let request = Request::post(format!("/api/v1/admin/contributions/{id}/moderate"))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", admin_token()))
        .body(Body::from("{\"action\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
    assert_eq!(store.list_pending().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_approval_is_conflict() {
    let store = Arc::new(MemoryStore::new());
    let app = common::build_test_app(store.clone());

    let id = submit(app.clone(), "new_region", json!({"code": "x", "name_fr": "X"})).await;
    assert_eq!(moderate(app.clone(), &id, json!({"action": "approve"})).await.status(), StatusCode::OK);

    let response = moderate(app, &id, json!({"action": "approve"})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(store.write_count(), 1);
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_queue_lists_pending_by_default_and_filters_by_status() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()));

    let first = submit(app.clone(), "new_region", json!({"code": "a", "name_fr": "A"})).await;
    let second = submit(app.clone(), "new_region", json!({"code": "b", "name_fr": "B"})).await;
    moderate(app.clone(), &first, json!({"action": "reject"})).await;

    let response = get_auth(app.clone(), "/api/v1/admin/contributions", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let pending = body_json(response).await;
    let ids: Vec<&str> = pending["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![second.as_str()]);

    let response = get_auth(
        app.clone(),
        "/api/v1/admin/contributions?status=rejected",
        &admin_token(),
    )
    .await;
    let rejected = body_json(response).await;
    assert_eq!(rejected["data"][0]["id"], first.as_str());
    assert_eq!(rejected["data"][0]["type"], "new_region");

    let response = get_auth(app, "/api/v1/admin/contributions?status=archived", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_single_contribution() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()));
    let id = submit(app.clone(), "new_region", json!({"code": "x", "name_fr": "X"})).await;

    let response = get_auth(
        app,
        &format!("/api/v1/admin/contributions/{id}"),
        &admin_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id.as_str());
    assert_eq!(json["data"]["proposed_payload"]["code"], "x");
}
