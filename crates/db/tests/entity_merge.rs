use atlas_core::contribution::ContributionType;
use atlas_core::entity::EntityKind;
use atlas_core::merge::MergeOperation;
use atlas_core::store::{EntityWriter, StoreError};
use atlas_core::types::EntityRow;
use atlas_db::repositories::EntityRepo;
use atlas_db::store::PgStore;
use serde_json::{json, Value};
use sqlx::PgPool;

fn payload(value: Value) -> EntityRow {
    value.as_object().cloned().unwrap()
}

// ---------------------------------------------------------------------------
// Inserts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_new_country_is_inserted_with_typed_columns(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let op = MergeOperation::plan(
        ContributionType::NewCountry,
        &payload(json!({
            "slug": "pays_x",
            "name_fr": "Pays X",
            "region_id": "afrique_du_nord",
            "population_2025": 1000,
            "percentage_in_region": "2.5",
        })),
    );

    assert_eq!(store.apply(&op).await.unwrap(), 1);

    let country = EntityRepo::find_country_by_slug(&pool, "pays_x")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(country.population_2025, Some(1000));
    assert_eq!(country.percentage_in_region, Some(2.5));
    assert_eq!(country.region_id.as_deref(), Some("afrique_du_nord"));
    assert!(!country.id.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_slug_reports_constraint(pool: PgPool) {
    let store = PgStore::new(pool);
    let op = MergeOperation::plan(
        ContributionType::NewCountry,
        &payload(json!({"slug": "pays_x", "name_fr": "Pays X"})),
    );
    store.apply(&op).await.unwrap();

    let err = store.apply(&op).await.unwrap_err();
    match err {
        StoreError::Backend(msg) => assert!(msg.contains("uq_countries_slug"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_required_column_fails(pool: PgPool) {
    let store = PgStore::new(pool);
    let op = MergeOperation::plan(
        ContributionType::NewEthnicity,
        &payload(json!({"slug": "peul"})),
    );
    let err = store.apply(&op).await.unwrap_err();
    assert!(err.to_string().contains("name_fr"), "{err}");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_column_never_reaches_database(pool: PgPool) {
    let store = PgStore::new(pool);
    let op = MergeOperation::plan(
        ContributionType::NewRegion,
        &payload(json!({"code": "x", "name_fr": "X", "capital; DROP TABLE countries": 1})),
    );
    let err = store.apply(&op).await.unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_update_region_by_code(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let op = MergeOperation::plan(
        ContributionType::UpdateRegion,
        &payload(json!({"code": "afrique_du_nord", "total_population": 999})),
    );

    assert_eq!(store.apply(&op).await.unwrap(), 1);

    let region = EntityRepo::find_region_by_code(&pool, "afrique_du_nord")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(region.total_population, Some(999));
    assert_eq!(region.name_fr, "Afrique du Nord");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_with_unmatched_key_affects_nothing(pool: PgPool) {
    let store = PgStore::new(pool);
    let op = MergeOperation::plan(
        ContributionType::UpdateCountry,
        &payload(json!({"slug": "nowhere", "population_2025": 1})),
    );
    assert_eq!(store.apply(&op).await.unwrap(), 0);

    let keyless = MergeOperation::Update {
        entity: EntityKind::Country,
        key: Value::Null,
        changes: payload(json!({"population_2025": 1})),
    };
    assert_eq!(store.apply(&keyless).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_presence_insert_and_update_by_id(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    store
        .apply(&MergeOperation::plan(
            ContributionType::NewCountry,
            &payload(json!({"id": "c1", "slug": "pays_x", "name_fr": "Pays X"})),
        ))
        .await
        .unwrap();
    store
        .apply(&MergeOperation::plan(
            ContributionType::NewEthnicity,
            &payload(json!({"id": "g1", "slug": "peul", "name_fr": "Peuls"})),
        ))
        .await
        .unwrap();
    store
        .apply(&MergeOperation::plan(
            ContributionType::NewPresence,
            &payload(json!({"id": "p1", "ethnic_group_id": "g1", "country_id": "c1", "population": 10})),
        ))
        .await
        .unwrap();

    let update = MergeOperation::plan(
        ContributionType::UpdatePresence,
        &payload(json!({"id": "p1", "population": 20})),
    );
    assert_eq!(store.apply(&update).await.unwrap(), 1);

    let presence = EntityRepo::find_presence(&pool, "g1", "c1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(presence.population, Some(20));
}
