//! Live integration tests for shelfscan-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/shelfscan-db/`).

use chrono::NaiveDate;
use shelfscan_core::{NewInventoryItem, ProductRecord, ProductSource};
use shelfscan_db::{
    add_user_inventory, find_product_by_identifier, insert_product, list_user_inventory, DbError,
    NewProductRow,
};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_record(identifier: &str) -> ProductRecord {
    ProductRecord {
        identifier: identifier.to_string(),
        name: Some("Widget".to_string()),
        brand: Some("Acme".to_string()),
        image_url: None,
        category: Some("Tools".to_string()),
        description: None,
        source: ProductSource::Api,
    }
}

/// Insert a product row and return its generated `id`.
async fn insert_test_product(pool: &sqlx::PgPool, identifier: &str) -> i64 {
    let record = make_record(identifier);
    insert_product(
        pool,
        NewProductRow {
            record: &record,
            raw: None,
        },
    )
    .await
    .unwrap_or_else(|e| panic!("insert_test_product failed for '{identifier}': {e}"))
    .id
}

fn make_item(user_id: Uuid, product_id: i64) -> NewInventoryItem {
    NewInventoryItem {
        user_id,
        product_id,
        quantity: None,
        expiration_date: None,
    }
}

// ---------------------------------------------------------------------------
// Section 1: Products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn insert_then_find_by_identifier(pool: sqlx::PgPool) {
    let record = make_record("012345678905");
    let raw = serde_json::json!({ "description": "Widget", "brand": { "name": "Acme" } });

    let inserted = insert_product(
        &pool,
        NewProductRow {
            record: &record,
            raw: Some(&raw),
        },
    )
    .await
    .expect("insert_product failed");

    assert_eq!(inserted.identifier, "012345678905");
    assert_eq!(inserted.source, "api");

    let found = find_product_by_identifier(&pool, "012345678905")
        .await
        .expect("find_product_by_identifier failed")
        .expect("row should exist");

    assert_eq!(found.id, inserted.id);
    assert_eq!(found.name.as_deref(), Some("Widget"));
    assert_eq!(found.brand.as_deref(), Some("Acme"));
    assert_eq!(found.raw, Some(raw));

    let local = found.into_local_record();
    assert_eq!(local.source, ProductSource::Local);
}

#[sqlx::test(migrations = "../../migrations")]
async fn find_is_exact_match_only(pool: sqlx::PgPool) {
    insert_test_product(&pool, "012345678905").await;

    let missing = find_product_by_identifier(&pool, "12345678905")
        .await
        .expect("find_product_by_identifier failed");
    assert!(missing.is_none(), "lookup must not match a different form");
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_insert_is_unique_violation(pool: sqlx::PgPool) {
    insert_test_product(&pool, "012345678905").await;

    let record = make_record("012345678905");
    let err = insert_product(
        &pool,
        NewProductRow {
            record: &record,
            raw: None,
        },
    )
    .await
    .expect_err("second insert should fail");

    assert!(err.is_unique_violation(), "got: {err:?}");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE identifier = $1")
        .bind("012345678905")
        .fetch_one(&pool)
        .await
        .expect("count query failed");
    assert_eq!(count, 1, "existing row must not be overwritten or duplicated");
}

// ---------------------------------------------------------------------------
// Section 2: Inventory
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn inventory_quantity_is_clamped_to_one(pool: sqlx::PgPool) {
    let product_id = insert_test_product(&pool, "012345678905").await;
    let user_id = Uuid::new_v4();

    let defaulted = add_user_inventory(&pool, &make_item(user_id, product_id))
        .await
        .expect("add with no quantity failed");
    assert_eq!(defaulted.quantity, 1);

    let mut negative = make_item(user_id, product_id);
    negative.quantity = Some(-4);
    let clamped = add_user_inventory(&pool, &negative)
        .await
        .expect("add with negative quantity failed");
    assert_eq!(clamped.quantity, 1);

    let mut several = make_item(user_id, product_id);
    several.quantity = Some(3);
    let kept = add_user_inventory(&pool, &several)
        .await
        .expect("add with quantity 3 failed");
    assert_eq!(kept.quantity, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn inventory_requires_an_existing_product(pool: sqlx::PgPool) {
    let err = add_user_inventory(&pool, &make_item(Uuid::new_v4(), 9_999))
        .await
        .expect_err("foreign key should reject unknown product");

    match err {
        DbError::Sqlx(sqlx::Error::Database(db_err)) => {
            assert_eq!(db_err.code().as_deref(), Some("23503"), "expected FK violation");
        }
        other => panic!("expected a database error, got: {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn inventory_rejects_nil_user_before_querying(pool: sqlx::PgPool) {
    let product_id = insert_test_product(&pool, "012345678905").await;

    let err = add_user_inventory(&pool, &make_item(Uuid::nil(), product_id))
        .await
        .expect_err("nil user should be rejected");
    assert!(matches!(err, DbError::Invalid(_)), "got: {err:?}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_orders_by_expiration_with_undated_last(pool: sqlx::PgPool) {
    let product_id = insert_test_product(&pool, "012345678905").await;
    let user_id = Uuid::new_v4();
    let other_user = Uuid::new_v4();

    let dates = [
        None,
        NaiveDate::from_ymd_opt(2026, 12, 31),
        NaiveDate::from_ymd_opt(2026, 11, 1),
    ];
    for date in dates {
        let mut item = make_item(user_id, product_id);
        item.expiration_date = date;
        add_user_inventory(&pool, &item)
            .await
            .expect("add_user_inventory failed");
    }
    add_user_inventory(&pool, &make_item(other_user, product_id))
        .await
        .expect("add for other user failed");

    let rows = list_user_inventory(&pool, user_id)
        .await
        .expect("list_user_inventory failed");

    let listed: Vec<Option<NaiveDate>> = rows.iter().map(|r| r.expiration_date).collect();
    assert_eq!(
        listed,
        vec![
            NaiveDate::from_ymd_opt(2026, 11, 1),
            NaiveDate::from_ymd_opt(2026, 12, 31),
            None,
        ]
    );
    assert!(rows.iter().all(|r| r.user_id == user_id));
}
