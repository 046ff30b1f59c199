//! Database operations for the `user_inventory` table.

use chrono::{DateTime, NaiveDate, Utc};
use shelfscan_core::NewInventoryItem;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `user_inventory` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InventoryRow {
    pub id: i64,
    pub user_id: Uuid,
    pub product_id: i64,
    /// Always at least 1 (enforced by a `CHECK` constraint).
    pub quantity: i32,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Adds a product to a user's inventory and returns the new row.
///
/// Quantity is normalized via [`NewInventoryItem::normalized_quantity`].
///
/// # Errors
///
/// - [`DbError::Invalid`] if the item fails [`NewInventoryItem::validate`].
/// - [`DbError::Sqlx`] if the insert fails (for example when `product_id`
///   does not reference an existing product).
pub async fn add_user_inventory(
    pool: &PgPool,
    item: &NewInventoryItem,
) -> Result<InventoryRow, DbError> {
    item.validate()?;
    let row = sqlx::query_as::<_, InventoryRow>(
        "INSERT INTO user_inventory (user_id, product_id, quantity, expiration_date) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, user_id, product_id, quantity, expiration_date, created_at",
    )
    .bind(item.user_id)
    .bind(item.product_id)
    .bind(item.normalized_quantity())
    .bind(item.expiration_date)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Lists a user's inventory, soonest expiration first (undated items last).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_user_inventory(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<InventoryRow>, DbError> {
    let rows = sqlx::query_as::<_, InventoryRow>(
        "SELECT id, user_id, product_id, quantity, expiration_date, created_at \
         FROM user_inventory \
         WHERE user_id = $1 \
         ORDER BY expiration_date ASC NULLS LAST, id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
