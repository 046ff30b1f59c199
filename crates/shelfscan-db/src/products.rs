//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use shelfscan_core::{ProductRecord, ProductSource};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    /// Normalized barcode digits; unique across the table.
    pub identifier: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// `"api"` for rows written after a catalog hit, `"local"` otherwise.
    pub source: String,
    /// Unmodified catalog response body, when the row came from the catalog.
    pub raw: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl ProductRow {
    /// Converts the row into a [`ProductRecord`] tagged as a local-store hit.
    #[must_use]
    pub fn into_local_record(self) -> ProductRecord {
        self.into_record(ProductSource::Local)
    }

    /// Converts the row into a [`ProductRecord`] carrying the given source.
    #[must_use]
    pub fn into_record(self, source: ProductSource) -> ProductRecord {
        ProductRecord {
            identifier: self.identifier,
            name: self.name,
            brand: self.brand,
            image_url: self.image_url,
            category: self.category,
            description: self.description,
            source,
        }
    }
}

/// Values for a new `products` row.
#[derive(Debug, Clone)]
pub struct NewProductRow<'a> {
    pub record: &'a ProductRecord,
    pub raw: Option<&'a serde_json::Value>,
}

const PRODUCT_COLUMNS: &str =
    "id, identifier, name, brand, image_url, category, description, source, raw, created_at";

/// Fetches the product stored under `identifier`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_product_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE identifier = $1 LIMIT 1"
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new product row and returns it.
///
/// This is a plain insert: a row that already holds the same `identifier`
/// makes it fail with a unique violation (see
/// [`DbError::is_unique_violation`]) so the caller can decide whether to
/// adopt the existing row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including on conflict.
pub async fn insert_product(pool: &PgPool, new: NewProductRow<'_>) -> Result<ProductRow, DbError> {
    let record = new.record;
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products \
             (identifier, name, brand, image_url, category, description, source, raw) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&record.identifier)
    .bind(&record.name)
    .bind(&record.brand)
    .bind(&record.image_url)
    .bind(&record.category)
    .bind(&record.description)
    .bind(record.source.as_str())
    .bind(new.raw.cloned())
    .fetch_one(pool)
    .await?;

    Ok(row)
}
