//! The local product store seam and its Postgres implementation.

use async_trait::async_trait;
use shelfscan_catalog::CatalogProduct;
use shelfscan_core::{ProductRecord, ProductSource};
use shelfscan_db::{DbError, NewProductRow};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer already stored a product under this identifier.
    #[error("product {identifier} is already stored")]
    Conflict { identifier: String },

    #[error(transparent)]
    Db(#[from] DbError),

    /// Any other backend failure that has no richer representation.
    #[error("product store unavailable: {0}")]
    Unavailable(String),
}

/// Key-addressed product table: exact-match select and insert.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Returns the product stored under `identifier`, if any.
    async fn find_by_identifier(&self, identifier: &str)
        -> Result<Option<ProductRecord>, StoreError>;

    /// Stores a catalog hit and returns the stored record.
    ///
    /// Must fail with [`StoreError::Conflict`] when the identifier is already
    /// present; it never overwrites an existing row.
    async fn insert(&self, product: &CatalogProduct) -> Result<ProductRecord, StoreError>;
}

/// [`ProductStore`] backed by the `products` table.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let row = shelfscan_db::find_product_by_identifier(&self.pool, identifier).await?;
        Ok(row.map(shelfscan_db::ProductRow::into_local_record))
    }

    async fn insert(&self, product: &CatalogProduct) -> Result<ProductRecord, StoreError> {
        let record = product.to_record();
        let new = NewProductRow {
            record: &record,
            raw: Some(&product.raw),
        };
        match shelfscan_db::insert_product(&self.pool, new).await {
            Ok(row) => Ok(row.into_record(ProductSource::Api)),
            Err(e) if e.is_unique_violation() => Err(StoreError::Conflict {
                identifier: product.identifier.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
