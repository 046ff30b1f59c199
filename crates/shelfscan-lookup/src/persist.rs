use shelfscan_catalog::CatalogProduct;
use shelfscan_core::{ProductRecord, ProductSource};

use crate::resolver::Provenance;
use crate::store::{ProductStore, StoreError};

/// Writes a catalog hit to the local store.
///
/// The first writer for an identifier wins: on a conflict the stored row is
/// re-read and returned instead. Any other failure still hands back the
/// catalog data, tagged [`Provenance::CatalogUnsaved`]. Placeholder products
/// are never written.
pub(crate) async fn persist_catalog_hit(
    store: &dyn ProductStore,
    product: &CatalogProduct,
) -> (ProductRecord, Provenance) {
    if product.placeholder {
        return (product.to_record(), Provenance::Placeholder);
    }

    match store.insert(product).await {
        Ok(stored) => (stored.with_source(ProductSource::Api), Provenance::CatalogSaved),
        Err(StoreError::Conflict { .. }) => adopt_existing(store, product).await,
        Err(e) => {
            tracing::warn!(
                identifier = %product.identifier,
                error = %e,
                "failed to save catalog product; showing it unsaved"
            );
            (product.to_record(), Provenance::CatalogUnsaved)
        }
    }
}

async fn adopt_existing(
    store: &dyn ProductStore,
    product: &CatalogProduct,
) -> (ProductRecord, Provenance) {
    match store.find_by_identifier(&product.identifier).await {
        Ok(Some(existing)) => {
            tracing::debug!(
                identifier = %product.identifier,
                "product was stored concurrently; using the existing row"
            );
            (existing.with_source(ProductSource::Api), Provenance::CatalogExisting)
        }
        Ok(None) => {
            tracing::warn!(
                identifier = %product.identifier,
                "insert conflicted but no row was found on re-read"
            );
            (product.to_record(), Provenance::CatalogUnsaved)
        }
        Err(e) => {
            tracing::warn!(
                identifier = %product.identifier,
                error = %e,
                "re-read after insert conflict failed"
            );
            (product.to_record(), Provenance::CatalogUnsaved)
        }
    }
}
