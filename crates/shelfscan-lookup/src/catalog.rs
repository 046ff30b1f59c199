//! The remote catalog seam.

use async_trait::async_trait;
use shelfscan_catalog::{CatalogClient, CatalogError, CatalogProduct};
use tokio_util::sync::CancellationToken;

/// Anything that can look a single identifier up in a product catalog.
///
/// `Ok(None)` means "unknown identifier, try the next candidate"; every
/// `Err` ends the resolution.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn lookup(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogProduct>, CatalogError>;
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn lookup(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogProduct>, CatalogError> {
        CatalogClient::lookup(self, identifier, cancel).await
    }
}
