use shelfscan_core::{ProductRecord, ProductSource};

use crate::store::ProductStore;

/// Exact-match lookup in the local store.
///
/// Store errors are logged and reported as a miss so a flaky store only
/// costs this candidate, not the whole resolution.
pub(crate) async fn find_local(store: &dyn ProductStore, identifier: &str) -> Option<ProductRecord> {
    match store.find_by_identifier(identifier).await {
        Ok(found) => found.map(|record| record.with_source(ProductSource::Local)),
        Err(e) => {
            tracing::warn!(identifier, error = %e, "local product lookup failed; treating as miss");
            None
        }
    }
}
