//! Candidate-by-candidate resolution of a scanned code.

use std::sync::Arc;

use shelfscan_catalog::CatalogError;
use shelfscan_core::{candidate_identifiers, ProductRecord};
use tokio_util::sync::CancellationToken;

use crate::catalog::CatalogSource;
use crate::local::find_local;
use crate::persist::persist_catalog_hit;
use crate::store::ProductStore;

/// How a found product was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Already in the local store; the catalog was not called.
    LocalStore,
    /// Fetched from the catalog and saved.
    CatalogSaved,
    /// Fetched from the catalog, but another writer stored it first; the
    /// stored row is returned.
    CatalogExisting,
    /// Fetched from the catalog; saving failed, so it is shown but not kept.
    CatalogUnsaved,
    /// No catalog credential: a stand-in record, never saved.
    Placeholder,
}

impl Provenance {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::LocalStore => "local store",
            Provenance::CatalogSaved => "catalog, saved",
            Provenance::CatalogExisting => "catalog, already stored",
            Provenance::CatalogUnsaved => "catalog, not saved",
            Provenance::Placeholder => "placeholder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The scan contained no digits.
    NoCode,
    /// Every candidate was tried and none matched.
    NoMatch { candidates: Vec<String> },
}

/// Terminal outcome of one resolution run.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found {
        product: ProductRecord,
        provenance: Provenance,
    },
    NotFound {
        reason: NotFoundReason,
    },
    AuthFailure {
        status: u16,
    },
    RateLimited {
        retry_after_secs: Option<u64>,
    },
    /// Any other catalog failure. `detail` is for logs only.
    TransportError {
        status: Option<u16>,
        detail: String,
    },
    Cancelled,
}

impl Resolution {
    /// The resolved product, if any.
    #[must_use]
    pub fn product(&self) -> Option<&ProductRecord> {
        match self {
            Resolution::Found { product, .. } => Some(product),
            _ => None,
        }
    }

    fn from_catalog_error(err: CatalogError) -> Self {
        match err {
            CatalogError::Cancelled => Resolution::Cancelled,
            CatalogError::Unauthorized { status } => Resolution::AuthFailure { status },
            CatalogError::RateLimited { retry_after_secs } => {
                Resolution::RateLimited { retry_after_secs }
            }
            other => Resolution::TransportError {
                status: other.status(),
                detail: other.to_string(),
            },
        }
    }
}

/// Resolves scanned codes against the local store, then the catalog.
///
/// Candidates are tried strictly in priority order and one at a time: all of
/// them against the store first, then against the catalog. A local hit or a
/// terminal catalog error short-circuits everything after it. A stored row
/// under a lower-priority candidate therefore wins over a catalog hit for a
/// higher-priority one, and the catalog is never asked.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn ProductStore>,
    catalog: Arc<dyn CatalogSource>,
}

impl Resolver {
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>, catalog: Arc<dyn CatalogSource>) -> Self {
        Self { store, catalog }
    }

    /// Resolves a raw scanned string.
    pub async fn resolve(&self, scanned: &str, cancel: &CancellationToken) -> Resolution {
        self.resolve_observed(scanned, cancel, |_| {}).await
    }

    /// Like [`Resolver::resolve`], calling `on_candidate` each time a
    /// candidate identifier starts being tried, once per store query and once
    /// per catalog call.
    pub async fn resolve_observed<F>(
        &self,
        scanned: &str,
        cancel: &CancellationToken,
        mut on_candidate: F,
    ) -> Resolution
    where
        F: FnMut(&str) + Send,
    {
        let candidates = candidate_identifiers(scanned);
        if candidates.is_empty() {
            tracing::info!(scanned, "scan contained no digits");
            return Resolution::NotFound {
                reason: NotFoundReason::NoCode,
            };
        }

        // Every candidate is checked locally before any catalog call, so a
        // stored row under a lower-priority form still avoids the network.
        for candidate in &candidates {
            if cancel.is_cancelled() {
                return Self::cancelled(candidate);
            }
            on_candidate(candidate);
            tracing::debug!(identifier = %candidate, "checking local store");

            let local = find_local(self.store.as_ref(), candidate).await;
            // The store query is not interruptible; drop its result if the
            // user cancelled while it ran.
            if cancel.is_cancelled() {
                return Self::cancelled(candidate);
            }
            if let Some(product) = local {
                tracing::info!(identifier = %candidate, "resolved from local store");
                return Resolution::Found {
                    product,
                    provenance: Provenance::LocalStore,
                };
            }
        }

        for candidate in &candidates {
            if cancel.is_cancelled() {
                return Self::cancelled(candidate);
            }
            on_candidate(candidate);
            tracing::debug!(identifier = %candidate, "querying catalog");

            match self.catalog.lookup(candidate, cancel).await {
                Ok(None) => {
                    tracing::debug!(identifier = %candidate, "catalog has no match");
                }
                Ok(Some(hit)) => {
                    let (product, provenance) =
                        persist_catalog_hit(self.store.as_ref(), &hit).await;
                    tracing::info!(identifier = %candidate, ?provenance, "resolved from catalog");
                    return Resolution::Found {
                        product,
                        provenance,
                    };
                }
                Err(e) => {
                    tracing::info!(identifier = %candidate, error = %e, "catalog lookup ended resolution");
                    return Resolution::from_catalog_error(e);
                }
            }
        }

        tracing::info!(scanned, tried = candidates.len(), "no candidate matched");
        Resolution::NotFound {
            reason: NotFoundReason::NoMatch { candidates },
        }
    }

    fn cancelled(candidate: &str) -> Resolution {
        tracing::info!(identifier = %candidate, "resolution cancelled");
        Resolution::Cancelled
    }
}
