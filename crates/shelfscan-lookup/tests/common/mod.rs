//! In-memory fakes for the store and catalog seams.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use shelfscan_catalog::{CatalogError, CatalogProduct};
use shelfscan_core::{ProductRecord, ProductSource};
use shelfscan_lookup::{CatalogSource, ProductStore, Resolver, StoreError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

pub fn record(identifier: &str, name: &str) -> ProductRecord {
    ProductRecord {
        identifier: identifier.to_owned(),
        name: Some(name.to_owned()),
        brand: None,
        image_url: None,
        category: None,
        description: None,
        source: ProductSource::Local,
    }
}

pub fn catalog_product(identifier: &str, name: &str) -> CatalogProduct {
    CatalogProduct {
        identifier: identifier.to_owned(),
        name: Some(name.to_owned()),
        brand: Some("Acme".to_owned()),
        image_url: None,
        category: None,
        description: None,
        raw: json!({ "gtin": identifier, "description": name }),
        placeholder: false,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, ProductRecord>>,
    pub finds: AtomicUsize,
    pub inserts: AtomicUsize,
    pub fail_finds: AtomicBool,
    pub fail_inserts: AtomicBool,
    /// Row that appears "from another writer" the moment an insert is tried.
    racing_row: Mutex<Option<ProductRecord>>,
    /// Each find sleeps this long after starting; it cannot be interrupted.
    find_delay: Option<Duration>,
    /// Signalled when a find begins.
    pub find_started: Notify,
}

impl MemoryStore {
    pub fn with_rows(rows: impl IntoIterator<Item = ProductRecord>) -> Self {
        let store = Self::default();
        {
            let mut map = store.rows.lock().unwrap();
            for row in rows {
                map.insert(row.identifier.clone(), row);
            }
        }
        store
    }

    pub fn delayed_finds(mut self, delay: Duration) -> Self {
        self.find_delay = Some(delay);
        self
    }

    pub fn race_with(&self, row: ProductRecord) {
        *self.racing_row.lock().unwrap() = Some(row);
    }

    pub fn get(&self, identifier: &str) -> Option<ProductRecord> {
        self.rows.lock().unwrap().get(identifier).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<ProductRecord>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.find_started.notify_one();
        if let Some(delay) = self.find_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_finds.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_owned()));
        }
        Ok(self.get(identifier))
    }

    async fn insert(&self, product: &CatalogProduct) -> Result<ProductRecord, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".to_owned()));
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(racer) = self.racing_row.lock().unwrap().take() {
            rows.insert(racer.identifier.clone(), racer);
        }
        if rows.contains_key(&product.identifier) {
            return Err(StoreError::Conflict {
                identifier: product.identifier.clone(),
            });
        }
        let stored = product.to_record();
        rows.insert(stored.identifier.clone(), stored.clone());
        Ok(stored)
    }
}

/// What the fake catalog answers for one identifier.
#[derive(Clone)]
pub enum Scripted {
    Hit(CatalogProduct),
    Unauthorized(u16),
    RateLimited(Option<u64>),
    Status(u16),
    /// The lookup panics.
    Panic,
}

#[derive(Default)]
pub struct ScriptedCatalog {
    answers: HashMap<String, Scripted>,
    delay: Option<Duration>,
    placeholder_mode: bool,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, identifier: &str, answer: Scripted) -> Self {
        self.answers.insert(identifier.to_owned(), answer);
        self
    }

    /// Every call waits this long before answering, unless cancelled.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn placeholder(mut self) -> Self {
        self.placeholder_mode = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn called(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn lookup(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogProduct>, CatalogError> {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        self.calls.lock().unwrap().push(identifier.to_owned());
        if self.placeholder_mode {
            return Ok(Some(CatalogProduct::placeholder(identifier)));
        }
        if let Some(delay) = self.delay {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(CatalogError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
        match self.answers.get(identifier).cloned() {
            None => Ok(None),
            Some(Scripted::Hit(product)) => Ok(Some(product)),
            Some(Scripted::Unauthorized(status)) => Err(CatalogError::Unauthorized { status }),
            Some(Scripted::RateLimited(retry_after_secs)) => {
                Err(CatalogError::RateLimited { retry_after_secs })
            }
            Some(Scripted::Status(status)) => Err(CatalogError::UnexpectedStatus {
                status,
                url: format!("https://catalog.test/gtins/{identifier}.json"),
            }),
            Some(Scripted::Panic) => panic!("catalog fake panicked on {identifier}"),
        }
    }
}

pub fn resolver(store: &Arc<MemoryStore>, catalog: &Arc<ScriptedCatalog>) -> Resolver {
    Resolver::new(
        Arc::clone(store) as Arc<dyn ProductStore>,
        Arc::clone(catalog) as Arc<dyn CatalogSource>,
    )
}
