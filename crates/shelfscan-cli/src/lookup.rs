//! `lookup`, `scan` and `candidates` command handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use shelfscan_catalog::{CatalogClient, CatalogConfig};
use shelfscan_core::AppConfig;
use shelfscan_lookup::{LookupSession, LookupSnapshot, PgProductStore, Resolver, ScanDebouncer};
use tokio::io::{AsyncBufReadExt, BufReader};

fn build_session(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<LookupSession> {
    let catalog = CatalogClient::new(&CatalogConfig::from_app_config(config))?;
    if catalog.is_placeholder_mode() {
        tracing::warn!("SHELFSCAN_CATALOG_TOKEN is not set; catalog lookups return placeholders");
    }
    let store = PgProductStore::new(pool.clone());
    Ok(LookupSession::new(Resolver::new(
        Arc::new(store),
        Arc::new(catalog),
    )))
}

pub(crate) fn run_candidates(code: &str) {
    let candidates = shelfscan_core::candidate_identifiers(code);
    if candidates.is_empty() {
        println!("no digits in {code:?}");
        return;
    }
    for candidate in candidates {
        println!("{candidate}");
    }
}

/// Resolves a single code. Ctrl-C cancels the catalog call in flight.
///
/// # Errors
///
/// Returns an error if the catalog client cannot be built or the Ctrl-C
/// handler cannot be installed.
pub(crate) async fn run_lookup(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    code: &str,
) -> anyhow::Result<()> {
    let session = build_session(pool, config)?;
    session.start(code).await;

    tokio::select! {
        _ = session.wait() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            session.cancel();
            session.wait().await;
        }
    }

    print_snapshot(&session.snapshot());
    Ok(())
}

/// Reads one scan per stdin line until EOF.
///
/// Lines arriving while a lookup runs, or within the configured cooldown
/// after the previous accepted scan, are ignored. Ctrl-C cancels the lookup
/// in flight.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or the catalog client cannot be
/// built.
pub(crate) async fn run_scan(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let session = build_session(pool, config)?;
    let mut debouncer = ScanDebouncer::new(Duration::from_millis(config.scan_cooldown_ms));
    let mut updates = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let scanned = line.trim();
                if debouncer.accept(scanned, Instant::now()) {
                    session.start(scanned).await;
                } else if !scanned.is_empty() {
                    tracing::debug!(scanned, "scan ignored");
                }
            }
            changed = updates.changed(), if debouncer.is_busy() => {
                changed?;
                let snapshot = updates.borrow_and_update().clone();
                if snapshot.status.is_terminal() {
                    print_snapshot(&snapshot);
                    debouncer.finish();
                }
            }
            signal = tokio::signal::ctrl_c(), if debouncer.is_busy() => {
                signal?;
                session.cancel();
            }
        }
    }

    // Stdin closed with a lookup still running.
    if debouncer.is_busy() && session.wait().await.is_some() {
        print_snapshot(&session.snapshot());
    }
    Ok(())
}

fn print_snapshot(snapshot: &LookupSnapshot) {
    let scanned = snapshot.scanned.as_deref().unwrap_or_default();
    let status = snapshot.status.as_str();
    match snapshot.provenance {
        Some(provenance) => println!("{scanned}: {status} ({})", provenance.as_str()),
        None => println!("{scanned}: {status}"),
    }

    if let Some(product) = &snapshot.result {
        let rows = [
            ("identifier", Some(product.identifier.as_str())),
            ("name", Some(product.display_name())),
            ("brand", product.brand.as_deref()),
            ("category", product.category.as_deref()),
            ("description", product.description.as_deref()),
            ("image", product.image_url.as_deref()),
            ("source", Some(product.source.as_str())),
        ];
        for (label, value) in rows {
            if let Some(value) = value {
                println!("  {label:<12}{value}");
            }
        }
    }

    if let Some(message) = &snapshot.message {
        println!("  {}: {}", message.title, message.body);
    }
}
