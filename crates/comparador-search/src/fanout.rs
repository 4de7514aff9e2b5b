//! Fan-out of one search term across the selected stores.
//!
//! Every store runs in its own spawned task, so a panicking catalog costs
//! that store's results and nothing else. Results are collected into
//! [`StoreResults`], which remembers the order stores finished in.

use std::sync::Arc;

use comparador_core::{
    FailureKind, ProductRecord, SearchMode, Store, StoreFailure, StoreSelection,
};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio::task::{JoinError, JoinHandle};

use crate::adapter::query_store;
use crate::catalog::StoreCatalog;

/// Per-store records in insertion order.
///
/// Serializes as a JSON object keyed by store id, in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreResults {
    entries: Vec<(Store, Vec<ProductRecord>)>,
}

impl StoreResults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the records for `store`; a repeated store replaces its earlier
    /// records in place.
    pub fn insert(&mut self, store: Store, records: Vec<ProductRecord>) {
        match self.entries.iter_mut().find(|(s, _)| *s == store) {
            Some((_, existing)) => *existing = records,
            None => self.entries.push((store, records)),
        }
    }

    #[must_use]
    pub fn get(&self, store: Store) -> Option<&[ProductRecord]> {
        self.entries
            .iter()
            .find(|(s, _)| *s == store)
            .map(|(_, records)| records.as_slice())
    }

    /// Removes and returns the records for `store`.
    pub fn take(&mut self, store: Store) -> Option<Vec<ProductRecord>> {
        let pos = self.entries.iter().position(|(s, _)| *s == store)?;
        Some(self.entries.remove(pos).1)
    }

    /// Stores in insertion order.
    #[must_use]
    pub fn stores(&self) -> Vec<Store> {
        self.entries.iter().map(|(s, _)| *s).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Store, &[ProductRecord])> {
        self.entries.iter().map(|(s, records)| (*s, records.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores whose only result is an error record.
    #[must_use]
    pub fn failed_stores(&self) -> Vec<Store> {
        self.iter()
            .filter(|(_, records)| {
                !records.is_empty() && records.iter().all(ProductRecord::is_error)
            })
            .map(|(store, _)| store)
            .collect()
    }
}

impl Serialize for StoreResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (store, records) in &self.entries {
            map.serialize_entry(store.id(), records)?;
        }
        map.end()
    }
}

/// Dispatches a search to every selected store and gathers the results.
#[derive(Clone)]
pub struct Aggregator {
    catalog: Arc<dyn StoreCatalog>,
}

impl Aggregator {
    pub fn new(catalog: Arc<dyn StoreCatalog>) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog_label(&self) -> &'static str {
        self.catalog.label()
    }

    /// Searches `term` in every store of `selection`.
    ///
    /// The result always holds exactly the selected stores. Insertion order
    /// is completion order in [`SearchMode::Concurrent`] and store order in
    /// [`SearchMode::Sequential`].
    pub async fn search(
        &self,
        term: &str,
        selection: StoreSelection,
        mode: SearchMode,
    ) -> StoreResults {
        let stores = selection.stores();
        let term: Arc<str> = Arc::from(term);
        tracing::info!(term = %term, stores = stores.len(), mode = %mode, "fan-out started");

        let mut results = StoreResults::new();
        match mode {
            SearchMode::Concurrent => {
                let mut pending: FuturesUnordered<_> = stores
                    .iter()
                    .map(|&store| {
                        let handle = self.spawn_branch(store, Arc::clone(&term));
                        async move { (store, settle(store, handle.await)) }
                    })
                    .collect();
                while let Some((store, records)) = pending.next().await {
                    results.insert(store, records);
                }
            }
            SearchMode::Sequential => {
                for &store in &stores {
                    let joined = self.spawn_branch(store, Arc::clone(&term)).await;
                    results.insert(store, settle(store, joined));
                }
            }
        }

        tracing::info!(
            term = %term,
            failed = results.failed_stores().len(),
            "fan-out finished"
        );
        results
    }

    fn spawn_branch(&self, store: Store, term: Arc<str>) -> JoinHandle<Vec<ProductRecord>> {
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move { query_store(catalog.as_ref(), store, &term).await })
    }
}

/// A branch that panicked or was cancelled reports an aborted-store record.
fn settle(store: Store, joined: Result<Vec<ProductRecord>, JoinError>) -> Vec<ProductRecord> {
    joined.unwrap_or_else(|e| {
        tracing::error!(store = %store, error = %e, "store task aborted");
        vec![ProductRecord::failed(StoreFailure::new(store, FailureKind::Aborted))]
    })
}

#[cfg(test)]
#[path = "fanout_test.rs"]
mod tests;
