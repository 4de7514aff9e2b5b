use comparador_core::{ProductRecord, Store, StoreFailure};

use crate::catalog::StoreCatalog;

/// Queries one store and never fails.
///
/// A catalog error becomes a single error record tagged with the store and
/// the failure kind; a successful answer is passed through unchanged.
pub async fn query_store(
    catalog: &dyn StoreCatalog,
    store: Store,
    term: &str,
) -> Vec<ProductRecord> {
    tracing::info!(
        store = %store,
        term,
        catalog = catalog.label(),
        "store search started"
    );

    match catalog.search(store, term).await {
        Ok(records) => {
            tracing::info!(store = %store, count = records.len(), "store search finished");
            records
        }
        Err(e) => {
            let failure = StoreFailure::new(store, e.kind());
            tracing::warn!(
                store = %store,
                code = failure.code(),
                error = %e,
                "store search failed"
            );
            vec![ProductRecord::failed(failure)]
        }
    }
}
