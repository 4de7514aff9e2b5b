use async_trait::async_trait;
use comparador_core::{ProductRecord, Store};

use crate::error::CatalogError;

/// Source of product listings for a single store.
///
/// Implementations may fail freely; [`crate::adapter::query_store`] turns
/// every failure into an error record so callers never see an `Err`.
#[async_trait]
pub trait StoreCatalog: Send + Sync {
    /// Returns the listings `store` has for `term`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the listings cannot be produced.
    async fn search(&self, store: Store, term: &str) -> Result<Vec<ProductRecord>, CatalogError>;

    /// Short label for logs and the health endpoint.
    fn label(&self) -> &'static str;
}
