use async_trait::async_trait;
use comparador_core::{ProductRecord, Store};
use comparador_llm::TextGenerator;

use crate::catalog::StoreCatalog;
use crate::error::{CatalogError, ExtractError};
use crate::normalize::normalize_response;
use crate::prompts;

/// Catalog answered by a generative text service.
///
/// The reply is trusted for content only: it is re-shaped by the normalizer
/// and the store label is always the one that was asked for.
pub struct GenerativeCatalog<G> {
    generator: G,
}

impl<G: TextGenerator> GenerativeCatalog<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> StoreCatalog for GenerativeCatalog<G> {
    async fn search(&self, store: Store, term: &str) -> Result<Vec<ProductRecord>, CatalogError> {
        let reply = self
            .generator
            .generate(&prompts::store_search(store, term))
            .await?;

        let records = normalize_response(&reply, store)?;
        if records.is_empty() {
            return Err(ExtractError::EmptyArray.into());
        }
        Ok(records)
    }

    fn label(&self) -> &'static str {
        "generative"
    }
}
