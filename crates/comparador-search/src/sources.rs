use std::sync::Arc;

use comparador_core::{AppConfig, CatalogKind};
use comparador_llm::{ChatCompletionsClient, LlmError};

use crate::batch::{ComparisonSource, GenerativeComparisons, MockComparisons};
use crate::catalog::StoreCatalog;
use crate::fanout::Aggregator;
use crate::generative::GenerativeCatalog;
use crate::mock::{MockCatalog, MockLatency};

/// The catalog and comparison source selected by configuration.
#[derive(Clone)]
pub struct Sources {
    pub catalog: Arc<dyn StoreCatalog>,
    pub comparisons: Arc<dyn ComparisonSource>,
}

impl Sources {
    /// Builds the sources for `config.catalog`.
    ///
    /// A configured mock seed makes both mock sources reproducible. The
    /// generative sources share one chat-completions client.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the chat-completions client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        match config.catalog {
            CatalogKind::Mock => {
                let latency =
                    MockLatency::new(config.mock_delay_min_ms, config.mock_delay_max_ms);
                let (catalog, comparisons) = match config.mock_seed {
                    Some(seed) => (
                        MockCatalog::seeded(seed),
                        MockComparisons::seeded(seed.wrapping_add(1)),
                    ),
                    None => (MockCatalog::from_os_rng(), MockComparisons::from_os_rng()),
                };
                tracing::info!(
                    seed = ?config.mock_seed,
                    min_delay_ms = latency.min_ms(),
                    max_delay_ms = latency.max_ms(),
                    "using mock catalog"
                );
                Ok(Self {
                    catalog: Arc::new(catalog.with_latency(latency)),
                    comparisons: Arc::new(comparisons),
                })
            }
            CatalogKind::Generative => {
                let client = Arc::new(ChatCompletionsClient::new(&config.llm)?);
                tracing::info!(
                    model = client.model(),
                    base_url = %config.llm.base_url,
                    "using generative catalog"
                );
                Ok(Self {
                    catalog: Arc::new(GenerativeCatalog::new(Arc::clone(&client))),
                    comparisons: Arc::new(GenerativeComparisons::new(client)),
                })
            }
        }
    }

    #[must_use]
    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(Arc::clone(&self.catalog))
    }
}
