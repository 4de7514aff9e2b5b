//! Deterministic-when-seeded stand-in for real store catalogs.
//!
//! Every call sleeps for a simulated network delay and then invents 3 to 5
//! plausible listings derived from the search term and the store's price
//! level.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use comparador_core::{format_colones, ProductRecord, Store, NO_PROMO_PRICE};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::StoreCatalog;
use crate::error::CatalogError;

/// Characters escaped in URI components: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub(crate) const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const MIN_PRODUCTS: usize = 3;
const MAX_PRODUCTS: usize = 5;
const MIN_BASE_PRICE: u64 = 100_000;
const BASE_PRICE_SPAN: u64 = 500_000;
const PROMO_PROBABILITY: f64 = 0.6;
const IMAGE_TEXT_CHARS: usize = 15;
const IMAGE_BASE_URL: &str = "https://via.placeholder.com/300x300/4A90E2/FFFFFF?text=";

/// Simulated per-call network delay, inclusive on both ends.
///
/// Always `min_ms <= max_ms`; the only constructors order the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency {
    min_ms: u64,
    max_ms: u64,
}

impl MockLatency {
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    /// No delay at all; for tests.
    #[must_use]
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    #[must_use]
    pub fn min_ms(&self) -> u64 {
        self.min_ms
    }

    #[must_use]
    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }
}

impl Default for MockLatency {
    fn default() -> Self {
        Self::new(500, 1500)
    }
}

pub struct MockCatalog {
    rng: Mutex<StdRng>,
    latency: MockLatency,
}

impl MockCatalog {
    /// Reproducible catalog: the same seed yields the same listings.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency: MockLatency::default(),
        }
    }

    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
            latency: MockLatency::default(),
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: MockLatency) -> Self {
        self.latency = latency;
        self
    }

    fn draw_delay(&self) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Duration::from_millis(rng.random_range(self.latency.min_ms..=self.latency.max_ms))
    }

    /// Invents the listings for one call. The lock is held only here, never
    /// across an await.
    fn generate(&self, store: Store, term: &str) -> Vec<ProductRecord> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let count = rng.random_range(MIN_PRODUCTS..=MAX_PRODUCTS);
        let slug = utf8_percent_encode(&slugify(term), URI_COMPONENT).to_string();
        let image_text: String = term.chars().take(IMAGE_TEXT_CHARS).collect();
        let image_url = format!(
            "{IMAGE_BASE_URL}{}",
            utf8_percent_encode(&image_text, URI_COMPONENT)
        );

        ('A'..='Z')
            .zip(1..=count)
            .map(|(model, position)| {
                let base = MIN_BASE_PRICE + rng.random_range(0..BASE_PRICE_SPAN);
                let regular = base * store.price_multiplier_bp() / 10_000;
                let promo_price = if rng.random_bool(PROMO_PROBABILITY) {
                    format_colones(regular * 85 / 100)
                } else {
                    NO_PROMO_PRICE.to_owned()
                };

                ProductRecord {
                    name: format!("{term} - Modelo {model} {}", store.display_name()),
                    regular_price: format_colones(regular),
                    promo_price,
                    url: format!("{}/productos/{slug}-{position}", store.homepage()),
                    image_url: image_url.clone(),
                    store: store.display_name().to_owned(),
                    error: None,
                }
            })
            .collect()
    }
}

#[async_trait]
impl StoreCatalog for MockCatalog {
    async fn search(&self, store: Store, term: &str) -> Result<Vec<ProductRecord>, CatalogError> {
        let delay = self.draw_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.generate(store, term))
    }

    fn label(&self) -> &'static str {
        "mock"
    }
}

/// Lowercases `term` and collapses whitespace runs into single dashes.
fn slugify(term: &str) -> String {
    let lower = term.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut in_space = false;
    for ch in lower.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(ch);
            in_space = false;
        }
    }
    slug
}
