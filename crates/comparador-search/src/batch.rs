//! Batch comparison: the summary shown after an upload and the rows of the
//! downloadable comparison workbook.
//!
//! Uploaded files are stored but never read; both outputs are produced by a
//! [`ComparisonSource`], either invented locally or generated by the text
//! service.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use comparador_core::{format_colones, BatchSummary, ComparisonRow, Store, COMPARISON_HEADERS};
use comparador_llm::TextGenerator;
use percent_encoding::utf8_percent_encode;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::error::{CatalogError, ExtractError};
use crate::mock::URI_COMPONENT;
use crate::normalize::{amount_text, extract_json_array, extract_json_object};
use crate::prompts;

/// Producer of batch summaries and comparison rows.
#[async_trait]
pub trait ComparisonSource: Send + Sync {
    /// Summarizes the processing of an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when no summary can be produced.
    async fn summarize_upload(&self, file_name: &str) -> Result<BatchSummary, CatalogError>;

    /// Rows for the comparison workbook.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the rows cannot be produced.
    async fn comparison_rows(&self) -> Result<Vec<ComparisonRow>, CatalogError>;
}

const SAMPLE_PRODUCTS: [&str; 16] = [
    "Samsung Galaxy S25 Ultra 256GB",
    "iPhone 16 Pro 128GB",
    "Xiaomi Redmi Note 14",
    "Smart TV LG 55\" 4K UHD",
    "Smart TV Samsung 65\" QLED",
    "Laptop HP Pavilion 15",
    "Laptop Lenovo IdeaPad Slim 3",
    "Refrigeradora Whirlpool 14 pies",
    "Lavadora Mabe 18 kg",
    "Microondas Panasonic 1.2 pies",
    "Aire acondicionado Midea 12000 BTU",
    "PlayStation 5 Slim",
    "Nintendo Switch OLED",
    "Audífonos Sony WH-1000XM5",
    "Cocina de gas Atlas 30\"",
    "Licuadora Oster Pro 1200",
];

const MIN_ROWS: usize = 10;
const MAX_ROWS: usize = 15;
const MIN_BASE_PRICE: u64 = 50_000;
const BASE_PRICE_SPAN: u64 = 1_200_000;
const PROMO_PROBABILITY: f64 = 0.6;

/// One store's offer while a comparison row is being built.
struct Offer {
    store: Store,
    regular: u64,
    promo: Option<u64>,
}

impl Offer {
    fn effective(&self) -> u64 {
        self.promo.unwrap_or(self.regular)
    }
}

/// Locally invented summaries and comparison rows.
pub struct MockComparisons {
    rng: Mutex<StdRng>,
}

impl MockComparisons {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    fn build_row(rng: &mut StdRng, product: &str) -> ComparisonRow {
        let base = MIN_BASE_PRICE + rng.random_range(0..BASE_PRICE_SPAN);
        let offers: Vec<Offer> = Store::ALL
            .into_iter()
            .map(|store| {
                let regular = base * store.price_multiplier_bp() / 10_000;
                let promo = rng
                    .random_bool(PROMO_PROBABILITY)
                    .then_some(regular * 85 / 100);
                Offer { store, regular, promo }
            })
            .collect();

        // Strict comparison keeps the earliest store on ties.
        let best = offers
            .iter()
            .reduce(|best, offer| {
                if offer.effective() < best.effective() {
                    offer
                } else {
                    best
                }
            })
            .map_or((Store::Gollo, base), |o| (o.store, o.effective()));

        let cell = |store: Store| {
            let offer = offers.iter().find(|o| o.store == store);
            (
                offer.map(|o| format_colones(o.regular)).unwrap_or_default(),
                offer
                    .and_then(|o| o.promo)
                    .map(format_colones)
                    .unwrap_or_default(),
            )
        };
        let (gollo_regular, gollo_promo) = cell(Store::Gollo);
        let (monge_regular, monge_promo) = cell(Store::Monge);
        let (mexpress_regular, mexpress_promo) = cell(Store::MExpress);

        let slug = product
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        ComparisonRow {
            product: product.to_owned(),
            gollo_regular,
            gollo_promo,
            monge_regular,
            monge_promo,
            mexpress_regular,
            mexpress_promo,
            best_price: format_colones(best.1),
            best_store: best.0.display_name().to_owned(),
            url: format!(
                "{}/productos/{}",
                best.0.homepage(),
                utf8_percent_encode(&slug, URI_COMPONENT)
            ),
        }
    }
}

#[async_trait]
impl ComparisonSource for MockComparisons {
    async fn summarize_upload(&self, file_name: &str) -> Result<BatchSummary, CatalogError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let name_len = u32::try_from(file_name.chars().count()).unwrap_or(u32::MAX);
        let products = 20 + name_len % 31;
        let errors = rng.random_range(0..=3).min(products);
        Ok(BatchSummary {
            products_processed: products,
            processing_time: format!("{:.1} minutes", f64::from(products) * 0.05),
            errors,
            summary: format!(
                "Processed {products} products from {} stores with price comparisons",
                Store::ALL.len()
            ),
        })
    }

    async fn comparison_rows(&self) -> Result<Vec<ComparisonRow>, CatalogError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let count = rng.random_range(MIN_ROWS..=MAX_ROWS);
        let mut products = SAMPLE_PRODUCTS.to_vec();
        products.shuffle(&mut *rng);
        Ok(products
            .into_iter()
            .take(count)
            .map(|product| Self::build_row(&mut rng, product))
            .collect())
    }
}

/// Summaries and comparison rows produced by the text service.
pub struct GenerativeComparisons<G> {
    generator: G,
}

impl<G: TextGenerator> GenerativeComparisons<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> ComparisonSource for GenerativeComparisons<G> {
    async fn summarize_upload(&self, file_name: &str) -> Result<BatchSummary, CatalogError> {
        let reply = self
            .generator
            .generate(&prompts::batch_summary(file_name))
            .await?;

        let parsed = extract_json_object(&reply).and_then(|map| {
            serde_json::from_value::<BatchSummary>(Value::Object(map))
                .map_err(ExtractError::Malformed)
        });
        match parsed {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::warn!(
                    file_name,
                    error = %e,
                    "batch summary was not JSON, keeping raw text"
                );
                Ok(BatchSummary {
                    summary: reply.trim().to_owned(),
                    ..BatchSummary::default()
                })
            }
        }
    }

    async fn comparison_rows(&self) -> Result<Vec<ComparisonRow>, CatalogError> {
        let reply = self.generator.generate(&prompts::comparison_rows()).await?;
        let rows = rows_from_items(extract_json_array(&reply)?)?;
        if rows.is_empty() {
            return Err(ExtractError::EmptyArray.into());
        }
        tracing::debug!(rows = rows.len(), "comparison rows generated");
        Ok(rows)
    }
}

/// Columns holding colón amounts: everything between the product name and
/// the best store.
fn is_price_column(key: &str) -> bool {
    COMPARISON_HEADERS[1..8].contains(&key)
}

/// Deserializes comparison rows, stringifying scalar cells first. Numeric
/// prices get the same `₡` rendering as search results.
fn rows_from_items(items: Vec<Value>) -> Result<Vec<ComparisonRow>, ExtractError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(fields) = item else {
                return Err(ExtractError::SchemaMismatch {
                    index,
                    reason: "expected an object".to_owned(),
                });
            };
            let fields = fields
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::Number(n) if is_price_column(&key) => {
                            Value::String(amount_text(&n).unwrap_or_else(|| n.to_string()))
                        }
                        Value::Number(n) => Value::String(n.to_string()),
                        Value::Bool(b) => Value::String(b.to_string()),
                        Value::Null => Value::String(String::new()),
                        other => other,
                    };
                    (key, value)
                })
                .collect();
            serde_json::from_value(Value::Object(fields)).map_err(|e| {
                ExtractError::SchemaMismatch {
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
