use serde::{Deserialize, Serialize};

/// Column headers of the batch comparison sheet, in sheet order.
pub const COMPARISON_HEADERS: [&str; 10] = [
    "Producto",
    "Gollo Regular",
    "Gollo Promo",
    "Monge Regular",
    "Monge Promo",
    "MExpress Regular",
    "MExpress Promo",
    "Mejor Precio",
    "Tienda Mejor Precio",
    "URL",
];

/// One product compared across every store.
///
/// Field names on the wire match [`COMPARISON_HEADERS`]; missing fields
/// deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonRow {
    #[serde(rename = "Producto")]
    pub product: String,
    #[serde(rename = "Gollo Regular")]
    pub gollo_regular: String,
    #[serde(rename = "Gollo Promo")]
    pub gollo_promo: String,
    #[serde(rename = "Monge Regular")]
    pub monge_regular: String,
    #[serde(rename = "Monge Promo")]
    pub monge_promo: String,
    #[serde(rename = "MExpress Regular")]
    pub mexpress_regular: String,
    #[serde(rename = "MExpress Promo")]
    pub mexpress_promo: String,
    #[serde(rename = "Mejor Precio")]
    pub best_price: String,
    #[serde(rename = "Tienda Mejor Precio")]
    pub best_store: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl ComparisonRow {
    /// Cell values in [`COMPARISON_HEADERS`] order.
    #[must_use]
    pub fn cells(&self) -> [&str; 10] {
        [
            &self.product,
            &self.gollo_regular,
            &self.gollo_promo,
            &self.monge_regular,
            &self.monge_promo,
            &self.mexpress_regular,
            &self.mexpress_promo,
            &self.best_price,
            &self.best_store,
            &self.url,
        ]
    }
}

/// Outcome reported for an uploaded batch file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchSummary {
    pub products_processed: u32,
    pub processing_time: String,
    pub errors: u32,
    pub summary: String,
}
