use serde::{Deserialize, Serialize};

use crate::failures::StoreFailure;

/// Sentinel stored in `promo_price` when a product has no promotion.
pub const NO_PROMO_PRICE: &str = "Sin precio promocional";

/// Placeholder product image used when none is known.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300x300";

/// A single comparable product from one store, or the placeholder left behind
/// when that store's lookup failed.
///
/// Prices are kept as display strings (e.g. `"₡1.250.000"`), exactly as shown
/// to the user and written to exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub regular_price: String,
    /// Promotional price, or [`NO_PROMO_PRICE`].
    pub promo_price: String,
    pub url: String,
    pub image_url: String,
    /// Store display name, e.g. `"Gollo"`.
    pub store: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProductError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductError {
    pub code: u16,
    pub message: String,
}

impl ProductRecord {
    /// Error placeholder: every field empty except `store` and `error`.
    #[must_use]
    pub fn failed(failure: StoreFailure) -> Self {
        Self {
            name: String::new(),
            regular_price: String::new(),
            promo_price: String::new(),
            url: String::new(),
            image_url: String::new(),
            store: failure.store.display_name().to_owned(),
            error: Some(ProductError {
                code: failure.code(),
                message: failure.message(),
            }),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Formats a colón amount the way prices are displayed: `₡` followed by the
/// integer amount with `.` as the thousands separator.
#[must_use]
pub fn format_colones(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("₡{grouped}")
}
