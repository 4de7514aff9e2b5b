//! Turns free-form catalog replies into [`ProductRecord`]s.
//!
//! Generated text usually wraps the JSON payload in prose or code fences, so
//! extraction looks for the outermost bracketed span first and only then
//! falls back to parsing the whole reply. Field mapping is strict about
//! shape (every item must be an object) but lenient about content: absent or
//! blank fields get fixed defaults.

use comparador_core::{
    format_colones, ProductRecord, Store, NO_PROMO_PRICE, PLACEHOLDER_IMAGE_URL,
};
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::ExtractError;

/// Name used when an item carries none.
pub const UNKNOWN_PRODUCT_NAME: &str = "Producto desconocido";

/// Regular price used when an item carries none.
pub const ZERO_PRICE: &str = "₡0";

/// Extracts the JSON array embedded in `raw`.
///
/// The greedy span from the first `[` to the last `]` is tried first; if there
/// is no such span, or it does not parse, the whole text is parsed instead.
///
/// # Errors
///
/// - [`ExtractError::EmptyResponse`] for blank input.
/// - [`ExtractError::Malformed`] when a bracketed span exists but neither it
///   nor the whole text is valid JSON.
/// - [`ExtractError::NoArrayFound`] when there is no bracketed span and the
///   text is not JSON either.
/// - [`ExtractError::NotAnArray`] when the text parses to a non-array value.
pub fn extract_json_array(raw: &str) -> Result<Vec<Value>, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyResponse);
    }

    let array_re = Regex::new(r"(?s)\[.*\]").expect("valid array span regex");
    let parsed = match array_re.find(trimmed) {
        Some(span) => match serde_json::from_str::<Value>(span.as_str()) {
            Ok(value) => value,
            Err(span_err) => serde_json::from_str::<Value>(trimmed)
                .map_err(|_| ExtractError::Malformed(span_err))?,
        },
        None => {
            serde_json::from_str::<Value>(trimmed).map_err(|_| ExtractError::NoArrayFound)?
        }
    };

    match parsed {
        Value::Array(items) => Ok(items),
        _ => Err(ExtractError::NotAnArray),
    }
}

/// Extracts the JSON object embedded in `raw` (first `{` through last `}`).
///
/// # Errors
///
/// - [`ExtractError::EmptyResponse`] for blank input.
/// - [`ExtractError::NoObjectFound`] when there is no braced span.
/// - [`ExtractError::Malformed`] when the span is not valid JSON.
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyResponse);
    }

    let object_re = Regex::new(r"(?s)\{.*\}").expect("valid object span regex");
    let span = object_re.find(trimmed).ok_or(ExtractError::NoObjectFound)?;
    match serde_json::from_str::<Value>(span.as_str()).map_err(ExtractError::Malformed)? {
        Value::Object(map) => Ok(map),
        _ => Err(ExtractError::NoObjectFound),
    }
}

/// Maps extracted items onto product records for `store`.
///
/// The `store` field always comes from the caller, never from the item.
///
/// # Errors
///
/// Returns [`ExtractError::SchemaMismatch`] for the first item that is not an
/// object or carries a field of an unusable type. No partial results are
/// returned.
pub fn normalize_records(
    items: Vec<Value>,
    store: Store,
) -> Result<Vec<ProductRecord>, ExtractError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| normalize_item(index, item, store))
        .collect()
}

/// [`extract_json_array`] followed by [`normalize_records`].
///
/// # Errors
///
/// Propagates any [`ExtractError`] from either step.
pub fn normalize_response(raw: &str, store: Store) -> Result<Vec<ProductRecord>, ExtractError> {
    let items = extract_json_array(raw)?;
    normalize_records(items, store)
}

fn normalize_item(index: usize, item: Value, store: Store) -> Result<ProductRecord, ExtractError> {
    let Value::Object(fields) = item else {
        return Err(ExtractError::SchemaMismatch {
            index,
            reason: format!("expected an object, found {}", json_type_name(&item)),
        });
    };

    let mismatch = |reason| ExtractError::SchemaMismatch { index, reason };
    let text = |key: &str| text_field(&fields, key).map_err(mismatch);
    let price = |key: &str| price_field(&fields, key).map_err(mismatch);

    Ok(ProductRecord {
        name: text("name")?.unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_owned()),
        regular_price: price("regular_price")?.unwrap_or_else(|| ZERO_PRICE.to_owned()),
        promo_price: price("promo_price")?.unwrap_or_else(|| NO_PROMO_PRICE.to_owned()),
        url: text("url")?.unwrap_or_else(|| store.homepage()),
        image_url: text("image_url")?.unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_owned()),
        store: store.display_name().to_owned(),
        error: None,
    })
}

/// Reads a text field; numbers are stringified, blanks and nulls are absent.
fn text_field(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(non_blank(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(format!(
            "field `{key}` must be a string, found {}",
            json_type_name(other)
        )),
    }
}

/// Renders a non-negative JSON amount with [`format_colones`], rounding
/// fractional colones.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn amount_text(n: &Number) -> Option<String> {
    if let Some(amount) = n.as_u64() {
        return Some(format_colones(amount));
    }
    n.as_f64()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .map(|amount| format_colones(amount.round() as u64))
}

/// Reads a price field; numbers are rendered with [`amount_text`].
fn price_field(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(non_blank(s)),
        Some(Value::Number(n)) => amount_text(n)
            .map(Some)
            .ok_or_else(|| format!("field `{key}` must be a non-negative amount, found {n}")),
        Some(other) => Err(format!(
            "field `{key}` must be a string or number, found {}",
            json_type_name(other)
        )),
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads a display price such as `"₡1.250.000"` back into colones.
#[cfg(test)]
pub(crate) fn parse_colones(text: &str) -> Option<u64> {
    let digits: String = text
        .split([',', ' '])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
