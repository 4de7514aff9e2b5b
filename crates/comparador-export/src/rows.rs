use comparador_search::StoreResults;
use serde::Serialize;

/// One line of the search-results sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    /// Store display name.
    pub store: String,
    pub name: String,
    pub regular_price: String,
    pub promo_price: String,
    pub url: String,
}

impl ExportRow {
    /// Cell values in sheet column order.
    #[must_use]
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.store,
            &self.name,
            &self.regular_price,
            &self.promo_price,
            &self.url,
        ]
    }
}

/// Flattens search results in result order, skipping error records.
#[must_use]
pub fn rows_from_results(results: &StoreResults) -> Vec<ExportRow> {
    results
        .iter()
        .flat_map(|(store, records)| {
            records
                .iter()
                .filter(|record| !record.is_error())
                .map(move |record| ExportRow {
                    store: store.display_name().to_owned(),
                    name: record.name.clone(),
                    regular_price: record.regular_price.clone(),
                    promo_price: record.promo_price.clone(),
                    url: record.url.clone(),
                })
        })
        .collect()
}
