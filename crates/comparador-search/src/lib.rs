//! Store search: catalogs, the per-store adapter, the fan-out aggregator,
//! reply normalization, and batch comparison generation.

pub mod adapter;
pub mod batch;
pub mod catalog;
pub mod error;
pub mod fanout;
pub mod generative;
pub mod mock;
pub mod normalize;
pub mod prompts;
pub mod sources;

pub use adapter::query_store;
pub use batch::{ComparisonSource, GenerativeComparisons, MockComparisons};
pub use catalog::StoreCatalog;
pub use error::{CatalogError, ExtractError};
pub use fanout::{Aggregator, StoreResults};
pub use generative::GenerativeCatalog;
pub use mock::{MockCatalog, MockLatency};
pub use normalize::{
    extract_json_array, extract_json_object, normalize_records, normalize_response,
};
pub use sources::Sources;
