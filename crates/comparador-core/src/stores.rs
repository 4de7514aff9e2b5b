use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// One of the fixed retail stores a search can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    Gollo,
    Monge,
    #[serde(rename = "mexpress")]
    MExpress,
}

impl Store {
    /// Every store, in the order sequential searches visit them.
    pub const ALL: [Store; 3] = [Store::Gollo, Store::Monge, Store::MExpress];

    /// Lowercase identifier used on the wire and in query strings.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Store::Gollo => "gollo",
            Store::Monge => "monge",
            Store::MExpress => "mexpress",
        }
    }

    /// Human-facing store name, used in records and exported sheets.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Store::Gollo => "Gollo",
            Store::Monge => "Monge",
            Store::MExpress => "MExpress",
        }
    }

    /// Store price level relative to Gollo, in basis points (10 000 = 1.00).
    #[must_use]
    pub fn price_multiplier_bp(self) -> u64 {
        match self {
            Store::Gollo => 10_000,
            Store::Monge => 10_500,
            Store::MExpress => 9_500,
        }
    }

    /// Storefront root, e.g. `"https://www.gollo.cr"`.
    #[must_use]
    pub fn homepage(self) -> String {
        format!("https://www.{}.cr", self.id())
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Store {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Store::ALL
            .into_iter()
            .find(|store| store.id() == wanted)
            .ok_or_else(|| CoreError::UnknownStore(s.trim().to_owned()))
    }
}

/// Which stores a search should fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreSelection {
    #[default]
    All,
    One(Store),
}

impl StoreSelection {
    /// Stores covered by this selection, in store order.
    #[must_use]
    pub fn stores(self) -> Vec<Store> {
        match self {
            StoreSelection::All => Store::ALL.to_vec(),
            StoreSelection::One(store) => vec![store],
        }
    }
}

impl FromStr for StoreSelection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StoreSelection::All);
        }
        s.parse::<Store>().map(StoreSelection::One)
    }
}

/// How the fan-out dispatches per-store searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Start every store search at once and join on all of them.
    #[default]
    Concurrent,
    /// Run one store at a time, in [`Store::ALL`] order.
    Sequential,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Concurrent => write!(f, "concurrent"),
            SearchMode::Sequential => write!(f, "sequential"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(SearchMode::Concurrent),
            "sequential" => Ok(SearchMode::Sequential),
            other => Err(CoreError::UnknownSearchMode(other.to_owned())),
        }
    }
}
