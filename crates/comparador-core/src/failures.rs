//! Tagged per-store failures and the numeric codes the UI shows for them.
//!
//! A failure is identified by the store it happened in and the kind of
//! failure. The numeric code shown to users comes from [`FAILURE_CODES`];
//! adding a store means adding one row there.

use serde::{Deserialize, Serialize};

use crate::stores::Store;

/// Numeric failure code for each store.
pub const FAILURE_CODES: [(Store, u16); 3] = [
    (Store::Gollo, 100),
    (Store::Monge, 101),
    (Store::MExpress, 102),
];

/// Returned when a store is missing from [`FAILURE_CODES`].
pub const UNKNOWN_FAILURE_CODE: u16 = 199;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The catalog call itself failed (network, upstream status, timeout).
    Unavailable,
    /// The catalog answered, but its output could not be turned into records.
    InvalidResponse,
    /// The per-store task panicked or was cancelled before finishing.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreFailure {
    pub store: Store,
    pub kind: FailureKind,
}

impl StoreFailure {
    #[must_use]
    pub fn new(store: Store, kind: FailureKind) -> Self {
        Self { store, kind }
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        FAILURE_CODES
            .iter()
            .find(|(store, _)| *store == self.store)
            .map_or(UNKNOWN_FAILURE_CODE, |(_, code)| *code)
    }

    /// Localized message shown next to the code.
    #[must_use]
    pub fn message(&self) -> String {
        let name = self.store.display_name();
        match self.kind {
            FailureKind::Unavailable => format!("Error al acceder al sitio de {name}"),
            FailureKind::InvalidResponse => format!("Respuesta inválida de {name}"),
            FailureKind::Aborted => format!("Error en {name}"),
        }
    }
}

impl std::fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}
