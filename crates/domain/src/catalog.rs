//! Device catalog — the static configuration naming every device the
//! client knows about, per kind.
//!
//! The catalog is loaded once at startup (from the daemon's TOML config)
//! and never changes afterwards; the registry builds its id→index maps
//! from it exactly once.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// One configured device of either kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable device id, as addressed by the wire `where` field.
    pub id: DeviceId,
    /// Display label.
    pub name: String,
    /// Whether the device supports dimming. Unused by the current command
    /// set, kept because the catalog format carries it.
    #[serde(default)]
    pub dimmable: bool,
}

/// The full device catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub lights: Vec<CatalogEntry>,
    pub shutters: Vec<CatalogEntry>,
}

impl Catalog {
    /// Check catalog invariants: ids must be unique within a kind.
    /// Cross-kind collisions are legal (the wire `who` discriminates).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] naming the first duplicate
    /// found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        Self::check_unique("lights", &self.lights)?;
        Self::check_unique("shutters", &self.shutters)
    }

    fn check_unique(kind: &'static str, entries: &[CatalogEntry]) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for entry in entries {
            if !seen.insert(entry.id) {
                return Err(CatalogError::DuplicateId {
                    kind,
                    id: entry.id,
                });
            }
        }
        Ok(())
    }

    /// Whether the catalog names no devices at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty() && self.shutters.is_empty()
    }
}

/// Catalog validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two entries of the same kind share an id.
    #[error("duplicate {kind} id {id}")]
    DuplicateId {
        /// The kind section containing the duplicate.
        kind: &'static str,
        /// The repeated id.
        id: DeviceId,
    },
}
