//! Reading reference tables from TOML or JSON documents.
//!
//! ```toml
//! [[materials]]
//! id = "PP"
//! name = "Polypropylene"
//! carbon_factor = 2.1
//! energy_factor = 85.6
//! water_factor = 75.0
//! recyclability = 0.85
//!
//! [[regions]]
//! id = "europe"
//! name = "Europe"
//! grid_carbon_intensity = 0.275
//! ```

use std::path::Path;

use lca_types::{Material, Process, Region, TransportMode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ReferenceError, ReferenceResult};
use crate::store::ReferenceDataStore;

/// Raw, unvalidated table document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    pub materials: Vec<Material>,
    pub processes: Vec<Process>,
    pub regions: Vec<Region>,
    pub transport_modes: Vec<TransportMode>,
}

impl ReferenceTables {
    /// Validate and freeze into a store.
    pub fn into_store(self) -> ReferenceResult<ReferenceDataStore> {
        ReferenceDataStore::builder()
            .materials(self.materials)
            .processes(self.processes)
            .regions(self.regions)
            .transport_modes(self.transport_modes)
            .build()
    }
}

impl From<&ReferenceDataStore> for ReferenceTables {
    fn from(store: &ReferenceDataStore) -> Self {
        Self {
            materials: store.materials().to_vec(),
            processes: store.processes().to_vec(),
            regions: store.regions().to_vec(),
            transport_modes: store.transport_modes().to_vec(),
        }
    }
}

impl ReferenceDataStore {
    pub fn from_toml_str(s: &str) -> ReferenceResult<Self> {
        let tables: ReferenceTables = toml::from_str(s)?;
        tables.into_store()
    }

    pub fn from_json_str(s: &str) -> ReferenceResult<Self> {
        let tables: ReferenceTables = serde_json::from_str(s)?;
        tables.into_store()
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> ReferenceResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let store = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents)?,
            Some("json") => Self::from_json_str(&contents)?,
            other => {
                return Err(ReferenceError::Parse(format!(
                    "unsupported reference file extension: {:?} ({})",
                    other,
                    path.display()
                )))
            }
        };
        info!(path = %path.display(), "reference tables loaded");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lca_types::EntityKind;

    const TABLES: &str = r#"
        [[materials]]
        id = "PP"
        name = "Polypropylene"
        category = "Polymer"
        carbon_factor = 2.1
        energy_factor = 85.6
        water_factor = 75.0
        recyclability = 0.85
        cv = { carbon = 0.05, energy = 0.04 }

        [[materials]]
        id = "BAMBOO"
        name = "Bamboo Composite"
        carbon_factor = 0.3
        energy_factor = 2.5
        water_factor = 5.0
        recyclability = 0.95
        biogenic = true

        [[processes]]
        id = "injection-molding"
        name = "Injection Molding"
        energy_intensity = 4.32
        process_carbon_factor = 0.15
        applicable_categories = ["Polymer"]

        [[regions]]
        id = "europe"
        name = "Europe"
        grid_carbon_intensity = 0.275

        [[transport_modes]]
        id = "rail"
        name = "Rail"
        carbon_factor = 2.2e-5
    "#;

    #[test]
    fn toml_tables_load_in_order() {
        let store = ReferenceDataStore::from_toml_str(TABLES).unwrap();
        let ids: Vec<_> = store
            .list(EntityKind::Material)
            .iter()
            .map(|e| e.id())
            .collect();
        assert_eq!(ids, vec!["PP", "BAMBOO"]);
        assert_eq!(store.materials()[0].cv.carbon, Some(0.05));
        assert!(store.materials()[1].biogenic);
        assert_eq!(store.processes()[0].applicable_categories, vec!["Polymer"]);
    }

    #[test]
    fn json_round_trip_through_tables() {
        let store = ReferenceDataStore::from_toml_str(TABLES).unwrap();
        let json = serde_json::to_string(&ReferenceTables::from(&store)).unwrap();
        let again = ReferenceDataStore::from_json_str(&json).unwrap();
        assert_eq!(again.materials(), store.materials());
        assert_eq!(again.regions(), store.regions());
    }

    #[test]
    fn loaded_rows_are_validated() {
        let bad = TABLES.replace(
            "grid_carbon_intensity = 0.275",
            "grid_carbon_intensity = -1.0",
        );
        let err = ReferenceDataStore::from_toml_str(&bad).unwrap_err();
        assert!(matches!(err, ReferenceError::DataIntegrity { .. }));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = ReferenceDataStore::from_toml_str("[[materials]\nid = ").unwrap_err();
        assert!(matches!(err, ReferenceError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ReferenceDataStore::load("/nonexistent/reference.toml").unwrap_err();
        assert!(matches!(err, ReferenceError::Io(_)));
    }
}
