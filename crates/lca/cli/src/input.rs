//! Reading reference tables and product files

use std::path::Path;

use anyhow::{Context, Result};
use lca_reference::ReferenceDataStore;
use lca_types::{ProductComposition, Scenario};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Load reference tables from `path`, or the built-in demo dataset.
pub fn load_store(path: Option<&Path>) -> Result<ReferenceDataStore> {
    match path {
        Some(p) => ReferenceDataStore::load(p)
            .with_context(|| format!("loading reference tables from {}", p.display())),
        None => {
            debug!("using built-in demo reference data");
            ReferenceDataStore::demo().context("building demo reference data")
        }
    }
}

/// Load one product composition. `.json` files are read as JSON, anything
/// else as TOML.
pub fn load_product(path: &Path) -> Result<ProductComposition> {
    let product: ProductComposition = read_document(path, "product")?;
    debug!(product = %product.name, lines = product.lines.len(), "product loaded");
    Ok(product)
}

#[derive(Deserialize)]
struct ScenarioFile {
    scenarios: Vec<Scenario>,
}

/// Load a scenario set: a top-level `scenarios` array, each entry carrying a
/// name, a probability and a full product composition.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    let file: ScenarioFile = read_document(path, "scenario")?;
    debug!(scenarios = file.scenarios.len(), "scenarios loaded");
    Ok(file.scenarios)
}

/// `.json` files are read as JSON, anything else as TOML.
fn read_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {} file {}", what, path.display()))?;
    let parsed: T = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("parsing {} file {}", what, path.display()))?,
        _ => toml::from_str(&contents)
            .with_context(|| format!("parsing {} file {}", what, path.display()))?,
    };
    Ok(parsed)
}
