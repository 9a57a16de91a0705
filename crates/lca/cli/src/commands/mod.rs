//! CLI command implementations

pub mod assess;
pub mod compare;
pub mod materials;
pub mod scenarios;
pub mod sensitivity;
pub mod simulate;

use lca_engine::EngineConfig;
use lca_reference::ReferenceDataStore;

use crate::output::OutputFormat;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub store: ReferenceDataStore,
    pub config: EngineConfig,
    pub format: OutputFormat,
}
