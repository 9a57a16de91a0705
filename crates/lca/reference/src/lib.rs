//! # lca-reference
//!
//! The reference data store: immutable lookup tables for materials,
//! manufacturing processes, grid regions and transport modes.
//!
//! - Built once through [`ReferenceDataStoreBuilder`] or loaded from TOML/JSON
//!   tables; every row is validated and a malformed table fails with
//!   [`ReferenceError::DataIntegrity`] naming the row.
//! - `lookup(kind, id)` and `list(kind)` never mutate; `list` returns rows in
//!   insertion order.
//! - [`ReferenceDataStore::demo`] provides an indicative built-in dataset.

#![deny(unsafe_code)]

pub mod demo;
pub mod error;
pub mod loader;
pub mod store;
mod validate;

pub use error::{ReferenceError, ReferenceResult};
pub use loader::ReferenceTables;
pub use store::{Entity, ReferenceDataStore, ReferenceDataStoreBuilder};
