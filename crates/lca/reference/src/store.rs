//! The reference data store: four validated, immutable lookup tables.
//!
//! Tables keep insertion order for `list()` and a hash index for `lookup()`.
//! A store is only obtainable through [`ReferenceDataStoreBuilder::build`]
//! (or the loaders built on it), so every row a caller can observe has passed
//! validation. Nothing mutates a built store.

use std::collections::HashMap;
use std::hash::Hash;

use lca_types::{
    EntityKind, Material, MaterialId, Process, ProcessId, Region, RegionId, TransportMode,
    TransportModeId,
};
use tracing::debug;

use crate::error::{ReferenceError, ReferenceResult};
use crate::validate;

// ── Entity view ─────────────────────────────────────────────────────────

/// A borrowed row from one of the tables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Entity<'a> {
    Material(&'a Material),
    Process(&'a Process),
    Region(&'a Region),
    TransportMode(&'a TransportMode),
}

impl<'a> Entity<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Material(_) => EntityKind::Material,
            Entity::Process(_) => EntityKind::Process,
            Entity::Region(_) => EntityKind::Region,
            Entity::TransportMode(_) => EntityKind::TransportMode,
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            Entity::Material(m) => m.id.as_str(),
            Entity::Process(p) => p.id.as_str(),
            Entity::Region(r) => r.id.as_str(),
            Entity::TransportMode(t) => t.id.as_str(),
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Entity::Material(m) => &m.name,
            Entity::Process(p) => &p.name,
            Entity::Region(r) => &r.name,
            Entity::TransportMode(t) => &t.name,
        }
    }
}

// ── Table ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Table<K, V> {
    rows: Vec<V>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Table<K, V> {
    fn insert(&mut self, kind: EntityKind, key: K, row_name: &str, row: V) -> ReferenceResult<()> {
        if self.index.contains_key(&key) {
            return Err(ReferenceError::integrity(
                kind,
                row_name,
                "id",
                "duplicate identifier",
            ));
        }
        self.index.insert(key, self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.rows[i])
    }
}

// ── Store ───────────────────────────────────────────────────────────────

/// Process-wide, read-only reference data.
///
/// `Send + Sync`; wrap in an `Arc` to share between any number of readers.
#[derive(Clone, Debug, Default)]
pub struct ReferenceDataStore {
    materials: Table<MaterialId, Material>,
    processes: Table<ProcessId, Process>,
    regions: Table<RegionId, Region>,
    transport_modes: Table<TransportModeId, TransportMode>,
}

impl ReferenceDataStore {
    pub fn builder() -> ReferenceDataStoreBuilder {
        ReferenceDataStoreBuilder::default()
    }

    /// Look up any row by kind and id.
    pub fn lookup(&self, kind: EntityKind, id: &str) -> ReferenceResult<Entity<'_>> {
        let found = match kind {
            EntityKind::Material => self
                .materials
                .get(&MaterialId::from(id))
                .map(Entity::Material),
            EntityKind::Process => self
                .processes
                .get(&ProcessId::from(id))
                .map(Entity::Process),
            EntityKind::Region => self.regions.get(&RegionId::from(id)).map(Entity::Region),
            EntityKind::TransportMode => self
                .transport_modes
                .get(&TransportModeId::from(id))
                .map(Entity::TransportMode),
        };
        found.ok_or_else(|| ReferenceError::NotFound {
            kind,
            id: id.to_string(),
        })
    }

    /// All rows of a table, in insertion order.
    pub fn list(&self, kind: EntityKind) -> Vec<Entity<'_>> {
        match kind {
            EntityKind::Material => self.materials.rows.iter().map(Entity::Material).collect(),
            EntityKind::Process => self.processes.rows.iter().map(Entity::Process).collect(),
            EntityKind::Region => self.regions.rows.iter().map(Entity::Region).collect(),
            EntityKind::TransportMode => self
                .transport_modes
                .rows
                .iter()
                .map(Entity::TransportMode)
                .collect(),
        }
    }

    pub fn material(&self, id: &MaterialId) -> ReferenceResult<&Material> {
        self.materials.get(id).ok_or_else(|| ReferenceError::NotFound {
            kind: EntityKind::Material,
            id: id.to_string(),
        })
    }

    pub fn process(&self, id: &ProcessId) -> ReferenceResult<&Process> {
        self.processes.get(id).ok_or_else(|| ReferenceError::NotFound {
            kind: EntityKind::Process,
            id: id.to_string(),
        })
    }

    pub fn region(&self, id: &RegionId) -> ReferenceResult<&Region> {
        self.regions.get(id).ok_or_else(|| ReferenceError::NotFound {
            kind: EntityKind::Region,
            id: id.to_string(),
        })
    }

    pub fn transport_mode(&self, id: &TransportModeId) -> ReferenceResult<&TransportMode> {
        self.transport_modes
            .get(id)
            .ok_or_else(|| ReferenceError::NotFound {
                kind: EntityKind::TransportMode,
                id: id.to_string(),
            })
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials.rows
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes.rows
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions.rows
    }

    pub fn transport_modes(&self) -> &[TransportMode] {
        &self.transport_modes.rows
    }

    /// Number of rows in a table.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Material => self.materials.rows.len(),
            EntityKind::Process => self.processes.rows.len(),
            EntityKind::Region => self.regions.rows.len(),
            EntityKind::TransportMode => self.transport_modes.rows.len(),
        }
    }
}

// ── Builder ─────────────────────────────────────────────────────────────

/// Collects rows, then validates them all in [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct ReferenceDataStoreBuilder {
    materials: Vec<Material>,
    processes: Vec<Process>,
    regions: Vec<Region>,
    transport_modes: Vec<TransportMode>,
}

impl ReferenceDataStoreBuilder {
    pub fn material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    pub fn process(mut self, process: Process) -> Self {
        self.processes.push(process);
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    pub fn transport_mode(mut self, mode: TransportMode) -> Self {
        self.transport_modes.push(mode);
        self
    }

    pub fn materials(mut self, rows: impl IntoIterator<Item = Material>) -> Self {
        self.materials.extend(rows);
        self
    }

    pub fn processes(mut self, rows: impl IntoIterator<Item = Process>) -> Self {
        self.processes.extend(rows);
        self
    }

    pub fn regions(mut self, rows: impl IntoIterator<Item = Region>) -> Self {
        self.regions.extend(rows);
        self
    }

    pub fn transport_modes(mut self, rows: impl IntoIterator<Item = TransportMode>) -> Self {
        self.transport_modes.extend(rows);
        self
    }

    /// Validate every row and freeze the tables.
    pub fn build(self) -> ReferenceResult<ReferenceDataStore> {
        let mut store = ReferenceDataStore::default();

        for m in self.materials {
            validate::material(&m)?;
            let name = m.id.to_string();
            store
                .materials
                .insert(EntityKind::Material, m.id.clone(), &name, m)?;
        }
        for p in self.processes {
            validate::process(&p)?;
            let name = p.id.to_string();
            store
                .processes
                .insert(EntityKind::Process, p.id.clone(), &name, p)?;
        }
        for r in self.regions {
            validate::region(&r)?;
            let name = r.id.to_string();
            store
                .regions
                .insert(EntityKind::Region, r.id.clone(), &name, r)?;
        }
        for t in self.transport_modes {
            validate::transport_mode(&t)?;
            let name = t.id.to_string();
            store
                .transport_modes
                .insert(EntityKind::TransportMode, t.id.clone(), &name, t)?;
        }

        debug!(
            materials = store.materials.rows.len(),
            processes = store.processes.rows.len(),
            regions = store.regions.rows.len(),
            transport_modes = store.transport_modes.rows.len(),
            "reference data store built"
        );
        Ok(store)
    }
}
