//! # lca-types
//!
//! Data model shared by the life-cycle impact engine and its callers.
//!
//! Reference rows ([`Material`], [`Process`], [`Region`], [`TransportMode`])
//! describe the static lookup tables. A [`ProductComposition`] describes one
//! product. Result records ([`ImpactResult`], [`CircularityScore`],
//! [`ComparisonResult`], [`SensitivityEntry`], [`ScenarioAnalysis`]) are
//! plain serde records; the engine never serializes them itself.

#![deny(unsafe_code)]

pub mod analysis;
pub mod circularity;
pub mod composition;
pub mod entity;
pub mod ids;
pub mod impact;

pub use analysis::{
    ComparisonResult, EffectSize, FactorId, ScenarioAnalysis, ScenarioOutcome, ScenarioRobustness,
    SensitivityEntry, TestKind,
};
pub use circularity::{CircularityClass, CircularityScore, EndOfLifeAssumptions, EndOfLifeOutcome};
pub use composition::{
    MaterialLine, ProductComposition, Scenario, TechnologyLevel, TransportLeg, UseScenario,
};
pub use entity::{Material, MaterialCv, Process, ProcessCv, Region, TransportMode};
pub use ids::{EntityKind, MaterialId, ProcessId, RegionId, TransportModeId};
pub use impact::{
    ConfidenceBounds, Contribution, ContributionSource, DistributionSummary, ImpactCategory,
    ImpactResult, ImpactValue, ImpactVector,
};
