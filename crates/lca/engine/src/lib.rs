//! # lca-engine
//!
//! Life-cycle impact computation over a [`ReferenceDataStore`].
//!
//! ## Architecture
//!
//! ```text
//!   ProductComposition
//!          │ resolve (validate + look up every id)
//!          ▼
//!   ResolvedComposition ──────────────┬──────────────────┐
//!          │ aggregate                │ score_resolved   │ perturb one factor
//!          ▼                          ▼                  ▼
//!   ImpactResult ◄── decorate ── MonteCarloRun      sensitivity ranking
//!          │                          │ samples
//!          ▼                          ▼
//!   hotspots / normalize        Welch t-test / ANOVA
//! ```
//!
//! Scenario analysis runs the aggregator once per weighted alternative and
//! reports the expected value and spread across them.
//!
//! Every entry point is synchronous and stateless across calls. Monte Carlo
//! runs are reproducible for a fixed seed, with or without the `parallel`
//! feature.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lca_engine::{compute_impacts, simulate, MonteCarloConfig};
//! use lca_reference::ReferenceDataStore;
//! use lca_types::{ImpactCategory, ProductComposition};
//!
//! let store = ReferenceDataStore::demo()?;
//! let bottle = ProductComposition::new("bottle", "europe")
//!     .with_line("PET", 0.025)
//!     .with_process("blow-molding");
//!
//! let point = compute_impacts(&store, &bottle)?;
//! let run = simulate(&store, &bottle, &MonteCarloConfig::default())?;
//! let result = run.to_impact_result(&point);
//! println!("{:?}", result.bounds(ImpactCategory::GlobalWarmingPotential));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

pub mod aggregator;
pub mod circularity;
pub mod config;
pub mod error;
pub mod hotspots;
pub mod normalize;
pub mod scenarios;
pub mod sensitivity;
pub mod stats;
pub mod uncertainty;

pub use aggregator::{aggregate, compute_impacts, resolve, totals, ResolvedComposition};
pub use circularity::{compute_circularity, score_resolved, CircularityConfig};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use hotspots::{identify_hotspots, Hotspot, HotspotConfig, HotspotSeverity, MAX_HOTSPOTS};
pub use normalize::{normalize, NormalizationReference};
pub use scenarios::analyze_scenarios;
pub use sensitivity::{
    all_factors, rank_all, rank_resolved, rank_sampled, rank_sensitivity, SensitivityConfig,
};
pub use stats::{
    compare_many, compare_runs, compare_two, excess_kurtosis, skewness, ComparisonConfig,
};
pub use uncertainty::{
    sample_seed, simulate, simulate_resolved, simulate_with_cancel, CancellationToken,
    DistributionFamily, MonteCarloConfig, MonteCarloRun, MIN_SAMPLE_COUNT,
};

#[doc(no_inline)]
pub use lca_reference::ReferenceDataStore;
