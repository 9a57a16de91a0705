//! Sensitivity Analyzer.
//!
//! Two rankings of input factors by their influence on one impact category:
//!
//! - [`rank_sensitivity`]: one-at-a-time local perturbation. Each factor is
//!   moved by ±delta with every other factor at its reference value and the
//!   composition is re-aggregated. This is a local approximation; it ignores
//!   interactions between factors.
//! - [`rank_sampled`]: sampled-variance attribution from an existing Monte
//!   Carlo run, using the squared correlation between each factor's drawn
//!   multipliers and the sampled output.
//!
//! Both normalize shares to sum to 1 and sort descending; ties keep
//! declaration order.

use lca_reference::ReferenceDataStore;
use lca_types::{FactorId, ImpactCategory, ProductComposition, SensitivityEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::{resolve, totals, ResolvedComposition};
use crate::error::{EngineError, EngineResult};
use crate::uncertainty::MonteCarloRun;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    /// Relative perturbation applied in each direction.
    pub delta: f64,
    pub category: ImpactCategory,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            category: ImpactCategory::GlobalWarmingPotential,
        }
    }
}

impl SensitivityConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.delta > 0.0 && self.delta <= 1.0) {
            return Err(EngineError::config(
                "sensitivity.delta",
                format!("{} outside (0, 1]", self.delta),
            ));
        }
        Ok(())
    }
}

/// Every factor of a resolved composition, in declaration order.
pub fn all_factors(resolved: &ResolvedComposition) -> Vec<FactorId> {
    resolved.factors()
}

fn relative_change(perturbed: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        (perturbed - baseline).abs()
    } else {
        ((perturbed - baseline) / baseline).abs()
    }
}

/// Normalize raw changes into shares and sort descending (stable).
fn rank(mut entries: Vec<SensitivityEntry>) -> Vec<SensitivityEntry> {
    let sum: f64 = entries.iter().map(|e| e.change).sum();
    for e in &mut entries {
        e.share = if sum > 0.0 { e.change / sum } else { 0.0 };
    }
    entries.sort_by(|a, b| b.change.total_cmp(&a.change));
    entries
}

/// One-at-a-time sensitivity of `config.category` to each listed factor.
pub fn rank_sensitivity(
    store: &ReferenceDataStore,
    composition: &ProductComposition,
    factors: &[FactorId],
    config: &SensitivityConfig,
) -> EngineResult<Vec<SensitivityEntry>> {
    let resolved = resolve(store, composition)?;
    rank_resolved(&resolved, factors, config)
}

/// [`rank_sensitivity`] over every factor of the composition.
pub fn rank_all(
    store: &ReferenceDataStore,
    composition: &ProductComposition,
    config: &SensitivityConfig,
) -> EngineResult<Vec<SensitivityEntry>> {
    let resolved = resolve(store, composition)?;
    let factors = all_factors(&resolved);
    rank_resolved(&resolved, &factors, config)
}

/// One-at-a-time ranking on an already-resolved composition.
pub fn rank_resolved(
    resolved: &ResolvedComposition,
    factors: &[FactorId],
    config: &SensitivityConfig,
) -> EngineResult<Vec<SensitivityEntry>> {
    config.validate()?;
    for (i, factor) in factors.iter().enumerate() {
        if !resolved.has_factor(factor) {
            return Err(EngineError::config(
                format!("factors[{}]", i),
                format!("{} is not part of composition '{}'", factor, resolved.name),
            ));
        }
    }

    let category = config.category;
    let baseline = totals(resolved).get(category);

    let perturbed = |factor: &FactorId, multiplier: f64| {
        let mut view = resolved.clone();
        view.scale(factor, multiplier);
        totals(&view).get(category)
    };

    let entries: Vec<SensitivityEntry> = factors
        .iter()
        .map(|factor| {
            let up = relative_change(perturbed(factor, 1.0 + config.delta), baseline);
            let down = relative_change(perturbed(factor, 1.0 - config.delta), baseline);
            SensitivityEntry {
                factor: factor.clone(),
                change: (up + down) / 2.0,
                share: 0.0,
            }
        })
        .collect();

    debug!(
        product = %resolved.name,
        category = %category,
        factors = entries.len(),
        baseline,
        "one-at-a-time sensitivity"
    );
    Ok(rank(entries))
}

pub(crate) fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let mx = x.iter().sum::<f64>() / n as f64;
    let my = y.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return 0.0;
    }
    sxy / (sxx * syy).sqrt()
}

/// Sampled-variance ranking from a Monte Carlo run: each factor's share of
/// the squared correlation between its multipliers and the output.
pub fn rank_sampled(run: &MonteCarloRun, category: ImpactCategory) -> Vec<SensitivityEntry> {
    let output = run.samples(category);
    let entries = run
        .factors()
        .iter()
        .enumerate()
        .map(|(j, factor)| {
            let column: Vec<f64> = run.draws().iter().map(|row| row[j]).collect();
            let r = pearson(&column, &output);
            SensitivityEntry {
                factor: factor.clone(),
                change: r * r,
                share: 0.0,
            }
        })
        .collect();
    rank(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uncertainty::{simulate, MonteCarloConfig};
    use lca_types::{Material, MaterialId, Process, ProcessId, Region, RegionId};

    fn store() -> ReferenceDataStore {
        ReferenceDataStore::builder()
            .material(Material::new("HEAVY", "High carbon", 10.0, 100.0, 10.0, 0.5))
            .material(Material::new("LIGHT", "Low carbon", 1.0, 10.0, 1.0, 0.5))
            .process(Process::new("press", "Press", 3.6, 0.1))
            .region(Region::new("grid", "Grid", 0.5))
            .build()
            .unwrap()
    }

    fn product() -> ProductComposition {
        ProductComposition::new("p", "grid")
            .with_line("HEAVY", 1.0)
            .with_line("LIGHT", 1.0)
            .with_process("press")
    }

    fn carbon(id: &str) -> FactorId {
        FactorId::MaterialCarbon {
            material: MaterialId::new(id),
        }
    }

    #[test]
    fn dominant_factor_ranks_first() {
        let factors = vec![
            carbon("LIGHT"),
            carbon("HEAVY"),
            FactorId::ProcessCarbon {
                process: ProcessId::new("press"),
            },
        ];
        let config = SensitivityConfig::default();
        let ranking = rank_sensitivity(&store(), &product(), &factors, &config).unwrap();
        assert_eq!(ranking[0].factor, carbon("HEAVY"));
        assert_eq!(ranking[1].factor, carbon("LIGHT"));
        let shares: f64 = ranking.iter().map(|e| e.share).sum();
        assert!((shares - 1.0).abs() < 1e-12);
        // GWP = 10 + 1 + 2·3.6/3.6·0.5 + 0.2 = 12.2; ±10% on HEAVY moves it by 1.0
        assert!((ranking[0].change - 1.0 / 12.2).abs() < 1e-12);
    }

    #[test]
    fn ties_keep_declaration_order() {
        // Neither factor affects GWP without a process.
        let composition = ProductComposition::new("p", "grid").with_line("HEAVY", 1.0);
        let factors = vec![
            FactorId::MaterialWater {
                material: MaterialId::new("HEAVY"),
            },
            FactorId::GridIntensity {
                region: RegionId::new("grid"),
            },
        ];
        let config = SensitivityConfig::default();
        let ranking = rank_sensitivity(&store(), &composition, &factors, &config).unwrap();
        assert_eq!(ranking[0].factor, factors[0]);
        assert_eq!(ranking[1].factor, factors[1]);
        assert!(ranking.iter().all(|e| e.share == 0.0));
    }

    #[test]
    fn unknown_factor_is_invalid_config() {
        let factors = vec![carbon("UNOBTAINIUM")];
        let config = SensitivityConfig::default();
        match rank_sensitivity(&store(), &product(), &factors, &config).unwrap_err() {
            EngineError::InvalidConfig { field, .. } => assert_eq!(field, "factors[0]"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn rank_all_covers_every_factor() {
        let ranking = rank_all(&store(), &product(), &SensitivityConfig::default()).unwrap();
        // 2 materials × 4 + 2 process + grid + 2 line masses
        assert_eq!(ranking.len(), 13);
        // Line mass of HEAVY drives its material term and the process term.
        assert_eq!(ranking[0].factor, FactorId::LineMass { line: 0 });
    }

    #[test]
    fn other_categories() {
        let config = SensitivityConfig {
            category: ImpactCategory::EnergyDemand,
            ..SensitivityConfig::default()
        };
        let factors = vec![
            FactorId::ProcessEnergy {
                process: ProcessId::new("press"),
            },
            FactorId::MaterialEnergy {
                material: MaterialId::new("HEAVY"),
            },
        ];
        let ranking = rank_sensitivity(&store(), &product(), &factors, &config).unwrap();
        assert_eq!(ranking[0].factor, factors[1]);
    }

    #[test]
    fn invalid_delta() {
        let config = SensitivityConfig {
            delta: 0.0,
            ..SensitivityConfig::default()
        };
        assert!(rank_all(&store(), &product(), &config).is_err());
    }

    #[test]
    fn sampled_ranking_agrees_with_local_ranking() {
        let config = MonteCarloConfig::default().with_samples(2_000);
        let run = simulate(&store(), &product(), &config).unwrap();
        let ranking = rank_sampled(&run, ImpactCategory::GlobalWarmingPotential);
        assert_eq!(ranking.len(), run.factors().len());
        assert_eq!(ranking[0].factor, carbon("HEAVY"));
        let shares: f64 = ranking.iter().map(|e| e.share).sum();
        assert!((shares - 1.0).abs() < 1e-9);
    }
}
