//! Circularity Scorer.
//!
//! Composite index on a 0–100 scale built from three mass-weighted
//! sub-scores (recycled input, end-of-life recyclability, biogenic content),
//! plus the material and energy flows recovered under the end-of-life
//! assumptions. Pure: no hidden state, no randomness.

use lca_reference::ReferenceDataStore;
use lca_types::{
    CircularityClass, CircularityScore, EndOfLifeAssumptions, EndOfLifeOutcome,
    ProductComposition,
};
use serde::{Deserialize, Serialize};

use crate::aggregator::{resolve, ResolvedComposition, ResolvedLine};
use crate::error::{EngineError, EngineResult};

/// Tolerance on weight and routing-rate sums.
const SUM_TOLERANCE: f64 = 1e-9;

/// Scoring weights and the biogenic credit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircularityConfig {
    pub recycled_content_weight: f64,
    pub recyclability_weight: f64,
    pub biogenic_weight: f64,
    /// Credit granted per unit of biogenic mass fraction.
    pub biogenic_credit: f64,
}

impl Default for CircularityConfig {
    fn default() -> Self {
        Self {
            recycled_content_weight: 0.4,
            recyclability_weight: 0.3,
            biogenic_weight: 0.3,
            biogenic_credit: 0.2,
        }
    }
}

impl CircularityConfig {
    pub fn validate(&self) -> EngineResult<()> {
        let weights = [
            ("circularity.recycled_content_weight", self.recycled_content_weight),
            ("circularity.recyclability_weight", self.recyclability_weight),
            ("circularity.biogenic_weight", self.biogenic_weight),
        ];
        for (field, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(EngineError::config(
                    field,
                    format!("{} must be a finite weight >= 0", w),
                ));
            }
        }
        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(EngineError::config(
                "circularity",
                format!("weights sum to {}, expected 1", sum),
            ));
        }
        if !(0.0..=1.0).contains(&self.biogenic_credit) {
            return Err(EngineError::config(
                "circularity.biogenic_credit",
                format!("{} outside [0, 1]", self.biogenic_credit),
            ));
        }
        Ok(())
    }

    /// Highest composite reachable under these weights: every sub-score at
    /// its ceiling, with the biogenic sub-score capped by the credit.
    pub fn max_score(&self) -> f64 {
        100.0
            * (self.recycled_content_weight
                + self.recyclability_weight
                + self.biogenic_weight * self.biogenic_credit)
    }
}

pub(crate) fn validate_end_of_life(eol: &EndOfLifeAssumptions) -> EngineResult<()> {
    let fractions = [
        ("end_of_life.recycling_rate", eol.recycling_rate),
        ("end_of_life.incineration_rate", eol.incineration_rate),
        ("end_of_life.landfill_rate", eol.landfill_rate),
        ("end_of_life.energy_recovery_efficiency", eol.energy_recovery_efficiency),
        ("end_of_life.substitution_ratio", eol.substitution_ratio),
    ];
    for (field, v) in fractions {
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            return Err(EngineError::config(field, format!("{} outside [0, 1]", v)));
        }
    }
    let routed = eol.recycling_rate + eol.incineration_rate + eol.landfill_rate;
    if (routed - 1.0).abs() > SUM_TOLERANCE {
        return Err(EngineError::config(
            "end_of_life",
            format!("routing rates sum to {}, expected 1", routed),
        ));
    }
    if !eol.heating_value_mj_per_kg.is_finite() || eol.heating_value_mj_per_kg < 0.0 {
        return Err(EngineError::config(
            "end_of_life.heating_value_mj_per_kg",
            format!("{} must be >= 0", eol.heating_value_mj_per_kg),
        ));
    }
    Ok(())
}

fn mass_weighted(resolved: &ResolvedComposition, f: impl Fn(&ResolvedLine) -> f64) -> f64 {
    let weighted: f64 = resolved.lines.iter().map(|l| l.mass_kg * f(l)).sum();
    weighted / resolved.total_mass()
}

/// Score a composition. Resolves it against the store first.
pub fn compute_circularity(
    store: &ReferenceDataStore,
    composition: &ProductComposition,
    end_of_life: &EndOfLifeAssumptions,
    config: &CircularityConfig,
) -> EngineResult<CircularityScore> {
    let resolved = resolve(store, composition)?;
    score_resolved(&resolved, end_of_life, config)
}

/// Score an already-resolved composition.
pub fn score_resolved(
    resolved: &ResolvedComposition,
    end_of_life: &EndOfLifeAssumptions,
    config: &CircularityConfig,
) -> EngineResult<CircularityScore> {
    config.validate()?;
    validate_end_of_life(end_of_life)?;

    let total = resolved.total_mass();
    let recycled_content = mass_weighted(resolved, |l| l.recycled_content);
    let recyclability = mass_weighted(resolved, |l| l.material.recyclability);
    let biogenic_fraction = mass_weighted(resolved, |l| {
        if l.material.biogenic { 1.0 } else { 0.0 }
    });
    let biogenic = biogenic_fraction * config.biogenic_credit;

    let composite = 100.0
        * (config.recycled_content_weight * recycled_content
            + config.recyclability_weight * recyclability
            + config.biogenic_weight * biogenic);
    let max_score = config.max_score();
    let class = if max_score > 0.0 {
        CircularityClass::from_fraction(composite / max_score)
    } else {
        CircularityClass::Linear
    };

    let recovered_material_kg: f64 = resolved
        .lines
        .iter()
        .map(|l| l.mass_kg * l.material.recyclability * end_of_life.recycling_rate)
        .sum();
    let end_of_life = EndOfLifeOutcome {
        recovered_material_kg,
        avoided_virgin_material_kg: recovered_material_kg * end_of_life.substitution_ratio,
        recovered_energy_mj: total
            * end_of_life.incineration_rate
            * end_of_life.heating_value_mj_per_kg
            * end_of_life.energy_recovery_efficiency,
        landfilled_kg: total * end_of_life.landfill_rate,
    };

    Ok(CircularityScore {
        composite,
        max_score,
        recycled_content,
        recyclability,
        biogenic,
        class,
        end_of_life,
    })
}
