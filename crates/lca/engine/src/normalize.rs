//! Normalization of impacts against per-capita annual reference values.

use std::collections::BTreeMap;

use lca_types::{ImpactCategory, ImpactResult};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Annual impact of an average person, per category. Categories left at
/// `None` are omitted from normalized output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationReference {
    /// kg CO₂e per person-year.
    pub global_warming_potential: Option<f64>,
    /// MJ per person-year.
    pub energy_demand: Option<f64>,
    /// L per person-year.
    pub water_scarcity: Option<f64>,
    pub ecotoxicity: Option<f64>,
    pub human_toxicity: Option<f64>,
}

impl Default for NormalizationReference {
    fn default() -> Self {
        Self {
            global_warming_potential: Some(5_000.0),
            energy_demand: Some(80_000.0),
            water_scarcity: Some(1_500_000.0),
            ecotoxicity: None,
            human_toxicity: None,
        }
    }
}

impl NormalizationReference {
    pub fn get(&self, category: ImpactCategory) -> Option<f64> {
        match category {
            ImpactCategory::GlobalWarmingPotential => self.global_warming_potential,
            ImpactCategory::EnergyDemand => self.energy_demand,
            ImpactCategory::WaterScarcity => self.water_scarcity,
            ImpactCategory::Ecotoxicity => self.ecotoxicity,
            ImpactCategory::HumanToxicity => self.human_toxicity,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        for category in ImpactCategory::ALL {
            if let Some(v) = self.get(category) {
                if !v.is_finite() || v <= 0.0 {
                    return Err(EngineError::config(
                        format!("normalization.{}", category.name().replace('-', "_")),
                        format!("{} must be finite and > 0", v),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Impacts expressed in person-years of the reference.
pub fn normalize(
    result: &ImpactResult,
    reference: &NormalizationReference,
) -> EngineResult<BTreeMap<ImpactCategory, f64>> {
    reference.validate()?;
    Ok(ImpactCategory::ALL
        .into_iter()
        .filter_map(|c| reference.get(c).map(|per_capita| (c, result.value(c) / per_capita)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lca_types::ImpactValue;

    fn result() -> ImpactResult {
        let impacts: BTreeMap<_, _> = [
            (ImpactCategory::GlobalWarmingPotential, 50.0),
            (ImpactCategory::EnergyDemand, 800.0),
            (ImpactCategory::WaterScarcity, 3_000.0),
            (ImpactCategory::Ecotoxicity, 12.0),
        ]
        .into_iter()
        .map(|(c, v)| (c, ImpactValue::point(v)))
        .collect();
        ImpactResult {
            product: "p".into(),
            functional_unit: 1.0,
            impacts,
            contributions: Vec::new(),
        }
    }

    #[test]
    fn default_reference() {
        let n = normalize(&result(), &NormalizationReference::default()).unwrap();
        assert_eq!(n.len(), 3);
        assert!((n[&ImpactCategory::GlobalWarmingPotential] - 0.01).abs() < 1e-15);
        assert!((n[&ImpactCategory::EnergyDemand] - 0.01).abs() < 1e-15);
        assert!((n[&ImpactCategory::WaterScarcity] - 0.002).abs() < 1e-15);
        assert!(!n.contains_key(&ImpactCategory::Ecotoxicity));
    }

    #[test]
    fn non_positive_reference_rejected() {
        let reference = NormalizationReference {
            energy_demand: Some(0.0),
            ..NormalizationReference::default()
        };
        let err = normalize(&result(), &reference).unwrap_err();
        assert!(err.to_string().contains("normalization.energy_demand"));
    }
}
