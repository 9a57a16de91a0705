//! Records produced by comparative statistics and sensitivity analysis.

use serde::{Deserialize, Serialize};

use crate::ids::{MaterialId, ProcessId, RegionId, TransportModeId};
use crate::impact::ImpactCategory;

// ── Comparison ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Two-sample t-test without the equal-variance assumption.
    WelchT,
    /// One-way analysis of variance across three or more groups.
    OneWayAnova,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "measure", content = "value", rename_all = "snake_case")]
pub enum EffectSize {
    CohensD(f64),
    EtaSquared(f64),
}

impl EffectSize {
    pub fn value(&self) -> f64 {
        match self {
            EffectSize::CohensD(v) | EffectSize::EtaSquared(v) => *v,
        }
    }
}

/// Outcome of a significance test between products or scenarios.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub test: TestKind,
    /// t for Welch, F for ANOVA.
    pub statistic: f64,
    /// Welch–Satterthwaite df, or the between-groups df for ANOVA.
    pub degrees_of_freedom: f64,
    /// Within-groups df (ANOVA only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator_degrees_of_freedom: Option<f64>,
    pub p_value: f64,
    pub alpha: f64,
    pub significant: bool,
    pub effect_size: EffectSize,
    pub group_means: Vec<f64>,
}

impl ComparisonResult {
    /// Human-readable verdict, e.g. `"significant at α=0.05"`.
    pub fn verdict(&self) -> String {
        if self.significant {
            format!("significant at α={}", self.alpha)
        } else {
            format!("not significant at α={}", self.alpha)
        }
    }
}

// ── Sensitivity ─────────────────────────────────────────────────────────

/// An input factor that can be perturbed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "factor", rename_all = "snake_case")]
pub enum FactorId {
    MaterialCarbon { material: MaterialId },
    MaterialEnergy { material: MaterialId },
    MaterialWater { material: MaterialId },
    /// Both toxicity factors of a material, moved together.
    MaterialToxicity { material: MaterialId },
    ProcessEnergy { process: ProcessId },
    ProcessCarbon { process: ProcessId },
    GridIntensity { region: RegionId },
    TransportCarbon { mode: TransportModeId },
    /// Mass of one bill-of-materials line.
    LineMass { line: usize },
}

impl std::fmt::Display for FactorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactorId::MaterialCarbon { material } => write!(f, "material:{}:carbon", material),
            FactorId::MaterialEnergy { material } => write!(f, "material:{}:energy", material),
            FactorId::MaterialWater { material } => write!(f, "material:{}:water", material),
            FactorId::MaterialToxicity { material } => write!(f, "material:{}:toxicity", material),
            FactorId::ProcessEnergy { process } => write!(f, "process:{}:energy", process),
            FactorId::ProcessCarbon { process } => write!(f, "process:{}:carbon", process),
            FactorId::GridIntensity { region } => write!(f, "region:{}:grid", region),
            FactorId::TransportCarbon { mode } => write!(f, "transport:{}:carbon", mode),
            FactorId::LineMass { line } => write!(f, "line:{}:mass", line),
        }
    }
}

/// One row of a sensitivity ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub factor: FactorId,
    /// Raw recorded change (relative, or absolute when the baseline is zero).
    pub change: f64,
    /// Normalized share; shares of a ranking sum to 1 unless all changes are 0.
    pub share: f64,
}

// ── Scenarios ───────────────────────────────────────────────────────────

/// One scenario's outcome within a weighted analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Weight normalized so the weights of an analysis sum to one.
    pub weight: f64,
    pub value: f64,
}

/// Spread of outcomes across scenarios, ignoring their weights.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRobustness {
    pub best_case: f64,
    pub worst_case: f64,
    /// `worst_case - best_case`: the regret of committing to the best case.
    pub range: f64,
    /// Coefficient of variation of the outcomes, 0 when their mean is not
    /// positive.
    pub cv: f64,
}

/// Probability-weighted view of one impact category across scenarios.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub category: ImpactCategory,
    pub outcomes: Vec<ScenarioOutcome>,
    pub expected_value: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub robustness: ScenarioRobustness,
}

impl ScenarioAnalysis {
    /// Outcome with the lowest value; ties go to the earlier scenario.
    pub fn preferred(&self) -> Option<&ScenarioOutcome> {
        self.outcomes
            .iter()
            .reduce(|best, o| if o.value < best.value { o } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(significant: bool) -> ComparisonResult {
        ComparisonResult {
            test: TestKind::WelchT,
            statistic: 2.5,
            degrees_of_freedom: 18.0,
            denominator_degrees_of_freedom: None,
            p_value: 0.02,
            alpha: 0.05,
            significant,
            effect_size: EffectSize::CohensD(1.1),
            group_means: vec![1.0, 2.0],
        }
    }

    #[test]
    fn verdict_text() {
        assert_eq!(result(true).verdict(), "significant at α=0.05");
        assert_eq!(result(false).verdict(), "not significant at α=0.05");
    }

    #[test]
    fn factor_display() {
        let f = FactorId::MaterialCarbon {
            material: MaterialId::new("PP"),
        };
        assert_eq!(f.to_string(), "material:PP:carbon");
        assert_eq!(FactorId::LineMass { line: 2 }.to_string(), "line:2:mass");
    }

    #[test]
    fn factor_serialization_is_tagged() {
        let f = FactorId::GridIntensity {
            region: RegionId::new("china"),
        };
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("\"factor\":\"grid_intensity\""));
        let back: FactorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn effect_size_value() {
        assert_eq!(EffectSize::EtaSquared(0.4).value(), 0.4);
    }

    #[test]
    fn preferred_scenario_is_lowest_outcome() {
        let outcome = |name: &str, value: f64| ScenarioOutcome {
            name: name.into(),
            description: String::new(),
            weight: 0.5,
            value,
        };
        let analysis = ScenarioAnalysis {
            category: ImpactCategory::GlobalWarmingPotential,
            outcomes: vec![outcome("landfill", 3.0), outcome("reuse", 1.0)],
            expected_value: 2.0,
            variance: 1.0,
            std_dev: 1.0,
            robustness: ScenarioRobustness::default(),
        };
        assert_eq!(analysis.preferred().unwrap().name, "reuse");
    }
}
