//! Circularity scoring records and end-of-life assumptions.

use serde::{Deserialize, Serialize};

/// Qualitative grade of a circularity score, relative to the maximum
/// achievable under the scoring weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircularityClass {
    HighlyCircular,
    ModeratelyCircular,
    Transitional,
    Linear,
}

impl CircularityClass {
    /// Grade a score given as a fraction of the maximum achievable score.
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction >= 0.8 {
            CircularityClass::HighlyCircular
        } else if fraction >= 0.6 {
            CircularityClass::ModeratelyCircular
        } else if fraction >= 0.4 {
            CircularityClass::Transitional
        } else {
            CircularityClass::Linear
        }
    }
}

impl std::fmt::Display for CircularityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CircularityClass::HighlyCircular => "Highly Circular",
            CircularityClass::ModeratelyCircular => "Moderately Circular",
            CircularityClass::Transitional => "Transitional",
            CircularityClass::Linear => "Linear",
        };
        write!(f, "{}", s)
    }
}

/// What happens to the product at end of life.
///
/// The three routing rates must each lie in [0, 1] and sum to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndOfLifeAssumptions {
    pub recycling_rate: f64,
    pub incineration_rate: f64,
    pub landfill_rate: f64,
    /// Fraction of incineration heat recovered as useful energy.
    pub energy_recovery_efficiency: f64,
    /// Lower heating value of incinerated material, MJ per kg.
    pub heating_value_mj_per_kg: f64,
    /// kg of virgin material displaced per kg recovered.
    pub substitution_ratio: f64,
}

impl Default for EndOfLifeAssumptions {
    fn default() -> Self {
        Self {
            recycling_rate: 0.7,
            incineration_rate: 0.2,
            landfill_rate: 0.1,
            energy_recovery_efficiency: 0.8,
            heating_value_mj_per_kg: 10.0,
            substitution_ratio: 0.8,
        }
    }
}

/// Material and energy flows recovered at end of life.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EndOfLifeOutcome {
    pub recovered_material_kg: f64,
    pub avoided_virgin_material_kg: f64,
    pub recovered_energy_mj: f64,
    pub landfilled_kg: f64,
}

/// Composite circularity index with its sub-scores.
///
/// Sub-scores are fractions in [0, 1]; `biogenic` already includes the
/// biogenic credit weight. `composite` and `max_score` are on the 0–100 scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircularityScore {
    pub composite: f64,
    pub max_score: f64,
    pub recycled_content: f64,
    pub recyclability: f64,
    pub biogenic: f64,
    pub class: CircularityClass,
    pub end_of_life: EndOfLifeOutcome,
}
