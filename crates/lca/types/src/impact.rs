//! Impact categories and the records the aggregator and uncertainty engine
//! hand back to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{MaterialId, ProcessId, TransportModeId};

// ── Categories ──────────────────────────────────────────────────────────

/// Midpoint impact categories, in the fixed order used for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactCategory {
    GlobalWarmingPotential,
    EnergyDemand,
    WaterScarcity,
    Ecotoxicity,
    HumanToxicity,
}

impl ImpactCategory {
    pub const ALL: [ImpactCategory; 5] = [
        ImpactCategory::GlobalWarmingPotential,
        ImpactCategory::EnergyDemand,
        ImpactCategory::WaterScarcity,
        ImpactCategory::Ecotoxicity,
        ImpactCategory::HumanToxicity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ImpactCategory::GlobalWarmingPotential => "global-warming-potential",
            ImpactCategory::EnergyDemand => "energy-demand",
            ImpactCategory::WaterScarcity => "water-scarcity",
            ImpactCategory::Ecotoxicity => "ecotoxicity",
            ImpactCategory::HumanToxicity => "human-toxicity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ImpactCategory::GlobalWarmingPotential => "kg CO2e",
            ImpactCategory::EnergyDemand => "MJ",
            ImpactCategory::WaterScarcity => "L",
            ImpactCategory::Ecotoxicity => "CTUe",
            ImpactCategory::HumanToxicity => "CTUh",
        }
    }
}

impl std::fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ImpactCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImpactCategory::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .or(match s {
                "gwp" | "carbon" => Some(ImpactCategory::GlobalWarmingPotential),
                "energy" => Some(ImpactCategory::EnergyDemand),
                "water" => Some(ImpactCategory::WaterScarcity),
                _ => None,
            })
            .ok_or_else(|| format!("unknown impact category: {}", s))
    }
}

// ── Impact vector ───────────────────────────────────────────────────────

/// One value per category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactVector {
    pub global_warming_potential: f64,
    pub energy_demand: f64,
    pub water_scarcity: f64,
    pub ecotoxicity: f64,
    pub human_toxicity: f64,
}

impl ImpactVector {
    pub fn get(&self, category: ImpactCategory) -> f64 {
        match category {
            ImpactCategory::GlobalWarmingPotential => self.global_warming_potential,
            ImpactCategory::EnergyDemand => self.energy_demand,
            ImpactCategory::WaterScarcity => self.water_scarcity,
            ImpactCategory::Ecotoxicity => self.ecotoxicity,
            ImpactCategory::HumanToxicity => self.human_toxicity,
        }
    }

    pub fn set(&mut self, category: ImpactCategory, value: f64) {
        match category {
            ImpactCategory::GlobalWarmingPotential => self.global_warming_potential = value,
            ImpactCategory::EnergyDemand => self.energy_demand = value,
            ImpactCategory::WaterScarcity => self.water_scarcity = value,
            ImpactCategory::Ecotoxicity => self.ecotoxicity = value,
            ImpactCategory::HumanToxicity => self.human_toxicity = value,
        }
    }

    /// Component-wise `self += other`, categories in `ImpactCategory::ALL` order.
    pub fn accumulate(&mut self, other: &ImpactVector) {
        for c in ImpactCategory::ALL {
            self.set(c, self.get(c) + other.get(c));
        }
    }

    /// Component-wise division.
    pub fn divided_by(&self, divisor: f64) -> ImpactVector {
        let mut out = ImpactVector::default();
        for c in ImpactCategory::ALL {
            out.set(c, self.get(c) / divisor);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImpactCategory, f64)> + '_ {
        ImpactCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

// ── Contributions ───────────────────────────────────────────────────────

/// Where a share of the total comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ContributionSource {
    Material { line: usize, material: MaterialId },
    ProcessEnergy { process: ProcessId },
    ProcessDirect { process: ProcessId },
    Transport { leg: usize, mode: TransportModeId },
    /// One use-phase scenario over the product's lifetime.
    UsePhase { scenario: usize, name: String },
}

impl std::fmt::Display for ContributionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContributionSource::Material { line, material } => {
                write!(f, "material[{}] {}", line, material)
            }
            ContributionSource::ProcessEnergy { process } => {
                write!(f, "process {} (grid energy)", process)
            }
            ContributionSource::ProcessDirect { process } => {
                write!(f, "process {} (direct)", process)
            }
            ContributionSource::Transport { leg, mode } => write!(f, "transport[{}] {}", leg, mode),
            ContributionSource::UsePhase { scenario, name } => {
                write!(f, "use[{}] {}", scenario, name)
            }
        }
    }
}

/// Impacts attributable to one source, per functional unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub source: ContributionSource,
    pub impacts: ImpactVector,
}

// ── Distribution summary ────────────────────────────────────────────────

/// Summary of a sampled distribution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionSummary {
    pub mean: f64,
    pub std_dev: f64,
    /// `std_dev / mean`, 0 when the mean is not positive.
    pub cv: f64,
    /// Population skewness.
    pub skewness: f64,
    /// Population excess kurtosis (0 for a normal distribution).
    pub kurtosis: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub p2_5: f64,
    pub p50: f64,
    pub p97_5: f64,
}

/// Lower and upper confidence bound.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBounds {
    pub low: f64,
    pub high: f64,
}

impl ConfidenceBounds {
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

// ── Impact result ───────────────────────────────────────────────────────

/// Point value for one category, optionally decorated with uncertainty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactValue {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ConfidenceBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DistributionSummary>,
}

impl ImpactValue {
    pub fn point(value: f64) -> Self {
        Self {
            value,
            bounds: None,
            distribution: None,
        }
    }
}

/// Impacts of one product per functional unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub product: String,
    pub functional_unit: f64,
    pub impacts: BTreeMap<ImpactCategory, ImpactValue>,
    /// Per-source breakdown in summation order.
    pub contributions: Vec<Contribution>,
}

impl ImpactResult {
    /// Point value of a category (0.0 if absent).
    pub fn value(&self, category: ImpactCategory) -> f64 {
        self.impacts.get(&category).map(|v| v.value).unwrap_or(0.0)
    }

    pub fn bounds(&self, category: ImpactCategory) -> Option<ConfidenceBounds> {
        self.impacts.get(&category).and_then(|v| v.bounds)
    }

    /// All point values as a vector.
    pub fn totals(&self) -> ImpactVector {
        let mut v = ImpactVector::default();
        for (c, value) in &self.impacts {
            v.set(*c, value.value);
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_round_trip_through_from_str() {
        for c in ImpactCategory::ALL {
            assert_eq!(c.name().parse::<ImpactCategory>().unwrap(), c);
        }
        assert_eq!(
            "gwp".parse::<ImpactCategory>().unwrap(),
            ImpactCategory::GlobalWarmingPotential
        );
        assert!("ozone".parse::<ImpactCategory>().is_err());
    }

    #[test]
    fn category_serializes_kebab_case() {
        let json = serde_json::to_string(&ImpactCategory::GlobalWarmingPotential).unwrap();
        assert_eq!(json, "\"global-warming-potential\"");
    }

    #[test]
    fn vector_accumulate_and_divide() {
        let mut a = ImpactVector {
            global_warming_potential: 1.0,
            energy_demand: 10.0,
            ..Default::default()
        };
        let b = ImpactVector {
            global_warming_potential: 3.0,
            water_scarcity: 4.0,
            ..Default::default()
        };
        a.accumulate(&b);
        let half = a.divided_by(2.0);
        assert_eq!(half.global_warming_potential, 2.0);
        assert_eq!(half.energy_demand, 5.0);
        assert_eq!(half.water_scarcity, 2.0);
        assert_eq!(half.iter().count(), 5);
    }

    #[test]
    fn bounds_width_and_contains() {
        let b = ConfidenceBounds {
            low: 1.0,
            high: 3.5,
        };
        assert_eq!(b.width(), 2.5);
        assert!(b.contains(2.0));
        assert!(!b.contains(4.0));
    }

    #[test]
    fn result_value_defaults_to_zero_for_missing_category() {
        let r = ImpactResult {
            product: "empty".into(),
            functional_unit: 1.0,
            impacts: BTreeMap::new(),
            contributions: vec![],
        };
        assert_eq!(r.value(ImpactCategory::Ecotoxicity), 0.0);
        assert!(r.bounds(ImpactCategory::Ecotoxicity).is_none());
    }

    #[test]
    fn contribution_source_display() {
        let s = ContributionSource::Transport {
            leg: 1,
            mode: TransportModeId::new("rail"),
        };
        assert_eq!(s.to_string(), "transport[1] rail");
        let u = ContributionSource::UsePhase {
            scenario: 0,
            name: "wash".into(),
        };
        assert_eq!(u.to_string(), "use[0] wash");
    }

    #[test]
    fn summary_without_shape_fields_deserializes() {
        let json = r#"{
            "mean": 2.0, "std_dev": 0.5, "min": 1.0, "max": 3.0,
            "p2_5": 1.1, "p50": 2.0, "p97_5": 2.9
        }"#;
        let s: DistributionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.cv, 0.0);
        assert_eq!(s.range, 0.0);
    }
}
