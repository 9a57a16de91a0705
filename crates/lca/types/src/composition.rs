//! Product composition: the caller-owned description of one product.

use serde::{Deserialize, Serialize};

use crate::ids::{MaterialId, ProcessId, RegionId, TransportModeId};

/// One bill-of-materials line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub material: MaterialId,
    pub mass_kg: f64,
    /// Overrides the material's declared recycled-input fraction for this line.
    #[serde(default)]
    pub recycled_content: Option<f64>,
}

/// One freight leg. The whole product mass travels on every leg.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportLeg {
    pub mode: TransportModeId,
    pub distance_km: f64,
    /// Used share of vehicle capacity in (0, 1]. A half-empty vehicle
    /// charges its freight for twice the distance. `None` means full.
    #[serde(default)]
    pub load_factor: Option<f64>,
}

impl TransportLeg {
    /// Load factor with the 1.0 default applied.
    pub fn load(&self) -> f64 {
        self.load_factor.unwrap_or(1.0)
    }
}

/// Maturity of the manufacturing equipment. Scales the grid energy a
/// process draws, not its direct emissions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnologyLevel {
    Basic,
    #[default]
    Average,
    Advanced,
    StateOfTheArt,
}

impl TechnologyLevel {
    /// Energy multiplier relative to average equipment.
    pub fn energy_factor(&self) -> f64 {
        match self {
            TechnologyLevel::Basic => 1.2,
            TechnologyLevel::Average => 1.0,
            TechnologyLevel::Advanced => 0.8,
            TechnologyLevel::StateOfTheArt => 0.6,
        }
    }
}

impl std::fmt::Display for TechnologyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TechnologyLevel::Basic => write!(f, "basic"),
            TechnologyLevel::Average => write!(f, "average"),
            TechnologyLevel::Advanced => write!(f, "advanced"),
            TechnologyLevel::StateOfTheArt => write!(f, "state_of_the_art"),
        }
    }
}

/// A recurring way the product is used, e.g. "dishwasher cycle".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UseScenario {
    pub name: String,
    pub uses_per_year: f64,
    /// Electricity drawn per use, converted through the region's grid.
    #[serde(default)]
    pub energy_kwh_per_use: f64,
    #[serde(default)]
    pub water_l_per_use: f64,
}

fn default_functional_unit() -> f64 {
    1.0
}

fn default_lifetime() -> f64 {
    1.0
}

/// A product to assess.
///
/// Lines, transport legs and the functional unit are taken as given; the
/// engine validates them on every call and never keeps a reference after
/// returning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductComposition {
    pub name: String,
    pub lines: Vec<MaterialLine>,
    #[serde(default)]
    pub process: Option<ProcessId>,
    /// Share of the process's nominal energy that does useful work, in
    /// (0, 1]. `None` means 1.0.
    #[serde(default)]
    pub process_efficiency: Option<f64>,
    #[serde(default)]
    pub technology: Option<TechnologyLevel>,
    pub region: RegionId,
    #[serde(default)]
    pub transport: Vec<TransportLeg>,
    #[serde(default)]
    pub use_phase: Vec<UseScenario>,
    /// Years of service the use phase is counted over.
    #[serde(default = "default_lifetime")]
    pub lifetime_years: f64,
    /// Quantity of product the impacts are normalized to.
    #[serde(default = "default_functional_unit")]
    pub functional_unit: f64,
}

impl ProductComposition {
    pub fn new(name: impl Into<String>, region: impl Into<RegionId>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
            process: None,
            process_efficiency: None,
            technology: None,
            region: region.into(),
            transport: Vec::new(),
            use_phase: Vec::new(),
            lifetime_years: 1.0,
            functional_unit: 1.0,
        }
    }

    pub fn with_line(mut self, material: impl Into<MaterialId>, mass_kg: f64) -> Self {
        self.lines.push(MaterialLine {
            material: material.into(),
            mass_kg,
            recycled_content: None,
        });
        self
    }

    pub fn with_recycled_line(
        mut self,
        material: impl Into<MaterialId>,
        mass_kg: f64,
        recycled_content: f64,
    ) -> Self {
        self.lines.push(MaterialLine {
            material: material.into(),
            mass_kg,
            recycled_content: Some(recycled_content),
        });
        self
    }

    pub fn with_process(mut self, process: impl Into<ProcessId>) -> Self {
        self.process = Some(process.into());
        self
    }

    pub fn with_process_efficiency(mut self, efficiency: f64) -> Self {
        self.process_efficiency = Some(efficiency);
        self
    }

    pub fn with_technology(mut self, technology: TechnologyLevel) -> Self {
        self.technology = Some(technology);
        self
    }

    pub fn with_transport(mut self, mode: impl Into<TransportModeId>, distance_km: f64) -> Self {
        self.transport.push(TransportLeg {
            mode: mode.into(),
            distance_km,
            load_factor: None,
        });
        self
    }

    pub fn with_loaded_transport(
        mut self,
        mode: impl Into<TransportModeId>,
        distance_km: f64,
        load_factor: f64,
    ) -> Self {
        self.transport.push(TransportLeg {
            mode: mode.into(),
            distance_km,
            load_factor: Some(load_factor),
        });
        self
    }

    pub fn with_use(
        mut self,
        name: impl Into<String>,
        uses_per_year: f64,
        energy_kwh_per_use: f64,
        water_l_per_use: f64,
    ) -> Self {
        self.use_phase.push(UseScenario {
            name: name.into(),
            uses_per_year,
            energy_kwh_per_use,
            water_l_per_use,
        });
        self
    }

    pub fn with_lifetime(mut self, years: f64) -> Self {
        self.lifetime_years = years;
        self
    }

    pub fn with_functional_unit(mut self, functional_unit: f64) -> Self {
        self.functional_unit = functional_unit;
        self
    }

    /// Sum of line masses in input order.
    pub fn total_mass(&self) -> f64 {
        self.lines.iter().map(|l| l.mass_kg).sum()
    }
}

/// One alternative outcome of a product decision, weighted by how likely
/// it is thought to be.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Relative weight; weights need not sum to one.
    pub probability: f64,
    pub composition: ProductComposition,
}

impl Scenario {
    pub fn new(name: impl Into<String>, probability: f64, composition: ProductComposition) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            probability,
            composition,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
