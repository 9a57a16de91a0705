//! Reference-data rows: materials, processes, grid regions and transport modes.
//!
//! All factors are expressed per kilogram of product mass (or per kg·km for
//! transport). Coefficients of variation are optional; the uncertainty engine
//! falls back to its configured default when a row declares none.

use serde::{Deserialize, Serialize};

use crate::ids::{MaterialId, ProcessId, RegionId, TransportModeId};

// ── Material ────────────────────────────────────────────────────────────

/// Declared coefficients of variation for a material's factors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialCv {
    pub carbon: Option<f64>,
    pub energy: Option<f64>,
    pub water: Option<f64>,
    pub toxicity: Option<f64>,
}

/// A material with its cradle-to-gate impact factors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Informational family ("Polymer", "Metal", ...). Matched against
    /// `Process::applicable_categories`.
    #[serde(default)]
    pub category: Option<String>,
    /// kg CO₂e per kg.
    pub carbon_factor: f64,
    /// MJ per kg.
    pub energy_factor: f64,
    /// L per kg.
    pub water_factor: f64,
    /// CTUe per kg.
    #[serde(default)]
    pub ecotoxicity_factor: f64,
    /// CTUh per kg.
    #[serde(default)]
    pub human_toxicity_factor: f64,
    /// Weight applied to both toxicity categories. `None` means 1.0.
    #[serde(default)]
    pub hazard_multiplier: Option<f64>,
    /// End-of-life recyclability fraction in [0, 1].
    pub recyclability: f64,
    /// Declared recycled-input fraction in [0, 1]. `None` means 0.
    #[serde(default)]
    pub recycled_content: Option<f64>,
    #[serde(default)]
    pub biogenic: bool,
    #[serde(default)]
    pub cv: MaterialCv,
}

impl Material {
    pub fn new(
        id: impl Into<MaterialId>,
        name: impl Into<String>,
        carbon_factor: f64,
        energy_factor: f64,
        water_factor: f64,
        recyclability: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            carbon_factor,
            energy_factor,
            water_factor,
            ecotoxicity_factor: 0.0,
            human_toxicity_factor: 0.0,
            hazard_multiplier: None,
            recyclability,
            recycled_content: None,
            biogenic: false,
            cv: MaterialCv::default(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_toxicity(mut self, ecotoxicity: f64, human_toxicity: f64) -> Self {
        self.ecotoxicity_factor = ecotoxicity;
        self.human_toxicity_factor = human_toxicity;
        self
    }

    pub fn with_hazard_multiplier(mut self, multiplier: f64) -> Self {
        self.hazard_multiplier = Some(multiplier);
        self
    }

    pub fn with_recycled_content(mut self, fraction: f64) -> Self {
        self.recycled_content = Some(fraction);
        self
    }

    pub fn with_biogenic(mut self, biogenic: bool) -> Self {
        self.biogenic = biogenic;
        self
    }

    pub fn with_cv(mut self, cv: MaterialCv) -> Self {
        self.cv = cv;
        self
    }

    /// Hazard multiplier with the 1.0 default applied.
    pub fn hazard(&self) -> f64 {
        self.hazard_multiplier.unwrap_or(1.0)
    }
}

// ── Process ─────────────────────────────────────────────────────────────

/// Declared coefficients of variation for a process's factors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessCv {
    pub energy: Option<f64>,
    pub carbon: Option<f64>,
}

/// A manufacturing process applied to the whole product mass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    /// MJ per kg processed. Converted to carbon through the region's grid.
    pub energy_intensity: f64,
    /// kg CO₂e per kg, independent of the grid.
    pub process_carbon_factor: f64,
    #[serde(default)]
    pub water_factor: f64,
    #[serde(default)]
    pub ecotoxicity_factor: f64,
    #[serde(default)]
    pub human_toxicity_factor: f64,
    /// Material categories this process is meant for. Empty means any.
    #[serde(default)]
    pub applicable_categories: Vec<String>,
    #[serde(default)]
    pub cv: ProcessCv,
}

impl Process {
    pub fn new(
        id: impl Into<ProcessId>,
        name: impl Into<String>,
        energy_intensity: f64,
        process_carbon_factor: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            energy_intensity,
            process_carbon_factor,
            water_factor: 0.0,
            ecotoxicity_factor: 0.0,
            human_toxicity_factor: 0.0,
            applicable_categories: Vec::new(),
            cv: ProcessCv::default(),
        }
    }

    pub fn with_water(mut self, water_factor: f64) -> Self {
        self.water_factor = water_factor;
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applicable_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cv(mut self, cv: ProcessCv) -> Self {
        self.cv = cv;
        self
    }

    /// Whether the process declares itself applicable to `category`.
    pub fn applies_to(&self, category: Option<&str>) -> bool {
        if self.applicable_categories.is_empty() {
            return true;
        }
        match category {
            Some(c) => self
                .applicable_categories
                .iter()
                .any(|a| a.eq_ignore_ascii_case(c)),
            None => true,
        }
    }
}

// ── Region ──────────────────────────────────────────────────────────────

/// An electricity grid region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    /// kg CO₂e per kWh. Strictly positive.
    pub grid_carbon_intensity: f64,
    #[serde(default)]
    pub grid_intensity_cv: Option<f64>,
}

impl Region {
    pub fn new(
        id: impl Into<RegionId>,
        name: impl Into<String>,
        grid_carbon_intensity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grid_carbon_intensity,
            grid_intensity_cv: None,
        }
    }

    pub fn with_cv(mut self, cv: f64) -> Self {
        self.grid_intensity_cv = Some(cv);
        self
    }
}

// ── Transport ───────────────────────────────────────────────────────────

/// A freight transport mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportMode {
    pub id: TransportModeId,
    pub name: String,
    /// kg CO₂e per kg·km.
    pub carbon_factor: f64,
    /// MJ per kg·km.
    #[serde(default)]
    pub energy_factor: f64,
    #[serde(default)]
    pub carbon_cv: Option<f64>,
}

impl TransportMode {
    pub fn new(
        id: impl Into<TransportModeId>,
        name: impl Into<String>,
        carbon_factor: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            carbon_factor,
            energy_factor: 0.0,
            carbon_cv: None,
        }
    }

    pub fn with_energy(mut self, energy_factor: f64) -> Self {
        self.energy_factor = energy_factor;
        self
    }

    pub fn with_cv(mut self, cv: f64) -> Self {
        self.carbon_cv = Some(cv);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hazard_defaults_to_one() {
        let m = Material::new("PP", "Polypropylene", 2.1, 85.6, 75.0, 0.85);
        assert_eq!(m.hazard(), 1.0);
        assert_eq!(m.with_hazard_multiplier(2.5).hazard(), 2.5);
    }

    #[test]
    fn process_applicability() {
        let any = Process::new("assembly", "Assembly", 0.72, 0.03);
        assert!(any.applies_to(Some("Metal")));

        let molding = Process::new("injection-molding", "Injection Molding", 4.32, 0.15)
            .with_categories(["Polymer", "Biopolymer"]);
        assert!(molding.applies_to(Some("polymer")));
        assert!(!molding.applies_to(Some("Metal")));
        assert!(molding.applies_to(None));
    }

    #[test]
    fn material_deserializes_with_defaults() {
        let json = r#"{
            "id": "GLASS",
            "name": "Soda-lime Glass",
            "carbon_factor": 1.4,
            "energy_factor": 15.0,
            "water_factor": 15.0,
            "recyclability": 1.0
        }"#;
        let m: Material = serde_json::from_str(json).unwrap();
        assert_eq!(m.id.as_str(), "GLASS");
        assert_eq!(m.ecotoxicity_factor, 0.0);
        assert!(m.recycled_content.is_none());
        assert!(!m.biogenic);
        assert_eq!(m.cv, MaterialCv::default());
    }
}
