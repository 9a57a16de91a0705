//! Built-in demonstration dataset.
//!
//! Indicative values for common packaging and product materials, converted to
//! the store's units: grid intensity g/kWh → kg/kWh, process electricity
//! kWh/kg → MJ/kg, freight g/tonne·km → kg/kg·km. Not a substitute for a
//! licensed LCA database.

use lca_types::{Material, MaterialCv, Process, ProcessCv, Region, TransportMode};

use crate::error::ReferenceResult;
use crate::store::ReferenceDataStore;

const MJ_PER_KWH: f64 = 3.6;

/// (id, name, category, energy MJ/kg, energy sd, carbon kg/kg, carbon sd,
///  water L/kg, recyclability, toxicity score, biogenic, recycled input)
type MaterialRow = (
    &'static str,
    &'static str,
    &'static str,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    bool,
    Option<f64>,
);

#[rustfmt::skip]
const MATERIALS: &[MaterialRow] = &[
    ("PP", "Polypropylene", "Polymer", 85.6, 3.2, 2.1, 0.1, 75.0, 0.85, 3.0, false, None),
    ("PET", "Polyethylene Terephthalate", "Polymer", 84.2, 3.1, 3.2, 0.15, 120.0, 0.90, 4.0, false, None),
    ("HDPE", "High-Density Polyethylene", "Polymer", 78.1, 2.9, 1.9, 0.09, 65.0, 0.85, 3.0, false, None),
    ("LDPE", "Low-Density Polyethylene", "Polymer", 80.3, 3.0, 2.0, 0.1, 70.0, 0.80, 3.0, false, None),
    ("PP-R", "Reinforced Polypropylene", "Polymer", 95.0, 4.0, 2.5, 0.12, 80.0, 0.70, 4.0, false, None),
    ("ABS", "Acrylonitrile Butadiene Styrene", "Polymer", 95.7, 4.2, 3.8, 0.2, 95.0, 0.75, 6.0, false, None),
    ("PC", "Polycarbonate", "Polymer", 115.0, 5.0, 6.7, 0.3, 150.0, 0.65, 7.0, false, None),
    ("SUS304", "Stainless Steel 304", "Metal", 56.7, 2.5, 6.2, 0.3, 260.0, 0.95, 2.0, false, None),
    ("AL6061", "Aluminum 6061", "Metal", 218.0, 10.0, 8.2, 0.4, 350.0, 0.95, 3.0, false, None),
    ("GLASS", "Soda-lime Glass", "Mineral", 15.0, 1.0, 1.4, 0.1, 15.0, 1.00, 1.0, false, None),
    ("CERAMIC", "Ceramic", "Mineral", 20.0, 1.5, 1.8, 0.1, 20.0, 0.80, 1.0, false, None),
    ("BAMBOO", "Bamboo Composite", "Biocomposite", 2.5, 0.5, 0.3, 0.02, 5.0, 0.95, 0.0, true, None),
    ("R_PET", "Recycled PET", "Recycled", 45.0, 2.0, 1.5, 0.08, 40.0, 0.95, 2.0, false, Some(1.0)),
    ("R_PP", "Recycled PP", "Recycled", 50.0, 2.5, 1.2, 0.06, 35.0, 0.90, 2.0, false, Some(1.0)),
    ("BIOPLASTIC", "Polylactic Acid (PLA)", "Biopolymer", 54.0, 2.0, 1.8, 0.1, 30.0, 0.60, 1.0, true, None),
];

/// Freshwater ecotoxicity per toxicity-score point, CTUe/kg.
const ECOTOX_PER_SCORE: f64 = 10.0;
/// Human toxicity per toxicity-score point, CTUh/kg.
const HUMAN_TOX_PER_SCORE: f64 = 1.0e-7;

/// (id, name, electricity kWh/kg, carbon kg/kg, water L/kg, categories)
#[rustfmt::skip]
const PROCESSES: &[(&str, &str, f64, f64, f64, &[&str])] = &[
    ("injection-molding", "Injection Molding", 1.2, 0.15, 10.0, &["Polymer", "Recycled", "Biopolymer"]),
    ("blow-molding", "Blow Molding", 0.9, 0.12, 8.0, &["Polymer", "Recycled", "Biopolymer"]),
    ("thermoforming", "Thermoforming", 0.8, 0.10, 6.0, &["Polymer", "Recycled", "Biopolymer"]),
    ("extrusion", "Extrusion", 0.7, 0.09, 5.0, &["Polymer", "Recycled", "Biopolymer", "Metal"]),
    ("casting", "Casting", 1.5, 0.20, 15.0, &["Metal", "Mineral"]),
    ("cnc-machining", "CNC Machining", 3.0, 0.40, 12.0, &["Metal", "Polymer"]),
    ("stamping", "Stamping", 0.5, 0.07, 3.0, &["Metal"]),
    ("welding", "Welding", 1.8, 0.25, 8.0, &["Metal"]),
    ("assembly", "Assembly", 0.2, 0.03, 1.0, &[]),
    ("surface-treatment", "Surface Treatment", 0.4, 0.05, 5.0, &[]),
    ("packaging", "Packaging", 0.3, 0.04, 2.0, &[]),
];

/// (id, name, grid g CO₂e/kWh)
const REGIONS: &[(&str, &str, f64)] = &[
    ("europe", "Europe", 275.0),
    ("north-america", "North America", 380.0),
    ("asia", "Asia", 620.0),
    ("china", "China", 680.0),
    ("india", "India", 720.0),
    ("oceania", "Oceania", 420.0),
    ("south-america", "South America", 180.0),
    ("global-average", "Global Average", 475.0),
];

/// (id, name, g CO₂e/tonne·km, MJ/tonne·km)
const TRANSPORT: &[(&str, &str, f64, f64)] = &[
    ("truck-diesel", "Truck (Diesel)", 62.0, 2.8),
    ("truck-electric", "Truck (Electric)", 15.0, 0.7),
    ("rail", "Rail", 22.0, 1.0),
    ("ship", "Ship", 10.0, 0.5),
    ("air-freight", "Air Freight", 500.0, 22.0),
    ("ev-truck", "EV Truck", 8.0, 0.4),
];

fn demo_material(row: &MaterialRow) -> Material {
    let &(
        id,
        name,
        category,
        energy,
        energy_sd,
        carbon,
        carbon_sd,
        water,
        recyclability,
        tox,
        biogenic,
        recycled,
    ) = row;
    let mut m = Material::new(id, name, carbon, energy, water, recyclability)
        .with_category(category)
        .with_toxicity(tox * ECOTOX_PER_SCORE, tox * HUMAN_TOX_PER_SCORE)
        .with_biogenic(biogenic)
        .with_cv(MaterialCv {
            carbon: Some(carbon_sd / carbon),
            energy: Some(energy_sd / energy),
            water: Some(0.1),
            toxicity: Some(0.3),
        });
    m.recycled_content = recycled;
    m
}

fn demo_materials() -> Vec<Material> {
    MATERIALS.iter().map(demo_material).collect()
}

fn demo_processes() -> Vec<Process> {
    PROCESSES
        .iter()
        .map(|&(id, name, kwh, carbon, water, categories)| {
            Process::new(id, name, kwh * MJ_PER_KWH, carbon)
                .with_water(water)
                .with_categories(categories.iter().copied())
                .with_cv(ProcessCv {
                    energy: Some(0.1),
                    carbon: Some(0.1),
                })
        })
        .collect()
}

fn demo_regions() -> Vec<Region> {
    REGIONS
        .iter()
        .map(|&(id, name, grams)| Region::new(id, name, grams / 1000.0).with_cv(0.05))
        .collect()
}

fn demo_transport() -> Vec<TransportMode> {
    TRANSPORT
        .iter()
        .map(|&(id, name, grams, mj)| {
            TransportMode::new(id, name, grams * 1.0e-6)
                .with_energy(mj * 1.0e-3)
                .with_cv(0.1)
        })
        .collect()
}

impl ReferenceDataStore {
    /// The built-in demonstration dataset.
    pub fn demo() -> ReferenceResult<Self> {
        ReferenceDataStore::builder()
            .materials(demo_materials())
            .processes(demo_processes())
            .regions(demo_regions())
            .transport_modes(demo_transport())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lca_types::{EntityKind, MaterialId, RegionId, TransportModeId};

    #[test]
    fn demo_store_builds() {
        let store = ReferenceDataStore::demo().unwrap();
        assert_eq!(store.count(EntityKind::Material), 15);
        assert_eq!(store.count(EntityKind::Process), 11);
        assert_eq!(store.count(EntityKind::Region), 8);
        assert_eq!(store.count(EntityKind::TransportMode), 6);
    }

    #[test]
    fn demo_units_are_converted() {
        let store = ReferenceDataStore::demo().unwrap();
        let europe = store.region(&RegionId::new("europe")).unwrap();
        assert!((europe.grid_carbon_intensity - 0.275).abs() < 1e-12);

        let truck = store
            .transport_mode(&TransportModeId::new("truck-diesel"))
            .unwrap();
        assert!((truck.carbon_factor - 6.2e-5).abs() < 1e-15);

        let molding = &store.processes()[0];
        assert!((molding.energy_intensity - 4.32).abs() < 1e-12);
    }

    #[test]
    fn demo_biogenic_and_recycled_flags() {
        let store = ReferenceDataStore::demo().unwrap();
        let bamboo = store.material(&MaterialId::new("BAMBOO")).unwrap();
        assert!(bamboo.biogenic);
        let rpet = store.material(&MaterialId::new("R_PET")).unwrap();
        assert_eq!(rpet.recycled_content, Some(1.0));
        let pp = store.material(&MaterialId::new("PP")).unwrap();
        assert!((pp.cv.carbon.unwrap() - 0.1 / 2.1).abs() < 1e-12);
    }
}
