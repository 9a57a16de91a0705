//! Impact Aggregator: point estimates per functional unit.
//!
//! A composition is first validated and resolved against the reference store
//! into a [`ResolvedComposition`] holding owned copies of every factor row it
//! uses. The aggregation kernel only ever sees resolved compositions, so the
//! uncertainty and sensitivity engines can aggregate perturbed copies without
//! touching the store.
//!
//! Summation order is fixed: material lines in input order, then the process
//! (grid-energy share, then direct share), then transport legs in order, then
//! use-phase scenarios in order. Division by the functional unit happens
//! last. Identical inputs therefore give bit-identical outputs.

use std::collections::BTreeMap;

use lca_reference::{ReferenceDataStore, ReferenceError};
use lca_types::{
    Contribution, ContributionSource, FactorId, ImpactCategory, ImpactResult, ImpactValue,
    ImpactVector, Material, MaterialId, ProductComposition, Process, Region, TechnologyLevel,
    TransportMode, UseScenario,
};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

/// Megajoules per kilowatt-hour.
pub const MJ_PER_KWH: f64 = 3.6;

// ── Resolved composition ────────────────────────────────────────────────

/// A material line with its factor row copied out of the store.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLine {
    pub material: Material,
    pub mass_kg: f64,
    /// Line override, else the material's declaration, else 0.
    pub recycled_content: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLeg {
    pub mode: TransportMode,
    pub distance_km: f64,
    pub load_factor: f64,
}

/// A validated composition whose identifiers have all been resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedComposition {
    pub name: String,
    pub lines: Vec<ResolvedLine>,
    pub process: Option<Process>,
    pub process_efficiency: f64,
    pub technology: TechnologyLevel,
    pub region: Region,
    pub transport: Vec<ResolvedLeg>,
    pub use_phase: Vec<UseScenario>,
    pub lifetime_years: f64,
    pub functional_unit: f64,
}

impl ResolvedComposition {
    pub fn total_mass(&self) -> f64 {
        self.lines.iter().map(|l| l.mass_kg).sum()
    }

    /// Every perturbable factor, in declaration order: per distinct material
    /// (first appearance) its carbon, energy, water and toxicity factors;
    /// process energy and carbon; grid intensity; per distinct transport mode
    /// its carbon factor; then each line's mass.
    pub fn factors(&self) -> Vec<FactorId> {
        let mut out = Vec::new();

        let mut seen_materials = Vec::new();
        for line in &self.lines {
            let id = &line.material.id;
            if seen_materials.contains(&id) {
                continue;
            }
            seen_materials.push(id);
            out.push(FactorId::MaterialCarbon {
                material: id.clone(),
            });
            out.push(FactorId::MaterialEnergy {
                material: id.clone(),
            });
            out.push(FactorId::MaterialWater {
                material: id.clone(),
            });
            out.push(FactorId::MaterialToxicity {
                material: id.clone(),
            });
        }

        if let Some(p) = &self.process {
            out.push(FactorId::ProcessEnergy {
                process: p.id.clone(),
            });
            out.push(FactorId::ProcessCarbon {
                process: p.id.clone(),
            });
        }

        out.push(FactorId::GridIntensity {
            region: self.region.id.clone(),
        });

        let mut seen_modes = Vec::new();
        for leg in &self.transport {
            let id = &leg.mode.id;
            if seen_modes.contains(&id) {
                continue;
            }
            seen_modes.push(id);
            out.push(FactorId::TransportCarbon { mode: id.clone() });
        }

        for line in 0..self.lines.len() {
            out.push(FactorId::LineMass { line });
        }
        out
    }

    /// Whether `factor` refers to something present in this composition.
    pub fn has_factor(&self, factor: &FactorId) -> bool {
        match factor {
            FactorId::MaterialCarbon { material }
            | FactorId::MaterialEnergy { material }
            | FactorId::MaterialWater { material }
            | FactorId::MaterialToxicity { material } => {
                self.lines.iter().any(|l| &l.material.id == material)
            }
            FactorId::ProcessEnergy { process } | FactorId::ProcessCarbon { process } => {
                self.process.as_ref().is_some_and(|p| &p.id == process)
            }
            FactorId::GridIntensity { region } => &self.region.id == region,
            FactorId::TransportCarbon { mode } => self.transport.iter().any(|l| &l.mode.id == mode),
            FactorId::LineMass { line } => *line < self.lines.len(),
        }
    }

    /// Multiply one factor by `multiplier` everywhere it occurs.
    ///
    /// Returns `false` if the factor is not part of the composition.
    pub fn scale(&mut self, factor: &FactorId, multiplier: f64) -> bool {
        let mut found = false;
        match factor {
            FactorId::MaterialCarbon { material } => {
                for line in self.lines.iter_mut().filter(|l| &l.material.id == material) {
                    line.material.carbon_factor *= multiplier;
                    found = true;
                }
            }
            FactorId::MaterialEnergy { material } => {
                for line in self.lines.iter_mut().filter(|l| &l.material.id == material) {
                    line.material.energy_factor *= multiplier;
                    found = true;
                }
            }
            FactorId::MaterialWater { material } => {
                for line in self.lines.iter_mut().filter(|l| &l.material.id == material) {
                    line.material.water_factor *= multiplier;
                    found = true;
                }
            }
            FactorId::MaterialToxicity { material } => {
                for line in self.lines.iter_mut().filter(|l| &l.material.id == material) {
                    line.material.ecotoxicity_factor *= multiplier;
                    line.material.human_toxicity_factor *= multiplier;
                    found = true;
                }
            }
            FactorId::ProcessEnergy { process } => {
                if let Some(p) = self.process.as_mut().filter(|p| &p.id == process) {
                    p.energy_intensity *= multiplier;
                    found = true;
                }
            }
            FactorId::ProcessCarbon { process } => {
                if let Some(p) = self.process.as_mut().filter(|p| &p.id == process) {
                    p.process_carbon_factor *= multiplier;
                    found = true;
                }
            }
            FactorId::GridIntensity { region } => {
                if &self.region.id == region {
                    self.region.grid_carbon_intensity *= multiplier;
                    found = true;
                }
            }
            FactorId::TransportCarbon { mode } => {
                for leg in self.transport.iter_mut().filter(|l| &l.mode.id == mode) {
                    leg.mode.carbon_factor *= multiplier;
                    found = true;
                }
            }
            FactorId::LineMass { line } => {
                if let Some(l) = self.lines.get_mut(*line) {
                    l.mass_kg *= multiplier;
                    found = true;
                }
            }
        }
        found
    }

    fn material_row(&self, id: &MaterialId) -> Option<&Material> {
        self.lines.iter().map(|l| &l.material).find(|m| &m.id == id)
    }

    /// Coefficient of variation declared for a factor in the reference data.
    pub fn declared_cv(&self, factor: &FactorId) -> Option<f64> {
        match factor {
            FactorId::MaterialCarbon { material: id } => {
                self.material_row(id).and_then(|m| m.cv.carbon)
            }
            FactorId::MaterialEnergy { material: id } => {
                self.material_row(id).and_then(|m| m.cv.energy)
            }
            FactorId::MaterialWater { material: id } => {
                self.material_row(id).and_then(|m| m.cv.water)
            }
            FactorId::MaterialToxicity { material: id } => {
                self.material_row(id).and_then(|m| m.cv.toxicity)
            }
            FactorId::ProcessEnergy { .. } => self.process.as_ref().and_then(|p| p.cv.energy),
            FactorId::ProcessCarbon { .. } => self.process.as_ref().and_then(|p| p.cv.carbon),
            FactorId::GridIntensity { .. } => self.region.grid_intensity_cv,
            FactorId::TransportCarbon { mode } => self
                .transport
                .iter()
                .find(|l| &l.mode.id == mode)
                .and_then(|l| l.mode.carbon_cv),
            FactorId::LineMass { .. } => None,
        }
    }
}

// ── Validation and resolution ───────────────────────────────────────────

fn unresolved(field: impl Into<String>) -> impl FnOnce(ReferenceError) -> EngineError {
    let field = field.into();
    move |source| EngineError::UnresolvedReference { field, source }
}

fn fraction_field(field: String, value: f64) -> EngineResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EngineError::composition(field, format!("{} outside [0, 1]", value)));
    }
    Ok(())
}

/// Load factors and efficiencies: a share that must be strictly positive.
fn positive_fraction_field(field: String, value: f64) -> EngineResult<()> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(EngineError::composition(field, format!("{} outside (0, 1]", value)));
    }
    Ok(())
}

fn non_negative_field(field: String, value: f64) -> EngineResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::composition(field, format!("{} must be finite and >= 0", value)));
    }
    Ok(())
}

/// Check the structural invariants of a composition without touching the store.
pub fn validate(composition: &ProductComposition) -> EngineResult<()> {
    if composition.lines.is_empty() {
        return Err(EngineError::composition(
            "lines",
            "at least one material line is required",
        ));
    }

    for (i, line) in composition.lines.iter().enumerate() {
        if !line.mass_kg.is_finite() || line.mass_kg < 0.0 {
            return Err(EngineError::composition(
                format!("lines[{}].mass_kg", i),
                format!("{} is not a finite non-negative mass", line.mass_kg),
            ));
        }
        if let Some(rc) = line.recycled_content {
            fraction_field(format!("lines[{}].recycled_content", i), rc)?;
        }
    }

    let total = composition.total_mass();
    if total <= 0.0 {
        return Err(EngineError::composition(
            "lines",
            "total mass must be greater than zero",
        ));
    }

    if let Some(efficiency) = composition.process_efficiency {
        positive_fraction_field("process_efficiency".into(), efficiency)?;
    }

    for (i, leg) in composition.transport.iter().enumerate() {
        if !leg.distance_km.is_finite() || leg.distance_km < 0.0 {
            return Err(EngineError::composition(
                format!("transport[{}].distance_km", i),
                format!("{} is not a finite non-negative distance", leg.distance_km),
            ));
        }
        if let Some(load) = leg.load_factor {
            positive_fraction_field(format!("transport[{}].load_factor", i), load)?;
        }
    }

    non_negative_field("lifetime_years".into(), composition.lifetime_years)?;
    for (i, scenario) in composition.use_phase.iter().enumerate() {
        let field = |name: &str| format!("use_phase[{}].{}", i, name);
        non_negative_field(field("uses_per_year"), scenario.uses_per_year)?;
        non_negative_field(field("energy_kwh_per_use"), scenario.energy_kwh_per_use)?;
        non_negative_field(field("water_l_per_use"), scenario.water_l_per_use)?;
    }

    if !composition.functional_unit.is_finite() || composition.functional_unit <= 0.0 {
        return Err(EngineError::composition(
            "functional_unit",
            format!("{} must be finite and > 0", composition.functional_unit),
        ));
    }

    Ok(())
}

/// Validate a composition and copy every factor row it references.
pub fn resolve(
    store: &ReferenceDataStore,
    composition: &ProductComposition,
) -> EngineResult<ResolvedComposition> {
    validate(composition)?;

    let mut lines = Vec::with_capacity(composition.lines.len());
    for (i, line) in composition.lines.iter().enumerate() {
        let material = store
            .material(&line.material)
            .map_err(unresolved(format!("lines[{}].material", i)))?;
        let recycled_content = line
            .recycled_content
            .or(material.recycled_content)
            .unwrap_or(0.0);
        lines.push(ResolvedLine {
            material: material.clone(),
            mass_kg: line.mass_kg,
            recycled_content,
        });
    }

    let process = match &composition.process {
        Some(id) => Some(
            store
                .process(id)
                .map_err(unresolved("process"))?
                .clone(),
        ),
        None => None,
    };

    let region = store
        .region(&composition.region)
        .map_err(unresolved("region"))?
        .clone();

    let mut transport = Vec::with_capacity(composition.transport.len());
    for (i, leg) in composition.transport.iter().enumerate() {
        let mode = store
            .transport_mode(&leg.mode)
            .map_err(unresolved(format!("transport[{}].mode", i)))?;
        transport.push(ResolvedLeg {
            mode: mode.clone(),
            distance_km: leg.distance_km,
            load_factor: leg.load(),
        });
    }

    if let Some(p) = &process {
        for line in &lines {
            if !p.applies_to(line.material.category.as_deref()) {
                warn!(
                    process = %p.id,
                    material = %line.material.id,
                    "process is not declared applicable to material category"
                );
            }
        }
    }

    debug!(
        product = %composition.name,
        lines = lines.len(),
        legs = transport.len(),
        use_scenarios = composition.use_phase.len(),
        has_process = process.is_some(),
        "composition resolved"
    );

    Ok(ResolvedComposition {
        name: composition.name.clone(),
        lines,
        process,
        process_efficiency: composition.process_efficiency.unwrap_or(1.0),
        technology: composition.technology.unwrap_or_default(),
        region,
        transport,
        use_phase: composition.use_phase.clone(),
        lifetime_years: composition.lifetime_years,
        functional_unit: composition.functional_unit,
    })
}

// ── Kernel ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
enum Source<'a> {
    Line(usize),
    ProcessEnergy(&'a Process),
    ProcessDirect(&'a Process),
    Leg(usize),
    Use(usize),
}

/// Emit each source's unnormalized impacts in summation order.
fn each_contribution<'a>(
    r: &'a ResolvedComposition,
    mut emit: impl FnMut(Source<'a>, ImpactVector),
) {
    let total_mass = r.total_mass();
    let grid = r.region.grid_carbon_intensity;

    for (i, line) in r.lines.iter().enumerate() {
        let m = &line.material;
        let hazard = m.hazard();
        emit(
            Source::Line(i),
            ImpactVector {
                global_warming_potential: line.mass_kg * m.carbon_factor,
                energy_demand: line.mass_kg * m.energy_factor,
                water_scarcity: line.mass_kg * m.water_factor,
                ecotoxicity: line.mass_kg * m.ecotoxicity_factor * hazard,
                human_toxicity: line.mass_kg * m.human_toxicity_factor * hazard,
            },
        );
    }

    if let Some(p) = &r.process {
        let equipment = r.technology.energy_factor() / r.process_efficiency;
        let energy_mj = total_mass * p.energy_intensity * equipment;
        emit(
            Source::ProcessEnergy(p),
            ImpactVector {
                global_warming_potential: energy_mj / MJ_PER_KWH * grid,
                energy_demand: energy_mj,
                ..ImpactVector::default()
            },
        );
        emit(
            Source::ProcessDirect(p),
            ImpactVector {
                global_warming_potential: total_mass * p.process_carbon_factor,
                energy_demand: 0.0,
                water_scarcity: total_mass * p.water_factor,
                ecotoxicity: total_mass * p.ecotoxicity_factor,
                human_toxicity: total_mass * p.human_toxicity_factor,
            },
        );
    }

    for (i, leg) in r.transport.iter().enumerate() {
        let kg_km = total_mass * leg.distance_km / leg.load_factor;
        emit(
            Source::Leg(i),
            ImpactVector {
                global_warming_potential: kg_km * leg.mode.carbon_factor,
                energy_demand: kg_km * leg.mode.energy_factor,
                ..ImpactVector::default()
            },
        );
    }

    for (i, scenario) in r.use_phase.iter().enumerate() {
        let uses = scenario.uses_per_year * r.lifetime_years;
        let kwh = uses * scenario.energy_kwh_per_use;
        emit(
            Source::Use(i),
            ImpactVector {
                global_warming_potential: kwh * grid,
                energy_demand: kwh * MJ_PER_KWH,
                water_scarcity: uses * scenario.water_l_per_use,
                ..ImpactVector::default()
            },
        );
    }
}

/// Category totals per functional unit, without the per-source breakdown.
pub fn totals(resolved: &ResolvedComposition) -> ImpactVector {
    let mut sum = ImpactVector::default();
    each_contribution(resolved, |_, v| sum.accumulate(&v));
    sum.divided_by(resolved.functional_unit)
}

/// Full impact result for a resolved composition.
pub fn aggregate(resolved: &ResolvedComposition) -> ImpactResult {
    let fu = resolved.functional_unit;
    let mut sum = ImpactVector::default();
    let mut contributions = Vec::new();

    each_contribution(resolved, |source, v| {
        sum.accumulate(&v);
        let source = match source {
            Source::Line(i) => ContributionSource::Material {
                line: i,
                material: resolved.lines[i].material.id.clone(),
            },
            Source::ProcessEnergy(p) => ContributionSource::ProcessEnergy {
                process: p.id.clone(),
            },
            Source::ProcessDirect(p) => ContributionSource::ProcessDirect {
                process: p.id.clone(),
            },
            Source::Leg(i) => ContributionSource::Transport {
                leg: i,
                mode: resolved.transport[i].mode.id.clone(),
            },
            Source::Use(i) => ContributionSource::UsePhase {
                scenario: i,
                name: resolved.use_phase[i].name.clone(),
            },
        };
        contributions.push(Contribution {
            source,
            impacts: v.divided_by(fu),
        });
    });

    let total = sum.divided_by(fu);
    let impacts: BTreeMap<ImpactCategory, ImpactValue> = total
        .iter()
        .map(|(c, v)| (c, ImpactValue::point(v)))
        .collect();

    ImpactResult {
        product: resolved.name.clone(),
        functional_unit: fu,
        impacts,
        contributions,
    }
}

/// Point-estimate impacts of a composition per functional unit.
pub fn compute_impacts(
    store: &ReferenceDataStore,
    composition: &ProductComposition,
) -> EngineResult<ImpactResult> {
    let resolved = resolve(store, composition)?;
    Ok(aggregate(&resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lca_types::{MaterialId, ProcessCv, TransportModeId};

    const GWP: ImpactCategory = ImpactCategory::GlobalWarmingPotential;

    fn store() -> ReferenceDataStore {
        ReferenceDataStore::builder()
            .material(
                Material::new("M", "Test material", 2.0, 10.0, 5.0, 0.5)
                    .with_category("Polymer")
                    .with_toxicity(4.0, 1e-6)
                    .with_hazard_multiplier(2.0),
            )
            .material(
                Material::new("N", "Other material", 1.0, 20.0, 1.0, 1.0).with_category("Metal"),
            )
            .process(
                Process::new("press", "Press", 3.6, 0.5)
                    .with_water(2.0)
                    .with_categories(["Polymer"])
                    .with_cv(ProcessCv::default()),
            )
            .region(Region::new("grid", "Grid", 0.5))
            .transport_mode(TransportMode::new("truck", "Truck", 1e-4).with_energy(2e-3))
            .build()
            .unwrap()
    }

    fn field_of(err: EngineError) -> String {
        match err {
            EngineError::InvalidComposition { field, .. } => field,
            EngineError::UnresolvedReference { field, .. } => field,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn single_material_example() {
        let store = ReferenceDataStore::builder()
            .material(Material::new("X", "X", 2.0, 10.0, 0.0, 0.0))
            .region(Region::new("r", "R", 0.4))
            .build()
            .unwrap();
        let composition = ProductComposition::new("one kilo", "r").with_line("X", 1.0);
        let result = compute_impacts(&store, &composition).unwrap();
        assert_eq!(result.value(GWP), 2.0);
        assert_eq!(result.value(ImpactCategory::EnergyDemand), 10.0);
        assert_eq!(result.contributions.len(), 1);
    }

    #[test]
    fn process_and_transport_terms() {
        let composition = ProductComposition::new("widget", "grid")
            .with_line("M", 2.0)
            .with_process("press")
            .with_transport("truck", 100.0);
        let r = compute_impacts(&store(), &composition).unwrap();

        // material 4.0 + grid 2·3.6/3.6·0.5 = 1.0 + direct 1.0 + transport 2·100·1e-4 = 0.02
        let gwp = r.value(GWP);
        assert!((gwp - 6.02).abs() < 1e-12, "gwp = {}", gwp);

        // material 20 + process 7.2 + transport 0.4
        let energy = r.value(ImpactCategory::EnergyDemand);
        assert!((energy - 27.6).abs() < 1e-12);

        // material 10 + process 4
        let water = r.value(ImpactCategory::WaterScarcity);
        assert!((water - 14.0).abs() < 1e-12);

        // 2 kg × 4 CTUe × hazard 2
        assert!((r.value(ImpactCategory::Ecotoxicity) - 16.0).abs() < 1e-12);
    }

    #[test]
    fn contributions_follow_summation_order() {
        let composition = ProductComposition::new("widget", "grid")
            .with_line("M", 1.0)
            .with_line("N", 1.0)
            .with_process("press")
            .with_transport("truck", 10.0)
            .with_transport("truck", 20.0)
            .with_use("rinse", 10.0, 0.1, 1.0);
        let r = compute_impacts(&store(), &composition).unwrap();
        let sources: Vec<String> = r
            .contributions
            .iter()
            .map(|c| c.source.to_string())
            .collect();
        assert_eq!(
            sources,
            vec![
                "material[0] M",
                "material[1] N",
                "process press (grid energy)",
                "process press (direct)",
                "transport[0] truck",
                "transport[1] truck",
                "use[0] rinse",
            ]
        );

        let mut sum = ImpactVector::default();
        for c in &r.contributions {
            sum.accumulate(&c.impacts);
        }
        assert!((sum.global_warming_potential - r.value(GWP)).abs() < 1e-12);
    }

    #[test]
    fn functional_unit_divides_everything() {
        let base = ProductComposition::new("batch", "grid").with_line("M", 10.0);
        let per_unit = base.clone().with_functional_unit(4.0);
        let a = compute_impacts(&store(), &base).unwrap();
        let b = compute_impacts(&store(), &per_unit).unwrap();
        assert_eq!(b.value(GWP), a.value(GWP) / 4.0);
        assert_eq!(b.contributions[0].impacts.energy_demand, 100.0 / 4.0);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let composition = ProductComposition::new("widget", "grid")
            .with_line("M", 0.3)
            .with_line("N", 0.7)
            .with_process("press")
            .with_transport("truck", 1234.5);
        let s = store();
        let a = compute_impacts(&s, &composition).unwrap();
        let b = compute_impacts(&s, &composition).unwrap();
        for c in ImpactCategory::ALL {
            assert_eq!(a.value(c).to_bits(), b.value(c).to_bits());
        }
    }

    #[test]
    fn half_loaded_leg_counts_double_distance() {
        let full = ProductComposition::new("w", "grid")
            .with_line("M", 2.0)
            .with_transport("truck", 200.0);
        let half = ProductComposition::new("w", "grid")
            .with_line("M", 2.0)
            .with_loaded_transport("truck", 100.0, 0.5);
        let a = compute_impacts(&store(), &full).unwrap();
        let b = compute_impacts(&store(), &half).unwrap();
        assert_eq!(a.contributions[1].impacts, b.contributions[1].impacts);
        assert_eq!(a.value(GWP), b.value(GWP));
    }

    #[test]
    fn efficiency_and_technology_scale_process_energy_only() {
        let nominal = ProductComposition::new("w", "grid")
            .with_line("M", 2.0)
            .with_process("press");
        let tuned = nominal
            .clone()
            .with_process_efficiency(0.5)
            .with_technology(TechnologyLevel::Advanced);
        let a = compute_impacts(&store(), &nominal).unwrap();
        let b = compute_impacts(&store(), &tuned).unwrap();

        // 2 kg × 3.6 MJ/kg / 0.5 × 0.8 = 11.52 MJ, at 0.5 kg/kWh = 1.6 kg
        let energy = &b.contributions[1].impacts;
        assert!((energy.energy_demand - 11.52).abs() < 1e-12);
        assert!((energy.global_warming_potential - 1.6).abs() < 1e-12);

        // direct emissions ignore the equipment
        assert_eq!(a.contributions[2], b.contributions[2]);
    }

    #[test]
    fn use_phase_accrues_over_lifetime() {
        let composition = ProductComposition::new("kettle", "grid")
            .with_line("N", 1.0)
            .with_use("boil", 52.0, 0.5, 2.0)
            .with_lifetime(2.0);
        let r = compute_impacts(&store(), &composition).unwrap();
        let last = r.contributions.last().unwrap();
        assert!(matches!(
            last.source,
            ContributionSource::UsePhase { scenario: 0, .. }
        ));

        // 104 uses × 0.5 kWh = 52 kWh
        assert!((last.impacts.global_warming_potential - 26.0).abs() < 1e-12);
        assert!((last.impacts.energy_demand - 187.2).abs() < 1e-9);
        assert!((last.impacts.water_scarcity - 208.0).abs() < 1e-12);
        assert_eq!(last.impacts.ecotoxicity, 0.0);

        let idle = composition.clone().with_lifetime(0.0);
        let r = compute_impacts(&store(), &idle).unwrap();
        assert_eq!(r.value(GWP), 1.0);
    }

    #[test]
    fn unknown_material_names_line() {
        let composition = ProductComposition::new("widget", "grid")
            .with_line("M", 1.0)
            .with_line("N", 1.0)
            .with_line("UNOBTAINIUM", 1.0);
        let err = compute_impacts(&store(), &composition).unwrap_err();
        assert!(err.is_invalid_composition());
        assert_eq!(field_of(err), "lines[2].material");
    }

    #[test]
    fn unknown_region_process_and_mode() {
        let s = store();
        let bad_region = ProductComposition::new("w", "atlantis").with_line("M", 1.0);
        let err = compute_impacts(&s, &bad_region).unwrap_err();
        assert_eq!(field_of(err), "region");

        let bad_process = ProductComposition::new("w", "grid")
            .with_line("M", 1.0)
            .with_process("levitation");
        let err = compute_impacts(&s, &bad_process).unwrap_err();
        assert_eq!(field_of(err), "process");

        let bad_mode = ProductComposition::new("w", "grid")
            .with_line("M", 1.0)
            .with_transport("teleport", 5.0);
        let err = compute_impacts(&s, &bad_mode).unwrap_err();
        assert_eq!(field_of(err), "transport[0].mode");
    }

    #[test]
    fn structural_violations() {
        let s = store();
        let empty = ProductComposition::new("nothing", "grid");
        let err = compute_impacts(&s, &empty).unwrap_err();
        assert!(err.is_invalid_composition());

        let weightless = ProductComposition::new("air", "grid").with_line("M", 0.0);
        let err = compute_impacts(&s, &weightless).unwrap_err();
        assert!(err.is_invalid_composition());

        let negative = ProductComposition::new("w", "grid")
            .with_line("M", 1.0)
            .with_line("N", -0.5);
        let err = compute_impacts(&s, &negative).unwrap_err();
        assert!(err.to_string().contains("lines[1].mass_kg"));

        let zero_fu = ProductComposition::new("w", "grid")
            .with_line("M", 1.0)
            .with_functional_unit(0.0);
        let err = compute_impacts(&s, &zero_fu).unwrap_err();
        assert!(err.to_string().contains("functional_unit"));

        let bad_distance = ProductComposition::new("w", "grid")
            .with_line("M", 1.0)
            .with_transport("truck", f64::NAN);
        let err = compute_impacts(&s, &bad_distance).unwrap_err();
        assert!(err.is_invalid_composition());
    }

    #[test]
    fn usage_and_equipment_violations_name_field() {
        let s = store();
        let base = ProductComposition::new("w", "grid").with_line("M", 1.0);

        let empty_truck = base.clone().with_loaded_transport("truck", 10.0, 0.0);
        let err = compute_impacts(&s, &empty_truck).unwrap_err();
        assert_eq!(field_of(err), "transport[0].load_factor");

        let overloaded = base.clone().with_loaded_transport("truck", 10.0, 1.5);
        let err = compute_impacts(&s, &overloaded).unwrap_err();
        assert_eq!(field_of(err), "transport[0].load_factor");

        let perpetual = base
            .clone()
            .with_process("press")
            .with_process_efficiency(1.2);
        let err = compute_impacts(&s, &perpetual).unwrap_err();
        assert_eq!(field_of(err), "process_efficiency");

        let negative_use = base.clone().with_use("wash", -1.0, 0.1, 0.0);
        let err = compute_impacts(&s, &negative_use).unwrap_err();
        assert_eq!(field_of(err), "use_phase[0].uses_per_year");

        let leaky = base.clone().with_use("wash", 1.0, 0.1, f64::INFINITY);
        let err = compute_impacts(&s, &leaky).unwrap_err();
        assert_eq!(field_of(err), "use_phase[0].water_l_per_use");

        let timeless = base.with_lifetime(f64::NAN);
        let err = compute_impacts(&s, &timeless).unwrap_err();
        assert_eq!(field_of(err), "lifetime_years");
    }

    #[test]
    fn recycled_content_override_takes_precedence() {
        let store = ReferenceDataStore::builder()
            .material(
                Material::new("R", "Recycled", 1.0, 1.0, 1.0, 1.0).with_recycled_content(1.0),
            )
            .region(Region::new("r", "R", 0.3))
            .build()
            .unwrap();
        let composition = ProductComposition::new("w", "r")
            .with_line("R", 1.0)
            .with_recycled_line("R", 1.0, 0.25);
        let resolved = resolve(&store, &composition).unwrap();
        assert_eq!(resolved.lines[0].recycled_content, 1.0);
        assert_eq!(resolved.lines[1].recycled_content, 0.25);
    }

    #[test]
    fn factor_enumeration_and_scaling() {
        let composition = ProductComposition::new("widget", "grid")
            .with_line("M", 1.0)
            .with_line("M", 1.0)
            .with_process("press")
            .with_transport("truck", 10.0);
        let mut resolved = resolve(&store(), &composition).unwrap();
        let factors = resolved.factors();
        let m_carbon = FactorId::MaterialCarbon {
            material: MaterialId::new("M"),
        };
        let n_carbon = FactorId::MaterialCarbon {
            material: MaterialId::new("N"),
        };
        let truck = FactorId::TransportCarbon {
            mode: TransportModeId::new("truck"),
        };

        // 4 material factors (M once) + 2 process + grid + truck + 2 line masses
        assert_eq!(factors.len(), 10);
        assert_eq!(factors[0], m_carbon);
        assert_eq!(factors[7], truck);

        assert!(resolved.scale(&m_carbon, 2.0));
        assert_eq!(resolved.lines[0].material.carbon_factor, 4.0);
        assert_eq!(resolved.lines[1].material.carbon_factor, 4.0);
        assert!(!resolved.scale(&n_carbon, 2.0));
        assert!(!resolved.has_factor(&FactorId::LineMass { line: 2 }));
    }
}
