//! Load-time row validation. Every check fails fast with the offending row.

use lca_types::{EntityKind, Material, Process, Region, TransportMode};

use crate::error::{ReferenceError, ReferenceResult};

struct RowCheck<'a> {
    kind: EntityKind,
    row: &'a str,
}

impl RowCheck<'_> {
    fn fail(&self, field: &str, detail: String) -> ReferenceError {
        ReferenceError::integrity(self.kind, self.row, field, detail)
    }

    fn finite(&self, field: &str, value: f64) -> ReferenceResult<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(self.fail(field, format!("{} is not a finite number", value)))
        }
    }

    fn non_negative(&self, field: &str, value: f64) -> ReferenceResult<()> {
        self.finite(field, value)?;
        if value < 0.0 {
            return Err(self.fail(field, format!("{} must be >= 0", value)));
        }
        Ok(())
    }

    fn positive(&self, field: &str, value: f64) -> ReferenceResult<()> {
        self.finite(field, value)?;
        if value <= 0.0 {
            return Err(self.fail(field, format!("{} must be > 0", value)));
        }
        Ok(())
    }

    fn fraction(&self, field: &str, value: f64) -> ReferenceResult<()> {
        self.finite(field, value)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(self.fail(field, format!("{} outside [0, 1]", value)));
        }
        Ok(())
    }

    fn optional_non_negative(&self, field: &str, value: Option<f64>) -> ReferenceResult<()> {
        match value {
            Some(v) => self.non_negative(field, v),
            None => Ok(()),
        }
    }

    fn id(&self) -> ReferenceResult<()> {
        if self.row.trim().is_empty() {
            return Err(self.fail("id", "identifier must not be empty".into()));
        }
        Ok(())
    }
}

pub(crate) fn material(m: &Material) -> ReferenceResult<()> {
    let check = RowCheck {
        kind: EntityKind::Material,
        row: m.id.as_str(),
    };
    check.id()?;
    check.non_negative("carbon_factor", m.carbon_factor)?;
    check.non_negative("energy_factor", m.energy_factor)?;
    check.non_negative("water_factor", m.water_factor)?;
    check.non_negative("ecotoxicity_factor", m.ecotoxicity_factor)?;
    check.non_negative("human_toxicity_factor", m.human_toxicity_factor)?;
    check.optional_non_negative("hazard_multiplier", m.hazard_multiplier)?;
    check.fraction("recyclability", m.recyclability)?;
    if let Some(rc) = m.recycled_content {
        check.fraction("recycled_content", rc)?;
    }
    check.optional_non_negative("cv.carbon", m.cv.carbon)?;
    check.optional_non_negative("cv.energy", m.cv.energy)?;
    check.optional_non_negative("cv.water", m.cv.water)?;
    check.optional_non_negative("cv.toxicity", m.cv.toxicity)?;
    Ok(())
}

pub(crate) fn process(p: &Process) -> ReferenceResult<()> {
    let check = RowCheck {
        kind: EntityKind::Process,
        row: p.id.as_str(),
    };
    check.id()?;
    check.non_negative("energy_intensity", p.energy_intensity)?;
    check.non_negative("process_carbon_factor", p.process_carbon_factor)?;
    check.non_negative("water_factor", p.water_factor)?;
    check.non_negative("ecotoxicity_factor", p.ecotoxicity_factor)?;
    check.non_negative("human_toxicity_factor", p.human_toxicity_factor)?;
    check.optional_non_negative("cv.energy", p.cv.energy)?;
    check.optional_non_negative("cv.carbon", p.cv.carbon)?;
    Ok(())
}

pub(crate) fn region(r: &Region) -> ReferenceResult<()> {
    let check = RowCheck {
        kind: EntityKind::Region,
        row: r.id.as_str(),
    };
    check.id()?;
    check.positive("grid_carbon_intensity", r.grid_carbon_intensity)?;
    check.optional_non_negative("grid_intensity_cv", r.grid_intensity_cv)?;
    Ok(())
}

pub(crate) fn transport_mode(t: &TransportMode) -> ReferenceResult<()> {
    let check = RowCheck {
        kind: EntityKind::TransportMode,
        row: t.id.as_str(),
    };
    check.id()?;
    check.non_negative("carbon_factor", t.carbon_factor)?;
    check.non_negative("energy_factor", t.energy_factor)?;
    check.optional_non_negative("carbon_cv", t.carbon_cv)?;
    Ok(())
}
