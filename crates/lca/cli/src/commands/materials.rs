//! Reference data listing

use anyhow::Result;
use clap::{Args, ValueEnum};
use tabled::Tabled;

use super::Context;
use crate::output::{self, fmt_value, OutputFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Listing {
    Materials,
    Processes,
    Regions,
    Transport,
}

#[derive(Args)]
pub struct MaterialsArgs {
    /// Which reference table to list
    #[arg(short, long, value_enum, default_value = "materials")]
    pub table: Listing,
}

#[derive(Tabled)]
struct MaterialRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "kg CO2e/kg")]
    carbon: String,
    #[tabled(rename = "MJ/kg")]
    energy: String,
    #[tabled(rename = "L/kg")]
    water: String,
    #[tabled(rename = "Recyclability")]
    recyclability: String,
}

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MJ/kg")]
    energy: String,
    #[tabled(rename = "kg CO2e/kg")]
    carbon: String,
    #[tabled(rename = "Applies to")]
    categories: String,
}

#[derive(Tabled)]
struct FactorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Factor")]
    factor: String,
}

pub fn execute(args: MaterialsArgs, ctx: &Context) -> Result<()> {
    let store = &ctx.store;
    if ctx.format == OutputFormat::Json {
        return match args.table {
            Listing::Materials => output::print_json(store.materials()),
            Listing::Processes => output::print_json(store.processes()),
            Listing::Regions => output::print_json(store.regions()),
            Listing::Transport => output::print_json(store.transport_modes()),
        };
    }

    match args.table {
        Listing::Materials => output::print_table(
            store
                .materials()
                .iter()
                .map(|m| MaterialRow {
                    id: m.id.to_string(),
                    name: m.name.clone(),
                    carbon: fmt_value(m.carbon_factor),
                    energy: fmt_value(m.energy_factor),
                    water: fmt_value(m.water_factor),
                    recyclability: fmt_value(m.recyclability),
                })
                .collect(),
        ),
        Listing::Processes => output::print_table(
            store
                .processes()
                .iter()
                .map(|p| ProcessRow {
                    id: p.id.to_string(),
                    name: p.name.clone(),
                    energy: fmt_value(p.energy_intensity),
                    carbon: fmt_value(p.process_carbon_factor),
                    categories: if p.applicable_categories.is_empty() {
                        "all".into()
                    } else {
                        p.applicable_categories.join(", ")
                    },
                })
                .collect(),
        ),
        Listing::Regions => output::print_table(
            store
                .regions()
                .iter()
                .map(|r| FactorRow {
                    id: r.id.to_string(),
                    name: r.name.clone(),
                    factor: format!("{} kg CO2e/kWh", fmt_value(r.grid_carbon_intensity)),
                })
                .collect(),
        ),
        Listing::Transport => output::print_table(
            store
                .transport_modes()
                .iter()
                .map(|t| FactorRow {
                    id: t.id.to_string(),
                    name: t.name.clone(),
                    factor: format!("{} kg CO2e/kg·km", fmt_value(t.carbon_factor)),
                })
                .collect(),
        ),
    }
    Ok(())
}
