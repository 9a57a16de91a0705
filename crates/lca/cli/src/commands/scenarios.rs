//! Probability-weighted scenario analysis

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use lca_engine::analyze_scenarios;
use lca_types::{ImpactCategory, ScenarioAnalysis};
use tabled::Tabled;

use super::Context;
use crate::input;
use crate::output::{self, fmt_percent, fmt_value, print_info, OutputFormat};

#[derive(Args)]
pub struct ScenariosArgs {
    /// Scenario file (TOML or JSON) with a top-level `scenarios` array
    pub scenarios: PathBuf,

    /// Impact category to weigh
    #[arg(short, long, default_value = "global-warming-potential")]
    pub category: ImpactCategory,
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Scenario")]
    name: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn execute(args: ScenariosArgs, ctx: &Context) -> Result<()> {
    let scenarios = input::load_scenarios(&args.scenarios)?;
    let analysis = analyze_scenarios(&ctx.store, &scenarios, args.category)
        .with_context(|| format!("analyzing {}", args.scenarios.display()))?;

    match ctx.format {
        OutputFormat::Json => output::print_json(&analysis),
        OutputFormat::Table => {
            print_table(&analysis);
            Ok(())
        }
    }
}

fn print_table(analysis: &ScenarioAnalysis) {
    let category = analysis.category;
    output::print_table(
        analysis
            .outcomes
            .iter()
            .map(|o| OutcomeRow {
                name: o.name.clone(),
                weight: fmt_percent(o.weight),
                value: fmt_value(o.value),
                description: o.description.clone(),
            })
            .collect(),
    );
    print_info(&format!(
        "expected {} {} ± {}",
        fmt_value(analysis.expected_value),
        category.unit(),
        fmt_value(analysis.std_dev)
    ));
    let r = &analysis.robustness;
    println!(
        "  best {}, worst {}, range {}, cv {}",
        fmt_value(r.best_case),
        fmt_value(r.worst_case),
        fmt_value(r.range),
        fmt_percent(r.cv)
    );
    if let Some(best) = analysis.preferred() {
        print_info(&format!("lowest {}: {}", category, best.name));
    }
}
