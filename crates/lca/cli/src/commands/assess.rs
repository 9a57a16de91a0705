//! Point-estimate assessment

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use lca_engine::{compute_circularity, compute_impacts, identify_hotspots, normalize, Hotspot};
use lca_types::{CircularityScore, ImpactCategory, ImpactResult};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::input;
use crate::output::{self, fmt_percent, fmt_value, print_heading, print_info, OutputFormat};

#[derive(Args)]
pub struct AssessArgs {
    /// Product composition file (TOML or JSON)
    pub product: PathBuf,

    /// Category used for hotspot identification
    #[arg(long, default_value = "global-warming-potential")]
    pub category: ImpactCategory,

    /// Minimum hotspot share (defaults to the configured threshold)
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Everything `assess` reports for one product.
#[derive(Debug, Serialize)]
pub struct AssessReport {
    pub impacts: ImpactResult,
    pub circularity: CircularityScore,
    pub hotspots: Vec<Hotspot>,
    /// Person-years of the normalization reference.
    pub normalized: BTreeMap<ImpactCategory, f64>,
}

#[derive(Tabled)]
struct ImpactRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Person-years")]
    normalized: String,
}

#[derive(Tabled)]
struct HotspotRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "Severity")]
    severity: String,
}

pub fn execute(args: AssessArgs, ctx: &Context) -> Result<()> {
    let product = input::load_product(&args.product)?;
    let config = &ctx.config;

    let threshold = args.threshold.unwrap_or(config.hotspots.threshold);

    let impacts = compute_impacts(&ctx.store, &product)
        .with_context(|| format!("assessing '{}'", product.name))?;
    let circularity = compute_circularity(
        &ctx.store,
        &product,
        &config.end_of_life,
        &config.circularity,
    )
    .with_context(|| format!("scoring circularity of '{}'", product.name))?;
    let hotspots = identify_hotspots(&impacts, args.category, threshold)?;
    let normalized = normalize(&impacts, &config.normalization)?;

    let report = AssessReport {
        impacts,
        circularity,
        hotspots,
        normalized,
    };

    match ctx.format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            print_table(&report, args.category);
            Ok(())
        }
    }
}

fn print_table(report: &AssessReport, category: ImpactCategory) {
    let impacts = &report.impacts;
    print_info(&format!(
        "{} (per {} functional unit)",
        impacts.product, impacts.functional_unit
    ));

    print_heading("Impacts");
    output::print_table(
        ImpactCategory::ALL
            .into_iter()
            .map(|c| ImpactRow {
                category: c.to_string(),
                value: fmt_value(impacts.value(c)),
                unit: c.unit().to_string(),
                normalized: report
                    .normalized
                    .get(&c)
                    .map(|v| fmt_value(*v))
                    .unwrap_or_else(|| "-".into()),
            })
            .collect(),
    );

    let score = &report.circularity;
    print_heading("Circularity");
    println!(
        "  {:.1} / {:.1}  {}",
        score.composite, score.max_score, score.class
    );
    println!(
        "  recycled input {}, recyclability {}, biogenic {}",
        fmt_percent(score.recycled_content),
        fmt_percent(score.recyclability),
        fmt_percent(score.biogenic)
    );

    print_heading(&format!("Hotspots ({})", category));
    output::print_table(
        report
            .hotspots
            .iter()
            .map(|h| HotspotRow {
                source: h.source.to_string(),
                value: fmt_value(h.value),
                share: fmt_percent(h.share),
                severity: h.severity.to_string(),
            })
            .collect(),
    );
}
