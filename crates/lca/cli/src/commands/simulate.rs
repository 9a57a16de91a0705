//! Monte Carlo simulation

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use lca_engine::{compute_impacts, simulate, DistributionFamily};
use lca_types::{ConfidenceBounds, ImpactCategory, ImpactResult};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::input;
use crate::output::{self, fmt_percent, fmt_value, print_info, OutputFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Distribution {
    Normal,
    Triangular,
}

impl From<Distribution> for DistributionFamily {
    fn from(d: Distribution) -> Self {
        match d {
            Distribution::Normal => DistributionFamily::Normal,
            Distribution::Triangular => DistributionFamily::Triangular,
        }
    }
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Product composition file (TOML or JSON)
    pub product: PathBuf,

    /// Number of samples
    #[arg(short = 'n', long)]
    pub samples: Option<usize>,

    /// Base seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Distribution family for factor multipliers
    #[arg(short, long, value_enum)]
    pub distribution: Option<Distribution>,

    /// Confidence level of the reported intervals
    #[arg(short, long, default_value = "0.95")]
    pub level: f64,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub samples: usize,
    pub seed: u64,
    pub distribution: DistributionFamily,
    pub level: f64,
    /// Point estimate decorated with the 95% bounds and sample summaries.
    pub result: ImpactResult,
    /// Percentile intervals at `level`.
    pub intervals: BTreeMap<ImpactCategory, ConfidenceBounds>,
}

#[derive(Tabled)]
struct SimulationRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Point")]
    point: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Std dev")]
    std_dev: String,
    #[tabled(rename = "CV")]
    cv: String,
    #[tabled(rename = "Low")]
    low: String,
    #[tabled(rename = "High")]
    high: String,
}

pub fn execute(args: SimulateArgs, ctx: &Context) -> Result<()> {
    let product = input::load_product(&args.product)?;

    let mut config = ctx.config.monte_carlo.clone();
    if let Some(samples) = args.samples {
        config = config.with_samples(samples);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(distribution) = args.distribution {
        config = config.with_distribution(distribution.into());
    }

    let point = compute_impacts(&ctx.store, &product)
        .with_context(|| format!("assessing '{}'", product.name))?;
    let run = simulate(&ctx.store, &product, &config)
        .with_context(|| format!("simulating '{}'", product.name))?;

    let mut intervals = BTreeMap::new();
    for category in ImpactCategory::ALL {
        intervals.insert(category, run.interval(category, args.level)?);
    }

    let report = SimulationReport {
        samples: run.sample_count(),
        seed: config.seed,
        distribution: config.distribution,
        level: args.level,
        result: run.to_impact_result(&point),
        intervals,
    };

    match ctx.format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            print_info(&format!(
                "{}: {} {} samples, seed {}, {:.0}% intervals",
                report.result.product,
                report.samples,
                report.distribution,
                report.seed,
                report.level * 100.0
            ));
            output::print_table(
                ImpactCategory::ALL
                    .into_iter()
                    .map(|c| {
                        let summary = report
                            .result
                            .impacts
                            .get(&c)
                            .and_then(|v| v.distribution.clone())
                            .unwrap_or_default();
                        let bounds = report.intervals[&c];
                        SimulationRow {
                            category: c.to_string(),
                            point: fmt_value(report.result.value(c)),
                            mean: fmt_value(summary.mean),
                            std_dev: fmt_value(summary.std_dev),
                            cv: fmt_percent(summary.cv),
                            low: fmt_value(bounds.low),
                            high: fmt_value(bounds.high),
                        }
                    })
                    .collect(),
            );
            Ok(())
        }
    }
}
