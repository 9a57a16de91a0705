//! Significance testing across products

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use lca_engine::{compare_runs, simulate, MonteCarloRun};
use lca_types::{ComparisonResult, ConfidenceBounds, ImpactCategory};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::input;
use crate::output::{self, fmt_value, print_info, print_warning, OutputFormat};

#[derive(Args)]
pub struct CompareArgs {
    /// Product composition files (two for Welch's t-test, three or more for ANOVA)
    #[arg(required = true, num_args = 2..)]
    pub products: Vec<PathBuf>,

    /// Impact category to compare
    #[arg(short, long)]
    pub category: Option<ImpactCategory>,

    /// Significance level
    #[arg(short, long)]
    pub alpha: Option<f64>,

    /// Samples per product
    #[arg(short = 'n', long)]
    pub samples: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub product: String,
    pub mean: f64,
    pub bounds: Option<ConfidenceBounds>,
}

#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub category: ImpactCategory,
    pub products: Vec<ProductSummary>,
    pub result: ComparisonResult,
    pub verdict: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "95% interval")]
    interval: String,
}

pub fn execute(args: CompareArgs, ctx: &Context) -> Result<()> {
    let category = args.category.unwrap_or(ctx.config.comparison.category);
    let alpha = args.alpha.unwrap_or(ctx.config.comparison.alpha);
    let mut config = ctx.config.monte_carlo.clone();
    if let Some(samples) = args.samples {
        config = config.with_samples(samples);
    }

    // Each product draws from its own stream so the samples are independent.
    let mut runs: Vec<MonteCarloRun> = Vec::with_capacity(args.products.len());
    for (i, path) in args.products.iter().enumerate() {
        let product = input::load_product(path)?;
        let run = simulate(&ctx.store, &product, &config.for_group(i))
            .with_context(|| format!("simulating '{}'", product.name))?;
        runs.push(run);
    }

    let refs: Vec<&MonteCarloRun> = runs.iter().collect();
    let result = compare_runs(&refs, category, alpha)?;

    let report = ComparisonReport {
        category,
        products: runs
            .iter()
            .map(|run| ProductSummary {
                product: run.product().to_string(),
                mean: run.summary(category).map(|s| s.mean).unwrap_or_default(),
                bounds: run.confidence_interval(category),
            })
            .collect(),
        verdict: result.verdict(),
        result,
    };

    match ctx.format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            print_info(&format!("{} over {} samples per product", category, config.samples));
            output::print_table(
                report
                    .products
                    .iter()
                    .map(|p| ProductRow {
                        product: p.product.clone(),
                        mean: fmt_value(p.mean),
                        interval: p
                            .bounds
                            .map(|b| format!("[{}, {}]", fmt_value(b.low), fmt_value(b.high)))
                            .unwrap_or_else(|| "-".into()),
                    })
                    .collect(),
            );
            let r = &report.result;
            println!(
                "\n{:?}: statistic {}, p = {}, effect size {}",
                r.test,
                fmt_value(r.statistic),
                fmt_value(r.p_value),
                fmt_value(r.effect_size.value())
            );
            if r.significant {
                print_info(&report.verdict);
            } else {
                print_warning(&report.verdict);
            }
            Ok(())
        }
    }
}
