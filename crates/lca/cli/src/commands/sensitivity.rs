//! Sensitivity ranking

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use lca_engine::{rank_all, rank_sampled, simulate, SensitivityConfig};
use lca_types::{ImpactCategory, SensitivityEntry};
use tabled::Tabled;

use super::Context;
use crate::input;
use crate::output::{self, fmt_percent, fmt_value, print_info, OutputFormat};

#[derive(Args)]
pub struct SensitivityArgs {
    /// Product composition file (TOML or JSON)
    pub product: PathBuf,

    /// Impact category to rank against
    #[arg(short, long)]
    pub category: Option<ImpactCategory>,

    /// Relative perturbation for one-at-a-time ranking
    #[arg(short, long)]
    pub delta: Option<f64>,

    /// Rank by sampled-variance attribution from a Monte Carlo run instead
    #[arg(long)]
    pub sampled: bool,

    /// Show only the first N factors
    #[arg(short, long)]
    pub top: Option<usize>,
}

#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Factor")]
    factor: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Share")]
    share: String,
}

pub fn execute(args: SensitivityArgs, ctx: &Context) -> Result<()> {
    let product = input::load_product(&args.product)?;

    let defaults = &ctx.config.sensitivity;
    let config = SensitivityConfig {
        delta: args.delta.unwrap_or(defaults.delta),
        category: args.category.unwrap_or(defaults.category),
    };

    let mut ranking: Vec<SensitivityEntry> = if args.sampled {
        let run = simulate(&ctx.store, &product, &ctx.config.monte_carlo)
            .with_context(|| format!("simulating '{}'", product.name))?;
        rank_sampled(&run, config.category)
    } else {
        rank_all(&ctx.store, &product, &config)
            .with_context(|| format!("ranking factors of '{}'", product.name))?
    };
    if let Some(top) = args.top {
        ranking.truncate(top);
    }

    match ctx.format {
        OutputFormat::Json => output::print_json(&ranking),
        OutputFormat::Table => {
            let method = if args.sampled {
                "sampled variance".to_string()
            } else {
                format!("one-at-a-time ±{}", fmt_percent(config.delta))
            };
            print_info(&format!("{}: {} ({})", product.name, config.category, method));
            output::print_table(
                ranking
                    .iter()
                    .enumerate()
                    .map(|(i, e)| RankRow {
                        rank: i + 1,
                        factor: e.factor.to_string(),
                        change: fmt_value(e.change),
                        share: fmt_percent(e.share),
                    })
                    .collect(),
            );
            Ok(())
        }
    }
}
