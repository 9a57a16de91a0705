//! LCA CLI - command-line interface for life-cycle impact assessment
//!
//! This CLI gives analysts a terminal interface to:
//! - Assess a product's impacts, circularity and hotspots
//! - Propagate factor uncertainty with Monte Carlo simulation
//! - Rank the factors an impact category is most sensitive to
//! - Test whether products differ significantly
//! - Weigh alternative scenarios by their probability
//! - Browse the reference data

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use lca_engine::EngineConfig;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod input;
mod output;

use commands::{assess, compare, materials, scenarios, sensitivity, simulate, Context};
use output::OutputFormat;

/// LCA CLI application
#[derive(Parser)]
#[command(name = "lca")]
#[command(about = "LCA - life-cycle impact and uncertainty engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, env = "LCA_CONFIG")]
    config: Option<PathBuf>,

    /// Reference tables (TOML or JSON); the built-in demo dataset when omitted
    #[arg(short, long, env = "LCA_REFERENCE")]
    reference: Option<PathBuf>,

    /// Output format (json, table)
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Log level
    #[arg(long, env = "LCA_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "LCA_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Point-estimate impacts, circularity, hotspots and normalization
    Assess(assess::AssessArgs),

    /// Monte Carlo uncertainty for one product
    #[command(alias = "mc")]
    Simulate(simulate::SimulateArgs),

    /// Rank input factors by their influence on one category
    Sensitivity(sensitivity::SensitivityArgs),

    /// Significance test across two or more products
    Compare(compare::CompareArgs),

    /// Probability-weighted analysis of alternative scenarios
    Scenarios(scenarios::ScenariosArgs),

    /// List reference data
    Materials(materials::MaterialsArgs),

    /// Show the effective engine configuration
    Config,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lca").join("config.toml"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("loading engine config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    debug!(
        samples = config.monte_carlo.samples,
        seed = config.monte_carlo.seed,
        "engine config"
    );

    let ctx = Context {
        store: input::load_store(cli.reference.as_deref())?,
        config,
        format: cli.output,
    };

    match cli.command {
        Commands::Assess(args) => assess::execute(args, &ctx),
        Commands::Simulate(args) => simulate::execute(args, &ctx),
        Commands::Sensitivity(args) => sensitivity::execute(args, &ctx),
        Commands::Compare(args) => compare::execute(args, &ctx),
        Commands::Scenarios(args) => scenarios::execute(args, &ctx),
        Commands::Materials(args) => materials::execute(args, &ctx),
        Commands::Config => output::print_config(&ctx.config, ctx.format),
    }
}
