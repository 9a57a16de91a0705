//! Uncertainty Engine: Monte Carlo propagation of factor uncertainty.
//!
//! Each uncertain factor gets one random multiplier per sample, drawn from the
//! configured distribution family. The perturbed composition is aggregated
//! with the same kernel as the point estimate and the per-category totals are
//! recorded in sample order.
//!
//! Sample `i` draws from its own generator, seeded by mixing the run seed
//! with `i` (see [`sample_seed`]). A run is reproducible for a fixed seed,
//! the order or thread in which samples are computed never changes the
//! result, and runs with neighbouring seeds share no streams. With the
//! `parallel` feature samples are spread over the rayon pool.
//!
//! Intervals use empirical percentiles with linear interpolation between
//! order statistics; no normality is assumed for the output.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lca_reference::ReferenceDataStore;
use lca_types::{
    ConfidenceBounds, DistributionSummary, FactorId, ImpactCategory, ImpactResult, ImpactValue,
    ImpactVector, ProductComposition,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregator::{resolve, totals, ResolvedComposition};
use crate::error::{EngineError, EngineResult};
use crate::stats::{excess_kurtosis, mean, sample_variance, skewness, special};

/// Smallest sample count accepted for a run.
pub const MIN_SAMPLE_COUNT: usize = 100;

/// Default ceiling on the sample count.
pub const DEFAULT_MAX_SAMPLES: usize = 1_000_000;

// ── Configuration ───────────────────────────────────────────────────────

/// Distribution family used for every uncertain factor's multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionFamily {
    /// Multiplier ~ N(1, cv), clipped at zero. `cv` is the factor's declared
    /// coefficient of variation, else the configured default.
    Normal,
    /// Multiplier ~ Triangular(1 − spread, 1, 1 + spread).
    Triangular,
}

impl std::fmt::Display for DistributionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistributionFamily::Normal => write!(f, "normal"),
            DistributionFamily::Triangular => write!(f, "triangular"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub samples: usize,
    pub seed: u64,
    pub distribution: DistributionFamily,
    /// CV for factors that declare none.
    pub default_cv: f64,
    /// Relative half-width of the triangular distribution, in (0, 1].
    pub triangular_spread: f64,
    pub max_samples: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            samples: 1_000,
            seed: 42,
            distribution: DistributionFamily::Normal,
            default_cv: 0.1,
            triangular_spread: 0.1,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_distribution(mut self, distribution: DistributionFamily) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.max_samples < MIN_SAMPLE_COUNT {
            return Err(EngineError::config(
                "monte_carlo.max_samples",
                format!(
                    "{} is below the minimum of {}",
                    self.max_samples, MIN_SAMPLE_COUNT
                ),
            ));
        }
        if self.samples < MIN_SAMPLE_COUNT {
            return Err(EngineError::config(
                "monte_carlo.samples",
                format!(
                    "{} is below the minimum of {}",
                    self.samples, MIN_SAMPLE_COUNT
                ),
            ));
        }
        if self.samples > self.max_samples {
            return Err(EngineError::config(
                "monte_carlo.samples",
                format!(
                    "{} exceeds the ceiling of {}",
                    self.samples, self.max_samples
                ),
            ));
        }
        if !self.default_cv.is_finite() || self.default_cv < 0.0 {
            return Err(EngineError::config(
                "monte_carlo.default_cv",
                format!("{} must be finite and >= 0", self.default_cv),
            ));
        }
        if !(self.triangular_spread > 0.0 && self.triangular_spread <= 1.0) {
            return Err(EngineError::config(
                "monte_carlo.triangular_spread",
                format!("{} outside (0, 1]", self.triangular_spread),
            ));
        }
        Ok(())
    }

    /// Configuration for the `group`-th of several runs that are compared
    /// against each other. Every group draws from its own stream, so the
    /// runs are independent rather than sharing multipliers sample by sample.
    pub fn for_group(&self, group: usize) -> Self {
        Self {
            seed: splitmix64(self.seed ^ splitmix64(group as u64 + 1)),
            ..self.clone()
        }
    }
}

// ── Cancellation ────────────────────────────────────────────────────────

/// Cooperative cancellation flag, checked between samples.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ── Sampling ────────────────────────────────────────────────────────────

/// SplitMix64 output function: spreads neighbouring integers over the whole
/// `u64` range.
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generator seed for sample `index` of a run seeded with `seed`.
///
/// The run seed is mixed before the index is folded in, so seed 1 is not
/// seed 0 shifted by one sample.
pub fn sample_seed(seed: u64, index: u64) -> u64 {
    splitmix64(splitmix64(seed) ^ index)
}

/// Standard normal draw (Box–Muller).
fn standard_normal(rng: &mut impl Rng) -> f64 {
    // 1 − U keeps the logarithm's argument in (0, 1].
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Triangular draw by inverse transform.
fn triangular(rng: &mut impl Rng, min: f64, mode: f64, max: f64) -> f64 {
    let u = rng.gen::<f64>();
    let range = max - min;
    let split = (mode - min) / range;
    if u < split {
        min + (u * range * (mode - min)).sqrt()
    } else {
        max - ((1.0 - u) * range * (max - mode)).sqrt()
    }
}

fn draw_multiplier(rng: &mut impl Rng, config: &MonteCarloConfig, cv: f64) -> f64 {
    let m = match config.distribution {
        DistributionFamily::Normal => 1.0 + cv * standard_normal(rng),
        DistributionFamily::Triangular => {
            let s = config.triangular_spread;
            triangular(rng, 1.0 - s, 1.0, 1.0 + s)
        }
    };
    m.max(0.0)
}

fn is_sampled(factor: &FactorId) -> bool {
    !matches!(
        factor,
        FactorId::MaterialToxicity { .. } | FactorId::LineMass { .. }
    )
}

/// Factors the uncertainty engine perturbs: material carbon, energy and water
/// factors, process energy and direct carbon, grid intensity, and transport
/// carbon factors, in declaration order.
pub fn uncertain_factors(resolved: &ResolvedComposition) -> Vec<FactorId> {
    resolved.factors().into_iter().filter(is_sampled).collect()
}

/// Each factor's CV: its declared value, else the configured default.
fn factor_cvs(
    resolved: &ResolvedComposition,
    factors: &[FactorId],
    config: &MonteCarloConfig,
) -> Vec<f64> {
    factors
        .iter()
        .map(|f| resolved.declared_cv(f).unwrap_or(config.default_cv))
        .collect()
}

struct Sample {
    totals: ImpactVector,
    draws: Vec<f64>,
}

fn draw_sample(
    base: &ResolvedComposition,
    factors: &[FactorId],
    cvs: &[f64],
    config: &MonteCarloConfig,
    index: usize,
) -> Sample {
    let mut rng = StdRng::seed_from_u64(sample_seed(config.seed, index as u64));
    let mut view = base.clone();
    let draws: Vec<f64> = factors
        .iter()
        .zip(cvs)
        .map(|(factor, &cv)| {
            let m = draw_multiplier(&mut rng, config, cv);
            view.scale(factor, m);
            m
        })
        .collect();
    Sample {
        totals: totals(&view),
        draws,
    }
}

#[cfg(not(feature = "parallel"))]
fn run_samples(
    base: &ResolvedComposition,
    factors: &[FactorId],
    cvs: &[f64],
    config: &MonteCarloConfig,
    cancel: &CancellationToken,
) -> EngineResult<Vec<Sample>> {
    let mut out = Vec::with_capacity(config.samples);
    for i in 0..config.samples {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled { completed: i });
        }
        out.push(draw_sample(base, factors, cvs, config, i));
    }
    Ok(out)
}

#[cfg(feature = "parallel")]
fn run_samples(
    base: &ResolvedComposition,
    factors: &[FactorId],
    cvs: &[f64],
    config: &MonteCarloConfig,
    cancel: &CancellationToken,
) -> EngineResult<Vec<Sample>> {
    use rayon::prelude::*;
    use std::sync::atomic::AtomicUsize;

    let completed = AtomicUsize::new(0);
    let out: Option<Vec<Sample>> = (0..config.samples)
        .into_par_iter()
        .map(|i| {
            if cancel.is_cancelled() {
                return None;
            }
            let sample = draw_sample(base, factors, cvs, config, i);
            completed.fetch_add(1, Ordering::Relaxed);
            Some(sample)
        })
        .collect();
    out.ok_or_else(|| EngineError::Cancelled {
        completed: completed.load(Ordering::Relaxed),
    })
}

// ── Percentiles ─────────────────────────────────────────────────────────

/// Empirical percentile of sorted values, linear interpolation between order
/// statistics at rank `(n − 1)·p`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

fn summarize(samples: &[f64], sorted: &[f64]) -> DistributionSummary {
    let avg = mean(samples);
    let std_dev = sample_variance(samples).sqrt();
    let min = sorted.first().copied().unwrap_or(f64::NAN);
    let max = sorted.last().copied().unwrap_or(f64::NAN);
    DistributionSummary {
        mean: avg,
        std_dev,
        cv: if avg > 0.0 { std_dev / avg } else { 0.0 },
        skewness: skewness(samples),
        kurtosis: excess_kurtosis(samples),
        min,
        max,
        range: max - min,
        p2_5: percentile(sorted, 0.025),
        p50: percentile(sorted, 0.5),
        p97_5: percentile(sorted, 0.975),
    }
}

fn validate_level(level: f64) -> EngineResult<()> {
    if !(level > 0.0 && level < 1.0) {
        return Err(EngineError::config(
            "confidence_level",
            format!("{} outside the open interval (0, 1)", level),
        ));
    }
    Ok(())
}

// ── Run ─────────────────────────────────────────────────────────────────

/// The outcome of one Monte Carlo simulation.
#[derive(Clone, Debug)]
pub struct MonteCarloRun {
    config: MonteCarloConfig,
    product: String,
    factors: Vec<FactorId>,
    samples: Vec<ImpactVector>,
    draws: Vec<Vec<f64>>,
    sorted: BTreeMap<ImpactCategory, Vec<f64>>,
    summaries: BTreeMap<ImpactCategory, DistributionSummary>,
}

impl MonteCarloRun {
    fn from_samples(
        config: MonteCarloConfig,
        product: String,
        factors: Vec<FactorId>,
        raw: Vec<Sample>,
    ) -> Self {
        let mut samples = Vec::with_capacity(raw.len());
        let mut draws = Vec::with_capacity(raw.len());
        for s in raw {
            samples.push(s.totals);
            draws.push(s.draws);
        }

        let mut sorted = BTreeMap::new();
        let mut summaries = BTreeMap::new();
        for category in ImpactCategory::ALL {
            let values: Vec<f64> = samples.iter().map(|v| v.get(category)).collect();
            let mut ordered = values.clone();
            ordered.sort_by(|a, b| a.total_cmp(b));
            summaries.insert(category, summarize(&values, &ordered));
            sorted.insert(category, ordered);
        }

        Self {
            config,
            product,
            factors,
            samples,
            draws,
            sorted,
            summaries,
        }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Per-sample category totals, in sample order.
    pub fn sample_totals(&self) -> &[ImpactVector] {
        &self.samples
    }

    /// One category's sampled values, in sample order.
    pub fn samples(&self, category: ImpactCategory) -> Vec<f64> {
        self.samples.iter().map(|v| v.get(category)).collect()
    }

    /// Factors perturbed in this run, in draw order.
    pub fn factors(&self) -> &[FactorId] {
        &self.factors
    }

    /// Per-sample multipliers, indexed `[sample][factor]`.
    pub fn draws(&self) -> &[Vec<f64>] {
        &self.draws
    }

    pub fn summary(&self, category: ImpactCategory) -> Option<&DistributionSummary> {
        self.summaries.get(&category)
    }

    /// The 95% interval (p2.5, p97.5).
    pub fn confidence_interval(&self, category: ImpactCategory) -> Option<ConfidenceBounds> {
        self.summary(category).map(|s| ConfidenceBounds {
            low: s.p2_5,
            high: s.p97_5,
        })
    }

    /// Central percentile interval at any confidence level in (0, 1).
    pub fn interval(&self, category: ImpactCategory, level: f64) -> EngineResult<ConfidenceBounds> {
        validate_level(level)?;
        let tail = (1.0 - level) / 2.0;
        let sorted = self.sorted.get(&category).map(Vec::as_slice).unwrap_or(&[]);
        Ok(ConfidenceBounds {
            low: percentile(sorted, tail),
            high: percentile(sorted, 1.0 - tail),
        })
    }

    /// Normal-approximation interval for the mean estimate itself:
    /// mean ± z·sd/√n. Narrows as the sample count grows.
    pub fn mean_interval(
        &self,
        category: ImpactCategory,
        level: f64,
    ) -> EngineResult<ConfidenceBounds> {
        validate_level(level)?;
        let summary = self.summary(category).cloned().unwrap_or_default();
        let z = special::normal_quantile(0.5 + level / 2.0);
        let half = z * summary.std_dev / (self.sample_count() as f64).sqrt();
        Ok(ConfidenceBounds {
            low: summary.mean - half,
            high: summary.mean + half,
        })
    }

    /// Fraction of samples at or below `target`.
    pub fn probability_at_or_below(&self, category: ImpactCategory, target: f64) -> f64 {
        let sorted = match self.sorted.get(&category) {
            Some(s) if !s.is_empty() => s,
            _ => return 0.0,
        };
        let count = sorted.partition_point(|v| *v <= target);
        count as f64 / sorted.len() as f64
    }

    /// Decorate a point estimate with this run's 95% bounds and summaries.
    pub fn to_impact_result(&self, point: &ImpactResult) -> ImpactResult {
        let mut result = point.clone();
        for category in ImpactCategory::ALL {
            let entry = result
                .impacts
                .entry(category)
                .or_insert_with(|| ImpactValue::point(0.0));
            entry.bounds = self.confidence_interval(category);
            entry.distribution = self.summary(category).cloned();
        }
        result
    }
}

// ── Entry points ────────────────────────────────────────────────────────

/// Run a Monte Carlo simulation for a composition.
pub fn simulate(
    store: &ReferenceDataStore,
    composition: &ProductComposition,
    config: &MonteCarloConfig,
) -> EngineResult<MonteCarloRun> {
    simulate_with_cancel(store, composition, config, &CancellationToken::new())
}

/// Like [`simulate`], aborting with [`EngineError::Cancelled`] once `cancel`
/// is set. Partial samples are discarded.
pub fn simulate_with_cancel(
    store: &ReferenceDataStore,
    composition: &ProductComposition,
    config: &MonteCarloConfig,
    cancel: &CancellationToken,
) -> EngineResult<MonteCarloRun> {
    config.validate()?;
    let resolved = resolve(store, composition)?;
    simulate_resolved(&resolved, config, cancel)
}

/// Run a simulation on an already-resolved composition.
pub fn simulate_resolved(
    resolved: &ResolvedComposition,
    config: &MonteCarloConfig,
    cancel: &CancellationToken,
) -> EngineResult<MonteCarloRun> {
    config.validate()?;

    let factors = uncertain_factors(resolved);
    let cvs = factor_cvs(resolved, &factors, config);

    debug!(
        product = %resolved.name,
        samples = config.samples,
        seed = config.seed,
        distribution = %config.distribution,
        factors = factors.len(),
        "monte carlo run starting"
    );

    let raw = run_samples(resolved, &factors, &cvs, config, cancel)?;
    let run = MonteCarloRun::from_samples(config.clone(), resolved.name.clone(), factors, raw);

    if let Some(gwp) = run.summary(ImpactCategory::GlobalWarmingPotential) {
        info!(
            product = %run.product,
            samples = run.sample_count(),
            gwp_mean = gwp.mean,
            gwp_p2_5 = gwp.p2_5,
            gwp_p97_5 = gwp.p97_5,
            "monte carlo run complete"
        );
    }
    Ok(run)
}
