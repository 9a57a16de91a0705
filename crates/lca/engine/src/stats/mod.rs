//! Comparative Statistics Engine.
//!
//! Welch's t-test for two groups, one-way ANOVA for three or more. Both
//! report an effect size next to the p-value: Cohen's d for Welch, eta²
//! for ANOVA. Tail probabilities come from [`special`].

pub mod special;

use lca_types::{ComparisonResult, EffectSize, ImpactCategory, TestKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::uncertainty::MonteCarloRun;

/// Defaults for comparisons requested without explicit parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub alpha: f64,
    pub category: ImpactCategory,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            category: ImpactCategory::GlobalWarmingPotential,
        }
    }
}

impl ComparisonConfig {
    pub fn validate(&self) -> EngineResult<()> {
        validate_alpha(self.alpha)
    }
}

fn validate_alpha(alpha: f64) -> EngineResult<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(EngineError::config(
            "alpha",
            format!("{} outside the open interval (0, 1)", alpha),
        ));
    }
    Ok(())
}

fn validate_group(index: usize, group: &[f64]) -> EngineResult<()> {
    if group.len() < 2 {
        return Err(EngineError::InsufficientData {
            group: index,
            observations: group.len(),
        });
    }
    if let Some(pos) = group.iter().position(|v| !v.is_finite()) {
        return Err(EngineError::config(
            format!("groups[{}][{}]", index, pos),
            "observation is not a finite number",
        ));
    }
    Ok(())
}

// ── Descriptive helpers ─────────────────────────────────────────────────

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with Bessel's correction (n − 1). Zero below two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// k-th central moment over the k/2 power of the population variance.
fn standardized_moment(values: &[f64], k: i32) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return None;
    }
    let mk = values.iter().map(|v| (v - m).powi(k)).sum::<f64>() / n;
    Some(mk / m2.powf(f64::from(k) / 2.0))
}

/// Population (biased) skewness. Zero when there is no spread.
pub fn skewness(values: &[f64]) -> f64 {
    standardized_moment(values, 3).unwrap_or(0.0)
}

/// Population excess kurtosis, 0 for a normal distribution. Zero when there
/// is no spread.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    standardized_moment(values, 4).map_or(0.0, |b2| b2 - 3.0)
}

// ── Welch ───────────────────────────────────────────────────────────────

/// Welch's unequal-variance t-test between two samples.
pub fn compare_two(a: &[f64], b: &[f64], alpha: f64) -> EngineResult<ComparisonResult> {
    validate_alpha(alpha)?;
    validate_group(0, a)?;
    validate_group(1, b)?;

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (m1, m2) = (mean(a), mean(b));
    let (v1, v2) = (sample_variance(a), sample_variance(b));
    let (se1, se2) = (v1 / n1, v2 / n2);
    let se = (se1 + se2).sqrt();

    let (t, df, p) = if se == 0.0 {
        warn!(
            n1 = a.len(),
            n2 = b.len(),
            "welch test on two zero-variance groups"
        );
        let df = n1 + n2 - 2.0;
        if m1 == m2 {
            (0.0, df, 1.0)
        } else {
            let t = if m1 > m2 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
            (t, df, 0.0)
        }
    } else {
        let t = (m1 - m2) / se;
        let df = (se1 + se2).powi(2) / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
        (t, df, special::student_t_two_tailed(t, df))
    };

    let pooled_sd = ((v1 + v2) / 2.0).sqrt();
    let d = if pooled_sd > 0.0 {
        (m1 - m2) / pooled_sd
    } else if m1 == m2 {
        0.0
    } else {
        (m1 - m2).signum() * f64::INFINITY
    };

    debug!(t, df, p, cohens_d = d, "welch t-test");

    Ok(ComparisonResult {
        test: TestKind::WelchT,
        statistic: t,
        degrees_of_freedom: df,
        denominator_degrees_of_freedom: None,
        p_value: p,
        alpha,
        significant: p < alpha,
        effect_size: EffectSize::CohensD(d),
        group_means: vec![m1, m2],
    })
}

// ── ANOVA ───────────────────────────────────────────────────────────────

/// One-way analysis of variance across three or more samples.
pub fn compare_many(groups: &[&[f64]], alpha: f64) -> EngineResult<ComparisonResult> {
    validate_alpha(alpha)?;
    if groups.len() < 3 {
        return Err(EngineError::InvalidGroupCount {
            groups: groups.len(),
        });
    }
    for (i, g) in groups.iter().enumerate() {
        validate_group(i, g)?;
    }

    let k = groups.len() as f64;
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let n = n_total as f64;
    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n;
    let means: Vec<f64> = groups.iter().map(|g| mean(g)).collect();

    let ss_between: f64 = groups
        .iter()
        .zip(&means)
        .map(|(g, m)| g.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(&means)
        .map(|(g, m)| g.iter().map(|v| (v - m).powi(2)).sum::<f64>())
        .sum();

    let df_between = k - 1.0;
    let df_within = n - k;

    let (f, p) = if ss_within == 0.0 {
        warn!(
            groups = groups.len(),
            "anova with zero within-group variance"
        );
        if ss_between == 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY, 0.0)
        }
    } else {
        let f = (ss_between / df_between) / (ss_within / df_within);
        (f, special::f_upper_tail(f, df_between, df_within))
    };

    let ss_total = ss_between + ss_within;
    let eta_squared = if ss_total > 0.0 {
        ss_between / ss_total
    } else {
        0.0
    };

    debug!(f, df_between, df_within, p, eta_squared, "one-way anova");

    Ok(ComparisonResult {
        test: TestKind::OneWayAnova,
        statistic: f,
        degrees_of_freedom: df_between,
        denominator_degrees_of_freedom: Some(df_within),
        p_value: p,
        alpha,
        significant: p < alpha,
        effect_size: EffectSize::EtaSquared(eta_squared),
        group_means: means,
    })
}

/// Compare the sampled distributions of one category across Monte Carlo
/// runs: Welch for two runs, ANOVA for three or more.
pub fn compare_runs(
    runs: &[&MonteCarloRun],
    category: ImpactCategory,
    alpha: f64,
) -> EngineResult<ComparisonResult> {
    let samples: Vec<Vec<f64>> = runs.iter().map(|r| r.samples(category)).collect();
    match samples.as_slice() {
        [a, b] => compare_two(a, b, alpha),
        _ => {
            let groups: Vec<&[f64]> = samples.iter().map(Vec::as_slice).collect();
            compare_many(&groups, alpha)
        }
    }
}
