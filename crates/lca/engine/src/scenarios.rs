//! Scenario analysis: probability-weighted outcomes across alternative
//! versions of a product.
//!
//! Each scenario is assessed with the deterministic kernel. Probabilities are
//! relative weights and are normalized before use, so `[1, 3]` and
//! `[0.25, 0.75]` describe the same analysis.

use lca_reference::ReferenceDataStore;
use lca_types::{ImpactCategory, Scenario, ScenarioAnalysis, ScenarioOutcome, ScenarioRobustness};
use tracing::debug;

use crate::aggregator::compute_impacts;
use crate::error::{EngineError, EngineResult};
use crate::stats::mean;

fn normalized_weights(scenarios: &[Scenario]) -> EngineResult<Vec<f64>> {
    if scenarios.is_empty() {
        return Err(EngineError::config("scenarios", "at least one scenario is required"));
    }
    for (i, s) in scenarios.iter().enumerate() {
        if !s.probability.is_finite() || s.probability < 0.0 {
            return Err(EngineError::config(
                format!("scenarios[{}].probability", i),
                format!("{} must be finite and >= 0", s.probability),
            ));
        }
    }
    let total: f64 = scenarios.iter().map(|s| s.probability).sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(EngineError::config(
            "scenarios",
            format!("probabilities sum to {}, must be positive", total),
        ));
    }
    Ok(scenarios.iter().map(|s| s.probability / total).collect())
}

fn robustness(values: &[f64]) -> ScenarioRobustness {
    let best_case = values.iter().copied().fold(f64::INFINITY, f64::min);
    let worst_case = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = mean(values);
    let spread = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    ScenarioRobustness {
        best_case,
        worst_case,
        range: worst_case - best_case,
        cv: if avg > 0.0 { spread.sqrt() / avg } else { 0.0 },
    }
}

/// Weigh every scenario's `category` impact by its normalized probability.
///
/// Composition errors name the offending scenario, e.g.
/// `scenarios[1].lines[0].mass_kg`.
pub fn analyze_scenarios(
    store: &ReferenceDataStore,
    scenarios: &[Scenario],
    category: ImpactCategory,
) -> EngineResult<ScenarioAnalysis> {
    let weights = normalized_weights(scenarios)?;

    let mut outcomes = Vec::with_capacity(scenarios.len());
    for (i, (scenario, weight)) in scenarios.iter().zip(weights).enumerate() {
        let result = compute_impacts(store, &scenario.composition)
            .map_err(|e| e.scoped(&format!("scenarios[{}]", i)))?;
        outcomes.push(ScenarioOutcome {
            name: scenario.name.clone(),
            description: scenario.description.clone(),
            weight,
            value: result.value(category),
        });
    }

    let expected_value: f64 = outcomes.iter().map(|o| o.weight * o.value).sum();
    let variance: f64 = outcomes
        .iter()
        .map(|o| o.weight * (o.value - expected_value).powi(2))
        .sum();
    let values: Vec<f64> = outcomes.iter().map(|o| o.value).collect();
    let robustness = robustness(&values);

    debug!(
        category = %category,
        scenarios = outcomes.len(),
        expected_value,
        range = robustness.range,
        "scenario analysis"
    );

    Ok(ScenarioAnalysis {
        category,
        outcomes,
        expected_value,
        variance,
        std_dev: variance.sqrt(),
        robustness,
    })
}
