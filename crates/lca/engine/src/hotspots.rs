//! Hotspot identification: the contributions that dominate a category.

use lca_types::{ContributionSource, ImpactCategory, ImpactResult};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// At most this many hotspots are reported.
pub const MAX_HOTSPOTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotspotSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HotspotSeverity {
    /// Grade a share of the category total.
    pub fn from_share(share: f64) -> Self {
        if share > 0.5 {
            HotspotSeverity::Critical
        } else if share > 0.3 {
            HotspotSeverity::High
        } else if share > 0.15 {
            HotspotSeverity::Medium
        } else {
            HotspotSeverity::Low
        }
    }
}

impl std::fmt::Display for HotspotSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HotspotSeverity::Low => "Low",
            HotspotSeverity::Medium => "Medium",
            HotspotSeverity::High => "High",
            HotspotSeverity::Critical => "Critical",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub source: ContributionSource,
    pub category: ImpactCategory,
    /// Contribution per functional unit.
    pub value: f64,
    /// Fraction of the category total.
    pub share: f64,
    pub severity: HotspotSeverity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotConfig {
    /// Minimum share of the category total for a contribution to be reported.
    pub threshold: f64,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

impl HotspotConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(EngineError::config(
                "hotspots.threshold",
                format!("{} outside [0, 1)", self.threshold),
            ));
        }
        Ok(())
    }
}

/// Contributions whose share of `category` exceeds `threshold`, largest
/// first, at most [`MAX_HOTSPOTS`].
///
/// `threshold` must lie in [0, 1); anything else is an
/// [`EngineError::InvalidConfig`] on `hotspots.threshold`.
pub fn identify_hotspots(
    result: &ImpactResult,
    category: ImpactCategory,
    threshold: f64,
) -> EngineResult<Vec<Hotspot>> {
    HotspotConfig { threshold }.validate()?;
    let total = result.value(category);
    if !(total > 0.0) {
        return Ok(Vec::new());
    }

    let mut hotspots: Vec<Hotspot> = result
        .contributions
        .iter()
        .filter_map(|c| {
            let value = c.impacts.get(category);
            let share = value / total;
            (share > threshold).then(|| Hotspot {
                source: c.source.clone(),
                category,
                value,
                share,
                severity: HotspotSeverity::from_share(share),
            })
        })
        .collect();

    hotspots.sort_by(|a, b| b.share.total_cmp(&a.share));
    hotspots.truncate(MAX_HOTSPOTS);
    Ok(hotspots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::compute_impacts;
    use lca_reference::ReferenceDataStore;
    use lca_types::{Material, ProductComposition, Region};

    const GWP: ImpactCategory = ImpactCategory::GlobalWarmingPotential;

    fn result(masses: &[(&str, f64)]) -> ImpactResult {
        let store = ReferenceDataStore::builder()
            .materials(
                ["A", "B", "C", "D", "E", "F", "G"]
                    .into_iter()
                    .map(|id| Material::new(id, id, 1.0, 1.0, 1.0, 0.5)),
            )
            .region(Region::new("r", "R", 0.3))
            .build()
            .unwrap();
        let mut composition = ProductComposition::new("p", "r");
        for (id, m) in masses {
            composition = composition.with_line(*id, *m);
        }
        compute_impacts(&store, &composition).unwrap()
    }

    #[test]
    fn severity_grades() {
        assert_eq!(HotspotSeverity::from_share(0.6), HotspotSeverity::Critical);
        assert_eq!(HotspotSeverity::from_share(0.5), HotspotSeverity::High);
        assert_eq!(HotspotSeverity::from_share(0.2), HotspotSeverity::Medium);
        assert_eq!(HotspotSeverity::from_share(0.12), HotspotSeverity::Low);
    }

    #[test]
    fn sorted_and_thresholded() {
        let r = result(&[("A", 1.0), ("B", 6.0), ("C", 0.5), ("D", 2.5)]);
        let spots = identify_hotspots(&r, GWP, 0.1).unwrap();
        let shares: Vec<f64> = spots.iter().map(|h| h.share).collect();
        assert_eq!(spots.len(), 2);
        assert!((shares[0] - 0.6).abs() < 1e-12);
        assert!((shares[1] - 0.25).abs() < 1e-12);
        assert_eq!(spots[0].severity, HotspotSeverity::Critical);
        assert_eq!(spots[1].severity, HotspotSeverity::Medium);
    }

    #[test]
    fn at_most_five() {
        let r = result(&[
            ("A", 1.0),
            ("B", 1.0),
            ("C", 1.0),
            ("D", 1.0),
            ("E", 1.0),
            ("F", 1.0),
            ("G", 1.0),
        ]);
        let spots = identify_hotspots(&r, ImpactCategory::EnergyDemand, 0.1).unwrap();
        assert_eq!(spots.len(), MAX_HOTSPOTS);
    }

    #[test]
    fn zero_total_has_no_hotspots() {
        let r = result(&[("A", 1.0)]);
        let spots = identify_hotspots(&r, ImpactCategory::Ecotoxicity, 0.1).unwrap();
        assert!(spots.is_empty());
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let r = result(&[("A", 1.0), ("B", 3.0)]);
        for threshold in [-0.1, 1.0, 2.5, f64::NAN] {
            match identify_hotspots(&r, GWP, threshold) {
                Err(EngineError::InvalidConfig { field, .. }) => {
                    assert_eq!(field, "hotspots.threshold")
                }
                other => panic!("threshold {} gave {:?}", threshold, other),
            }
        }
        assert_eq!(identify_hotspots(&r, GWP, 0.0).unwrap().len(), 2);
    }
}
