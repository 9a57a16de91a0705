//! Engine configuration

use std::path::Path;

use lca_types::EndOfLifeAssumptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::circularity::{validate_end_of_life, CircularityConfig};
use crate::error::{EngineError, EngineResult};
use crate::hotspots::HotspotConfig;
use crate::normalize::NormalizationReference;
use crate::sensitivity::SensitivityConfig;
use crate::stats::ComparisonConfig;
use crate::uncertainty::MonteCarloConfig;

/// Every tunable of the engine, one section per component.
///
/// ```toml
/// [monte_carlo]
/// samples = 5000
/// seed = 7
/// distribution = "triangular"
///
/// [comparison]
/// alpha = 0.01
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub monte_carlo: MonteCarloConfig,
    pub circularity: CircularityConfig,
    pub end_of_life: EndOfLifeAssumptions,
    pub sensitivity: SensitivityConfig,
    pub comparison: ComparisonConfig,
    pub normalization: NormalizationReference,
    pub hotspots: HotspotConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::config(path.display().to_string(), e.to_string()))?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            toml::from_str(contents).map_err(|e| EngineError::config("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.monte_carlo.validate()?;
        self.circularity.validate()?;
        validate_end_of_life(&self.end_of_life)?;
        self.sensitivity.validate()?;
        self.comparison.validate()?;
        self.normalization.validate()?;
        self.hotspots.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uncertainty::DistributionFamily;
    use lca_types::ImpactCategory;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [monte_carlo]
            samples = 5000
            distribution = "triangular"

            [sensitivity]
            category = "energy-demand"
            "#,
        )
        .unwrap();
        assert_eq!(config.monte_carlo.samples, 5000);
        assert_eq!(config.monte_carlo.seed, 42);
        assert_eq!(
            config.monte_carlo.distribution,
            DistributionFamily::Triangular
        );
        assert_eq!(config.sensitivity.category, ImpactCategory::EnergyDemand);
        assert_eq!(config.comparison, ComparisonConfig::default());
    }

    #[test]
    fn invalid_values_name_the_field() {
        let err = EngineConfig::from_toml_str("[comparison]\nalpha = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("alpha"));

        let err = EngineConfig::from_toml_str("[end_of_life]\nlandfill_rate = 0.5\n").unwrap_err();
        assert!(err.to_string().contains("end_of_life"));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = EngineConfig::from_toml_str("monte_carlo = [").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { ref field, .. } if field == "config"));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let config = EngineConfig::load("/nonexistent/path/lca.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
