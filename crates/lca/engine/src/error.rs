use lca_reference::ReferenceError;
use thiserror::Error;

/// Errors from the impact engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid composition: {field} -- {reason}")]
    InvalidComposition { field: String, reason: String },

    #[error("invalid composition: {field} -- {source}")]
    UnresolvedReference {
        field: String,
        source: ReferenceError,
    },

    #[error("invalid configuration: {field} -- {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error(
        "insufficient data: group {group} has {observations} observation(s), at least 2 required"
    )]
    InsufficientData { group: usize, observations: usize },

    #[error("invalid group count: {groups} group(s), at least 3 required")]
    InvalidGroupCount { groups: usize },

    #[error("simulation cancelled after {completed} sample(s)")]
    Cancelled { completed: usize },
}

impl EngineError {
    pub(crate) fn composition(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidComposition {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Re-scope a composition error under `scope`, so `lines[0].mass_kg`
    /// becomes `scenarios[1].lines[0].mass_kg`. Other errors pass through.
    pub(crate) fn scoped(self, scope: &str) -> Self {
        let rescope = |field: String| format!("{}.{}", scope, field);
        match self {
            EngineError::InvalidComposition { field, reason } => {
                EngineError::composition(rescope(field), reason)
            }
            EngineError::UnresolvedReference { field, source } => {
                EngineError::UnresolvedReference {
                    field: rescope(field),
                    source,
                }
            }
            other => other,
        }
    }

    /// True for every failure caused by the composition itself, including
    /// identifiers that do not resolve against the reference store.
    pub fn is_invalid_composition(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidComposition { .. } | EngineError::UnresolvedReference { .. }
        )
    }
}

/// Convenience type alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lca_types::EntityKind;

    #[test]
    fn unresolved_reference_is_a_composition_error() {
        let err = EngineError::UnresolvedReference {
            field: "materials[2]".into(),
            source: ReferenceError::NotFound {
                kind: EntityKind::Material,
                id: "UNOBTAINIUM".into(),
            },
        };
        assert!(err.is_invalid_composition());
        assert_eq!(
            err.to_string(),
            "invalid composition: materials[2] -- material not found: UNOBTAINIUM"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn config_error_names_field() {
        let err = EngineError::config("monte_carlo.samples", "0 is below the minimum of 100");
        assert!(!err.is_invalid_composition());
        assert!(err.to_string().contains("monte_carlo.samples"));
    }

    #[test]
    fn scoped_prefixes_composition_fields_only() {
        let err = EngineError::composition("lines[0].mass_kg", "-1 is negative");
        assert_eq!(
            err.scoped("scenarios[1]").to_string(),
            "invalid composition: scenarios[1].lines[0].mass_kg -- -1 is negative"
        );
        let err = EngineError::config("scenarios", "empty");
        let message = err.scoped("scenarios[0]").to_string();
        assert!(message.contains(": scenarios --"));
    }

    #[test]
    fn insufficient_data_display() {
        let err = EngineError::InsufficientData {
            group: 0,
            observations: 1,
        };
        assert!(err.to_string().contains("1 observation(s)"));
    }
}
