use lca_types::EntityKind;
use thiserror::Error;

/// Errors from the reference data store.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("data integrity violation in {table} row '{row}': {field} -- {detail}")]
    DataIntegrity {
        table: String,
        row: String,
        field: String,
        detail: String,
    },

    #[error("reference table parse error: {0}")]
    Parse(String),

    #[error("reference table I/O error: {0}")]
    Io(String),
}

impl ReferenceError {
    pub(crate) fn integrity(
        kind: EntityKind,
        row: impl Into<String>,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        ReferenceError::DataIntegrity {
            table: kind.table().to_string(),
            row: row.into(),
            field: field.into(),
            detail: detail.into(),
        }
    }
}

impl From<std::io::Error> for ReferenceError {
    fn from(e: std::io::Error) -> Self {
        ReferenceError::Io(e.to_string())
    }
}

impl From<toml::de::Error> for ReferenceError {
    fn from(e: toml::de::Error) -> Self {
        ReferenceError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for ReferenceError {
    fn from(e: serde_json::Error) -> Self {
        ReferenceError::Parse(e.to_string())
    }
}

/// Convenience type alias for reference-store results.
pub type ReferenceResult<T> = Result<T, ReferenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_kind_and_id() {
        let e = ReferenceError::NotFound {
            kind: EntityKind::TransportMode,
            id: "zeppelin".into(),
        };
        assert_eq!(e.to_string(), "transport mode not found: zeppelin");
    }

    #[test]
    fn integrity_names_offending_row() {
        let e = ReferenceError::integrity(
            EntityKind::Material,
            "PP",
            "recyclability",
            "1.4 outside [0, 1]",
        );
        let s = e.to_string();
        assert!(s.contains("materials"));
        assert!(s.contains("'PP'"));
        assert!(s.contains("recyclability"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ReferenceError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
