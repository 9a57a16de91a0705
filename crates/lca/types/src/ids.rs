//! String-backed identifiers for reference-data rows.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Material identifier, e.g. `"PP"` or `"AL6061"`.
    MaterialId
);
string_id!(
    /// Manufacturing process identifier, e.g. `"injection-molding"`.
    ProcessId
);
string_id!(
    /// Grid region identifier, e.g. `"europe"`.
    RegionId
);
string_id!(
    /// Transport mode identifier, e.g. `"truck-diesel"`.
    TransportModeId
);

/// The four reference tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Material,
    Process,
    Region,
    TransportMode,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Material,
        EntityKind::Process,
        EntityKind::Region,
        EntityKind::TransportMode,
    ];

    /// Table name as used in reference documents.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Material => "materials",
            EntityKind::Process => "processes",
            EntityKind::Region => "regions",
            EntityKind::TransportMode => "transport_modes",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Material => "material",
            EntityKind::Process => "process",
            EntityKind::Region => "region",
            EntityKind::TransportMode => "transport mode",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_and_conversion() {
        let id = MaterialId::from("PP");
        assert_eq!(id.to_string(), "PP");
        assert_eq!(id.as_str(), "PP");
        assert_eq!(id, MaterialId::new(String::from("PP")));
    }

    #[test]
    fn id_serializes_transparently() {
        let json = serde_json::to_string(&RegionId::new("europe")).unwrap();
        assert_eq!(json, "\"europe\"");
    }

    #[test]
    fn entity_kind_tables() {
        let tables: Vec<_> = EntityKind::ALL.iter().map(|k| k.table()).collect();
        assert_eq!(
            tables,
            vec!["materials", "processes", "regions", "transport_modes"]
        );
        assert_eq!(EntityKind::TransportMode.to_string(), "transport mode");
    }
}
