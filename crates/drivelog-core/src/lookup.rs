use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four append-only reference tables an experience points at.
///
/// Acts as the whitelist for anything that ends up interpolated into SQL:
/// table and column names only ever come from these accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Weather,
    Traffic,
    RoadType,
    Supervisor,
}

impl LookupKind {
    pub const ALL: [LookupKind; 4] = [
        LookupKind::Weather,
        LookupKind::Traffic,
        LookupKind::RoadType,
        LookupKind::Supervisor,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            LookupKind::Weather => "weather",
            LookupKind::Traffic => "traffic",
            LookupKind::RoadType => "road_type",
            LookupKind::Supervisor => "supervisor",
        }
    }

    /// Supervisors carry a person's name, the rest a label.
    pub fn label_column(&self) -> &'static str {
        match self {
            LookupKind::Supervisor => "name",
            _ => "label",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for LookupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weather" => Ok(LookupKind::Weather),
            "traffic" => Ok(LookupKind::Traffic),
            "road-type" | "road_type" => Ok(LookupKind::RoadType),
            "supervisor" => Ok(LookupKind::Supervisor),
            other => Err(format!("Unknown lookup kind: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(LookupKind::Weather.table(), "weather");
        assert_eq!(LookupKind::RoadType.table(), "road_type");
    }

    #[test]
    fn test_supervisor_uses_name_column() {
        assert_eq!(LookupKind::Supervisor.label_column(), "name");
        assert_eq!(LookupKind::Traffic.label_column(), "label");
    }

    #[test]
    fn test_from_str_accepts_url_segments() {
        assert_eq!("weather".parse::<LookupKind>().unwrap(), LookupKind::Weather);
        assert_eq!("road-type".parse::<LookupKind>().unwrap(), LookupKind::RoadType);
        assert_eq!("road_type".parse::<LookupKind>().unwrap(), LookupKind::RoadType);
        assert!("drivers".parse::<LookupKind>().is_err());
    }
}
