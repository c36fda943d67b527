//! Declarative column descriptors as written in view files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::key::SourceKey;
use crate::units::UnitScale;

fn default_width() -> usize {
    6
}

/// One column entry of a view file.
///
/// ```yaml
/// - name: sel
///   description: SELECT statements per second
///   type: rate
///   key: com_select
///   width: 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default)]
    pub precision: usize,
    #[serde(default)]
    pub units: UnitScale,
    #[serde(flatten)]
    pub kind: KindDef,
}

/// Kind-specific part of a column, selected by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KindDef {
    Gauge {
        key: SourceKey,
    },
    Rate {
        key: SourceKey,
    },
    Diff {
        key: SourceKey,
    },
    Percent {
        numerator: SourceKey,
        denominator: SourceKey,
    },
    RateSum {
        keys: Vec<SourceKey>,
    },
    Subtract {
        bigger: SourceKey,
        smaller: SourceKey,
    },
    Switch {
        key: SourceKey,
        #[serde(default)]
        cases: BTreeMap<String, String>,
    },
    String {
        key: SourceKey,
        #[serde(default)]
        from_end: bool,
    },
    SortedExpandedCounts {
        keys: Vec<SourceKey>,
    },
    Group {
        /// Defaults to the column name.
        #[serde(default)]
        title: Option<String>,
        columns: Vec<ColumnDef>,
    },
}

impl KindDef {
    /// The `type` tag as written in view files.
    pub fn type_name(&self) -> &'static str {
        match self {
            KindDef::Gauge { .. } => "gauge",
            KindDef::Rate { .. } => "rate",
            KindDef::Diff { .. } => "diff",
            KindDef::Percent { .. } => "percent",
            KindDef::RateSum { .. } => "rate_sum",
            KindDef::Subtract { .. } => "subtract",
            KindDef::Switch { .. } => "switch",
            KindDef::String { .. } => "string",
            KindDef::SortedExpandedCounts { .. } => "sorted_expanded_counts",
            KindDef::Group { .. } => "group",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults() {
        let def: ColumnDef = serde_yaml::from_str("name: run\ntype: gauge\nkey: threads_running\n").unwrap();
        assert_eq!(def.width, 6);
        assert_eq!(def.precision, 0);
        assert_eq!(def.units, UnitScale::Number);
        assert!(matches!(def.kind, KindDef::Gauge { ref key } if key.name() == "threads_running"));
    }

    #[test]
    fn test_deserialize_nested_group() {
        let yaml = r#"
name: rows
type: group
columns:
  - name: read
    type: rate
    key: innodb_rows_read
    units: number
  - name: ins
    type: rate
    key: status/innodb_rows_inserted
"#;
        let def: ColumnDef = serde_yaml::from_str(yaml).unwrap();
        let KindDef::Group { title, columns } = def.kind else {
            panic!("expected a group");
        };
        assert!(title.is_none());
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].kind.type_name(), "rate");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<ColumnDef, _> = serde_yaml::from_str("name: x\ntype: histogram\nkey: a\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_units_rejected() {
        let result: Result<ColumnDef, _> = serde_yaml::from_str("name: x\ntype: gauge\nkey: a\nunits: furlongs\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_key_rejected() {
        let result: Result<ColumnDef, _> = serde_yaml::from_str("name: x\ntype: gauge\nkey: a/b/c\n");
        assert!(result.is_err());
    }
}
