//! Named view definitions: the embedded built-ins plus user files.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

use crate::column::ColumnDef;
use crate::error::ViewError;

use super::View;

/// One entry of a views file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Column definitions of type `group`, rendered before `columns`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ColumnDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Deserialize)]
struct ViewFile {
    views: Vec<ViewDef>,
}

/// Built-in views from the embedded file.
static BUILTIN: Lazy<ViewCatalog> = Lazy::new(|| {
    let content = include_str!("../../data/views.yaml");
    match ViewCatalog::from_yaml(content) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Built-in view definitions are invalid: {}", e);
            ViewCatalog::default()
        }
    }
});

/// Ordered set of view definitions, unique by name.
#[derive(Debug, Clone, Default)]
pub struct ViewCatalog {
    defs: Vec<ViewDef>,
}

impl ViewCatalog {
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Parses and validates a views document. Every view is built once so
    /// that bad columns are reported at load time.
    pub fn from_yaml(content: &str) -> Result<Self, ViewError> {
        let file: ViewFile = serde_yaml::from_str(content)?;

        let mut catalog = Self::default();
        for def in file.views {
            if catalog.get(&def.name).is_some() {
                return Err(ViewError::DuplicateView(def.name));
            }
            View::from_def(def.clone())?;
            catalog.defs.push(def);
        }
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self, ViewError> {
        let content = std::fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Adds `other`'s views; a view with an existing name replaces it in place.
    pub fn merge(&mut self, other: ViewCatalog) {
        for def in other.defs {
            match self.defs.iter_mut().find(|d| d.name == def.name) {
                Some(existing) => {
                    debug!("Overriding view '{}'", def.name);
                    *existing = def;
                }
                None => self.defs.push(def),
            }
        }
    }

    /// Loads a views file and merges it over this catalog.
    pub fn merge_file(&mut self, path: &Path) -> Result<usize, ViewError> {
        let other = Self::from_file(path)?;
        let count = other.len();
        self.merge(other);
        Ok(count)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|d| d.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ViewDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    pub fn defs(&self) -> &[ViewDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Builds a fresh view instance by name.
    pub fn build(&self, name: &str) -> Result<View, ViewError> {
        let def = self
            .get(name)
            .ok_or_else(|| ViewError::UnknownView(name.to_string()))?;
        View::from_def(def.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRA: &str = r#"
views:
  - name: cttf
    description: Replaced
    columns:
      - {name: run, type: gauge, key: threads_running, width: 4}
  - name: mine
    columns:
      - {name: qps, type: rate, key: questions}
"#;

    #[test]
    fn test_builtin_views_all_build() {
        let catalog = ViewCatalog::builtin();
        assert_eq!(catalog.len(), 10);
        for name in catalog.names() {
            let view = catalog.build(name).unwrap();
            assert!(!view.header_lines().is_empty(), "{}", name);
        }
    }

    #[test]
    fn test_merge_overrides_and_appends() {
        let mut catalog = ViewCatalog::builtin();
        catalog.merge(ViewCatalog::from_yaml(EXTRA).unwrap());

        assert_eq!(catalog.len(), 11);
        assert_eq!(catalog.names().next(), Some("cttf"));
        assert_eq!(catalog.get("cttf").unwrap().description, "Replaced");
        assert!(catalog.build("mine").is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = "views:\n  - {name: a, columns: [{name: x, type: gauge, key: uptime}]}\n  - {name: a, columns: [{name: y, type: gauge, key: uptime}]}\n";
        assert!(matches!(ViewCatalog::from_yaml(yaml), Err(ViewError::DuplicateView(_))));
    }

    #[test]
    fn test_bad_column_rejected_at_load() {
        let yaml = "views:\n  - {name: a, columns: [{name: x, type: gauge, key: \"com_*\"}]}\n";
        assert!(matches!(ViewCatalog::from_yaml(yaml), Err(ViewError::InvalidColumn { .. })));

        let yaml = "views:\n  - {name: a, columns: [{name: x, type: nope, key: uptime}]}\n";
        assert!(matches!(ViewCatalog::from_yaml(yaml), Err(ViewError::Yaml(_))));
    }

    #[test]
    fn test_unknown_view() {
        assert!(matches!(
            ViewCatalog::builtin().build("nope"),
            Err(ViewError::UnknownView(_))
        ));
    }
}
