//! Views: named sets of columns rendered side by side.
//!
//! A view renders as the time column, then its groups, then its loose
//! columns. Headers are composed bottom-aligned and data top-aligned (see
//! [`Padding`]).

pub mod catalog;
pub mod time;

use crate::cache::SampleCache;
use crate::column::{compose, Block, Column, ColumnDef, ColumnKind, Padding};
use crate::error::ViewError;
use crate::key::SourceKey;

pub use catalog::{ViewCatalog, ViewDef};
pub use time::{TimeColumn, TIME_WIDTH};

#[derive(Debug, Clone)]
pub struct View {
    name: String,
    description: String,
    time: TimeColumn,
    groups: Vec<Column>,
    columns: Vec<Column>,
}

impl View {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        groups: Vec<Column>,
        columns: Vec<Column>,
    ) -> Result<Self, ViewError> {
        let name = name.into();
        if groups.is_empty() && columns.is_empty() {
            return Err(ViewError::EmptyView(name));
        }
        if let Some(loose) = groups
            .iter()
            .find(|c| !matches!(c.kind(), ColumnKind::Group { .. }))
        {
            return Err(ViewError::InvalidColumn {
                column: loose.name().to_string(),
                reason: "entries under 'groups' must have type group".to_string(),
            });
        }

        Ok(Self {
            name,
            description: description.into(),
            time: TimeColumn,
            groups,
            columns,
        })
    }

    /// Validates a definition and builds its columns.
    pub fn from_def(def: ViewDef) -> Result<Self, ViewError> {
        let build = |defs: Vec<ColumnDef>| {
            defs.into_iter()
                .map(Column::try_from)
                .collect::<Result<Vec<_>, _>>()
        };
        let groups = build(def.groups)?;
        let columns = build(def.columns)?;
        Self::new(def.name, def.description, groups, columns)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Groups followed by loose columns, in render order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.groups.iter().chain(self.columns.iter())
    }

    /// Total rendered width, time column included.
    pub fn width(&self) -> usize {
        self.columns()
            .fold(self.time.width(), |width, column| width + 1 + column.width())
    }

    pub fn header_lines(&self) -> Vec<String> {
        let mut blocks = vec![Block {
            lines: self.time.header_lines(),
            blank: self.time.blank_line(),
        }];
        blocks.extend(self.columns().map(|c| Block {
            lines: c.header_lines(),
            blank: c.blank_line(),
        }));
        compose(&blocks, Padding::Above)
    }

    pub fn data_lines(&self, cache: &SampleCache) -> Vec<String> {
        let mut blocks = vec![Block {
            lines: self.time.data_lines(cache),
            blank: self.time.blank_line(),
        }];
        blocks.extend(self.columns().map(|c| Block {
            lines: c.data_lines(cache),
            blank: c.blank_line(),
        }));
        compose(&blocks, Padding::Below)
    }

    /// Distinct keys read by the view, in first-use order.
    pub fn sources(&self) -> Vec<SourceKey> {
        let mut keys: Vec<SourceKey> = Vec::new();
        for key in self.columns().flat_map(Column::sources) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    pub fn help(&self) -> Vec<String> {
        let mut lines = vec![if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.description)
        }];
        for column in self.columns() {
            lines.extend(column.help_lines().into_iter().map(|l| format!("  {}", l)));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{MetricKind, MetricValue, Sample, SampleClock, STATUS_DOMAIN};

    fn column(yaml: &str) -> Column {
        let def: ColumnDef = serde_yaml::from_str(yaml).unwrap();
        Column::try_from(def).unwrap()
    }

    fn view() -> View {
        let group = column(
            "name: thr\ntype: group\ncolumns:\n  - {name: run, type: gauge, key: threads_running, width: 3}\n",
        );
        let loose = column("name: qps\ntype: rate\nkey: questions\nwidth: 4\n");
        View::new("test", "a test view", vec![group], vec![loose]).unwrap()
    }

    #[test]
    fn test_header_and_data_widths() {
        let view = view();
        let header = view.header_lines();
        assert_eq!(header, vec!["         thr     ", "    time run  qps"]);

        let mut cache = SampleCache::new();
        let sample = |end: f64, q: f64| {
            Sample::new(end, end, SampleClock::Uptime).with_domain(
                STATUS_DOMAIN,
                vec![
                    MetricValue::new("threads_running", 2.0, MetricKind::Gauge),
                    MetricValue::new("questions", q, MetricKind::Counter),
                ],
            )
        };
        cache.update(Some(sample(3600.0, 100.0)));
        assert_eq!(view.data_lines(&cache), vec![" 1:00:00   2    -"]);

        cache.update(Some(sample(3601.0, 150.0)));
        let data = view.data_lines(&cache);
        assert_eq!(data, vec![" 1:00:01   2   50"]);
        assert!(data.iter().chain(header.iter()).all(|l| l.len() == view.width()));
    }

    #[test]
    fn test_empty_view_rejected() {
        assert!(matches!(View::new("x", "", vec![], vec![]), Err(ViewError::EmptyView(_))));
    }

    #[test]
    fn test_loose_column_under_groups_rejected() {
        let loose = column("name: qps\ntype: rate\nkey: questions\n");
        assert!(matches!(
            View::new("x", "", vec![loose], vec![]),
            Err(ViewError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_sources_and_help() {
        let view = view();
        assert_eq!(
            view.sources(),
            vec![SourceKey::status("threads_running"), SourceKey::status("questions")]
        );
        let help = view.help();
        assert_eq!(help[0], "test: a test view");
        assert_eq!(help.len(), 4);
    }
}
