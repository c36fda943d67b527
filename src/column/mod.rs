//! Column engine.
//!
//! A [`Column`] is built once from a [`ColumnDef`], validated, and then
//! rendered against the [`SampleCache`] for every sample. Rendering never
//! fails: missing readings show as `-`, values that cannot fit as `#`.
//! Every line a column returns is exactly [`Column::width`] characters.

pub mod counts;
pub mod def;
pub mod kinds;
pub mod layout;

use std::collections::BTreeMap;

use crate::cache::SampleCache;
use crate::error::ViewError;
use crate::key::SourceKey;
use crate::units::{blank, center, fill, fit, fit_text, Align, UnitScale};

pub use def::{ColumnDef, KindDef};
pub use kinds::{counter_diff, expand_keys, rate, LazyExpansion};
pub use layout::{compose, Block, Padding};

/// Validated, render-ready column.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    description: String,
    width: usize,
    precision: usize,
    units: UnitScale,
    kind: ColumnKind,
}

#[derive(Debug, Clone)]
pub enum ColumnKind {
    Gauge(SourceKey),
    Rate(SourceKey),
    Diff(SourceKey),
    Percent {
        numerator: SourceKey,
        denominator: SourceKey,
    },
    RateSum {
        keys: Vec<SourceKey>,
        expansion: LazyExpansion,
    },
    Subtract {
        bigger: SourceKey,
        smaller: SourceKey,
    },
    Switch {
        key: SourceKey,
        cases: BTreeMap<String, String>,
    },
    Text {
        key: SourceKey,
        from_end: bool,
    },
    SortedExpandedCounts(Vec<SourceKey>),
    Group {
        title: String,
        columns: Vec<Column>,
    },
}

fn invalid(column: &str, reason: impl Into<String>) -> ViewError {
    ViewError::InvalidColumn {
        column: column.to_string(),
        reason: reason.into(),
    }
}

fn single(column: &str, key: SourceKey) -> Result<SourceKey, ViewError> {
    if key.is_glob() {
        return Err(invalid(column, format!("'{}' must name a single reading", key)));
    }
    Ok(key)
}

fn list(column: &str, keys: Vec<SourceKey>) -> Result<Vec<SourceKey>, ViewError> {
    if keys.is_empty() {
        return Err(invalid(column, "'keys' must not be empty"));
    }
    Ok(keys)
}

impl TryFrom<ColumnDef> for Column {
    type Error = ViewError;

    fn try_from(def: ColumnDef) -> Result<Self, Self::Error> {
        let name = def.name;
        let kind = match def.kind {
            KindDef::Gauge { key } => ColumnKind::Gauge(single(&name, key)?),
            KindDef::Rate { key } => ColumnKind::Rate(single(&name, key)?),
            KindDef::Diff { key } => ColumnKind::Diff(single(&name, key)?),
            KindDef::Percent {
                numerator,
                denominator,
            } => ColumnKind::Percent {
                numerator: single(&name, numerator)?,
                denominator: single(&name, denominator)?,
            },
            KindDef::RateSum { keys } => ColumnKind::RateSum {
                keys: list(&name, keys)?,
                expansion: LazyExpansion::default(),
            },
            KindDef::Subtract { bigger, smaller } => ColumnKind::Subtract {
                bigger: single(&name, bigger)?,
                smaller: single(&name, smaller)?,
            },
            KindDef::Switch { key, cases } => ColumnKind::Switch {
                key: single(&name, key)?,
                cases,
            },
            KindDef::String { key, from_end } => ColumnKind::Text {
                key: single(&name, key)?,
                from_end,
            },
            KindDef::SortedExpandedCounts { keys } => ColumnKind::SortedExpandedCounts(list(&name, keys)?),
            KindDef::Group { title, columns } => {
                if columns.is_empty() {
                    return Err(invalid(&name, "group has no columns"));
                }
                let columns = columns
                    .into_iter()
                    .map(Column::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                ColumnKind::Group {
                    title: title.unwrap_or_else(|| name.clone()),
                    columns,
                }
            }
        };

        let width = match &kind {
            ColumnKind::Group { columns, .. } => group_width(columns),
            _ if def.width == 0 => return Err(invalid(&name, "width must be at least 1")),
            _ => def.width,
        };

        Ok(Self {
            name,
            description: def.description,
            width,
            precision: def.precision,
            units: def.units,
            kind,
        })
    }
}

fn group_width(columns: &[Column]) -> usize {
    let cells: usize = columns.iter().map(Column::width).sum();
    cells + columns.len().saturating_sub(1)
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn blank_line(&self) -> String {
        blank(self.width)
    }

    /// Header rows, top to bottom.
    ///
    /// Each whitespace-separated word of a column name is one row, so
    /// `name: "max conn"` renders as a two-row header.
    pub fn header_lines(&self) -> Vec<String> {
        match &self.kind {
            ColumnKind::Group { title, columns } => {
                let mut lines = vec![center(title, self.width)];
                lines.extend(compose(&header_blocks(columns), Padding::Above));
                lines
            }
            _ => {
                let lines: Vec<String> = self
                    .name
                    .split_whitespace()
                    .map(|word| fit_text(word, self.width, false, Align::Right))
                    .collect();
                if lines.is_empty() {
                    vec![self.blank_line()]
                } else {
                    lines
                }
            }
        }
    }

    /// Data rows for the current generation of `cache`.
    pub fn data_lines(&self, cache: &SampleCache) -> Vec<String> {
        match &self.kind {
            ColumnKind::SortedExpandedCounts(keys) => counts::render(keys, cache, self.width),
            ColumnKind::Group { columns, .. } => {
                let blocks: Vec<Block> = columns
                    .iter()
                    .map(|c| Block {
                        lines: c.data_lines(cache),
                        blank: c.blank_line(),
                    })
                    .collect();
                compose(&blocks, Padding::Below)
            }
            _ => vec![self.cell(cache)],
        }
    }

    /// Every key the column reads, in declaration order.
    pub fn sources(&self) -> Vec<SourceKey> {
        match &self.kind {
            ColumnKind::Gauge(key)
            | ColumnKind::Rate(key)
            | ColumnKind::Diff(key)
            | ColumnKind::Switch { key, .. }
            | ColumnKind::Text { key, .. } => vec![key.clone()],
            ColumnKind::Percent {
                numerator,
                denominator,
            } => vec![numerator.clone(), denominator.clone()],
            ColumnKind::Subtract { bigger, smaller } => vec![bigger.clone(), smaller.clone()],
            ColumnKind::RateSum { keys, .. } | ColumnKind::SortedExpandedCounts(keys) => keys.clone(),
            ColumnKind::Group { columns, .. } => columns.iter().flat_map(Column::sources).collect(),
        }
    }

    /// Human-readable description of the column (and its children).
    pub fn help_lines(&self) -> Vec<String> {
        match &self.kind {
            ColumnKind::Group { title, columns } => {
                let mut lines = vec![if self.description.is_empty() {
                    format!("[{}]", title)
                } else {
                    format!("[{}] {}", title, self.description)
                }];
                for column in columns {
                    lines.extend(column.help_lines().into_iter().map(|l| format!("  {}", l)));
                }
                lines
            }
            _ => {
                let keys: Vec<String> = self.sources().iter().map(ToString::to_string).collect();
                vec![format!(
                    "{:<8} {:<22} {} ({})",
                    self.name.split_whitespace().collect::<Vec<_>>().join(" "),
                    self.type_name(),
                    self.description,
                    keys.join(", ")
                )]
            }
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ColumnKind::Gauge(_) => "gauge",
            ColumnKind::Rate(_) => "rate",
            ColumnKind::Diff(_) => "diff",
            ColumnKind::Percent { .. } => "percent",
            ColumnKind::RateSum { .. } => "rate_sum",
            ColumnKind::Subtract { .. } => "subtract",
            ColumnKind::Switch { .. } => "switch",
            ColumnKind::Text { .. } => "string",
            ColumnKind::SortedExpandedCounts(_) => "sorted_expanded_counts",
            ColumnKind::Group { .. } => "group",
        }
    }

    fn number(&self, value: f64) -> String {
        fit(value, self.width, self.precision, self.units.table())
    }

    fn or_fill(&self, value: Option<f64>) -> String {
        match value {
            Some(value) => self.number(value),
            None => fill(self.width),
        }
    }

    /// Single-row value of a leaf column.
    fn cell(&self, cache: &SampleCache) -> String {
        let current = |key: &SourceKey| cache.get_metric(key.domain(), key.name()).map(|m| m.value);
        let previous = |key: &SourceKey| cache.get_prev_metric(key.domain(), key.name()).map(|m| m.value);

        match &self.kind {
            ColumnKind::Gauge(key) => self.or_fill(current(key)),
            ColumnKind::Rate(key) => {
                let value = match (current(key), previous(key)) {
                    (Some(cur), Some(prev)) => rate(cur, prev, cache.seconds_diff()),
                    _ => None,
                };
                self.or_fill(value)
            }
            ColumnKind::Diff(key) => {
                let value = match (current(key), previous(key)) {
                    (Some(cur), Some(prev)) => Some(counter_diff(cur, prev)),
                    _ => None,
                };
                self.or_fill(value)
            }
            ColumnKind::Percent {
                numerator,
                denominator,
            } => {
                let value = match (current(numerator), current(denominator)) {
                    (Some(num), Some(denom)) if denom != 0.0 => Some(num / denom * 100.0),
                    _ => None,
                };
                self.or_fill(value)
            }
            ColumnKind::RateSum { keys, expansion } => {
                if cache.previous().is_none() {
                    return fill(self.width);
                }
                let expanded = expansion.get(keys, cache);
                if expanded.is_empty() {
                    return fill(self.width);
                }
                let cur: f64 = expanded.iter().map(|k| cache.get_value(k.domain(), k.name())).sum();
                let prev: f64 = expanded
                    .iter()
                    .map(|k| cache.get_prev_value(k.domain(), k.name()))
                    .sum();
                self.or_fill(rate(cur, prev, cache.seconds_diff()))
            }
            ColumnKind::Subtract { bigger, smaller } => {
                let value = match (current(bigger), current(smaller)) {
                    (Some(b), Some(s)) => Some(b - s),
                    _ => None,
                };
                self.or_fill(value)
            }
            ColumnKind::Switch { key, cases } => match current(key) {
                Some(value) => {
                    let code = integer_text(value);
                    let text = cases.get(&code).map_or(code.as_str(), String::as_str);
                    fit_text(text, self.width, false, Align::Right)
                }
                None => fill(self.width),
            },
            ColumnKind::Text { key, from_end } => match current(key) {
                Some(value) => fit_text(&value_text(value), self.width, *from_end, Align::Right),
                None => fill(self.width),
            },
            ColumnKind::SortedExpandedCounts(_) | ColumnKind::Group { .. } => fill(self.width),
        }
    }
}

fn header_blocks(columns: &[Column]) -> Vec<Block> {
    columns
        .iter()
        .map(|c| Block {
            lines: c.header_lines(),
            blank: c.blank_line(),
        })
        .collect()
}

/// Whole-number text of a reading (`3.7` → `"3"`).
fn integer_text(value: f64) -> String {
    format!("{:.0}", value.trunc())
}

/// Shortest text for a reading: no fraction for whole numbers.
fn value_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
