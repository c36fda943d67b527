//! Fixed-width number rendering with unit scaling.
//!
//! Column widths are often only three to six characters, so [`fit`] searches
//! for the unit scale and decimal precision that land a value on an exact
//! character budget. Values that cannot be rendered at all become a run of
//! `#` of the same width.

use serde::{Deserialize, Serialize};

/// Ascending `(scale, suffix)` pairs.
pub type UnitTable = &'static [(f64, &'static str)];

pub static NUMBER_UNITS: UnitTable = &[
    (1.0, ""),
    (1e3, "k"),
    (1e6, "m"),
    (1e9, "g"),
    (1e12, "t"),
    (1e15, "p"),
];

pub static MEMORY_UNITS: UnitTable = &[
    (1.0, "b"),
    (1024.0, "K"),
    (1_048_576.0, "M"),
    (1_073_741_824.0, "G"),
    (1_099_511_627_776.0, "T"),
    (1_125_899_906_842_624.0, "P"),
];

pub static NANOSECOND_UNITS: UnitTable = &[(1.0, "ns"), (1e3, "us"), (1e6, "ms"), (1e9, "s")];

pub static MICROSECOND_UNITS: UnitTable = &[(1.0, "us"), (1e3, "ms"), (1e6, "s")];

pub static SECOND_UNITS: UnitTable = &[(1e-6, "us"), (1e-3, "ms"), (1.0, "s")];

pub static PERCENT_UNITS: UnitTable = &[(1.0, "%")];

/// Named unit tables selectable from view definitions (`units: memory`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitScale {
    #[default]
    Number,
    Memory,
    Nanoseconds,
    Microseconds,
    Seconds,
    Percent,
}

impl UnitScale {
    pub fn table(self) -> UnitTable {
        match self {
            UnitScale::Number => NUMBER_UNITS,
            UnitScale::Memory => MEMORY_UNITS,
            UnitScale::Nanoseconds => NANOSECOND_UNITS,
            UnitScale::Microseconds => MICROSECOND_UNITS,
            UnitScale::Seconds => SECOND_UNITS,
            UnitScale::Percent => PERCENT_UNITS,
        }
    }
}

/// Horizontal alignment for [`fit_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Renders `value` in exactly `width` characters.
///
/// Scales are tried smallest first. A rendering that overflows `width` by no
/// more than `precision` characters is retried with one decimal less; one
/// that fits with room to spare under a non-base scale gets the spare width
/// as extra decimals. A non-zero value that rounds to zero borrows decimals
/// until a digit shows or, failing that, renders as overflow.
pub fn fit(value: f64, width: usize, precision: usize, units: UnitTable) -> String {
    if width == 0 {
        return String::new();
    }
    if !value.is_finite() {
        return overflow(width);
    }
    // Sums and differences can produce -0.0, which would print as "-0".
    let value = if value == 0.0 { 0.0 } else { value };

    for &(scale, suffix) in units {
        let raw = value / scale;
        if !raw.is_finite() {
            continue;
        }
        let rendered = render(raw, precision, suffix);
        let len = rendered.len();

        if len > width + precision {
            continue;
        }
        if len > width {
            return fit(value, width, precision - 1, units);
        }
        return settle(raw, scale, suffix, rendered, width, precision);
    }

    // Nothing fits under any unit: last resort is the bare number.
    for p in (0..=precision).rev() {
        let rendered = format!("{:.*}", p, value);
        if rendered.len() <= width && (value == 0.0 || !renders_as_zero(&rendered, "")) {
            return pad_left(&rendered, width);
        }
    }
    overflow(width)
}

fn settle(
    raw: f64,
    scale: f64,
    suffix: &str,
    rendered: String,
    width: usize,
    precision: usize,
) -> String {
    if raw != 0.0 && renders_as_zero(&rendered, suffix) {
        for borrowed_precision in precision + 1..=width {
            let borrowed = render(raw, borrowed_precision, suffix);
            if borrowed.len() > width {
                return overflow(width);
            }
            if !renders_as_zero(&borrowed, suffix) {
                return pad_left(&borrowed, width);
            }
        }
        return overflow(width);
    }

    let spare = width - rendered.len();
    if spare > 0 && scale != 1.0 {
        let expanded_precision = if precision == 0 {
            spare - 1
        } else {
            precision + spare
        };
        if expanded_precision > precision {
            let expanded = render(raw, expanded_precision, suffix);
            if expanded.len() <= width {
                return pad_left(&expanded, width);
            }
        }
    }

    pad_left(&rendered, width)
}

fn render(raw: f64, precision: usize, suffix: &str) -> String {
    format!("{:.*}{}", precision, raw, suffix)
}

fn renders_as_zero(rendered: &str, suffix: &str) -> bool {
    rendered[..rendered.len() - suffix.len()]
        .bytes()
        .filter(u8::is_ascii_digit)
        .all(|b| b == b'0')
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{:>width$}", text, width = width)
}

/// `-` right-aligned in `width`: the placeholder for missing data.
pub fn fill(width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    pad_left("-", width)
}

/// `width` spaces.
pub fn blank(width: usize) -> String {
    " ".repeat(width)
}

/// `width` hashes: the placeholder for values that cannot be rendered.
pub fn overflow(width: usize) -> String {
    "#".repeat(width)
}

/// Truncates `text` to `width` characters (dropping from the front when
/// `from_end` is set, from the back otherwise) and pads it to `width`.
pub fn fit_text(text: &str, width: usize, from_end: bool, align: Align) -> String {
    let count = text.chars().count();
    let truncated: String = if count <= width {
        text.to_string()
    } else if from_end {
        text.chars().skip(count - width).collect()
    } else {
        text.chars().take(width).collect()
    };

    match align {
        Align::Left => format!("{:<width$}", truncated, width = width),
        Align::Right => format!("{:>width$}", truncated, width = width),
    }
}

/// Centers `text` in `width`, truncating from the back when too long.
pub fn center(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{:^width$}", truncated, width = width)
}
