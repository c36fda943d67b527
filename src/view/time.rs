//! The leading time column every view carries.

use chrono::{Local, TimeZone};

use crate::cache::SampleCache;
use crate::sample::SampleClock;
use crate::units::{blank, fill, fit, fit_text, Align, SECOND_UNITS};

pub const TIME_WIDTH: usize = 8;

/// Wall-clock time for live samples, server uptime for replayed ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeColumn;

impl TimeColumn {
    pub fn width(&self) -> usize {
        TIME_WIDTH
    }

    pub fn header_lines(&self) -> Vec<String> {
        vec![fit_text("time", TIME_WIDTH, false, Align::Right)]
    }

    pub fn blank_line(&self) -> String {
        blank(TIME_WIDTH)
    }

    pub fn data_lines(&self, cache: &SampleCache) -> Vec<String> {
        let cell = match cache.current() {
            Some(sample) => match sample.clock() {
                SampleClock::Wall => wall_clock(sample.end()),
                SampleClock::Uptime => elapsed(sample.end()),
            },
            None => fill(TIME_WIDTH),
        };
        vec![cell]
    }
}

fn wall_clock(unix_secs: f64) -> String {
    match Local.timestamp_opt(unix_secs as i64, 0).single() {
        Some(at) => at.format("%H:%M:%S").to_string(),
        None => fill(TIME_WIDTH),
    }
}

/// `H:MM:SS`, or plain seconds once the hours no longer fit.
fn elapsed(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return fill(TIME_WIDTH);
    }
    let total = secs as u64;
    let text = format!("{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60);
    if text.len() <= TIME_WIDTH {
        fit_text(&text, TIME_WIDTH, false, Align::Right)
    } else {
        fit(secs, TIME_WIDTH, 0, SECOND_UNITS)
    }
}
