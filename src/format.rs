//! Display formatting
//!
//! Text for the numbers the page shows. Pluralization depends only on whether
//! the displayed (already rounded) quantity equals one.

use crate::derive::round_tenth;
use crate::stage::CounterSnap;
use crate::types::{Derived, LifeGridPartition, OpportunityCosts, ReclaimState, WeekKind};
use serde::Serialize;

/// Group an integer with thousands separators (`2920` -> `2,920`)
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One decimal place, rounding half away from zero
pub fn one_decimal(value: f64) -> String {
    format!("{:.1}", round_tenth(value))
}

/// Hours value as the dial shows it: `8`, `7.5`
pub fn hours(value: f64) -> String {
    let rounded = (value * 2.0).round() / 2.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

/// At most one decimal, dropping a trailing `.0`: `4`, `3.3`
pub fn tenths(value: f64) -> String {
    let rounded = round_tenth(value);
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

/// Counter text: `.5` only when needed for half steps, grouped whole numbers otherwise
pub fn counter(value: f64, snap: CounterSnap) -> String {
    let snapped = snap.snap(value.max(0.0));
    match snap {
        CounterSnap::Half if snapped.fract() != 0.0 => format!("{snapped:.1}"),
        _ => thousands(snapped.round() as u64),
    }
}

fn plural<'a>(is_one: bool, singular: &'a str, plural: &'a str) -> &'a str {
    if is_one {
        singular
    } else {
        plural
    }
}

pub fn books_label(books: u32) -> String {
    format!(
        "Read {} {}",
        thousands(u64::from(books)),
        plural(books == 1, "book", "books")
    )
}

pub fn languages_label(languages: f64) -> String {
    let shown = round_tenth(languages);
    format!(
        "Learned {} {} to conversational level",
        one_decimal(shown),
        plural(shown == 1.0, "language", "languages")
    )
}

pub fn walks_label(walks: u32) -> String {
    format!(
        "Walked the Camino de Santiago {} {}",
        thousands(u64::from(walks)),
        plural(walks == 1, "time", "times")
    )
}

/// Opportunity-cost lines in page order
pub fn opportunity_labels(costs: &OpportunityCosts) -> [String; 3] {
    [
        books_label(costs.books),
        languages_label(costs.languages),
        walks_label(costs.walks),
    ]
}

fn week_glyph(kind: WeekKind) -> char {
    match kind {
        WeekKind::Lived => '#',
        WeekKind::Scroll => '~',
        WeekKind::Free => '.',
    }
}

/// Text rendering of the life grid, one line per row, top row first
pub fn life_grid_text(partition: &LifeGridPartition, columns: usize) -> String {
    partition
        .rows_top_down(columns)
        .iter()
        .map(|row| row.iter().copied().map(week_glyph).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// All display strings for one derivation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Labels {
    pub daily_hours: String,
    pub weekly_hours: String,
    pub monthly_hours: String,
    pub monthly_days: String,
    pub yearly_hours: String,
    pub yearly_days: String,
    pub yearly_months: String,
    pub opportunities: [String; 3],
    pub reclaim_hours: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_years: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_weeks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reclaimed_years: Option<String>,
}

impl Labels {
    pub fn new(derived: &Derived, reclaim: &ReclaimState) -> Self {
        let t = &derived.time_breakdown;
        Self {
            daily_hours: hours(t.daily),
            weekly_hours: hours(t.weekly),
            monthly_hours: t.monthly.to_string(),
            monthly_days: format!("{}", t.monthly_days),
            yearly_hours: thousands(u64::from(t.yearly)),
            yearly_days: t.yearly_days.to_string(),
            yearly_months: format!("{}", t.yearly_months),
            opportunities: opportunity_labels(&derived.opportunity_costs),
            reclaim_hours: tenths(reclaim.candidate_hours),
            screen_years: derived
                .screen_years
                .map(|years| format!("{} years", one_decimal(years))),
            scroll_weeks: derived
                .life_grid
                .map(|grid| thousands(u64::from(grid.scroll_weeks))),
            reclaimed_years: derived.reclaim.map(|r| one_decimal(r.reclaimed_years)),
        }
    }
}
