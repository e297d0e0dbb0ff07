//! Derivation engine
//!
//! Pure functions from the writable session state to every displayed
//! quantity. Nothing here caches; callers rebuild from `InputState` and
//! `ReclaimState` on every read so two stats can never disagree.
//!
//! Age-dependent outputs return `None` while no age has been submitted.

use crate::config::{LensConfig, OpportunityRates, SilhouetteMode};
use crate::types::{
    Derived, InputState, LifeGridPartition, OpportunityCosts, ReclaimProjection, ReclaimState,
    SilhouetteFill, TimeBreakdown, VisualFills, WeekKind,
};
use std::f64::consts::TAU;

/// Days in a display month
const DAYS_PER_MONTH: f64 = 30.0;

/// Days in a display year
const DAYS_PER_YEAR: f64 = 365.0;

/// Round to one decimal place (half away from zero)
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fraction of waking hours spent on screens.
///
/// Every visual fill derives from this one ratio.
pub fn fill_fraction(daily_hours: f64, waking_hours: f64) -> f64 {
    if waking_hours <= 0.0 {
        return 0.0;
    }
    daily_hours / waking_hours
}

/// Expand daily hours into weekly, monthly and yearly figures.
///
/// ```text
/// weekly        = daily * 7
/// monthly       = round(daily * 30)
/// monthly_days  = round(monthly / 24 * 10) / 10
/// yearly        = round(daily * 365)
/// yearly_days   = round(yearly / 24)
/// yearly_months = round(yearly_days / 30 * 10) / 10
/// ```
pub fn time_breakdown(daily_hours: f64) -> TimeBreakdown {
    let daily = daily_hours.max(0.0);
    let monthly = (daily * DAYS_PER_MONTH).round();
    let monthly_days = (monthly / 24.0 * 10.0).round() / 10.0;
    let yearly = (daily * DAYS_PER_YEAR).round();
    let yearly_days = (yearly / 24.0).round();
    let yearly_months = (yearly_days / DAYS_PER_MONTH * 10.0).round() / 10.0;

    TimeBreakdown {
        daily,
        weekly: daily * 7.0,
        monthly: monthly as u32,
        monthly_days,
        yearly: yearly as u32,
        yearly_days: yearly_days as u32,
        yearly_months,
    }
}

/// Convert a year of screen time into opportunity-cost equivalents.
///
/// Books and walks floor to whole units; languages round to one decimal.
pub fn opportunity_costs(daily_hours: f64, rates: &OpportunityRates) -> OpportunityCosts {
    let yearly_hours = daily_hours.max(0.0) * DAYS_PER_YEAR;

    OpportunityCosts {
        books: (yearly_hours / rates.hours_per_book).floor() as u32,
        languages: round_tenth(yearly_hours / rates.hours_per_language),
        walks: (yearly_hours / rates.hours_per_walk).floor() as u32,
    }
}

/// Every visual fill for the given daily hours
pub fn visual_fills(daily_hours: f64, config: &LensConfig) -> VisualFills {
    fills_for_fraction(
        fill_fraction(daily_hours, config.waking_hours),
        daily_hours,
        config,
    )
}

fn fills_for_fraction(fraction: f64, daily_hours: f64, config: &LensConfig) -> VisualFills {
    VisualFills {
        fraction,
        dial_arc_radians: fraction * TAU,
        mini_clock_radians: fraction * TAU,
        calendar_percent: fraction * 100.0,
        year_bar_percent: fraction * 100.0,
        silhouette_height: fraction * config.silhouette_height,
        active_ticks: daily_hours.max(0.0).floor() as u32,
    }
}

/// Partition the life calendar grid for a submitted age.
///
/// Returns `None` when no age has been submitted.
pub fn life_grid_partition(
    age: Option<u32>,
    daily_hours: f64,
    config: &LensConfig,
) -> Option<LifeGridPartition> {
    grid_for_fraction(age, fill_fraction(daily_hours, config.waking_hours), config)
}

fn grid_for_fraction(
    age: Option<u32>,
    fraction: f64,
    config: &LensConfig,
) -> Option<LifeGridPartition> {
    let age = age?;
    let total_weeks = config.total_weeks();
    let lived_weeks = age.saturating_mul(config.weeks_per_year).min(total_weeks);
    let remaining_weeks = total_weeks - lived_weeks;

    let fraction = fraction.clamp(0.0, 1.0);
    let scroll_weeks = ((f64::from(remaining_weeks) * fraction).round() as u32).min(remaining_weeks);

    Some(LifeGridPartition {
        total_weeks,
        lived_weeks,
        remaining_weeks,
        scroll_weeks,
        free_weeks: remaining_weeks - scroll_weeks,
    })
}

impl LifeGridPartition {
    /// Classify one grid index; `None` when the index is outside the grid.
    ///
    /// The scroll band is anchored at the far end of the grid.
    pub fn classify(&self, index: u32) -> Option<WeekKind> {
        if index >= self.total_weeks {
            return None;
        }
        if index < self.lived_weeks {
            return Some(WeekKind::Lived);
        }
        let weeks_until_end = self.total_weeks - 1 - index;
        if weeks_until_end < self.scroll_weeks {
            Some(WeekKind::Scroll)
        } else {
            Some(WeekKind::Free)
        }
    }

    /// Classification of every cell in index order
    pub fn cells(&self) -> impl Iterator<Item = WeekKind> + '_ {
        (0..self.total_weeks).filter_map(move |i| self.classify(i))
    }

    /// Grid rows of `columns` cells, top row first.
    ///
    /// Index 0 sits at the bottom-left, so the lived band ends up at the bottom
    /// and the scroll band at the top.
    pub fn rows_top_down(&self, columns: usize) -> Vec<Vec<WeekKind>> {
        let columns = columns.max(1);
        let cells: Vec<WeekKind> = self.cells().collect();
        let mut rows: Vec<Vec<WeekKind>> = cells.chunks(columns).map(<[_]>::to_vec).collect();
        rows.reverse();
        rows
    }
}

/// Years of the remaining life spent on screens at `daily_hours`
pub fn screen_years(years_left: Option<f64>, daily_hours: f64, waking_hours: f64) -> Option<f64> {
    years_left.map(|years| years * fill_fraction(daily_hours, waking_hours))
}

/// Project how many years would be reclaimed at `candidate_hours`.
///
/// Returns `None` when no age (and so no years-left figure) is available.
pub fn reclaim_projection(
    candidate_hours: f64,
    daily_hours: f64,
    years_left: Option<f64>,
    waking_hours: f64,
) -> Option<ReclaimProjection> {
    let years_left = years_left?;
    let original_years = years_left * fill_fraction(daily_hours, waking_hours);
    let new_years = years_left * fill_fraction(candidate_hours, waking_hours);

    Some(ReclaimProjection {
        candidate_hours,
        original_years,
        new_years,
        reclaimed_years: original_years - new_years,
    })
}

/// Fill levels for the current and reclaimed silhouettes
pub fn silhouette_fill(
    projection: &ReclaimProjection,
    daily_hours: f64,
    years_left: f64,
    waking_hours: f64,
    config: &LensConfig,
) -> SilhouetteFill {
    let current_hours = match config.silhouette {
        SilhouetteMode::TrackCandidate => projection.candidate_hours,
        SilhouetteMode::FreezeOriginal => daily_hours,
    };
    let current_fraction = fill_fraction(current_hours, waking_hours).clamp(0.0, 1.0);
    let reclaimed_fraction = if years_left > 0.0 {
        (projection.reclaimed_years / years_left).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let height = config.silhouette_height;

    SilhouetteFill {
        current_fraction,
        reclaimed_fraction,
        current_y: height - height * current_fraction,
        reclaimed_y: height - height * reclaimed_fraction,
        reclaimed_visible: projection.is_reclaimed(),
    }
}

/// Single derivation entry point.
///
/// Every output uses `input.waking_hours`, so all fills agree with
/// `fill_fraction` even when the input was built against another config.
pub fn derive_all(input: &InputState, reclaim: &ReclaimState, config: &LensConfig) -> Derived {
    let daily = input.daily_hours;
    let waking = input.waking_hours;
    let fraction = fill_fraction(daily, waking);
    let reclaim_projection = reclaim_projection(
        reclaim.candidate_hours,
        daily,
        input.years_left,
        waking,
    );
    let silhouette = match (reclaim_projection.as_ref(), input.years_left) {
        (Some(projection), Some(years_left)) => {
            Some(silhouette_fill(projection, daily, years_left, waking, config))
        }
        _ => None,
    };

    Derived {
        time_breakdown: time_breakdown(daily),
        opportunity_costs: opportunity_costs(daily, &config.opportunity),
        fill_fraction: fraction,
        fills: fills_for_fraction(fraction, daily, config),
        screen_years: screen_years(input.years_left, daily, waking),
        life_grid: grid_for_fraction(input.age, fraction, config),
        reclaim: reclaim_projection,
        silhouette,
    }
}
