//! Core data types
//!
//! This module defines the writable session state (`InputState`,
//! `ReclaimState`, `StageState`) and the derived outputs that flow from it.
//! Derived outputs are never stored by the engine; they are rebuilt from the
//! writable fields on every read.

use crate::config::LensConfig;
use serde::{Deserialize, Serialize};

/// Primary user input for the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Daily screen time in hours, within `[0, waking_hours]`, multiple of the step
    pub daily_hours: f64,
    /// Waking hours per day (configuration)
    pub waking_hours: f64,
    /// Life expectancy in years (configuration)
    pub life_expectancy: f64,
    /// Submitted age in whole years, absent until the user submits one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// `life_expectancy - age`, cached at submission time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_left: Option<f64>,
}

impl InputState {
    /// Fresh state with zero hours and no age
    pub fn new(config: &LensConfig) -> Self {
        Self {
            daily_hours: 0.0,
            waking_hours: config.waking_hours,
            life_expectancy: config.life_expectancy,
            age: None,
            years_left: None,
        }
    }

    /// Whether the age-dependent sections can be shown
    pub fn has_age(&self) -> bool {
        self.age.is_some()
    }
}

/// Hypothetical "what if" hours for the reclaim projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReclaimState {
    /// Candidate daily hours within `[0, waking_hours]`, continuous
    pub candidate_hours: f64,
}

/// Scrollytelling stages, in page order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Opportunity,
}

impl Stage {
    /// All stages in page order
    pub const ALL: [Stage; 5] = [
        Stage::Daily,
        Stage::Weekly,
        Stage::Monthly,
        Stage::Yearly,
        Stage::Opportunity,
    ];

    /// Position in page order, used to index per-stage arrays
    pub fn index(self) -> usize {
        match self {
            Stage::Daily => 0,
            Stage::Weekly => 1,
            Stage::Monthly => 2,
            Stage::Yearly => 3,
            Stage::Opportunity => 4,
        }
    }

    /// Stable lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Stage::Daily => "daily",
            Stage::Weekly => "weekly",
            Stage::Monthly => "monthly",
            Stage::Yearly => "yearly",
            Stage::Opportunity => "opportunity",
        }
    }
}

/// Per-stage scroll state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageState {
    /// Most recently entered stage, `None` before the first entry or after
    /// leaving the current stage
    pub current: Option<Stage>,
    /// Whether each stage is currently marked active
    pub active: [bool; 5],
    /// Whether the next entry into each stage fires its one-shot animation
    pub armed: [bool; 5],
    /// Continuous scroll progress through each stage's trigger region
    pub progress: [f64; 5],
}

impl Default for StageState {
    fn default() -> Self {
        Self {
            current: None,
            active: [false; 5],
            armed: [true; 5],
            progress: [0.0; 5],
        }
    }
}

impl StageState {
    pub fn is_active(&self, stage: Stage) -> bool {
        self.active[stage.index()]
    }

    pub fn is_armed(&self, stage: Stage) -> bool {
        self.armed[stage.index()]
    }

    pub fn progress(&self, stage: Stage) -> f64 {
        self.progress[stage.index()]
    }
}

/// Daily hours expanded to longer periods, with display rounding applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBreakdown {
    pub daily: f64,
    pub weekly: f64,
    /// Hours per 30-day month, rounded to the nearest hour
    pub monthly: u32,
    /// Monthly hours as 24h days, one decimal
    pub monthly_days: f64,
    /// Hours per year, rounded to the nearest hour
    pub yearly: u32,
    /// Yearly hours as whole 24h days
    pub yearly_days: u32,
    /// Yearly days as 30-day months, one decimal
    pub yearly_months: f64,
}

/// What a year of screen time could have bought instead
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpportunityCosts {
    /// Whole books read
    pub books: u32,
    /// Languages learned to conversational level, one decimal
    pub languages: f64,
    /// Whole long-distance walks completed
    pub walks: u32,
}

/// Classification of one week in the life calendar grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekKind {
    Lived,
    Scroll,
    Free,
}

/// Three-way partition of the life calendar grid
///
/// Indices `[0, lived_weeks)` are lived, the last `scroll_weeks` indices
/// before `total_weeks` are scroll time, everything in between is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeGridPartition {
    pub total_weeks: u32,
    pub lived_weeks: u32,
    pub remaining_weeks: u32,
    pub scroll_weeks: u32,
    pub free_weeks: u32,
}

/// Years of remaining life spent on screens, now versus the candidate hours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReclaimProjection {
    pub candidate_hours: f64,
    pub original_years: f64,
    pub new_years: f64,
    pub reclaimed_years: f64,
}

impl ReclaimProjection {
    /// Whether the "reclaimed" visual state should be on
    pub fn is_reclaimed(&self) -> bool {
        self.reclaimed_years > 0.0
    }
}

/// Every visual fill on the page, all driven by one fill fraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualFills {
    pub fraction: f64,
    /// Sweep of the main dial arc and handle, radians
    pub dial_arc_radians: f64,
    /// Sweep of every mini clock, radians
    pub mini_clock_radians: f64,
    /// Fill of each of the 30 calendar days, percent
    pub calendar_percent: f64,
    /// Width of the year bar, percent
    pub year_bar_percent: f64,
    /// Filled height of the body silhouette, view units
    pub silhouette_height: f64,
    /// Number of highlighted hour ticks on the dial
    pub active_ticks: u32,
}

/// Fill levels for the two reclaim silhouettes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilhouetteFill {
    /// Fraction filled on the "current" silhouette
    pub current_fraction: f64,
    /// Fraction filled on the "reclaimed" overlay
    pub reclaimed_fraction: f64,
    /// Top edge of the current fill rectangle, view units
    pub current_y: f64,
    /// Top edge of the reclaimed fill rectangle, view units
    pub reclaimed_y: f64,
    /// Whether the reclaimed overlay is visible
    pub reclaimed_visible: bool,
}

/// Output of the single derivation entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    pub time_breakdown: TimeBreakdown,
    pub opportunity_costs: OpportunityCosts,
    pub fill_fraction: f64,
    pub fills: VisualFills,
    /// Years of remaining life on screens at the current daily hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_years: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_grid: Option<LifeGridPartition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reclaim: Option<ReclaimProjection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silhouette: Option<SilhouetteFill>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_indices_follow_page_order() {
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::Opportunity).unwrap();
        assert_eq!(json, "\"opportunity\"");
    }

    #[test]
    fn test_new_input_state_has_no_age() {
        let state = InputState::new(&LensConfig::default());
        assert_eq!(state.daily_hours, 0.0);
        assert!(!state.has_age());
        assert!(state.years_left.is_none());
    }

    #[test]
    fn test_stage_state_starts_armed() {
        let state = StageState::default();
        assert!(Stage::ALL.iter().all(|s| state.is_armed(*s)));
        assert!(Stage::ALL.iter().all(|s| !state.is_active(*s)));
        assert!(state.current.is_none());
    }
}
