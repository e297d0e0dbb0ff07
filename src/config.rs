//! Session configuration
//!
//! All constants the derivations depend on live here. A `LensConfig` is fixed
//! when the engine is built and never mutated afterwards.

use crate::error::LensError;
use serde::{Deserialize, Serialize};

/// Default waking hours per day
pub const DEFAULT_WAKING_HOURS: f64 = 16.0;

/// Default life expectancy in years
pub const DEFAULT_LIFE_EXPECTANCY: f64 = 77.0;

/// Years covered by the life calendar grid
pub const DEFAULT_GRID_YEARS: u32 = 80;

/// Weeks per year used by the life calendar grid
pub const DEFAULT_WEEKS_PER_YEAR: u32 = 52;

/// Dial quantization step in hours
pub const DEFAULT_HOURS_STEP: f64 = 0.5;

/// Height of the silhouette drawing in view units
pub const DEFAULT_SILHOUETTE_HEIGHT: f64 = 500.0;

/// Hours needed for each opportunity-cost equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRates {
    /// Hours to read one average-length book
    pub hours_per_book: f64,
    /// Hours to reach conversational level in one language
    pub hours_per_language: f64,
    /// Hours to complete one long-distance walk
    pub hours_per_walk: f64,
}

impl OpportunityRates {
    /// ~90k words at ~238 wpm per book, 600h per easy language, ~800 km walk
    pub fn reading_pace() -> Self {
        Self {
            hours_per_book: 6.0,
            hours_per_language: 600.0,
            hours_per_walk: 200.0,
        }
    }

    /// Slower reading, faster language immersion
    pub fn slow_reader() -> Self {
        Self {
            hours_per_book: 7.0,
            hours_per_language: 480.0,
            hours_per_walk: 200.0,
        }
    }
}

impl Default for OpportunityRates {
    fn default() -> Self {
        Self::reading_pace()
    }
}

/// How the "current" silhouette behaves while the reclaim slider moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SilhouetteMode {
    /// The current silhouette follows the slider value
    #[default]
    TrackCandidate,
    /// The current silhouette stays at the original daily hours; only the
    /// reclaimed overlay moves
    FreezeOriginal,
}

/// Durations (seconds) of the time-based reveal animations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationTimings {
    pub counter_secs: f64,
    pub scrolly_clock_secs: f64,
    pub week_clock_secs: f64,
    pub week_clock_stagger_secs: f64,
    pub calendar_secs: f64,
    pub year_bar_secs: f64,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            counter_secs: 0.8,
            scrolly_clock_secs: 1.0,
            week_clock_secs: 0.6,
            week_clock_stagger_secs: 0.1,
            calendar_secs: 1.2,
            year_bar_secs: 1.2,
        }
    }
}

/// Session-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    pub waking_hours: f64,
    pub life_expectancy: f64,
    pub grid_years: u32,
    pub weeks_per_year: u32,
    pub hours_step: f64,
    pub silhouette_height: f64,
    pub opportunity: OpportunityRates,
    pub silhouette: SilhouetteMode,
    pub animation: AnimationTimings,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            waking_hours: DEFAULT_WAKING_HOURS,
            life_expectancy: DEFAULT_LIFE_EXPECTANCY,
            grid_years: DEFAULT_GRID_YEARS,
            weeks_per_year: DEFAULT_WEEKS_PER_YEAR,
            hours_step: DEFAULT_HOURS_STEP,
            silhouette_height: DEFAULT_SILHOUETTE_HEIGHT,
            opportunity: OpportunityRates::default(),
            silhouette: SilhouetteMode::default(),
            animation: AnimationTimings::default(),
        }
    }
}

impl LensConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, LensError> {
        let config: LensConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style override of the opportunity-cost rates
    pub fn with_opportunity(mut self, rates: OpportunityRates) -> Self {
        self.opportunity = rates;
        self
    }

    /// Builder-style override of the silhouette behavior
    pub fn with_silhouette(mut self, mode: SilhouetteMode) -> Self {
        self.silhouette = mode;
        self
    }

    /// Total cells in the life calendar grid
    pub fn total_weeks(&self) -> u32 {
        self.grid_years * self.weeks_per_year
    }

    /// Check every constant the derivations divide by or range over.
    pub fn validate(&self) -> Result<(), LensError> {
        positive("waking_hours", self.waking_hours)?;
        positive("life_expectancy", self.life_expectancy)?;
        positive("hours_step", self.hours_step)?;
        positive("silhouette_height", self.silhouette_height)?;
        positive("opportunity.hours_per_book", self.opportunity.hours_per_book)?;
        positive(
            "opportunity.hours_per_language",
            self.opportunity.hours_per_language,
        )?;
        positive("opportunity.hours_per_walk", self.opportunity.hours_per_walk)?;

        if self.waking_hours > 24.0 {
            return Err(LensError::InvalidConfig(format!(
                "waking_hours {} exceeds 24",
                self.waking_hours
            )));
        }

        let steps = self.waking_hours / self.hours_step;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(LensError::InvalidConfig(format!(
                "hours_step {} does not divide waking_hours {}",
                self.hours_step, self.waking_hours
            )));
        }

        if self.grid_years == 0 || self.weeks_per_year == 0 {
            return Err(LensError::InvalidConfig(
                "life grid must have at least one week".to_string(),
            ));
        }

        if self.life_expectancy > f64::from(self.grid_years) {
            return Err(LensError::InvalidConfig(format!(
                "life_expectancy {} exceeds grid_years {}",
                self.life_expectancy, self.grid_years
            )));
        }

        let timings = &self.animation;
        for (name, value) in [
            ("animation.counter_secs", timings.counter_secs),
            ("animation.scrolly_clock_secs", timings.scrolly_clock_secs),
            ("animation.week_clock_secs", timings.week_clock_secs),
            ("animation.calendar_secs", timings.calendar_secs),
            ("animation.year_bar_secs", timings.year_bar_secs),
        ] {
            positive(name, value)?;
        }
        if !timings.week_clock_stagger_secs.is_finite() || timings.week_clock_stagger_secs < 0.0 {
            return Err(LensError::InvalidConfig(
                "animation.week_clock_stagger_secs must be >= 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), LensError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LensError::InvalidConfig(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LensConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.waking_hours, 16.0);
        assert_eq!(config.life_expectancy, 77.0);
        assert_eq!(config.total_weeks(), 4160);
        assert_eq!(config.silhouette, SilhouetteMode::TrackCandidate);
    }

    #[test]
    fn test_presets_differ_only_in_book_and_language_rates() {
        let a = OpportunityRates::reading_pace();
        let b = OpportunityRates::slow_reader();
        assert_eq!(a.hours_per_book, 6.0);
        assert_eq!(b.hours_per_book, 7.0);
        assert_eq!(a.hours_per_language, 600.0);
        assert_eq!(b.hours_per_language, 480.0);
        assert_eq!(a.hours_per_walk, b.hours_per_walk);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = LensConfig::from_json(
            r#"{ "life_expectancy": 80, "silhouette": "freeze_original" }"#,
        )
        .unwrap();
        assert_eq!(config.life_expectancy, 80.0);
        assert_eq!(config.waking_hours, 16.0);
        assert_eq!(config.silhouette, SilhouetteMode::FreezeOriginal);
    }

    #[test]
    fn test_rejects_zero_book_rate() {
        let mut config = LensConfig::default();
        config.opportunity.hours_per_book = 0.0;
        assert!(matches!(
            config.validate(),
            Err(LensError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_step_not_dividing_waking_hours() {
        let config = LensConfig {
            hours_step: 0.3,
            ..LensConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_life_expectancy_beyond_grid() {
        let config = LensConfig {
            life_expectancy: 90.0,
            ..LensConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            LensConfig::from_json("not json"),
            Err(LensError::JsonError(_))
        ));
    }
}
