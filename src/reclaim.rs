//! Reclaim controller
//!
//! A secondary slider over `[0, waking_hours]` that projects "what if I used
//! X hours instead" without touching the primary input. The candidate is
//! continuous, not snapped to the dial step.

use crate::derive::reclaim_projection;
use crate::error::LensError;
use crate::types::{InputState, ReclaimProjection, ReclaimState};
use tracing::debug;

/// Result of moving the reclaim slider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReclaimUpdate {
    /// Fresh projection, `None` until an age has been submitted
    pub projection: Option<ReclaimProjection>,
    /// Whether the "reclaimed" visual state is on after this update
    pub reclaimed_visible: bool,
    /// Whether that visual state flipped during this update
    pub toggled: bool,
}

/// Owns the candidate hours and the reclaimed visual flag
#[derive(Debug, Clone)]
pub struct ReclaimController {
    state: ReclaimState,
    waking_hours: f64,
    reclaimed_visible: bool,
}

impl ReclaimController {
    /// Start with the candidate equal to the current daily hours
    pub fn new(input: &InputState) -> Self {
        Self {
            state: ReclaimState {
                candidate_hours: input.daily_hours,
            },
            waking_hours: input.waking_hours,
            reclaimed_visible: false,
        }
    }

    pub fn state(&self) -> ReclaimState {
        self.state
    }

    pub fn reclaimed_visible(&self) -> bool {
        self.reclaimed_visible
    }

    /// Put the slider back on the current daily hours and recompute
    pub fn reset(&mut self, input: &InputState) -> ReclaimUpdate {
        self.state.candidate_hours = input.daily_hours;
        debug!(candidate_hours = input.daily_hours, "reclaim slider reset");
        self.refresh(input)
    }

    /// Move the slider.
    ///
    /// Values outside `[0, waking_hours]` or non-finite values are rejected and
    /// leave the candidate unchanged.
    pub fn set_candidate(
        &mut self,
        candidate_hours: f64,
        input: &InputState,
    ) -> Result<ReclaimUpdate, LensError> {
        if !candidate_hours.is_finite() || !(0.0..=self.waking_hours).contains(&candidate_hours) {
            return Err(LensError::InvalidHours(candidate_hours));
        }
        self.state.candidate_hours = candidate_hours;
        Ok(self.refresh(input))
    }

    /// Recompute the projection for the current candidate
    pub fn refresh(&mut self, input: &InputState) -> ReclaimUpdate {
        let projection = reclaim_projection(
            self.state.candidate_hours,
            input.daily_hours,
            input.years_left,
            input.waking_hours,
        );
        let visible = projection.is_some_and(|p| p.is_reclaimed());
        let toggled = visible != self.reclaimed_visible;
        self.reclaimed_visible = visible;

        ReclaimUpdate {
            projection,
            reclaimed_visible: visible,
            toggled,
        }
    }
}
