//! Application state and event loop
//!
//! `LensEngine` is the single owner of the session state. External events
//! (pointer samples, field edits, scroll triggers, frame ticks, resizes) are
//! typed messages handled one at a time in arrival order; each call returns the
//! effects the presentation layer should apply.
//!
//! Only `daily_hours`, `age` and the reclaim candidate are writable, and only
//! through the mutators here. Everything else is derived on read.

use crate::config::LensConfig;
use crate::derive::{derive_all, life_grid_partition};
use crate::dial::{parse_hours_entry, DialController, DialGeometry, DialMode, DialSignal, PointerEvent};
use crate::error::LensError;
use crate::format::{self, Labels};
use crate::reclaim::{ReclaimController, ReclaimUpdate};
use crate::stage::{
    CounterDisplay, ItemEvent, OpportunityItem, ScrollEvent, StageActivation, StageAnimation,
    StageCoordinator, StageTransition,
};
use crate::tween::{FrameScheduler, Tween, TweenFrame, TweenScheduler, TweenTarget};
use crate::types::{Derived, InputState, LifeGridPartition, ReclaimState, StageState};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Browser viewport size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// One percent of the viewport height, the page's `vh` unit
    pub fn vh(&self) -> f64 {
        self.height * 0.01
    }
}

/// Inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LensEvent {
    /// Pointer or touch sample on the dial
    Pointer(PointerEvent),
    /// Text typed into the numeric hours field
    HoursEntered { text: String },
    /// Text submitted from the age field
    AgeEntered { text: String },
    /// Reclaim slider moved
    ReclaimChanged { hours: f64 },
    /// Scroll trigger for a stage region
    Scroll { event: ScrollEvent },
    /// Scroll trigger for an opportunity row
    Item { event: ItemEvent },
    /// Frame tick
    Tick { dt_ms: u64 },
    /// Viewport resized; optionally carries the dial's new layout
    Resize {
        width: f64,
        height: f64,
        #[serde(default)]
        dial: Option<DialGeometry>,
    },
}

/// Outbound instruction for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LensEffect {
    HoursChanged {
        daily_hours: f64,
    },
    AgeAccepted {
        age: u32,
        years_left: f64,
    },
    /// Age-dependent sections shown for the first time
    SectionsRevealed,
    GridRegenerated {
        partition: LifeGridPartition,
    },
    ReclaimUpdated {
        candidate_hours: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        reclaimed_years: Option<f64>,
    },
    ReclaimedVisibility {
        visible: bool,
    },
    /// Input refused; nothing changed
    Rejected {
        code: &'static str,
        reason: String,
    },
    ScrollPromptShown,
    Stage {
        transition: StageTransition,
    },
    ItemHighlight {
        item: OpportunityItem,
        on: bool,
    },
    AnimationStarted {
        target: TweenTarget,
        tween: Tween,
    },
    CounterFrame {
        value: f64,
        text: String,
        unit: &'static str,
    },
    Frame {
        frame: TweenFrame,
    },
    GeometryInvalidated {
        vh: f64,
    },
}

/// Owned application state
#[derive(Debug)]
pub struct LensEngine<S: TweenScheduler = FrameScheduler> {
    config: LensConfig,
    input: InputState,
    dial: DialController,
    reclaim: ReclaimController,
    stages: StageCoordinator,
    tweens: S,
    counter: CounterDisplay,
    viewport: Option<Viewport>,
    revealed: bool,
    prompt_shown: bool,
    session_id: Uuid,
}

impl Default for LensEngine<FrameScheduler> {
    fn default() -> Self {
        Self::build(LensConfig::default(), FrameScheduler::new())
    }
}

impl LensEngine<FrameScheduler> {
    /// Engine with a validated configuration and the frame-driven scheduler
    pub fn new(config: LensConfig) -> Result<Self, LensError> {
        Self::with_scheduler(config, FrameScheduler::new())
    }
}

impl<S: TweenScheduler> LensEngine<S> {
    /// Engine driving animations through a caller-supplied scheduler
    pub fn with_scheduler(config: LensConfig, scheduler: S) -> Result<Self, LensError> {
        config.validate()?;
        Ok(Self::build(config, scheduler))
    }

    fn build(config: LensConfig, tweens: S) -> Self {
        let input = InputState::new(&config);
        let session_id = Uuid::new_v4();
        debug!(%session_id, "lens session started");
        Self {
            dial: DialController::new(&config),
            reclaim: ReclaimController::new(&input),
            stages: StageCoordinator::new(),
            counter: CounterDisplay::default(),
            viewport: None,
            revealed: false,
            prompt_shown: false,
            session_id,
            input,
            tweens,
            config,
        }
    }

    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    pub fn reclaim_state(&self) -> ReclaimState {
        self.reclaim.state()
    }

    pub fn stage_state(&self) -> &StageState {
        self.stages.state()
    }

    pub fn dial_mode(&self) -> DialMode {
        self.dial.mode()
    }

    pub fn dial_geometry(&self) -> &DialGeometry {
        self.dial.geometry()
    }

    pub fn counter(&self) -> &CounterDisplay {
        &self.counter
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Whether the age-dependent sections have been shown
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn reclaimed_visible(&self) -> bool {
        self.reclaim.reclaimed_visible()
    }

    pub fn highlighted_items(&self) -> Vec<OpportunityItem> {
        OpportunityItem::ALL
            .into_iter()
            .filter(|item| self.stages.is_highlighted(*item))
            .collect()
    }

    pub fn scheduler(&self) -> &S {
        &self.tweens
    }

    /// Rebuild every derived output from the current state
    pub fn derive_all(&self) -> Derived {
        derive_all(&self.input, &self.reclaim.state(), &self.config)
    }

    /// Display strings for the current state
    pub fn labels(&self) -> Labels {
        Labels::new(&self.derive_all(), &self.reclaim.state())
    }

    /// Process one inbound message
    pub fn handle(&mut self, event: LensEvent) -> Vec<LensEffect> {
        let mut effects = Vec::new();
        match event {
            LensEvent::Pointer(pointer) => self.on_pointer(&pointer, &mut effects),
            LensEvent::HoursEntered { text } => {
                let result = self.enter_daily_hours_inner(&text, &mut effects);
                reject_on_err(result, &mut effects);
            }
            LensEvent::AgeEntered { text } => {
                let result = self.submit_age_text_inner(&text, &mut effects);
                reject_on_err(result, &mut effects);
            }
            LensEvent::ReclaimChanged { hours } => {
                let result = self.set_reclaim_inner(hours, &mut effects);
                reject_on_err(result, &mut effects);
            }
            LensEvent::Scroll { event } => self.on_scroll(event, &mut effects),
            LensEvent::Item { event } => {
                if self.stages.handle_item(event) {
                    let (item, on) = match event {
                        ItemEvent::Enter { item } => (item, true),
                        ItemEvent::LeaveBack { item } => (item, false),
                    };
                    effects.push(LensEffect::ItemHighlight { item, on });
                }
            }
            LensEvent::Tick { dt_ms } => self.on_tick(Duration::from_millis(dt_ms), &mut effects),
            LensEvent::Resize {
                width,
                height,
                dial,
            } => {
                let result = self.on_resize(width, height, dial, &mut effects);
                reject_on_err(result, &mut effects);
            }
        }
        effects
    }

    /// Write daily hours directly; out-of-range values are clamped and snapped.
    ///
    /// Returns the effects of the write, empty when the stored value is unchanged.
    pub fn set_daily_hours(&mut self, value: f64) -> Result<Vec<LensEffect>, LensError> {
        let mut effects = Vec::new();
        let hours = self.dial.hours_for_entry(value)?;
        self.write_hours(hours, &mut effects);
        Ok(effects)
    }

    /// Parse and write the numeric hours field
    pub fn enter_daily_hours(&mut self, text: &str) -> Result<Vec<LensEffect>, LensError> {
        let mut effects = Vec::new();
        self.enter_daily_hours_inner(text, &mut effects)?;
        Ok(effects)
    }

    /// Submit an age. On success `input_state().years_left` holds the cached value.
    pub fn submit_age(&mut self, age: i64) -> Result<Vec<LensEffect>, LensError> {
        let mut effects = Vec::new();
        self.submit_age_inner(age, &mut effects)?;
        Ok(effects)
    }

    /// Parse and submit the age field
    pub fn submit_age_text(&mut self, text: &str) -> Result<Vec<LensEffect>, LensError> {
        let mut effects = Vec::new();
        self.submit_age_text_inner(text, &mut effects)?;
        Ok(effects)
    }

    /// Move the reclaim slider
    pub fn set_reclaim_candidate(&mut self, hours: f64) -> Result<Vec<LensEffect>, LensError> {
        let mut effects = Vec::new();
        self.set_reclaim_inner(hours, &mut effects)?;
        Ok(effects)
    }

    fn on_pointer(&mut self, pointer: &PointerEvent, effects: &mut Vec<LensEffect>) {
        match self.dial.handle(pointer, self.input.daily_hours) {
            Some(DialSignal::Hours(hours)) => {
                self.write_hours(hours, effects);
            }
            Some(DialSignal::Released) => {
                if !self.prompt_shown && self.input.daily_hours > 0.0 {
                    self.prompt_shown = true;
                    effects.push(LensEffect::ScrollPromptShown);
                }
            }
            None => {}
        }
    }

    fn enter_daily_hours_inner(
        &mut self,
        text: &str,
        effects: &mut Vec<LensEffect>,
    ) -> Result<(), LensError> {
        let value = parse_hours_entry(text)?;
        let hours = self.dial.hours_for_entry(value)?;
        self.write_hours(hours, effects);
        Ok(())
    }

    fn write_hours(&mut self, hours: f64, effects: &mut Vec<LensEffect>) {
        if hours == self.input.daily_hours {
            return;
        }
        self.input.daily_hours = hours;
        debug!(daily_hours = hours, "daily hours updated");
        effects.push(LensEffect::HoursChanged { daily_hours: hours });

        // candidate follows daily hours; effects only once the slider is shown
        let update = self.reclaim.reset(&self.input);
        if self.revealed {
            if let Some(partition) =
                life_grid_partition(self.input.age, hours, &self.config)
            {
                effects.push(LensEffect::GridRegenerated { partition });
            }
            push_reclaim(update, self.reclaim.state(), effects);
        }
    }

    fn submit_age_text_inner(
        &mut self,
        text: &str,
        effects: &mut Vec<LensEffect>,
    ) -> Result<(), LensError> {
        let age: i64 = text
            .trim()
            .parse()
            .map_err(|_| LensError::NonNumeric(text.to_string()))?;
        self.submit_age_inner(age, effects)
    }

    fn submit_age_inner(
        &mut self,
        age: i64,
        effects: &mut Vec<LensEffect>,
    ) -> Result<(), LensError> {
        let life_expectancy = self.config.life_expectancy;
        let accepted = u32::try_from(age)
            .ok()
            .filter(|a| *a > 0 && f64::from(*a) < life_expectancy)
            .ok_or(LensError::InvalidAge {
                age,
                life_expectancy,
            })?;

        let years_left = life_expectancy - f64::from(accepted);
        self.input.age = Some(accepted);
        self.input.years_left = Some(years_left);
        debug!(age = accepted, years_left, "age accepted");

        effects.push(LensEffect::AgeAccepted {
            age: accepted,
            years_left,
        });
        if let Some(partition) =
            life_grid_partition(self.input.age, self.input.daily_hours, &self.config)
        {
            effects.push(LensEffect::GridRegenerated { partition });
        }
        if !self.revealed {
            self.revealed = true;
            effects.push(LensEffect::SectionsRevealed);
        }

        let update = self.reclaim.reset(&self.input);
        push_reclaim(update, self.reclaim.state(), effects);
        Ok(())
    }

    fn set_reclaim_inner(
        &mut self,
        hours: f64,
        effects: &mut Vec<LensEffect>,
    ) -> Result<(), LensError> {
        let update = self.reclaim.set_candidate(hours, &self.input)?;
        push_reclaim(update, self.reclaim.state(), effects);
        Ok(())
    }

    fn on_scroll(&mut self, event: ScrollEvent, effects: &mut Vec<LensEffect>) {
        let Some(transition) = self.stages.handle(event, &self.input, &self.config) else {
            return;
        };
        effects.push(LensEffect::Stage { transition });
        if let StageTransition::Activated(activation) = transition {
            self.start_stage_animations(&activation, effects);
        }
    }

    fn start_stage_animations(
        &mut self,
        activation: &StageActivation,
        effects: &mut Vec<LensEffect>,
    ) {
        let counter_tween = self
            .counter
            .retarget(&activation.counter, self.config.animation.counter_secs);
        self.start_tween(TweenTarget::Counter, counter_tween, effects);

        match activation.animation {
            StageAnimation::ScrollyClock {
                target_radians,
                duration_secs,
            } => {
                let tween = Tween::new(0.0, target_radians, duration_secs);
                self.start_tween(TweenTarget::ScrollyClock, tween, effects);
            }
            StageAnimation::WeekClocks {
                count,
                target_radians,
                duration_secs,
                stagger_secs,
            } => {
                for index in 0..count {
                    let tween = Tween::new(0.0, target_radians, duration_secs)
                        .with_delay(f64::from(index) * stagger_secs);
                    self.start_tween(TweenTarget::WeekClock { index }, tween, effects);
                }
            }
            StageAnimation::CalendarFill {
                target_percent,
                duration_secs,
                ..
            } => {
                let tween = Tween::new(0.0, target_percent, duration_secs);
                self.start_tween(TweenTarget::CalendarFill, tween, effects);
            }
            StageAnimation::YearBar {
                target_percent,
                duration_secs,
            } => {
                let tween = Tween::new(0.0, target_percent, duration_secs);
                self.start_tween(TweenTarget::YearBar, tween, effects);
            }
            StageAnimation::None => {}
        }
    }

    fn start_tween(&mut self, target: TweenTarget, tween: Tween, effects: &mut Vec<LensEffect>) {
        self.tweens.start(target, tween);
        effects.push(LensEffect::AnimationStarted { target, tween });
    }

    fn on_tick(&mut self, dt: Duration, effects: &mut Vec<LensEffect>) {
        for frame in self.tweens.advance(dt) {
            if frame.target == TweenTarget::Counter {
                let value = self.counter.apply(frame.value);
                effects.push(LensEffect::CounterFrame {
                    value,
                    text: format::counter(value, self.counter.snap),
                    unit: self.counter.unit,
                });
            } else {
                effects.push(LensEffect::Frame { frame });
            }
        }
    }

    fn on_resize(
        &mut self,
        width: f64,
        height: f64,
        dial: Option<DialGeometry>,
        effects: &mut Vec<LensEffect>,
    ) -> Result<(), LensError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(LensError::InvalidConfig(format!(
                "viewport {width}x{height} must be positive"
            )));
        }
        let viewport = Viewport { width, height };
        self.viewport = Some(viewport);
        if let Some(geometry) = dial {
            self.dial.set_geometry(geometry);
        }
        debug!(width, height, "viewport geometry invalidated");
        effects.push(LensEffect::GeometryInvalidated { vh: viewport.vh() });
        Ok(())
    }
}

fn push_reclaim(update: ReclaimUpdate, state: ReclaimState, effects: &mut Vec<LensEffect>) {
    effects.push(LensEffect::ReclaimUpdated {
        candidate_hours: state.candidate_hours,
        reclaimed_years: update.projection.map(|p| p.reclaimed_years),
    });
    if update.toggled {
        effects.push(LensEffect::ReclaimedVisibility {
            visible: update.reclaimed_visible,
        });
    }
}

fn reject_on_err(result: Result<(), LensError>, effects: &mut Vec<LensEffect>) {
    if let Err(err) = result {
        debug!(code = err.code(), %err, "input rejected");
        effects.push(LensEffect::Rejected {
            code: err.code(),
            reason: err.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dial::GesturePhase;
    use crate::types::Stage;
    use pretty_assertions::assert_eq;

    fn engine() -> LensEngine {
        LensEngine::new(LensConfig::default()).unwrap()
    }

    fn scroll(event: ScrollEvent) -> LensEvent {
        LensEvent::Scroll { event }
    }

    fn count_stage_activations(effects: &[LensEffect]) -> usize {
        effects
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    LensEffect::Stage {
                        transition: StageTransition::Activated(_)
                    }
                )
            })
            .count()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = LensConfig {
            waking_hours: 0.0,
            ..LensConfig::default()
        };
        assert!(LensEngine::new(config).is_err());
    }

    #[test]
    fn test_age_validation_bounds() {
        let mut engine = engine();
        for bad in [0, 77, 80, -5] {
            assert!(matches!(
                engine.submit_age(bad),
                Err(LensError::InvalidAge { .. })
            ));
            assert!(engine.input_state().age.is_none());
            assert!(!engine.is_revealed());
        }

        let effects = engine.submit_age(40).unwrap();
        assert!(effects.contains(&LensEffect::AgeAccepted {
            age: 40,
            years_left: 37.0
        }));
        assert_eq!(engine.input_state().age, Some(40));
        assert_eq!(engine.input_state().years_left, Some(37.0));
    }

    #[test]
    fn test_rejected_age_has_no_cascade() {
        let mut engine = engine();
        let effects = engine.handle(LensEvent::AgeEntered {
            text: "77".to_string(),
        });
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            effects[0],
            LensEffect::Rejected {
                code: "invalid_age",
                ..
            }
        ));

        let effects = engine.handle(LensEvent::AgeEntered {
            text: "forty".to_string(),
        });
        assert!(matches!(
            effects[0],
            LensEffect::Rejected {
                code: "non_numeric",
                ..
            }
        ));
        assert!(engine.input_state().age.is_none());
    }

    #[test]
    fn test_age_submission_reveals_once_and_regenerates_grid() {
        let mut engine = engine();
        engine.set_daily_hours(8.0).unwrap();

        let effects = engine.handle(LensEvent::AgeEntered {
            text: "30".to_string(),
        });
        assert!(effects.contains(&LensEffect::SectionsRevealed));
        let grid = effects.iter().find_map(|e| match e {
            LensEffect::GridRegenerated { partition } => Some(*partition),
            _ => None,
        });
        assert_eq!(grid.map(|g| g.scroll_weeks), Some(1300));

        let effects = engine.handle(LensEvent::AgeEntered {
            text: "40".to_string(),
        });
        assert!(!effects.contains(&LensEffect::SectionsRevealed));
        let grid = effects.iter().find_map(|e| match e {
            LensEffect::GridRegenerated { partition } => Some(*partition),
            _ => None,
        });
        assert_eq!(grid.map(|g| g.lived_weeks), Some(2080));
        assert_eq!(engine.input_state().years_left, Some(37.0));
    }

    #[test]
    fn test_reclaim_resets_to_daily_hours_on_reveal() {
        let mut engine = engine();
        engine.set_daily_hours(6.0).unwrap();
        engine.submit_age(40).unwrap();
        assert_eq!(engine.reclaim_state().candidate_hours, 6.0);

        engine.set_reclaim_candidate(2.0).unwrap();
        assert!(engine.reclaimed_visible());

        // changing the primary input while revealed re-initializes the slider
        engine.set_daily_hours(7.0).unwrap();
        assert_eq!(engine.reclaim_state().candidate_hours, 7.0);
        assert!(!engine.reclaimed_visible());
    }

    #[test]
    fn test_reclaim_does_not_touch_primary_input() {
        let mut engine = engine();
        engine.set_daily_hours(8.0).unwrap();
        engine.submit_age(40).unwrap();
        engine.set_reclaim_candidate(0.0).unwrap();
        assert_eq!(engine.input_state().daily_hours, 8.0);
        let projection = engine.derive_all().reclaim.unwrap();
        assert_eq!(projection.reclaimed_years, projection.original_years);
    }

    #[test]
    fn test_candidate_follows_daily_hours_before_reveal() {
        let mut engine = engine();
        let effects = engine.set_daily_hours(8.0).unwrap();
        assert_eq!(effects, vec![LensEffect::HoursChanged { daily_hours: 8.0 }]);
        assert_eq!(engine.reclaim_state().candidate_hours, 8.0);

        engine.enter_daily_hours("5.5").unwrap();
        assert_eq!(engine.reclaim_state().candidate_hours, 5.5);
        assert!(!engine.reclaimed_visible());
    }

    #[test]
    fn test_direct_mutators_return_their_effects() {
        let mut engine = engine();
        engine.set_daily_hours(8.0).unwrap();

        let effects = engine.submit_age_text("40").unwrap();
        assert!(effects.contains(&LensEffect::SectionsRevealed));
        assert!(effects
            .iter()
            .any(|e| matches!(e, LensEffect::GridRegenerated { .. })));

        let effects = engine.set_reclaim_candidate(2.0).unwrap();
        assert_eq!(
            effects,
            vec![
                LensEffect::ReclaimUpdated {
                    candidate_hours: 2.0,
                    reclaimed_years: Some(13.875),
                },
                LensEffect::ReclaimedVisibility { visible: true },
            ]
        );

        let effects = engine.set_daily_hours(6.0).unwrap();
        assert_eq!(effects[0], LensEffect::HoursChanged { daily_hours: 6.0 });
        assert!(effects.contains(&LensEffect::ReclaimedVisibility { visible: false }));
        assert!(engine.set_daily_hours(6.0).unwrap().is_empty());
    }

    #[test]
    fn test_drag_updates_hours_and_shows_prompt_once() {
        let mut engine = engine();
        let effects = engine.handle(LensEvent::Pointer(PointerEvent::new(
            GesturePhase::Start,
            200.0,
            300.0,
        )));
        assert_eq!(effects, vec![LensEffect::HoursChanged { daily_hours: 8.0 }]);
        assert_eq!(engine.dial_mode(), DialMode::Dragging);

        // same position again: no drift, no effect
        let effects = engine.handle(LensEvent::Pointer(PointerEvent::new(
            GesturePhase::Move,
            200.0,
            300.0,
        )));
        assert!(effects.is_empty());
        assert_eq!(engine.input_state().daily_hours, 8.0);

        let effects = engine.handle(LensEvent::Pointer(PointerEvent::new(
            GesturePhase::End,
            0.0,
            0.0,
        )));
        assert_eq!(effects, vec![LensEffect::ScrollPromptShown]);

        engine.handle(LensEvent::Pointer(PointerEvent::new(
            GesturePhase::Start,
            300.0,
            200.0,
        )));
        let effects = engine.handle(LensEvent::Pointer(PointerEvent::new(
            GesturePhase::End,
            0.0,
            0.0,
        )));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_direct_entry_clamps_and_rejects_text() {
        let mut engine = engine();
        assert!(!engine.enter_daily_hours("20").unwrap().is_empty());
        assert_eq!(engine.input_state().daily_hours, 16.0);
        assert!(engine.enter_daily_hours("abc").is_err());
        assert_eq!(engine.input_state().daily_hours, 16.0);
        assert!(engine.enter_daily_hours("15.9").unwrap().is_empty());
    }

    #[test]
    fn test_stage_reentry_fires_animation_once() {
        let mut engine = engine();
        engine.set_daily_hours(8.0).unwrap();

        let first = engine.handle(scroll(ScrollEvent::Enter { stage: Stage::Daily }));
        let second = engine.handle(scroll(ScrollEvent::EnterBack { stage: Stage::Daily }));
        assert_eq!(count_stage_activations(&first), 1);
        assert_eq!(count_stage_activations(&second), 0);
        assert!(second.is_empty());

        engine.handle(scroll(ScrollEvent::Leave { stage: Stage::Daily }));
        let third = engine.handle(scroll(ScrollEvent::EnterBack { stage: Stage::Daily }));
        assert_eq!(count_stage_activations(&third), 1);
    }

    #[test]
    fn test_weekly_stage_starts_staggered_clocks() {
        let mut engine = engine();
        engine.set_daily_hours(4.0).unwrap();
        let effects = engine.handle(scroll(ScrollEvent::Enter {
            stage: Stage::Weekly,
        }));
        let clocks: Vec<Tween> = effects
            .iter()
            .filter_map(|e| match e {
                LensEffect::AnimationStarted {
                    target: TweenTarget::WeekClock { .. },
                    tween,
                } => Some(*tween),
                _ => None,
            })
            .collect();
        assert_eq!(clocks.len(), 7);
        assert_eq!(clocks[0].delay, Duration::ZERO);
        assert_eq!(clocks[6].delay, crate::tween::secs(6.0 * 0.1));
    }

    #[test]
    fn test_counter_animates_with_stage_granularity() {
        let mut engine = engine();
        engine.set_daily_hours(2.5).unwrap();
        engine.handle(scroll(ScrollEvent::Enter { stage: Stage::Weekly }));

        let mut last = None;
        for _ in 0..60 {
            for effect in engine.handle(LensEvent::Tick { dt_ms: 16 }) {
                if let LensEffect::CounterFrame { value, unit, .. } = effect {
                    assert_eq!((value * 2.0).fract(), 0.0);
                    assert_eq!(unit, "hours this week");
                    last = Some(value);
                }
            }
        }
        assert_eq!(last, Some(17.5));
        assert_eq!(engine.counter().shown, 17.5);

        engine.handle(scroll(ScrollEvent::Enter {
            stage: Stage::Monthly,
        }));
        for _ in 0..60 {
            for effect in engine.handle(LensEvent::Tick { dt_ms: 16 }) {
                if let LensEffect::CounterFrame { value, .. } = effect {
                    assert_eq!(value.fract(), 0.0);
                }
            }
        }
        assert_eq!(engine.counter().shown, 75.0);
    }

    #[test]
    fn test_leave_keeps_derived_data() {
        let mut engine = engine();
        engine.set_daily_hours(8.0).unwrap();
        engine.handle(scroll(ScrollEvent::Enter { stage: Stage::Yearly }));
        let before = engine.derive_all();
        engine.handle(scroll(ScrollEvent::Leave { stage: Stage::Yearly }));
        assert_eq!(engine.derive_all(), before);
        assert!(!engine.stage_state().is_active(Stage::Yearly));
    }

    #[test]
    fn test_resize_only_invalidates_geometry() {
        let mut engine = engine();
        engine.set_daily_hours(8.0).unwrap();
        let effects = engine.handle(LensEvent::Resize {
            width: 400.0,
            height: 800.0,
            dial: Some(DialGeometry {
                center_x: 100.0,
                center_y: 100.0,
                radius: 80.0,
            }),
        });
        assert_eq!(effects, vec![LensEffect::GeometryInvalidated { vh: 8.0 }]);
        assert_eq!(engine.input_state().daily_hours, 8.0);

        // pointer math now uses the new dial center
        engine.handle(LensEvent::Pointer(PointerEvent::new(
            GesturePhase::Start,
            150.0,
            100.0,
        )));
        assert_eq!(engine.input_state().daily_hours, 4.0);

        let effects = engine.handle(LensEvent::Resize {
            width: 0.0,
            height: 800.0,
            dial: None,
        });
        assert!(matches!(effects[0], LensEffect::Rejected { .. }));
    }

    #[test]
    fn test_item_highlights() {
        let mut engine = engine();
        let effects = engine.handle(LensEvent::Item {
            event: ItemEvent::Enter {
                item: OpportunityItem::Languages,
            },
        });
        assert_eq!(
            effects,
            vec![LensEffect::ItemHighlight {
                item: OpportunityItem::Languages,
                on: true
            }]
        );
        assert_eq!(engine.highlighted_items(), vec![OpportunityItem::Languages]);
    }

    #[test]
    fn test_events_deserialize_from_json() {
        let event: LensEvent =
            serde_json::from_str(r#"{"type":"pointer","phase":"start","x":1.0,"y":2.0}"#).unwrap();
        assert_eq!(
            event,
            LensEvent::Pointer(PointerEvent::new(GesturePhase::Start, 1.0, 2.0))
        );

        let event: LensEvent = serde_json::from_str(
            r#"{"type":"scroll","event":{"type":"enter","stage":"weekly"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            scroll(ScrollEvent::Enter {
                stage: Stage::Weekly
            })
        );

        let event: LensEvent =
            serde_json::from_str(r#"{"type":"resize","width":390,"height":844}"#).unwrap();
        assert!(matches!(event, LensEvent::Resize { dial: None, .. }));
    }
}
