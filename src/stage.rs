//! Scroll-stage coordinator
//!
//! Maps scroll-trigger events onto the five scrollytelling stages. Entering a
//! stage activates it, picks the counter value the stage shows, and fires that
//! stage's reveal animation once. Re-entering the current stage without
//! leaving it first is a no-op; leaving re-arms the stage's animation but
//! never touches derived data.

use crate::config::LensConfig;
use crate::derive::{time_breakdown, visual_fills};
use crate::tween::Tween;
use crate::types::{InputState, Stage, StageState};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Number of weekday clocks in the weekly stage
pub const WEEK_CLOCKS: u8 = 7;

/// Number of day cells in the monthly calendar
pub const CALENDAR_DAYS: u8 = 30;

/// Event reported by the scroll-progress source for a stage's trigger region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrollEvent {
    /// Region entered scrolling down
    Enter { stage: Stage },
    /// Region entered scrolling up
    EnterBack { stage: Stage },
    /// Region left scrolling down
    Leave { stage: Stage },
    /// Region left scrolling up
    LeaveBack { stage: Stage },
    /// Continuous progress through the region
    Progress { stage: Stage, progress: f64 },
}

/// Granularity the stage counter snaps to while animating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterSnap {
    /// 0.5 steps (daily and weekly)
    Half,
    /// Whole units (monthly, yearly, opportunity)
    Whole,
}

impl CounterSnap {
    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Daily | Stage::Weekly => CounterSnap::Half,
            Stage::Monthly | Stage::Yearly | Stage::Opportunity => CounterSnap::Whole,
        }
    }

    pub fn granularity(self) -> f64 {
        match self {
            CounterSnap::Half => 0.5,
            CounterSnap::Whole => 1.0,
        }
    }

    pub fn snap(self, value: f64) -> f64 {
        let step = self.granularity();
        (value / step).round() * step
    }
}

/// Number and unit the counter shows for a stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterTarget {
    pub stage: Stage,
    pub value: f64,
    pub unit: &'static str,
    pub snap: CounterSnap,
}

/// Counter value and unit for `stage` at `daily_hours`
pub fn counter_target(stage: Stage, daily_hours: f64) -> CounterTarget {
    let breakdown = time_breakdown(daily_hours);
    let (value, unit) = match stage {
        Stage::Daily => (breakdown.daily, "hours today"),
        Stage::Weekly => (breakdown.weekly, "hours this week"),
        Stage::Monthly => (f64::from(breakdown.monthly), "hours this month"),
        Stage::Yearly => (f64::from(breakdown.yearly), "hours this year"),
        Stage::Opportunity => (f64::from(breakdown.yearly), "hours to reclaim"),
    };
    CounterTarget {
        stage,
        value,
        unit,
        snap: CounterSnap::for_stage(stage),
    }
}

/// One-shot reveal animation fired on stage entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageAnimation {
    /// Sweep the daily clock from empty to the fill angle
    ScrollyClock {
        target_radians: f64,
        duration_secs: f64,
    },
    /// Sweep each weekday clock, staggered by index
    WeekClocks {
        count: u8,
        target_radians: f64,
        duration_secs: f64,
        stagger_secs: f64,
    },
    /// Fill every calendar day to the fill percent
    CalendarFill {
        days: u8,
        target_percent: f64,
        duration_secs: f64,
    },
    /// Grow the year bar from zero
    YearBar {
        target_percent: f64,
        duration_secs: f64,
    },
    /// Opportunity items reveal on their own triggers
    None,
}

/// Reveal animation for `stage` at `daily_hours`
pub fn stage_animation(stage: Stage, daily_hours: f64, config: &LensConfig) -> StageAnimation {
    let fills = visual_fills(daily_hours, config);
    let timings = &config.animation;
    match stage {
        Stage::Daily => StageAnimation::ScrollyClock {
            target_radians: fills.mini_clock_radians,
            duration_secs: timings.scrolly_clock_secs,
        },
        Stage::Weekly => StageAnimation::WeekClocks {
            count: WEEK_CLOCKS,
            target_radians: fills.mini_clock_radians,
            duration_secs: timings.week_clock_secs,
            stagger_secs: timings.week_clock_stagger_secs,
        },
        Stage::Monthly => StageAnimation::CalendarFill {
            days: CALENDAR_DAYS,
            target_percent: fills.calendar_percent,
            duration_secs: timings.calendar_secs,
        },
        Stage::Yearly => StageAnimation::YearBar {
            target_percent: fills.year_bar_percent,
            duration_secs: timings.year_bar_secs,
        },
        Stage::Opportunity => StageAnimation::None,
    }
}

/// Everything the presentation layer needs when a stage becomes current
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageActivation {
    pub stage: Stage,
    pub previous: Option<Stage>,
    pub counter: CounterTarget,
    pub animation: StageAnimation,
}

/// Outcome of one scroll event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageTransition {
    Activated(StageActivation),
    Deactivated { stage: Stage },
    Progressed { stage: Stage, progress: f64 },
}

/// Rows in the opportunity stage that highlight one by one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityItem {
    Books,
    Languages,
    Walk,
}

impl OpportunityItem {
    pub const ALL: [OpportunityItem; 3] = [
        OpportunityItem::Books,
        OpportunityItem::Languages,
        OpportunityItem::Walk,
    ];

    fn index(self) -> usize {
        match self {
            OpportunityItem::Books => 0,
            OpportunityItem::Languages => 1,
            OpportunityItem::Walk => 2,
        }
    }
}

/// Trigger event for one opportunity row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemEvent {
    Enter { item: OpportunityItem },
    LeaveBack { item: OpportunityItem },
}

/// Stage state machine
#[derive(Debug, Clone, Default)]
pub struct StageCoordinator {
    state: StageState,
    highlighted: [bool; 3],
}

impl StageCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the stage state
    pub fn state(&self) -> &StageState {
        &self.state
    }

    pub fn current(&self) -> Option<Stage> {
        self.state.current
    }

    pub fn is_highlighted(&self, item: OpportunityItem) -> bool {
        self.highlighted[item.index()]
    }

    /// Route one scroll event
    pub fn handle(
        &mut self,
        event: ScrollEvent,
        input: &InputState,
        config: &LensConfig,
    ) -> Option<StageTransition> {
        match event {
            ScrollEvent::Enter { stage } | ScrollEvent::EnterBack { stage } => self
                .enter(stage, input, config)
                .map(StageTransition::Activated),
            ScrollEvent::Leave { stage } | ScrollEvent::LeaveBack { stage } => self
                .leave(stage)
                .then_some(StageTransition::Deactivated { stage }),
            ScrollEvent::Progress { stage, progress } => {
                let progress = self.set_progress(stage, progress);
                Some(StageTransition::Progressed { stage, progress })
            }
        }
    }

    /// Enter `stage`.
    ///
    /// Returns `None` when the stage is already current and has not been left
    /// since its last entry.
    pub fn enter(
        &mut self,
        stage: Stage,
        input: &InputState,
        config: &LensConfig,
    ) -> Option<StageActivation> {
        let index = stage.index();
        if self.state.current == Some(stage) && !self.state.armed[index] {
            trace!(stage = stage.name(), "stage re-entered without leaving");
            return None;
        }

        let previous = self.state.current;
        if let Some(prev) = previous {
            let prev_index = prev.index();
            self.state.active[prev_index] = false;
            self.state.armed[prev_index] = true;
        }
        self.state.current = Some(stage);
        self.state.active[index] = true;
        self.state.armed[index] = false;

        debug!(
            stage = stage.name(),
            previous = previous.map(Stage::name),
            "stage activated"
        );

        Some(StageActivation {
            stage,
            previous,
            counter: counter_target(stage, input.daily_hours),
            animation: stage_animation(stage, input.daily_hours, config),
        })
    }

    /// Leave `stage`; returns whether it was active.
    pub fn leave(&mut self, stage: Stage) -> bool {
        let index = stage.index();
        let was_active = self.state.active[index];
        self.state.active[index] = false;
        self.state.armed[index] = true;
        if self.state.current == Some(stage) {
            self.state.current = None;
        }
        if was_active {
            debug!(stage = stage.name(), "stage deactivated");
        }
        was_active
    }

    /// Record scroll progress through a stage; returns the clamped value.
    pub fn set_progress(&mut self, stage: Stage, progress: f64) -> f64 {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.state.progress[stage.index()] = progress;
        progress
    }

    /// Route one opportunity-row trigger; returns whether its highlight changed.
    pub fn handle_item(&mut self, event: ItemEvent) -> bool {
        let (item, on) = match event {
            ItemEvent::Enter { item } => (item, true),
            ItemEvent::LeaveBack { item } => (item, false),
        };
        let slot = &mut self.highlighted[item.index()];
        let changed = *slot != on;
        *slot = on;
        changed
    }
}

/// The big number shown beside the stages
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterDisplay {
    /// Value currently on screen, already snapped
    pub shown: f64,
    pub unit: &'static str,
    pub snap: CounterSnap,
}

impl Default for CounterDisplay {
    fn default() -> Self {
        Self {
            shown: 0.0,
            unit: "hours",
            snap: CounterSnap::Half,
        }
    }
}

impl CounterDisplay {
    /// Point the counter at a new target and return the tween that gets it there
    pub fn retarget(&mut self, target: &CounterTarget, duration_secs: f64) -> Tween {
        self.unit = target.unit;
        self.snap = target.snap;
        Tween::new(self.shown, target.value, duration_secs)
    }

    /// Apply an intermediate tween value, snapping to the stage's granularity
    pub fn apply(&mut self, value: f64) -> f64 {
        self.shown = self.snap.snap(value);
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(daily_hours: f64) -> InputState {
        let mut input = InputState::new(&LensConfig::default());
        input.daily_hours = daily_hours;
        input
    }

    #[test]
    fn test_reentering_current_stage_fires_once() {
        let config = LensConfig::default();
        let input = input(8.0);
        let mut coordinator = StageCoordinator::new();

        let first = coordinator.handle(ScrollEvent::Enter { stage: Stage::Daily }, &input, &config);
        assert!(matches!(first, Some(StageTransition::Activated(_))));

        let second =
            coordinator.handle(ScrollEvent::EnterBack { stage: Stage::Daily }, &input, &config);
        assert_eq!(second, None);
        assert_eq!(coordinator.current(), Some(Stage::Daily));
    }

    #[test]
    fn test_leaving_rearms_only_that_stage() {
        let config = LensConfig::default();
        let input = input(8.0);
        let mut coordinator = StageCoordinator::new();

        coordinator.enter(Stage::Daily, &input, &config);
        assert!(coordinator.leave(Stage::Daily));
        assert!(coordinator.state().is_armed(Stage::Daily));
        assert_eq!(coordinator.current(), None);

        assert!(coordinator.enter(Stage::Daily, &input, &config).is_some());
    }

    #[test]
    fn test_switching_stage_deactivates_previous() {
        let config = LensConfig::default();
        let input = input(8.0);
        let mut coordinator = StageCoordinator::new();

        coordinator.enter(Stage::Daily, &input, &config);
        let activation = coordinator.enter(Stage::Weekly, &input, &config).unwrap();
        assert_eq!(activation.previous, Some(Stage::Daily));
        assert!(!coordinator.state().is_active(Stage::Daily));
        assert!(coordinator.state().is_active(Stage::Weekly));

        // coming back up into daily fires again
        assert!(coordinator.enter(Stage::Daily, &input, &config).is_some());
    }

    #[test]
    fn test_leave_of_non_current_stage_keeps_current() {
        let config = LensConfig::default();
        let input = input(8.0);
        let mut coordinator = StageCoordinator::new();

        coordinator.enter(Stage::Daily, &input, &config);
        coordinator.enter(Stage::Weekly, &input, &config);
        assert!(!coordinator.leave(Stage::Daily));
        assert_eq!(coordinator.current(), Some(Stage::Weekly));
        assert!(coordinator
            .handle(ScrollEvent::Leave { stage: Stage::Monthly }, &input, &config)
            .is_none());
    }

    #[test]
    fn test_counter_targets_per_stage() {
        let expected = [
            (Stage::Daily, 8.0, "hours today", CounterSnap::Half),
            (Stage::Weekly, 56.0, "hours this week", CounterSnap::Half),
            (Stage::Monthly, 240.0, "hours this month", CounterSnap::Whole),
            (Stage::Yearly, 2920.0, "hours this year", CounterSnap::Whole),
            (Stage::Opportunity, 2920.0, "hours to reclaim", CounterSnap::Whole),
        ];
        for (stage, value, unit, snap) in expected {
            let target = counter_target(stage, 8.0);
            assert_eq!(target.value, value);
            assert_eq!(target.unit, unit);
            assert_eq!(target.snap, snap);
        }
    }

    #[test]
    fn test_dual_granularity_snapping() {
        assert_eq!(CounterSnap::Half.snap(3.3), 3.5);
        assert_eq!(CounterSnap::Half.snap(3.2), 3.0);
        assert_eq!(CounterSnap::Whole.snap(3.3), 3.0);
        assert_eq!(CounterSnap::Whole.snap(2919.6), 2920.0);

        let mut display = CounterDisplay::default();
        let tween = display.retarget(&counter_target(Stage::Weekly, 2.5), 0.8);
        assert_eq!(tween.from, 0.0);
        assert_eq!(tween.to, 17.5);
        assert_eq!(display.apply(tween.value_at(0.51)), 9.0);

        let tween = display.retarget(&counter_target(Stage::Monthly, 2.5), 0.8);
        assert_eq!(tween.from, 9.0);
        assert_eq!(display.apply(tween.value_at(0.5)), 42.0);
    }

    #[test]
    fn test_stage_animations() {
        let config = LensConfig::default();
        assert_eq!(
            stage_animation(Stage::Yearly, 4.0, &config),
            StageAnimation::YearBar {
                target_percent: 25.0,
                duration_secs: 1.2,
            }
        );
        assert_eq!(
            stage_animation(Stage::Monthly, 8.0, &config),
            StageAnimation::CalendarFill {
                days: 30,
                target_percent: 50.0,
                duration_secs: 1.2,
            }
        );
        assert!(matches!(
            stage_animation(Stage::Weekly, 8.0, &config),
            StageAnimation::WeekClocks { count: 7, .. }
        ));
        assert_eq!(
            stage_animation(Stage::Opportunity, 8.0, &config),
            StageAnimation::None
        );
    }

    #[test]
    fn test_progress_is_clamped_and_kept_per_stage() {
        let config = LensConfig::default();
        let input = input(1.0);
        let mut coordinator = StageCoordinator::new();
        coordinator.handle(
            ScrollEvent::Progress {
                stage: Stage::Yearly,
                progress: 1.7,
            },
            &input,
            &config,
        );
        coordinator.set_progress(Stage::Daily, 0.25);
        assert_eq!(coordinator.state().progress(Stage::Yearly), 1.0);
        assert_eq!(coordinator.state().progress(Stage::Daily), 0.25);
        assert_eq!(coordinator.set_progress(Stage::Weekly, f64::NAN), 0.0);
    }

    #[test]
    fn test_item_highlights_only_clear_on_leave_back() {
        let mut coordinator = StageCoordinator::new();
        assert!(coordinator.handle_item(ItemEvent::Enter {
            item: OpportunityItem::Books
        }));
        assert!(!coordinator.handle_item(ItemEvent::Enter {
            item: OpportunityItem::Books
        }));
        assert!(coordinator.is_highlighted(OpportunityItem::Books));
        assert!(!coordinator.is_highlighted(OpportunityItem::Walk));

        assert!(coordinator.handle_item(ItemEvent::LeaveBack {
            item: OpportunityItem::Books
        }));
        assert!(!coordinator.is_highlighted(OpportunityItem::Books));
    }
}
