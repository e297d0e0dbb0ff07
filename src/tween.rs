//! Tween scheduling
//!
//! Time-based reveal animations are modeled as tweens advanced by explicit
//! frame ticks. At most one tween runs per target: starting a new one for a
//! target supersedes (and cancels) whatever was in flight.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Visual element a tween drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TweenTarget {
    /// The big stage counter
    Counter,
    /// The clock shown in the daily stage
    ScrollyClock,
    /// One of the seven weekday clocks
    WeekClock { index: u8 },
    /// The 30-day calendar
    CalendarFill,
    /// The year bar
    YearBar,
}

/// Easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Cubic ease-out
    #[default]
    Power2Out,
}

impl Ease {
    /// Map linear progress in `[0, 1]` through the curve
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Convert seconds to a duration, treating invalid input as zero
pub fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// Interpolation of one value over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub delay: Duration,
    pub ease: Ease,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration_secs: f64) -> Self {
        Self {
            from,
            to,
            duration: secs(duration_secs),
            delay: Duration::ZERO,
            ease: Ease::default(),
        }
    }

    pub fn with_delay(mut self, delay_secs: f64) -> Self {
        self.delay = secs(delay_secs);
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Value at eased progress `progress`
    pub fn value_at(&self, progress: f64) -> f64 {
        self.from + (self.to - self.from) * progress
    }
}

/// One intermediate step of a running tween
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TweenFrame {
    pub target: TweenTarget,
    /// Eased progress in `[0, 1]`
    pub progress: f64,
    pub value: f64,
    /// Whether this is the tween's final frame
    pub finished: bool,
}

/// Capability to run cancellable tweens
pub trait TweenScheduler {
    /// Start a tween, returning the tween it superseded for that target
    fn start(&mut self, target: TweenTarget, tween: Tween) -> Option<Tween>;

    /// Cancel the tween running for `target`
    fn cancel(&mut self, target: TweenTarget) -> Option<Tween>;

    /// Advance all running tweens by `dt` and report their frames
    fn advance(&mut self, dt: Duration) -> Vec<TweenFrame>;

    fn is_running(&self, target: TweenTarget) -> bool;
}

#[derive(Debug, Clone)]
struct RunningTween {
    target: TweenTarget,
    tween: Tween,
    elapsed: Duration,
}

/// Deterministic scheduler driven by explicit frame ticks.
///
/// Frames are reported in the order the tweens were started.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    running: Vec<RunningTween>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Drop every running tween
    pub fn clear(&mut self) {
        self.running.clear();
    }
}

impl TweenScheduler for FrameScheduler {
    fn start(&mut self, target: TweenTarget, tween: Tween) -> Option<Tween> {
        let superseded = self.cancel(target);
        if superseded.is_some() {
            trace!(?target, "tween superseded");
        }
        self.running.push(RunningTween {
            target,
            tween,
            elapsed: Duration::ZERO,
        });
        superseded
    }

    fn cancel(&mut self, target: TweenTarget) -> Option<Tween> {
        let position = self.running.iter().position(|r| r.target == target)?;
        Some(self.running.remove(position).tween)
    }

    fn advance(&mut self, dt: Duration) -> Vec<TweenFrame> {
        let mut frames = Vec::with_capacity(self.running.len());

        self.running.retain_mut(|running| {
            running.elapsed += dt;
            if running.elapsed < running.tween.delay {
                return true;
            }
            let active = running.elapsed - running.tween.delay;
            let linear = if running.tween.duration.is_zero() {
                1.0
            } else {
                (active.as_secs_f64() / running.tween.duration.as_secs_f64()).min(1.0)
            };
            let progress = running.tween.ease.apply(linear);
            let finished = linear >= 1.0;

            frames.push(TweenFrame {
                target: running.target,
                progress,
                value: running.tween.value_at(progress),
                finished,
            });
            !finished
        });

        trace!(frames = frames.len(), "tween frames advanced");
        frames
    }

    fn is_running(&self, target: TweenTarget) -> bool {
        self.running.iter().any(|r| r.target == target)
    }
}
