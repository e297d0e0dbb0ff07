//! Dial input controller
//!
//! Turns pointer/touch gestures on the circular dial, or a direct numeric
//! entry, into a clamped and quantized daily-hours value. Both paths go
//! through [`quantize_hours`] so they can never disagree.
//!
//! Angles are measured from 12 o'clock, clockwise, in `[0, 2π)`.

use crate::config::LensConfig;
use crate::error::LensError;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use tracing::{debug, trace};

/// Arcs at or beyond a full turn are shortened by this much so SVG still draws them
const FULL_CIRCLE_EPSILON: f64 = 0.001;

/// Gesture lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A pointer or touch sample in the same coordinate space as the dial geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: GesturePhase,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl PointerEvent {
    pub fn new(phase: GesturePhase, x: f64, y: f64) -> Self {
        Self { phase, x, y }
    }
}

/// Position and size of the dial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl Default for DialGeometry {
    /// The dial's 400x400 drawing space
    fn default() -> Self {
        Self {
            center_x: 200.0,
            center_y: 200.0,
            radius: 160.0,
        }
    }
}

impl DialGeometry {
    /// Angle of a point around the dial center
    pub fn angle_at(&self, x: f64, y: f64) -> f64 {
        let mut angle = (y - self.center_y).atan2(x - self.center_x) + FRAC_PI_2;
        if angle < 0.0 {
            angle += TAU;
        }
        angle
    }

    /// Point on the rim at `angle`
    pub fn point_at(&self, angle: f64) -> (f64, f64) {
        let adjusted = angle - FRAC_PI_2;
        (
            self.center_x + self.radius * adjusted.cos(),
            self.center_y + self.radius * adjusted.sin(),
        )
    }

    /// Where the drag handle sits for a given fill fraction
    pub fn handle_point(&self, fraction: f64) -> (f64, f64) {
        self.point_at(fraction * TAU)
    }

    /// SVG path for the filled arc from 12 o'clock to `end_angle`
    pub fn arc_path(&self, end_angle: f64) -> String {
        describe_arc(self, 0.0, end_angle)
    }
}

/// SVG arc path between two angles on the dial rim
pub fn describe_arc(geometry: &DialGeometry, start_angle: f64, end_angle: f64) -> String {
    let mut end_angle = end_angle;
    if end_angle - start_angle >= TAU {
        end_angle = start_angle + TAU - FULL_CIRCLE_EPSILON;
    }
    let (sx, sy) = geometry.point_at(start_angle);
    let (ex, ey) = geometry.point_at(end_angle);
    let large_arc = if end_angle - start_angle <= PI { 0 } else { 1 };
    let r = geometry.radius;

    format!("M {sx} {sy} A {r} {r} 0 {large_arc} 1 {ex} {ey}")
}

/// Clamp to `[0, waking_hours]` and snap to the nearest `step`
pub fn quantize_hours(raw: f64, waking_hours: f64, step: f64) -> f64 {
    let clamped = raw.clamp(0.0, waking_hours);
    ((clamped / step).round() * step).clamp(0.0, waking_hours)
}

/// Map a dial angle linearly onto `[0, waking_hours]` and quantize
pub fn hours_from_angle(angle: f64, waking_hours: f64, step: f64) -> f64 {
    quantize_hours(angle / TAU * waking_hours, waking_hours, step)
}

/// Angle that corresponds to `hours`
pub fn angle_for_hours(hours: f64, waking_hours: f64) -> f64 {
    hours.clamp(0.0, waking_hours) / waking_hours * TAU
}

/// Parse the text of the numeric hours field
pub fn parse_hours_entry(text: &str) -> Result<f64, LensError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| LensError::NonNumeric(text.to_string()))?;
    if !value.is_finite() {
        return Err(LensError::NonNumeric(text.to_string()));
    }
    Ok(value)
}

/// Dial interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialMode {
    #[default]
    Idle,
    Dragging,
}

/// What a gesture asks the owner of the input state to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialSignal {
    /// Write this quantized value to `daily_hours`
    Hours(f64),
    /// The gesture ended
    Released,
}

/// Gesture state machine for the dial
#[derive(Debug, Clone)]
pub struct DialController {
    mode: DialMode,
    geometry: DialGeometry,
    waking_hours: f64,
    step: f64,
}

impl DialController {
    pub fn new(config: &LensConfig) -> Self {
        Self {
            mode: DialMode::Idle,
            geometry: DialGeometry::default(),
            waking_hours: config.waking_hours,
            step: config.hours_step,
        }
    }

    pub fn mode(&self) -> DialMode {
        self.mode
    }

    pub fn geometry(&self) -> &DialGeometry {
        &self.geometry
    }

    /// Replace the dial geometry after a layout change
    pub fn set_geometry(&mut self, geometry: DialGeometry) {
        self.geometry = geometry;
    }

    /// Quantized hours under a pointer position
    pub fn hours_at(&self, x: f64, y: f64) -> f64 {
        hours_from_angle(self.geometry.angle_at(x, y), self.waking_hours, self.step)
    }

    /// Quantized hours for a direct numeric entry
    pub fn hours_for_entry(&self, value: f64) -> Result<f64, LensError> {
        if !value.is_finite() {
            return Err(LensError::InvalidHours(value));
        }
        Ok(quantize_hours(value, self.waking_hours, self.step))
    }

    /// Feed one gesture sample.
    ///
    /// `current` is the daily-hours value currently stored; a `Hours` signal is
    /// only produced when the quantized value differs from it.
    pub fn handle(&mut self, event: &PointerEvent, current: f64) -> Option<DialSignal> {
        match (self.mode, event.phase) {
            (DialMode::Idle, GesturePhase::Start) | (DialMode::Dragging, GesturePhase::Start) => {
                debug!(x = event.x, y = event.y, "dial drag started");
                self.mode = DialMode::Dragging;
                self.sample(event, current)
            }
            (DialMode::Dragging, GesturePhase::Move) => self.sample(event, current),
            (DialMode::Dragging, GesturePhase::End | GesturePhase::Cancel) => {
                debug!("dial drag ended");
                self.mode = DialMode::Idle;
                Some(DialSignal::Released)
            }
            (DialMode::Idle, GesturePhase::Move | GesturePhase::End | GesturePhase::Cancel) => {
                trace!(phase = ?event.phase, "ignoring gesture sample while idle");
                None
            }
        }
    }

    fn sample(&self, event: &PointerEvent, current: f64) -> Option<DialSignal> {
        if !event.x.is_finite() || !event.y.is_finite() {
            return None;
        }
        let hours = self.hours_at(event.x, event.y);
        if hours == current {
            None
        } else {
            Some(DialSignal::Hours(hours))
        }
    }
}
