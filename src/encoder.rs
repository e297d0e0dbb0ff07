//! Snapshot encoding
//!
//! Serializes the engine's current state and everything derived from it into a
//! self-describing JSON document for the presentation layer and the CLI.

use crate::dial::DialMode;
use crate::engine::LensEngine;
use crate::error::LensError;
use crate::format::{self, Labels};
use crate::stage::OpportunityItem;
use crate::tween::TweenScheduler;
use crate::types::{Derived, InputState, ReclaimState, StageState};
use crate::{LENS_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Who produced a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LensProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Counter as currently displayed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSnapshot {
    pub value: f64,
    pub text: String,
    pub unit: String,
}

/// Dial drawing state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialSnapshot {
    pub mode: DialMode,
    /// SVG path of the filled arc
    pub arc_path: String,
    pub handle_x: f64,
    pub handle_y: f64,
}

/// Full state of one lens session at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LensSnapshot {
    pub producer: LensProducer,
    pub session_id: String,
    pub computed_at_utc: DateTime<Utc>,
    pub input: InputState,
    pub reclaim: ReclaimState,
    pub reclaimed_visible: bool,
    pub revealed: bool,
    pub stage: StageState,
    pub highlighted_items: Vec<OpportunityItem>,
    pub dial: DialSnapshot,
    pub counter: CounterSnapshot,
    pub derived: Derived,
    pub labels: Labels,
}

/// Encoder for lens snapshots
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Capture the engine's state
    pub fn encode<S: TweenScheduler>(
        &self,
        engine: &LensEngine<S>,
    ) -> Result<LensSnapshot, LensError> {
        let derived = engine.derive_all();
        if !derived.fill_fraction.is_finite() {
            return Err(LensError::EncodingError(format!(
                "fill fraction is not finite: {}",
                derived.fill_fraction
            )));
        }

        let producer = LensProducer {
            name: PRODUCER_NAME.to_string(),
            version: LENS_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let geometry = engine.dial_geometry();
        let (handle_x, handle_y) = geometry.handle_point(derived.fill_fraction);
        let dial = DialSnapshot {
            mode: engine.dial_mode(),
            arc_path: geometry.arc_path(derived.fills.dial_arc_radians),
            handle_x,
            handle_y,
        };

        let shown = engine.counter();
        let counter = CounterSnapshot {
            value: shown.shown,
            text: format::counter(shown.shown, shown.snap),
            unit: shown.unit.to_string(),
        };

        let reclaim = engine.reclaim_state();
        let labels = Labels::new(&derived, &reclaim);

        Ok(LensSnapshot {
            producer,
            session_id: engine.session_id().to_string(),
            computed_at_utc: Utc::now(),
            input: engine.input_state().clone(),
            reclaim,
            reclaimed_visible: engine.reclaimed_visible(),
            revealed: engine.is_revealed(),
            stage: engine.stage_state().clone(),
            highlighted_items: engine.highlighted_items(),
            dial,
            counter,
            derived,
            labels,
        })
    }

    /// Encode to JSON string
    pub fn encode_to_json<S: TweenScheduler>(
        &self,
        engine: &LensEngine<S>,
    ) -> Result<String, LensError> {
        let snapshot = self.encode(engine)?;
        serde_json::to_string_pretty(&snapshot).map_err(LensError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LensConfig;
    use crate::engine::LensEvent;
    use crate::stage::ScrollEvent;
    use crate::types::Stage;
    use pretty_assertions::assert_eq;

    fn make_test_engine() -> LensEngine {
        let mut engine = LensEngine::new(LensConfig::default()).unwrap();
        engine.set_daily_hours(8.0).unwrap();
        engine.submit_age(40).unwrap();
        engine.set_reclaim_candidate(4.0).unwrap();
        engine.handle(LensEvent::Scroll {
            event: ScrollEvent::Enter {
                stage: Stage::Monthly,
            },
        });
        engine
    }

    #[test]
    fn test_encode_snapshot() {
        let engine = make_test_engine();
        let encoder = SnapshotEncoder::with_instance_id("test-instance".to_string());
        let snapshot = encoder.encode(&engine).unwrap();

        assert_eq!(snapshot.producer.name, PRODUCER_NAME);
        assert_eq!(snapshot.producer.version, LENS_VERSION);
        assert_eq!(snapshot.producer.instance_id, "test-instance");
        assert_eq!(snapshot.session_id, engine.session_id().to_string());

        assert_eq!(snapshot.input.daily_hours, 8.0);
        assert_eq!(snapshot.input.age, Some(40));
        assert_eq!(snapshot.reclaim.candidate_hours, 4.0);
        assert!(snapshot.reclaimed_visible);
        assert!(snapshot.revealed);

        // Check stage
        assert_eq!(snapshot.stage.current, Some(Stage::Monthly));
        assert_eq!(snapshot.counter.unit, "hours this month");
        assert_eq!(snapshot.counter.text, "0");

        // Check derived values and labels agree
        assert_eq!(snapshot.derived.time_breakdown.yearly, 2920);
        assert_eq!(snapshot.labels.yearly_hours, "2,920");
        assert_eq!(snapshot.derived.screen_years, Some(18.5));

        // Half-filled dial puts the handle at six o'clock
        assert_eq!(snapshot.dial.mode, DialMode::Idle);
        assert!((snapshot.dial.handle_x - 200.0).abs() < 1e-9);
        assert!((snapshot.dial.handle_y - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_encode_to_json() {
        let engine = make_test_engine();
        let encoder = SnapshotEncoder::new();
        let json = encoder.encode_to_json(&engine).unwrap();

        // Verify it's valid JSON
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("producer").is_some());
        let computed_at = parsed["computed_at_utc"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(computed_at).is_ok());
        assert!(parsed.get("derived").is_some());
        assert_eq!(parsed["stage"]["current"], "monthly");
        assert_eq!(parsed["highlighted_items"], serde_json::json!([]));
    }

    #[test]
    fn test_age_dependent_fields_absent_before_submission() {
        let engine = LensEngine::new(LensConfig::default()).unwrap();
        let json = SnapshotEncoder::new().encode_to_json(&engine).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["labels"].get("screen_years").is_none());
        assert_eq!(parsed["revealed"], false);
    }
}
