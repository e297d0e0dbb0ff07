//! Screentime Lens - state and derivation core for a scroll-driven screen-time visualization
//!
//! Lens turns one number, the hours a person spends on screens each day, into
//! the statistics a scrollytelling page reveals: weekly/monthly/yearly totals,
//! opportunity costs, a life-calendar grid, a body-silhouette fill and a
//! "reclaimed time" projection.
//!
//! ## Modules
//!
//! - **Derivation**: pure functions from the input state to every derived quantity
//! - **Controllers**: the dial, the reclaim slider and the scroll-stage coordinator
//! - **Engine**: owns the state and turns inbound events into presentation effects

pub mod config;
pub mod derive;
pub mod dial;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod format;
pub mod reclaim;
pub mod stage;
pub mod tween;
pub mod types;

pub use config::{LensConfig, OpportunityRates, SilhouetteMode};
pub use derive::derive_all;
pub use encoder::{LensSnapshot, SnapshotEncoder};
pub use engine::{LensEffect, LensEngine, LensEvent};
pub use error::LensError;
pub use types::{Derived, InputState, ReclaimState, Stage, StageState};

/// Lens version embedded in all snapshots
pub const LENS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for snapshots
pub const PRODUCER_NAME: &str = "screentime-lens";
