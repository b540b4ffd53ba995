//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity id)
//! - No rendering, audio or platform dependencies

pub mod levels;
pub mod motion;
pub mod registry;
pub mod state;
pub mod tick;

pub use levels::{LevelConfig, LevelTable, PatternChoice, TableError};
pub use motion::{MotionPattern, MotionState, Step, lifetime_ticks, pop_up_anchor};
pub use registry::Registry;
pub use state::{
    Entity, EntityId, EntityKind, GameEvent, GamePhase, GameState, RemovalReason,
};
pub use tick::{on_hit, on_restart, tick};
