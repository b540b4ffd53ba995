//! Game state and core simulation types
//!
//! One [`GameState`] per session. All mutation happens on the single control
//! flow that calls into `sim::tick`; nothing here is shared or locked.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::levels::{LevelConfig, LevelTable};
use super::motion::{MotionPattern, MotionState};
use super::registry::Registry;

/// Opaque entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Target variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Scores a point when hit
    Target,
    /// Ends the game when hit
    Trap,
}

/// A spawned, animated, clickable target
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pattern: MotionPattern,
    /// Explicit numeric motion record; advanced once per tick
    pub motion: MotionState,
    /// Current position in surface coordinates
    pub pos: Vec2,
    pub spawned_at_tick: u64,
    /// Absolute removal deadline; fires even if no motion step runs
    pub expires_at_tick: u64,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Targets spawn, move and can be hit
    Running,
    /// Terminal until an explicit restart
    GameOver,
}

/// Why an entity left the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Pointer hit
    Hit,
    /// Lifetime deadline or trajectory end reached unhit
    Expired,
    /// Drained by a level transition, game over or restart
    Cleared,
}

/// Observable outcome of a sim operation, consumed by the embedding glue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Spawned {
        id: EntityId,
        kind: EntityKind,
        pos: Vec2,
    },
    Moved {
        id: EntityId,
        pos: Vec2,
    },
    Removed {
        id: EntityId,
        pos: Vec2,
        reason: RemovalReason,
    },
    ScoreChanged(u32),
    LevelChanged(u32),
    GameOver {
        final_score: u32,
    },
    Restarted,
}

/// Complete game state (deterministic: same seed + same call sequence
/// produces the same event stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// The only randomness source in the sim
    pub rng: Pcg32,
    /// Simulation tick counter
    pub tick: u64,
    pub phase: GamePhase,
    /// Current level (key into the table, starts at 1)
    pub level: u32,
    /// Non-decreasing except on restart
    pub score: u32,
    pub registry: Registry,
    /// Next scheduler firing; recomputed on every level transition
    pub next_spawn_tick: u64,
    /// Surface dimensions, from the rendering collaborator
    pub bounds: Vec2,
    table: LevelTable,
    next_id: u32,
}

impl GameState {
    /// New session on the built-in level table
    pub fn new(seed: u64, bounds: Vec2) -> Self {
        Self::with_table(seed, bounds, LevelTable::default())
    }

    /// New session on a custom level table
    pub fn with_table(seed: u64, bounds: Vec2, table: LevelTable) -> Self {
        let cap = table.first().cap;
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tick: 0,
            phase: GamePhase::Running,
            level: 1,
            score: 0,
            registry: Registry::new(cap),
            // First firing on the first tick so play starts immediately
            next_spawn_tick: 1,
            bounds,
            table,
            next_id: 1,
        }
    }

    /// Active level configuration
    pub fn config(&self) -> &LevelConfig {
        self.table.get(self.level).unwrap_or_else(|| self.table.first())
    }

    pub fn table(&self) -> &LevelTable {
        &self.table
    }

    /// Allocate a fresh entity handle
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}
