//! Level configuration table
//!
//! A static, ordered mapping from level number to spawn interval, population
//! cap, motion pattern selection, speed scalar and advance threshold. Loaded
//! once (built-in table or JSON) and immutable afterwards; the last level is
//! a terminal plateau that never advances.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::motion::MotionPattern;

/// How a level picks the motion pattern for each spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternChoice {
    /// Every spawn uses the same pattern
    Fixed(MotionPattern),
    /// Uniformly random pattern per spawn
    Random,
}

/// Immutable per-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Level number (table key, 1-based)
    pub level: u32,
    /// Maximum simultaneous live entities
    pub cap: usize,
    /// Spawn scheduler period
    pub spawn_interval_ms: u32,
    /// Pattern selection for each spawn
    pub pattern: PatternChoice,
    /// Speed scalar applied to every motion profile
    pub speed: f32,
    /// Score needed to advance; `None` marks the terminal plateau level
    pub advance_at: Option<u32>,
    /// Probability that a pop-up spawn is a trap
    #[serde(default)]
    pub trap_chance: f32,
}

/// Errors from building or loading a level table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("level table JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level table is empty")]
    Empty,
    #[error("level numbers must be contiguous from 1: expected {expected}, found {found}")]
    NonContiguous { expected: u32, found: u32 },
    #[error("level {0} has a zero population cap")]
    ZeroCap(u32),
    #[error("level {0} has a zero spawn interval")]
    ZeroInterval(u32),
    #[error("level {0} has a non-positive speed")]
    NonPositiveSpeed(u32),
    #[error("level {level} trap chance {chance} is outside [0, 1]")]
    TrapChanceRange { level: u32, chance: f32 },
    #[error("level {0} never advances but is not the last level")]
    MisplacedTerminal(u32),
    #[error("the last level must never advance")]
    NonTerminalLast,
}

/// Ordered table of level configurations, keyed by level number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelConfig>", into = "Vec<LevelConfig>")]
pub struct LevelTable {
    levels: Vec<LevelConfig>,
}

impl LevelTable {
    /// Build a table, validating contiguity, caps, numeric ranges and
    /// terminal placement
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, TableError> {
        if levels.is_empty() {
            return Err(TableError::Empty);
        }
        let last = levels.len() - 1;
        for (i, cfg) in levels.iter().enumerate() {
            let expected = i as u32 + 1;
            if cfg.level != expected {
                return Err(TableError::NonContiguous {
                    expected,
                    found: cfg.level,
                });
            }
            if cfg.cap == 0 {
                return Err(TableError::ZeroCap(cfg.level));
            }
            if cfg.spawn_interval_ms == 0 {
                return Err(TableError::ZeroInterval(cfg.level));
            }
            // Rejects NaN too
            if !(cfg.speed > 0.0) {
                return Err(TableError::NonPositiveSpeed(cfg.level));
            }
            if !(0.0..=1.0).contains(&cfg.trap_chance) {
                return Err(TableError::TrapChanceRange {
                    level: cfg.level,
                    chance: cfg.trap_chance,
                });
            }
            if cfg.advance_at.is_none() && i != last {
                return Err(TableError::MisplacedTerminal(cfg.level));
            }
        }
        if levels[last].advance_at.is_some() {
            return Err(TableError::NonTerminalLast);
        }
        Ok(Self { levels })
    }

    /// Parse a table from JSON (an array of level configs)
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    /// Look up a level; `None` for undefined levels
    pub fn get(&self, level: u32) -> Option<&LevelConfig> {
        self.levels.get(level.checked_sub(1)? as usize)
    }

    /// Level 1 configuration
    pub fn first(&self) -> &LevelConfig {
        &self.levels[0]
    }

    /// Highest defined level number
    pub fn last_level(&self) -> u32 {
        self.levels.len() as u32
    }
}

impl Default for LevelTable {
    /// Built-in seven-level progression ending on a terminal random level
    fn default() -> Self {
        use MotionPattern::*;
        let lvl = |level, cap, spawn_interval_ms, pattern, speed, advance_at, trap_chance| {
            LevelConfig {
                level,
                cap,
                spawn_interval_ms,
                pattern,
                speed,
                advance_at,
                trap_chance,
            }
        };
        let levels = vec![
            lvl(1, 3, 1500, PatternChoice::Fixed(Linear), 1.0, Some(10), 0.0),
            lvl(2, 4, 1200, PatternChoice::Fixed(Zigzag), 1.0, Some(25), 0.0),
            lvl(3, 5, 1000, PatternChoice::Fixed(Arc), 1.1, Some(45), 0.0),
            lvl(4, 5, 900, PatternChoice::Fixed(Spiral), 1.2, Some(70), 0.0),
            lvl(5, 6, 800, PatternChoice::Fixed(Bounce), 1.2, Some(100), 0.0),
            lvl(6, 4, 1000, PatternChoice::Fixed(PopUp), 1.0, Some(140), 0.2),
            lvl(7, 6, 650, PatternChoice::Random, 1.3, None, 0.15),
        ];
        Self::new(levels).expect("built-in level table is valid")
    }
}

impl TryFrom<Vec<LevelConfig>> for LevelTable {
    type Error = TableError;

    fn try_from(levels: Vec<LevelConfig>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<LevelTable> for Vec<LevelConfig> {
    fn from(table: LevelTable) -> Self {
        table.levels
    }
}
