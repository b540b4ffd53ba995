//! Target Rush - entity lifecycle and motion engine for an arcade reflex game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion profiles, entity registry, levels, game state)
//! - `backend`: Collaborator traits for rendering, audio and score presentation
//! - `session`: Embedding glue that drives the sim from wall-clock callbacks
//!
//! The crate has no rendering, audio or platform code of its own. An embedder
//! implements the `backend` traits, forwards pointer hits and frame callbacks
//! to a [`session::GameSession`], and the sim does the rest.

pub mod backend;
pub mod session;
pub mod sim;

pub use backend::{AudioSink, NullBackend, Presenter, Renderer, VisualHandle, VisualKind};
pub use session::GameSession;

/// Engine tuning constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame callback to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Margin kept around random spawn positions (surface units)
    pub const SPAWN_MARGIN: f32 = 100.0;

    /// Linear/zigzag horizontal speed at speed scalar 1.0 (units/sec)
    pub const LINEAR_SPEED: f32 = 120.0;

    /// Parabolic arc crossing duration at speed scalar 1.0
    pub const ARC_DURATION_MS: u32 = 3000;
    /// Arc apex height as a fraction of surface height
    pub const ARC_PEAK_FRACTION: f32 = 0.6;

    /// Zigzag vertical amplitude around the surface center
    pub const ZIGZAG_AMPLITUDE: f32 = 100.0;
    /// Zigzag oscillation frequency at speed scalar 1.0 (Hz)
    pub const ZIGZAG_FREQ_HZ: f32 = 1.2;

    /// Spiral angular growth at speed scalar 1.0 (radians/sec)
    pub const SPIRAL_ANGLE_RATE: f32 = 2.4;
    /// Spiral radial growth at speed scalar 1.0 (units/sec)
    pub const SPIRAL_RADIUS_RATE: f32 = 45.0;

    /// Downward gravity for the bounce profile (units/sec²)
    pub const BOUNCE_GRAVITY: f32 = 900.0;
    /// Energy kept on each floor bounce
    pub const BOUNCE_RESTITUTION: f32 = 0.7;
    /// Vertical speed below which a floor-resting entity counts as stopped
    pub const BOUNCE_REST_EPSILON: f32 = 12.0;

    /// Pop-up rise duration at speed scalar 1.0
    pub const POP_RISE_MS: u32 = 300;
    /// Pop-up hold duration at speed scalar 1.0
    pub const POP_HOLD_MS: u32 = 1100;
    /// Pop-up retract duration at speed scalar 1.0
    pub const POP_RETRACT_MS: u32 = 300;
    /// How far below the bottom edge a pop-up starts
    pub const POP_DEPTH: f32 = 120.0;

    /// Lifetime of the burst effect shown where an entity was hit
    pub const BURST_LIFETIME_MS: u32 = 500;
}

/// Convert a millisecond duration to whole simulation ticks (at least one)
#[inline]
pub fn ticks_from_ms(ms: u32) -> u64 {
    ((ms as f32 / 1000.0) / consts::SIM_DT).round().max(1.0) as u64
}

/// Seconds of simulated time covered by `ticks`
#[inline]
pub fn secs_from_ticks(ticks: u64) -> f32 {
    ticks as f32 * consts::SIM_DT
}
