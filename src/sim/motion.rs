//! Motion profile library
//!
//! Each live entity carries a [`MotionState`]: a small, explicit numeric
//! record (elapsed time is supplied by the caller; angle, radius and velocity
//! live here). Advancing a profile is a pure function of that record plus the
//! surface bounds and the level speed scalar - no hidden state, no captured
//! continuations. A fresh `spawn` always yields an independent trajectory.
//!
//! Coordinates are surface coordinates: origin top-left, x right, y down.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::consts::*;

/// Trajectory families supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPattern {
    /// Left edge to right edge at constant speed
    Linear,
    /// Left-to-right inverted parabola over a fixed duration
    Arc,
    /// Linear horizontal motion with sinusoidal vertical oscillation
    Zigzag,
    /// Outward spiral from the surface center
    Spiral,
    /// Projectile with gravity and a lossy floor bounce
    Bounce,
    /// Rise from below the surface to a fixed anchor, hold, retract
    PopUp,
}

impl MotionPattern {
    /// Every supported pattern, in selection order for "random" levels
    pub const ALL: [MotionPattern; 6] = [
        MotionPattern::Linear,
        MotionPattern::Arc,
        MotionPattern::Zigzag,
        MotionPattern::Spiral,
        MotionPattern::Bounce,
        MotionPattern::PopUp,
    ];
}

/// Result of advancing a motion profile by one tick
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Position for this tick (valid even on the final, dead step)
    pub pos: Vec2,
    /// False once the trajectory has left the surface / finished
    pub alive: bool,
}

/// Per-entity numeric motion record
#[derive(Debug, Clone, Copy)]
pub enum MotionState {
    Linear { y: f32 },
    Arc,
    Zigzag { phase: f32 },
    Spiral { angle: f32, radius: f32 },
    Bounce { pos: Vec2, vel: Vec2 },
    PopUp { anchor: Vec2 },
}

impl MotionState {
    /// Roll start parameters for `pattern` and return the state plus the
    /// entity's initial position.
    pub fn spawn(
        pattern: MotionPattern,
        bounds: Vec2,
        speed: f32,
        rng: &mut Pcg32,
    ) -> (MotionState, Vec2) {
        let (w, h) = (bounds.x, bounds.y);
        match pattern {
            MotionPattern::Linear => {
                let y = random_margin_offset(h, rng);
                (MotionState::Linear { y }, Vec2::new(0.0, y))
            }
            MotionPattern::Arc => (MotionState::Arc, Vec2::new(0.0, h)),
            MotionPattern::Zigzag => {
                let phase = rng.random_range(0.0..TAU);
                let y = h / 2.0 + ZIGZAG_AMPLITUDE * phase.sin();
                (MotionState::Zigzag { phase }, Vec2::new(0.0, y))
            }
            MotionPattern::Spiral => {
                let angle = rng.random_range(0.0..TAU);
                let state = MotionState::Spiral { angle, radius: 0.0 };
                (state, bounds / 2.0)
            }
            MotionPattern::Bounce => {
                let x = random_margin_offset(w, rng);
                let vx = rng.random_range(60.0..140.0) * speed;
                let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let state = MotionState::Bounce {
                    pos: Vec2::new(x, 0.0),
                    vel: Vec2::new(vx * dir, 0.0),
                };
                (state, Vec2::new(x, 0.0))
            }
            MotionPattern::PopUp => {
                let anchor = pop_up_anchor(rng.random_range(0..POP_UP_ANCHORS), bounds);
                let start = Vec2::new(anchor.x, h + POP_DEPTH);
                (MotionState::PopUp { anchor }, start)
            }
        }
    }

    /// Advance by one tick.
    ///
    /// `elapsed` is seconds since spawn including this tick; `dt` is the
    /// fixed timestep. Closed-form profiles use `elapsed`, integrating
    /// profiles (spiral, bounce) use `dt`.
    pub fn step(&mut self, elapsed: f32, dt: f32, bounds: Vec2, speed: f32) -> Step {
        let (w, h) = (bounds.x, bounds.y);
        match self {
            MotionState::Linear { y } => {
                let x = elapsed * LINEAR_SPEED * speed;
                Step {
                    pos: Vec2::new(x, *y),
                    alive: x <= w,
                }
            }
            MotionState::Arc => {
                let duration = ARC_DURATION_MS as f32 / 1000.0 / speed;
                let t = elapsed / duration;
                let x = t * w;
                let y = h - ARC_PEAK_FRACTION * h * 4.0 * t * (1.0 - t);
                Step {
                    pos: Vec2::new(x, y),
                    alive: t < 1.0,
                }
            }
            MotionState::Zigzag { phase } => {
                let x = elapsed * LINEAR_SPEED * speed;
                let theta = *phase + TAU * ZIGZAG_FREQ_HZ * speed * elapsed;
                let y = h / 2.0 + ZIGZAG_AMPLITUDE * theta.sin();
                Step {
                    pos: Vec2::new(x, y),
                    alive: x <= w,
                }
            }
            MotionState::Spiral { angle, radius } => {
                *angle += SPIRAL_ANGLE_RATE * speed * dt;
                *radius += SPIRAL_RADIUS_RATE * speed * dt;
                let center = bounds / 2.0;
                let pos = center + *radius * Vec2::new(angle.cos(), angle.sin());
                Step {
                    pos,
                    alive: *radius <= bounds.min_element() / 3.0,
                }
            }
            MotionState::Bounce { pos, vel } => {
                vel.y += BOUNCE_GRAVITY * dt;
                *pos += *vel * dt;

                // Elastic side walls
                if pos.x < 0.0 {
                    pos.x = -pos.x;
                    vel.x = vel.x.abs();
                } else if pos.x > w {
                    pos.x = 2.0 * w - pos.x;
                    vel.x = -vel.x.abs();
                }

                // Lossy floor
                let mut on_floor = false;
                if pos.y >= h {
                    pos.y = h;
                    vel.y = -(vel.y * BOUNCE_RESTITUTION);
                    on_floor = true;
                }

                let resting = on_floor && vel.y.abs() < BOUNCE_REST_EPSILON;
                Step {
                    pos: *pos,
                    alive: !resting,
                }
            }
            MotionState::PopUp { anchor } => {
                let rise = POP_RISE_MS as f32 / 1000.0 / speed;
                let hold = POP_HOLD_MS as f32 / 1000.0 / speed;
                let retract = POP_RETRACT_MS as f32 / 1000.0 / speed;
                let below = h + POP_DEPTH;

                let (y, alive) = if elapsed < rise {
                    (lerp(below, anchor.y, elapsed / rise), true)
                } else if elapsed < rise + hold {
                    (anchor.y, true)
                } else if elapsed < rise + hold + retract {
                    let t = (elapsed - rise - hold) / retract;
                    (lerp(anchor.y, below, t), true)
                } else {
                    (below, false)
                };
                Step {
                    pos: Vec2::new(anchor.x, y),
                    alive,
                }
            }
        }
    }
}

/// Number of discrete pop-up anchor positions (3 columns x 2 rows)
pub const POP_UP_ANCHORS: usize = 6;

/// Anchor position for pop-up index `idx`, in the lower half of the surface
pub fn pop_up_anchor(idx: usize, bounds: Vec2) -> Vec2 {
    let col = (idx % 3) as f32;
    let row = (idx / 3) as f32;
    Vec2::new(
        bounds.x * (col + 1.0) / 4.0,
        bounds.y * (0.55 + 0.25 * row),
    )
}

/// Upper bound on a trajectory's lifetime, in ticks.
///
/// This backs the absolute expiry deadline: an entity is removed when the
/// deadline passes even if no motion step ever runs for it.
pub fn lifetime_ticks(pattern: MotionPattern, bounds: Vec2, speed: f32) -> u64 {
    let secs = match pattern {
        MotionPattern::Linear | MotionPattern::Zigzag => {
            bounds.x / (LINEAR_SPEED * speed) + 0.25
        }
        MotionPattern::Arc => ARC_DURATION_MS as f32 / 1000.0 / speed + 0.25,
        MotionPattern::Spiral => {
            (bounds.min_element() / 3.0) / (SPIRAL_RADIUS_RATE * speed) + 0.25
        }
        MotionPattern::Bounce => {
            // Initial fall to the floor plus the geometric series of
            // rebound flights, with slack for the discrete integration
            let fall = (2.0 * bounds.y / BOUNCE_GRAVITY).sqrt();
            fall * (1.0 + BOUNCE_RESTITUTION) / (1.0 - BOUNCE_RESTITUTION) + 0.5
        }
        MotionPattern::PopUp => {
            (POP_RISE_MS + POP_HOLD_MS + POP_RETRACT_MS) as f32 / 1000.0 / speed
        }
    };
    (secs / SIM_DT).ceil() as u64
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Random coordinate within `extent`, keeping the spawn margin on both sides
fn random_margin_offset(extent: f32, rng: &mut Pcg32) -> f32 {
    let lo = SPAWN_MARGIN.min(extent / 2.0);
    let hi = (extent - SPAWN_MARGIN).max(lo + 1.0);
    rng.random_range(lo..hi)
}
