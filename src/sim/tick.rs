//! Fixed timestep simulation tick and game controller
//!
//! The scheduler, motion updates and level/score transitions all run on one
//! control flow. Every operation returns the [`GameEvent`]s it produced so
//! the embedding glue can mirror them onto the rendering, audio and
//! presentation collaborators without the sim knowing about any of them.

use rand::Rng;

use super::levels::PatternChoice;
use super::motion::{self, MotionPattern, MotionState};
use super::state::{Entity, EntityId, EntityKind, GameEvent, GamePhase, GameState, RemovalReason};
use crate::consts::SIM_DT;
use crate::ticks_from_ms;

/// Advance the game by one fixed timestep.
///
/// Fires the spawn scheduler when due, then advances every live entity.
/// For each entity the expiry deadline is checked before its next position
/// is committed, so a removal can never be followed by a further move.
pub fn tick(state: &mut GameState) -> Vec<GameEvent> {
    if state.phase != GamePhase::Running {
        return Vec::new();
    }
    state.tick += 1;
    let mut events = Vec::new();

    // Spawn scheduler: a skipped firing (at cap) still reschedules
    if state.tick >= state.next_spawn_tick {
        let interval = ticks_from_ms(state.config().spawn_interval_ms);
        state.next_spawn_tick = state.tick + interval;
        try_spawn(state, &mut events);
    }

    let bounds = state.bounds;
    let speed = state.config().speed;
    let now = state.tick;

    let mut expired: Vec<EntityId> = Vec::new();
    for entity in state.registry.iter_mut() {
        // Deadline first; an expired entity gets no position write
        if now >= entity.expires_at_tick {
            expired.push(entity.id);
            continue;
        }
        let elapsed = (now - entity.spawned_at_tick) as f32 * SIM_DT;
        let step = entity.motion.step(elapsed, SIM_DT, bounds, speed);
        if step.alive {
            entity.pos = step.pos;
            events.push(GameEvent::Moved {
                id: entity.id,
                pos: entity.pos,
            });
        } else {
            expired.push(entity.id);
        }
    }

    for id in expired {
        if let Some(entity) = state.registry.remove(id) {
            events.push(GameEvent::Removed {
                id,
                pos: entity.pos,
                reason: RemovalReason::Expired,
            });
        }
    }

    events
}

/// Handle a pointer hit on `id`.
///
/// Ignored after game over and for handles that are no longer live. The trap
/// check runs strictly before the score/threshold check.
pub fn on_hit(state: &mut GameState, id: EntityId) -> Vec<GameEvent> {
    if state.phase != GamePhase::Running {
        return Vec::new();
    }
    let Some(entity) = state.registry.remove(id) else {
        // Unknown or already-removed handle
        return Vec::new();
    };

    let mut events = vec![GameEvent::Removed {
        id,
        pos: entity.pos,
        reason: RemovalReason::Hit,
    }];

    if entity.kind == EntityKind::Trap {
        state.phase = GamePhase::GameOver;
        drain(state, &mut events);
        log::info!("trap hit, game over with score {}", state.score);
        events.push(GameEvent::GameOver {
            final_score: state.score,
        });
        return events;
    }

    state.score += 1;
    events.push(GameEvent::ScoreChanged(state.score));

    if let Some(threshold) = state.config().advance_at {
        if state.score >= threshold {
            let next = state.level + 1;
            if state.table().get(next).is_some() {
                advance_level(state, next, &mut events);
            } else {
                // Undefined next level: stay where we are
                log::warn!("level {next} is not defined, staying at {}", state.level);
            }
        }
    }

    events
}

/// Restart after game over. Invalid in any other phase.
pub fn on_restart(state: &mut GameState) -> Vec<GameEvent> {
    if state.phase != GamePhase::GameOver {
        log::warn!("restart requested while running, ignoring");
        return Vec::new();
    }
    let mut events = Vec::new();
    drain(state, &mut events);
    state.phase = GamePhase::Running;
    state.score = 0;
    state.level = 1;
    let cfg = state.config();
    let cap = cfg.cap;
    state.registry.set_cap(cap);
    state.next_spawn_tick = state.tick + 1;
    log::info!("restarting at level 1");
    events.push(GameEvent::Restarted);
    events.push(GameEvent::ScoreChanged(0));
    events.push(GameEvent::LevelChanged(1));
    events
}

/// Create one entity under the active level configuration, if below the cap
fn try_spawn(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.registry.live_count() >= state.registry.cap() {
        log::debug!(
            "spawn skipped, {} live at cap {}",
            state.registry.live_count(),
            state.registry.cap()
        );
        return;
    }

    let cfg = state.config().clone();
    let pattern = match cfg.pattern {
        PatternChoice::Fixed(p) => p,
        PatternChoice::Random => {
            let idx = state.rng.random_range(0..MotionPattern::ALL.len());
            MotionPattern::ALL[idx]
        }
    };
    let kind = if pattern == MotionPattern::PopUp
        && cfg.trap_chance > 0.0
        && state.rng.random_bool(cfg.trap_chance as f64)
    {
        EntityKind::Trap
    } else {
        EntityKind::Target
    };

    let (motion_state, pos) = MotionState::spawn(pattern, state.bounds, cfg.speed, &mut state.rng);
    let id = state.next_entity_id();
    let entity = Entity {
        id,
        kind,
        pattern,
        motion: motion_state,
        pos,
        spawned_at_tick: state.tick,
        expires_at_tick: state.tick + motion::lifetime_ticks(pattern, state.bounds, cfg.speed),
    };
    if state.registry.spawn(entity).is_some() {
        events.push(GameEvent::Spawned { id, kind, pos });
    }
}

/// Remove every live entity, emitting `Cleared` removals
fn drain(state: &mut GameState, events: &mut Vec<GameEvent>) {
    for entity in state.registry.clear_all() {
        events.push(GameEvent::Removed {
            id: entity.id,
            pos: entity.pos,
            reason: RemovalReason::Cleared,
        });
    }
}

/// Atomic level transition: drain, re-cap, reschedule
fn advance_level(state: &mut GameState, next: u32, events: &mut Vec<GameEvent>) {
    drain(state, events);
    state.level = next;
    let cfg = state.config();
    let cap = cfg.cap;
    let interval = ticks_from_ms(cfg.spawn_interval_ms);
    state.registry.set_cap(cap);
    state.next_spawn_tick = state.tick + interval;
    log::info!("advanced to level {next} (cap {cap}, interval {interval} ticks)");
    events.push(GameEvent::LevelChanged(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels::{LevelConfig, LevelTable, PatternChoice};
    use glam::Vec2;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    fn cfg(
        level: u32,
        cap: usize,
        interval_ms: u32,
        pattern: PatternChoice,
        advance_at: Option<u32>,
        trap_chance: f32,
    ) -> LevelConfig {
        LevelConfig {
            level,
            cap,
            spawn_interval_ms: interval_ms,
            pattern,
            speed: 1.0,
            advance_at,
            trap_chance,
        }
    }

    /// Tick until the next `Spawned` event, returning its id (bounded)
    fn tick_until_spawn(state: &mut GameState) -> EntityId {
        for _ in 0..10_000 {
            for event in tick(state) {
                if let GameEvent::Spawned { id, .. } = event {
                    return id;
                }
            }
        }
        panic!("no spawn within bound");
    }

    #[test]
    fn test_cap_holds_under_continuous_spawning() {
        // Level 1 of the built-in table: cap 3, 1500 ms interval, linear
        let mut state = GameState::new(1, BOUNDS);
        for _ in 0..600 {
            tick(&mut state);
            assert!(state.registry.live_count() <= state.config().cap);
        }
        assert!(state.registry.live_count() >= 2);
    }

    #[test]
    fn test_level_one_scenario() {
        // Spawn 3 linear targets, hit all 3: score 3, still level 1, empty
        let mut state = GameState::new(2, BOUNDS);
        let ids = [
            tick_until_spawn(&mut state),
            tick_until_spawn(&mut state),
            tick_until_spawn(&mut state),
        ];
        assert_eq!(state.registry.live_count(), 3);

        for id in ids {
            let events = on_hit(&mut state, id);
            assert!(events.iter().any(|e| matches!(
                e,
                GameEvent::Removed {
                    reason: RemovalReason::Hit,
                    ..
                }
            )));
        }
        assert_eq!(state.score, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.registry.live_count(), 0);
    }

    #[test]
    fn test_threshold_hit_transitions_atomically() {
        let table = LevelTable::new(vec![
            cfg(1, 3, 100, PatternChoice::Fixed(MotionPattern::Linear), Some(2), 0.0),
            cfg(2, 5, 500, PatternChoice::Fixed(MotionPattern::Zigzag), None, 0.0),
        ])
        .unwrap();
        let mut state = GameState::with_table(3, BOUNDS, table);

        let first = tick_until_spawn(&mut state);
        let second = tick_until_spawn(&mut state);
        on_hit(&mut state, first);
        assert_eq!(state.level, 1);

        // Second hit reaches the threshold: transition happens on this hit,
        // before any further spawn
        let events = on_hit(&mut state, second);
        assert!(events.contains(&GameEvent::LevelChanged(2)));
        assert_eq!(state.level, 2);
        assert_eq!(state.score, 2);
        assert_eq!(state.registry.live_count(), 0);
        assert_eq!(state.registry.cap(), 5);

        // No spawn before the new interval elapses, one exactly when it does
        let interval = ticks_from_ms(500);
        for i in 1..interval {
            let events = tick(&mut state);
            assert!(
                !events.iter().any(|e| matches!(e, GameEvent::Spawned { .. })),
                "stale scheduler fired {i} ticks after transition"
            );
        }
        let events = tick(&mut state);
        let spawned = events.iter().find_map(|e| match e {
            GameEvent::Spawned { id, .. } => Some(*id),
            _ => None,
        });
        let id = spawned.expect("spawn at the new interval");
        // And it uses the new level's pattern
        assert_eq!(
            state.registry.get(id).unwrap().pattern,
            MotionPattern::Zigzag
        );
    }

    #[test]
    fn test_transition_clears_other_live_entities() {
        let table = LevelTable::new(vec![
            cfg(1, 3, 100, PatternChoice::Fixed(MotionPattern::Linear), Some(1), 0.0),
            cfg(2, 2, 800, PatternChoice::Fixed(MotionPattern::Spiral), None, 0.0),
        ])
        .unwrap();
        let mut state = GameState::with_table(4, BOUNDS, table);

        let first = tick_until_spawn(&mut state);
        let _second = tick_until_spawn(&mut state);
        let _third = tick_until_spawn(&mut state);
        assert_eq!(state.registry.live_count(), 3);

        let events = on_hit(&mut state, first);
        let cleared = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::Removed {
                        reason: RemovalReason::Cleared,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(cleared, 2);
        assert_eq!(state.registry.live_count(), 0);
    }

    #[test]
    fn test_trap_hit_ends_game_with_prior_score() {
        let table = LevelTable::new(vec![cfg(
            1,
            2,
            100,
            PatternChoice::Fixed(MotionPattern::PopUp),
            None,
            1.0,
        )])
        .unwrap();
        let mut state = GameState::with_table(5, BOUNDS, table);

        let id = tick_until_spawn(&mut state);
        assert_eq!(state.registry.get(id).unwrap().kind, EntityKind::Trap);

        let events = on_hit(&mut state, id);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::GameOver { final_score: 0 }));
        assert_eq!(state.score, 0);
        assert_eq!(state.registry.live_count(), 0);

        // Terminal: ticks do nothing, hits are ignored
        assert!(tick(&mut state).is_empty());
        assert!(on_hit(&mut state, id).is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_expiry_removes_without_scoring() {
        let table = LevelTable::new(vec![cfg(
            1,
            1,
            100,
            PatternChoice::Fixed(MotionPattern::PopUp),
            None,
            0.0,
        )])
        .unwrap();
        let mut state = GameState::with_table(6, BOUNDS, table);

        let id = tick_until_spawn(&mut state);
        assert_eq!(state.registry.live_count(), 1);

        let mut expired = false;
        for _ in 0..400 {
            let events = tick(&mut state);
            if events.iter().any(|e| {
                matches!(
                    e,
                    GameEvent::Removed {
                        reason: RemovalReason::Expired,
                        ..
                    }
                )
            }) {
                expired = true;
                break;
            }
        }
        assert!(expired, "pop-up never expired");
        assert!(!state.registry.contains(id));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_hit_on_expiry_tick_decrements_once() {
        let table = LevelTable::new(vec![cfg(
            1,
            1,
            100,
            PatternChoice::Fixed(MotionPattern::PopUp),
            None,
            0.0,
        )])
        .unwrap();
        let mut state = GameState::with_table(8, BOUNDS, table);

        let id = tick_until_spawn(&mut state);
        let deadline = state.registry.get(id).unwrap().expires_at_tick;

        // Advance to the tick just before the deadline fires
        while state.tick < deadline - 1 {
            tick(&mut state);
        }
        assert!(state.registry.contains(id));

        // Hit wins the tie; the expiry sweep must not double-count
        let events = on_hit(&mut state, id);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Removed {
                reason: RemovalReason::Hit,
                ..
            }
        )));
        assert_eq!(state.score, 1);
        assert_eq!(state.registry.live_count(), 0);

        let events = tick(&mut state);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Removed { .. })));
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_restart_resets_to_level_one() {
        let table = LevelTable::new(vec![cfg(
            1,
            2,
            100,
            PatternChoice::Fixed(MotionPattern::PopUp),
            None,
            1.0,
        )])
        .unwrap();
        let mut state = GameState::with_table(9, BOUNDS, table);

        let id = tick_until_spawn(&mut state);
        on_hit(&mut state, id);
        assert_eq!(state.phase, GamePhase::GameOver);

        // Restart is only valid from game over
        let events = on_restart(&mut state);
        assert!(events.contains(&GameEvent::Restarted));
        assert!(events.contains(&GameEvent::ScoreChanged(0)));
        assert!(events.contains(&GameEvent::LevelChanged(1)));
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);

        // Scheduler resumes immediately at the level 1 interval
        let events = tick(&mut state);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Spawned { .. })));

        // A second restart while running is ignored
        assert!(on_restart(&mut state).is_empty());
    }

    #[test]
    fn test_skipped_firing_still_reschedules() {
        // Cap 1 with a short interval: the blocked firings must not pile up
        let table = LevelTable::new(vec![cfg(
            1,
            1,
            100,
            PatternChoice::Fixed(MotionPattern::PopUp),
            None,
            0.0,
        )])
        .unwrap();
        let mut state = GameState::with_table(10, BOUNDS, table);

        let mut spawns = 0;
        for _ in 0..600 {
            let events = tick(&mut state);
            spawns += events
                .iter()
                .filter(|e| matches!(e, GameEvent::Spawned { .. }))
                .count();
            assert!(state.registry.live_count() <= 1);
        }
        // A pop-up lives ~1.7 s; over 10 s at most one target at a time can
        // ever have existed per lifetime window
        assert!(spawns >= 2);
        assert!(spawns <= 7);
    }

    #[test]
    fn test_unknown_hit_is_noop() {
        let mut state = GameState::new(11, BOUNDS);
        tick(&mut state);
        let before = state.registry.live_count();
        assert!(on_hit(&mut state, EntityId(9999)).is_empty());
        assert_eq!(state.registry.live_count(), before);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99, BOUNDS);
        let mut b = GameState::new(99, BOUNDS);

        let mut events_a = Vec::new();
        let mut events_b = Vec::new();
        for i in 0..400u32 {
            events_a.extend(tick(&mut a));
            events_b.extend(tick(&mut b));
            if i == 200 {
                // Same hit on both sides
                events_a.extend(on_hit(&mut a, EntityId(1)));
                events_b.extend(on_hit(&mut b, EntityId(1)));
            }
        }
        assert_eq!(events_a, events_b);
        assert_eq!(a.score, b.score);
        assert_eq!(a.tick, b.tick);
    }

    #[test]
    fn test_moves_precede_no_removal_writes() {
        // An entity removed this tick gets no Moved event this tick
        let mut state = GameState::new(12, BOUNDS);
        for _ in 0..2000 {
            let events = tick(&mut state);
            let removed: Vec<EntityId> = events
                .iter()
                .filter_map(|e| match e {
                    GameEvent::Removed { id, .. } => Some(*id),
                    _ => None,
                })
                .collect();
            for id in &removed {
                assert!(
                    !events
                        .iter()
                        .any(|e| matches!(e, GameEvent::Moved { id: m, .. } if m == id)),
                    "removed entity also moved in the same tick"
                );
            }
        }
    }
}
