//! Embedding glue between the sim and a host application
//!
//! A [`GameSession`] owns the game state plus the three collaborator
//! backends. The host forwards frame callbacks (`on_tick` with a wall-clock
//! timestamp) and pointer hits; the session converts wall time into fixed
//! simulation steps and mirrors the resulting [`GameEvent`]s onto the
//! backends. It also owns the short-lived burst effects shown where targets
//! are hit - those are presentation only and never touch the sim.

use std::collections::HashMap;

use crate::backend::{AudioSink, Presenter, Renderer, VisualHandle, VisualKind};
use crate::consts::{BURST_LIFETIME_MS, MAX_SUBSTEPS, SIM_DT};
use crate::sim::{
    self, EntityId, EntityKind, GameEvent, GamePhase, GameState, LevelTable, RemovalReason,
};

/// A hit burst visual and its wall-clock removal time
#[derive(Debug, Clone, Copy)]
struct Burst {
    handle: VisualHandle,
    expires_at_ms: f64,
}

/// An interactive game session driving the three collaborator backends
pub struct GameSession<R, A, P> {
    state: GameState,
    renderer: R,
    audio: A,
    presenter: P,
    visuals: HashMap<EntityId, VisualHandle>,
    bursts: Vec<Burst>,
    accumulator: f32,
    last_now_ms: Option<f64>,
    now_ms: f64,
}

impl<R: Renderer, A: AudioSink, P: Presenter> GameSession<R, A, P> {
    /// New session on the built-in level table
    pub fn new(seed: u64, renderer: R, audio: A, presenter: P) -> Self {
        Self::with_table(seed, LevelTable::default(), renderer, audio, presenter)
    }

    /// New session on a custom level table
    pub fn with_table(
        seed: u64,
        table: LevelTable,
        renderer: R,
        audio: A,
        mut presenter: P,
    ) -> Self {
        let bounds = renderer.surface_bounds();
        let state = GameState::with_table(seed, bounds, table);
        presenter.show_score(0);
        presenter.show_level(1);
        Self {
            state,
            renderer,
            audio,
            presenter,
            visuals: HashMap::new(),
            bursts: Vec::new(),
            accumulator: 0.0,
            last_now_ms: None,
            now_ms: 0.0,
        }
    }

    /// Frame callback. `now_millis` is any monotonically increasing clock.
    pub fn on_tick(&mut self, now_millis: f64) {
        self.now_ms = now_millis;
        let dt = match self.last_now_ms {
            Some(last) => ((now_millis - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_now_ms = Some(now_millis);

        // Cap the catch-up work after a long stall
        self.accumulator += dt.min(0.25);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let events = sim::tick(&mut self.state);
            self.apply(events);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.prune_bursts();
    }

    /// Pointer hit on an entity, from the host's click/tap listener
    pub fn on_pointer_hit(&mut self, id: EntityId) {
        let events = sim::on_hit(&mut self.state, id);
        self.apply(events);
    }

    /// Restart after game over
    pub fn on_restart(&mut self) {
        let events = sim::on_restart(&mut self.state);
        self.apply(events);
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.state.score
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.state.level
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.state.registry.live_count()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mirror sim events onto the backends
    fn apply(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::Spawned { id, kind, pos } => {
                    let visual_kind = match kind {
                        EntityKind::Target => VisualKind::Target,
                        EntityKind::Trap => VisualKind::Trap,
                    };
                    let handle = self.renderer.create_visual(visual_kind);
                    self.renderer.set_position(handle, pos.x, pos.y);
                    self.visuals.insert(id, handle);
                }
                GameEvent::Moved { id, pos } => {
                    if let Some(&handle) = self.visuals.get(&id) {
                        self.renderer.set_position(handle, pos.x, pos.y);
                    }
                }
                GameEvent::Removed { id, pos, reason } => {
                    if let Some(handle) = self.visuals.remove(&id) {
                        self.renderer.destroy_visual(handle);
                    }
                    if reason == RemovalReason::Hit {
                        self.audio.play_hit_sound();
                        let burst = self.renderer.create_visual(VisualKind::Burst);
                        self.renderer.set_position(burst, pos.x, pos.y);
                        self.bursts.push(Burst {
                            handle: burst,
                            expires_at_ms: self.now_ms + BURST_LIFETIME_MS as f64,
                        });
                    }
                }
                GameEvent::ScoreChanged(score) => self.presenter.show_score(score),
                GameEvent::LevelChanged(level) => self.presenter.show_level(level),
                GameEvent::GameOver { final_score } => {
                    self.presenter.show_game_over(final_score)
                }
                GameEvent::Restarted => self.presenter.hide_game_over(),
            }
        }
    }

    /// Destroy burst visuals whose lifetime has elapsed
    fn prune_bursts(&mut self) {
        let now = self.now_ms;
        let renderer = &mut self.renderer;
        self.bursts.retain(|burst| {
            if now >= burst.expires_at_ms {
                renderer.destroy_visual(burst.handle);
                false
            } else {
                true
            }
        });
    }
}
