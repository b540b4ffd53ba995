//! Collaborator traits for the rendering, audio and presentation backends
//!
//! The sim never talks to these directly; [`crate::session::GameSession`]
//! translates [`crate::sim::GameEvent`]s into calls on them. Implementations
//! are expected to be cheap and infallible - a backend that can fail should
//! absorb the failure itself (log and continue), the way a dropped sound
//! effect or a missed frame would be absorbed in any arcade game.

use glam::Vec2;

/// Opaque handle to a visual created by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// What kind of visual to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    /// An ordinary target
    Target,
    /// A trap target (rendered distinctly or not, the backend's choice)
    Trap,
    /// Short-lived burst shown where a target was hit
    Burst,
}

/// Rendering surface collaborator
pub trait Renderer {
    fn create_visual(&mut self, kind: VisualKind) -> VisualHandle;
    fn set_position(&mut self, handle: VisualHandle, x: f32, y: f32);
    fn destroy_visual(&mut self, handle: VisualHandle);
    /// Surface dimensions in surface units (width, height)
    fn surface_bounds(&self) -> Vec2;
}

/// Audio collaborator
pub trait AudioSink {
    fn play_hit_sound(&mut self);
}

/// Score/level presentation collaborator
pub trait Presenter {
    fn show_score(&mut self, score: u32);
    fn show_level(&mut self, level: u32);
    fn show_game_over(&mut self, final_score: u32);
    fn hide_game_over(&mut self);
}

/// No-op backend for tests and headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend {
    next_handle: u64,
}

impl Renderer for NullBackend {
    fn create_visual(&mut self, _kind: VisualKind) -> VisualHandle {
        self.next_handle += 1;
        VisualHandle(self.next_handle)
    }

    fn set_position(&mut self, _handle: VisualHandle, _x: f32, _y: f32) {}

    fn destroy_visual(&mut self, _handle: VisualHandle) {}

    fn surface_bounds(&self) -> Vec2 {
        Vec2::new(800.0, 600.0)
    }
}

impl AudioSink for NullBackend {
    fn play_hit_sound(&mut self) {}
}

impl Presenter for NullBackend {
    fn show_score(&mut self, _score: u32) {}
    fn show_level(&mut self, _level: u32) {}
    fn show_game_over(&mut self, _final_score: u32) {}
    fn hide_game_over(&mut self) {}
}
