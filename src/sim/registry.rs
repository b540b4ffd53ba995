//! Entity registry
//!
//! Owns every live entity from creation to removal and enforces the active
//! level's population cap. Entities are kept in spawn order, and the sim
//! allocates ids monotonically, so iteration order is stable and runs stay
//! deterministic.

use super::state::{Entity, EntityId};

/// The set of currently-live entities
#[derive(Debug, Clone)]
pub struct Registry {
    entities: Vec<Entity>,
    cap: usize,
}

impl Registry {
    pub fn new(cap: usize) -> Self {
        Self {
            entities: Vec::with_capacity(cap),
            cap,
        }
    }

    /// Active population cap
    #[inline]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Reconfigure the cap (level transition). Never evicts; the caller
    /// drains via [`Registry::clear_all`] first.
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
    }

    /// Register a freshly created entity. Returns `None` without touching
    /// the registry when the population is at the cap - a silent no-op,
    /// not a failure.
    pub fn spawn(&mut self, entity: Entity) -> Option<EntityId> {
        if self.entities.len() >= self.cap {
            log::debug!("spawn rejected at cap {}", self.cap);
            return None;
        }
        let id = entity.id;
        self.entities.push(entity);
        Some(id)
    }

    /// Remove a live entity, returning it. Idempotent: unknown or
    /// already-removed ids yield `None` and change nothing.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    /// Drain every live entity. Afterwards the registry is indistinguishable
    /// from a fresh instance with the same cap.
    pub fn clear_all(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.entities)
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }
}
