//! In-memory host used by tests and the native demo
//!
//! Records every call; moves nothing on its own. Callers place entities with
//! `set_position` to stage a scenario.

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;

use super::host::{Body, Effect, EntityId, Facing, Host, Sprite};
use crate::sim::geometry::Aabb;

/// Default body size for entities without an explicit one
const DEFAULT_BODY_SIZE: Vec2 = Vec2::new(32.0, 32.0);

/// A recorded engine object
#[derive(Debug, Clone)]
pub struct HeadlessEntity {
    pub sprite: Sprite,
    pub body: Body,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub gravity: bool,
    pub facing: Facing,
}

#[derive(Debug, Default)]
pub struct HeadlessHost {
    pub entities: BTreeMap<EntityId, HeadlessEntity>,
    pub grounded: HashSet<EntityId>,
    pub camera: Vec2,
    pub physics_paused: bool,
    pub effects: Vec<Effect>,
    pub spawned: usize,
    pub destroyed: usize,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn count(&self, sprite: Sprite) -> usize {
        self.entities.values().filter(|e| e.sprite == sprite).count()
    }

    pub fn set_grounded(&mut self, id: EntityId, grounded: bool) {
        if grounded {
            self.grounded.insert(id);
        } else {
            self.grounded.remove(&id);
        }
    }

    pub fn set_size(&mut self, id: EntityId, size: Vec2) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.size = size;
        }
    }
}

impl Host for HeadlessHost {
    fn spawn(&mut self, id: EntityId, sprite: Sprite, pos: Vec2, body: Body) {
        self.spawned += 1;
        self.entities.insert(
            id,
            HeadlessEntity {
                sprite,
                body,
                pos,
                vel: Vec2::ZERO,
                size: DEFAULT_BODY_SIZE,
                gravity: matches!(body, Body::Falling),
                facing: Facing::Right,
            },
        );
    }

    fn destroy(&mut self, id: EntityId) {
        if self.entities.remove(&id).is_some() {
            self.destroyed += 1;
        }
        self.grounded.remove(&id);
    }

    fn position(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id).map(|e| e.pos)
    }

    fn set_position(&mut self, id: EntityId, pos: Vec2) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.pos = pos;
        }
    }

    fn velocity(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id).map(|e| e.vel)
    }

    fn set_velocity_x(&mut self, id: EntityId, vx: f32) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.vel.x = vx;
        }
    }

    fn set_velocity_y(&mut self, id: EntityId, vy: f32) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.vel.y = vy;
        }
    }

    fn set_gravity(&mut self, id: EntityId, enabled: bool) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.gravity = enabled;
        }
    }

    fn is_grounded(&self, id: EntityId) -> bool {
        self.grounded.contains(&id)
    }

    fn bounds(&self, id: EntityId) -> Option<Aabb> {
        self.entities
            .get(&id)
            .map(|e| Aabb::from_center(e.pos, e.size))
    }

    fn set_facing(&mut self, id: EntityId, facing: Facing) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.facing = facing;
        }
    }

    fn camera(&self) -> Vec2 {
        self.camera
    }

    fn set_camera(&mut self, scroll: Vec2) {
        self.camera = scroll;
    }

    fn set_physics_paused(&mut self, paused: bool) {
        self.physics_paused = paused;
    }

    fn play(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}
