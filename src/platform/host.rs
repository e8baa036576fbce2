//! The boundary between gameplay rules and the 2D engine that renders them
//!
//! The engine owns sprites, physics bodies, gravity, collision detection and
//! the camera. Gameplay code only ever talks to it through [`Host`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::geometry::Aabb;

/// Handle for an engine object, allocated by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Monster appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterKind {
    A,
    B,
}

/// What the engine should draw for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sprite {
    Player,
    Brick,
    Coin,
    ShootingAbility,
    SpeedAbility,
    Monster(MonsterKind),
    Bullet,
}

impl Sprite {
    /// Texture key the engine preloads
    pub fn texture_key(&self) -> &'static str {
        match self {
            Sprite::Player => "gengar",
            Sprite::Brick => "brick",
            Sprite::Coin => "coin",
            Sprite::ShootingAbility => "shooting_ability",
            Sprite::SpeedAbility => "speed_ability",
            Sprite::Monster(MonsterKind::A) => "monster_1",
            Sprite::Monster(MonsterKind::B) => "monster_2",
            Sprite::Bullet => "bullet",
        }
    }

    pub fn scale(&self) -> f32 {
        match self {
            Sprite::Coin | Sprite::Monster(_) => 0.8,
            Sprite::ShootingAbility | Sprite::SpeedAbility => 2.0,
            _ => 1.0,
        }
    }
}

/// Physics body attached on spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    /// Immovable, collidable (bricks)
    Static,
    /// Dynamic but unaffected by gravity (coins, bullets)
    Floating,
    /// Dynamic and falls under world gravity (drops, monsters)
    Falling,
    /// Player body: collides with world bounds, gravity enabled later
    Player,
}

/// Horizontal facing of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Cosmetic effects the engine plays with its particle and tween systems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Speed-boost trail behind the player
    SpeedTrail { pos: Vec2, facing: Facing },
    SpeedTrailOff,
    /// Bullet hit a platform or a monster
    Explosion { pos: Vec2 },
    /// Bullet ran out of range
    Fizzle { pos: Vec2 },
    /// Player death hop-and-fall with a particle burst
    Death { pos: Vec2 },
    CameraShake { duration_ms: u32, intensity: f32 },
}

/// Engine services consumed by the simulation
///
/// Lookups return `None` for ids the engine no longer knows about; callers
/// skip the rule instead of failing.
pub trait Host {
    fn spawn(&mut self, id: EntityId, sprite: Sprite, pos: Vec2, body: Body);
    fn destroy(&mut self, id: EntityId);

    fn position(&self, id: EntityId) -> Option<Vec2>;
    fn set_position(&mut self, id: EntityId, pos: Vec2);
    fn velocity(&self, id: EntityId) -> Option<Vec2>;
    fn set_velocity_x(&mut self, id: EntityId, vx: f32);
    fn set_velocity_y(&mut self, id: EntityId, vy: f32);
    fn set_gravity(&mut self, id: EntityId, enabled: bool);
    /// Body is resting on something below it
    fn is_grounded(&self, id: EntityId) -> bool;
    /// Physics body bounds in world space
    fn bounds(&self, id: EntityId) -> Option<Aabb>;
    fn set_facing(&mut self, id: EntityId, facing: Facing);

    /// Camera scroll offset (top-left of the view)
    fn camera(&self) -> Vec2;
    fn set_camera(&mut self, scroll: Vec2);

    fn set_physics_paused(&mut self, paused: bool);
    fn play(&mut self, effect: Effect);
}
