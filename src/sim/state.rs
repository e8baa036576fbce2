//! Game state and core simulation types
//!
//! Positions and velocities live in the host engine; this is the bookkeeping
//! the gameplay rules need on top of it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::events::GameEvent;
use super::lifecycle::SegmentTrack;
use super::status::Status;
use crate::platform::{Body, EntityId, Facing, Host, Sprite};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamePhase {
    /// Scene not built yet
    Loading,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Death animation running (seconds left)
    Dying { timer: f32 },
    /// Run ended
    GameOver,
}

/// Hands out entity ids; never reuses one within a session
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    next: u32,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Player bookkeeping (body lives in the host)
#[derive(Debug, Clone)]
pub struct Player {
    pub id: EntityId,
    pub facing: Facing,
    /// Jumps since last touching a platform (max 2)
    pub jump_count: u8,
    /// Seconds until the next shot is allowed
    pub shoot_cooldown: f32,
    /// Seconds until gravity switches on after spawn
    pub gravity_delay: Option<f32>,
    /// Speed trail currently emitting
    pub trail_on: bool,
}

impl Player {
    pub fn new(id: EntityId, tuning: &Tuning) -> Self {
        Self {
            id,
            facing: Facing::Right,
            jump_count: 0,
            shoot_cooldown: 0.0,
            gravity_delay: Some(tuning.gravity_delay_ms as f32 / 1000.0),
            trail_on: false,
        }
    }
}

/// An energy ball fired by the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub id: EntityId,
    pub origin_x: f32,
    pub facing: Facing,
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    pub tuning: Tuning,
    /// Run seed (logged for bug reports)
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub track: SegmentTrack,
    pub status: Status,
    pub ids: EntityAllocator,
}

impl GameState {
    /// Create a new session; nothing is spawned until [`GameState::start`]
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut ids = EntityAllocator::default();
        let player = Player::new(ids.allocate(), &tuning);
        Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Loading,
            player,
            bullets: Vec::new(),
            track: SegmentTrack::new(),
            status: Status::new(),
            ids,
        }
    }

    /// Build the scene: player, opening segments, HUD values
    pub fn start<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.phase != GamePhase::Loading {
            log::warn!("Scene already started");
            return;
        }

        let start = Vec2::new(
            self.tuning.player_start_x,
            self.tuning.ground_y() - self.tuning.player_start_lift,
        );
        host.spawn(self.player.id, Sprite::Player, start, Body::Player);
        host.set_gravity(self.player.id, false);

        self.track
            .bootstrap(&mut self.rng, host, &mut self.ids, &self.tuning);

        self.status.announce();
        self.phase = GamePhase::Playing;
        self.status.emit(GameEvent::SceneReady);

        log::info!("Scene ready (seed {}, {} segments)", self.seed, self.track.len());
    }

    /// Destroy everything this session spawned (scene restart)
    pub fn teardown<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.track.clear(host);
        for bullet in self.bullets.drain(..) {
            host.destroy(bullet.id);
        }
        host.destroy(self.player.id);
        self.phase = GamePhase::Loading;
        log::info!("Scene torn down (seed {})", self.seed);
    }

    /// Player position, if the host still has the body
    pub fn player_pos<H: Host + ?Sized>(&self, host: &H) -> Option<Vec2> {
        host.position(self.player.id)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}
