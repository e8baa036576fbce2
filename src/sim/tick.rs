//! Per-frame gameplay update
//!
//! The host runs physics and reports contacts; this applies the game rules on
//! top: movement intent, jumps, shooting, pickups, monster patrols, death and
//! the segment lifecycle.

use glam::Vec2;

use super::events::GameEvent;
use super::state::{Bullet, GamePhase, GameState};
use super::status::AbilityKind;
use crate::consts::*;
use crate::platform::{Body, Effect, EntityId, Facing, Host, Sprite};

/// A collision or overlap the host detected since the previous frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Player is touching a platform
    PlayerPlatform,
    PlayerCoin(EntityId),
    PlayerPowerUp(EntityId),
    PlayerMonster(EntityId),
    BulletCoin { bullet: EntityId, coin: EntityId },
    BulletPowerUp { bullet: EntityId, powerup: EntityId },
    BulletMonster { bullet: EntityId, monster: EntityId },
    BulletPlatform { bullet: EntityId },
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump key went down this frame
    pub jump: bool,
    /// Shoot key is held
    pub shoot: bool,
    /// Pause toggle
    pub pause: bool,
    pub contacts: Vec<Contact>,
}

/// Input flag bits reported by the host's update hook
pub mod input_flags {
    pub const LEFT: u32 = 1;
    pub const RIGHT: u32 = 2;
    pub const JUMP: u32 = 4;
    pub const SHOOT: u32 = 8;
    pub const PAUSE: u32 = 16;
}

impl TickInput {
    pub fn from_flags(flags: u32, contacts: Vec<Contact>) -> Self {
        Self {
            left: flags & input_flags::LEFT != 0,
            right: flags & input_flags::RIGHT != 0,
            jump: flags & input_flags::JUMP != 0,
            shoot: flags & input_flags::SHOOT != 0,
            pause: flags & input_flags::PAUSE != 0,
            contacts,
        }
    }
}

impl Contact {
    /// Numeric form used by the host's collider callbacks: `(kind, a, b)`
    ///
    /// `a` is the bullet for bullet contacts and unused (0) for player ones.
    pub fn encode(&self) -> (u32, u32, u32) {
        match *self {
            Contact::PlayerPlatform => (0, 0, 0),
            Contact::PlayerCoin(coin) => (1, 0, coin.0),
            Contact::PlayerPowerUp(powerup) => (2, 0, powerup.0),
            Contact::PlayerMonster(monster) => (3, 0, monster.0),
            Contact::BulletCoin { bullet, coin } => (4, bullet.0, coin.0),
            Contact::BulletPowerUp { bullet, powerup } => (5, bullet.0, powerup.0),
            Contact::BulletMonster { bullet, monster } => (6, bullet.0, monster.0),
            Contact::BulletPlatform { bullet } => (7, bullet.0, 0),
        }
    }

    pub fn decode(kind: u32, a: u32, b: u32) -> Option<Self> {
        let (a, b) = (EntityId(a), EntityId(b));
        Some(match kind {
            0 => Contact::PlayerPlatform,
            1 => Contact::PlayerCoin(b),
            2 => Contact::PlayerPowerUp(b),
            3 => Contact::PlayerMonster(b),
            4 => Contact::BulletCoin { bullet: a, coin: b },
            5 => Contact::BulletPowerUp { bullet: a, powerup: b },
            6 => Contact::BulletMonster { bullet: a, monster: b },
            7 => Contact::BulletPlatform { bullet: a },
            _ => {
                log::warn!("Unknown contact code {}", kind);
                return None;
            }
        })
    }
}

/// Advance the game by one frame of `dt` seconds
pub fn tick<H: Host + ?Sized>(state: &mut GameState, host: &mut H, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                // Contacts reported before the pause still count
                resolve_contacts(state, host, &input.contacts);
                if state.phase == GamePhase::Playing {
                    state.phase = GamePhase::Paused;
                    host.set_physics_paused(true);
                    log::info!("Paused");
                }
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                host.set_physics_paused(false);
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Playing => {}
        GamePhase::Dying { timer } => {
            let timer = timer - dt;
            if timer <= 0.0 {
                state.phase = GamePhase::GameOver;
                state.status.emit(GameEvent::GameOver);
                log::info!("Game over - final score {}", state.status.score());
            } else {
                state.phase = GamePhase::Dying { timer };
            }
            return;
        }
        GamePhase::Loading | GamePhase::Paused | GamePhase::GameOver => return,
    }

    if let Some(delay) = state.player.gravity_delay {
        let delay = delay - dt;
        if delay <= 0.0 {
            host.set_gravity(state.player.id, true);
            state.player.gravity_delay = None;
        } else {
            state.player.gravity_delay = Some(delay);
        }
    }

    state.status.advance(dt);
    state.player.shoot_cooldown = (state.player.shoot_cooldown - dt).max(0.0);

    resolve_contacts(state, host, &input.contacts);
    if state.phase != GamePhase::Playing {
        return;
    }

    let Some(pos) = state.player_pos(host) else {
        return;
    };

    move_player(state, host, input, pos);
    if input.jump {
        jump(state, host);
    }
    if input.shoot {
        shoot(state, host, pos);
    }
    update_bullets(state, host);
    follow_vertically(state, host, pos);

    if pos.y > state.tuning.ground_y() + state.tuning.death_margin {
        kill_player(state, host, pos);
        return;
    }

    patrol_monsters(state, host);

    state
        .track
        .update(pos.x, &mut state.rng, host, &mut state.ids, &state.tuning);
}

/// Stops early once a contact ends the run
fn resolve_contacts<H: Host + ?Sized>(state: &mut GameState, host: &mut H, contacts: &[Contact]) {
    for contact in contacts {
        resolve_contact(state, host, *contact);
        if state.phase != GamePhase::Playing {
            return;
        }
    }
}

fn resolve_contact<H: Host + ?Sized>(state: &mut GameState, host: &mut H, contact: Contact) {
    match contact {
        Contact::PlayerPlatform => {
            state.player.jump_count = 0;
        }
        Contact::PlayerCoin(coin) => {
            if let Some(coin) = state.track.take_coin(coin) {
                host.destroy(coin.id);
                state.status.add_score(state.tuning.coin_points);
            }
        }
        Contact::PlayerPowerUp(powerup) => {
            if let Some(powerup) = state.track.take_powerup(powerup) {
                host.destroy(powerup.id);
                grant_ability(state, powerup.ability);
            }
        }
        Contact::PlayerMonster(monster) => {
            let (Some(player), Some(body)) = (host.bounds(state.player.id), host.bounds(monster)) else {
                return;
            };
            if player.bottom() <= body.top() + state.tuning.stomp_tolerance {
                if let Some(monster) = state.track.take_monster(monster) {
                    host.destroy(monster.id);
                    state.status.add_score(state.tuning.monster_points);
                    host.set_velocity_y(state.player.id, state.tuning.stomp_bounce);
                }
            } else if let Some(pos) = state.player_pos(host) {
                kill_player(state, host, pos);
            }
        }
        Contact::BulletCoin { bullet, coin } => {
            if !has_bullet(state, bullet) {
                return;
            }
            if let Some(coin) = state.track.take_coin(coin) {
                remove_bullet(state, host, bullet);
                host.destroy(coin.id);
                state.status.add_score(state.tuning.coin_points);
            }
        }
        Contact::BulletPowerUp { bullet, powerup } => {
            if !has_bullet(state, bullet) {
                return;
            }
            if let Some(powerup) = state.track.take_powerup(powerup) {
                remove_bullet(state, host, bullet);
                host.destroy(powerup.id);
                grant_ability(state, powerup.ability);
            }
        }
        Contact::BulletMonster { bullet, monster } => {
            if !has_bullet(state, bullet) {
                return;
            }
            let hit = host.position(monster);
            if let Some(monster) = state.track.take_monster(monster) {
                remove_bullet(state, host, bullet);
                host.destroy(monster.id);
                if let Some(pos) = hit {
                    host.play(Effect::Explosion { pos });
                }
                host.play(Effect::CameraShake {
                    duration_ms: 100,
                    intensity: 0.005,
                });
                state.status.add_score(state.tuning.monster_points);
            }
        }
        Contact::BulletPlatform { bullet } => {
            if let Some(pos) = host.position(bullet) {
                if remove_bullet(state, host, bullet) {
                    host.play(Effect::Explosion { pos });
                }
            }
        }
    }
}

fn grant_ability(state: &mut GameState, ability: AbilityKind) {
    let duration = match ability {
        AbilityKind::Shooting => state.tuning.shooting_duration_ms,
        AbilityKind::Speed => state.tuning.speed_duration_ms,
    };
    state.status.set_ability(ability, duration as i64);
}

fn has_bullet(state: &GameState, id: EntityId) -> bool {
    state.bullets.iter().any(|b| b.id == id)
}

/// Returns false if the bullet was already gone
fn remove_bullet<H: Host + ?Sized>(state: &mut GameState, host: &mut H, id: EntityId) -> bool {
    match state.bullets.iter().position(|b| b.id == id) {
        Some(index) => {
            state.bullets.swap_remove(index);
            host.destroy(id);
            true
        }
        None => false,
    }
}

fn kill_player<H: Host + ?Sized>(state: &mut GameState, host: &mut H, pos: Vec2) {
    if matches!(state.phase, GamePhase::Dying { .. } | GamePhase::GameOver) {
        return;
    }
    let id = state.player.id;
    state.phase = GamePhase::Dying {
        timer: state.tuning.death_animation_ms as f32 / 1000.0,
    };
    state.status.clear_abilities();
    state.player.trail_on = false;

    host.set_velocity_x(id, 0.0);
    host.set_velocity_y(id, 0.0);
    host.set_gravity(id, false);
    host.play(Effect::SpeedTrailOff);
    host.play(Effect::CameraShake {
        duration_ms: 200,
        intensity: 0.01,
    });
    host.play(Effect::Death { pos });

    log::info!("Player died at ({:.0}, {:.0})", pos.x, pos.y);
}

fn move_player<H: Host + ?Sized>(state: &mut GameState, host: &mut H, input: &TickInput, pos: Vec2) {
    let tuning = &state.tuning;
    let id = state.player.id;
    let boosted = state.status.has(AbilityKind::Speed);
    let speed = if boosted {
        tuning.boosted_speed
    } else {
        tuning.normal_speed
    };
    let mut camera = host.camera();
    let left_edge = camera.x + tuning.player_half_width;

    if input.right {
        host.set_velocity_x(id, speed);
        state.player.facing = Facing::Right;

        if pos.x > camera.x + tuning.camera_lead {
            camera.x = pos.x - tuning.camera_lead;
            host.set_camera(camera);
        }
    } else if input.left {
        if pos.x <= left_edge {
            host.set_position(id, Vec2::new(left_edge, pos.y));
            host.set_velocity_x(id, 0.0);
        } else {
            host.set_velocity_x(id, -speed);
        }
        state.player.facing = Facing::Left;
    } else {
        if pos.x < left_edge {
            host.set_position(id, Vec2::new(left_edge, pos.y));
        }
        host.set_velocity_x(id, 0.0);
    }
    host.set_facing(id, state.player.facing);

    let moving = input.left || input.right;
    if moving && boosted {
        let behind = Vec2::new(-state.player.facing.sign() * 20.0, 0.0);
        host.play(Effect::SpeedTrail {
            pos: pos + behind,
            facing: state.player.facing,
        });
        state.player.trail_on = true;
    } else if state.player.trail_on {
        host.play(Effect::SpeedTrailOff);
        state.player.trail_on = false;
    }
}

fn jump<H: Host + ?Sized>(state: &mut GameState, host: &mut H) {
    let tuning = &state.tuning;
    let id = state.player.id;
    let base = if state.status.has(AbilityKind::Speed) {
        tuning.boosted_jump_velocity
    } else {
        tuning.normal_jump_velocity
    };
    // Running jumps go higher
    let vx = host.velocity(id).map(|v| v.x.abs()).unwrap_or(0.0);
    let velocity = base * (1.0 + vx / tuning.normal_speed * tuning.jump_speed_bonus);

    if host.is_grounded(id) {
        host.set_velocity_y(id, velocity);
        state.player.jump_count = 1;
    } else if state.player.jump_count == 1 {
        host.set_velocity_y(id, velocity * tuning.second_jump_multiplier);
        state.player.jump_count = 2;
    }
}

fn shoot<H: Host + ?Sized>(state: &mut GameState, host: &mut H, pos: Vec2) {
    if !state.status.has(AbilityKind::Shooting) || state.player.shoot_cooldown > 0.0 {
        return;
    }
    let tuning = &state.tuning;
    let facing = state.player.facing;
    let origin = pos + Vec2::new(facing.sign() * tuning.bullet_offset, 5.0);

    let id = state.ids.allocate();
    host.spawn(id, Sprite::Bullet, origin, Body::Floating);
    host.set_velocity_x(id, facing.sign() * tuning.bullet_speed);
    state.bullets.push(Bullet {
        id,
        origin_x: origin.x,
        facing,
    });
    state.player.shoot_cooldown = tuning.shoot_cooldown_ms as f32 / 1000.0;
}

/// Drop bullets the host lost and fizzle the ones past their range
fn update_bullets<H: Host + ?Sized>(state: &mut GameState, host: &mut H) {
    let range = state.tuning.bullet_range;
    state.bullets.retain(|bullet| match host.position(bullet.id) {
        Some(pos) if (pos.x - bullet.origin_x).abs() >= range => {
            host.play(Effect::Fizzle { pos });
            host.destroy(bullet.id);
            false
        }
        Some(_) => true,
        None => false,
    });
}

fn follow_vertically<H: Host + ?Sized>(state: &GameState, host: &mut H, pos: Vec2) {
    let tuning = &state.tuning;
    let mut camera = host.camera();
    let target_y = if pos.y > tuning.camera_ground_level {
        pos.y - tuning.screen_height / 2.0
    } else {
        0.0
    };
    camera.y += (target_y - camera.y) * tuning.camera_ease;
    host.set_camera(camera.round());
}

fn patrol_monsters<H: Host + ?Sized>(state: &mut GameState, host: &mut H) {
    for monster in state.track.monsters_mut() {
        let Some(pos) = host.position(monster.id) else {
            continue;
        };
        if let Some(x) = monster.patrol(pos.x) {
            host.set_position(monster.id, Vec2::new(x, pos.y));
        }
        host.set_facing(monster.id, monster.direction);
        host.set_velocity_x(monster.id, monster.velocity_x());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessHost;
    use crate::tuning::Tuning;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn started(seed: u64) -> (GameState, HeadlessHost, Rc<RefCell<Vec<GameEvent>>>) {
        let mut host = HeadlessHost::new();
        let mut state = GameState::new(Tuning::default(), seed);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        state.status.subscribe(move |e: &GameEvent| sink.borrow_mut().push(*e));
        state.start(&mut host);
        (state, host, events)
    }

    fn contacts(contacts: Vec<Contact>) -> TickInput {
        TickInput {
            contacts,
            ..Default::default()
        }
    }

    fn first_coin(state: &GameState) -> EntityId {
        state
            .track
            .segments()
            .flat_map(|s| s.coins.iter())
            .map(|c| c.id)
            .next()
            .expect("opening segments have coins")
    }

    /// Find a monster, generating extra segments if the opening ones have none
    fn some_monster(state: &mut GameState, host: &mut HeadlessHost) -> EntityId {
        let mut start_x = 10_000.0;
        loop {
            if let Some(m) = state.track.segments().flat_map(|s| s.monsters.iter()).next() {
                return m.id;
            }
            state
                .track
                .spawn_segment(start_x, &mut state.rng, host, &mut state.ids, &state.tuning);
            start_x += 800.0;
        }
    }

    /// Grant shooting and fire one bullet to the right
    fn fire(state: &mut GameState, host: &mut HeadlessHost) -> EntityId {
        state.status.set_ability(AbilityKind::Shooting, 20_000);
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(state, host, &shoot, DT);
        state.bullets[0].id
    }

    #[test]
    fn test_gravity_enabled_after_delay() {
        let (mut state, mut host, _) = started(1);
        tick(&mut state, &mut host, &TickInput::default(), 0.05);
        assert!(!host.entities[&state.player.id].gravity);
        tick(&mut state, &mut host, &TickInput::default(), 0.06);
        assert!(host.entities[&state.player.id].gravity);
    }

    #[test]
    fn test_coin_scores_once() {
        let (mut state, mut host, events) = started(2);
        let coin = first_coin(&state);
        let input = contacts(vec![Contact::PlayerCoin(coin), Contact::PlayerCoin(coin)]);
        tick(&mut state, &mut host, &input, DT);
        assert_eq!(state.status.score(), 10);
        assert!(!host.contains(coin));
        assert_eq!(events.borrow().last(), Some(&GameEvent::ScoreChanged { score: 10 }));
    }

    #[test]
    fn test_powerup_grants_ability() {
        let (mut state, mut host, _) = started(3);
        let powerup = state.track.segments().next().unwrap().powerups[0];
        tick(&mut state, &mut host, &contacts(vec![Contact::PlayerPowerUp(powerup.id)]), DT);
        assert!(state.status.has(powerup.ability));
        assert_eq!(state.status.timer(powerup.ability).remaining_ms(), 20_000);
        assert!(!host.contains(powerup.id));
    }

    #[test]
    fn test_stomp_kills_monster() {
        let (mut state, mut host, _) = started(4);
        let monster = some_monster(&mut state, &mut host);
        host.set_position(state.player.id, Vec2::new(300.0, 400.0));
        host.set_position(monster, Vec2::new(300.0, 440.0));

        tick(&mut state, &mut host, &contacts(vec![Contact::PlayerMonster(monster)]), DT);

        assert_eq!(state.status.score(), 20);
        assert!(!host.contains(monster));
        assert_eq!(host.entities[&state.player.id].vel.y, -300.0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_side_hit_kills_player() {
        let (mut state, mut host, events) = started(5);
        let monster = some_monster(&mut state, &mut host);
        state.status.set_ability(AbilityKind::Speed, 20_000);
        host.set_position(state.player.id, Vec2::new(300.0, 440.0));
        host.set_position(monster, Vec2::new(320.0, 440.0));

        tick(&mut state, &mut host, &contacts(vec![Contact::PlayerMonster(monster)]), DT);

        assert!(matches!(state.phase, GamePhase::Dying { .. }));
        assert!(!state.status.has(AbilityKind::Speed));
        assert!(host.contains(monster));
        assert!(host.effects.iter().any(|e| matches!(e, Effect::Death { .. })));

        for _ in 0..12 {
            tick(&mut state, &mut host, &TickInput::default(), 0.1);
        }
        assert!(state.is_over());
        assert_eq!(events.borrow().last(), Some(&GameEvent::GameOver));
        let game_overs = events.borrow().iter().filter(|e| **e == GameEvent::GameOver).count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_falling_off_screen_kills() {
        let (mut state, mut host, _) = started(6);
        host.set_position(state.player.id, Vec2::new(300.0, 700.0));
        tick(&mut state, &mut host, &TickInput::default(), DT);
        assert!(matches!(state.phase, GamePhase::Dying { .. }));
    }

    #[test]
    fn test_double_jump_only() {
        let (mut state, mut host, _) = started(7);
        let id = state.player.id;
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };

        host.set_grounded(id, true);
        tick(&mut state, &mut host, &jump, DT);
        assert_eq!(host.entities[&id].vel.y, -400.0);

        host.set_grounded(id, false);
        host.set_velocity_y(id, 0.0);
        tick(&mut state, &mut host, &jump, DT);
        assert_eq!(host.entities[&id].vel.y, -350.0);

        host.set_velocity_y(id, 0.0);
        tick(&mut state, &mut host, &jump, DT);
        assert_eq!(host.entities[&id].vel.y, 0.0);

        // Landing resets the count
        tick(&mut state, &mut host, &contacts(vec![Contact::PlayerPlatform]), DT);
        assert_eq!(state.player.jump_count, 0);
    }

    #[test]
    fn test_running_jump_is_higher() {
        let (mut state, mut host, _) = started(8);
        let id = state.player.id;
        host.set_grounded(id, true);
        host.set_velocity_x(id, 300.0);
        let input = TickInput {
            right: true,
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &mut host, &input, DT);
        assert!((host.entities[&id].vel.y - -480.0).abs() < 0.01);
    }

    #[test]
    fn test_shooting_respects_cooldown_and_range() {
        let (mut state, mut host, _) = started(9);
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };

        // No ability, no bullet
        tick(&mut state, &mut host, &shoot, DT);
        assert!(state.bullets.is_empty());

        state.status.set_ability(AbilityKind::Shooting, 20_000);
        tick(&mut state, &mut host, &shoot, DT);
        tick(&mut state, &mut host, &shoot, DT);
        assert_eq!(state.bullets.len(), 1);
        let bullet = state.bullets[0];
        assert_eq!(host.entities[&bullet.id].vel.x, 800.0);

        // Carry the bullet out of range
        host.set_position(bullet.id, Vec2::new(bullet.origin_x + 500.0, 450.0));
        tick(&mut state, &mut host, &TickInput::default(), 0.1);
        tick(&mut state, &mut host, &TickInput::default(), 0.1);
        assert!(!host.contains(bullet.id));
        assert!(host.effects.iter().any(|e| matches!(e, Effect::Fizzle { .. })));

        tick(&mut state, &mut host, &shoot, DT);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_bullet_kills_monster() {
        let (mut state, mut host, _) = started(10);
        let monster = some_monster(&mut state, &mut host);
        state.status.set_ability(AbilityKind::Shooting, 20_000);
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(&mut state, &mut host, &shoot, DT);
        let bullet = state.bullets[0].id;

        let hit = contacts(vec![
            Contact::BulletMonster { bullet, monster },
            Contact::BulletCoin {
                bullet,
                coin: first_coin(&state),
            },
        ]);
        tick(&mut state, &mut host, &hit, DT);

        // The bullet is spent on the monster; the coin survives
        assert_eq!(state.status.score(), 20);
        assert!(!host.contains(monster));
        assert!(!host.contains(bullet));
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_pause_freezes_timers() {
        let (mut state, mut host, _) = started(11);
        state.status.set_ability(AbilityKind::Speed, 5000);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &mut host, &pause, DT);
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(host.physics_paused);

        for _ in 0..30 {
            tick(&mut state, &mut host, &TickInput::default(), 0.1);
        }
        assert_eq!(state.status.timer(AbilityKind::Speed).remaining_ms(), 5000);

        tick(&mut state, &mut host, &pause, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!host.physics_paused);
    }

    #[test]
    fn test_running_right_scrolls_and_extends() {
        let (mut state, mut host, _) = started(12);
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        host.set_position(state.player.id, Vec2::new(650.0, 400.0));
        tick(&mut state, &mut host, &right, DT);

        assert_eq!(host.camera.x, 250.0);
        assert_eq!(host.entities[&state.player.id].vel.x, 300.0);
        assert_eq!(state.track.len(), 4);
    }

    #[test]
    fn test_left_edge_clamp() {
        let (mut state, mut host, _) = started(13);
        host.camera = Vec2::new(200.0, 0.0);
        host.set_position(state.player.id, Vec2::new(210.0, 400.0));
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        tick(&mut state, &mut host, &left, DT);
        assert_eq!(host.entities[&state.player.id].pos.x, 216.0);
        assert_eq!(host.entities[&state.player.id].vel.x, 0.0);
        assert_eq!(host.entities[&state.player.id].facing, Facing::Left);
    }

    #[test]
    fn test_camera_eases_below_ground() {
        let (mut state, mut host, _) = started(14);
        host.set_position(state.player.id, Vec2::new(100.0, 600.0));
        tick(&mut state, &mut host, &TickInput::default(), DT);
        // Target is 600 - 300 = 300, eased 10%
        assert_eq!(host.camera.y, 30.0);
    }

    #[test]
    fn test_stale_contacts_are_ignored() {
        let (mut state, mut host, _) = started(15);
        let ghost = EntityId(u32::MAX);
        let input = contacts(vec![
            Contact::PlayerCoin(ghost),
            Contact::PlayerPowerUp(ghost),
            Contact::PlayerMonster(ghost),
            Contact::BulletPlatform { bullet: ghost },
        ]);
        tick(&mut state, &mut host, &input, DT);
        assert_eq!(state.status.score(), 0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_bullet_collects_coin() {
        let (mut state, mut host, _) = started(16);
        let bullet = fire(&mut state, &mut host);
        let coin = first_coin(&state);

        tick(&mut state, &mut host, &contacts(vec![Contact::BulletCoin { bullet, coin }]), DT);

        assert_eq!(state.status.score(), 10);
        assert!(!host.contains(coin));
        assert!(!host.contains(bullet));
        assert!(state.bullets.is_empty());
        assert!(state.track.take_coin(coin).is_none());
    }

    #[test]
    fn test_bullet_collects_powerup() {
        let (mut state, mut host, _) = started(17);
        let bullet = fire(&mut state, &mut host);
        let powerup = state.track.segments().next().unwrap().powerups[0];
        state.status.set_ability(powerup.ability, 1000);

        let hit = contacts(vec![Contact::BulletPowerUp {
            bullet,
            powerup: powerup.id,
        }]);
        tick(&mut state, &mut host, &hit, DT);

        assert_eq!(state.status.timer(powerup.ability).remaining_ms(), 20_000);
        assert!(!host.contains(powerup.id));
        assert!(!host.contains(bullet));
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_bullet_explodes_on_platform() {
        let (mut state, mut host, _) = started(18);
        let bullet = fire(&mut state, &mut host);
        let pos = host.position(bullet).unwrap();

        tick(&mut state, &mut host, &contacts(vec![Contact::BulletPlatform { bullet }]), DT);

        assert!(!host.contains(bullet));
        assert!(state.bullets.is_empty());
        assert!(host.effects.contains(&Effect::Explosion { pos }));
    }

    #[test]
    fn test_monsters_patrol_each_frame() {
        let (mut state, mut host, _) = started(19);
        let id = some_monster(&mut state, &mut host);
        let monster = *state
            .track
            .segments()
            .flat_map(|s| s.monsters.iter())
            .find(|m| m.id == id)
            .unwrap();

        host.set_position(id, Vec2::new(monster.right_bound + 5.0, 400.0));
        tick(&mut state, &mut host, &TickInput::default(), DT);
        assert_eq!(host.entities[&id].pos.x, monster.right_bound);
        assert_eq!(host.entities[&id].vel.x, -100.0);
        assert_eq!(host.entities[&id].facing, Facing::Left);

        host.set_position(id, Vec2::new(monster.left_bound - 1.0, 400.0));
        tick(&mut state, &mut host, &TickInput::default(), DT);
        assert_eq!(host.entities[&id].pos.x, monster.left_bound);
        assert_eq!(host.entities[&id].vel.x, 100.0);
        assert_eq!(host.entities[&id].facing, Facing::Right);
    }

    #[test]
    fn test_stomp_tolerance_edge() {
        for (player_y, stomped) in [(410.0, true), (411.0, false)] {
            let (mut state, mut host, _) = started(20);
            let monster = some_monster(&mut state, &mut host);
            // Top of a 48px monster at y=440 is 416; the player's bottom is y + 16
            host.set_size(monster, Vec2::new(48.0, 48.0));
            host.set_position(monster, Vec2::new(300.0, 440.0));
            host.set_position(state.player.id, Vec2::new(300.0, player_y));

            tick(&mut state, &mut host, &contacts(vec![Contact::PlayerMonster(monster)]), DT);

            assert_eq!(!host.contains(monster), stomped);
            assert_eq!(state.phase == GamePhase::Playing, stomped);
        }
    }

    #[test]
    fn test_pausing_frame_keeps_contacts() {
        let (mut state, mut host, _) = started(21);
        let coin = first_coin(&state);
        let input = TickInput {
            pause: true,
            contacts: vec![Contact::PlayerCoin(coin)],
            ..Default::default()
        };

        tick(&mut state, &mut host, &input, DT);

        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.status.score(), 10);
        assert!(!host.contains(coin));
    }

    #[test]
    fn test_contact_codes_round_trip() {
        let (a, b) = (EntityId(7), EntityId(9));
        let all = [
            Contact::PlayerPlatform,
            Contact::PlayerCoin(b),
            Contact::PlayerPowerUp(b),
            Contact::PlayerMonster(b),
            Contact::BulletCoin { bullet: a, coin: b },
            Contact::BulletPowerUp { bullet: a, powerup: b },
            Contact::BulletMonster { bullet: a, monster: b },
            Contact::BulletPlatform { bullet: a },
        ];
        for contact in all {
            let (kind, x, y) = contact.encode();
            assert_eq!(Contact::decode(kind, x, y), Some(contact));
        }
        assert_eq!(Contact::decode(8, 1, 2), None);
    }

    #[test]
    fn test_input_from_flags() {
        let flags = input_flags::LEFT | input_flags::JUMP | input_flags::PAUSE;
        let input = TickInput::from_flags(flags, vec![Contact::PlayerPlatform]);
        assert!(input.left && input.jump && input.pause);
        assert!(!input.right && !input.shoot);
        assert_eq!(input.contacts, vec![Contact::PlayerPlatform]);
    }
}
