//! Phaser 3 host bindings
//!
//! Phaser is loaded by the page as a global. The scene class, asset list,
//! physics groups and collider wiring live in the inline JS below; contacts
//! come back to Rust as numeric codes through the `on_contact` callback.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::backdrop::Backdrop;
use super::host::{Body, Effect, EntityId, Facing, Host, Sprite};
use crate::settings::Settings;
use crate::sim::geometry::Aabb;
use crate::tuning::Tuning;

#[wasm_bindgen(inline_js = r#"
let scene = null;
let playerGravity = 0;
const objects = new Map();

export function create_game(parent, width, height, fps, gravity, player_gravity, max_fall,
                            backdrop_tiles, backdrop_parallax, on_create, on_update, on_contact) {
    playerGravity = player_gravity;

    class MainScene extends Phaser.Scene {
        constructor() {
            super({ key: 'MainScene' });
        }

        preload() {
            this.load.image('gengar', 'assets/gengar.png');
            this.load.svg('coin', 'assets/coin.svg');
            this.load.image('speed_ability', 'assets/tm-electric.png');
            this.load.image('shooting_ability', 'assets/tm-dark.png');
            this.load.svg('brick', 'assets/brick.svg');
            this.load.svg('bullet', 'assets/bullet.svg');
            this.load.image('speedParticle', 'assets/speed_particle.svg');
            this.load.svg('game_background', 'assets/game_background.svg');
            this.load.image('monster_1', 'assets/monster_1.png');
            this.load.image('monster_2', 'assets/monster_2.png');
        }

        create() {
            scene = this;
            objects.clear();
            this.maxFall = max_fall;

            this.backdrop = [];
            for (let i = 0; i < backdrop_tiles; i++) {
                this.backdrop.push(this.add.image(i * width, height / 2, 'game_background')
                    .setScale(width / 800, height / 600).setDepth(-4).setScrollFactor(backdrop_parallax));
            }
            this.bottomDarkness = this.add
                .rectangle(width / 2, height + width / 2, width * 4, width, 0x000000)
                .setDepth(-1);

            this.platforms = this.physics.add.staticGroup();
            this.players = this.physics.add.group();
            this.coins = this.physics.add.group({ allowGravity: false });
            this.pickups = this.physics.add.group();
            this.monsters = this.physics.add.group();
            this.bullets = this.physics.add.group({ allowGravity: false });

            this.physics.world.setBounds(0, 0, Number.MAX_SAFE_INTEGER, 2000);
            this.physics.world.setBoundsCollision(true, true, false, true);
            this.cameras.main.setBounds(0, 0, Number.MAX_SAFE_INTEGER, height);

            const id = (o) => o.getData('id');
            this.physics.add.collider(this.players, this.platforms, (p) => on_contact(0, id(p), 0));
            this.physics.add.collider(this.coins, this.platforms);
            this.physics.add.collider(this.pickups, this.platforms);
            this.physics.add.collider(this.monsters, this.platforms);
            this.physics.add.overlap(this.players, this.coins, (p, o) => on_contact(1, id(p), id(o)));
            this.physics.add.overlap(this.players, this.pickups, (p, o) => on_contact(2, id(p), id(o)));
            this.physics.add.overlap(this.players, this.monsters, (p, o) => on_contact(3, id(p), id(o)));
            this.physics.add.overlap(this.bullets, this.coins, (b, o) => on_contact(4, id(b), id(o)));
            this.physics.add.overlap(this.bullets, this.pickups, (b, o) => on_contact(5, id(b), id(o)));
            this.physics.add.overlap(this.bullets, this.monsters, (b, o) => on_contact(6, id(b), id(o)));
            this.physics.add.collider(this.bullets, this.platforms, (b) => on_contact(7, id(b), 0));

            this.cursors = this.input.keyboard.createCursorKeys();
            this.jumpKey = this.input.keyboard.addKey(Phaser.Input.Keyboard.KeyCodes.SPACE);
            this.shootKey = this.input.keyboard.addKey('F');
            this.pauseKey = this.input.keyboard.addKey(Phaser.Input.Keyboard.KeyCodes.ESC);

            this.trail = this.add.particles('speedParticle').createEmitter({
                speed: { min: -300, max: -500 },
                angle: { min: 150, max: 210 },
                scale: { start: 1, end: 0 },
                lifespan: 200,
                blendMode: 'ADD',
                frequency: 50,
                quantity: 3,
                on: false,
            });

            on_create();
        }

        update(time, delta) {
            let flags = 0;
            if (this.cursors.left.isDown) flags |= 1;
            if (this.cursors.right.isDown) flags |= 2;
            if (Phaser.Input.Keyboard.JustDown(this.jumpKey)) flags |= 4;
            if (this.shootKey.isDown) flags |= 8;
            if (Phaser.Input.Keyboard.JustDown(this.pauseKey)) flags |= 16;
            on_update(delta, flags);
        }
    }

    new Phaser.Game({
        type: Phaser.AUTO,
        scale: { parent, width, height, autoCenter: Phaser.Scale.CENTER_BOTH, mode: Phaser.Scale.FIT },
        fps: { target: fps, forceSetTimeOut: true },
        physics: { default: 'arcade', arcade: { gravity: { y: gravity } } },
        scene: MainScene,
    });
}

export function restart_scene() {
    if (scene) scene.scene.restart();
}

export function host_spawn(id, texture, group, x, y, body, scale) {
    if (!scene) return;
    let obj;
    if (body === 0) {
        obj = scene.platforms.create(x, y, texture);
        obj.setScale(scale).refreshBody();
    } else if (texture === 'bullet') {
        obj = scene.add.circle(x, y, 16, 0x8b0000, 0.9);
        scene.bullets.add(obj);
    } else {
        obj = scene.physics.add.sprite(x, y, texture).setScale(scale);
        scene[group].add(obj);
    }
    if (body === 1) {
        obj.body.setAllowGravity(false);
    } else if (body === 2) {
        obj.body.setCollideWorldBounds(true);
        obj.body.setBounce(0);
    } else if (body === 3) {
        obj.body.setCollideWorldBounds(true);
        obj.body.setBounce(0);
        obj.body.setMaxVelocity(1000, scene.maxFall);
    }
    obj.setData('id', id);
    objects.set(id, obj);
}

export function host_destroy(id) {
    const obj = objects.get(id);
    if (obj) {
        obj.destroy();
        objects.delete(id);
    }
}

export function host_position(id) {
    const obj = objects.get(id);
    return obj && obj.active ? [obj.x, obj.y] : [];
}

export function host_set_position(id, x, y) {
    const obj = objects.get(id);
    if (obj) obj.setPosition(x, y);
}

export function host_velocity(id) {
    const obj = objects.get(id);
    return obj && obj.body ? [obj.body.velocity.x, obj.body.velocity.y] : [];
}

export function host_set_velocity_x(id, vx) {
    const obj = objects.get(id);
    if (obj && obj.body) obj.body.setVelocityX(vx);
}

export function host_set_velocity_y(id, vy) {
    const obj = objects.get(id);
    if (obj && obj.body) obj.body.setVelocityY(vy);
}

export function host_set_gravity(id, enabled, is_player) {
    const obj = objects.get(id);
    if (!obj || !obj.body) return;
    obj.body.setAllowGravity(enabled);
    if (is_player) obj.body.setGravityY(enabled ? playerGravity : 0);
}

export function host_is_grounded(id) {
    const obj = objects.get(id);
    return !!(obj && obj.body && (obj.body.blocked.down || obj.body.touching.down));
}

export function host_bounds(id) {
    const obj = objects.get(id);
    return obj && obj.body ? [obj.body.x, obj.body.y, obj.body.width, obj.body.height] : [];
}

export function host_set_flip(id, flip) {
    const obj = objects.get(id);
    if (obj && obj.setFlipX) obj.setFlipX(flip);
}

export function host_camera() {
    if (!scene) return [0, 0];
    const cam = scene.cameras.main;
    return [cam.scrollX, cam.scrollY];
}

export function host_set_camera(x, y) {
    if (!scene) return;
    scene.cameras.main.scrollX = x;
    scene.cameras.main.scrollY = y;
}

export function host_layout_backdrop(xs, y, dark_x, dark_y) {
    if (!scene || !scene.backdrop) return;
    scene.backdrop.forEach((tile, i) => {
        if (i < xs.length) tile.setPosition(xs[i], y);
    });
    scene.bottomDarkness.setPosition(dark_x, dark_y);
}

export function host_set_physics_paused(paused) {
    if (!scene) return;
    if (paused) scene.physics.pause(); else scene.physics.resume();
}

function burst(x, y, radius, scaleTo, duration) {
    const ring = scene.add.circle(x, y, radius, 0x8b0000, 0.8).setBlendMode('ADD');
    scene.tweens.add({
        targets: ring, scale: scaleTo, alpha: 0, duration,
        onComplete: () => ring.destroy(),
    });
}

export function host_effect(kind, x, y, a, b) {
    if (!scene) return;
    switch (kind) {
        case 0:
            scene.trail.on = true;
            scene.trail.setPosition(x, y);
            scene.trail.setAngle(a > 0 ? { min: 160, max: 200 } : { min: -20, max: 20 });
            break;
        case 1:
            scene.trail.on = false;
            break;
        case 2:
            burst(x, y, 30, 2, 200);
            break;
        case 3:
            burst(x, y, 16, 0.5, 150);
            break;
        case 4: {
            const player = [...objects.values()].find((o) => o.texture && o.texture.key === 'gengar');
            if (!player) break;
            scene.tweens.add({ targets: player, y: y - 150, duration: 300, ease: 'Quad.easeOut' });
            scene.time.delayedCall(500, () => {
                scene.tweens.add({ targets: player, y: scene.scale.height + 100, duration: 500, ease: 'Quad.easeIn' });
                scene.tweens.add({ targets: player, angle: 360, duration: 500 });
            });
            const particles = scene.add.particles('speedParticle');
            const emitter = particles.createEmitter({
                x, y,
                speed: { min: -200, max: 200 },
                angle: { min: 0, max: 360 },
                scale: { start: 0.4, end: 0 },
                blendMode: 'ADD',
                lifespan: 800,
                quantity: 20,
                tint: [0x8b0000, 0xff0000],
            });
            scene.time.delayedCall(500, () => {
                emitter.stop();
                scene.time.delayedCall(500, () => particles.destroy());
            });
            break;
        }
        case 5:
            scene.cameras.main.shake(a, b);
            break;
    }
}
"#)]
extern "C" {
    #[allow(clippy::too_many_arguments)]
    pub fn create_game(
        parent: &str,
        width: u32,
        height: u32,
        fps: u32,
        gravity: f32,
        player_gravity: f32,
        max_fall: f32,
        backdrop_tiles: u32,
        backdrop_parallax: f32,
        on_create: &Closure<dyn FnMut()>,
        on_update: &Closure<dyn FnMut(f32, u32)>,
        on_contact: &Closure<dyn FnMut(u32, u32, u32)>,
    );
    pub fn restart_scene();

    fn host_spawn(id: u32, texture: &str, group: &str, x: f32, y: f32, body: u32, scale: f32);
    fn host_destroy(id: u32);
    fn host_position(id: u32) -> Vec<f32>;
    fn host_set_position(id: u32, x: f32, y: f32);
    fn host_velocity(id: u32) -> Vec<f32>;
    fn host_set_velocity_x(id: u32, vx: f32);
    fn host_set_velocity_y(id: u32, vy: f32);
    fn host_set_gravity(id: u32, enabled: bool, is_player: bool);
    fn host_is_grounded(id: u32) -> bool;
    fn host_bounds(id: u32) -> Vec<f32>;
    fn host_set_flip(id: u32, flip: bool);
    fn host_camera() -> Vec<f32>;
    fn host_set_camera(x: f32, y: f32);
    fn host_layout_backdrop(xs: Vec<f32>, y: f32, dark_x: f32, dark_y: f32);
    fn host_set_physics_paused(paused: bool);
    fn host_effect(kind: u32, x: f32, y: f32, a: f32, b: f32);
}

fn vec2(values: &[f32]) -> Option<Vec2> {
    match values {
        [x, y, ..] => Some(Vec2::new(*x, *y)),
        _ => None,
    }
}

/// Physics group each sprite is registered in
fn group_for(sprite: Sprite) -> &'static str {
    match sprite {
        Sprite::Player => "players",
        Sprite::Brick => "platforms",
        Sprite::Coin => "coins",
        Sprite::ShootingAbility | Sprite::SpeedAbility => "pickups",
        Sprite::Monster(_) => "monsters",
        Sprite::Bullet => "bullets",
    }
}

fn body_code(body: Body) -> u32 {
    match body {
        Body::Static => 0,
        Body::Floating => 1,
        Body::Falling => 2,
        Body::Player => 3,
    }
}

/// Host backed by the running Phaser scene
pub struct PhaserHost {
    pub settings: Settings,
    backdrop: Backdrop,
    player: Option<EntityId>,
}

impl PhaserHost {
    pub fn new(settings: Settings, tuning: &Tuning) -> Self {
        Self {
            settings,
            backdrop: Backdrop::new(tuning),
            player: None,
        }
    }
}

impl Host for PhaserHost {
    fn spawn(&mut self, id: EntityId, sprite: Sprite, pos: Vec2, body: Body) {
        if sprite == Sprite::Player {
            self.player = Some(id);
        }
        host_spawn(
            id.0,
            sprite.texture_key(),
            group_for(sprite),
            pos.x,
            pos.y,
            body_code(body),
            sprite.scale(),
        );
    }

    fn destroy(&mut self, id: EntityId) {
        host_destroy(id.0);
    }

    fn position(&self, id: EntityId) -> Option<Vec2> {
        vec2(&host_position(id.0))
    }

    fn set_position(&mut self, id: EntityId, pos: Vec2) {
        host_set_position(id.0, pos.x, pos.y);
    }

    fn velocity(&self, id: EntityId) -> Option<Vec2> {
        vec2(&host_velocity(id.0))
    }

    fn set_velocity_x(&mut self, id: EntityId, vx: f32) {
        host_set_velocity_x(id.0, vx);
    }

    fn set_velocity_y(&mut self, id: EntityId, vy: f32) {
        host_set_velocity_y(id.0, vy);
    }

    fn set_gravity(&mut self, id: EntityId, enabled: bool) {
        host_set_gravity(id.0, enabled, self.player == Some(id));
    }

    fn is_grounded(&self, id: EntityId) -> bool {
        host_is_grounded(id.0)
    }

    fn bounds(&self, id: EntityId) -> Option<Aabb> {
        match host_bounds(id.0).as_slice() {
            [x, y, w, h] => Some(Aabb::new(Vec2::new(*x, *y), Vec2::new(x + w, y + h))),
            _ => None,
        }
    }

    fn set_facing(&mut self, id: EntityId, facing: Facing) {
        host_set_flip(id.0, facing == Facing::Left);
    }

    fn camera(&self) -> Vec2 {
        vec2(&host_camera()).unwrap_or(Vec2::ZERO)
    }

    fn set_camera(&mut self, scroll: Vec2) {
        host_set_camera(scroll.x, scroll.y);
        let dark = self.backdrop.darkness_center(scroll);
        host_layout_backdrop(
            self.backdrop.tile_xs(scroll.x),
            self.backdrop.tile_y(scroll.y),
            dark.x,
            dark.y,
        );
    }

    fn set_physics_paused(&mut self, paused: bool) {
        host_set_physics_paused(paused);
    }

    fn play(&mut self, effect: Effect) {
        if !self.settings.allows(&effect) {
            return;
        }
        match effect {
            Effect::SpeedTrail { pos, facing } => host_effect(0, pos.x, pos.y, facing.sign(), 0.0),
            Effect::SpeedTrailOff => host_effect(1, 0.0, 0.0, 0.0, 0.0),
            Effect::Explosion { pos } => host_effect(2, pos.x, pos.y, 0.0, 0.0),
            Effect::Fizzle { pos } => host_effect(3, pos.x, pos.y, 0.0, 0.0),
            Effect::Death { pos } => host_effect(4, pos.x, pos.y, 0.0, 0.0),
            Effect::CameraShake {
                duration_ms,
                intensity,
            } => host_effect(5, 0.0, 0.0, duration_ms as f32, intensity),
        }
    }
}
