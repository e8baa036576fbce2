//! Procedural level-segment generation
//!
//! A segment is one screen-width slice of the endless level. Generation is a
//! greedy rejection-sampling pass: each candidate platform gets a fixed number
//! of placement attempts and is dropped if none fits, so a segment may come out
//! sparser than intended but generation itself never fails.
//!
//! This module is pure: it returns a [`SegmentPlan`] and leaves spawning to
//! the lifecycle manager.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::PlatformSpan;
use super::status::AbilityKind;
use crate::platform::MonsterKind;
use crate::tuning::Tuning;

/// A power-up dropped from the top of the screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpawn {
    pub pos: Vec2,
    pub ability: AbilityKind,
}

/// A monster dropped from the top of the screen with its patrol bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonsterSpawn {
    pub pos: Vec2,
    pub kind: MonsterKind,
    pub left_bound: f32,
    pub right_bound: f32,
}

/// Everything one segment will contain, before anything is spawned
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub start_x: f32,
    pub width: f32,
    /// Ground strips, left to right
    pub ground: Vec<PlatformSpan>,
    /// Floating platforms, bottom to top
    pub platforms: Vec<PlatformSpan>,
    pub coins: Vec<Vec2>,
    pub powerups: Vec<PowerUpSpawn>,
    pub monsters: Vec<MonsterSpawn>,
}

impl SegmentPlan {
    #[inline]
    pub fn end_x(&self) -> f32 {
        self.start_x + self.width
    }
}

/// Uniform sample in `[lo, hi)`, collapsing to `lo` for empty ranges
fn uniform<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Uniform integer sample in `[lo, hi]`
fn uniform_int<R: Rng>(rng: &mut R, lo: i64, hi: i64) -> i64 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// Generate the slice of level starting at `start_x`
///
/// `solid_ground` lays an unbroken floor (used for the opening segments so
/// the player cannot fall on spawn).
pub fn generate_segment<R: Rng>(
    rng: &mut R,
    start_x: f32,
    tuning: &Tuning,
    solid_ground: bool,
) -> SegmentPlan {
    let width = tuning.segment_width();
    let mut plan = SegmentPlan {
        start_x,
        width,
        ..Default::default()
    };

    plan.platforms = place_platforms(rng, start_x, tuning);
    plan.ground = lay_ground(rng, start_x, tuning, solid_ground);

    for platform in &plan.platforms {
        scatter_coins(rng, platform, tuning, &mut plan.coins);
    }

    plan.powerups.push(drop_powerup(rng, start_x, width));

    let monster_count = uniform_int(rng, 0, tuning.max_monsters as i64);
    for _ in 0..monster_count {
        plan.monsters.push(drop_monster(rng, start_x, width, tuning));
    }

    log::debug!(
        "Planned segment at {}: {} platforms, {} ground strips, {} coins, {} monsters",
        start_x,
        plan.platforms.len(),
        plan.ground.len(),
        plan.coins.len(),
        plan.monsters.len()
    );

    plan
}

/// Stack floating platforms upward from the ground by rejection sampling
fn place_platforms<R: Rng>(rng: &mut R, start_x: f32, tuning: &Tuning) -> Vec<PlatformSpan> {
    let width = tuning.segment_width();
    let ground_y = tuning.ground_y();

    // The ground anchor only takes part in overlap checks
    let anchor = PlatformSpan::new(start_x + width / 2.0, ground_y, tuning.ground_anchor_width);
    let mut placed: Vec<PlatformSpan> = Vec::new();

    let mut height = ground_y;
    while height > tuning.platform_ceiling {
        height -= uniform(rng, tuning.min_height_step, tuning.max_height_step).max(1.0);

        let mut accepted = None;
        for _ in 0..tuning.placement_attempts {
            let platform_width = uniform(rng, tuning.min_platform_width, tuning.max_platform_width);
            let center_x = start_x + uniform(rng, 0.0, width - platform_width) + platform_width / 2.0;
            let candidate = PlatformSpan::new(center_x, height, platform_width);

            let blocked = std::iter::once(&anchor)
                .chain(placed.iter())
                .any(|other| candidate.overlaps(other, tuning.platform_clearance));
            if !blocked {
                accepted = Some(candidate);
                break;
            }
        }

        match accepted {
            Some(platform) => placed.push(platform),
            None => log::trace!("No room for a platform at y={} in segment {}", height, start_x),
        }
    }

    placed
}

/// Lay the floor: solid, or alternating runs and gaps
fn lay_ground<R: Rng>(rng: &mut R, start_x: f32, tuning: &Tuning, solid: bool) -> Vec<PlatformSpan> {
    let end_x = start_x + tuning.segment_width();
    let ground_y = tuning.ground_y();

    if solid {
        return vec![PlatformSpan::from_left(start_x, ground_y, tuning.segment_width())];
    }

    let mut strips = Vec::new();
    let mut x = start_x;
    while x < end_x {
        if rng.random::<f32>() < tuning.ground_probability {
            let run = uniform(rng, tuning.min_ground_run, tuning.max_ground_run).min(end_x - x);
            strips.push(PlatformSpan::from_left(x, ground_y, run));
            x += run;
        } else {
            x += uniform(rng, tuning.min_ground_gap, tuning.max_ground_gap).max(1.0);
        }
    }
    strips
}

/// Fill coin slots along the top of a platform
fn scatter_coins<R: Rng>(rng: &mut R, platform: &PlatformSpan, tuning: &Tuning, out: &mut Vec<Vec2>) {
    let spacing = tuning.coin_spacing;
    if spacing <= 0.0 {
        return;
    }
    let slots = (platform.width / spacing).ceil() as usize;
    let y = platform.y - tuning.coin_lift;
    for i in 0..slots {
        if rng.random::<f32>() < tuning.coin_probability {
            out.push(Vec2::new(platform.left() + spacing / 2.0 + spacing * i as f32, y));
        }
    }
}

fn drop_powerup<R: Rng>(rng: &mut R, start_x: f32, width: f32) -> PowerUpSpawn {
    let x = uniform_int(rng, start_x as i64, (start_x + width) as i64) as f32;
    let ability = if rng.random_bool(0.5) {
        AbilityKind::Shooting
    } else {
        AbilityKind::Speed
    };
    PowerUpSpawn {
        pos: Vec2::new(x, 0.0),
        ability,
    }
}

fn drop_monster<R: Rng>(rng: &mut R, start_x: f32, width: f32, tuning: &Tuning) -> MonsterSpawn {
    let x = uniform_int(rng, start_x as i64, (start_x + width) as i64) as f32;
    let kind = if rng.random_bool(0.5) { MonsterKind::A } else { MonsterKind::B };
    let range = uniform_int(rng, tuning.min_patrol_range as i64, tuning.max_patrol_range as i64) as f32;
    MonsterSpawn {
        pos: Vec2::new(x, 0.0),
        kind,
        left_bound: x - range / 2.0,
        right_bound: x + range / 2.0,
    }
}
