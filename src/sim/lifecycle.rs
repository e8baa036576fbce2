//! Segment lifecycle: keep generated level ahead of the player, reclaim it behind
//!
//! Segments are kept in scroll order. A new one is generated once the player
//! crosses most of the trailing segment; the oldest is destroyed, with every
//! entity it owns, once enough segments exist and the player is well past it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::geometry::PlatformSpan;
use super::segment::{SegmentPlan, generate_segment};
use super::state::EntityAllocator;
use super::status::AbilityKind;
use crate::platform::{Body, EntityId, Facing, Host, MonsterKind, Sprite};
use crate::tuning::Tuning;

/// A collectible coin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin {
    pub id: EntityId,
    pub pos: Vec2,
}

/// A falling ability pickup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUp {
    pub id: EntityId,
    pub ability: AbilityKind,
}

/// A patrolling monster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monster {
    pub id: EntityId,
    pub kind: MonsterKind,
    pub left_bound: f32,
    pub right_bound: f32,
    pub direction: Facing,
    pub speed: f32,
}

impl Monster {
    /// Turn around at the patrol bounds; returns the snapped x if one was hit
    pub fn patrol(&mut self, x: f32) -> Option<f32> {
        if x <= self.left_bound {
            self.direction = Facing::Right;
            Some(self.left_bound)
        } else if x >= self.right_bound {
            self.direction = Facing::Left;
            Some(self.right_bound)
        } else {
            None
        }
    }

    #[inline]
    pub fn velocity_x(&self) -> f32 {
        self.speed * self.direction.sign()
    }
}

/// One live slice of level and everything spawned for it
#[derive(Debug, Clone)]
pub struct Segment {
    pub start_x: f32,
    pub width: f32,
    /// Ground strips followed by floating platforms
    pub platforms: Vec<PlatformSpan>,
    pub bricks: Vec<EntityId>,
    pub coins: Vec<Coin>,
    pub powerups: Vec<PowerUp>,
    pub monsters: Vec<Monster>,
}

impl Segment {
    /// Materialize a plan in the host
    pub fn spawn<H: Host + ?Sized>(plan: SegmentPlan, host: &mut H, ids: &mut EntityAllocator, tuning: &Tuning) -> Self {
        let mut platforms = plan.ground;
        platforms.extend(plan.platforms);

        let mut bricks = Vec::new();
        for span in &platforms {
            for pos in span.brick_centers(tuning.brick_size) {
                let id = ids.allocate();
                host.spawn(id, Sprite::Brick, pos, Body::Static);
                bricks.push(id);
            }
        }

        let coins = plan
            .coins
            .into_iter()
            .map(|pos| {
                let id = ids.allocate();
                host.spawn(id, Sprite::Coin, pos, Body::Floating);
                Coin { id, pos }
            })
            .collect();

        let powerups = plan
            .powerups
            .into_iter()
            .map(|drop| {
                let id = ids.allocate();
                let sprite = match drop.ability {
                    AbilityKind::Shooting => Sprite::ShootingAbility,
                    AbilityKind::Speed => Sprite::SpeedAbility,
                };
                host.spawn(id, sprite, drop.pos, Body::Falling);
                PowerUp { id, ability: drop.ability }
            })
            .collect();

        let monsters = plan
            .monsters
            .into_iter()
            .map(|drop| {
                let id = ids.allocate();
                host.spawn(id, Sprite::Monster(drop.kind), drop.pos, Body::Falling);
                Monster {
                    id,
                    kind: drop.kind,
                    left_bound: drop.left_bound,
                    right_bound: drop.right_bound,
                    direction: Facing::Right,
                    speed: tuning.monster_speed,
                }
            })
            .collect();

        Self {
            start_x: plan.start_x,
            width: plan.width,
            platforms,
            bricks,
            coins,
            powerups,
            monsters,
        }
    }

    /// Destroy every entity this segment owns
    pub fn despawn<H: Host + ?Sized>(self, host: &mut H) {
        let ids = self
            .bricks
            .iter()
            .copied()
            .chain(self.coins.iter().map(|c| c.id))
            .chain(self.powerups.iter().map(|p| p.id))
            .chain(self.monsters.iter().map(|m| m.id));
        for id in ids {
            host.destroy(id);
        }
    }

    pub fn entity_count(&self) -> usize {
        self.bricks.len() + self.coins.len() + self.powerups.len() + self.monsters.len()
    }
}

/// What a lifecycle pass did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackUpdate {
    /// Start x of a newly generated segment
    pub extended: Option<f32>,
    /// Start x of an evicted segment
    pub evicted: Option<f32>,
}

/// Live segments in scroll order
#[derive(Debug, Default)]
pub struct SegmentTrack {
    segments: VecDeque<Segment>,
    /// Start of the segment the player is currently crossing
    current_x: f32,
    /// Segments generated so far this session
    generated: u64,
}

impl SegmentTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the opening layout: one segment behind the start, the start, one ahead
    pub fn bootstrap<R: Rng, H: Host + ?Sized>(
        &mut self,
        rng: &mut R,
        host: &mut H,
        ids: &mut EntityAllocator,
        tuning: &Tuning,
    ) {
        let width = tuning.segment_width();
        for start_x in [-width, 0.0, width] {
            self.spawn_segment(start_x, rng, host, ids, tuning);
        }
    }

    /// Generate and spawn a segment at the back of the track
    pub fn spawn_segment<R: Rng, H: Host + ?Sized>(
        &mut self,
        start_x: f32,
        rng: &mut R,
        host: &mut H,
        ids: &mut EntityAllocator,
        tuning: &Tuning,
    ) {
        let solid = self.generated < tuning.solid_segments;
        let plan = generate_segment(rng, start_x, tuning, solid);
        let segment = Segment::spawn(plan, host, ids, tuning);
        log::debug!(
            "Spawned segment #{} at {} ({} entities)",
            self.generated,
            start_x,
            segment.entity_count()
        );
        self.generated += 1;
        self.segments.push_back(segment);
    }

    pub fn should_extend(&self, player_x: f32, tuning: &Tuning) -> bool {
        player_x > self.current_x + tuning.segment_width() * tuning.extend_threshold
    }

    pub fn eviction_due(&self, player_x: f32, tuning: &Tuning) -> bool {
        if self.segments.len() <= tuning.max_live_segments {
            return false;
        }
        self.segments
            .front()
            .is_some_and(|s| player_x - s.start_x > s.width * tuning.evict_distance)
    }

    /// One lifecycle pass for the player's current position
    pub fn update<R: Rng, H: Host + ?Sized>(
        &mut self,
        player_x: f32,
        rng: &mut R,
        host: &mut H,
        ids: &mut EntityAllocator,
        tuning: &Tuning,
    ) -> TrackUpdate {
        let mut result = TrackUpdate::default();

        if self.should_extend(player_x, tuning) {
            self.current_x += tuning.segment_width();
            let start_x = self.current_x + tuning.segment_width();
            self.spawn_segment(start_x, rng, host, ids, tuning);
            result.extended = Some(start_x);
        }

        if self.eviction_due(player_x, tuning) {
            if let Some(oldest) = self.segments.pop_front() {
                log::debug!("Evicting segment at {} (player at {})", oldest.start_x, player_x);
                result.evicted = Some(oldest.start_x);
                oldest.despawn(host);
            }
        }

        result
    }

    /// Destroy everything (scene teardown)
    pub fn clear<H: Host + ?Sized>(&mut self, host: &mut H) {
        for segment in self.segments.drain(..) {
            segment.despawn(host);
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn current_x(&self) -> f32 {
        self.current_x
    }

    pub fn monsters_mut(&mut self) -> impl Iterator<Item = &mut Monster> {
        self.segments.iter_mut().flat_map(|s| s.monsters.iter_mut())
    }

    /// Remove a coin from whichever segment owns it
    pub fn take_coin(&mut self, id: EntityId) -> Option<Coin> {
        self.segments.iter_mut().find_map(|s| {
            let index = s.coins.iter().position(|c| c.id == id)?;
            Some(s.coins.swap_remove(index))
        })
    }

    pub fn take_powerup(&mut self, id: EntityId) -> Option<PowerUp> {
        self.segments.iter_mut().find_map(|s| {
            let index = s.powerups.iter().position(|p| p.id == id)?;
            Some(s.powerups.swap_remove(index))
        })
    }

    pub fn take_monster(&mut self, id: EntityId) -> Option<Monster> {
        self.segments.iter_mut().find_map(|s| {
            let index = s.monsters.iter().position(|m| m.id == id)?;
            Some(s.monsters.swap_remove(index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessHost;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Fixture {
        track: SegmentTrack,
        rng: Pcg32,
        host: HeadlessHost,
        ids: EntityAllocator,
        tuning: Tuning,
    }

    impl Fixture {
        fn new(seed: u64) -> Self {
            let mut f = Self {
                track: SegmentTrack::new(),
                rng: Pcg32::seed_from_u64(seed),
                host: HeadlessHost::new(),
                ids: EntityAllocator::default(),
                tuning: Tuning::default(),
            };
            f.track.bootstrap(&mut f.rng, &mut f.host, &mut f.ids, &f.tuning);
            f
        }

        fn update(&mut self, player_x: f32) -> TrackUpdate {
            self.track
                .update(player_x, &mut self.rng, &mut self.host, &mut self.ids, &self.tuning)
        }
    }

    #[test]
    fn test_bootstrap_layout() {
        let f = Fixture::new(1);
        let starts: Vec<f32> = f.track.segments().map(|s| s.start_x).collect();
        assert_eq!(starts, vec![-800.0, 0.0, 800.0]);
        // First two segments stand on a single solid floor strip
        for segment in f.track.segments().take(2) {
            assert_eq!(segment.platforms[0].width, 800.0);
        }
        let total: usize = f.track.segments().map(|s| s.entity_count()).sum();
        assert_eq!(f.host.entities.len(), total);
    }

    #[test]
    fn test_extends_past_three_quarters() {
        let mut f = Fixture::new(2);
        assert_eq!(f.update(600.0), TrackUpdate::default());
        let result = f.update(600.5);
        assert_eq!(result.extended, Some(1600.0));
        assert_eq!(f.track.current_x(), 800.0);
        assert_eq!(f.track.len(), 4);
        // Same position again does not extend twice
        assert_eq!(f.update(600.5).extended, None);
    }

    #[test]
    fn test_evicts_oldest_and_despawns() {
        let mut f = Fixture::new(3);
        f.update(601.0);
        assert_eq!(f.track.len(), 4);
        let oldest: Vec<EntityId> = {
            let s = f.track.segments().next().unwrap();
            s.bricks.iter().copied().chain(s.coins.iter().map(|c| c.id)).collect()
        };

        let result = f.update(1401.0);
        assert_eq!(result.extended, Some(2400.0));
        assert_eq!(result.evicted, Some(-800.0));
        assert_eq!(f.track.len(), 4);
        assert!(oldest.iter().all(|id| !f.host.contains(*id)));
    }

    #[test]
    fn test_eviction_despawns_drops() {
        let mut f = (0u64..)
            .map(Fixture::new)
            .find(|f| f.track.segments().next().is_some_and(|s| !s.monsters.is_empty()))
            .unwrap();
        let drops: Vec<EntityId> = {
            let s = f.track.segments().next().unwrap();
            s.powerups.iter().map(|p| p.id).chain(s.monsters.iter().map(|m| m.id)).collect()
        };
        assert!(drops.len() >= 2);
        assert!(drops.iter().all(|id| f.host.contains(*id)));

        f.update(601.0);
        assert_eq!(f.update(1401.0).evicted, Some(-800.0));
        assert!(drops.iter().all(|id| !f.host.contains(*id)));
        assert!(f.track.take_monster(drops[1]).is_none());
    }

    #[test]
    fn test_clear_destroys_everything() {
        let mut f = Fixture::new(6);
        f.track.clear(&mut f.host);
        assert!(f.track.is_empty());
        assert!(f.host.entities.is_empty());
    }

    #[test]
    fn test_no_eviction_with_four_segments() {
        let mut f = Fixture::new(4);
        f.update(601.0);
        assert_eq!(f.track.len(), 4);
        // Far enough past the oldest, but not enough segments
        assert!(!f.track.eviction_due(5000.0, &f.tuning));
    }

    #[test]
    fn test_take_is_idempotent() {
        let mut f = Fixture::new(5);
        let powerup = f.track.segments().next().unwrap().powerups[0].id;
        assert!(f.track.take_powerup(powerup).is_some());
        assert!(f.track.take_powerup(powerup).is_none());
        assert!(f.track.take_coin(EntityId(u32::MAX)).is_none());
    }

    #[test]
    fn test_monster_patrol_turns_at_bounds() {
        let mut m = Monster {
            id: EntityId(1),
            kind: MonsterKind::A,
            left_bound: 100.0,
            right_bound: 300.0,
            direction: Facing::Right,
            speed: 100.0,
        };
        assert_eq!(m.patrol(200.0), None);
        assert_eq!(m.velocity_x(), 100.0);
        assert_eq!(m.patrol(305.0), Some(300.0));
        assert_eq!(m.velocity_x(), -100.0);
        assert_eq!(m.patrol(99.0), Some(100.0));
        assert_eq!(m.direction, Facing::Right);
    }

    proptest! {
        #[test]
        fn prop_eviction_only_far_behind(
            seed in any::<u64>(),
            steps in prop::collection::vec(0.0f32..400.0, 1..120),
        ) {
            let mut f = Fixture::new(seed);
            let mut player_x = 100.0;
            for step in steps {
                player_x += step;
                let len_before = f.track.len();
                let front_before = f.track.segments().next().map(|s| (s.start_x, s.width));
                let result = f.update(player_x);
                if let Some(start_x) = result.evicted {
                    let (front_x, width) = front_before.unwrap();
                    prop_assert_eq!(start_x, front_x);
                    prop_assert!(player_x - start_x > 2.0 * width);
                    // An extension in the same pass may have pushed us over four
                    let len_at_eviction = len_before + result.extended.is_some() as usize;
                    prop_assert!(len_at_eviction >= 5);
                }
                // Segments stay contiguous and ordered
                let starts: Vec<f32> = f.track.segments().map(|s| s.start_x).collect();
                for pair in starts.windows(2) {
                    prop_assert_eq!(pair[1] - pair[0], 800.0);
                }
            }
        }
    }
}
