//! Data-driven game balance
//!
//! Every number the generator and the frame rules depend on lives here so a
//! level designer can override a subset from JSON without a rebuild.

use serde::{Deserialize, Serialize};

/// Gameplay tuning values (pixels, pixels/second, milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Screen ===
    /// Visible width; also the width of one level segment
    pub screen_width: f32,
    pub screen_height: f32,
    /// Distance of the ground row above the bottom of the screen
    pub ground_inset: f32,

    // === Platforms ===
    pub brick_size: f32,
    pub min_platform_width: f32,
    pub max_platform_width: f32,
    pub min_height_step: f32,
    pub max_height_step: f32,
    /// Platforms stop stacking once the next one would start above this y
    pub platform_ceiling: f32,
    /// Vertical distance under which two platforms count as overlapping
    pub platform_clearance: f32,
    pub placement_attempts: u32,
    /// Width of the virtual ground anchor used for overlap checks
    pub ground_anchor_width: f32,

    // === Ground strip ===
    pub ground_probability: f32,
    pub min_ground_run: f32,
    pub max_ground_run: f32,
    pub min_ground_gap: f32,
    pub max_ground_gap: f32,
    /// Number of leading segments that get a solid floor
    pub solid_segments: u64,

    // === Collectibles & hazards ===
    pub coin_spacing: f32,
    pub coin_lift: f32,
    pub coin_probability: f32,
    pub max_monsters: u32,
    pub monster_speed: f32,
    pub min_patrol_range: u32,
    pub max_patrol_range: u32,

    // === Player ===
    pub player_start_x: f32,
    pub player_start_lift: f32,
    pub player_half_width: f32,
    pub normal_speed: f32,
    pub boosted_speed: f32,
    pub normal_jump_velocity: f32,
    pub boosted_jump_velocity: f32,
    pub second_jump_multiplier: f32,
    /// Extra jump strength per unit of horizontal speed ratio
    pub jump_speed_bonus: f32,
    pub gravity_delay_ms: u32,
    pub death_margin: f32,
    pub stomp_tolerance: f32,
    pub stomp_bounce: f32,
    pub death_animation_ms: u32,

    // === Abilities ===
    pub shooting_duration_ms: u32,
    pub speed_duration_ms: u32,
    pub shoot_cooldown_ms: u32,
    pub bullet_speed: f32,
    pub bullet_range: f32,
    pub bullet_offset: f32,

    // === Camera ===
    pub camera_lead: f32,
    pub camera_ground_level: f32,
    pub camera_ease: f32,

    // === Segment lifecycle ===
    /// Fraction of a segment the player crosses before the next one spawns
    pub extend_threshold: f32,
    /// Eviction requires strictly more than this many live segments
    pub max_live_segments: usize,
    /// Eviction distance past a segment start, in segment widths
    pub evict_distance: f32,

    // === Scoring ===
    pub coin_points: u32,
    pub monster_points: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 600.0,
            ground_inset: 32.0,

            brick_size: 32.0,
            min_platform_width: 150.0,
            max_platform_width: 250.0,
            min_height_step: 120.0,
            max_height_step: 160.0,
            platform_ceiling: 160.0,
            platform_clearance: 40.0,
            placement_attempts: 10,
            ground_anchor_width: 200.0,

            ground_probability: 0.7,
            min_ground_run: 150.0,
            max_ground_run: 300.0,
            min_ground_gap: 100.0,
            max_ground_gap: 300.0,
            solid_segments: 2,

            coin_spacing: 40.0,
            coin_lift: 50.0,
            coin_probability: 0.5,
            max_monsters: 3,
            monster_speed: 100.0,
            min_patrol_range: 200,
            max_patrol_range: 800,

            player_start_x: 100.0,
            player_start_lift: 110.0,
            player_half_width: 16.0,
            normal_speed: 300.0,
            boosted_speed: 450.0,
            normal_jump_velocity: -400.0,
            boosted_jump_velocity: -500.0,
            second_jump_multiplier: 0.875,
            jump_speed_bonus: 0.2,
            gravity_delay_ms: 100,
            death_margin: 100.0,
            stomp_tolerance: 10.0,
            stomp_bounce: -300.0,
            death_animation_ms: 1000,

            shooting_duration_ms: 20_000,
            speed_duration_ms: 20_000,
            shoot_cooldown_ms: 200,
            bullet_speed: 800.0,
            bullet_range: 500.0,
            bullet_offset: 40.0,

            camera_lead: 400.0,
            camera_ground_level: 568.0,
            camera_ease: 0.1,

            extend_threshold: 0.75,
            max_live_segments: 4,
            evict_distance: 2.0,

            coin_points: 10,
            monster_points: 20,
        }
    }
}

impl Tuning {
    /// y coordinate of the ground row
    pub fn ground_y(&self) -> f32 {
        self.screen_height - self.ground_inset
    }

    /// Width of one generated segment
    pub fn segment_width(&self) -> f32 {
        self.screen_width
    }

    /// Parse overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json).map(Self::sanitized)
    }

    /// Pull values into ranges the generator and frame rules can run with
    ///
    /// Bounds are applied in dependency order so every clamp has `min <= max`.
    pub fn sanitized(mut self) -> Self {
        self.screen_width = self.screen_width.clamp(200.0, 4096.0);
        self.screen_height = self.screen_height.clamp(200.0, 4096.0);
        self.ground_inset = self.ground_inset.clamp(0.0, self.screen_height / 2.0);

        self.brick_size = self.brick_size.clamp(4.0, 128.0);
        self.max_platform_width = self.max_platform_width.clamp(self.brick_size, self.screen_width);
        self.min_platform_width = self.min_platform_width.clamp(self.brick_size, self.max_platform_width);
        self.min_height_step = self.min_height_step.clamp(16.0, self.screen_height);
        self.max_height_step = self.max_height_step.clamp(self.min_height_step, self.screen_height);
        self.platform_ceiling = self.platform_ceiling.clamp(0.0, self.ground_y());
        self.platform_clearance = self.platform_clearance.clamp(0.0, self.screen_height);
        self.placement_attempts = self.placement_attempts.min(100);
        self.ground_anchor_width = self.ground_anchor_width.clamp(0.0, self.screen_width);

        self.ground_probability = self.ground_probability.clamp(0.0, 1.0);
        self.max_ground_run = self.max_ground_run.clamp(self.brick_size, self.screen_width);
        self.min_ground_run = self.min_ground_run.clamp(self.brick_size, self.max_ground_run);
        self.max_ground_gap = self.max_ground_gap.clamp(self.brick_size, self.screen_width);
        self.min_ground_gap = self.min_ground_gap.clamp(self.brick_size, self.max_ground_gap);

        self.coin_spacing = self.coin_spacing.clamp(8.0, self.screen_width);
        self.coin_probability = self.coin_probability.clamp(0.0, 1.0);
        self.max_monsters = self.max_monsters.min(16);
        self.max_patrol_range = self.max_patrol_range.min(self.screen_width as u32 * 4);
        self.min_patrol_range = self.min_patrol_range.min(self.max_patrol_range);

        self.camera_ease = self.camera_ease.clamp(0.0, 1.0);
        self.extend_threshold = self.extend_threshold.clamp(0.1, 1.0);
        self.max_live_segments = self.max_live_segments.clamp(3, 64);
        self.evict_distance = self.evict_distance.clamp(1.0, 16.0);
        self
    }

    /// Parse overrides, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring malformed tuning ({}), using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "screen_width": 1024.0, "max_monsters": 5 }"#).unwrap();
        assert_eq!(tuning.screen_width, 1024.0);
        assert_eq!(tuning.max_monsters, 5);
        assert_eq!(tuning.brick_size, 32.0);
        assert_eq!(tuning.placement_attempts, 10);
    }

    #[test]
    fn test_ground_y() {
        let tuning = Tuning::default();
        assert_eq!(tuning.ground_y(), 568.0);
        assert_eq!(tuning.segment_width(), 800.0);
    }

    #[test]
    fn test_malformed_falls_back() {
        let tuning = Tuning::from_json_or_default("{ not json");
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_defaults_survive_sanitizing() {
        assert_eq!(Tuning::default().sanitized(), Tuning::default());
    }

    #[test]
    fn test_hostile_overrides_are_clamped() {
        use crate::sim::generate_segment;
        use rand::SeedableRng;
        use rand_pcg::Pcg32;

        let json = r#"{
            "min_platform_width": -3e38,
            "max_platform_width": 3e38,
            "min_height_step": -5.0,
            "min_ground_run": 0.0,
            "max_ground_gap": 0.0,
            "coin_spacing": 0.0001,
            "max_monsters": 4000000000,
            "max_live_segments": 0
        }"#;
        let tuning = Tuning::from_json_or_default(json);
        assert!(tuning.min_platform_width <= tuning.max_platform_width);
        assert!(tuning.max_platform_width <= tuning.screen_width);
        assert!(tuning.min_height_step >= 16.0);
        assert!(tuning.coin_spacing >= 8.0);
        assert_eq!(tuning.max_monsters, 16);
        assert_eq!(tuning.max_live_segments, 3);

        let mut rng = Pcg32::seed_from_u64(7);
        for i in 0..20 {
            let plan = generate_segment(&mut rng, i as f32 * tuning.segment_width(), &tuning, false);
            assert!(plan.monsters.len() <= 16);
        }
    }
}
