//! Parallax backdrop layout
//!
//! The backdrop is a row of screen-wide tiles drawn at a reduced scroll
//! factor, plus a dark strip under the ground that follows the camera. Tiles
//! are re-seated every camera move so the row never runs out.

use glam::Vec2;

use crate::tuning::Tuning;

/// Number of backdrop tiles kept alive
pub const BACKDROP_TILES: usize = 5;
/// Scroll factor of the backdrop relative to the camera
pub const BACKDROP_PARALLAX: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    pub tiles: usize,
    pub tile_width: f32,
    pub parallax: f32,
    pub screen_height: f32,
}

impl Backdrop {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tiles: BACKDROP_TILES,
            tile_width: tuning.screen_width,
            parallax: BACKDROP_PARALLAX,
            screen_height: tuning.screen_height,
        }
    }

    /// World x of tile `index` for a camera scrolled to `camera_x`
    pub fn tile_x(&self, camera_x: f32, index: usize) -> f32 {
        let parallax_x = camera_x * self.parallax;
        let base = (parallax_x / self.tile_width).floor() * self.tile_width;
        let x = base + index as f32 * self.tile_width;
        if x < parallax_x - 2.0 * self.tile_width {
            x + self.tiles as f32 * self.tile_width
        } else {
            x
        }
    }

    pub fn tile_y(&self, camera_y: f32) -> f32 {
        self.screen_height / 2.0 + camera_y * self.parallax
    }

    /// x of every tile, in tile order
    pub fn tile_xs(&self, camera_x: f32) -> Vec<f32> {
        (0..self.tiles).map(|i| self.tile_x(camera_x, i)).collect()
    }

    /// Center of the dark strip below the ground
    pub fn darkness_center(&self, camera: Vec2) -> Vec2 {
        Vec2::new(
            camera.x + self.tile_width / 2.0,
            self.screen_height + self.tile_width / 2.0 + camera.y,
        )
    }
}
