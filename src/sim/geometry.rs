//! Axis-aligned geometry used by level generation and contact rules

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A horizontal run of bricks, described by its center, row and width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpan {
    pub center_x: f32,
    pub y: f32,
    pub width: f32,
}

impl PlatformSpan {
    pub fn new(center_x: f32, y: f32, width: f32) -> Self {
        Self { center_x, y, width }
    }

    /// Build a span from its left edge (ground strips are laid left to right)
    pub fn from_left(left: f32, y: f32, width: f32) -> Self {
        Self {
            center_x: left + width / 2.0,
            y,
            width,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center_x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center_x + self.width / 2.0
    }

    /// Bounding-box overlap: horizontal extents intersect and rows are closer
    /// than `clearance`.
    pub fn overlaps(&self, other: &PlatformSpan, clearance: f32) -> bool {
        let horizontal = (self.center_x - other.center_x).abs() < self.width / 2.0 + other.width / 2.0;
        let vertical = (self.y - other.y).abs() < clearance;
        horizontal && vertical
    }

    /// Bricks needed to cover the span (the last one may overhang)
    pub fn brick_count(&self, brick_size: f32) -> usize {
        (self.width / brick_size).ceil().max(0.0) as usize
    }

    /// Centers of the bricks that tile this span, left to right
    pub fn brick_centers(&self, brick_size: f32) -> impl Iterator<Item = Vec2> + '_ {
        let left = self.left();
        (0..self.brick_count(brick_size))
            .map(move |i| Vec2::new(left + i as f32 * brick_size + brick_size / 2.0, self.y))
    }
}

/// Axis-aligned bounding box in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_needs_both_axes() {
        let a = PlatformSpan::new(100.0, 300.0, 200.0);
        // Same row, far apart
        assert!(!a.overlaps(&PlatformSpan::new(400.0, 300.0, 150.0), 40.0));
        // Same column, far apart vertically
        assert!(!a.overlaps(&PlatformSpan::new(100.0, 150.0, 150.0), 40.0));
        // Close on both
        assert!(a.overlaps(&PlatformSpan::new(150.0, 320.0, 150.0), 40.0));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = PlatformSpan::new(100.0, 300.0, 100.0);
        let b = PlatformSpan::new(200.0, 300.0, 100.0);
        assert!(!a.overlaps(&b, 40.0));
        let c = PlatformSpan::new(100.0, 340.0, 100.0);
        assert!(!a.overlaps(&c, 40.0));
    }

    #[test]
    fn test_brick_tiling() {
        let span = PlatformSpan::from_left(0.0, 568.0, 100.0);
        assert_eq!(span.brick_count(32.0), 4);
        let centers: Vec<Vec2> = span.brick_centers(32.0).collect();
        assert_eq!(centers[0], Vec2::new(16.0, 568.0));
        assert_eq!(centers[3], Vec2::new(112.0, 568.0));
    }

    #[test]
    fn test_aabb_edges() {
        let b = Aabb::from_center(Vec2::new(10.0, 20.0), Vec2::new(4.0, 8.0));
        assert_eq!(b.top(), 16.0);
        assert_eq!(b.bottom(), 24.0);
    }
}
