//! Axis-aligned bounding boxes and overlap queries

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world units (y-up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build a box from its centre and full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Build a box from its centre and half extents
    pub fn from_center_half(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// True when the boxes overlap or touch.
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }

    /// Per-axis penetration depth. Only meaningful when `intersects` holds;
    /// touching boxes report zero on the touching axis.
    pub fn overlap(&self, other: &Aabb) -> Vec2 {
        Vec2::new(
            self.max.x.min(other.max.x) - self.min.x.max(other.min.x),
            self.max.y.min(other.max.y) - self.min.y.max(other.min.y),
        )
    }

    /// Same box moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::from_center_size(Vec2::ZERO, Vec2::new(2.0, 2.0));
        let b = Aabb::from_center_size(Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0));
        assert!(a.intersects(&b));
        assert_eq!(a.overlap(&b).x, 0.0);
    }

    #[test]
    fn separated_boxes_do_not_intersect() {
        let a = Aabb::from_center_size(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::from_center_size(Vec2::new(0.0, 1.5), Vec2::ONE);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn overlap_reports_penetration_per_axis() {
        let a = Aabb::from_center_size(Vec2::ZERO, Vec2::new(0.8, 1.5));
        let b = Aabb::from_center_size(Vec2::new(0.5, -1.0), Vec2::new(2.0, 1.0));
        let o = a.overlap(&b);
        assert!((o.x - 0.8).abs() < 1e-6);
        assert!((o.y - 0.25).abs() < 1e-6);
    }

    #[test]
    fn centre_and_size_round_out() {
        let b = Aabb::from_center_half(Vec2::new(1.0, 2.0), Vec2::new(0.5, 0.25));
        assert_eq!(b.center(), Vec2::new(1.0, 2.0));
        assert_eq!(b.max - b.min, Vec2::new(1.0, 0.5));
        assert_eq!(b.translated(Vec2::X).center(), Vec2::new(2.0, 2.0));
    }
}
