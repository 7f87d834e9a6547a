//! Axis-aligned bounding volumes for objects and worlds.
//!
//! Bounds are computed on demand from vertex lists. An empty vertex list has
//! no bounds at all, so every constructor here returns `Option<Aabb>` and
//! callers must handle the empty case before using the box.

use serde::{Deserialize, Serialize};

use crate::dimension::Dimension3D;
use crate::point::Point3D;


/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3D,
    pub max: Point3D,
}

impl Aabb {
    pub fn new(min: Point3D, max: Point3D) -> Self {
        Self { min, max }
    }

    /// Returns the smallest box containing every point, or `None` if there
    /// are no points.
    pub fn from_points(mut points: impl Iterator<Item = Point3D>) -> Option<Self> {
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, p| aabb.include(&p)))
    }

    /// Grows the box to include `p`.
    pub fn include(&self, p: &Point3D) -> Self {
        Self {
            min: Point3D::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3D::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        self.include(&other.min).include(&other.max)
    }

    pub fn contains(&self, p: &Point3D) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    pub fn dimensions(&self) -> Dimension3D {
        Dimension3D::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }

    pub fn centre(&self) -> Point3D {
        (self.min + self.max).scale(0.5)
    }

    pub fn corners(&self) -> [Point3D; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3D::new(lo.x, lo.y, lo.z),
            Point3D::new(hi.x, lo.y, lo.z),
            Point3D::new(hi.x, lo.y, hi.z),
            Point3D::new(lo.x, lo.y, hi.z),
            Point3D::new(lo.x, hi.y, lo.z),
            Point3D::new(hi.x, hi.y, lo.z),
            Point3D::new(hi.x, hi.y, hi.z),
            Point3D::new(lo.x, hi.y, hi.z),
        ]
    }
}
