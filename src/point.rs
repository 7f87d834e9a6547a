//! Immutable 3D coordinates and the vector arithmetic used by the scene core.
//!
//! [`Point3D`] doubles as a position and as a free vector: subtracting two
//! points yields the vector between them, and the same type carries face
//! normals and light directions through the renderer.
//!
//! Coordinates are never validated. NaN or infinite inputs propagate through
//! every operation unchanged (garbage in, garbage out).

use std::hash::{Hash, Hasher};
use std::ops::{Add, Neg, Sub};

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::viewpoint::ViewPoint3D;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn identity_translation() {
        let p = Point3D::new(1.5, -2.25, 3.0);
        assert_eq!(p.translate(0.0, 0.0, 0.0), p);
        assert_eq!(p.translate(1.0, 1.0, 1.0), Point3D::new(2.5, -1.25, 4.0));
    }

    #[test]
    fn vector_ops() {
        let a = Point3D::new(1.0, 2.0, 3.0);
        let b = Point3D::new(4.0, 6.0, 8.0);
        assert_eq!(b - a, Point3D::new(3.0, 4.0, 5.0));
        assert_eq!(a.dot(&b), 4.0 + 12.0 + 24.0);
        assert_eq!(Point3D::UNIT_X.cross(&Point3D::UNIT_Y), Point3D::UNIT_Z);
        assert_eq!(Point3D::UNIT_Y.cross(&Point3D::UNIT_X), -Point3D::UNIT_Z);
        assert_relative_eq!(Point3D::new(3.0, 4.0, 0.0).length(), 5.0);
    }

    #[test]
    fn normalize_zero_vector() {
        assert_eq!(Point3D::ORIGIN.normalize(), Point3D::ORIGIN);
        let n = Point3D::new(0.0, 3.0, 4.0).normalize();
        assert_relative_eq!(n.length(), 1.0);
        assert_relative_eq!(n.y, 0.6);

        assert_eq!(Point3D::new(-0.0, 0.0, 0.0).normalize(), Point3D::ORIGIN);
    }

    #[test]
    fn spherical_round_trip() {
        let p = Point3D::from_spherical(FRAC_PI_4, 0.3, 12.0);
        assert_relative_eq!(p.rho(), 12.0, epsilon = 1e-12);
        assert_relative_eq!(p.theta(), FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(p.phi(), 0.3, epsilon = 1e-12);

        let top = Point3D::from_spherical(0.0, FRAC_PI_2, 10.0);
        assert_relative_eq!(top.y, 10.0);
        assert_relative_eq!(top.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn equality_edge_cases() {
        assert_eq!(Point3D::new(0.0, 0.0, 0.0), Point3D::new(-0.0, 0.0, 0.0));
        let nan = Point3D::new(f64::NAN, 1.0, 2.0);
        assert_eq!(nan, nan);
        assert_ne!(nan, Point3D::new(0.0, 1.0, 2.0));

        let mut set = HashSet::new();
        set.insert(Point3D::new(0.0, 1.0, 2.0));
        assert!(set.contains(&Point3D::new(-0.0, 1.0, 2.0)));
    }
}

/// A point (or vector) in 3D space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);
    pub const UNIT_X: Self = Self::new(1.0, 0.0, 0.0);
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a point from spherical coordinates, using the same convention
    /// as [`ViewPoint3D`]: `theta` is the azimuth in the x-z plane measured from
    /// the x-axis, `phi` is the elevation above that plane and `rho` the
    /// distance from the origin.
    pub fn from_spherical(theta: f64, phi: f64, rho: f64) -> Self {
        Self::new(
            rho * phi.cos() * theta.cos(),
            rho * phi.sin(),
            rho * phi.cos() * theta.sin(),
        )
    }

    pub fn theta(&self) -> f64 {
        self.z.atan2(self.x)
    }

    pub fn phi(&self) -> f64 {
        (self.y / self.rho()).asin()
    }

    pub fn rho(&self) -> f64 {
        self.length()
    }

    pub fn translate(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.to_na_vector().dot(&other.to_na_vector())
    }

    pub fn cross(&self, other: &Self) -> Self {
        self.to_na_vector().cross(&other.to_na_vector()).into()
    }

    pub fn length(&self) -> f64 {
        self.to_na_vector().norm()
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    /// Returns the unit vector in the same direction, or the zero vector when
    /// the length is zero.
    pub fn normalize(&self) -> Self {
        self.to_na_vector()
            .try_normalize(0.0)
            .map_or(Self::ORIGIN, Into::into)
    }

    /// Transforms this world-space point into the eye space of `viewpoint`.
    pub fn to_eye(&self, viewpoint: &ViewPoint3D) -> Self {
        viewpoint.world_to_eye(self)
    }

    pub fn to_na_point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn to_na_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

fn coord_eq(a: f64, b: f64) -> bool {
    a == b || a.to_bits() == b.to_bits()
}

fn coord_bits(a: f64) -> u64 {
    // 0.0 and -0.0 compare equal, so they must hash the same
    if a == 0.0 {
        0.0f64.to_bits()
    } else {
        a.to_bits()
    }
}

impl PartialEq for Point3D {
    fn eq(&self, other: &Self) -> bool {
        coord_eq(self.x, other.x) && coord_eq(self.y, other.y) && coord_eq(self.z, other.z)
    }
}

impl Eq for Point3D {}

impl Hash for Point3D {
    fn hash<H: Hasher>(&self, state: &mut H) {
        coord_bits(self.x).hash(state);
        coord_bits(self.y).hash(state);
        coord_bits(self.z).hash(state);
    }
}

impl Add for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Self) -> Self::Output {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Self) -> Self::Output {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Point3D {
    type Output = Point3D;

    fn neg(self) -> Self::Output {
        Point3D::new(-self.x, -self.y, -self.z)
    }
}

impl From<Point3<f64>> for Point3D {
    fn from(p: Point3<f64>) -> Self {
        Point3D::new(p.x, p.y, p.z)
    }
}

impl From<Vector3<f64>> for Point3D {
    fn from(v: Vector3<f64>) -> Self {
        Point3D::new(v.x, v.y, v.z)
    }
}

impl std::fmt::Display for Point3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
