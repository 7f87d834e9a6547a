//! The camera: a point on a sphere around the world origin, looking at it.
//!
//! The eye sits at spherical coordinates (theta, phi, rho) where theta is the
//! azimuth in the x-z plane (from +x towards +z), phi the elevation above that
//! plane and rho the distance from the origin. World up is +y.
//!
//! Eye space is right-handed with x to the right, y up and z the depth ahead
//! of the eye, so anything the camera can see has a positive z. A roll angle
//! turns the image about the view axis.

use std::fmt;

use geo_types::Coord;
use log::{trace, warn};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::config;
use crate::dimension::Size2D;
use crate::errors::InvalidViewPoint;
use crate::point::Point3D;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn origin_is_straight_ahead() {
        let vp = ViewPoint3D::new(0.3, 0.4, 12.0);
        let eye = vp.world_to_eye(&Point3D::ORIGIN);
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(eye.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(eye.z, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn eye_axes() {
        // looking from +z towards the origin: +x is to the right, +y is up
        let vp = ViewPoint3D::new(FRAC_PI_2, 0.0, 10.0);
        let right = vp.world_to_eye(&Point3D::UNIT_X);
        assert_relative_eq!(right.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(right.y, 0.0, epsilon = 1e-12);
        let up = vp.world_to_eye(&Point3D::UNIT_Y);
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-12);
        let near = vp.world_to_eye(&Point3D::UNIT_Z);
        assert_relative_eq!(near.z, 9.0, epsilon = 1e-12);
    }

    #[test]
    fn straight_down_uses_azimuth_axis() {
        let vp = ViewPoint3D::new(0.0, FRAC_PI_2, 10.0);
        let eye = vp.world_to_eye(&Point3D::new(0.0, 1.0, 0.0));
        assert!(eye.x.is_finite() && eye.y.is_finite());
        assert_relative_eq!(eye.z, 9.0, epsilon = 1e-9);
        // screen up is the direction pointing away from the eye's azimuth
        let far = vp.world_to_eye(&Point3D::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(far.y, 1.0, epsilon = 1e-9);

        let below = ViewPoint3D::new(0.0, -FRAC_PI_2, 10.0);
        let p = below.world_to_eye(&Point3D::new(1.0, 0.0, 0.0));
        assert!(p.x.is_finite());
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn projection_divides_by_depth() {
        let vp = ViewPoint3D::new(FRAC_PI_2, 0.0, 10.0);
        let screen = vp.world_to_screen(&Point3D::new(1.0, 2.0, 0.0), 100.0).unwrap();
        assert_relative_eq!(screen.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(screen.y, 20.0, epsilon = 1e-9);

        // increasing rho zooms out
        let far = vp.with_rho(20.0);
        let screen = far.world_to_screen(&Point3D::new(1.0, 2.0, 0.0), 100.0).unwrap();
        assert_relative_eq!(screen.x, 5.0, epsilon = 1e-9);

        // the eye itself and anything behind it are clipped
        assert!(vp.world_to_screen(&vp.eye_position(), 100.0).is_none());
        assert!(vp
            .world_to_screen(&Point3D::new(0.0, 0.0, 11.0), 100.0)
            .is_none());
    }

    #[test]
    fn rotate_round_trip() {
        let vp = ViewPoint3D::new(1.0, 0.2, 5.0);
        let back = vp.rotate_left(PI / 60.0).rotate_right(PI / 60.0);
        assert_relative_eq!(back.theta(), vp.theta(), epsilon = 1e-15);
        assert_eq!(back.phi(), vp.phi());
    }

    #[test]
    fn elevation_is_clamped() {
        let vp = ViewPoint3D::new(0.0, 1.5, 5.0).rotate_up(1.0);
        assert_eq!(vp.phi(), config::MAX_ELEVATION);
        let vp = vp.rotate_down(10.0);
        assert_eq!(vp.phi(), -config::MAX_ELEVATION);
    }

    #[test]
    fn zoom_respects_minimum() {
        let vp = ViewPoint3D::new(0.0, 0.0, 5.0);
        assert_eq!(vp.zoom_in(2.0, 1.0).rho(), 3.0);
        assert_eq!(vp.zoom_in(10.0, 1.0).rho(), 1.0);
        assert_eq!(vp.zoom_out(2.0, 1.0).rho(), 7.0);
        assert_eq!(
            vp.apply(ViewCommand::ZoomOut, 2.0, 1.0),
            vp.zoom_out(2.0, 1.0)
        );
        assert_eq!(
            vp.apply(ViewCommand::RotateLeft, 0.5, 1.0).theta(),
            -0.5
        );
    }

    #[test]
    fn light_points_at_the_eye() {
        let vp = ViewPoint3D::new(0.0, 0.0, 7.0);
        let light = vp.light_direction();
        assert_relative_eq!(light.x, 1.0);
        assert_relative_eq!(light.length(), 1.0);
    }

    #[test]
    fn optimal_distance_fits_the_box() {
        let vp = ViewPoint3D::new(0.5, 0.3, 1.0);
        let bounds = Aabb::new(Point3D::new(-1.0, -1.0, -1.0), Point3D::new(1.0, 1.0, 1.0));
        let target = Size2D::new(200.0, 100.0);
        let rho = vp.optimal_distance(&bounds, target, 100.0);
        assert!(vp.with_rho(rho).fits(&bounds, target, 100.0));
        assert!(!vp.with_rho(rho * 0.99).fits(&bounds, target, 100.0));
    }

    #[test]
    fn serde_through_angles() {
        let vp = ViewPoint3D::new(0.1, 0.2, 3.0);
        let json = serde_json::to_string(&vp).unwrap();
        assert_eq!(json, r#"{"theta":0.1,"phi":0.2,"rho":3.0,"roll":0.0}"#);
        let back: ViewPoint3D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vp);

        let rolled: ViewPoint3D =
            serde_json::from_str(r#"{"theta":0.1,"phi":0.2,"rho":3.0,"roll":0.5}"#).unwrap();
        assert_eq!(rolled, vp.with_roll(0.5));
    }

    #[test]
    fn roll_turns_the_image_clockwise() {
        let vp = ViewPoint3D::new(FRAC_PI_2, 0.0, 10.0).with_roll(FRAC_PI_2);
        let up = vp.world_to_eye(&Point3D::UNIT_Y);
        assert_relative_eq!(up.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(up.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(up.z, 10.0, epsilon = 1e-12);

        let vp = ViewPoint3D::new(0.4, 0.3, 8.0);
        let back = vp.roll_left(0.2).roll_right(0.2);
        assert_relative_eq!(back.roll(), 0.0, epsilon = 1e-15);
        assert_eq!(vp.apply(ViewCommand::RollRight, 0.2, 1.0).roll(), 0.2);
        assert_eq!(vp.apply(ViewCommand::RollLeft, 0.2, 1.0).roll(), -0.2);
        // rotating keeps the roll
        assert_eq!(vp.with_roll(0.3).rotate_left(0.1).roll(), 0.3);
        assert_eq!(vp.with_roll(0.3).light_direction(), vp.light_direction());
    }

    #[test]
    fn eye_directions_map_back_to_world() {
        let vp = ViewPoint3D::new(0.7, 0.2, 6.0).with_roll(0.4);
        let towards_eye = vp.eye_direction_to_world(&Point3D::new(0.0, 0.0, -1.0));
        let light = vp.light_direction();
        assert_relative_eq!(towards_eye.x, light.x, epsilon = 1e-12);
        assert_relative_eq!(towards_eye.y, light.y, epsilon = 1e-12);
        assert_relative_eq!(towards_eye.z, light.z, epsilon = 1e-12);
    }

    #[test]
    fn non_positive_distance_is_clamped() {
        for rho in [0.0, -3.0, f64::NAN] {
            let vp = ViewPoint3D::new(0.2, 0.1, rho);
            assert_eq!(vp.rho(), config::MIN_VIEW_DISTANCE);
            let eye = vp.world_to_eye(&Point3D::new(0.0, 0.0, -1.0));
            assert!(eye.x.is_finite() && eye.y.is_finite() && eye.z.is_finite());
        }
        assert_eq!(
            ViewPoint3D::try_new(0.0, 0.0, 0.0),
            Err(InvalidViewPoint::NonPositiveDistance { rho: 0.0 })
        );
        assert!(ViewPoint3D::try_new(0.0, f64::INFINITY, 1.0).is_err());
        assert!(ViewPoint3D::try_new(0.0, 0.0, 1.0).is_ok());
    }
}

/// An incremental camera change, as issued by keyboard or toolbar input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewCommand {
    RotateLeft,
    RotateRight,
    RotateUp,
    RotateDown,
    ZoomIn,
    ZoomOut,
    RollLeft,
    RollRight,
}

/// The plain angles of a [`ViewPoint3D`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewAngles {
    pub theta: f64,
    pub phi: f64,
    pub rho: f64,
    #[serde(default)]
    pub roll: f64,
}

impl ViewAngles {
    /// Checks that the angles are finite and the distance is positive.
    pub fn validate(&self) -> Result<(), InvalidViewPoint> {
        if ![self.theta, self.phi, self.roll].iter().all(|a| a.is_finite()) {
            return Err(InvalidViewPoint::NonFinite);
        }
        if !(self.rho > 0.0 && self.rho.is_finite()) {
            return Err(InvalidViewPoint::NonPositiveDistance { rho: self.rho });
        }
        Ok(())
    }
}

/// A camera position on a sphere around the origin.
///
/// Immutable: every command returns a new viewpoint. The world-to-eye
/// isometry is computed once on construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "ViewAngles", into = "ViewAngles")]
pub struct ViewPoint3D {
    theta: f64,
    phi: f64,
    rho: f64,
    roll: f64,
    view: Isometry3<f64>,
}

impl PartialEq for ViewPoint3D {
    fn eq(&self, other: &Self) -> bool {
        self.angles() == other.angles()
    }
}

impl ViewPoint3D {
    /// Creates an unrolled viewpoint.
    ///
    /// A camera at the origin has no view direction, so a `rho` that is not
    /// positive is raised to [`config::MIN_VIEW_DISTANCE`]. Use
    /// [`ViewPoint3D::try_new`] to reject such input instead.
    pub fn new(theta: f64, phi: f64, rho: f64) -> Self {
        Self::build(theta, phi, rho, 0.0)
    }

    pub fn try_new(theta: f64, phi: f64, rho: f64) -> Result<Self, InvalidViewPoint> {
        let angles = ViewAngles {
            theta,
            phi,
            rho,
            roll: 0.0,
        };
        angles.validate()?;
        Ok(angles.into())
    }

    fn build(theta: f64, phi: f64, rho: f64, roll: f64) -> Self {
        let rho = if rho > 0.0 {
            rho
        } else {
            warn!(
                "viewing distance {} is not positive, using {}",
                rho,
                config::MIN_VIEW_DISTANCE
            );
            config::MIN_VIEW_DISTANCE
        };
        Self {
            theta,
            phi,
            rho,
            roll,
            view: view_transform(theta, phi, rho, roll),
        }
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Clockwise turn of the image about the view axis, in radians.
    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn angles(&self) -> ViewAngles {
        ViewAngles {
            theta: self.theta,
            phi: self.phi,
            rho: self.rho,
            roll: self.roll,
        }
    }

    pub fn with_theta(&self, theta: f64) -> Self {
        Self::build(theta, self.phi, self.rho, self.roll)
    }

    pub fn with_phi(&self, phi: f64) -> Self {
        Self::build(self.theta, phi, self.rho, self.roll)
    }

    pub fn with_rho(&self, rho: f64) -> Self {
        Self::build(self.theta, self.phi, rho, self.roll)
    }

    pub fn with_roll(&self, roll: f64) -> Self {
        Self::build(self.theta, self.phi, self.rho, roll)
    }

    /// World position of the eye.
    pub fn eye_position(&self) -> Point3D {
        Point3D::from_spherical(self.theta, self.phi, self.rho)
    }

    /// Unit vector from the origin towards the eye, used as the light
    /// direction for flat shading.
    pub fn light_direction(&self) -> Point3D {
        Point3D::from_spherical(self.theta, self.phi, 1.0).normalize()
    }

    /// Rotates a direction given in eye space (x right, y up, z ahead) into
    /// world space.
    pub fn eye_direction_to_world(&self, d: &Point3D) -> Point3D {
        self.view
            .inverse_transform_vector(&Vector3::new(d.x, d.y, -d.z))
            .into()
    }

    /// Converts a world point to eye space: (x right, y up, depth ahead).
    pub fn world_to_eye(&self, p: &Point3D) -> Point3D {
        let q = self.view.transform_point(&p.to_na_point());
        Point3D::new(q.x, q.y, -q.z)
    }

    /// Perspective projection of an eye-space point onto the plane at
    /// distance `d`. The caller is responsible for clipping non-positive
    /// depths first.
    pub fn eye_to_screen(&self, e: &Point3D, d: f64) -> Coord<f64> {
        Coord {
            x: e.x * d / e.z,
            y: e.y * d / e.z,
        }
    }

    /// Projects a world point, or returns `None` when it lies at or behind
    /// the eye.
    pub fn world_to_screen(&self, p: &Point3D, d: f64) -> Option<Coord<f64>> {
        let e = self.world_to_eye(p);
        (e.z > config::DEPTH_EPSILON).then(|| self.eye_to_screen(&e, d))
    }

    /// Moves the eye clockwise (seen from above) around the y axis.
    pub fn rotate_left(&self, step: f64) -> Self {
        self.with_theta(self.theta - step)
    }

    pub fn rotate_right(&self, step: f64) -> Self {
        self.with_theta(self.theta + step)
    }

    pub fn rotate_up(&self, step: f64) -> Self {
        self.with_phi(clamp_elevation(self.phi + step))
    }

    pub fn rotate_down(&self, step: f64) -> Self {
        self.with_phi(clamp_elevation(self.phi - step))
    }

    pub fn zoom_in(&self, step: f64, min_rho: f64) -> Self {
        self.with_rho((self.rho - step).max(min_rho))
    }

    pub fn zoom_out(&self, step: f64, min_rho: f64) -> Self {
        self.with_rho((self.rho + step).max(min_rho))
    }

    /// Turns the image counter-clockwise.
    pub fn roll_left(&self, step: f64) -> Self {
        self.with_roll(self.roll - step)
    }

    pub fn roll_right(&self, step: f64) -> Self {
        self.with_roll(self.roll + step)
    }

    /// Applies a command, using `step` as the angle (radians) for rotations
    /// and rolls, and the distance for zooms.
    pub fn apply(&self, command: ViewCommand, step: f64, min_rho: f64) -> Self {
        match command {
            ViewCommand::RotateLeft => self.rotate_left(step),
            ViewCommand::RotateRight => self.rotate_right(step),
            ViewCommand::RotateUp => self.rotate_up(step),
            ViewCommand::RotateDown => self.rotate_down(step),
            ViewCommand::ZoomIn => self.zoom_in(step, min_rho),
            ViewCommand::ZoomOut => self.zoom_out(step, min_rho),
            ViewCommand::RollLeft => self.roll_left(step),
            ViewCommand::RollRight => self.roll_right(step),
        }
    }

    /// Whether every corner of `bounds` is in front of the eye and projects
    /// inside a `target` sized area centred on the origin's image.
    pub fn fits(&self, bounds: &Aabb, target: Size2D, d: f64) -> bool {
        let (half_w, half_h) = (target.width / 2.0, target.height / 2.0);
        bounds.corners().iter().all(|corner| {
            self.world_to_screen(corner, d)
                .is_some_and(|s| s.x.abs() <= half_w && s.y.abs() <= half_h)
        })
    }

    /// Finds the smallest distance at which `bounds` fits in `target`,
    /// keeping the current angles.
    pub fn optimal_distance(&self, bounds: &Aabb, target: Size2D, d: f64) -> f64 {
        let radius = bounds
            .corners()
            .iter()
            .map(Point3D::length)
            .fold(0.0, f64::max);

        let mut hi = 2.0 * radius + 1.0;
        let mut doublings = 0;
        while !self.with_rho(hi).fits(bounds, target, d) {
            if doublings == 64 {
                warn!("bounds cannot fit in {:?}, using distance {}", target, hi);
                return hi;
            }
            hi *= 2.0;
            doublings += 1;
        }

        let mut lo = 0.0;
        for _ in 0..config::FIT_ITERATIONS {
            let mid = (lo + hi) / 2.0;
            if self.with_rho(mid).fits(bounds, target, d) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        hi
    }
}

impl From<ViewAngles> for ViewPoint3D {
    fn from(angles: ViewAngles) -> Self {
        Self::build(angles.theta, angles.phi, angles.rho, angles.roll)
    }
}

impl From<ViewPoint3D> for ViewAngles {
    fn from(vp: ViewPoint3D) -> Self {
        vp.angles()
    }
}

impl fmt::Display for ViewPoint3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "theta: {:.4} rad, phi: {:.4} rad, rho: {:.4}, roll: {:.4} rad",
            self.theta, self.phi, self.rho, self.roll
        )
    }
}

fn clamp_elevation(phi: f64) -> f64 {
    phi.clamp(-config::MAX_ELEVATION, config::MAX_ELEVATION)
}

/// Builds the world-to-eye isometry for a camera at the given spherical
/// coordinates looking at the origin, rolled about its view axis.
fn view_transform(theta: f64, phi: f64, rho: f64, roll: f64) -> Isometry3<f64> {
    let eye = Point3D::from_spherical(theta, phi, rho).to_na_point();
    let target = Point3::origin();
    let forward = (target - eye).normalize();

    let up = if forward.cross(&Vector3::y()).norm() < config::DEGENERATE_AXIS_THRESHOLD {
        // looking straight up or down, use the azimuth axis as screen up
        trace!(
            "degenerate camera at theta {} phi {}, using azimuth axis",
            theta,
            phi
        );
        Vector3::new(theta.cos(), 0.0, theta.sin()) * forward.y.signum()
    } else {
        Vector3::y()
    };

    let look_at = Isometry3::look_at_rh(&eye, &target, &up);
    // turning the view space by -roll about +z turns the image clockwise
    let turn = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -roll);
    Isometry3::from_parts(Translation3::identity(), turn) * look_at
}
