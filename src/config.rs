use std::f64::consts::{FRAC_PI_2, PI};

/// Eye-space depth at or below which a vertex is behind the eye and clipped.
pub const DEPTH_EPSILON: f64 = 1e-6;
/// Minimum length of forward x up before the camera falls back to its azimuth axis.
pub const DEGENERATE_AXIS_THRESHOLD: f64 = 1e-9;
/// Minimum cross-product length (twice the corner area) for a face to have a normal.
pub const NORMAL_EPSILON: f64 = 1e-12;
/// Distance from the eye to the projection plane, in pixels per world unit at depth 1.
pub const DEFAULT_PROJECTION_DISTANCE: f64 = 1000.0;
/// Largest elevation reachable through rotate commands.
pub const MAX_ELEVATION: f64 = FRAC_PI_2 - 0.01;
/// Radius of point markers, in pixels.
pub const DEFAULT_DOT_RADIUS: f64 = 3.0;
/// Default angular step for rotate commands and mouse drags, per pixel.
pub const DEFAULT_ROTATE_INCREMENT: f64 = PI / 120.0;
/// Iterations used when searching for a zoom-to-fit distance.
pub const FIT_ITERATIONS: usize = 60;
/// Default angular step for roll commands.
pub const DEFAULT_ROLL_INCREMENT: f64 = PI / 60.0;
/// Viewing distance used in place of a non-positive one.
pub const MIN_VIEW_DISTANCE: f64 = 1e-3;
/// Sphere tessellation used when a scene does not give one.
pub const DEFAULT_SPHERE_LAYERS: usize = 12;
