//! Mapping of pointer and keyboard input to camera changes.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::dimension::Offset2D;
use crate::settings::Settings;
use crate::viewpoint::{ViewCommand, ViewPoint3D};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn drag_rotates_by_pixels() {
        let mut input = Interaction::default();
        let vp = ViewPoint3D::new(0.0, 0.0, 10.0);
        input.press(100.0, 100.0);
        let vp = input.drag(&vp, 110.0, 96.0);
        assert_relative_eq!(vp.theta(), 10.0 * PI / 120.0);
        assert_relative_eq!(vp.phi(), 4.0 * PI / 120.0);

        // deltas are taken from the last drag position
        let vp = input.drag(&vp, 110.0, 96.0);
        assert_relative_eq!(vp.theta(), 10.0 * PI / 120.0);

        input.release();
        assert!(!input.is_dragging());
        assert_eq!(input.drag(&vp, 0.0, 0.0), vp);
    }

    #[test]
    fn sideways_drag_keeps_the_elevation() {
        let mut input = Interaction::default();
        let pole = ViewPoint3D::new(0.0, std::f64::consts::FRAC_PI_2, 10.0);
        input.press(0.0, 0.0);
        let vp = input.drag(&pole, 5.0, 0.0);
        assert_eq!(vp.phi(), pole.phi());
        assert_relative_eq!(vp.theta(), 5.0 * PI / 120.0);

        let vp = input.drag(&pole, 5.0, 3.0);
        assert_eq!(vp.theta(), pole.theta());
        assert!(vp.phi() < pole.phi());
    }

    #[test]
    fn pan_moves_the_offset_from_where_it_started() {
        let mut input = Interaction::default();
        assert_eq!(input.pan(10.0, 10.0), None);

        input.press_pan(100.0, 50.0, Offset2D::new(4.0, -2.0));
        assert!(input.is_panning());
        assert!(!input.is_dragging());
        assert_eq!(input.pan(110.0, 45.0), Some(Offset2D::new(14.0, -7.0)));
        // measured from the press point, not the previous move
        assert_eq!(input.pan(100.0, 50.0), Some(Offset2D::new(4.0, -2.0)));

        input.release();
        assert!(!input.is_panning());
        assert_eq!(input.pan(0.0, 0.0), None);
    }

    #[test]
    fn roll_commands_use_their_own_increment() {
        let input = Interaction {
            rotate_increment: 0.25,
            roll_increment: 0.1,
            ..Interaction::default()
        };
        let vp = ViewPoint3D::new(0.0, 0.0, 10.0);
        assert_eq!(input.command(&vp, ViewCommand::RollRight).roll(), 0.1);
        assert_eq!(input.command(&vp, ViewCommand::RollLeft).roll(), -0.1);
        assert_eq!(Interaction::default().roll_increment, PI / 60.0);
    }

    #[test]
    fn wheel_zooms_with_minimum() {
        let input = Interaction {
            zoom_increment: 2.0,
            min_distance: 3.0,
            ..Interaction::default()
        };
        let vp = ViewPoint3D::new(0.0, 0.0, 10.0);
        assert_eq!(input.wheel(&vp, 1.0).rho(), 12.0);
        assert_eq!(input.wheel(&vp, -2.0).rho(), 6.0);
        assert_eq!(input.wheel(&vp, -10.0).rho(), 3.0);
    }

    #[test]
    fn commands_use_increments() {
        let input = Interaction {
            rotate_increment: 0.25,
            zoom_increment: 1.5,
            ..Interaction::default()
        };
        let vp = ViewPoint3D::new(0.0, 0.0, 10.0);
        assert_eq!(input.command(&vp, ViewCommand::RotateRight).theta(), 0.25);
        assert_eq!(input.command(&vp, ViewCommand::RotateUp).phi(), 0.25);
        assert_eq!(input.command(&vp, ViewCommand::ZoomIn).rho(), 8.5);
    }
}

/// Turns drags, wheel turns and key commands into new viewpoints, and pan
/// drags into new image offsets.
///
/// The only state held is the pointer position of an active drag. The
/// viewpoint and offset themselves always belong to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Radians per dragged pixel, and per rotate command.
    pub rotate_increment: f64,
    /// Radians per roll command.
    pub roll_increment: f64,
    /// World units per wheel unit, and per zoom command.
    pub zoom_increment: f64,
    /// Closest the eye may get to the origin.
    pub min_distance: f64,
    #[serde(skip)]
    last: Option<(f64, f64)>,
    /// Press point and offset at the start of a pan.
    #[serde(skip)]
    pan_anchor: Option<((f64, f64), Offset2D)>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            rotate_increment: config::DEFAULT_ROTATE_INCREMENT,
            roll_increment: config::DEFAULT_ROLL_INCREMENT,
            zoom_increment: 1.0,
            min_distance: 1.0,
            last: None,
            pan_anchor: None,
        }
    }
}

impl Interaction {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rotate_increment: settings.rotate_increment,
            roll_increment: settings.roll_increment,
            zoom_increment: settings.zoom_increment,
            min_distance: settings.min_distance,
            last: None,
            pan_anchor: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    /// Starts a drag at the given pointer position.
    pub fn press(&mut self, x: f64, y: f64) {
        self.last = Some((x, y));
    }

    /// Continues a drag. Horizontal motion turns the azimuth, vertical motion
    /// (upwards on screen) raises the elevation. Without an active drag the
    /// viewpoint is returned unchanged.
    pub fn drag(&mut self, viewpoint: &ViewPoint3D, x: f64, y: f64) -> ViewPoint3D {
        let Some((last_x, last_y)) = self.last else {
            return *viewpoint;
        };
        self.last = Some((x, y));
        let (dx, dy) = (x - last_x, last_y - y);
        trace!("drag by ({}, {}) pixels", dx, dy);
        let mut viewpoint = *viewpoint;
        if dx != 0.0 {
            viewpoint = viewpoint.rotate_right(dx * self.rotate_increment);
        }
        // only vertical motion goes through the elevation clamp
        if dy != 0.0 {
            viewpoint = viewpoint.rotate_up(dy * self.rotate_increment);
        }
        viewpoint
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Starts a pan at the given pointer position, from the current image
    /// offset.
    pub fn press_pan(&mut self, x: f64, y: f64, offset: Offset2D) {
        self.pan_anchor = Some(((x, y), offset));
    }

    /// The image offset that keeps the point under the pointer where it was
    /// when the pan started, or `None` without an active pan.
    pub fn pan(&self, x: f64, y: f64) -> Option<Offset2D> {
        let ((start_x, start_y), offset) = self.pan_anchor?;
        Some(Offset2D::new(
            offset.dx + x - start_x,
            offset.dy + y - start_y,
        ))
    }

    /// Ends any drag or pan.
    pub fn release(&mut self) {
        self.last = None;
        self.pan_anchor = None;
    }

    /// Moves the eye out for positive `units`, in for negative.
    pub fn wheel(&self, viewpoint: &ViewPoint3D, units: f64) -> ViewPoint3D {
        viewpoint.with_rho((viewpoint.rho() + units * self.zoom_increment).max(self.min_distance))
    }

    pub fn command(&self, viewpoint: &ViewPoint3D, command: ViewCommand) -> ViewPoint3D {
        let step = match command {
            ViewCommand::ZoomIn | ViewCommand::ZoomOut => self.zoom_increment,
            ViewCommand::RollLeft | ViewCommand::RollRight => self.roll_increment,
            _ => self.rotate_increment,
        };
        viewpoint.apply(command, step, self.min_distance)
    }
}
