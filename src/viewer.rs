//! Interactive painting surface built on macroquad.
//!
//! The viewer owns a world and a viewpoint, turns mouse and keyboard input
//! into new viewpoints and paints each frame's records in order.

use anyhow::Result;
use itertools::Itertools;
use macroquad::prelude as mq;

use crate::color::Color;
use crate::dimension::Size2D;
use crate::interaction::Interaction;
use crate::render::{ElementKind, Frame, RenderedElement, Renderer};
use crate::scene;
use crate::settings::{CliArgs, Settings};
use crate::viewpoint::{ViewCommand, ViewPoint3D};
use crate::world::World;

const OUTLINE_THICKNESS: f32 = 1.0;

pub fn to_mq_color(color: Color) -> mq::Color {
    mq::Color::from_rgba(color.r, color.g, color.b, color.a)
}

fn to_vec2(coord: &geo_types::Coord<f64>) -> mq::Vec2 {
    mq::vec2(coord.x as f32, coord.y as f32)
}

/// Paints every element of a frame, back to front.
pub fn draw_frame(frame: &Frame) {
    for element in &frame.elements {
        draw_element(element);
    }
}

fn draw_element(element: &RenderedElement) {
    let points: Vec<mq::Vec2> = element.points.iter().map(to_vec2).collect();
    match (element.kind, points.as_slice()) {
        (ElementKind::Polygon, [first, rest @ ..]) => {
            if let Some(fill) = element.fill {
                // faces are convex, so a fan from the first vertex covers them
                for (b, c) in rest.iter().tuple_windows() {
                    mq::draw_triangle(*first, *b, *c, to_mq_color(fill));
                }
            }
            if let Some(stroke) = element.stroke {
                for (a, b) in points.iter().circular_tuple_windows() {
                    mq::draw_line(a.x, a.y, b.x, b.y, OUTLINE_THICKNESS, to_mq_color(stroke));
                }
            }
        }
        (ElementKind::Dot { radius }, [centre, ..]) => {
            if let Some(fill) = element.fill {
                mq::draw_circle(centre.x, centre.y, radius as f32, to_mq_color(fill));
            }
        }
        (ElementKind::Line, [a, b, ..]) => {
            if let Some(stroke) = element.stroke {
                mq::draw_line(a.x, a.y, b.x, b.y, OUTLINE_THICKNESS, to_mq_color(stroke));
            }
        }
        _ => {}
    }
}

/// The state of an interactive session.
pub struct Viewer {
    pub world: World,
    pub viewpoint: ViewPoint3D,
    pub renderer: Renderer,
    pub interaction: Interaction,
    pub background: Color,
    fit_margin: f64,
}

impl Viewer {
    pub fn new(world: World, viewpoint: ViewPoint3D, settings: &Settings) -> Self {
        Self {
            world,
            viewpoint,
            renderer: Renderer::from_settings(settings),
            interaction: Interaction::from_settings(settings),
            background: settings.background,
            fit_margin: settings.fit_margin,
        }
    }

    /// Loads the configured scene (or the demo chart) and the starting view.
    pub fn from_settings(settings: &Settings, args: &CliArgs) -> Result<Self> {
        let scene = match &settings.scene {
            Some(path) => scene::load_scene(std::path::Path::new(path))?,
            None => scene::demo_scene(),
        };
        let viewpoint = settings.resolve_viewpoint(args, scene.view);
        let mut viewer = Self::new(scene.into_world(), viewpoint, settings);
        if settings.zoom_to_fit {
            viewer.zoom_to_fit(settings.canvas());
        }
        Ok(viewer)
    }

    pub fn zoom_to_fit(&mut self, size: Size2D) {
        self.viewpoint =
            self.renderer
                .zoom_to_fit(&self.world, &self.viewpoint, size, self.fit_margin);
    }

    /// Reads this frame's mouse and keyboard input and updates the viewpoint
    /// and the image offset. Dragging with Alt or Shift held pans.
    pub fn handle_input(&mut self) {
        let (x, y) = mq::mouse_position();
        let (x, y) = (x as f64, y as f64);
        if mq::is_mouse_button_pressed(mq::MouseButton::Left) {
            let panning = [
                mq::KeyCode::LeftAlt,
                mq::KeyCode::RightAlt,
                mq::KeyCode::LeftShift,
                mq::KeyCode::RightShift,
            ]
            .into_iter()
            .any(mq::is_key_down);
            if panning {
                self.interaction.press_pan(x, y, self.renderer.offset);
            } else {
                self.interaction.press(x, y);
            }
        } else if mq::is_mouse_button_down(mq::MouseButton::Left) {
            if let Some(offset) = self.interaction.pan(x, y) {
                self.renderer.offset = offset;
            } else {
                self.viewpoint = self.interaction.drag(&self.viewpoint, x, y);
            }
        }
        if mq::is_mouse_button_released(mq::MouseButton::Left) {
            self.interaction.release();
        }

        let (_, wheel) = mq::mouse_wheel();
        if wheel != 0.0 {
            // scrolling up moves the eye closer
            self.viewpoint = self
                .interaction
                .wheel(&self.viewpoint, -(wheel.signum() as f64));
        }

        let keys = [
            (mq::KeyCode::Left, ViewCommand::RotateLeft),
            (mq::KeyCode::Right, ViewCommand::RotateRight),
            (mq::KeyCode::Up, ViewCommand::RotateUp),
            (mq::KeyCode::Down, ViewCommand::RotateDown),
            (mq::KeyCode::Equal, ViewCommand::ZoomIn),
            (mq::KeyCode::KpAdd, ViewCommand::ZoomIn),
            (mq::KeyCode::Minus, ViewCommand::ZoomOut),
            (mq::KeyCode::KpSubtract, ViewCommand::ZoomOut),
            (mq::KeyCode::Q, ViewCommand::RollLeft),
            (mq::KeyCode::E, ViewCommand::RollRight),
        ];
        for (key, command) in keys {
            if mq::is_key_down(key) {
                self.viewpoint = self.interaction.command(&self.viewpoint, command);
            }
        }

        if mq::is_key_pressed(mq::KeyCode::F) {
            self.zoom_to_fit(screen_size());
        }
    }

    pub fn render(&self, size: Size2D) -> Frame {
        self.renderer.render(&self.world, &self.viewpoint, size)
    }
}

pub fn screen_size() -> Size2D {
    Size2D::new(mq::screen_width() as f64, mq::screen_height() as f64)
}
