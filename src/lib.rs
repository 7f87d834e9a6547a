//! A small 3D scene core for charts.
//!
//! Charts are modelled as a [`World`](world::World) of flat-faced
//! [`Object3D`](geom::Object3D)s. A [`Renderer`](render::Renderer) projects the
//! world through a [`ViewPoint3D`](viewpoint::ViewPoint3D) onto a canvas and
//! returns drawing records ordered back to front, flat shaded by a light at
//! the eye.

pub mod bounds;
pub mod color;
pub mod config;
pub mod dimension;
pub mod errors;
pub mod export;
pub mod geom;
pub mod interaction;
pub mod point;
pub mod primitives;
pub mod render;
pub mod scene;
pub mod settings;
#[cfg(feature = "macroquad")]
pub mod viewer;
pub mod viewpoint;
pub mod world;
