//! Projection of a [`World`] onto a 2D canvas.
//!
//! A render pass transforms every vertex to eye space, drops faces that reach
//! behind the eye, shades each face against the world's light, and sorts the
//! resulting records far-to-near so that painting them in order hides the
//! surfaces at the back (the painter's algorithm). The pass is a pure function
//! of the world, the viewpoint and the canvas size.

use std::fmt;

use geo::{Area, BoundingRect};
use geo_types::{Coord, LineString, Polygon, Rect};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config;
use crate::dimension::{Offset2D, Size2D};
use crate::geom::{Face, Object3D};
use crate::point::Point3D;
use crate::settings::Settings;
use crate::viewpoint::ViewPoint3D;
use crate::world::World;


/// What a [`RenderedElement`] draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// A filled polygon, optionally outlined.
    Polygon,
    /// A filled circle centred on the single point.
    Dot { radius: f64 },
    /// A stroked segment between two points.
    Line,
}

/// A single 2D drawing record, in canvas pixels with y growing downwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedElement {
    pub kind: ElementKind,
    pub points: Vec<Coord<f64>>,
    /// Mean eye-space depth of the source vertices.
    pub depth: f64,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub tag: Option<String>,
    /// Index of the source object in the world.
    pub object: usize,
    /// Index of the source face within the object, for polygons.
    pub face: Option<usize>,
}

/// Counters for a single render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    pub objects: usize,
    pub faces: usize,
    pub polygons: usize,
    pub markers: usize,
    pub clipped: usize,
    pub culled: usize,
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Objects: {}\nFaces: {}\nPolygons Emitted: {}\nMarkers Emitted: {}\nClipped: {}\nCulled: {}",
            self.objects, self.faces, self.polygons, self.markers, self.clipped, self.culled
        )
    }
}

/// The ordered output of a render pass. Painting `elements` front to back
/// of the vector gives the final image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub elements: Vec<RenderedElement>,
    pub stats: RenderStats,
}

impl Frame {
    /// The screen-space rectangle covering every element, if any.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        let coords: Vec<Coord<f64>> = self
            .elements
            .iter()
            .flat_map(|e| e.points.iter().copied())
            .collect();
        LineString::new(coords).bounding_rect()
    }
}

/// Projects worlds onto a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renderer {
    /// Distance from the eye to the projection plane, which scales the image.
    pub projection_distance: f64,
    /// Shift of the image from the canvas centre.
    pub offset: Offset2D,
    pub dot_radius: f64,
    /// Drop polygons that turn their back to the eye.
    pub cull_back_faces: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(config::DEFAULT_PROJECTION_DISTANCE)
    }
}

impl Renderer {
    pub fn new(projection_distance: f64) -> Self {
        Self {
            projection_distance,
            offset: Offset2D::ZERO,
            dot_radius: config::DEFAULT_DOT_RADIUS,
            cull_back_faces: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            projection_distance: settings.projection_distance,
            offset: settings.offset(),
            dot_radius: settings.dot_radius,
            cull_back_faces: settings.cull_back_faces,
        }
    }

    pub fn with_offset(mut self, offset: Offset2D) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_dot_radius(mut self, dot_radius: f64) -> Self {
        self.dot_radius = dot_radius;
        self
    }

    pub fn with_back_face_culling(mut self, cull: bool) -> Self {
        self.cull_back_faces = cull;
        self
    }

    /// Moves the eye to the distance at which the whole world fits the canvas,
    /// leaving `margin` (a fraction of each side) free. The offset is ignored.
    pub fn zoom_to_fit(
        &self,
        world: &World,
        viewpoint: &ViewPoint3D,
        size: Size2D,
        margin: f64,
    ) -> ViewPoint3D {
        match world.bounds() {
            Some(bounds) => {
                let rho = viewpoint.optimal_distance(
                    &bounds,
                    size.shrink(margin),
                    self.projection_distance,
                );
                debug!("zoom to fit: rho {} -> {}", viewpoint.rho(), rho);
                viewpoint.with_rho(rho)
            }
            None => {
                warn!("nothing to zoom to, keeping rho {}", viewpoint.rho());
                *viewpoint
            }
        }
    }

    /// Renders `world` as seen from `viewpoint` onto a canvas of `size`.
    pub fn render(&self, world: &World, viewpoint: &ViewPoint3D, size: Size2D) -> Frame {
        let mut pass = Pass {
            renderer: self,
            viewpoint,
            light: world.light().direction(viewpoint),
            centre: Coord {
                x: size.width / 2.0 + self.offset.dx,
                y: size.height / 2.0 + self.offset.dy,
            },
            elements: Vec::new(),
            stats: RenderStats::default(),
        };

        for (index, object) in world.objects().enumerate() {
            pass.stats.objects += 1;
            pass.add_object(index, object);
        }

        let Pass {
            mut elements,
            stats,
            ..
        } = pass;

        // stable, so equal depths keep object then face order
        elements.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        debug!(
            "rendered {} elements from {} objects ({} clipped, {} culled) at {}",
            elements.len(),
            stats.objects,
            stats.clipped,
            stats.culled,
            viewpoint
        );

        Frame { elements, stats }
    }
}

/// State of one render pass.
struct Pass<'a> {
    renderer: &'a Renderer,
    viewpoint: &'a ViewPoint3D,
    light: Point3D,
    centre: Coord<f64>,
    elements: Vec<RenderedElement>,
    stats: RenderStats,
}

impl Pass<'_> {
    fn add_object(&mut self, index: usize, object: &Object3D) {
        let eye: Vec<Point3D> = object
            .vertices()
            .iter()
            .map(|v| self.viewpoint.world_to_eye(v))
            .collect();

        if object.faces().is_empty() {
            self.add_marker(index, object, &eye);
            return;
        }

        for (face_index, face) in object.faces().iter().enumerate() {
            self.stats.faces += 1;
            let Some(points) = self.project_all(face.indices().iter().map(|&i| &eye[i])) else {
                trace!("face {} of object {} reaches behind the eye", face_index, index);
                self.stats.clipped += 1;
                continue;
            };

            if self.renderer.cull_back_faces && is_back_facing(&points) {
                self.stats.culled += 1;
                continue;
            }

            let color = self.shade(object, face);
            self.stats.polygons += 1;
            self.elements.push(RenderedElement {
                kind: ElementKind::Polygon,
                points,
                depth: face.average_depth(&eye),
                fill: Some(color),
                stroke: face.outline.then_some(color),
                tag: object.tag().map(str::to_string),
                object: index,
                face: Some(face_index),
            });
        }
    }

    /// Dots for single-vertex objects, lines for two-vertex objects. Other
    /// faceless objects draw nothing.
    fn add_marker(&mut self, index: usize, object: &Object3D, eye: &[Point3D]) {
        let (kind, fill, stroke) = match eye.len() {
            1 => (
                ElementKind::Dot {
                    radius: self.renderer.dot_radius,
                },
                Some(object.color()),
                None,
            ),
            2 => (ElementKind::Line, None, Some(object.color())),
            _ => return,
        };

        let Some(points) = self.project_all(eye.iter()) else {
            self.stats.clipped += 1;
            return;
        };

        self.stats.markers += 1;
        self.elements.push(RenderedElement {
            kind,
            points,
            depth: eye.iter().map(|e| e.z).sum::<f64>() / eye.len() as f64,
            fill,
            stroke,
            tag: object.tag().map(str::to_string),
            object: index,
            face: None,
        });
    }

    /// Projects eye-space points to canvas pixels, or `None` if any of them
    /// is at or behind the eye.
    fn project_all<'p>(&self, eye: impl Iterator<Item = &'p Point3D>) -> Option<Vec<Coord<f64>>> {
        eye.map(|e| {
            (e.z > config::DEPTH_EPSILON).then(|| {
                let s = self
                    .viewpoint
                    .eye_to_screen(e, self.renderer.projection_distance);
                Coord {
                    x: self.centre.x + s.x,
                    y: self.centre.y - s.y,
                }
            })
        })
        .collect()
    }

    /// Flat shading: a face turned fully towards the light keeps its color,
    /// a face turned fully away goes black.
    fn shade(&self, object: &Object3D, face: &Face) -> Color {
        let base = object.face_color(face);
        match face.normal(object.vertices()) {
            Some(normal) => {
                let mut cos = normal.dot(&self.light);
                if face.double_sided {
                    cos = cos.abs();
                }
                base.shade((1.0 + cos) / 2.0)
            }
            None => base,
        }
    }
}

/// Whether a polygon in canvas coordinates (y down) winds clockwise as seen
/// by the viewer, which is the case for faces whose outward side points away
/// from the eye.
fn is_back_facing(points: &[Coord<f64>]) -> bool {
    Polygon::new(LineString::new(points.to_vec()), vec![]).signed_area() > 0.0
}
