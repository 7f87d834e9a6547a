//! Factories for the solids and markers a chart is assembled from.
//!
//! Every closed solid is wound so that face normals, computed with the
//! right-hand rule in [`Face::normal`], point away from the interior.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geom::{Face, Object3D};
use crate::point::Point3D;


/// Parameters for a data bar running from `base` to `value` along y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    /// Centre of the footprint.
    pub x: f64,
    pub z: f64,
    pub x_width: f64,
    pub z_width: f64,
    pub base: f64,
    pub value: f64,
    pub color: Color,
    /// Color of the face at the `base` end.
    #[serde(default)]
    pub base_color: Option<Color>,
    /// Color of the face at the `value` end.
    #[serde(default)]
    pub top_color: Option<Color>,
    /// Swap `base_color` and `top_color`, for bars drawn against an inverted axis.
    #[serde(default)]
    pub inverted: bool,
}

impl BarGeometry {
    /// A unit-footprint bar from `base` to `value` with no end colors.
    pub fn new(x: f64, z: f64, base: f64, value: f64, color: Color) -> Self {
        Self {
            x,
            z,
            x_width: 1.0,
            z_width: 1.0,
            base,
            value,
            color,
            base_color: None,
            top_color: None,
            inverted: false,
        }
    }
}

/// Parameters for an extruded pie wedge, centred on the y axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSegment {
    pub radius: f64,
    /// Distance the wedge is pushed out along its bisector.
    #[serde(default)]
    pub explode_radius: f64,
    pub base: f64,
    pub height: f64,
    /// Start and end angles in radians, measured from +x towards +z.
    pub angle1: f64,
    pub angle2: f64,
    /// Maximum angular step of the outer wall.
    #[serde(default = "default_pie_increment")]
    pub increment: f64,
    pub color: Color,
}

fn default_pie_increment() -> f64 {
    PI / 180.0
}

impl PieSegment {
    pub fn new(radius: f64, base: f64, height: f64, angle1: f64, angle2: f64, color: Color) -> Self {
        Self {
            radius,
            explode_radius: 0.0,
            base,
            height,
            angle1,
            angle2,
            increment: default_pie_increment(),
            color,
        }
    }

    /// Number of wall facets between the two angles (at least one).
    pub fn steps(&self) -> usize {
        let span = (self.angle2 - self.angle1).max(0.0);
        if self.increment > 0.0 {
            ((span / self.increment).ceil() as usize).max(1)
        } else {
            1
        }
    }
}

impl Object3D {
    /// A cube of edge `size` centred on (`x`, `y`, `z`).
    pub fn create_cube(size: f64, x: f64, y: f64, z: f64, color: Color) -> Self {
        Self::create_box(x, size, y, size, z, size, color)
    }

    /// An axis-aligned box centred on (`x`, `y`, `z`) with the given extents.
    pub fn create_box(
        x: f64,
        xdim: f64,
        y: f64,
        ydim: f64,
        z: f64,
        zdim: f64,
        color: Color,
    ) -> Self {
        let (xd, yd, zd) = (xdim / 2.0, ydim / 2.0, zdim / 2.0);
        let mut obj = Object3D::new(color);
        add_cuboid(&mut obj, [x - xd, x + xd], [y - yd, y + yd], [z - zd, z + zd], None, None);
        obj
    }

    /// An upright square column with its base at `y` and height equal to `width`.
    pub fn create_bar(width: f64, x: f64, y: f64, z: f64, color: Color) -> Self {
        let d = width / 2.0;
        let mut obj = Object3D::new(color);
        add_cuboid(&mut obj, [x - d, x + d], [y, y + width], [z - d, z + d], None, None);
        obj
    }

    /// A data bar. The end faces take `base_color` and `top_color` (swapped
    /// when `inverted`), falling back to the bar color.
    pub fn create_value_bar(geometry: &BarGeometry) -> Self {
        let (mut at_base, mut at_value) = (geometry.base_color, geometry.top_color);
        if geometry.inverted {
            std::mem::swap(&mut at_base, &mut at_value);
        }
        let (low, high, bottom, top) = if geometry.value >= geometry.base {
            (geometry.base, geometry.value, at_base, at_value)
        } else {
            (geometry.value, geometry.base, at_value, at_base)
        };
        let xd = geometry.x_width / 2.0;
        let zd = geometry.z_width / 2.0;
        let mut obj = Object3D::new(geometry.color);
        add_cuboid(
            &mut obj,
            [geometry.x - xd, geometry.x + xd],
            [low, high],
            [geometry.z - zd, geometry.z + zd],
            bottom,
            top,
        );
        obj
    }

    /// A single-vertex point marker.
    pub fn create_dot(x: f64, y: f64, z: f64, color: Color) -> Self {
        let mut obj = Object3D::new(color);
        obj.add_vertex(Point3D::new(x, y, z));
        obj
    }

    /// A two-vertex segment, drawn as a stroked line.
    pub fn create_line(from: Point3D, to: Point3D, color: Color) -> Self {
        let mut obj = Object3D::new(color);
        obj.add_vertex(from);
        obj.add_vertex(to);
        obj
    }

    /// A square in the plane y = `y`, facing +y (or -y when `invert` is set).
    pub fn create_y_sheet(size: f64, x: f64, y: f64, z: f64, color: Color, invert: bool) -> Self {
        let d = size / 2.0;
        let mut obj = Object3D::new(color);
        obj.add_vertex(Point3D::new(x + d, y, z - d));
        obj.add_vertex(Point3D::new(x + d, y, z + d));
        obj.add_vertex(Point3D::new(x - d, y, z + d));
        obj.add_vertex(Point3D::new(x - d, y, z - d));
        let indices = if invert { vec![0, 1, 2, 3] } else { vec![3, 2, 1, 0] };
        obj.push_face_unchecked(Face::new(indices));
        obj
    }

    /// A square in the plane z = `z`, facing +z (or -z when `invert` is set).
    pub fn create_z_sheet(size: f64, x: f64, y: f64, z: f64, color: Color, invert: bool) -> Self {
        let d = size / 2.0;
        let mut obj = Object3D::new(color);
        obj.add_vertex(Point3D::new(x + d, y - d, z));
        obj.add_vertex(Point3D::new(x + d, y + d, z));
        obj.add_vertex(Point3D::new(x - d, y + d, z));
        obj.add_vertex(Point3D::new(x - d, y - d, z));
        let indices = if invert { vec![3, 2, 1, 0] } else { vec![0, 1, 2, 3] };
        obj.push_face_unchecked(Face::new(indices));
        obj
    }

    /// A regular tetrahedron inscribed in the cube of half-edge `size`.
    pub fn create_tetrahedron(size: f64, x: f64, y: f64, z: f64, color: Color) -> Self {
        let mut obj = Object3D::new(color);
        obj.add_vertex(Point3D::new(x + size, y - size, z - size));
        obj.add_vertex(Point3D::new(x - size, y + size, z - size));
        obj.add_vertex(Point3D::new(x + size, y + size, z + size));
        obj.add_vertex(Point3D::new(x - size, y - size, z + size));
        for indices in [[0, 1, 2], [1, 3, 2], [0, 3, 1], [0, 2, 3]] {
            obj.push_face_unchecked(Face::new(indices.to_vec()));
        }
        obj
    }

    /// An octahedron with its vertices `size` away from the centre along each axis.
    pub fn create_octahedron(size: f64, x: f64, y: f64, z: f64, color: Color) -> Self {
        let mut obj = Object3D::new(color);
        obj.add_vertex(Point3D::new(x + size, y, z));
        obj.add_vertex(Point3D::new(x, y + size, z));
        obj.add_vertex(Point3D::new(x - size, y, z));
        obj.add_vertex(Point3D::new(x, y - size, z));
        obj.add_vertex(Point3D::new(x, y, z - size));
        obj.add_vertex(Point3D::new(x, y, z + size));
        for indices in [
            [0, 1, 5],
            [1, 2, 5],
            [2, 3, 5],
            [3, 0, 5],
            [1, 0, 4],
            [2, 1, 4],
            [3, 2, 4],
            [0, 3, 4],
        ] {
            obj.push_face_unchecked(Face::new(indices.to_vec()));
        }
        obj
    }

    /// A sphere of `layers` bands from pole to pole, each band split into
    /// `2 * layers` facets (at least two bands).
    ///
    /// Every outward facet in `ext_color` is preceded by a reversed copy in
    /// `int_color`, so at equal depth the outer side is painted last.
    pub fn create_sphere(
        radius: f64,
        layers: usize,
        x: f64,
        y: f64,
        z: f64,
        ext_color: Color,
        int_color: Color,
    ) -> Self {
        let layers = layers.max(2);
        let segments = 2 * layers;
        let step = PI / layers as f64;

        let mut obj = Object3D::new(ext_color);
        let top = obj.add_vertex(Point3D::new(x, y + radius, z));
        for layer in 1..layers {
            let polar = layer as f64 * step;
            for i in 0..segments {
                let azimuth = i as f64 * step;
                obj.add_vertex(Point3D::new(
                    x + radius * polar.sin() * azimuth.cos(),
                    y + radius * polar.cos(),
                    z + radius * polar.sin() * azimuth.sin(),
                ));
            }
        }
        let bottom = obj.add_vertex(Point3D::new(x, y - radius, z));

        // vertex i of ring `layer`, counted down from the top pole
        let ring = |layer: usize, i: usize| 1 + (layer - 1) * segments + i % segments;
        for i in 0..segments {
            push_two_sided(&mut obj, vec![top, ring(1, i + 1), ring(1, i)], int_color);
        }
        for layer in 1..layers - 1 {
            for i in 0..segments {
                let quad = vec![
                    ring(layer, i),
                    ring(layer, i + 1),
                    ring(layer + 1, i + 1),
                    ring(layer + 1, i),
                ];
                push_two_sided(&mut obj, quad, int_color);
            }
        }
        for i in 0..segments {
            let last = layers - 1;
            push_two_sided(&mut obj, vec![ring(last, i), ring(last, i + 1), bottom], int_color);
        }
        obj
    }

    /// An extruded pie wedge.
    ///
    /// Vertex 0 and 1 are the bottom and top of the wedge's apex; each angle
    /// step then adds a (bottom, top) pair on the rim.
    pub fn create_pie_segment(segment: &PieSegment) -> Self {
        let mid = (segment.angle1 + segment.angle2) / 2.0;
        let cx = segment.explode_radius * mid.cos();
        let cz = segment.explode_radius * mid.sin();
        let (bottom, top) = (segment.base, segment.base + segment.height);

        let mut obj = Object3D::new(segment.color);
        obj.add_vertex(Point3D::new(cx, bottom, cz));
        obj.add_vertex(Point3D::new(cx, top, cz));

        let steps = segment.steps();
        let span = segment.angle2 - segment.angle1;
        for step in 0..=steps {
            let angle = segment.angle1 + span * step as f64 / steps as f64;
            let rx = cx + segment.radius * angle.cos();
            let rz = cz + segment.radius * angle.sin();
            obj.add_vertex(Point3D::new(rx, bottom, rz));
            obj.add_vertex(Point3D::new(rx, top, rz));
        }

        for step in 0..steps {
            let (b0, t0) = (2 + 2 * step, 3 + 2 * step);
            let (b1, t1) = (b0 + 2, t0 + 2);
            obj.push_face_unchecked(Face::new(vec![t0, t1, b1, b0]).outlined());
            obj.push_face_unchecked(Face::new(vec![1, t1, t0]));
            obj.push_face_unchecked(Face::new(vec![0, b0, b1]));
        }

        let last = 2 + 2 * steps;
        obj.push_face_unchecked(Face::new(vec![0, 1, 3, 2]));
        obj.push_face_unchecked(Face::new(vec![1, 0, last, last + 1]));
        obj
    }
}

/// Adds the reversed inner side of a facet, then the facet itself.
fn push_two_sided(obj: &mut Object3D, outer: Vec<usize>, inner_color: Color) {
    let inner = outer.iter().rev().copied().collect();
    obj.push_face_unchecked(Face::new(inner).with_color(Some(inner_color)));
    obj.push_face_unchecked(Face::new(outer));
}

/// Adds an axis-aligned cuboid as 8 vertices and 6 outward quads. The last
/// two faces are the bottom (y = `ys[0]`) and top (y = `ys[1]`), which take
/// the optional end colors.
fn add_cuboid(
    obj: &mut Object3D,
    xs: [f64; 2],
    ys: [f64; 2],
    zs: [f64; 2],
    bottom: Option<Color>,
    top: Option<Color>,
) {
    let first = obj.vertex_count();
    for y in ys {
        obj.add_vertex(Point3D::new(xs[0], y, zs[0]));
        obj.add_vertex(Point3D::new(xs[1], y, zs[0]));
        obj.add_vertex(Point3D::new(xs[1], y, zs[1]));
        obj.add_vertex(Point3D::new(xs[0], y, zs[1]));
    }
    let sides = [[4, 5, 1, 0], [5, 6, 2, 1], [6, 7, 3, 2], [3, 7, 4, 0]];
    for indices in sides {
        obj.push_face_unchecked(Face::new(indices.iter().map(|i| first + i).collect()));
    }
    obj.push_face_unchecked(Face::new([7, 6, 5, 4].iter().map(|i| first + i).collect()).with_color(top));
    obj.push_face_unchecked(
        Face::new([0, 1, 2, 3].iter().map(|i| first + i).collect()).with_color(bottom),
    );
}
