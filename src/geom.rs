//! Polygon meshes: faces, objects and their construction-time validation.
//!
//! An [`Object3D`] owns an ordered list of vertices and an ordered list of
//! [`Face`]s. Faces refer to vertices by index, and those indices are checked
//! when the face is added, so a mesh that made it into a
//! [`World`](crate::world::World) is always well formed and the renderer never
//! has to report geometry errors.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::color::Color;
use crate::config;
use crate::errors::InvalidGeometry;
use crate::point::Point3D;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Object3D {
        let mut obj = Object3D::new(Color::BLUE);
        obj.add_vertex(Point3D::new(0.0, 0.0, 0.0));
        obj.add_vertex(Point3D::new(1.0, 0.0, 0.0));
        obj.add_vertex(Point3D::new(0.0, 1.0, 0.0));
        obj
    }

    #[test]
    fn add_vertex_returns_index() {
        let mut obj = Object3D::new(Color::RED);
        assert_eq!(obj.add_vertex(Point3D::ORIGIN), 0);
        assert_eq!(obj.add_vertex(Point3D::UNIT_X), 1);
        assert_eq!(obj.vertex_count(), 2);
    }

    #[test]
    fn add_face_validates() {
        let mut obj = triangle();
        assert_eq!(obj.add_face(&[0, 1, 2], None), Ok(0));

        assert_eq!(
            obj.add_face(&[0, 1, 3], Some(Color::RED)),
            Err(InvalidGeometry::VertexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        );
        assert_eq!(
            obj.add_face(&[0, 1], None),
            Err(InvalidGeometry::TooFewVertices { count: 2 })
        );
        // failed adds leave the face list untouched
        assert_eq!(obj.face_count(), 1);
        assert_eq!(obj.faces()[0].indices(), &[0, 1, 2]);
    }

    #[test]
    fn face_color_falls_back_to_object() {
        let mut obj = triangle();
        obj.add_face(&[0, 1, 2], None).unwrap();
        obj.add_face(&[2, 1, 0], Some(Color::GREEN)).unwrap();
        assert_eq!(obj.face_color(&obj.faces()[0]), Color::BLUE);
        assert_eq!(obj.face_color(&obj.faces()[1]), Color::GREEN);
    }

    #[test]
    fn normal_follows_winding() {
        let mut obj = triangle();
        obj.add_face(&[0, 1, 2], None).unwrap();
        obj.add_face(&[2, 1, 0], None).unwrap();
        let n0 = obj.faces()[0].normal(obj.vertices()).unwrap();
        let n1 = obj.faces()[1].normal(obj.vertices()).unwrap();
        assert_relative_eq!(n0.z, 1.0);
        assert_relative_eq!(n1.z, -1.0);
    }

    #[test]
    fn degenerate_face_has_no_normal() {
        let mut obj = Object3D::new(Color::RED);
        obj.add_vertex(Point3D::new(0.0, 0.0, 0.0));
        obj.add_vertex(Point3D::new(1.0, 0.0, 0.0));
        obj.add_vertex(Point3D::new(2.0, 0.0, 0.0));
        obj.add_face(&[0, 1, 2], None).unwrap();
        assert!(obj.faces()[0].normal(obj.vertices()).is_none());
    }

    #[test]
    fn bounds_of_empty_object() {
        assert!(Object3D::new(Color::RED).bounds().is_none());
        let bounds = triangle().bounds().unwrap();
        assert_eq!(bounds.max, Point3D::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn deserialize_rejects_bad_faces() {
        let ok = r##"{"vertices":[{"x":0,"y":0,"z":0},{"x":1,"y":0,"z":0},{"x":0,"y":1,"z":0}],
                     "faces":[{"indices":[0,1,2]}],"color":"#ff0000"}"##;
        let obj: Object3D = serde_json::from_str(ok).unwrap();
        assert_eq!(obj.face_count(), 1);
        assert_eq!(obj.color(), Color::RED);

        let bad = r##"{"vertices":[{"x":0,"y":0,"z":0}],
                      "faces":[{"indices":[0,1,2]}],"color":"#ff0000"}"##;
        let err = serde_json::from_str::<Object3D>(bad).unwrap_err();
        assert!(err.to_string().contains("vertex 1"), "{err}");
    }
}

/// A planar polygon defined by indices into its owner's vertex list.
///
/// The order of the indices determines the outward normal (right-hand rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    indices: Vec<usize>,
    /// Overrides the owning object's color when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Stroke the polygon edges with the fill color.
    #[serde(default)]
    pub outline: bool,
    /// Shade by the absolute angle to the light, so both sides look lit.
    #[serde(default)]
    pub double_sided: bool,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            color: None,
            outline: false,
            double_sided: false,
        }
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    pub fn outlined(mut self) -> Self {
        self.outline = true;
        self
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.indices.len()
    }

    /// Computes the unit normal from the cross product of two edge vectors,
    /// taking the first corner (in winding order) whose edges are not
    /// collinear. Returns `None` for zero-area faces.
    pub fn normal(&self, vertices: &[Point3D]) -> Option<Point3D> {
        self.indices
            .iter()
            .map(|&i| vertices[i])
            .circular_tuple_windows::<(_, _, _)>()
            .map(|(a, b, c)| (b - a).cross(&(c - b)))
            .find(|n| n.length() > config::NORMAL_EPSILON)
            .map(|n| n.normalize())
    }

    /// Mean of the face's vertices.
    pub fn centroid(&self, vertices: &[Point3D]) -> Point3D {
        let sum = self
            .indices
            .iter()
            .fold(Point3D::ORIGIN, |acc, &i| acc + vertices[i]);
        sum.scale(1.0 / self.indices.len() as f64)
    }

    /// Mean of the depth component of the face's eye-space vertices.
    pub fn average_depth(&self, eye_points: &[Point3D]) -> f64 {
        let total: f64 = self.indices.iter().map(|&i| eye_points[i].z).sum();
        total / self.indices.len() as f64
    }
}

/// A polygon mesh with a default color and an optional tag.
///
/// Objects without faces are point markers (one vertex) or line segments (two
/// vertices).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObjectData", into = "ObjectData")]
pub struct Object3D {
    vertices: Vec<Point3D>,
    faces: Vec<Face>,
    color: Color,
    tag: Option<String>,
}

impl Object3D {
    pub fn new(color: Color) -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            color,
            tag: None,
        }
    }

    /// Attaches a tag, copied onto every element rendered from this object.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn vertices(&self) -> &[Point3D] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Appends a vertex and returns its index.
    pub fn add_vertex(&mut self, vertex: Point3D) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    /// Adds a face over existing vertices and returns its index.
    pub fn add_face(
        &mut self,
        indices: &[usize],
        color: Option<Color>,
    ) -> Result<usize, InvalidGeometry> {
        self.push_face(Face::new(indices.to_vec()).with_color(color))
    }

    pub fn add_double_sided_face(
        &mut self,
        indices: &[usize],
        color: Option<Color>,
    ) -> Result<usize, InvalidGeometry> {
        let mut face = Face::new(indices.to_vec()).with_color(color);
        face.double_sided = true;
        self.push_face(face)
    }

    /// Validates and appends a face. On error the object is unchanged.
    pub fn push_face(&mut self, face: Face) -> Result<usize, InvalidGeometry> {
        self.validate(&face)?;
        self.faces.push(face);
        Ok(self.faces.len() - 1)
    }

    /// Appends a face whose indices the caller has already checked. Used by
    /// the primitive factories, whose topologies are fixed.
    pub(crate) fn push_face_unchecked(&mut self, face: Face) {
        debug_assert!(self.validate(&face).is_ok(), "invalid face {:?}", face);
        self.faces.push(face);
    }

    fn validate(&self, face: &Face) -> Result<(), InvalidGeometry> {
        if face.indices.len() < 3 {
            return Err(InvalidGeometry::TooFewVertices {
                count: face.indices.len(),
            });
        }
        match face.indices.iter().find(|&&i| i >= self.vertices.len()) {
            Some(&index) => Err(InvalidGeometry::VertexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            }),
            None => Ok(()),
        }
    }

    /// The color a face is drawn with before shading.
    pub fn face_color(&self, face: &Face) -> Color {
        face.color.unwrap_or(self.color)
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().copied())
    }
}

/// Plain-data form of an [`Object3D`], checked on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectData {
    vertices: Vec<Point3D>,
    #[serde(default)]
    faces: Vec<Face>,
    color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
}

impl TryFrom<ObjectData> for Object3D {
    type Error = InvalidGeometry;

    fn try_from(data: ObjectData) -> Result<Self, Self::Error> {
        let mut obj = Object3D::new(data.color);
        obj.tag = data.tag;
        obj.vertices = data.vertices;
        for face in data.faces {
            obj.push_face(face)?;
        }
        Ok(obj)
    }
}

impl From<Object3D> for ObjectData {
    fn from(obj: Object3D) -> Self {
        Self {
            vertices: obj.vertices,
            faces: obj.faces,
            color: obj.color,
            tag: obj.tag,
        }
    }
}
