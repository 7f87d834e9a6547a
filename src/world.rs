use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::dimension::Dimension3D;
use crate::geom::Object3D;
use crate::point::Point3D;
use crate::viewpoint::ViewPoint3D;


/// Where the light that shades faces comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Lighting {
    /// A light at the eye: faces turned towards the viewer are brightest.
    #[default]
    Headlight,
    /// A distant light that moves with the camera. `direction` points from the
    /// scene towards the light in eye space (x right, y up, z ahead).
    Sun { direction: Point3D },
}

impl Lighting {
    /// A sun above and to the left of the viewer.
    pub fn upper_left() -> Self {
        Lighting::Sun {
            direction: Point3D::new(-1.0, 1.0, -1.0).normalize(),
        }
    }

    /// Unit vector from the scene towards the light, in world space.
    pub fn direction(&self, viewpoint: &ViewPoint3D) -> Point3D {
        match self {
            Lighting::Headlight => viewpoint.light_direction(),
            Lighting::Sun { direction } => {
                viewpoint.eye_direction_to_world(&direction.normalize())
            }
        }
    }
}

/// An ordered collection of objects making up a scene, and the light they
/// are seen under.
///
/// Objects are rendered in insertion order when their depths tie, so a World
/// built the same way always produces the same frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    objects: Vec<Object3D>,
    #[serde(default)]
    light: Lighting,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_light(mut self, light: Lighting) -> Self {
        self.light = light;
        self
    }

    pub fn light(&self) -> Lighting {
        self.light
    }

    pub fn set_light(&mut self, light: Lighting) {
        self.light = light;
    }

    pub fn add(&mut self, object: Object3D) {
        self.objects.push(object);
    }

    pub fn add_all(&mut self, objects: impl IntoIterator<Item = Object3D>) {
        self.objects.extend(objects);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object3D> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.objects.iter().map(Object3D::vertex_count).sum()
    }

    pub fn face_count(&self) -> usize {
        self.objects.iter().map(Object3D::face_count).sum()
    }

    /// Union of the bounds of every object, or `None` if the world has no
    /// vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        self.objects
            .iter()
            .filter_map(Object3D::bounds)
            .reduce(|a, b| a.union(&b))
    }

    pub fn dimensions(&self) -> Option<Dimension3D> {
        self.bounds().map(|b| b.dimensions())
    }

    /// Transforms every vertex in the world to eye space, object by object.
    pub fn calculate_eye_coordinates(&self, viewpoint: &ViewPoint3D) -> Vec<Point3D> {
        self.objects
            .iter()
            .flat_map(|o| o.vertices().iter().map(|v| viewpoint.world_to_eye(v)))
            .collect()
    }
}

impl FromIterator<Object3D> for World {
    fn from_iter<I: IntoIterator<Item = Object3D>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
            light: Lighting::default(),
        }
    }
}
