//! Plain-data scene descriptions.
//!
//! A [`Scene`] lists shapes by kind and parameters, and can be read from JSON
//! or TOML. Meshes given vertex by vertex are checked as they are read, so a
//! scene that loads always builds a valid [`World`].

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config;
use crate::geom::Object3D;
use crate::point::Point3D;
use crate::primitives::{BarGeometry, PieSegment};
use crate::viewpoint::ViewAngles;
use crate::world::{Lighting, World};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_from_json() {
        let json = r##"{
            "view": {"theta": 0.5, "phi": 0.3, "rho": 12},
            "objects": [
                {"kind": "cube", "size": 2, "x": 0, "y": 0, "z": 0, "color": "#ff0000", "tag": "c"},
                {"kind": "value_bar", "x": 1, "z": 0, "x_width": 0.5, "z_width": 0.5,
                 "base": 0, "value": 3, "color": "#00ff00"},
                {"kind": "dot", "x": 1, "y": 2, "z": 3, "color": "#0000ff"},
                {"kind": "line", "from": {"x": 0, "y": 0, "z": 0},
                 "to": {"x": 1, "y": 0, "z": 0}, "color": "#808080"}
            ]
        }"##;
        let scene: Scene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.view.unwrap().rho, 12.0);
        let world = scene.into_world();
        assert_eq!(world.len(), 4);
        let first = world.objects().next().unwrap();
        assert_eq!(first.tag(), Some("c"));
        assert_eq!(first.face_count(), 6);
        assert_eq!(world.vertex_count(), 8 + 8 + 1 + 2);
    }

    #[test]
    fn shapes_from_toml() {
        let text = r##"
            [[objects]]
            kind = "sheet"
            axis = "y"
            size = 4.0
            x = 0.0
            y = 0.0
            z = 0.0
            color = "#c0c0c0"

            [[objects]]
            kind = "pie_segment"
            radius = 1.0
            base = 0.0
            height = 0.5
            angle1 = 0.0
            angle2 = 1.0
            color = "#ffc800"
        "##;
        let scene: Scene = toml::from_str(text).unwrap();
        assert!(scene.view.is_none());
        let world = scene.into_world();
        assert_eq!(world.len(), 2);
        assert_eq!(world.objects().next().unwrap().face_count(), 1);
    }

    #[test]
    fn malformed_meshes_are_rejected() {
        let json = r##"{"objects": [{"kind": "mesh", "color": "#ff0000",
            "vertices": [{"x": 0, "y": 0, "z": 0}, {"x": 1, "y": 0, "z": 0}],
            "faces": [{"indices": [0, 1, 5]}]}]}"##;
        assert!(serde_json::from_str::<Scene>(json).is_err());

        let json = r##"{"objects": [{"kind": "mesh", "color": "#ff0000",
            "vertices": [{"x": 0, "y": 0, "z": 0}, {"x": 1, "y": 0, "z": 0},
                         {"x": 0, "y": 1, "z": 0}],
            "faces": [{"indices": [0, 1, 2]}]}]}"##;
        let scene: Scene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.into_world().face_count(), 1);
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        let json = r##"{"objects": [{"kind": "teapot", "color": "#ff0000"}]}"##;
        assert!(serde_json::from_str::<Scene>(json).is_err());
    }

    #[test]
    fn demo_is_a_bar_chart() {
        let world = demo_world();
        assert!(!world.is_empty());
        let tags: Vec<_> = world.objects().filter_map(|o| o.tag()).collect();
        assert!(tags.contains(&"floor"));
        assert!(tags.iter().any(|t| t.starts_with("bar/")));
        let bounds = world.bounds().unwrap();
        assert_eq!(bounds.min.y, 0.0);
    }

    #[test]
    fn scene_files_by_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join("chart3d_scene_test.json");
        fs::write(&path, serde_json::to_string(&demo_scene()).unwrap()).unwrap();
        let scene = load_scene(&path).unwrap();
        assert_eq!(scene.objects.len(), demo_scene().objects.len());
        fs::remove_file(&path).unwrap();

        assert!(load_scene(Path::new("scene.yaml")).is_err());
    }

    #[test]
    fn views_without_distance_are_rejected() {
        let dir = std::env::temp_dir();
        let path = dir.join("chart3d_scene_zero_rho.json");
        let json = r##"{"view": {"theta": 0.5, "phi": 0.3, "rho": 0},
            "objects": [{"kind": "cube", "size": 1, "x": 0, "y": 0, "z": 0, "color": "#ff0000"}]}"##;
        fs::write(&path, json).unwrap();
        let err = load_scene(&path).unwrap_err();
        assert!(format!("{err:#}").contains("viewing distance"));
        fs::remove_file(&path).unwrap();

        let path = dir.join("chart3d_scene_rolled.toml");
        let text = r##"
            [view]
            theta = 0.5
            phi = 0.3
            rho = 9.0
            roll = 0.25
        "##;
        fs::write(&path, text).unwrap();
        let scene = load_scene(&path).unwrap();
        assert_eq!(scene.view.unwrap().roll, 0.25);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn spheres_and_lights() {
        let json = r##"{
            "light": {"type": "sun", "direction": {"x": -1, "y": 1, "z": -1}},
            "objects": [
                {"kind": "sphere", "radius": 1, "x": 0, "y": 1, "z": 0, "color": "#ff0000"},
                {"kind": "sphere", "radius": 1, "layers": 3, "x": 0, "y": 1, "z": 0,
                 "color": "#ff0000", "inner_color": "#0000ff"}
            ]
        }"##;
        let scene: Scene = serde_json::from_str(json).unwrap();
        let world = scene.into_world();
        assert!(matches!(world.light(), Lighting::Sun { .. }));

        let mut objects = world.objects();
        let default_layers = objects.next().unwrap();
        let layers = config::DEFAULT_SPHERE_LAYERS;
        assert_eq!(default_layers.face_count(), 4 * layers * layers);
        assert_eq!(
            default_layers.face_color(&default_layers.faces()[0]),
            Color::RED
        );
        let coarse = objects.next().unwrap();
        assert_eq!(coarse.face_count(), 36);
        assert_eq!(coarse.face_color(&coarse.faces()[0]), Color::BLUE);

        assert_eq!(demo_world().light(), Lighting::Headlight);
    }
}

/// Which axis a sheet is perpendicular to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetAxis {
    Y,
    Z,
}

/// A shape and its parameters, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Cube {
        size: f64,
        x: f64,
        y: f64,
        z: f64,
        color: Color,
    },
    Box {
        x: f64,
        xdim: f64,
        y: f64,
        ydim: f64,
        z: f64,
        zdim: f64,
        color: Color,
    },
    Bar {
        width: f64,
        x: f64,
        y: f64,
        z: f64,
        color: Color,
    },
    ValueBar(BarGeometry),
    Dot {
        x: f64,
        y: f64,
        z: f64,
        color: Color,
    },
    Line {
        from: Point3D,
        to: Point3D,
        color: Color,
    },
    Sheet {
        axis: SheetAxis,
        size: f64,
        x: f64,
        y: f64,
        z: f64,
        color: Color,
        #[serde(default)]
        invert: bool,
    },
    Tetrahedron {
        size: f64,
        x: f64,
        y: f64,
        z: f64,
        color: Color,
    },
    Octahedron {
        size: f64,
        x: f64,
        y: f64,
        z: f64,
        color: Color,
    },
    PieSegment(PieSegment),
    Sphere {
        radius: f64,
        #[serde(default = "default_sphere_layers")]
        layers: usize,
        x: f64,
        y: f64,
        z: f64,
        color: Color,
        /// Color of the inner side, the outer color when unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inner_color: Option<Color>,
    },
    Mesh(Object3D),
}

fn default_sphere_layers() -> usize {
    config::DEFAULT_SPHERE_LAYERS
}

impl ShapeSpec {
    pub fn build(&self) -> Object3D {
        match self {
            ShapeSpec::Cube { size, x, y, z, color } => {
                Object3D::create_cube(*size, *x, *y, *z, *color)
            }
            ShapeSpec::Box {
                x,
                xdim,
                y,
                ydim,
                z,
                zdim,
                color,
            } => Object3D::create_box(*x, *xdim, *y, *ydim, *z, *zdim, *color),
            ShapeSpec::Bar { width, x, y, z, color } => {
                Object3D::create_bar(*width, *x, *y, *z, *color)
            }
            ShapeSpec::ValueBar(geometry) => Object3D::create_value_bar(geometry),
            ShapeSpec::Dot { x, y, z, color } => Object3D::create_dot(*x, *y, *z, *color),
            ShapeSpec::Line { from, to, color } => Object3D::create_line(*from, *to, *color),
            ShapeSpec::Sheet {
                axis: SheetAxis::Y,
                size,
                x,
                y,
                z,
                color,
                invert,
            } => Object3D::create_y_sheet(*size, *x, *y, *z, *color, *invert),
            ShapeSpec::Sheet {
                axis: SheetAxis::Z,
                size,
                x,
                y,
                z,
                color,
                invert,
            } => Object3D::create_z_sheet(*size, *x, *y, *z, *color, *invert),
            ShapeSpec::Tetrahedron { size, x, y, z, color } => {
                Object3D::create_tetrahedron(*size, *x, *y, *z, *color)
            }
            ShapeSpec::Octahedron { size, x, y, z, color } => {
                Object3D::create_octahedron(*size, *x, *y, *z, *color)
            }
            ShapeSpec::PieSegment(segment) => Object3D::create_pie_segment(segment),
            ShapeSpec::Sphere {
                radius,
                layers,
                x,
                y,
                z,
                color,
                inner_color,
            } => Object3D::create_sphere(
                *radius,
                *layers,
                *x,
                *y,
                *z,
                *color,
                inner_color.unwrap_or(*color),
            ),
            ShapeSpec::Mesh(object) => object.clone(),
        }
    }
}

/// A shape with an optional tag for the records it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(flatten)]
    pub shape: ShapeSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl SceneObject {
    pub fn new(shape: ShapeSpec) -> Self {
        Self { shape, tag: None }
    }

    pub fn tagged(shape: ShapeSpec, tag: impl Into<String>) -> Self {
        Self {
            shape,
            tag: Some(tag.into()),
        }
    }

    pub fn build(&self) -> Object3D {
        let mut object = self.shape.build();
        if self.tag.is_some() {
            object.set_tag(self.tag.clone());
        }
        object
    }
}

/// A list of shapes, the light they are seen under and an optional
/// starting view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewAngles>,
    #[serde(default)]
    pub light: Lighting,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn into_world(self) -> World {
        let world: World = self.objects.iter().map(SceneObject::build).collect();
        world.with_light(self.light)
    }
}

/// Reads a scene from a `.json` or `.toml` file.
pub fn load_scene(path: &Path) -> Result<Scene> {
    let scene: Scene = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse scene {}", path.display()))?
        }
        Some("toml") => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse scene {}", path.display()))?
        }
        _ => bail!(
            "unsupported scene format for {}, expected .json or .toml",
            path.display()
        ),
    };
    if let Some(view) = &scene.view {
        view.validate()
            .with_context(|| format!("invalid view in scene {}", path.display()))?;
    }
    info!(
        "loaded scene {} with {} objects",
        path.display(),
        scene.objects.len()
    );
    Ok(scene)
}

const DEMO_SERIES: [(&str, Color, [f64; 4]); 2] = [
    ("north", Color::rgb(60, 110, 200), [3.0, 5.0, 2.0, 4.5]),
    ("south", Color::rgb(220, 90, 60), [1.5, 3.5, 4.0, 2.5]),
];

/// A small two-series bar chart: value bars on a floor, gridlines on the back
/// wall and a dot on top of every bar.
pub fn demo_scene() -> Scene {
    let mut objects = vec![SceneObject::tagged(
        ShapeSpec::Sheet {
            axis: SheetAxis::Y,
            size: 10.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            color: Color::LIGHT_GRAY,
            invert: false,
        },
        "floor",
    )];

    for level in 1..=5 {
        let y = level as f64;
        objects.push(SceneObject::tagged(
            ShapeSpec::Line {
                from: Point3D::new(-5.0, y, -5.0),
                to: Point3D::new(5.0, y, -5.0),
                color: Color::GRAY,
            },
            format!("grid/{level}"),
        ));
    }

    for (row, (series, color, values)) in DEMO_SERIES.iter().enumerate() {
        let z = 1.5 - 3.0 * row as f64;
        for (column, value) in values.iter().enumerate() {
            let x = -3.0 + 2.0 * column as f64;
            objects.push(SceneObject::tagged(
                ShapeSpec::ValueBar(BarGeometry {
                    top_color: Some(color.shade(1.2)),
                    ..BarGeometry::new(x, z, 0.0, *value, *color)
                }),
                format!("bar/{series}/{column}"),
            ));
            objects.push(SceneObject::tagged(
                ShapeSpec::Dot {
                    x,
                    y: value + 0.25,
                    z,
                    color: Color::BLACK,
                },
                format!("value/{series}/{column}"),
            ));
        }
    }

    Scene {
        view: Some(ViewAngles {
            theta: 1.1,
            phi: 0.35,
            rho: 25.0,
            roll: 0.0,
        }),
        light: Lighting::default(),
        objects,
    }
}

pub fn demo_world() -> World {
    demo_scene().into_world()
}
