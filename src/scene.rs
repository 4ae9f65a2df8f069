use std::convert::{ TryFrom, TryInto };
use std::fs;
use std::mem;
use std::path::Path;

use log::{ error, info };
use serde::{ Serialize, Deserialize };

use crate::consts::{
    DEFAULT_WIDTH, DEFAULT_HEIGHT,
    DEFAULT_FOCAL_LENGTH, DEFAULT_HORIZONTAL_SPREAD, DEFAULT_CHECK_SIZE,
};
use crate::tuple::{ Point3, Vector3 };
use crate::color::Color;
use crate::ray::Ray;
use crate::intersect::Intersection;
use crate::shape::{ Shape, ShapeType };
use crate::light::{ PointLight, Material };
use crate::pattern::{ ProceduralShader, CheckedShader };
use crate::camera::Camera;
use crate::error::{ SceneError, SceneResult };

/// A renderable scene.
///
/// The scene owns every shape and light in it. Shapes and lights keep the
/// order they were added in, though that order has no effect on the image.
#[derive(Clone, Debug)]
pub struct Scene {
    /// The width of the rendered image, in pixels.
    pub width: usize,

    /// The height of the rendered image, in pixels.
    pub height: usize,

    pub camera: Camera,

    /// The color of rays that hit nothing.
    pub background: Color,

    /// The color of the ambient light lighting every surface.
    pub ambient: Color,

    shapes: Vec<Shape>,
    lights: Vec<PointLight>,
}

impl Scene {
    /// Creates an empty scene with a black background and white ambient light.
    ///
    /// Both dimensions must be positive, and small enough that a canvas of
    /// that size can be addressed.
    pub fn new(width: usize, height: usize, camera: Camera) -> SceneResult<Scene> {
        let canvas_bytes = width.checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(mem::size_of::<Color>()));

        match canvas_bytes {
            Some(bytes) if width > 0 && height > 0 && bytes <= isize::MAX as usize => {},
            _ => return Err(SceneError::InvalidDimensions { width, height }),
        }

        Ok(Scene {
            width,
            height,
            camera,
            background: Color::black(),
            ambient: Color::white(),
            shapes: Vec::new(),
            lights: Vec::new(),
        })
    }

    /// Parses a scene from a JSON scene description.
    pub fn from_json(json: &str) -> SceneResult<Scene> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        scene_json.try_into()
    }

    /// Reads and parses a JSON scene description file.
    pub fn load(path: &Path) -> SceneResult<Scene> {
        let json = fs::read_to_string(path)?;
        Scene::from_json(&json)
    }

    /// Serializes the scene into a JSON scene description.
    ///
    /// Every material field is written out, so defaults that were filled in
    /// at load time become explicit.
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(&SceneJson::from(self))?)
    }

    /// Writes the scene to a JSON scene description file.
    pub fn save(&self, path: &Path) -> SceneResult<()> {
        fs::write(path, self.to_json()?)?;

        info!("Saved scene to {}", path.display());
        Ok(())
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Finds the hit closest to the vertex of a ray.
    ///
    /// Every shape is tested. The intersection with the smallest distance from
    /// the ray vertex wins, regardless of where its shape sits in the shape
    /// list.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Intersection> {
        let mut nearest: Option<(f64, Intersection)> = None;

        for shape in self.shapes.iter() {
            let hit = match shape.intersect(ray) {
                Some(hit) => hit,
                None => continue,
            };

            let distance = hit.distance_from(&ray.vertex);
            match nearest {
                Some((closest, _)) if closest <= distance => {},
                _ => nearest = Some((distance, hit)),
            }
        }

        nearest.map(|(_, hit)| hit)
    }

    /// Every hit along a ray, skipping `exclude` (compared by identity).
    ///
    /// Hits come in shape-list order, not distance order.
    pub fn hits_except<'a>(&'a self, ray: &'a Ray, exclude: &'a Shape)
        -> impl Iterator<Item = Intersection<'a>> + 'a {
        self.shapes.iter()
            .filter(move |shape| !std::ptr::eq(*shape, exclude))
            .filter_map(move |shape| shape.intersect(ray))
    }
}

/// The top level of a JSON scene description.
#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    #[serde(default)]
    dimensions: DimensionsJson,

    camera: Option<CameraJson>,

    #[serde(default = "Color::black")]
    background_color: Color,

    #[serde(default = "Color::white")]
    ambient_light: Color,

    #[serde(default)]
    shapes: Vec<ShapeJson>,

    #[serde(default)]
    lights: Vec<LightJson>,
}

#[derive(Serialize, Deserialize)]
struct DimensionsJson {
    width: usize,
    height: usize,
}

impl Default for DimensionsJson {
    fn default() -> DimensionsJson {
        DimensionsJson { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT }
    }
}

fn default_focal_length() -> f64 {
    DEFAULT_FOCAL_LENGTH
}

fn default_horizontal_spread() -> f64 {
    DEFAULT_HORIZONTAL_SPREAD
}

#[derive(Serialize, Deserialize)]
struct CameraJson {
    location: Point3,

    #[serde(alias = "view")]
    view_vector: Vector3,

    up_vector: Vector3,

    #[serde(alias = "focal_point", default = "default_focal_length")]
    focal_length: f64,

    #[serde(default = "default_horizontal_spread")]
    horizontal_spread: f64,
}

#[derive(Serialize, Deserialize)]
struct LightJson {
    position: Point3,

    #[serde(default = "Color::white")]
    color: Color,
}

/// A shape record.
///
/// Geometry fields are optional here; which ones are required depends on
/// `type` and is checked when the shape is built.
#[derive(Serialize, Deserialize)]
struct ShapeJson {
    #[serde(rename = "type")]
    ty: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    center: Option<Point3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    a: Option<Point3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    b: Option<Point3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    c: Option<Point3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    d: Option<Point3>,

    #[serde(skip_serializing_if = "Option::is_none")]
    center_1: Option<Point3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    center_2: Option<Point3>,

    #[serde(flatten)]
    material: MaterialJson,
}

#[derive(Default, Serialize, Deserialize)]
struct MaterialJson {
    ambient_color: Option<Color>,
    diffuse_color: Option<Color>,
    specular_color: Option<Color>,

    ambient_constant: Option<f64>,
    diffuse_constant: Option<f64>,
    specular_constant: Option<f64>,
    specular_exponent: Option<f64>,

    reflective_value: Option<f64>,
    transmissive_value: Option<f64>,
    refraction_index: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    shader: Option<ShaderJson>,
}

#[derive(Serialize, Deserialize)]
struct ShaderJson {
    #[serde(rename = "type")]
    ty: String,

    a: Option<Point3>,
    b: Option<Point3>,
    d: Option<Point3>,

    check_size: Option<f64>,
    primary: Option<Color>,
    secondary: Option<Color>,
}

fn require<T>(value: Option<T>, ty: &str, field: &'static str) -> SceneResult<T> {
    value.ok_or_else(|| SceneError::MissingField { ty: ty.to_string(), field })
}

impl TryFrom<SceneJson> for Scene {
    type Error = SceneError;

    fn try_from(scene_json: SceneJson) -> SceneResult<Scene> {
        let camera = match scene_json.camera {
            Some(c) => Camera::new(
                c.location,
                c.view_vector,
                c.up_vector,
                c.focal_length,
                c.horizontal_spread
            )?,
            None => Camera::default(),
        };

        let mut scene = Scene::new(
            scene_json.dimensions.width,
            scene_json.dimensions.height,
            camera
        )?;
        scene.background = scene_json.background_color;
        scene.ambient = scene_json.ambient_light;

        // Build every shape before touching the scene, so a bad shape never
        // leaves it half-populated.
        scene.shapes = scene_json.shapes.into_iter()
            .map(Shape::try_from)
            .collect::<SceneResult<Vec<Shape>>>()?;

        scene.lights = scene_json.lights.into_iter()
            .map(|l| PointLight::new(l.color, l.position))
            .collect();

        info!(
            "Loaded {}x{} scene with {} shapes and {} lights",
            scene.width, scene.height, scene.shapes.len(), scene.lights.len()
        );

        Ok(scene)
    }
}

impl TryFrom<ShapeJson> for Shape {
    type Error = SceneError;

    fn try_from(shape_json: ShapeJson) -> SceneResult<Shape> {
        let ty = shape_json.ty.as_str();

        let shape = match ty {
            "sphere" => Shape::sphere(
                require(shape_json.center, ty, "center")?,
                require(shape_json.radius, ty, "radius")?
            )?,
            "rectangle" => Shape::rectangle(
                require(shape_json.a, ty, "a")?,
                require(shape_json.b, ty, "b")?,
                require(shape_json.c, ty, "c")?,
                require(shape_json.d, ty, "d")?
            )?,
            "cylinder" => Shape::cylinder(
                require(shape_json.center_1, ty, "center_1")?,
                require(shape_json.center_2, ty, "center_2")?,
                require(shape_json.radius, ty, "radius")?
            )?,
            _ => {
                error!("Unrecognized shape type `{}` in scene description", ty);
                return Err(SceneError::UnknownShape(shape_json.ty));
            },
        };

        Ok(shape.with_material(shape_json.material.try_into()?))
    }
}

impl TryFrom<MaterialJson> for Material {
    type Error = SceneError;

    fn try_from(m: MaterialJson) -> SceneResult<Material> {
        let defaults = Material::default();

        let material = Material {
            ambient_color: m.ambient_color.unwrap_or(defaults.ambient_color),
            diffuse_color: m.diffuse_color.unwrap_or(defaults.diffuse_color),
            specular_color: m.specular_color.unwrap_or(defaults.specular_color),
            shader: m.shader.map(ProceduralShader::try_from).transpose()?,

            ambient: m.ambient_constant.unwrap_or(defaults.ambient),
            diffuse: m.diffuse_constant.unwrap_or(defaults.diffuse),
            specular: m.specular_constant.unwrap_or(defaults.specular),
            shininess: m.specular_exponent.unwrap_or(defaults.shininess),

            reflective: m.reflective_value.unwrap_or(defaults.reflective),
            transmissive: m.transmissive_value.unwrap_or(defaults.transmissive),
            refractive_index: m.refraction_index
                .unwrap_or(defaults.refractive_index),
        };

        material.validate()?;
        Ok(material)
    }
}

impl TryFrom<ShaderJson> for ProceduralShader {
    type Error = SceneError;

    fn try_from(shader_json: ShaderJson) -> SceneResult<ProceduralShader> {
        let ty = shader_json.ty.as_str();

        match ty {
            "checked_shader" => {
                let size = shader_json.check_size.unwrap_or(DEFAULT_CHECK_SIZE);
                if !(size > 0.0) {
                    return Err(SceneError::InvalidMaterial(
                        format!("check size must be positive, got {}", size)
                    ));
                }

                let a = require(shader_json.a, ty, "a")?;
                let b = require(shader_json.b, ty, "b")?;
                let d = require(shader_json.d, ty, "d")?;

                if a.distance(&b) == 0.0 || a.distance(&d) == 0.0 {
                    return Err(SceneError::InvalidMaterial(
                        "checked shader edges must have non-zero length".into()
                    ));
                }

                Ok(ProceduralShader::Checked(CheckedShader::new(
                    a,
                    b,
                    d,
                    size,
                    shader_json.primary.unwrap_or_else(Color::red),
                    shader_json.secondary.unwrap_or_else(Color::yellow),
                )))
            },
            _ => {
                error!("Unrecognized shader type `{}` in scene description", ty);
                Err(SceneError::UnknownShader(shader_json.ty))
            },
        }
    }
}

impl From<&Scene> for SceneJson {
    fn from(scene: &Scene) -> SceneJson {
        let camera = &scene.camera;

        SceneJson {
            dimensions: DimensionsJson { width: scene.width, height: scene.height },
            camera: Some(CameraJson {
                location: camera.location,
                view_vector: camera.view(),
                up_vector: camera.up(),
                focal_length: camera.focal_length,
                horizontal_spread: camera.horizontal_spread,
            }),
            background_color: scene.background,
            ambient_light: scene.ambient,
            shapes: scene.shapes.iter().map(ShapeJson::from).collect(),
            lights: scene.lights.iter()
                .map(|l| LightJson { position: l.position, color: l.color })
                .collect(),
        }
    }
}

impl From<&Shape> for ShapeJson {
    fn from(shape: &Shape) -> ShapeJson {
        let mut record = ShapeJson {
            ty: String::new(),
            center: None,
            radius: None,
            a: None,
            b: None,
            c: None,
            d: None,
            center_1: None,
            center_2: None,
            material: MaterialJson::from(&shape.material),
        };

        match shape.ty {
            ShapeType::Sphere { center, radius } => {
                record.ty = "sphere".into();
                record.center = Some(center);
                record.radius = Some(radius);
            },
            ShapeType::Rectangle(info) => {
                record.ty = "rectangle".into();
                record.a = Some(info.a);
                record.b = Some(info.b);
                record.c = Some(info.c);
                record.d = Some(info.d);
            },
            ShapeType::Cylinder(info) => {
                record.ty = "cylinder".into();
                record.center_1 = Some(info.cp1);
                record.center_2 = Some(info.cp2);
                record.radius = Some(info.radius);
            },
        }

        record
    }
}

impl From<&Material> for MaterialJson {
    fn from(m: &Material) -> MaterialJson {
        MaterialJson {
            ambient_color: Some(m.ambient_color),
            diffuse_color: Some(m.diffuse_color),
            specular_color: Some(m.specular_color),

            ambient_constant: Some(m.ambient),
            diffuse_constant: Some(m.diffuse),
            specular_constant: Some(m.specular),
            specular_exponent: Some(m.shininess),

            reflective_value: Some(m.reflective),
            transmissive_value: Some(m.transmissive),
            refraction_index: Some(m.refractive_index),

            shader: m.shader.as_ref().map(ShaderJson::from),
        }
    }
}

impl From<&ProceduralShader> for ShaderJson {
    fn from(shader: &ProceduralShader) -> ShaderJson {
        match shader {
            ProceduralShader::Checked(checker) => ShaderJson {
                ty: "checked_shader".into(),
                a: Some(checker.a),
                b: Some(checker.b),
                d: Some(checker.d),
                check_size: Some(checker.size),
                primary: Some(checker.primary),
                secondary: Some(checker.secondary),
            },
        }
    }
}

#[cfg(test)]
fn two_spheres() -> Scene {
    let mut scene = Scene::new(10, 10, Camera::default()).unwrap();
    scene.add_shape(Shape::sphere(Point3::new(0.0, 0.0, -10.0), 2.0).unwrap());
    scene.add_shape(Shape::sphere(Point3::new(0.0, 0.0, -7.0), 2.0).unwrap());
    scene
}

#[test]
fn nearest_hit_ignores_shape_order() {
    let scene = two_spheres();
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

    let hit = scene.nearest_hit(&r).unwrap();

    assert!(std::ptr::eq(hit.what, &scene.shapes()[1]));
    assert_eq!(hit.t, 5.0);
}

#[test]
fn hits_except_skips_only_the_excluded_shape() {
    let scene = two_spheres();
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

    let hits: Vec<Intersection> = scene.hits_except(&r, &scene.shapes()[1]).collect();

    assert_eq!(hits.len(), 1);
    assert!(std::ptr::eq(hits[0].what, &scene.shapes()[0]));
    assert_eq!(hits[0].t, 8.0);
}

#[test]
fn nearest_hit_misses_everything() {
    let scene = two_spheres();
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));

    assert!(scene.nearest_hit(&r).is_none());
}

#[test]
fn zero_sized_scene_is_rejected() {
    assert!(matches!(
        Scene::new(0, 10, Camera::default()),
        Err(SceneError::InvalidDimensions { width: 0, height: 10 })
    ));
}

#[test]
fn unaddressable_scene_is_rejected() {
    assert!(matches!(
        Scene::new(usize::MAX, 2, Camera::default()),
        Err(SceneError::InvalidDimensions { .. })
    ));

    // The pixel count fits, but not the bytes to store it
    assert!(matches!(
        Scene::new(1 << 40, 1 << 20, Camera::default()),
        Err(SceneError::InvalidDimensions { .. })
    ));
}

#[test]
fn load_demo_scene() {
    let scene = Scene::from_json(include_str!("../scenes/whitted.json")).unwrap();

    assert_eq!(scene.width, 500);
    assert_eq!(scene.height, 500);
    assert_eq!(scene.shapes().len(), 3);
    assert_eq!(scene.lights().len(), 1);
    assert!(scene.shapes()[0].material().shader.is_some());
    assert!(scene.shapes()[1].material().transmissive > 0.0);
    assert!(scene.shapes()[2].material().reflective > 0.0);
}

#[test]
fn missing_fields_take_defaults() {
    let json = r#"{
        "shapes": [
            { "type": "sphere", "center": { "x": 0, "y": 0, "z": -5 }, "radius": 1 }
        ]
    }"#;

    let scene = Scene::from_json(json).unwrap();

    assert_eq!(scene.width, DEFAULT_WIDTH);
    assert_eq!(scene.height, DEFAULT_HEIGHT);
    assert_eq!(scene.background, Color::black());
    assert_eq!(scene.ambient, Color::white());
    assert_eq!(scene.camera, Camera::default());
    assert_eq!(*scene.shapes()[0].material(), Material::default());
}

#[test]
fn camera_field_aliases() {
    let json = r#"{
        "camera": {
            "location": { "x": 0, "y": 0, "z": 0 },
            "view": { "x": 0, "y": 0, "z": -1 },
            "up_vector": { "x": 0, "y": 1, "z": 0 },
            "focal_point": 2.5
        }
    }"#;

    let scene = Scene::from_json(json).unwrap();

    assert_eq!(scene.camera.focal_length, 2.5);
    assert_eq!(scene.camera.horizontal_spread, DEFAULT_HORIZONTAL_SPREAD);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let result = Scene::from_json("{ \"shapes\": [ ");

    assert!(matches!(result, Err(SceneError::Parse(_))));
}

#[test]
fn unknown_shape_type() {
    let json = r#"{ "shapes": [ { "type": "cone", "radius": 1 } ] }"#;

    match Scene::from_json(json) {
        Err(SceneError::UnknownShape(ty)) => assert_eq!(ty, "cone"),
        other => panic!("expected an unknown shape error, got {:?}", other),
    }
}

#[test]
fn unknown_shader_type() {
    let json = r#"{
        "shapes": [ {
            "type": "sphere",
            "center": { "x": 0, "y": 0, "z": -5 },
            "radius": 1,
            "shader": { "type": "marble" }
        } ]
    }"#;

    assert!(matches!(
        Scene::from_json(json),
        Err(SceneError::UnknownShader(_))
    ));
}

#[test]
fn missing_geometry_field() {
    let json = r#"{
        "shapes": [ { "type": "sphere", "center": { "x": 0, "y": 0, "z": -5 } } ]
    }"#;

    assert!(matches!(
        Scene::from_json(json),
        Err(SceneError::MissingField { field: "radius", .. })
    ));
}

#[test]
fn parallel_camera_vectors_are_rejected() {
    let json = r#"{
        "camera": {
            "location": { "x": 0, "y": 0, "z": 0 },
            "view_vector": { "x": 0, "y": 1, "z": 0 },
            "up_vector": { "x": 0, "y": 2, "z": 0 }
        }
    }"#;

    assert!(matches!(
        Scene::from_json(json),
        Err(SceneError::InvalidCamera(_))
    ));
}

#[test]
fn missing_scene_file_is_an_io_error() {
    let result = Scene::load(Path::new("scenes/does-not-exist.json"));

    assert!(matches!(result, Err(SceneError::Io(_))));
}

#[test]
fn saved_scene_loads_back_unchanged() {
    let scene = Scene::from_json(include_str!("../scenes/whitted.json")).unwrap();
    let reloaded = Scene::from_json(&scene.to_json().unwrap()).unwrap();

    assert_eq!(reloaded.width, scene.width);
    assert_eq!(reloaded.height, scene.height);
    assert_eq!(reloaded.camera, scene.camera);
    assert_eq!(reloaded.background, scene.background);
    assert_eq!(reloaded.ambient, scene.ambient);
    assert_eq!(reloaded.shapes(), scene.shapes());
    assert_eq!(reloaded.lights(), scene.lights());
}

#[test]
fn saved_cylinder_keeps_its_geometry() {
    let mut scene = Scene::new(8, 4, Camera::default()).unwrap();
    scene.add_shape(
        Shape::cylinder(Point3::new(0.0, -1.0, -4.0), Point3::new(0.0, 1.0, -4.0), 0.5)
            .unwrap()
    );

    let json = scene.to_json().unwrap();
    assert!(json.contains("\"center_1\""));
    assert!(!json.contains("\"shader\""));

    let reloaded = Scene::from_json(&json).unwrap();
    assert_eq!(reloaded.shapes(), scene.shapes());
}

#[test]
fn save_writes_a_loadable_file() {
    let scene = two_spheres();
    let path = std::env::temp_dir()
        .join(format!("whitted-tracer-save-{}.json", std::process::id()));

    scene.save(&path).unwrap();
    let reloaded = Scene::load(&path);
    fs::remove_file(&path).unwrap();

    assert_eq!(reloaded.unwrap().shapes(), scene.shapes());
}
