use crate::color::Color;
use crate::pattern::ProceduralShader;
use crate::tuple::{ Point3, Vector3 };
use crate::ray::Ray;
use crate::intersect::Intersection;
use crate::scene::Scene;
use crate::error::{ SceneError, SceneResult };

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub position: Point3,
}

impl PointLight {
    /// Creates a point light.
    pub fn new(color: Color, position: Point3) -> PointLight {
        PointLight { color, position }
    }
}

/// A material record.
///
/// Materials use attributes from the Phong reflection model (ambient, diffuse,
/// specular and shininess), each with its own color, plus the coefficients
/// that drive recursive reflection and transmission. Coefficients are weights
/// and are not required to sum to 1.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub ambient_color: Color,
    pub diffuse_color: Color,
    pub specular_color: Color,
    pub shader: Option<ProceduralShader>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub transmissive: f64,
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            ambient_color: Color::white(),
            diffuse_color: Color::white(),
            specular_color: Color::white(),
            shader: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            transmissive: 0.0,
            refractive_index: 1.0,
        }
    }
}

impl Material {
    /// Checks the constraints a material must satisfy before rendering.
    pub fn validate(&self) -> SceneResult<()> {
        if self.shininess < 0.0 {
            return Err(SceneError::InvalidMaterial(
                format!("specular exponent must be >= 0, got {}", self.shininess)
            ));
        }

        if self.transmissive > 0.0 && !(self.refractive_index > 0.0) {
            return Err(SceneError::InvalidMaterial(format!(
                "transmissive material needs a positive refraction index, got {}",
                self.refractive_index
            )));
        }

        Ok(())
    }

    /// The ambient color at a point, overridden by the shader if present.
    pub fn ambient_color_at(&self, p: &Point3) -> Color {
        match self.shader {
            Some(ref shader) => shader.shade(p),
            None => self.ambient_color,
        }
    }

    /// The diffuse color at a point, overridden by the shader if present.
    pub fn diffuse_color_at(&self, p: &Point3) -> Color {
        match self.shader {
            Some(ref shader) => shader.shade(p),
            None => self.diffuse_color,
        }
    }
}

/// Computes how much of a light reaches a hit point.
///
/// A shadow ray is cast from the hit point toward the light and tested
/// against every other shape in the scene. Occluders further away than the
/// light are ignored. An opaque occluder blocks the light entirely (`None`);
/// a transmissive occluder multiplies the attenuation by its transmissive
/// coefficient. With no occluders the attenuation is exactly 1.
pub fn shadow_attenuation(scene: &Scene, hit: &Intersection, light: &PointLight)
    -> Option<f64> {
    let to_light = light.position - hit.point;
    let light_distance = to_light.magnitude();
    let shadow = Ray::new(hit.point, to_light.try_normalize()?);

    let mut attenuation = 1.0;

    for occluder in scene.hits_except(&shadow, hit.what) {
        if occluder.distance_from(&hit.point) >= light_distance {
            continue;
        }

        let kt = occluder.what.material().transmissive;
        if kt > 0.0 {
            attenuation *= kt;
        } else {
            return None;
        }
    }

    Some(attenuation)
}

/// Calculates the local (Phong) illumination at a hit point.
///
/// Ambient light is the surface's ambient color filtered by the scene's
/// ambient light. Every light then contributes diffuse and specular terms,
/// scaled by its shadow attenuation. Each term is weighted by the matching
/// material coefficient, and the sum is clamped to `[0, 1]`.
pub fn shade(scene: &Scene, hit: &Intersection) -> Color {
    let m = hit.what.material();
    let normal = hit.normal;

    let ambient = m.ambient_color_at(&hit.point) * scene.ambient;
    let mut diffuse = Color::black();
    let mut specular = Color::black();

    // Direction from the eye to the hit point
    let view = (hit.point - scene.camera.location)
        .try_normalize()
        .unwrap_or_default();

    for light in scene.lights() {
        let attenuation = match shadow_attenuation(scene, hit, light) {
            Some(a) => a,
            None => continue,
        };

        let to_light = match (light.position - hit.point).try_normalize() {
            Some(s) => s,
            None => continue,
        };

        // For the side of the surface facing away from the light, skip it
        let light_dot_normal = to_light.dot(&normal);
        if light_dot_normal < 0.0 {
            continue;
        }

        diffuse += m.diffuse_color_at(&hit.point) * light.color
            * light_dot_normal * attenuation;

        let reflectv: Vector3 = to_light - (normal * (2.0 * light_dot_normal));
        let reflect_dot_view = reflectv.dot(&view);

        if reflect_dot_view > 0.0 {
            let factor = reflect_dot_view.powf(m.shininess);
            specular += m.specular_color * light.color * factor * attenuation;
        }
    }

    (ambient * m.ambient + diffuse * m.diffuse + specular * m.specular).clamp()
}

#[cfg(test)]
use crate::{ camera::Camera, shape::Shape };

#[cfg(test)]
fn scene_with_light(light: Point3) -> Scene {
    let mut scene = Scene::new(100, 100, Camera::default()).unwrap();
    scene.add_light(PointLight::new(Color::white(), light));
    scene.add_shape(Shape::sphere(Point3::new(0.0, 0.0, -5.0), 1.0).unwrap());
    scene
}

#[cfg(test)]
fn front_of_sphere(scene: &Scene) -> Intersection {
    Intersection::new(
        4.0,
        Point3::new(0.0, 0.0, -4.0),
        Vector3::new(0.0, 0.0, 1.0),
        &scene.shapes()[0]
    )
}

#[cfg(test)]
fn filter(transmissive: f64, z: f64) -> Shape {
    let material = Material { transmissive, ..Default::default() };

    Shape::rectangle(
        Point3::new(-1.0, -1.0, z),
        Point3::new( 1.0, -1.0, z),
        Point3::new( 1.0,  1.0, z),
        Point3::new(-1.0,  1.0, z),
    ).unwrap().with_material(material)
}

#[test]
fn unoccluded_light_is_not_attenuated() {
    let scene = scene_with_light(Point3::new(0.0, 0.0, 5.0));
    let hit = front_of_sphere(&scene);

    assert_eq!(shadow_attenuation(&scene, &hit, &scene.lights()[0]), Some(1.0));
}

#[test]
fn opaque_occluder_blocks_light() {
    let mut scene = scene_with_light(Point3::new(0.0, 0.0, 5.0));
    scene.add_shape(filter(0.0, -2.0));
    let hit = front_of_sphere(&scene);

    assert_eq!(shadow_attenuation(&scene, &hit, &scene.lights()[0]), None);
}

#[test]
fn occluder_behind_light_is_ignored() {
    let mut scene = scene_with_light(Point3::new(0.0, 0.0, 5.0));
    scene.add_shape(filter(0.0, 8.0));
    let hit = front_of_sphere(&scene);

    assert_eq!(shadow_attenuation(&scene, &hit, &scene.lights()[0]), Some(1.0));
}

#[test]
fn transmissive_occluders_multiply() {
    let mut scene = scene_with_light(Point3::new(0.0, 0.0, 5.0));
    scene.add_shape(filter(0.5, -2.0));
    scene.add_shape(filter(0.4, 1.0));
    let hit = front_of_sphere(&scene);

    let attenuation = shadow_attenuation(&scene, &hit, &scene.lights()[0]);
    assert!(crate::feq(attenuation.unwrap(), 0.2));
}

#[test]
fn lit_head_on_is_clamped() {
    // ambient 0.1 + diffuse 0.9 + specular 0.9 saturates to white
    let scene = scene_with_light(Point3::origin());
    let hit = front_of_sphere(&scene);

    assert_eq!(shade(&scene, &hit), Color::white());
}

#[test]
fn light_behind_surface_leaves_ambient() {
    let scene = scene_with_light(Point3::new(0.0, 0.0, -10.0));
    let hit = front_of_sphere(&scene);

    assert_eq!(shade(&scene, &hit), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn ambient_is_filtered_by_scene_ambient() {
    let mut scene = scene_with_light(Point3::new(0.0, 0.0, -10.0));
    scene.ambient = Color::rgb(1.0, 0.5, 0.0);
    let hit = front_of_sphere(&scene);

    assert_eq!(shade(&scene, &hit), Color::rgb(0.1, 0.05, 0.0));
}

#[test]
fn transmissive_occluder_dims_diffuse() {
    let matte = Material {
        ambient: 0.0,
        diffuse: 1.0,
        specular: 0.0,
        ..Default::default()
    };

    let mut scene = Scene::new(100, 100, Camera::default()).unwrap();
    scene.add_light(PointLight::new(Color::white(), Point3::new(0.0, 0.0, 5.0)));
    scene.add_shape(
        Shape::sphere(Point3::new(0.0, 0.0, -5.0), 1.0).unwrap().with_material(matte)
    );
    scene.add_shape(filter(0.5, -2.0));
    let hit = front_of_sphere(&scene);

    assert_eq!(shade(&scene, &hit), Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn shader_replaces_ambient_and_diffuse_color() {
    use crate::pattern::CheckedShader;

    let checker = CheckedShader::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        3.0,
        Color::red(),
        Color::yellow(),
    );

    let m = Material {
        ambient_color: Color::black(),
        diffuse_color: Color::black(),
        shader: Some(ProceduralShader::Checked(checker)),
        ..Default::default()
    };

    let p = Point3::new(1.0, 1.0, 0.0);
    assert_eq!(m.ambient_color_at(&p), Color::red());
    assert_eq!(m.diffuse_color_at(&p), Color::red());
    assert_eq!(m.ambient_color_at(&Point3::new(4.0, 1.0, 0.0)), Color::yellow());
}

#[test]
fn transmissive_material_needs_refraction_index() {
    let glass = Material { transmissive: 0.8, refractive_index: 0.0, ..Default::default() };
    let opaque = Material { refractive_index: 0.0, ..Default::default() };

    assert!(glass.validate().is_err());
    assert!(opaque.validate().is_ok());
}
