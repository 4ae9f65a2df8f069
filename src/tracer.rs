use log::{ info, trace };

use crate::consts::{ DEFAULT_MAX_DEPTH, INITIAL_DEPTH, SECONDARY_RAY_OFFSET };
use crate::tuple::Vector3;
use crate::color::Color;
use crate::ray::Ray;
use crate::intersect::Intersection;
use crate::light;
use crate::scene::Scene;
use crate::canvas::Canvas;

/// A recursive (Whitted) ray tracer.
///
/// Each ray is shaded locally where it lands, then reflection and
/// transmission rays are spawned according to the material of the shape that
/// was hit. Rays traced at `max_depth` see the background, so with a
/// `max_depth` of 1 a reflective or transmissive surface still picks up the
/// weighted background color. Only a black background gives pure local
/// illumination at that depth.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Raytracer {
    pub max_depth: usize,
}

impl Default for Raytracer {
    fn default() -> Raytracer {
        Raytracer { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Raytracer {
    pub fn new(max_depth: usize) -> Raytracer {
        Raytracer { max_depth }
    }

    /// Computes the color seen along a ray.
    ///
    /// Rays that hit nothing, or that are traced at or beyond the maximum
    /// depth, see the scene background. The result is not clamped; reflected
    /// and transmitted light can push components above 1.
    pub fn trace(&self, scene: &Scene, ray: &Ray, depth: usize) -> Color {
        if depth >= self.max_depth {
            return scene.background;
        }

        let hit = match scene.nearest_hit(ray) {
            Some(hit) => hit,
            None => return scene.background,
        };

        let mut color = light::shade(scene, &hit);
        let m = hit.what.material();

        if m.reflective > 0.0 {
            let reflected = ray.direction.reflect(&hit.normal).normalize();
            let bounce = secondary_ray(&hit, reflected);
            color += self.trace(scene, &bounce, depth + 1) * m.reflective;
        }

        if m.transmissive > 0.0 {
            color += self.transmit(scene, ray, &hit, depth) * m.transmissive;
        }

        color
    }

    /// Traces the ray refracted through the surface at `hit`.
    ///
    /// The ratio of refraction indices depends on whether the ray is entering
    /// or leaving the shape. When the refraction discriminant is negative the
    /// ray is totally internally reflected instead.
    fn transmit(&self, scene: &Scene, ray: &Ray, hit: &Intersection,
        depth: usize) -> Color {
        let ior = hit.what.material().refractive_index;
        let (normal, inside) = hit.facing_normal(ray);

        let alpha = if inside { ior } else { 1.0 / ior };
        let cosine = (-ray.direction).dot(&normal);
        let discriminant = 1.0 + alpha.powi(2) * (cosine.powi(2) - 1.0);

        let direction = if discriminant < 0.0 {
            ray.direction.reflect(&normal)
        } else {
            (ray.direction * alpha)
                + (normal * ((alpha * cosine) - discriminant.sqrt()))
        };

        let refracted = secondary_ray(hit, direction.normalize());
        self.trace(scene, &refracted, depth + 1)
    }

    /// Renders a scene into a fresh canvas.
    ///
    /// Pixels are traced in row-major order, starting from the top row.
    pub fn trace_scene(&self, scene: &Scene) -> Canvas {
        info!(
            "Rendering {}x{} image with max depth {}",
            scene.width, scene.height, self.max_depth
        );

        let mut canvas = Canvas::new(scene.width, scene.height);

        for y in 0..scene.height {
            for x in 0..scene.width {
                let ray = scene.camera.ray_for_pixel(x, y, scene.width,
                    scene.height);
                let color = self.trace(scene, &ray, INITIAL_DEPTH);
                canvas.write_pixel(x, y, &color);
            }

            trace!("Finished scanline {}/{}", y + 1, scene.height);
        }

        info!("Render finished");
        canvas
    }
}

fn secondary_ray(hit: &Intersection, direction: Vector3) -> Ray {
    Ray::new(hit.point + direction * SECONDARY_RAY_OFFSET, direction)
}

#[cfg(test)]
use crate::{
    tuple::Point3,
    camera::Camera,
    light::{ Material, PointLight },
    shape::Shape,
};

#[cfg(test)]
fn scene_with(material: Material) -> Scene {
    let mut scene = Scene::new(20, 20, Camera::default()).unwrap();
    scene.background = Color::rgb(0.2, 0.4, 0.6);
    scene.add_shape(
        Shape::sphere(Point3::new(0.0, 0.0, -5.0), 1.0)
            .unwrap()
            .with_material(material)
    );
    scene
}

#[cfg(test)]
fn down_z() -> Ray {
    Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0))
}

#[test]
fn miss_sees_background_at_any_depth() {
    let scene = scene_with(Default::default());
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));

    for max_depth in 1..5 {
        let tracer = Raytracer::new(max_depth);
        for depth in 0..5 {
            assert_eq!(tracer.trace(&scene, &r, depth), scene.background);
        }
    }
}

#[test]
fn exhausted_depth_sees_background() {
    let scene = scene_with(Default::default());
    let tracer = Raytracer::new(2);

    assert_eq!(tracer.trace(&scene, &down_z(), 2), scene.background);
}

#[test]
fn depth_one_on_black_is_local_illumination() {
    let mirror = Material { reflective: 1.0, transmissive: 1.0, ..Default::default() };
    let mut scene = scene_with(mirror);
    scene.background = Color::black();
    scene.add_light(PointLight::new(Color::white(), Point3::new(5.0, 5.0, 0.0)));

    let tracer = Raytracer::default();
    let hit = scene.nearest_hit(&down_z()).unwrap();

    assert_eq!(tracer.trace(&scene, &down_z(), 0), light::shade(&scene, &hit));
}

#[test]
fn reflection_adds_weighted_background() {
    let mirror = Material { reflective: 0.5, ..Default::default() };
    let scene = scene_with(mirror);
    let tracer = Raytracer::new(2);

    // No lights: ambient 0.1, plus half of the background bounced back
    assert_eq!(
        tracer.trace(&scene, &down_z(), 0),
        Color::rgb(0.2, 0.3, 0.4)
    );
}

#[test]
fn unbent_transmission_passes_through() {
    let clear = Material {
        ambient: 0.0,
        transmissive: 1.0,
        refractive_index: 1.0,
        ..Default::default()
    };
    let scene = scene_with(clear);

    // Front face, back face, then out into the background. With fewer
    // levels the last spawned ray sees the background anyway.
    for max_depth in 1..4 {
        assert_eq!(
            Raytracer::new(max_depth).trace(&scene, &down_z(), 0),
            scene.background
        );
    }
}

#[test]
fn last_level_sees_weighted_background() {
    let mirror = Material { ambient: 0.0, reflective: 0.5, ..Default::default() };
    let scene = scene_with(mirror);

    // From the center every bounce lands on the unlit inner surface, until
    // the ray spawned at the last level sees the background.
    let r = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(Raytracer::new(1).trace(&scene, &r, 0), Color::rgb(0.1, 0.2, 0.3));
    assert_eq!(Raytracer::new(2).trace(&scene, &r, 0), Color::rgb(0.05, 0.1, 0.15));
    assert_eq!(
        Raytracer::new(3).trace(&scene, &r, 0),
        Color::rgb(0.025, 0.05, 0.075)
    );
}

#[cfg(test)]
fn glass_ball(ambient: f64) -> Scene {
    let glass = Material {
        ambient,
        transmissive: 1.0,
        refractive_index: 1.5,
        ..Default::default()
    };

    let mut scene = Scene::new(20, 20, Camera::default()).unwrap();
    scene.background = Color::rgb(0.2, 0.4, 0.6);
    scene.add_shape(Shape::sphere(Point3::origin(), 1.0).unwrap().with_material(glass));
    scene
}

#[test]
fn steep_ray_leaves_glass() {
    let scene = glass_ball(0.0);
    let r = Ray::new(Point3::new(0.0, 0.1, 0.0), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(Raytracer::new(2).trace(&scene, &r, 0), scene.background);
}

#[test]
fn grazing_ray_is_totally_internally_reflected() {
    let scene = glass_ball(0.5);
    let r = Ray::new(Point3::new(0.0, 0.9, 0.0), Vector3::new(0.0, 0.0, -1.0));

    // Ambient 0.5 at the first hit, then the reflected ray stays inside and
    // picks up another 0.5 on the inner surface before the background. A
    // refracted ray would escape after one hit: 0.5 plus the background.
    assert_eq!(
        Raytracer::new(2).trace(&scene, &r, 0),
        Color::rgb(1.2, 1.4, 1.6)
    );
}

#[test]
fn trace_scene_fills_canvas() {
    let scene = scene_with(Default::default());
    let tracer = Raytracer::default();

    let canvas = tracer.trace_scene(&scene);
    let center = scene.camera.ray_for_pixel(10, 10, 20, 20);

    assert_eq!(canvas.width, 20);
    assert_eq!(canvas.height, 20);
    assert_eq!(canvas.read_pixel(0, 0), Some(scene.background));
    assert_eq!(
        canvas.read_pixel(10, 10),
        Some(tracer.trace(&scene, &center, 0))
    );
}
