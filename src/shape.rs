use std::cmp::Ordering;

use crate::consts::{ FEQ_EPSILON, SPHERE_EPSILON, RECTANGLE_EPSILON };
use crate::tuple::{ Point3, Vector3 };
use crate::ray::Ray;
use crate::light::Material;
use crate::intersect::Intersection;
use crate::error::{ SceneError, SceneResult };

/// The geometry of a planar quadrilateral.
///
/// Corners are given in order around the quad. The plane normal is derived
/// from the edges leaving corner `a` and cached.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RectangleInfo {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
    pub d: Point3,
    pub normal: Vector3,
}

impl RectangleInfo {
    pub fn new(a: Point3, b: Point3, c: Point3, d: Point3)
        -> SceneResult<RectangleInfo> {
        let normal = (d - a).cross(&(b - a)).try_normalize().ok_or_else(||
            SceneError::InvalidShape("rectangle corners are collinear".into())
        )?;

        if (c - a).dot(&normal).abs() > FEQ_EPSILON {
            return Err(SceneError::InvalidShape(
                "rectangle corners are not coplanar".into()
            ));
        }

        Ok(RectangleInfo { a, b, c, d, normal })
    }
}

/// The geometry of a capped cylinder.
///
/// The cylinder runs between cap centers `cp1` and `cp2`. `axis` is the unit
/// vector pointing from `cp2` toward `cp1`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CylinderInfo {
    pub cp1: Point3,
    pub cp2: Point3,
    pub radius: f64,
    pub axis: Vector3,
}

impl CylinderInfo {
    pub fn new(cp1: Point3, cp2: Point3, radius: f64)
        -> SceneResult<CylinderInfo> {
        if !(radius > 0.0) {
            return Err(SceneError::InvalidShape(
                format!("cylinder radius must be positive, got {}", radius)
            ));
        }

        let axis = (cp1 - cp2).try_normalize().ok_or_else(||
            SceneError::InvalidShape("cylinder cap centers coincide".into())
        )?;

        Ok(CylinderInfo { cp1, cp2, radius, axis })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// A sphere with a center and a radius.
    Sphere { center: Point3, radius: f64 },

    /// A quadrilateral bounded by four coplanar corners.
    Rectangle(RectangleInfo),

    /// A cylinder closed at both ends by circular caps.
    Cylinder(CylinderInfo),
}

/// A renderable shape: geometry plus the material it is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub ty: ShapeType,
    pub material: Material,
}

impl Shape {
    /// Creates a sphere with the default material.
    pub fn sphere(center: Point3, radius: f64) -> SceneResult<Shape> {
        if !(radius > 0.0) {
            return Err(SceneError::InvalidShape(
                format!("sphere radius must be positive, got {}", radius)
            ));
        }

        Ok(Shape {
            ty: ShapeType::Sphere { center, radius },
            material: Default::default(),
        })
    }

    /// Creates a rectangle with the default material.
    pub fn rectangle(a: Point3, b: Point3, c: Point3, d: Point3)
        -> SceneResult<Shape> {
        Ok(Shape {
            ty: ShapeType::Rectangle(RectangleInfo::new(a, b, c, d)?),
            material: Default::default(),
        })
    }

    /// Creates a capped cylinder with the default material.
    pub fn cylinder(cp1: Point3, cp2: Point3, radius: f64)
        -> SceneResult<Shape> {
        Ok(Shape {
            ty: ShapeType::Cylinder(CylinderInfo::new(cp1, cp2, radius)?),
            material: Default::default(),
        })
    }

    /// Replaces the material of a shape.
    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    /// Returns a reference to this Shape's material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Intersects a ray with a Shape.
    ///
    /// Only the nearest admissible hit is reported. A miss is `None`; so are
    /// degenerate configurations such as a ray running parallel to a plane.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self.ty {
            ShapeType::Sphere { center, radius }
                => self.intersect_sphere(ray, center, radius),
            ShapeType::Rectangle(ref info) => self.intersect_rectangle(ray, info),
            ShapeType::Cylinder(ref info) => self.intersect_cylinder(ray, info),
        }
    }

    /// Checks whether a ray intersects a Sphere.
    ///
    /// Solves `At^2 + Bt + C = 0` for the ray parameter. Of the two roots, the
    /// smallest one beyond `SPHERE_EPSILON` wins, so a ray leaving the surface
    /// of the sphere does not immediately hit it again.
    fn intersect_sphere(&self, ray: &Ray, center: Point3, radius: f64)
        -> Option<Intersection> {
        let center_to_ray = ray.vertex - center;

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ray.direction.dot(&center_to_ray);
        let c = center_to_ray.dot(&center_to_ray) - radius.powi(2);

        let discriminant = b.powi(2) - (4.0 * a * c);
        if discriminant < 0.0 {
            return None;
        }

        // t0 <= t1, since a is positive.
        let t0 = (-b - discriminant.sqrt()) / (2.0 * a);
        let t1 = (-b + discriminant.sqrt()) / (2.0 * a);

        let t = if t0 > SPHERE_EPSILON {
            t0
        } else if t1 > SPHERE_EPSILON {
            t1
        } else {
            return None;
        };

        let point = ray.position(t);
        let normal = (point - center).normalize();

        Some(Intersection::new(t, point, normal, self))
    }

    /// Intersects a ray with a rectangle.
    ///
    /// The ray is first intersected with the rectangle's plane. The hit point
    /// `I` is then inside the quad when its projections onto the edges `CB`
    /// and `CD` (taken from corner `c`) fall within the lengths of those edges.
    fn intersect_rectangle(&self, ray: &Ray, info: &RectangleInfo)
        -> Option<Intersection> {
        let denominator = ray.direction.dot(&info.normal);

        // A ray parallel to the plane never meets it.
        if denominator.abs() < FEQ_EPSILON {
            return None;
        }

        let t = (info.a - ray.vertex).dot(&info.normal) / denominator;
        if t < 0.0 {
            return None;
        }

        let point = ray.position(t);
        if point.distance(&ray.vertex) < RECTANGLE_EPSILON {
            return None;
        }

        let ci = point - info.c;
        let cb = info.b - info.c;
        let cd = info.d - info.c;

        let along_cb = ci.dot(&cb);
        let along_cd = ci.dot(&cd);

        let inside = 0.0 <= along_cb && along_cb < cb.dot(&cb)
            && 0.0 <= along_cd && along_cd < cd.dot(&cd);

        if inside {
            Some(Intersection::new(t, point, info.normal, self))
        } else {
            None
        }
    }

    /// Intersects a ray with a capped cylinder.
    ///
    /// Up to four candidate hits are produced: two on the infinite side
    /// surface and one on each cap plane. Side hits must lie between the
    /// caps, and cap hits must lie within `radius` of the cap center. The
    /// nearest surviving candidate with a non-negative `t` wins.
    fn intersect_cylinder(&self, ray: &Ray, info: &CylinderInfo)
        -> Option<Intersection> {
        let axis = info.axis;
        let mut candidates: Vec<(f64, Vector3)> = Vec::with_capacity(4);

        // Project the ray onto the plane orthogonal to the axis; the side test
        // is then a circle test in that plane.
        let delta_p = ray.vertex - info.cp1;
        let dir_perp = ray.direction - axis * ray.direction.dot(&axis);
        let delta_perp = delta_p - axis * delta_p.dot(&axis);

        let a = dir_perp.dot(&dir_perp);
        let b = 2.0 * dir_perp.dot(&delta_perp);
        let c = delta_perp.dot(&delta_perp) - info.radius.powi(2);

        // If the ray runs along the axis, only the caps can be hit.
        if a >= FEQ_EPSILON {
            let disc = b.powi(2) - 4.0 * a * c;

            if disc >= 0.0 {
                let t0 = (-b - disc.sqrt()) / (2.0 * a);
                let t1 = (-b + disc.sqrt()) / (2.0 * a);

                for &t in [t0, t1].iter() {
                    if t < 0.0 {
                        continue;
                    }

                    // Reject side hits beyond either cap.
                    let p = ray.position(t);
                    if axis.dot(&(p - info.cp1)) > 0.0
                        || axis.dot(&(p - info.cp2)) < 0.0 {
                        continue;
                    }

                    let from_cp1 = p - info.cp1;
                    let radial = from_cp1 - axis * from_cp1.dot(&axis);
                    candidates.push((t, radial.normalize()));
                }
            }
        }

        // Check for intersections with the end caps.
        let dir_dot_axis = ray.direction.dot(&axis);
        if dir_dot_axis.abs() >= FEQ_EPSILON {
            let caps = [(info.cp1, axis), (info.cp2, -axis)];

            for &(center, outward) in caps.iter() {
                let t = (center - ray.vertex).dot(&axis) / dir_dot_axis;
                if t < 0.0 {
                    continue;
                }

                let offset = ray.position(t) - center;
                if offset.dot(&offset) >= info.radius.powi(2) {
                    continue;
                }

                candidates.push((t, outward));
            }
        }

        candidates.into_iter()
            .min_by(|l, r| l.0.partial_cmp(&r.0).unwrap_or(Ordering::Equal))
            .map(|(t, normal)| {
                Intersection::new(t, ray.position(t), normal, self)
            })
    }
}

#[test]
fn ray_hits_sphere_along_axis() {
    let s = Shape::sphere(Point3::new(0.0, 0.0, -10.0), 4.0).unwrap();
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

    let i = s.intersect(&r).expect("Ray should hit the sphere.");

    assert_eq!(i.t, 6.0);
    assert_eq!(i.point, Point3::new(0.0, 0.0, -6.0));
    assert_eq!(i.normal, Vector3::new(0.0, 0.0, 1.0));
    assert!(std::ptr::eq(i.what, &s));
}

#[test]
fn hit_distance_is_distance_to_center_minus_radius() {
    let center = Point3::new(3.0, 0.0, 0.0);
    let s = Shape::sphere(center, 0.5).unwrap();
    let vertex = Point3::new(-7.0, 0.0, 0.0);
    let r = Ray::new(vertex, Vector3::new(1.0, 0.0, 0.0));

    let i = s.intersect(&r).unwrap();

    assert_eq!(i.distance_from(&vertex), vertex.distance(&center) - 0.5);
}

#[test]
fn ray_misses_sphere() {
    let s = Shape::sphere(Point3::origin(), 1.0).unwrap();
    let r = Ray::new(
        Point3::new(0.0, 2.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert!(s.intersect(&r).is_none());
}

#[test]
fn sphere_is_behind_ray() {
    let s = Shape::sphere(Point3::origin(), 1.0).unwrap();
    let r = Ray::new(
        Point3::new(0.0, 0.0, 5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert!(s.intersect(&r).is_none());
}

#[test]
fn ray_is_inside_sphere() {
    let s = Shape::sphere(Point3::origin(), 1.0).unwrap();
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));

    let i = s.intersect(&r).unwrap();

    assert_eq!(i.t, 1.0);
    assert_eq!(i.normal, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_leaving_sphere_surface_skips_its_own_vertex() {
    let s = Shape::sphere(Point3::origin(), 1.0).unwrap();
    let r = Ray::new(
        Point3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, -1.0)
    );

    let i = s.intersect(&r).unwrap();

    assert_eq!(i.t, 2.0);
    assert_eq!(i.point, Point3::new(0.0, 0.0, -1.0));
}

#[test]
fn sphere_needs_positive_radius() {
    assert!(Shape::sphere(Point3::origin(), 0.0).is_err());
    assert!(Shape::sphere(Point3::origin(), -1.0).is_err());
    assert!(Shape::sphere(Point3::origin(), f64::NAN).is_err());
}

#[cfg(test)]
fn unit_square() -> Shape {
    Shape::rectangle(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ).unwrap()
}

#[test]
fn rectangle_normal_from_corner_a() {
    let square = unit_square();

    match square.ty {
        ShapeType::Rectangle(info)
            => assert_eq!(info.normal, Vector3::new(0.0, 0.0, -1.0)),
        _ => unreachable!(),
    }
}

#[test]
fn ray_strikes_rectangle_center() {
    let square = unit_square();
    let r = Ray::new(
        Point3::new(0.5, 0.5, 5.0),
        Vector3::new(0.0, 0.0, -1.0)
    );

    let i = square.intersect(&r).expect("Center of the square should be hit.");

    assert_eq!(i.t, 5.0);
    assert_eq!(i.point, Point3::new(0.5, 0.5, 0.0));
}

#[test]
fn ray_outside_rectangle_edges_is_rejected() {
    let square = unit_square();

    // Projected coordinates equal to the edge length fall outside.
    for &(x, y) in [(0.0, 0.5), (0.5, 0.0), (1.5, 0.5), (0.5, -0.25)].iter() {
        let r = Ray::new(
            Point3::new(x, y, 5.0),
            Vector3::new(0.0, 0.0, -1.0)
        );

        assert!(square.intersect(&r).is_none(), "({}, {}) should miss", x, y);
    }
}

#[test]
fn ray_parallel_to_rectangle() {
    let square = unit_square();
    let r = Ray::new(
        Point3::new(0.5, 0.5, 1.0),
        Vector3::new(1.0, 0.0, 0.0)
    );

    assert!(square.intersect(&r).is_none());
}

#[test]
fn rectangle_behind_ray() {
    let square = unit_square();
    let r = Ray::new(
        Point3::new(0.5, 0.5, 5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert!(square.intersect(&r).is_none());
}

#[test]
fn rectangle_too_close_to_vertex() {
    let square = unit_square();
    let r = Ray::new(
        Point3::new(0.5, 0.5, 0.05),
        Vector3::new(0.0, 0.0, -1.0)
    );

    assert!(square.intersect(&r).is_none());
}

#[test]
fn degenerate_rectangles_are_rejected() {
    let collinear = Shape::rectangle(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(3.0, 0.0, 0.0),
    );
    let warped = Shape::rectangle(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 0.0),
    );

    assert!(collinear.is_err());
    assert!(warped.is_err());
}

#[cfg(test)]
fn upright_cylinder() -> Shape {
    Shape::cylinder(
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        1.0
    ).unwrap()
}

#[test]
fn ray_hits_cylinder_side() {
    let cyl = upright_cylinder();
    let r = Ray::new(
        Point3::new(0.0, 0.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    let i = cyl.intersect(&r).unwrap();

    assert_eq!(i.t, 4.0);
    assert_eq!(i.point, Point3::new(0.0, 0.0, -1.0));
    assert_eq!(i.normal, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_along_axis_hits_cylinder_cap() {
    let cyl = upright_cylinder();
    let r = Ray::new(
        Point3::new(0.0, 5.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0)
    );

    let i = cyl.intersect(&r).unwrap();

    assert_eq!(i.t, 4.0);
    assert_eq!(i.normal, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn diagonal_ray_enters_through_cap() {
    let cyl = upright_cylinder();
    let r = Ray::new(
        Point3::new(0.0, 3.0, -2.5),
        Vector3::new(0.0, -1.0, 1.0).normalize()
    );

    let i = cyl.intersect(&r).unwrap();

    assert!(crate::feq(i.t, 2.0 * 2.0f64.sqrt()));
    assert_eq!(i.point, Point3::new(0.0, 1.0, -0.5));
    assert_eq!(i.normal, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn ray_passes_beyond_cylinder_caps() {
    let cyl = upright_cylinder();
    let r = Ray::new(
        Point3::new(0.0, 1.5, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert!(cyl.intersect(&r).is_none());
}

#[test]
fn ray_misses_cylinder_to_the_side() {
    let cyl = upright_cylinder();
    let r = Ray::new(
        Point3::new(2.0, 0.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert!(cyl.intersect(&r).is_none());
}

#[test]
fn ray_from_inside_cylinder() {
    let cyl = upright_cylinder();
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));

    let i = cyl.intersect(&r).unwrap();

    assert_eq!(i.t, 1.0);
    assert_eq!(i.normal, Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn degenerate_cylinders_are_rejected() {
    let p = Point3::new(0.0, 1.0, 0.0);

    assert!(Shape::cylinder(p, p, 1.0).is_err());
    assert!(Shape::cylinder(p, Point3::origin(), 0.0).is_err());
}
