use crate::tuple::{ Point3, Vector3 };
use crate::ray::Ray;
use crate::shape::Shape;

/// An intersection.
///
/// This structure assumes that some ray produced a hit. Parameter `t` is
/// analogous to `t` for a ray (the offset from the ray vertex), `point` is
/// where the hit occurred and `normal` is the outward-facing unit normal of
/// the surface at that point.
///
/// The `what` parameter borrows the intersected shape; the scene keeps
/// ownership of it.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub point: Point3,
    pub normal: Vector3,
    pub what: &'a Shape,
}

/// Implements partial equality on an Intersection.
///
/// Two intersections are equal if their offsets `t` are equal and they refer
/// to the *same* shape (pointer equality).
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && std::ptr::eq(self.what, other.what)
    }
}

impl<'a> Intersection<'a> {
    pub fn new(t: f64, point: Point3, normal: Vector3, what: &'a Shape)
        -> Intersection<'a> {
        Intersection { t, point, normal, what }
    }

    /// The distance between the hit point and `origin`.
    pub fn distance_from(&self, origin: &Point3) -> f64 {
        self.point.distance(origin)
    }

    /// Orients the surface normal against an incoming ray.
    ///
    /// Returns the normal facing back toward the ray, and whether the ray
    /// struck the surface from the inside (in which case the outward normal
    /// was flipped).
    pub fn facing_normal(&self, ray: &Ray) -> (Vector3, bool) {
        if (-ray.direction).dot(&self.normal) < 0.0 {
            (-self.normal, true)
        } else {
            (self.normal, false)
        }
    }
}

#[test]
fn normal_faces_ray_from_outside() {
    let s = Shape::sphere(Point3::origin(), 1.0).unwrap();
    let i = Intersection::new(
        4.0,
        Point3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, 1.0),
        &s
    );

    let r = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    let (normal, inside) = i.facing_normal(&r);

    assert_eq!(normal, Vector3::new(0.0, 0.0, 1.0));
    assert!(!inside);
}

#[test]
fn normal_flips_for_ray_from_inside() {
    let s = Shape::sphere(Point3::origin(), 1.0).unwrap();
    let i = Intersection::new(
        1.0,
        Point3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 0.0, -1.0),
        &s
    );

    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
    let (normal, inside) = i.facing_normal(&r);

    assert_eq!(normal, Vector3::new(0.0, 0.0, 1.0));
    assert!(inside);
}
