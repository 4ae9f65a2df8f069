use std::ops::{ Add, Sub, Neg, Mul, Div };

use serde::{ Serialize, Deserialize };

use crate::feq;

/// A direction or displacement in 3D space.
#[derive(Debug, Default, Copy, Clone, PartialOrd, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Vector3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

/// A location in 3D space.
///
/// Points and vectors are kept apart so that the arithmetic stays honest:
/// subtracting two points yields a `Vector3`, while a point can only be moved
/// by adding a vector to it.
#[derive(Debug, Default, Copy, Clone, PartialOrd, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Point3 {
    fn eq(&self, other: &Point3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3 { x, y, z }
    }

    pub fn magnitude(&self) -> f64 {
        f64::sqrt(
            self.x.powi(2)
            + self.y.powi(2)
            + self.z.powi(2)
        )
    }

    /// Scales a vector to unit length.
    ///
    /// The vector must be non-zero. Scene data is validated on load so that
    /// no degenerate vector reaches the renderer; use `try_normalize` where
    /// the input is not trusted.
    pub fn normalize(&self) -> Vector3 {
        let mag = self.magnitude();
        debug_assert!(mag > 0.0, "Cannot normalize a zero-length vector.");

        *self * (1.0 / mag)
    }

    /// Scales a vector to unit length, or returns `None` for a zero vector.
    pub fn try_normalize(&self) -> Option<Vector3> {
        let mag = self.magnitude();
        if mag > 0.0 && mag.is_finite() {
            Some(*self * (1.0 / mag))
        } else {
            None
        }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Reflects a vector across a normal.
    pub fn reflect(&self, normal: &Vector3) -> Vector3 {
        *self - (*normal * 2.0 * self.dot(normal))
    }
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Point3 {
        Point3 { x, y, z }
    }

    pub fn origin() -> Point3 {
        Point3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: &Point3) -> f64 {
        (*self - *other).magnitude()
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Implements scalar right-multiplication for a vector.
///
/// ```
/// use whitted_tracer::tuple::Vector3;
///
/// let v = Vector3::new(1.0, 2.0, 3.0);
/// assert_eq!(v * 2.0, Vector3::new(2.0, 4.0, 6.0));
/// ```
impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// Implements scalar left-multiplication for a vector.
impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        other * self
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;

    fn div(self, other: f64) -> Self {
        Self {
            x: self.x / other,
            y: self.y / other,
            z: self.z / other,
        }
    }
}

/// The displacement from `other` to `self`.
impl Sub for Point3 {
    type Output = Vector3;

    fn sub(self, other: Point3) -> Vector3 {
        Vector3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Add<Vector3> for Point3 {
    type Output = Point3;

    fn add(self, other: Vector3) -> Point3 {
        Point3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub<Vector3> for Point3 {
    type Output = Point3;

    fn sub(self, other: Vector3) -> Point3 {
        Point3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

/* Tests */

#[test]
fn sub_points() {
    let p1 = Point3::new(3.0, 2.0, 1.0);
    let p2 = Point3::new(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Vector3::new(-2.0, -4.0, -6.0));
}

#[test]
fn move_point_by_vector() {
    let p = Point3::new(3.0, 2.0, 1.0);
    let v = Vector3::new(5.0, 6.0, 7.0);

    assert_eq!(p + v, Point3::new(8.0, 8.0, 8.0));
    assert_eq!(p - v, Point3::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector3::new(-1.0, 2.0, -3.0));
}

#[test]
fn magnitude_neg() {
    let v = Vector3::new(-1.0, -2.0, -3.0);

    assert_eq!(v.magnitude(), f64::sqrt(14.0));
}

#[test]
fn normalize_dirty() {
    let v = Vector3::new(1.0, 2.0, 3.0);
    let e = Vector3::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    assert_eq!(v.normalize(), e);
}

#[test]
fn normalized_vectors_have_unit_length() {
    let vectors = [
        Vector3::new(4.0, 0.0, 0.0),
        Vector3::new(-3.0, 7.5, 0.25),
        Vector3::new(1e-3, -2e-3, 5e-4),
        Vector3::new(1e6, 1e6, -1e6),
    ];

    for v in vectors.iter() {
        assert!((v.normalize().magnitude() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn zero_vector_has_no_direction() {
    assert_eq!(Vector3::default().try_normalize(), None);
    assert_eq!(Vector3::new(0.0, 2.0, 0.0).try_normalize(),
        Some(Vector3::new(0.0, 1.0, 0.0)));
}

#[test]
fn dot_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vector3::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vector3::new(1.0, -2.0, 1.0));
}

#[test]
fn reflect_45() {
    let v = Vector3::new(1.0, -1.0, 0.0);
    let n = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3::new(1.0, 1.0, 0.0));
}

#[test]
fn distance_between_points() {
    let p1 = Point3::new(0.0, 0.0, 0.0);
    let p2 = Point3::new(0.0, 3.0, -4.0);

    assert_eq!(p1.distance(&p2), 5.0);
}
