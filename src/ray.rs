use crate::tuple::{ Point3, Vector3 };

/// A directed line, starting at `vertex` and travelling along `direction`.
///
/// The direction is expected to be normalized, so that the parameter `t` of
/// `position` is also the distance travelled from the vertex.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub vertex: Point3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(vertex: Point3, direction: Vector3) -> Ray {
        Ray { vertex, direction }
    }

    pub fn position(&self, t: f64) -> Point3 {
        self.vertex + (t * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
        Point3::new(2.0, 3.0, 4.0),
        Vector3::new(1.0, 0.0, 0.0)
    );

    assert_eq!(r.position(0.0), Point3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Point3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Point3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Point3::new(4.5, 3.0, 4.0));
}
