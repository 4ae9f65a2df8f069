use crate::consts::{ DEFAULT_FOCAL_LENGTH, DEFAULT_HORIZONTAL_SPREAD };
use crate::tuple::{ Point3, Vector3 };
use crate::ray::Ray;
use crate::error::{ SceneError, SceneResult };

/// A pinhole camera.
///
/// The camera sits at `location`, looking along `view`, with `up` giving the
/// rough vertical direction. An image plane is placed `focal_length` units in
/// front of the camera; its width is chosen so that it spans
/// `horizontal_spread` degrees.
///
/// `u`, `v` and `w` form the orthonormal camera basis: `u` points right, `v`
/// points up and `w` points backwards (away from the view direction). The
/// basis is derived from `view` and `up`, so those two are only set through
/// `Camera::new`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub location: Point3,
    pub focal_length: f64,

    /// The horizontal field of view, in degrees.
    pub horizontal_spread: f64,

    view: Vector3,
    up: Vector3,

    u: Vector3,
    v: Vector3,
    w: Vector3,
}

impl Camera {
    pub fn new(location: Point3, view: Vector3, up: Vector3,
        focal_length: f64, horizontal_spread: f64) -> SceneResult<Camera> {
        if !(focal_length > 0.0) {
            return Err(SceneError::InvalidCamera(
                format!("focal length must be positive, got {}", focal_length)
            ));
        }

        if !(horizontal_spread > 0.0 && horizontal_spread < 180.0) {
            return Err(SceneError::InvalidCamera(format!(
                "horizontal spread must be between 0 and 180 degrees, got {}",
                horizontal_spread
            )));
        }

        let w = -view.try_normalize().ok_or_else(||
            SceneError::InvalidCamera("view vector is zero".into())
        )?;

        let u = up.cross(&w).try_normalize().ok_or_else(||
            SceneError::InvalidCamera(
                "up vector is zero or parallel to the view vector".into()
            )
        )?;

        let v = w.cross(&u);

        Ok(Camera {
            location,
            focal_length,
            horizontal_spread,
            view,
            up,
            u,
            v,
            w,
        })
    }

    /// The view direction, as given to `Camera::new`.
    pub fn view(&self) -> Vector3 {
        self.view
    }

    /// The up direction, as given to `Camera::new`.
    pub fn up(&self) -> Vector3 {
        self.up
    }

    /// Computes the primary ray through the center of pixel `(px, py)`.
    ///
    /// The image is `hsize` pixels wide and `vsize` pixels tall. Row 0 is the
    /// top of the image.
    pub fn ray_for_pixel(&self, px: usize, py: usize, hsize: usize,
        vsize: usize) -> Ray {
        let half_width = self.focal_length
            * (self.horizontal_spread.to_radians() / 2.0).tan();
        let half_height = half_width * (vsize as f64) / (hsize as f64);
        let pixel_size = half_width * 2.0 / (hsize as f64);

        // Offsets from the edge of the canvas to the pixel's center
        let x = (px as f64 + 0.5) * pixel_size - half_width;
        let y = half_height - (py as f64 + 0.5) * pixel_size;

        let direction = (self.u * x) + (self.v * y) - (self.w * self.focal_length);

        Ray::new(self.location, direction.normalize())
    }
}

impl Default for Camera {
    /// A camera at the origin looking down the negative Z axis.
    fn default() -> Camera {
        Camera {
            location: Point3::origin(),
            focal_length: DEFAULT_FOCAL_LENGTH,
            horizontal_spread: DEFAULT_HORIZONTAL_SPREAD,
            view: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            u: Vector3::new(1.0, 0.0, 0.0),
            v: Vector3::new(0.0, 1.0, 0.0),
            w: Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

#[test]
fn default_camera_matches_constructed_camera() {
    let c = Camera::new(
        Point3::origin(),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 1.0, 0.0),
        1.0,
        90.0
    ).unwrap();

    assert_eq!(c, Camera::default());
}

#[test]
fn ray_through_center() {
    let c = Camera::default();
    let r = c.ray_for_pixel(100, 50, 201, 101);

    assert_eq!(r.vertex, Point3::origin());
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_top_left_corner() {
    let c = Camera::default();
    let r = c.ray_for_pixel(0, 0, 201, 101);

    assert_eq!(r.direction, Vector3::new(-0.66519, 0.33259, -0.66851));
}

#[test]
fn focal_length_does_not_change_field_of_view() {
    let near = Camera::default();
    let far = Camera { focal_length: 5.0, ..Camera::default() };

    assert_eq!(
        near.ray_for_pixel(0, 0, 201, 101).direction,
        far.ray_for_pixel(0, 0, 201, 101).direction
    );
}

#[test]
fn ray_from_moved_camera() {
    let location = Point3::new(1.0, 2.0, 3.0);
    let c = Camera::new(
        location,
        Vector3::new(2.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        1.0,
        60.0
    ).unwrap();

    let r = c.ray_for_pixel(50, 50, 101, 101);

    assert_eq!(r.vertex, location);
    assert_eq!(r.direction, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn camera_keeps_its_unnormalized_directions() {
    let view = Vector3::new(2.0, 0.0, 0.0);
    let up = Vector3::new(0.0, 3.0, 0.5);
    let c = Camera::new(Point3::origin(), view, up, 1.0, 60.0).unwrap();

    assert_eq!(c.view(), view);
    assert_eq!(c.up(), up);

    // The basis still follows the normalized inputs
    assert_eq!(c.ray_for_pixel(50, 50, 101, 101).direction, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn invalid_cameras_are_rejected() {
    let view = Vector3::new(0.0, 0.0, -1.0);
    let up = Vector3::new(0.0, 1.0, 0.0);
    let o = Point3::origin();

    assert!(Camera::new(o, Vector3::default(), up, 1.0, 90.0).is_err());
    assert!(Camera::new(o, view, view * 2.0, 1.0, 90.0).is_err());
    assert!(Camera::new(o, view, up, 0.0, 90.0).is_err());
    assert!(Camera::new(o, view, up, 1.0, 180.0).is_err());
}
