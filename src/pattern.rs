use crate::tuple::Point3;
use crate::color::Color;

/// A procedural shader, computing a surface color from a hit point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProceduralShader {
    Checked(CheckedShader),
}

impl ProceduralShader {
    pub fn shade(&self, p: &Point3) -> Color {
        match self {
            ProceduralShader::Checked(checked) => checked.shade(p),
        }
    }
}

/// A checkerboard laid out over a planar quad.
///
/// Squares are `size` units wide and run along the edges `a -> d` and
/// `a -> b`. For a point `p`, `(u, v)` are the coordinates of `p - a` along
/// those edges; if `trunc(u / size)` and `trunc(v / size)` have the same
/// parity, the `primary` color is used, otherwise the `secondary` color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CheckedShader {
    pub a: Point3,
    pub b: Point3,
    pub d: Point3,
    pub size: f64,
    pub primary: Color,
    pub secondary: Color,
}

impl CheckedShader {
    pub fn new(a: Point3, b: Point3, d: Point3, size: f64,
        primary: Color, secondary: Color) -> CheckedShader {
        CheckedShader { a, b, d, size, primary, secondary }
    }

    pub fn shade(&self, p: &Point3) -> Color {
        let ap = *p - self.a;
        let ad = (self.d - self.a).normalize();
        let ab = (self.b - self.a).normalize();

        // Truncation toward zero; parity is taken on the two's complement bit.
        let u = (ap.dot(&ad) / self.size) as i64;
        let v = (ap.dot(&ab) / self.size) as i64;

        if (u & 1) == (v & 1) {
            self.primary
        } else {
            self.secondary
        }
    }
}

#[cfg(test)]
fn floor_checker() -> CheckedShader {
    CheckedShader::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, -30.0),
        Point3::new(30.0, 0.0, 0.0),
        3.0,
        Color::red(),
        Color::yellow(),
    )
}

#[test]
fn checker_corner_square_is_primary() {
    let shader = floor_checker();

    assert_eq!(shader.shade(&Point3::new(0.5, 0.0, -0.5)), Color::red());
    assert_eq!(shader.shade(&Point3::new(2.9, 0.0, -2.9)), Color::red());
}

#[test]
fn checker_alternates_along_each_edge() {
    let shader = floor_checker();

    assert_eq!(shader.shade(&Point3::new(3.5, 0.0, -0.5)), Color::yellow());
    assert_eq!(shader.shade(&Point3::new(0.5, 0.0, -3.5)), Color::yellow());
    assert_eq!(shader.shade(&Point3::new(3.5, 0.0, -3.5)), Color::red());
    assert_eq!(shader.shade(&Point3::new(6.5, 0.0, -0.5)), Color::red());
}

#[test]
fn checker_is_constant_off_the_plane() {
    let shader = floor_checker();

    assert_eq!(shader.shade(&Point3::new(3.5, 5.0, -0.5)), Color::yellow());
    assert_eq!(shader.shade(&Point3::new(3.5, -5.0, -0.5)), Color::yellow());
}

#[test]
fn checker_truncates_toward_zero() {
    let shader = floor_checker();

    // Both (-2.0, 1.0) and (2.0, 1.0) truncate to the first column.
    assert_eq!(shader.shade(&Point3::new(-2.0, 0.0, -1.0)), Color::red());

    // (-4.0, 1.0) lands in column -1, which is odd.
    assert_eq!(shader.shade(&Point3::new(-4.0, 0.0, -1.0)), Color::yellow());
}

#[test]
fn procedural_shader_dispatches_to_checker() {
    let shader = ProceduralShader::Checked(floor_checker());

    assert_eq!(shader.shade(&Point3::new(3.5, 0.0, -0.5)), Color::yellow());
}
