use std::ops::{ Add, AddAssign, Sub, Mul, MulAssign, Div, DivAssign };

use serde::{ Serialize, Deserialize };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values. Components are *not* limited
/// to the range 0.0 to 1.0 while rendering; reflected and transmitted light
/// can push them above 1.0, and tone reproduction maps the result back into a
/// displayable range. Clamping only happens on request (see `clamp`).
///
/// # Examples
///
/// Construct the color red:
///
/// ```
/// # use whitted_tracer::color::Color;
/// let red = Color::red();
/// assert_eq!(red, Color::rgb(1.0, 0.0, 0.0));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating point
/// error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    /// The color white.
    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    /// The color red.
    pub fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    /// The color yellow.
    pub fn yellow() -> Color {
        Color::rgb(1.0, 1.0, 0.0)
    }

    /// Computes the Hadamard product of two colors.
    ///
    /// The hadamard product multiplies each component of the two colors, and
    /// yields a new color containing those products. This is how a surface
    /// color filters the color of the light falling on it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted_tracer::color::Color;
    /// let yellow = Color::rgb(1.0, 1.0, 0.0);
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let product = Color::hadamard(&yellow, &purple);
    /// assert_eq!(product, Color::red());
    /// ```
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// Clamps every component into the range 0.0 to 1.0 inclusive.
    ///
    /// ```
    /// # use whitted_tracer::color::Color;
    /// let hot = Color::rgb(1.7, -0.2, 0.5);
    /// assert_eq!(hot.clamp(), Color::rgb(1.0, 0.0, 0.5));
    /// ```
    pub fn clamp(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Estimates the absolute luminance of a color.
    ///
    /// Uses the weighting `L = 0.27R + 0.67G + 0.06B`.
    pub fn luminance(&self) -> f64 {
        0.27 * self.r + 0.67 * self.g + 0.06 * self.b
    }
}

/// Adds two colors together.
///
/// Components are added together individually.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl AddAssign<Color> for Color {
    fn add_assign(&mut self, other: Color) {
        *self = *self + other;
    }
}

/// Subtracts one color from another.
///
/// Components are subtracted from one another individually.
impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

/// Multiplies a color by a scalar.
///
/// Each component is multiplied by the scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

impl MulAssign<f64> for Color {
    fn mul_assign(&mut self, other: f64) {
        *self = *self * other;
    }
}

/// Multiplies a scalar by a color.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Multiplies a color by a color.
///
/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

impl Div<f64> for Color {
    type Output = Color;

    fn div(self, other: f64) -> Self::Output {
        Color {
            r: self.r / other,
            g: self.g / other,
            b: self.b / other,
        }
    }
}

impl DivAssign<f64> for Color {
    fn div_assign(&mut self, other: f64) {
        *self = *self / other;
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * 2.0, Color::rgb(2.0, 0.4, 0.8));
    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn compound_assignment() {
    let mut c = Color::rgb(0.5, 0.25, 1.0);
    c += Color::rgb(0.5, 0.25, 1.0);
    assert_eq!(c, Color::rgb(1.0, 0.5, 2.0));

    c *= 4.0;
    assert_eq!(c, Color::rgb(4.0, 2.0, 8.0));

    c /= 8.0;
    assert_eq!(c, Color::rgb(0.5, 0.25, 1.0));
}

#[test]
fn luminance_weights_sum_to_one() {
    assert!(feq(Color::white().luminance(), 1.0));
    assert!(feq(Color::black().luminance(), 0.0));
    assert!(feq(Color::rgb(0.0, 1.0, 0.0).luminance(), 0.67));
}
