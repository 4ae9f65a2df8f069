use std::fmt;
use std::str::FromStr;

use log::debug;
use thiserror::Error;

use crate::consts::{
    SCENE_MAX_LUMINANCE, DISPLAY_MAX_LUMINANCE,
    LOG_AVERAGE_SIGMA, REINHARD_ALPHA, WARD_BIAS,
};
use crate::color::Color;
use crate::canvas::Canvas;

/// A tone reproduction operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToneOperator {
    /// Ward's contrast-based scale factor.
    Ward,

    /// Reinhard's photographic key mapping.
    Reinhard,
}

#[derive(Error, Debug, PartialEq)]
#[error("unknown tone operator `{0}` (expected `ward` or `reinhard`)")]
pub struct ParseToneOperatorError(String);

impl FromStr for ToneOperator {
    type Err = ParseToneOperatorError;

    fn from_str(s: &str) -> Result<ToneOperator, ParseToneOperatorError> {
        match s.to_ascii_lowercase().as_str() {
            "ward" => Ok(ToneOperator::Ward),
            "reinhard" => Ok(ToneOperator::Reinhard),
            _ => Err(ParseToneOperatorError(s.to_string())),
        }
    }
}

impl fmt::Display for ToneOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ToneOperator::Ward => write!(f, "ward"),
            ToneOperator::Reinhard => write!(f, "reinhard"),
        }
    }
}

/// Maps a high dynamic range canvas into a displayable range.
///
/// The rendered canvas is first treated as relative radiance and scaled by
/// `scene_max_luminance`. A single scale factor, derived from the log-average
/// luminance of the scaled canvas, is then applied to every pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ToneReproducer {
    pub scene_max_luminance: f64,
    pub display_max_luminance: f64,
}

impl Default for ToneReproducer {
    fn default() -> ToneReproducer {
        ToneReproducer {
            scene_max_luminance: SCENE_MAX_LUMINANCE,
            display_max_luminance: DISPLAY_MAX_LUMINANCE,
        }
    }
}

impl ToneReproducer {
    pub fn new(scene_max_luminance: f64, display_max_luminance: f64)
        -> ToneReproducer {
        ToneReproducer { scene_max_luminance, display_max_luminance }
    }

    /// Applies a tone operator to every pixel of a canvas, in place.
    ///
    /// An empty canvas is left untouched.
    pub fn apply(&self, canvas: &mut Canvas, operator: ToneOperator) {
        if canvas.pixels().is_empty() {
            return;
        }

        for pixel in canvas.pixels_mut().iter_mut() {
            *pixel *= self.scene_max_luminance;
        }

        let lavg = log_average_luminance(canvas.pixels());

        let scale = match operator {
            ToneOperator::Ward => {
                let ldmax = self.display_max_luminance;
                let sf = ((WARD_BIAS + (ldmax / 2.0).powf(0.4))
                    / (WARD_BIAS + lavg.powf(0.4))).powf(2.5);

                // Ward's factor targets display luminance; map back into [0, 1]
                sf / ldmax
            },
            ToneOperator::Reinhard => REINHARD_ALPHA / lavg,
        };

        debug!(
            "{} tone reproduction: log-average luminance {:.5}, scale {:.5}",
            operator, lavg, scale
        );

        for pixel in canvas.pixels_mut().iter_mut() {
            *pixel *= scale;
        }
    }
}

/// Computes the log-average luminance of a set of pixels.
///
/// This is `exp(mean(ln(sigma + L)))` over every pixel luminance `L`, where
/// the small `sigma` keeps black pixels from producing `ln(0)`.
pub fn log_average_luminance(pixels: &[Color]) -> f64 {
    if pixels.is_empty() {
        return LOG_AVERAGE_SIGMA;
    }

    let sum: f64 = pixels.iter()
        .map(|p| (LOG_AVERAGE_SIGMA + p.luminance()).ln())
        .sum();

    (sum / pixels.len() as f64).exp()
}

#[cfg(test)]
fn uniform_canvas(gray: f64) -> Canvas {
    let mut canvas = Canvas::new(4, 3);
    for p in canvas.pixels_mut().iter_mut() {
        *p = Color::rgb(gray, gray, gray);
    }
    canvas
}

#[test]
fn log_average_of_uniform_field() {
    let canvas = uniform_canvas(0.5);

    assert!(crate::feq(log_average_luminance(canvas.pixels()), 0.51));
}

#[test]
fn log_average_of_mixed_field() {
    let pixels = [Color::rgb(0.99, 0.99, 0.99), Color::black()];

    // exp((ln(1.0) + ln(0.01)) / 2) = sqrt(0.01)
    assert!(crate::feq(log_average_luminance(&pixels), 0.1));
}

#[test]
fn reinhard_scales_uniform_image() {
    let mut canvas = uniform_canvas(0.5);
    ToneReproducer::new(1.0, 100.0).apply(&mut canvas, ToneOperator::Reinhard);

    let expected = 0.5 * REINHARD_ALPHA / 0.51;
    assert!(canvas.pixels().iter().all(|p| *p == Color::rgb(expected, expected, expected)));
}

#[test]
fn reinhard_applies_hdr_prescale() {
    let mut canvas = uniform_canvas(0.5);
    ToneReproducer::new(100.0, 100.0).apply(&mut canvas, ToneOperator::Reinhard);

    let expected = 50.0 * REINHARD_ALPHA / 50.01;
    assert_eq!(canvas.read_pixel(0, 0), Some(Color::rgb(expected, expected, expected)));
}

#[test]
fn ward_scales_and_maps_to_display() {
    let mut canvas = uniform_canvas(0.5);
    ToneReproducer::new(1.0, 100.0).apply(&mut canvas, ToneOperator::Ward);

    let sf = ((1.219 + 50.0f64.powf(0.4)) / (1.219 + 0.51f64.powf(0.4))).powf(2.5);
    let expected = 0.5 * sf / 100.0;

    assert_eq!(canvas.read_pixel(3, 2), Some(Color::rgb(expected, expected, expected)));
}

#[test]
fn black_image_stays_black() {
    let mut canvas = uniform_canvas(0.0);
    ToneReproducer::default().apply(&mut canvas, ToneOperator::Reinhard);

    assert!(canvas.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn empty_canvas_is_untouched() {
    let mut canvas = Canvas::new(0, 0);
    ToneReproducer::default().apply(&mut canvas, ToneOperator::Ward);

    assert_eq!(canvas, Canvas::new(0, 0));
}

#[test]
fn parse_tone_operator() {
    assert_eq!("ward".parse::<ToneOperator>(), Ok(ToneOperator::Ward));
    assert_eq!("Reinhard".parse::<ToneOperator>(), Ok(ToneOperator::Reinhard));
    assert_eq!(
        "drago".parse::<ToneOperator>(),
        Err(ParseToneOperatorError("drago".to_string()))
    );
}
