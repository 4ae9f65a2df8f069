use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use crate::color::Color;

/// Longest line allowed in a plain PPM file.
const PPM_LINE_WIDTH: usize = 70;

/// A canvas for drawing pixels.
///
/// This structure stores the results of the ray tracer, one `Color` per
/// pixel, in row-major order. Colors are kept unclamped so that tone
/// reproduction can work on the full range; they are clamped only when the
/// canvas is written out.
///
/// For now, only PPM images are supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Saves a canvas to a PPM file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Components are clamped to `[0, 1]` and scaled to 255. Lines in the
    /// pixel data never exceed 70 columns; a value that would cross the mark
    /// starts a new line.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        // Write PPM header, as well as metadata
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        let mut col = 0;
        for pixel in self.pixels.iter() {
            let pixel = pixel.clamp();

            for component in [pixel.r, pixel.g, pixel.b].iter() {
                let value = ((component * 255.0).round() as u8).to_string();

                if col == 0 {
                    write!(out, "{}", value)?;
                    col = value.len();
                } else if col + 1 + value.len() > PPM_LINE_WIDTH {
                    write!(out, "\n{}", value)?;
                    col = value.len();
                } else {
                    write!(out, " {}", value)?;
                    col += 1 + value.len();
                }
            }
        }

        // Terminate the PPM file with a newline
        writeln!(out)
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `y` is the row of the pixel, and `x`
    /// is the column. Rows and columns are zero-indexed, with row 0 at the
    /// top.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use whitted_tracer::color::Color;
    /// # use whitted_tracer::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// If the specified pixel location is out-of-bounds, `None` is returned.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }
}

#[test]
fn new_canvas_is_black() {
    let canvas = Canvas::new(10, 20);

    assert_eq!(canvas.pixels().len(), 200);
    assert!(canvas.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut canvas = Canvas::new(2, 2);
    canvas.write_pixel(2, 0, &Color::white());

    assert_eq!(canvas.read_pixel(2, 0), None);
    assert!(canvas.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn pixels_are_row_major() {
    let mut canvas = Canvas::new(3, 2);
    canvas.write_pixel(1, 1, &Color::red());

    assert_eq!(canvas.pixels()[4], Color::red());
}

#[test]
fn ppm_header_and_clamped_pixels() {
    let mut canvas = Canvas::new(5, 3);
    canvas.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    canvas.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    canvas.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    canvas.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(&lines[..3], &["P3", "5 3", "255"]);

    let values: Vec<&str> = lines[3..].iter()
        .flat_map(|line| line.split_whitespace())
        .collect();

    assert_eq!(values.len(), 45);
    assert_eq!(&values[0..3], &["255", "0", "0"]);
    assert_eq!(&values[21..24], &["0", "128", "0"]);
    assert_eq!(&values[42..45], &["0", "0", "255"]);
    assert!(ppm.ends_with('\n'));
}

#[test]
fn ppm_lines_stay_within_70_columns() {
    let mut canvas = Canvas::new(10, 2);
    for p in canvas.pixels_mut().iter_mut() {
        *p = Color::rgb(1.0, 0.8, 0.6);
    }

    let mut out = Vec::new();
    canvas.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();

    let data: Vec<&str> = ppm.lines().skip(3).collect();
    assert!(data.iter().all(|line| line.len() <= 70));
    assert_eq!(data[0], "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(
        data.iter().flat_map(|line| line.split_whitespace()).count(),
        60
    );
}
