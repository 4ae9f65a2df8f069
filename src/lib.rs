pub mod consts;
pub mod error;

pub mod tuple;
pub mod ray;
pub mod color;

pub mod intersect;
pub mod shape;
pub mod pattern;
pub mod light;

pub mod camera;
pub mod scene;
pub mod tracer;

pub mod canvas;
pub mod tone;

use consts::FEQ_EPSILON;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
