// Runtime defaults
pub const DEFAULT_WIDTH: usize = 500;
pub const DEFAULT_HEIGHT: usize = 500;
pub const OUT_FILE: &'static str = "./out.ppm";

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Minimum hit distances, used to keep secondary rays off their own surface
pub const SPHERE_EPSILON: f64 = 0.2;
pub const RECTANGLE_EPSILON: f64 = 0.1;

// Distance a reflected or transmitted ray starts past its hit point
pub const SECONDARY_RAY_OFFSET: f64 = 0.0001;

// Recursion depth
pub const DEFAULT_MAX_DEPTH: usize = 1;
pub const INITIAL_DEPTH: usize = 0;

// Camera defaults (spread is in degrees)
pub const DEFAULT_FOCAL_LENGTH: f64 = 1.0;
pub const DEFAULT_HORIZONTAL_SPREAD: f64 = 90.0;

// Checked shader
pub const DEFAULT_CHECK_SIZE: f64 = 3.0;

// Tone reproduction
pub const SCENE_MAX_LUMINANCE: f64 = 1000.0;
pub const DISPLAY_MAX_LUMINANCE: f64 = 100.0;
pub const LOG_AVERAGE_SIGMA: f64 = 0.01;
pub const REINHARD_ALPHA: f64 = 0.16;
pub const WARD_BIAS: f64 = 1.219;
