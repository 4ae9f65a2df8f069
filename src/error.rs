use thiserror::Error;

/// Errors that can occur while building a scene.
///
/// Every variant is raised before rendering starts; a scene that fails to
/// build is never rendered.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown shape type: {0}")]
    UnknownShape(String),

    #[error("Unknown shader type: {0}")]
    UnknownShader(String),

    #[error("Shape of type {ty} is missing field `{field}`")]
    MissingField { ty: String, field: &'static str },

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}

/// Result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;
