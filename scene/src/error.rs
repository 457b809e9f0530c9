use shape::{MaterialId, ShapeError};
use thiserror::Error;

/// Reasons a scene cannot be rendered. All of them are found before the first ray is traced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("invalid surface: {0}")]
    Shape(#[from] ShapeError),

    #[error("surface #{surface} uses {id}, which is not in the material table")]
    UnknownMaterial { surface: usize, id: MaterialId },

    #[error("scene has no surfaces")]
    NoSurfaces,

    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),

    #[error("no preset scene named `{0}`")]
    UnknownPreset(String),

    #[error("light `{0}` has a zero direction")]
    DegenerateLight(&'static str),
}
