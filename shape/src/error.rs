use thiserror::Error;

/// Configuration errors detected while building surfaces. None of them can happen once a surface
/// has been constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    #[error("parameter `{name}` must be positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f32 },

    #[error("a convex polyhedron needs at least one bounding plane")]
    NoPlanes,

    /// The plane at the given index has a zero-length normal.
    #[error("plane #{0} has a degenerate normal")]
    DegeneratePlane(usize),

    #[error("transformed node has no child surface")]
    MissingChild,

    #[error("transformed node has no transform")]
    MissingTransform,

    #[error("transform is not a rigid-body transform (it scales, shears or mirrors)")]
    NotRigid,

    #[error("transform matrix is singular or not affine")]
    SingularTransform,

    #[error("quadric has neither quadratic nor linear terms")]
    DegenerateQuadric,
}
