/// Scalar helpers: interval clipping for slab tests, unit-safe angles, guarded division and the
/// `assert_le!` macro.
pub mod float;

/// Homogeneous-coordinate maths module.
/// - Types: 3D points and vectors, 4D vector, 3x3 and 4x4 matrices.
/// - `Mat4::inverse()` for general 4x4 inversion, `Mat3::principal_minors_non_negative()` for
///   semidefiniteness checks on quadratic forms.
/// - Function `make_coord_system()` to build an orthogonal base from a `Vec3`.
/// - Functions `reflect()` and `refract()` to compute surface interactions.
pub mod hcm;

pub use float::Angle;
pub fn new_rad(rad: f32) -> float::Angle {
    float::Angle::new_rad(rad)
}
pub fn new_deg(deg: f32) -> float::Angle {
    float::Angle::new_deg(deg)
}
