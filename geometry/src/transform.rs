use math::hcm::{Mat3, Mat4, Point3, Vec3};
use math::Angle;
use std::ops::Mul;

/// Rotation followed by translation. Normals transform exactly like directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyTransform {
    rotation: Mat3,
    translation: Vec3,
}

/// General affine transform that keeps its inverse alongside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    forward: Mat4,
    inverse: Mat4,
}

pub trait Transform<T> {
    fn apply(&self, x: T) -> T;
}

impl RigidBodyTransform {
    fn build(rotation: Mat3, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }
    pub fn identity() -> Self {
        Self::build(Mat3::IDENTITY, Vec3::ZERO)
    }
    pub fn translater(t: Vec3) -> Self {
        Self::build(Mat3::IDENTITY, t)
    }
    pub fn rotater_x(angle: Angle) -> Self {
        Self::build(Mat3::rotater_x(angle), Vec3::ZERO)
    }
    pub fn rotater_y(angle: Angle) -> Self {
        Self::build(Mat3::rotater_y(angle), Vec3::ZERO)
    }
    pub fn rotater_z(angle: Angle) -> Self {
        Self::build(Mat3::rotater_z(angle), Vec3::ZERO)
    }
    /// Rotation about an arbitrary axis through the origin; `axis` need not be normalized.
    pub fn rotater(axis: Vec3, angle: Angle) -> Self {
        Self::build(Mat3::rotater(axis, angle), Vec3::ZERO)
    }

    /// The rotation is orthonormal, so its inverse is the transpose.
    pub fn inverse(&self) -> Self {
        let back = self.rotation.transpose();
        Self::build(back, -(back * self.translation))
    }

    /// Returns Translate(t) * self: moves the result of `self` by `t`.
    pub fn translate(self, t: Vec3) -> Self {
        Self::build(self.rotation, self.translation + t)
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_parts(self.rotation, self.translation)
    }
}

impl Mul for RigidBodyTransform {
    type Output = RigidBodyTransform;
    /// `self * rhs` applies `rhs` first.
    fn mul(self, rhs: Self) -> Self::Output {
        Self::build(
            self.rotation * rhs.rotation,
            self.rotation * rhs.translation + self.translation,
        )
    }
}

impl AffineTransform {
    /// Wraps an arbitrary matrix. Returns `None` if the matrix is not affine (bottom row other
    /// than `[0 0 0 1]`) or is singular.
    pub fn from_matrix(forward: Mat4) -> Option<Self> {
        if !forward.is_affine() {
            return None;
        }
        let inverse = forward.inverse()?;
        Some(Self { forward, inverse })
    }

    /// Axis-aligned scaling; zero factors make a singular transform, so they are rejected.
    pub fn scaler(scale: Vec3) -> Option<Self> {
        Self::from_matrix(Mat4::nonuniform_scale(scale))
    }

    pub fn inverse(&self) -> Self {
        Self {
            forward: self.inverse,
            inverse: self.forward,
        }
    }

    /// Splits the transform into rotation and translation. Returns `None` if the linear part
    /// scales, shears or mirrors.
    /// ```
    /// use geometry::transform::{AffineTransform, RigidBodyTransform};
    /// use math::hcm::Vec3;
    /// let rigid = RigidBodyTransform::rotater_y(math::new_deg(30.0)).translate(Vec3::X);
    /// assert!(AffineTransform::from(rigid).decompose().is_some());
    /// let stretch = AffineTransform::scaler(Vec3::new(1.0, 2.0, 1.0)).unwrap();
    /// assert!(stretch.decompose().is_none());
    /// ```
    pub fn decompose(&self) -> Option<RigidBodyTransform> {
        let rotation = self.forward.orientation();
        rotation
            .is_rotation(1e-4)
            .then(|| RigidBodyTransform::build(rotation, self.forward.translation()))
    }

    /// Inverse-transpose of the linear part: maps surface normals, without normalizing them.
    pub fn normal_matrix(&self) -> Mat3 {
        self.inverse.orientation().transpose()
    }
}

impl From<RigidBodyTransform> for AffineTransform {
    fn from(t: RigidBodyTransform) -> Self {
        Self {
            forward: t.to_matrix(),
            inverse: t.inverse().to_matrix(),
        }
    }
}

impl std::fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = &self.forward;
        for row in 0..3 {
            write!(f, "\n|")?;
            for col in 0..4 {
                write!(f, "{:6.2}", m.cols[col][row])?;
            }
            write!(f, " |")?;
        }
        Ok(())
    }
}

impl Transform<Vec3> for RigidBodyTransform {
    fn apply(&self, v: Vec3) -> Vec3 {
        self.rotation * v
    }
}
impl Transform<Point3> for RigidBodyTransform {
    fn apply(&self, p: Point3) -> Point3 {
        Point3::from(self.rotation * Vec3::from(p) + self.translation)
    }
}

/// Vectors are treated as directions; use `normal_matrix()` for normals.
impl Transform<Vec3> for AffineTransform {
    fn apply(&self, v: Vec3) -> Vec3 {
        self.forward * v
    }
}
impl Transform<Point3> for AffineTransform {
    fn apply(&self, p: Point3) -> Point3 {
        self.forward * p
    }
}
