use std::{
    fmt,
    ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub},
};

pub use glam::Vec4;

/// Represents a 3D vector. Each component is a `f32` number.
/// Components can be accessed using `v.x` `v.y` `v.z`,
/// or indices `v[i]` where i is 0, 1, or 2.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Display with a bracket pair, indexing by axis number.
macro_rules! impl_xyz {
    ($t:ident, $open:literal, $close:literal) => {
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let p = f.precision().unwrap_or(2);
                write!(f, concat!($open, "{:.p$}, {:.p$}, {:.p$}", $close), self.x, self.y, self.z, p = p)
            }
        }
        impl Index<usize> for $t {
            type Output = f32;
            fn index(&self, axis: usize) -> &f32 {
                match axis {
                    0 => &self.x,
                    1 => &self.y,
                    2 => &self.z,
                    _ => panic!("axis {} out of range", axis),
                }
            }
        }
        impl IndexMut<usize> for $t {
            fn index_mut(&mut self, axis: usize) -> &mut f32 {
                match axis {
                    0 => &mut self.x,
                    1 => &mut self.y,
                    2 => &mut self.z,
                    _ => panic!("axis {} out of range", axis),
                }
            }
        }
    };
}

/// Component-wise `lhs op rhs -> out`.
macro_rules! impl_componentwise {
    ($tr:ident, $method:ident, $lhs:ident, $rhs:ident, $out:ident, $op:tt) => {
        impl $tr<$rhs> for $lhs {
            type Output = $out;
            fn $method(self, rhs: $rhs) -> $out {
                $out::new(self.x $op rhs.x, self.y $op rhs.y, self.z $op rhs.z)
            }
        }
    };
}

impl_xyz!(Vec3, "(", ")");
impl_xyz!(Point3, "[", "]");

impl_componentwise!(Add, add, Vec3, Vec3, Vec3, +);
impl_componentwise!(Sub, sub, Vec3, Vec3, Vec3, -);
impl_componentwise!(Add, add, Vec3, Point3, Point3, +);
impl_componentwise!(Add, add, Point3, Vec3, Point3, +);
impl_componentwise!(Sub, sub, Point3, Point3, Vec3, -);
impl_componentwise!(Sub, sub, Point3, Vec3, Point3, -);

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3 { x, y, z }
    }
    pub fn as_vec4(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, 0.0)
    }
    pub const X: Vec3 = Self::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Self::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Self::new(0.0, 0.0, 1.0);
    pub const ZERO: Vec3 = Self::new(0.0, 0.0, 0.0);

    pub fn dot(self, v: Vec3) -> f32 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }
    pub fn cross(self, v: Vec3) -> Vec3 {
        // x1 y1 z1
        // x2 y2 z2
        // i  j  k
        Vec3::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    pub fn norm_squared(self) -> f32 {
        self.dot(self)
    }
    pub fn norm(self) -> f32 {
        f32::sqrt(self.norm_squared())
    }

    /// Returns a normalized (unit-length) `self` vector.
    /// Panics if the vector length is zero, NaN or infinite.
    pub fn hat(self) -> Vec3 {
        let norm2 = self.norm_squared();
        assert!(norm2 != 0.0 && norm2.is_finite(), "can't normalize {}", self);
        let inv_sqrt = 1.0 / self.norm();
        self * inv_sqrt
    }

    /// Returns a normalized `self`, or `None` if the length is zero or not finite.
    /// ```
    /// use math::hcm::Vec3;
    /// assert!(Vec3::ZERO.try_hat().is_none());
    /// assert_eq!(Vec3::new(0.0, 3.0, 0.0).try_hat(), Some(Vec3::Y));
    /// ```
    pub fn try_hat(self) -> Option<Self> {
        let inv_length = 1.0 / self.norm();
        (inv_length.is_finite() && inv_length != 0.0).then(|| inv_length * self)
    }

    /// Chooses from `self` or `-self`, whichever faces a surface having given `normal`.
    pub fn facing(self, normal: Self) -> Self {
        if self.dot(normal).is_sign_negative() {
            self
        } else {
            -self
        }
    }

    // Returns the index to the element with minimum magnitude.
    pub fn abs_min_dimension(self) -> usize {
        let abs = [self.x.abs(), self.y.abs(), self.z.abs()];
        let res = if abs[0] < abs[1] { 0 } else { 1 };
        if abs[res] < abs[2] {
            res
        } else {
            2
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}
impl Mul<Vec3> for f32 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}
impl Div<f32> for Vec3 {
    type Output = Self;
    fn div(self, s: f32) -> Vec3 {
        Vec3::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Point3 {
        Point3 { x, y, z }
    }
    pub const ORIGIN: Point3 = Point3::new(0.0, 0.0, 0.0);

    pub fn distance_to(self, p: Self) -> f32 {
        (self - p).norm()
    }
    pub fn as_vec4(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, 1.0)
    }
}


impl From<Vec3> for Point3 {
    fn from(v: Vec3) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

impl From<Vec4> for Vec3 {
    fn from(v4: Vec4) -> Self {
        Vec3::new(v4.x, v4.y, v4.z)
    }
}

/// Column-major 3x3 matrix; `cols[c][r]` is row `r` of column `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    pub cols: [Vec3; 3],
}

impl Mat3 {
    pub const ZERO: Self = Self {
        cols: [Vec3::ZERO; 3],
    };
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };
    pub fn from_cols(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { cols: [v0, v1, v2] }
    }
    /// Builds a symmetric matrix from its diagonal and the three off-diagonal entries
    /// `(m01, m12, m20)`.
    pub fn symmetric(diag: Vec3, off: Vec3) -> Self {
        Self::from_cols(
            Vec3::new(diag.x, off.x, off.z),
            Vec3::new(off.x, diag.y, off.y),
            Vec3::new(off.z, off.y, diag.z),
        )
    }
    pub fn nonuniform_scale(s: Vec3) -> Self {
        Self::from_cols(Vec3::X * s.x, Vec3::Y * s.y, Vec3::Z * s.z)
    }

    /// Counter-clockwise rotation about coordinate axis `axis` (0, 1 or 2), looking down the axis.
    fn about_axis(axis: usize, angle: crate::Angle) -> Self {
        let (sin_t, cos_t) = angle.sin_cos();
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        let mut mat = Self::IDENTITY;
        mat.cols[u][u] = cos_t;
        mat.cols[u][v] = sin_t;
        mat.cols[v][u] = -sin_t;
        mat.cols[v][v] = cos_t;
        mat
    }
    pub fn rotater_x(angle: crate::Angle) -> Self {
        Self::about_axis(0, angle)
    }
    pub fn rotater_y(angle: crate::Angle) -> Self {
        Self::about_axis(1, angle)
    }
    pub fn rotater_z(angle: crate::Angle) -> Self {
        Self::about_axis(2, angle)
    }

    /// Rodrigues' rotation about `axis`, which may have any nonzero length.
    pub fn rotater(axis: Vec3, angle: crate::Angle) -> Self {
        let k = axis.hat();
        let (sin_t, cos_t) = angle.sin_cos();
        let turn = |v: Vec3| v * cos_t + k.cross(v) * sin_t + k * (k.dot(v) * (1.0 - cos_t));
        Self::from_cols(turn(Vec3::X), turn(Vec3::Y), turn(Vec3::Z))
    }

    pub fn transpose(&self) -> Self {
        let row = |r: usize| Vec3::new(self.cols[0][r], self.cols[1][r], self.cols[2][r]);
        Self::from_cols(row(0), row(1), row(2))
    }
    pub fn determinant(&self) -> f32 {
        self.cols[0].dot(self.cols[1].cross(self.cols[2]))
    }
    pub fn frobenius_norm_squared(&self) -> f32 {
        self.cols.iter().map(|c| c.norm_squared()).sum()
    }

    /// Returns true if the columns are unit-length and mutually perpendicular, and the determinant
    /// is +1 (a proper rotation).
    pub fn is_rotation(&self, tolerance: f32) -> bool {
        let gram = self.transpose() * *self;
        (gram - Mat3::IDENTITY).frobenius_norm_squared() < tolerance * tolerance
            && (self.determinant() - 1.0).abs() < tolerance
    }

    /// Tests whether the (assumed symmetric) matrix is positive semidefinite by checking that all
    /// principal minors are non-negative.
    /// ```
    /// use math::hcm::{Mat3, Vec3};
    /// let sphere = Mat3::symmetric(Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO);
    /// let cone = Mat3::symmetric(Vec3::new(1.0, 1.0, -1.0), Vec3::ZERO);
    /// assert!(sphere.principal_minors_non_negative(1e-6));
    /// assert!(!cone.principal_minors_non_negative(1e-6));
    /// ```
    pub fn principal_minors_non_negative(&self, tolerance: f32) -> bool {
        let m = |r: usize, c: usize| self.cols[c][r];
        let first_order = (0..3).all(|i| m(i, i) >= -tolerance);
        let second_order = [(0, 1), (1, 2), (0, 2)]
            .iter()
            .all(|&(i, j)| m(i, i) * m(j, j) - m(i, j) * m(j, i) >= -tolerance);
        first_order && second_order && self.determinant() >= -tolerance
    }
}

impl Mul for Mat3 {
    type Output = Mat3;
    fn mul(self, m: Self) -> Mat3 {
        let mut mat = Mat3::ZERO;
        for c in 0..3 {
            mat.cols[c] = self * m.cols[c];
        }
        mat
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        self.cols[0] * v[0] + self.cols[1] * v[1] + self.cols[2] * v[2]
    }
}

impl Mul<f32> for Mat3 {
    type Output = Mat3;
    fn mul(self, f: f32) -> Mat3 {
        Self::from_cols(self.cols[0] * f, self.cols[1] * f, self.cols[2] * f)
    }
}

impl Sub for Mat3 {
    type Output = Mat3;
    fn sub(self, rhs: Mat3) -> Self::Output {
        Self::from_cols(
            self.cols[0] - rhs.cols[0],
            self.cols[1] - rhs.cols[1],
            self.cols[2] - rhs.cols[2],
        )
    }
}

// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const ZERO: Mat4 = Mat4 {
        cols: [Vec4::ZERO; 4],
    };
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };
    /// Builds the homogeneous matrix `[linear | t]` with the bottom row `[0 0 0 1]`.
    pub fn from_parts(linear: Mat3, t: Vec3) -> Mat4 {
        Mat4 {
            cols: [
                linear.cols[0].as_vec4(),
                linear.cols[1].as_vec4(),
                linear.cols[2].as_vec4(),
                Vec4::new(t.x, t.y, t.z, 1.0),
            ],
        }
    }
    pub fn translater(t: Vec3) -> Mat4 {
        let mut mat = Self::IDENTITY;
        mat.cols[3] = Vec4::new(t.x, t.y, t.z, 1.0);
        mat
    }
    pub fn nonuniform_scale(s: Vec3) -> Mat4 {
        let mut mat = Self::IDENTITY;
        mat.cols[0][0] = s[0];
        mat.cols[1][1] = s[1];
        mat.cols[2][2] = s[2];
        mat
    }
    /// The upper-left 3x3 block.
    pub fn orientation(&self) -> Mat3 {
        Mat3::from_cols(
            self.cols[0].into(),
            self.cols[1].into(),
            self.cols[2].into(),
        )
    }
    pub fn translation(&self) -> Vec3 {
        self.cols[3].into()
    }
    /// True if the bottom row is `[0 0 0 1]`.
    pub fn is_affine(&self) -> bool {
        self.cols[0].w == 0.0 && self.cols[1].w == 0.0 && self.cols[2].w == 0.0 && self.cols[3].w == 1.0
    }

    /// Determinant by cofactor expansion along the first column.
    pub fn determinant(&self) -> f32 {
        let m = |r: usize, c: usize| self.cols[c][r];
        (0..4)
            .map(|r| {
                let rows: Vec<usize> = (0..4).filter(|&i| i != r).collect();
                let minor = Mat3::from_cols(
                    Vec3::new(m(rows[0], 1), m(rows[1], 1), m(rows[2], 1)),
                    Vec3::new(m(rows[0], 2), m(rows[1], 2), m(rows[2], 2)),
                    Vec3::new(m(rows[0], 3), m(rows[1], 3), m(rows[2], 3)),
                );
                let sign = if r % 2 == 0 { 1.0 } else { -1.0 };
                sign * m(r, 0) * minor.determinant()
            })
            .sum()
    }

    /// Inverts the matrix by Gauss-Jordan elimination with partial pivoting.
    /// Returns `None` if the matrix is singular.
    /// ```
    /// use math::hcm::{Mat4, Vec3};
    /// let m = Mat4::translater(Vec3::new(1.0, 2.0, 3.0));
    /// let inv = m.inverse().unwrap();
    /// assert_eq!(inv.translation(), Vec3::new(-1.0, -2.0, -3.0));
    /// assert!(Mat4::ZERO.inverse().is_none());
    /// ```
    pub fn inverse(&self) -> Option<Mat4> {
        // Row-major [self | I].
        let mut rows = [[0.0f32; 8]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for c in 0..4 {
                row[c] = self.cols[c][r];
            }
            row[4 + r] = 1.0;
        }
        for col in 0..4 {
            let pivot = (col..4)
                .max_by(|&i, &j| rows[i][col].abs().total_cmp(&rows[j][col].abs()))
                .unwrap_or(col);
            if rows[pivot][col].abs() < 1e-12 {
                return None;
            }
            rows.swap(col, pivot);
            let inv_pivot = rows[col][col].recip();
            rows[col].iter_mut().for_each(|x| *x *= inv_pivot);
            let pivot_row = rows[col];
            for (r, row) in rows.iter_mut().enumerate() {
                let factor = row[col];
                if r != col && factor != 0.0 {
                    for k in 0..8 {
                        row[k] -= factor * pivot_row[k];
                    }
                }
            }
        }
        let mut res = Mat4::ZERO;
        for (r, row) in rows.iter().enumerate() {
            for c in 0..4 {
                res.cols[c][r] = row[4 + c];
            }
        }
        Some(res)
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        self.cols[0] * v[0] + self.cols[1] * v[1] + self.cols[2] * v[2] + self.cols[3] * v[3]
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, m: Self) -> Mat4 {
        let mut mat = Mat4::ZERO;
        for c in 0..4 {
            mat.cols[c] = self * m.cols[c];
        }
        mat
    }
}

impl Mul<Vec3> for Mat4 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        let v4 = self.cols[0] * v[0] + self.cols[1] * v[1] + self.cols[2] * v[2];
        Vec3::new(v4.x, v4.y, v4.z)
    }
}

impl Mul<Point3> for Mat4 {
    type Output = Point3;
    fn mul(self, p: Point3) -> Self::Output {
        let v4 = self * p.as_vec4();
        if v4.w == 1.0 {
            Point3::new(v4.x, v4.y, v4.z)
        } else {
            Point3::new(v4.x / v4.w, v4.y / v4.w, v4.z / v4.w)
        }
    }
}

/// Completes the unit vector `v` to a right-handed orthonormal frame `(v, a, b)`.
/// ```
/// use math::hcm::{Vec3, Mat3, make_coord_system};
/// let v = Vec3::new(0.3, 0.4, -0.6).hat();
/// let (a, b) = make_coord_system(v);
/// let frame = Mat3::from_cols(v, a, b);
/// assert!(frame.is_rotation(1e-5));
/// ```
pub fn make_coord_system(v: Vec3) -> (Vec3, Vec3) {
    // Crossing with the axis least aligned with `v` keeps the result well conditioned.
    let least = match v.abs_min_dimension() {
        0 => Vec3::X,
        1 => Vec3::Y,
        _ => Vec3::Z,
    };
    let a = v.cross(least).hat();
    (a, v.cross(a))
}

/// Mirrors `wi` about the `normal` axis. Both vectors point away from the surface; `normal` need
/// not be unit length.
pub fn reflect(normal: Vec3, wi: Vec3) -> Vec3 {
    normal * (2.0 * wi.dot(normal) / normal.norm_squared()) - wi
}

pub enum Refract {
    FullReflect(Vec3),
    Transmit(Vec3),
}

pub use Refract::FullReflect;
pub use Refract::Transmit;

/// Refracts incident light `wi` with regard to `normal`.
/// - `normal` is assumed to form an acute angle with `wi`; both point away from the surface.
/// - `ni_over_no` is the ratio of refraction indices on the incident and the transmitted side.
/// If `ni`/`no` > 1 (e.g., from water to air), there is a chance of full reflection.
pub fn refract(normal: Vec3, wi: Vec3, ni_over_no: f32) -> Refract {
    let (wi, n) = (wi.hat(), normal.hat());
    let cos_i = wi.dot(n);
    debug_assert!(cos_i > -1e-3, "wi {} is below normal {}", wi, n);
    let cos_i = cos_i.max(0.0);
    // Snell: sin_o = sin_i * ni / no.
    let sin2_o = (1.0 - cos_i * cos_i).max(0.0) * ni_over_no * ni_over_no;
    if sin2_o >= 1.0 {
        return FullReflect(reflect(n, wi));
    }
    let cos_o = (1.0 - sin2_o).sqrt();
    Transmit((ni_over_no * cos_i - cos_o) * n - ni_over_no * wi)
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        if ($left - $right).norm_squared() > 1e-4 {
            panic!(
                "Assertion failed: Close({}, {}) values: {} vs. {}, dist = {}",
                stringify!($left),
                stringify!($right),
                $left,
                $right,
                ($left - $right).norm()
            )
        }
    };
}

#[cfg(test)]
mod test {
    use super::{Mat3, Mat4, Point3, Vec3};

    #[test]
    fn reflect_keeps_the_normal_component() {
        let r = super::reflect(Vec3::Z * 3.0, Vec3::new(1.0, 2.0, 3.0));
        assert_close!(r, Vec3::new(-1.0, -2.0, 3.0));
    }

    #[test]
    fn refract_follows_snell() {
        let n = Vec3::Y * 6.0;
        let (s, c) = crate::new_deg(40.0).sin_cos();
        match super::refract(n, Vec3::new(s, c, 0.0), 1.0 / 1.5) {
            super::Transmit(t) => {
                assert!((t.norm() - 1.0).abs() < 1e-5);
                assert!((t.x + s / 1.5).abs() < 1e-5);
                assert!(t.y < 0.0);
            }
            super::FullReflect(_) => panic!("air to glass never reflects totally"),
        }

        // From glass to air the critical angle is asin(1 / 1.5), about 41.8 degrees.
        for &(degrees, total) in &[(41.0, false), (42.6, true)] {
            let (s, c) = crate::new_deg(degrees).sin_cos();
            let r = super::refract(n, Vec3::new(s, c, 0.0), 1.5);
            assert_eq!(matches!(r, super::FullReflect(_)), total, "{} degrees", degrees);
        }
        let (s, c) = crate::new_deg(60.0).sin_cos();
        match super::refract(n, Vec3::new(s, c, 0.0), 1.5) {
            super::FullReflect(v) => assert_close!(v, Vec3::new(-s, c, 0.0)),
            super::Transmit(_) => panic!("60 degrees is past the critical angle"),
        }
    }

    #[test]
    fn axis_rotations_agree_with_rodrigues() {
        let angle = crate::new_deg(25.0);
        for (m, axis) in [
            (Mat3::rotater_x(angle), Vec3::X),
            (Mat3::rotater_y(angle), Vec3::Y),
            (Mat3::rotater_z(angle), Vec3::Z),
        ] {
            let general = Mat3::rotater(axis * 2.0, angle);
            for c in 0..3 {
                assert_close!(m.cols[c], general.cols[c]);
            }
        }
        // Counter-clockwise: x turns towards y about z.
        assert!((Mat3::rotater_z(angle) * Vec3::X).y > 0.0);
    }

    #[test]
    fn test_inverse_rigid() {
        let rot = Mat3::rotater(Vec3::new(0.6, 0.8, 0.0), crate::new_rad(0.3));
        let m = Mat4::from_parts(rot, Vec3::new(0.3, -4.0, 2.5));
        let inv = m.inverse().unwrap();
        let p = Point3::new(1.0, 2.0, 3.0);
        let back = inv * (m * p);
        assert_close!(back, p);
        assert!(rot.is_rotation(1e-4));
        assert!(!Mat3::nonuniform_scale(Vec3::new(1.0, 2.0, 1.0)).is_rotation(1e-4));
    }

    #[test]
    fn test_inverse_singular() {
        let flat = Mat4::nonuniform_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(flat.inverse().is_none());
        assert_eq!(flat.determinant(), 0.0);
        let scale = Mat4::nonuniform_scale(Vec3::new(2.0, 3.0, 4.0));
        assert!((scale.determinant() - 24.0).abs() < 1e-5);
    }
}
