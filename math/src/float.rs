/// A closed range `[min, max]` on the real axis, never empty.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// The whole real axis; shrink it with `clip()`.
    pub fn everything() -> Self {
        Interval {
            min: -f32::INFINITY,
            max: f32::INFINITY,
        }
    }

    /// Intersects `self` with `[a, b]` (in either order). Returns `None` once the result is empty.
    pub fn clip(self, a: f32, b: f32) -> Option<Self> {
        let (a, b) = min_max(a, b);
        let min = self.min.max(a);
        let max = self.max.min(b);
        (min <= max).then(|| Interval { min, max })
    }

    pub fn as_pair(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}

/// An angle that remembers nothing about the unit it was built from.
/// ```
/// let right = math::new_deg(90.0);
/// assert!((right.to_rad() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Angle {
    radians: f32,
}

impl Angle {
    pub fn new_rad(radians: f32) -> Self {
        Self { radians }
    }
    pub fn new_deg(degrees: f32) -> Self {
        Self::new_rad(degrees.to_radians())
    }
    pub fn to_rad(self) -> f32 {
        self.radians
    }
    pub fn sin_cos(self) -> (f32, f32) {
        self.radians.sin_cos()
    }
    pub fn tan(self) -> f32 {
        self.radians.tan()
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}deg", self.radians.to_degrees())
    }
}

pub trait Float: Sized {
    /// The remaining leg of a right triangle with hypotenuse `self` and one leg `other`.
    /// Clamps to 0 when `other` is longer than the hypotenuse.
    /// ```
    /// use math::float::Float;
    /// assert!((1.0f32.cathetus(0.6) - 0.8).abs() < 1e-6);
    /// assert_eq!(1.0f32.cathetus(-0.6), 1.0f32.cathetus(0.6));
    /// assert_eq!(0.5f32.cathetus(1.0), 0.0);
    /// ```
    fn cathetus(self, other: Self) -> Self;

    /// `self / divisor`, or `None` when the divisor is zero.
    /// ```
    /// use math::float::Float;
    /// assert_eq!(1.0f32.try_divide(0.0), None);
    /// assert_eq!(1.0f32.try_divide(2.5), Some(0.4));
    /// ```
    fn try_divide(self, divisor: Self) -> Option<Self>;

    fn dist_to(self, other: Self) -> Self;
}

impl Float for f32 {
    fn cathetus(self, other: f32) -> f32 {
        (self * self - other * other).max(0.0).sqrt()
    }
    fn try_divide(self, divisor: f32) -> Option<f32> {
        (divisor != 0.0).then(|| self / divisor)
    }
    fn dist_to(self, other: f32) -> f32 {
        (self - other).abs()
    }
}

/// Midpoints of `count` equal pieces of `interval`, and the width of one piece. Used for
/// midpoint-rule integration.
pub fn linspace(interval: (f32, f32), count: i32) -> (Vec<f32>, f32) {
    let (a, b) = interval;
    let step = (b - a) / count as f32;
    let points = (0..count).map(|i| a + (i as f32 + 0.5) * step).collect();
    (points, step)
}

/// `(a, b)` sorted ascending.
pub fn min_max(a: f32, b: f32) -> (f32, f32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[macro_export]
macro_rules! assert_le {
    ($left:expr, $right:expr) => {
        if $left > $right {
            panic!(
                "assertion failed: {} <= {} ({} vs. {})",
                stringify!($left),
                stringify!($right),
                $left,
                $right
            )
        }
    };
}
