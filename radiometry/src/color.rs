use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Linear RGB radiance. Channels are unbounded; clamping happens only when converting to bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Maps `[0, 1]` onto `0..=255`, saturating outside that range. NaN becomes 0.
fn to_byte(f: f32) -> u8 {
    if f.is_nan() {
        0
    } else {
        (f.clamp(0.0, 1.0) * 255.0) as u8
    }
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b }
    }
    pub const ONE: Color = Self::new(1.0, 1.0, 1.0);
    /// Loud enough to spot in a rendered image.
    pub const MAGENTA: Color = Self::new(1.0, 0.0, 1.0);

    pub fn black() -> Color {
        Color::gray(0.0)
    }
    pub fn white() -> Color {
        Color::ONE
    }
    pub fn gray(level: f32) -> Color {
        Color::new(level, level, level)
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Color {
        Color::new(f(self.r), f(self.g), f(self.b))
    }
    fn zip(self, other: Color, f: impl Fn(f32, f32) -> f32) -> Color {
        Color::new(f(self.r, other.r), f(self.g, other.g), f(self.b, other.b))
    }

    /// Square-root gamma, applied right before quantization.
    pub fn gamma_encode(&self) -> Self {
        self.map(f32::sqrt)
    }
    pub fn is_black(&self) -> bool {
        self.max_channel() <= 0.0
    }
    pub fn to_u8(&self) -> [u8; 3] {
        [to_byte(self.r), to_byte(self.g), to_byte(self.b)]
    }
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
    /// The largest of the three channels.
    /// ```
    /// use radiometry::color::Color;
    /// assert_eq!(Color::new(0.2, 0.7, 0.1).max_channel(), 0.7);
    /// ```
    pub fn max_channel(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a + b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Color {
    type Output = Color;
    fn sub(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a - b)
    }
}

/// Filtering by another color.
impl Mul for Color {
    type Output = Color;
    fn mul(self, rhs: Color) -> Self {
        self.zip(rhs, |a, b| a * b)
    }
}

impl Mul<f32> for Color {
    type Output = Color;
    fn mul(self, s: f32) -> Self {
        self.map(|c| c * s)
    }
}

impl Mul<Color> for f32 {
    type Output = Color;
    fn mul(self, c: Color) -> Color {
        c * self
    }
}

impl Sum for Color {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Color::black(), Add::add)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = f.precision().unwrap_or(2);
        write!(f, "rgb({:.p$}, {:.p$}, {:.p$})", self.r, self.g, self.b, p = p)
    }
}

impl std::fmt::LowerHex for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.to_u8();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}
