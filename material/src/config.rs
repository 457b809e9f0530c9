use radiometry::color::Color;
use std::fmt::{Display, Formatter, Result};

/// Constants that bound the recursive tracer.
///
/// - `max_depth`: how many reflection/transmission generations a primary ray may spawn,
/// - `internal_reflections`: how many times a ray may bounce inside a transparent object,
/// - `cutoff`: a branch is not traced if it can change the pixel by less than this fraction,
/// - `outside_ior`: index of refraction of the medium between objects,
/// - `error_color`: what a ray shades to when shading is numerically inconsistent,
/// - `epsilon`: how far secondary rays start off the surface they leave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceConfig {
    pub max_depth: u32,
    pub internal_reflections: u32,
    pub cutoff: f32,
    pub outside_ior: f32,
    pub error_color: Color,
    pub epsilon: f32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            max_depth: 10,
            internal_reflections: 10,
            cutoff: 0.002,
            outside_ior: 1.0,
            error_color: Color::MAGENTA,
            epsilon: 1e-4,
        }
    }
}

impl TraceConfig {
    pub fn with_max_depth(self, max_depth: u32) -> Self {
        Self { max_depth, ..self }
    }
    pub fn with_internal_reflections(self, internal_reflections: u32) -> Self {
        Self {
            internal_reflections,
            ..self
        }
    }
    pub fn with_cutoff(self, cutoff: f32) -> Self {
        Self { cutoff, ..self }
    }
    pub fn with_outside_ior(self, outside_ior: f32) -> Self {
        Self {
            outside_ior,
            ..self
        }
    }
    pub fn with_error_color(self, error_color: Color) -> Self {
        Self {
            error_color,
            ..self
        }
    }
    pub fn with_epsilon(self, epsilon: f32) -> Self {
        Self { epsilon, ..self }
    }

    /// Checks that every constant is usable; the message names the first one that is not.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.cutoff >= 0.0 && self.cutoff.is_finite()) {
            return Err(format!("cutoff must be finite and non-negative, got {}", self.cutoff));
        }
        if !(self.outside_ior > 0.0 && self.outside_ior.is_finite()) {
            return Err(format!(
                "outside index of refraction must be positive, got {}",
                self.outside_ior
            ));
        }
        if !(self.epsilon >= 0.0 && self.epsilon.is_finite()) {
            return Err(format!("epsilon must be finite and non-negative, got {}", self.epsilon));
        }
        if !self.error_color.is_finite() {
            return Err(format!("error color {} is not finite", self.error_color));
        }
        Ok(())
    }
}

/// Counters kept by each worker while shading. Workers' counters are summed after a render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadeStats {
    pub primary_rays: u64,
    pub secondary_rays: u64,
    pub shadow_rays: u64,
    /// Branches skipped because they could not contribute more than the cutoff.
    pub cutoff_pruned: u64,
    /// Branches skipped because the depth budget ran out.
    pub depth_pruned: u64,
    pub total_internal_reflections: u64,
    /// Negative dot products caused by round-off.
    pub rejected_dots: u64,
    pub error_fallbacks: u64,
}

impl std::ops::AddAssign for ShadeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.primary_rays += rhs.primary_rays;
        self.secondary_rays += rhs.secondary_rays;
        self.shadow_rays += rhs.shadow_rays;
        self.cutoff_pruned += rhs.cutoff_pruned;
        self.depth_pruned += rhs.depth_pruned;
        self.total_internal_reflections += rhs.total_internal_reflections;
        self.rejected_dots += rhs.rejected_dots;
        self.error_fallbacks += rhs.error_fallbacks;
    }
}

impl std::iter::Sum for ShadeStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ShadeStats::default(), |mut acc, s| {
            acc += s;
            acc
        })
    }
}

impl Display for ShadeStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "rays: {} primary, {} secondary, {} shadow; pruned: {} by cutoff, {} by depth; \
             {} total internal reflections, {} rejected dot products, {} error fallbacks",
            self.primary_rays,
            self.secondary_rays,
            self.shadow_rays,
            self.cutoff_pruned,
            self.depth_pruned,
            self.total_internal_reflections,
            self.rejected_dots,
            self.error_fallbacks
        )
    }
}
