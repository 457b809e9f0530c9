use geometry::ray::Ray;
use math::{float::Float, hcm};
use radiometry::color::Color;
use std::f32::consts::PI;

/// Picks one of the sub-pixel samples; lights with extent use it to spread shadow rays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub index: u32,
    pub jitter: u32,
}

impl Sample {
    pub fn new(index: u32, jitter: u32) -> Self {
        Sample { index, jitter }
    }

    /// A deterministic, well-spread point in [0, 1)² (the R2 low-discrepancy sequence).
    pub fn unit_square(&self) -> (f32, f32) {
        const A1: f32 = 0.754_877_7;
        const A2: f32 = 0.569_840_3;
        let u = ((self.index as f32 + 0.5) * A1).fract();
        let v = ((self.jitter as f32 + 0.5) * A2).fract();
        (u, v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional,
    Positional,
}

/// What a light reports about itself as seen from one point.
///  - `to_light`: unit vector from the point towards the light (zero for ambient lights),
///  - `distance`: how far the light is; infinite for ambient and directional lights,
///  - `origin`: the emitting point of positional lights.
#[derive(Debug, Clone, Copy)]
pub struct LightInfo {
    pub kind: LightKind,
    pub color: Color,
    pub to_light: hcm::Vec3,
    pub distance: f32,
    pub origin: Option<hcm::Point3>,
}

impl Default for LightInfo {
    fn default() -> Self {
        LightInfo {
            kind: LightKind::Ambient,
            color: Color::black(),
            to_light: hcm::Vec3::ZERO,
            distance: f32::INFINITY,
            origin: None,
        }
    }
}

pub trait Light: Send + Sync {
    fn summary(&self) -> String;

    /// Computes the light arriving at `point`, regardless of occlusion, and writes it to `out`.
    /// Returns false if the light cannot geometrically reach the point; `out` is then unspecified.
    fn query(&self, point: hcm::Point3, out: &mut LightInfo) -> bool;

    /// Same as `query()`, but lights with an extent may use `sample` to pick which part of them
    /// emits.
    fn query_jittered(&self, point: hcm::Point3, _sample: Sample, out: &mut LightInfo) -> bool {
        self.query(point, out)
    }
}

// Various kinds of lights.

/// Light that reaches every point from every direction.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: Color,
}

/// Light arriving from infinitely far away along `direction` (the direction light travels).
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    direction: hcm::Vec3,
    pub color: Color,
}

/// Light emitted from a point, or from a small disk facing the lit point if `radius` > 0.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: hcm::Point3,
    pub color: Color,
    pub radius: f32,
    /// Scale by the inverse square of the distance.
    pub falloff: bool,
}

/// Point light restricted to a cone around `axis`, fading out between the inner and outer angles.
#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    light: PointLight,
    axis: hcm::Vec3,
    cos_inner: f32,
    cos_outer: f32,
}

impl AmbientLight {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl DirectionalLight {
    /// Returns `None` if `direction` is zero.
    pub fn new(direction: hcm::Vec3, color: Color) -> Option<Self> {
        let direction = direction.try_hat()?;
        Some(Self { direction, color })
    }
}

impl PointLight {
    pub fn new(position: hcm::Point3, color: Color) -> Self {
        Self {
            position,
            color,
            radius: 0.0,
            falloff: false,
        }
    }
    pub fn with_radius(self, radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            ..self
        }
    }
    pub fn with_falloff(self) -> Self {
        Self {
            falloff: true,
            ..self
        }
    }

    fn emit_from(&self, origin: hcm::Point3, point: hcm::Point3, out: &mut LightInfo) -> bool {
        let diff = origin - point;
        let to_light = match diff.try_hat() {
            None => return false,
            Some(v) => v,
        };
        let distance = diff.norm();
        out.kind = LightKind::Positional;
        out.to_light = to_light;
        out.distance = distance;
        out.origin = Some(origin);
        out.color = if self.falloff {
            self.color * 1.0f32.try_divide(distance * distance).unwrap_or(0.0)
        } else {
            self.color
        };
        true
    }
}

impl SpotLight {
    /// The cone opens around `axis` (pointing away from the light) with full intensity inside
    /// `inner` and none outside `outer`.
    pub fn new(
        light: PointLight, axis: hcm::Vec3, inner: math::Angle, outer: math::Angle,
    ) -> Option<Self> {
        let axis = axis.try_hat()?;
        let (cos_inner, cos_outer) = (inner.sin_cos().1, outer.sin_cos().1);
        Some(Self {
            light,
            axis,
            cos_inner: cos_inner.max(cos_outer),
            cos_outer,
        })
    }

    /// Smooth falloff across the cone edge.
    fn attenuation(&self, to_light: hcm::Vec3) -> f32 {
        let cos = -to_light.dot(self.axis);
        if cos <= self.cos_outer {
            0.0
        } else if cos >= self.cos_inner {
            1.0
        } else {
            let t = (cos - self.cos_outer) / (self.cos_inner - self.cos_outer);
            t * t * (3.0 - 2.0 * t)
        }
    }
}

impl Light for AmbientLight {
    fn summary(&self) -> String {
        format!("Ambient({})", self.color)
    }
    fn query(&self, _point: hcm::Point3, out: &mut LightInfo) -> bool {
        *out = LightInfo {
            color: self.color,
            ..Default::default()
        };
        true
    }
}

impl Light for DirectionalLight {
    fn summary(&self) -> String {
        format!("Directional({}, {})", self.direction, self.color)
    }
    fn query(&self, _point: hcm::Point3, out: &mut LightInfo) -> bool {
        *out = LightInfo {
            kind: LightKind::Directional,
            color: self.color,
            to_light: -self.direction,
            distance: f32::INFINITY,
            origin: None,
        };
        true
    }
}

impl Light for PointLight {
    fn summary(&self) -> String {
        format!(
            "Point({}, {}, r = {})",
            self.position, self.color, self.radius
        )
    }
    fn query(&self, point: hcm::Point3, out: &mut LightInfo) -> bool {
        self.emit_from(self.position, point, out)
    }

    /// Picks a point on the disk of `radius` that faces `point`.
    fn query_jittered(&self, point: hcm::Point3, sample: Sample, out: &mut LightInfo) -> bool {
        if self.radius <= 0.0 {
            return self.query(point, out);
        }
        let axis = match (self.position - point).try_hat() {
            None => return false,
            Some(v) => v,
        };
        let (e1, e2) = hcm::make_coord_system(axis);
        let (u, v) = sample.unit_square();
        let (sin_phi, cos_phi) = (2.0 * PI * v).sin_cos();
        let r = self.radius * u.sqrt();
        let origin = self.position + r * (cos_phi * e1 + sin_phi * e2);
        self.emit_from(origin, point, out)
    }
}

impl Light for SpotLight {
    fn summary(&self) -> String {
        format!("Spot({}, axis = {})", self.light.summary(), self.axis)
    }
    fn query(&self, point: hcm::Point3, out: &mut LightInfo) -> bool {
        self.query_jittered(point, Sample::default(), out)
    }
    fn query_jittered(&self, point: hcm::Point3, sample: Sample, out: &mut LightInfo) -> bool {
        if !self.light.query_jittered(point, sample, out) {
            return false;
        }
        let factor = self.attenuation(out.to_light);
        out.color = out.color * factor;
        factor > 0.0
    }
}

/// What a ray sees when it escapes the scene.
#[derive(Clone, Copy)]
pub enum Background {
    Constant(Color),
    /// Blends from `bottom` (looking down) to `top` (looking up) along the y-axis.
    Gradient { top: Color, bottom: Color },
    Fn(fn(&Ray) -> Color),
}

impl Background {
    pub fn color_for(&self, r: &Ray) -> Color {
        match self {
            Background::Constant(c) => *c,
            Background::Gradient { top, bottom } => {
                let y = (r.dir.y + 1.0) * 0.5;
                *top * y + *bottom * (1.0 - y)
            }
            Background::Fn(f) => f(r),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Constant(Color::black())
    }
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Background::Constant(c) => write!(f, "Constant({})", c),
            Background::Gradient { top, bottom } => write!(f, "Gradient({} -> {})", bottom, top),
            Background::Fn(_) => write!(f, "Fn"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use math::assert_close;
    use math::hcm::{Point3, Vec3};

    #[test]
    fn ambient_and_directional() {
        let mut info = LightInfo::default();
        assert!(AmbientLight::new(Color::white()).query(Point3::ORIGIN, &mut info));
        assert_eq!(info.kind, LightKind::Ambient);
        assert_eq!(info.color, Color::white());

        let sun = DirectionalLight::new(Vec3::new(0.0, -2.0, 0.0), Color::gray(0.5)).unwrap();
        assert!(sun.query(Point3::new(4.0, 1.0, 2.0), &mut info));
        assert_eq!(info.kind, LightKind::Directional);
        assert_close!(info.to_light, Vec3::Y);
        assert!(info.distance.is_infinite());
        assert!(DirectionalLight::new(Vec3::ZERO, Color::white()).is_none());
    }

    #[test]
    fn point_light_falloff() {
        let bulb = PointLight::new(Point3::new(0.0, 2.0, 0.0), Color::white()).with_falloff();
        let mut info = LightInfo::default();
        assert!(bulb.query(Point3::ORIGIN, &mut info));
        assert_eq!(info.distance, 2.0);
        assert_eq!(info.color, Color::gray(0.25));
        assert_eq!(info.origin, Some(Point3::new(0.0, 2.0, 0.0)));
        // Nothing can be said about the direction at the light's own position.
        assert!(!bulb.query(Point3::new(0.0, 2.0, 0.0), &mut info));
    }

    #[test]
    fn disk_samples_stay_on_disk() {
        let bulb = PointLight::new(Point3::new(0.0, 5.0, 0.0), Color::white()).with_radius(0.5);
        let mut info = LightInfo::default();
        for i in 0..16 {
            assert!(bulb.query_jittered(Point3::ORIGIN, Sample::new(i, i * 7), &mut info));
            let origin = info.origin.unwrap();
            assert!(origin.distance_to(bulb.position) <= 0.5 + 1e-5);
            assert!((origin.y - 5.0).abs() < 1e-5);
        }
    }

    #[test]
    fn spot_cone() {
        let spot = SpotLight::new(
            PointLight::new(Point3::new(0.0, 10.0, 0.0), Color::white()),
            -Vec3::Y,
            math::new_deg(10.0),
            math::new_deg(20.0),
        )
        .unwrap();
        let mut info = LightInfo::default();
        assert!(spot.query(Point3::ORIGIN, &mut info));
        assert_eq!(info.color, Color::white());
        // 45 degrees off the axis.
        assert!(!spot.query(Point3::new(10.0, 0.0, 0.0), &mut info));
        // Half-way between the inner and outer angles.
        let p = Point3::new(10.0 * math::new_deg(15.0).tan(), 0.0, 0.0);
        assert!(spot.query(p, &mut info));
        assert!(info.color.r > 0.0 && info.color.r < 1.0);
    }

    #[test]
    fn gradient_background() {
        let bg = Background::Gradient {
            top: Color::new(0.5, 0.7, 1.0),
            bottom: Color::white(),
        };
        let up = Ray::new(Point3::ORIGIN, Vec3::Y);
        assert_eq!(bg.color_for(&up), Color::new(0.5, 0.7, 1.0));
        let down = Ray::new(Point3::ORIGIN, -Vec3::Y);
        assert_eq!(bg.color_for(&down), Color::white());
    }
}
