use light::Sample;
use math::float::Float;
use math::hcm::{self, Refract};
use radiometry::color::Color;
use shape::Hit;

use crate::{Depth, LocalModel, Material, ShadeContext};

/// Fraction of light reflected at a smooth boundary between two dielectrics, going from the medium
/// with index `eta_i` into the medium with index `eta_t`. `cos_theta_i` is the cosine between the
/// incident direction and the normal on the incident side. Returns 1 under total internal
/// reflection.
/// ```
/// use material::fresnel_dielectric;
/// let head_on = fresnel_dielectric(1.0, 1.0, 1.5);
/// assert!((head_on - 0.04).abs() < 1e-6);
/// assert_eq!(fresnel_dielectric(0.1, 1.5, 1.0), 1.0);
/// ```
pub fn fresnel_dielectric(cos_theta_i: f32, eta_i: f32, eta_t: f32) -> f32 {
    let cos_theta_i = cos_theta_i.clamp(0.0, 1.0);
    let sin_theta_i = 1.0.cathetus(cos_theta_i);
    let sin_theta_t = eta_i / eta_t * sin_theta_i;
    if sin_theta_t >= 1.0 {
        return 1.0;
    }
    let cos_theta_t = 1.0.cathetus(sin_theta_t);
    //       /n_i cos_i - n_t cos_t\ 2        /n_t cos_i - n_i cos_t\ 2
    // R_s = |---------------------|    R_p = |---------------------|
    //       \n_i cos_i + n_t cos_t/          \n_t cos_i + n_i cos_t/
    let r_perpendicular = (eta_i * cos_theta_i - eta_t * cos_theta_t)
        / (eta_i * cos_theta_i + eta_t * cos_theta_t);
    let r_parallel = (eta_t * cos_theta_i - eta_i * cos_theta_t)
        / (eta_t * cos_theta_i + eta_i * cos_theta_t);
    (r_parallel.powi(2) + r_perpendicular.powi(2)) * 0.5
}

/// Schlick's approximation of the reflectance at incidence `cos_theta`, given the reflectance
/// `r0` at normal incidence.
/// ```
/// use material::fresnel_schlick;
/// assert_eq!(fresnel_schlick(1.0, 0.3), 0.3);
/// assert_eq!(fresnel_schlick(0.0, 0.3), 1.0);
/// ```
pub fn fresnel_schlick(cos_theta: f32, r0: f32) -> f32 {
    let r0 = r0.clamp(0.0, 1.0);
    r0 + (1.0 - r0) * (1.0 - cos_theta.clamp(0.0, 1.0)).powi(5)
}

/// A surface that adds mirror reflection and, if `kt > 0`, refraction to its local model.
///
/// For transparent surfaces the split between reflection and transmission follows the Fresnel
/// equations, and light that cannot leave through total internal reflection goes to the
/// reflected branch. Opaque surfaces reflect `kr` head-on and more towards grazing angles.
///
/// Rays travelling inside a transparent object hit its far side from behind; such hits receive no
/// direct light and their reflections also count against the internal bounce budget. Opaque
/// surfaces are lit and budgeted the same from either side.
#[derive(Debug, Clone, Copy)]
pub struct Recursive {
    pub local: LocalModel,
    pub kr: f32,
    pub kt: f32,
    pub ior: f32,
    pub transmit_color: Color,
}

impl Recursive {
    pub fn mirror(local: LocalModel, kr: f32) -> Self {
        Self {
            local,
            kr,
            kt: 0.0,
            ior: 1.0,
            transmit_color: Color::white(),
        }
    }

    pub fn transparent(local: LocalModel, kr: f32, kt: f32, ior: f32) -> Self {
        Self {
            local,
            kr,
            kt,
            ior,
            transmit_color: Color::white(),
        }
    }

    /// Reflectance of an opaque surface at incidence `cos_i`, with `kr` as its head-on value.
    /// Transparent surfaces use the dielectric split instead.
    fn reflectance(&self, cos_i: f32) -> f32 {
        if self.kr > 0.0 {
            fresnel_schlick(cos_i, self.kr)
        } else {
            0.0
        }
    }

    /// Tints the light passing through the surface.
    pub fn with_transmit_color(self, transmit_color: Color) -> Self {
        Self {
            transmit_color,
            ..self
        }
    }
}

impl Material for Recursive {
    fn shade<'s>(
        &self,
        hit: &mut Hit<'s>,
        ctx: &mut ShadeContext<'s, '_>,
        depth: Depth,
        sample: Sample,
    ) -> Color {
        // Only a transparent surface seen from behind has the ray travelling inside it.
        let internal = !hit.entering && self.kt > 0.0;
        let mut color = if internal {
            Color::black()
        } else {
            self.local.illuminate(hit, ctx, sample)
        };

        let normal = hit.facing_normal();
        let cos_i = normal.dot(hit.view);
        let outside = ctx.config.outside_ior;
        let (eta_i, eta_t) = if hit.entering {
            (outside, self.ior)
        } else {
            (self.ior, outside)
        };

        let (mut wr, mut wt, mut refracted) = (self.reflectance(cos_i), 0.0, None);
        if self.kt > 0.0 {
            match hcm::refract(normal, hit.view, eta_i / eta_t) {
                Refract::Transmit(dir) => {
                    let fresnel = fresnel_dielectric(cos_i, eta_i, eta_t);
                    wr = self.kr * fresnel;
                    wt = self.kt * (1.0 - fresnel);
                    refracted = dir.try_hat();
                }
                Refract::FullReflect(_) => {
                    ctx.stats().total_internal_reflections += 1;
                    wr = self.kr + self.kt;
                }
            }
        }

        let contribution = hit.max_contribution;
        let cutoff = ctx.config.cutoff;
        let this = hit.surface;

        if wr > 0.0 {
            let next = if internal {
                depth.bounce_inside()
            } else {
                depth.deeper()
            };
            let weight = contribution * wr;
            match next {
                None => ctx.stats().depth_pruned += 1,
                Some(_) if weight <= cutoff => ctx.stats().cutoff_pruned += 1,
                Some(next) => {
                    let dir = hcm::reflect(normal, hit.view);
                    // Seen from outside, a convex surface cannot reflect onto itself.
                    let skip = this.filter(|s| hit.entering && s.is_convex());
                    color += wr * ctx.spawn(hit, dir, next, weight, skip, sample);
                }
            }
        }

        if let Some(dir) = refracted.filter(|_| wt > 0.0) {
            let weight = contribution * wt * self.transmit_color.max_channel();
            match depth.deeper() {
                None => ctx.stats().depth_pruned += 1,
                Some(_) if weight <= cutoff => ctx.stats().cutoff_pruned += 1,
                Some(next) => {
                    // Leaving a convex object, the ray cannot come back to it.
                    let skip = this.filter(|s| !hit.entering && s.is_convex());
                    let through = ctx.spawn(hit, dir, next, weight, skip, sample);
                    color += wt * (self.transmit_color * through);
                }
            }
        }
        color
    }

    fn summary(&self) -> String {
        format!(
            "Recursive{{color = {}, kr = {}, kt = {}, ior = {}}}",
            self.local.color, self.kr, self.kt, self.ior
        )
    }
}

#[cfg(test)]
mod test {
    use super::{fresnel_dielectric, fresnel_schlick};

    #[test]
    fn fresnel_limits() {
        // Grazing incidence reflects everything.
        assert!((fresnel_dielectric(0.0, 1.0, 1.5) - 1.0).abs() < 1e-6);
        // Matched media reflect nothing.
        assert!(fresnel_dielectric(0.6, 1.3, 1.3).abs() < 1e-6);
        // Head-on reflectance is the same from both sides.
        let a = fresnel_dielectric(1.0, 1.0, 1.5);
        let b = fresnel_dielectric(1.0, 1.5, 1.0);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn fresnel_grows_towards_grazing() {
        let mut last = 0.0;
        for i in (1..=10).rev() {
            let f = fresnel_dielectric(i as f32 / 10.0, 1.0, 1.5);
            assert!(f >= last, "{} < {} at cos = {}", f, last, i as f32 / 10.0);
            last = f;
        }
    }

    #[test]
    fn total_internal_reflection() {
        // Critical angle of glass to air: sin = 1/1.5.
        let critical_cos = (1.0f32 - (1.0 / 1.5f32).powi(2)).sqrt();
        assert_eq!(fresnel_dielectric(critical_cos - 0.01, 1.5, 1.0), 1.0);
        assert!(fresnel_dielectric(critical_cos + 0.05, 1.5, 1.0) < 1.0);
    }

    #[test]
    fn opaque_reflectance_grows_towards_grazing() {
        let mut last = 0.0;
        for i in (0..=10).rev() {
            let cos = i as f32 / 10.0;
            let f = fresnel_schlick(cos, 0.5);
            assert!(f >= last, "{} < {} at cos = {}", f, last, cos);
            last = f;
        }
        assert_eq!(fresnel_schlick(0.3, 1.0), 1.0);
        assert_eq!(fresnel_schlick(0.0, 0.5), 1.0);
    }
}
