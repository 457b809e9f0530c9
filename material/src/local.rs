use geometry::microfacet::{Attenuation, MicrofacetDistrib};
use light::{LightInfo, LightKind, Sample};
use math::hcm::Vec3;
use radiometry::color::Color;
use shape::Hit;

use crate::{Depth, Material, ShadeContext};

/// Direct illumination of a surface point: ambient and Lambertian terms weighted by `kd`, and a
/// microfacet highlight weighted by `ks`.
#[derive(Debug, Clone, Copy)]
pub struct LocalModel {
    pub color: Color,
    pub kd: f32,
    pub ks: f32,
    pub specular_color: Color,
    pub distrib: MicrofacetDistrib,
    pub attenuation: Attenuation,
}

impl LocalModel {
    /// A purely diffuse surface.
    pub fn diffuse(color: Color, kd: f32) -> Self {
        Self {
            color,
            kd,
            ks: 0.0,
            specular_color: Color::white(),
            distrib: MicrofacetDistrib::beckmann(0.3),
            attenuation: Attenuation::None,
        }
    }

    /// Adds a highlight from a Beckmann distribution of the given roughness.
    pub fn with_specular(self, ks: f32, roughness: f32) -> Self {
        let alpha = MicrofacetDistrib::roughness_to_alpha(roughness);
        Self {
            ks,
            distrib: MicrofacetDistrib::beckmann(alpha),
            ..self
        }
    }

    pub fn with_distribution(self, distrib: MicrofacetDistrib) -> Self {
        Self { distrib, ..self }
    }

    pub fn with_attenuation(self, attenuation: Attenuation) -> Self {
        Self {
            attenuation,
            ..self
        }
    }

    pub fn with_specular_color(self, specular_color: Color) -> Self {
        Self {
            specular_color,
            ..self
        }
    }

    /// Sums the contribution of every light at the hit, testing shadows for lights that have a
    /// direction.
    pub fn illuminate<'s>(
        &self,
        hit: &Hit<'s>,
        ctx: &mut ShadeContext<'s, '_>,
        sample: Sample,
    ) -> Color {
        let normal = hit.facing_normal();
        // Seen from outside, a convex surface cannot shadow itself.
        let skip = hit.surface.filter(|s| hit.entering && s.is_convex());
        let lights = ctx.lights;
        ctx.scoped(|ctx, total: &mut Color| {
            for light in lights.iter() {
                *total += ctx.scoped(|ctx, info: &mut LightInfo| {
                    if !light.query_jittered(hit.point, sample, info) {
                        return Color::black();
                    }
                    if info.kind == LightKind::Ambient {
                        return self.kd * self.color * info.color;
                    }
                    let n_dot_l = normal.dot(info.to_light);
                    if n_dot_l <= 0.0 || ctx.shadowed(hit.point, info, skip) {
                        return Color::black();
                    }
                    let mut c = self.kd * n_dot_l * (self.color * info.color);
                    if self.ks > 0.0 {
                        c += self.highlight(ctx, normal, hit.view, n_dot_l, info);
                    }
                    c
                });
            }
            *total
        })
    }

    fn highlight(
        &self,
        ctx: &mut ShadeContext,
        normal: Vec3,
        view: Vec3,
        n_dot_l: f32,
        info: &LightInfo,
    ) -> Color {
        let n_dot_v = normal.dot(view);
        if n_dot_v <= 0.0 {
            return Color::black();
        }
        ctx.scoped(|ctx, half: &mut Vec3| {
            *half = match (info.to_light + view).try_hat() {
                Some(h) => h,
                None => return Color::black(),
            };
            let n_dot_h = normal.dot(*half);
            if n_dot_h < 0.0 {
                // Both the light and the eye are above the surface, so only round-off gets here.
                ctx.reject_dot("N.H", n_dot_h);
                return Color::black();
            }
            let d = self.distrib.d(n_dot_h);
            let g = self
                .attenuation
                .factor(&self.distrib, n_dot_h, n_dot_v, n_dot_l, view.dot(*half));
            self.ks * d * g / (4.0 * n_dot_v) * (self.specular_color * info.color)
        })
    }
}

/// A material with no reflected or transmitted component.
#[derive(Debug, Clone, Copy)]
pub struct LocalOnly {
    pub model: LocalModel,
}

impl LocalOnly {
    pub fn new(model: LocalModel) -> Self {
        Self { model }
    }
    pub fn diffuse(color: Color, kd: f32) -> Self {
        Self::new(LocalModel::diffuse(color, kd))
    }
}

impl Material for LocalOnly {
    fn shade<'s>(
        &self,
        hit: &mut Hit<'s>,
        ctx: &mut ShadeContext<'s, '_>,
        _depth: Depth,
        sample: Sample,
    ) -> Color {
        self.model.illuminate(hit, ctx, sample)
    }

    fn summary(&self) -> String {
        format!(
            "LocalOnly{{color = {}, kd = {}, ks = {}}}",
            self.model.color, self.model.kd, self.model.ks
        )
    }
}
