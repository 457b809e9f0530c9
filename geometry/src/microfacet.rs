use std::f32::consts::PI;

/// Microfacet slope distribution functions. Isotropic, so every function only needs the cosine
/// between the macro-surface normal and the direction in question.
///
/// Models the micro-structure of rough surfaces (metals, plastic, frosted glass) by providing the
/// distribution of microfacet normals as a continuous hemisphere distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MicrofacetDistrib {
    Beckmann { alpha: f32 },
    TrowbridgeReitz { alpha: f32 },
    /// Normalized Blinn-Phong lobe `cos^n`.
    Phong { exponent: f32 },
}

/// How the specular term is attenuated by self-shadowing of the microfacets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attenuation {
    None,
    /// Torrance-Sparrow V-groove model.
    CookTorrance,
    /// Height-correlated Smith masking-shadowing, derived from the distribution's `lambda`.
    Smith,
}

fn tan2_from_cos(cos_theta: f32) -> f32 {
    let cos2 = cos_theta * cos_theta;
    (1.0 - cos2).max(0.0) / cos2
}

impl MicrofacetDistrib {
    pub fn roughness_to_alpha(roughness: f32) -> f32 {
        let x = roughness.max(1e-3).ln();
        1.62142
            + 0.819955 * x
            + 0.1734 * x * x
            + 0.0171201 * x * x * x
            + 0.000640711 * x * x * x * x
    }
    pub fn beckmann(alpha: f32) -> Self {
        Self::Beckmann { alpha }
    }
    pub fn trowbridge_reitz(alpha: f32) -> Self {
        Self::TrowbridgeReitz { alpha }
    }
    pub fn phong(exponent: f32) -> Self {
        Self::Phong { exponent }
    }

    /// Differential area of microfacets whose normal makes angle `acos(cos_theta_h)` with the
    /// surface normal. Should satisfy
    /// ```ignore
    ///  integrate(hemisphere, D(wh) cos_theta(wh) d(wh)) = 1
    /// ```
    pub fn d(&self, cos_theta_h: f32) -> f32 {
        if cos_theta_h <= 0.0 {
            return 0.0;
        }
        let tan2_theta = tan2_from_cos(cos_theta_h);
        let cos4_theta = cos_theta_h.powi(4);
        if tan2_theta.is_infinite() {
            return 0.0;
        }
        match self {
            Self::Beckmann { alpha } => {
                let alpha2 = alpha * alpha;
                (-tan2_theta / alpha2).exp() / (PI * alpha2 * cos4_theta)
            }
            Self::TrowbridgeReitz { alpha } => {
                let alpha2 = alpha * alpha;
                ((1.0 + tan2_theta / alpha2).powi(2) * (PI * alpha2 * cos4_theta)).recip()
            }
            Self::Phong { exponent } => (exponent + 2.0) / (2.0 * PI) * cos_theta_h.powf(*exponent),
        }
    }

    /// Measures invisible masked microfacet area, per visibile microfacet area, or in math:
    ///
    /// A-(w) / (A+(w) - A-(w))
    fn lambda(&self, cos_theta: f32) -> f32 {
        let abs_tan_theta = tan2_from_cos(cos_theta).sqrt();
        if abs_tan_theta.is_infinite() {
            return 0.0;
        }
        let beckmann = |alpha: f32| {
            let a = (alpha * abs_tan_theta).recip();
            if a >= 1.6 {
                0.0
            } else {
                (1.0 - 1.259 * a + 0.396 * a * a) / (3.535 * a + 2.181 * a * a)
            }
        };
        match self {
            Self::Beckmann { alpha } => beckmann(*alpha),
            Self::TrowbridgeReitz { alpha } => {
                let alpha2_tan2_theta = (alpha * abs_tan_theta).powi(2);
                (-1.0 + (1.0 + alpha2_tan2_theta).sqrt()) * 0.5
            }
            // Walter et al.: Phong lobes behave like Beckmann with alpha = sqrt(2 / (n + 2)).
            Self::Phong { exponent } => beckmann((2.0 / (exponent + 2.0)).sqrt()),
        }
    }

    /// Masking function, giving the fraction of microfacets that is visible from a direction at
    /// `acos(cos_theta)` from the normal. This implies the following property:
    /// ```ignore
    /// integrate(g1(w) * max(0.0, dot(w, wh)) * diffarea(wh) d(wh) in hemisphere) = cos_theta(w)
    /// ```
    pub fn g1(&self, cos_theta: f32) -> f32 {
        (1.0 + self.lambda(cos_theta)).recip()
    }

    /// Measures the fraction microfacets visible from both view and light directions, using
    /// (1.0 + Lambda(wo) + Lambda(wi)) ^ {-1}.
    pub fn g(&self, cos_theta_o: f32, cos_theta_i: f32) -> f32 {
        (1.0 + self.lambda(cos_theta_o) + self.lambda(cos_theta_i)).recip()
    }
}

impl Attenuation {
    /// Evaluates the attenuation factor in `[0, 1]`. All arguments are cosines between unit
    /// vectors: normal/half-vector, normal/view, normal/light and view/half-vector.
    /// ```
    /// use geometry::microfacet::{Attenuation, MicrofacetDistrib};
    /// let distrib = MicrofacetDistrib::beckmann(0.3);
    /// // Head-on: nothing is shadowed.
    /// assert_eq!(Attenuation::CookTorrance.factor(&distrib, 1.0, 1.0, 1.0, 1.0), 1.0);
    /// assert_eq!(Attenuation::None.factor(&distrib, 0.2, 0.1, 0.1, 0.3), 1.0);
    /// ```
    pub fn factor(
        &self,
        distrib: &MicrofacetDistrib,
        n_dot_h: f32,
        n_dot_v: f32,
        n_dot_l: f32,
        v_dot_h: f32,
    ) -> f32 {
        match self {
            Self::None => 1.0,
            Self::CookTorrance => {
                if v_dot_h <= 0.0 {
                    return 0.0;
                }
                let masking = 2.0 * n_dot_h * n_dot_v / v_dot_h;
                let shadowing = 2.0 * n_dot_h * n_dot_l / v_dot_h;
                masking.min(shadowing).clamp(0.0, 1.0)
            }
            Self::Smith => distrib.g(n_dot_v, n_dot_l),
        }
    }
}
