use std::sync::Arc;

use light::Sample;
use radiometry::color::Color;
use shape::Hit;

use crate::{Depth, Material, ShadeContext};

/// Rules that split a surface into two alternating regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    /// 3D checkerboard of cubes with side `1 / scale` over the texture coordinates.
    Checker { scale: f32 },
    /// Slabs of width `1 / scale` perpendicular to texture axis `axis` (0, 1 or 2).
    Stripes { scale: f32, axis: usize },
    /// Checkerboard over the surface's natural (u, v) parameters.
    Grid { u_cells: u32, v_cells: u32 },
}

impl Pattern {
    /// True if the hit falls in the first region.
    pub fn first(&self, hit: &mut Hit) -> bool {
        let parity = |x: f32| (x.floor() as i64).rem_euclid(2);
        match *self {
            Self::Checker { scale } => {
                let p = hit.texture_coords().uvw;
                (parity(p.x * scale) + parity(p.y * scale) + parity(p.z * scale)) % 2 == 0
            }
            Self::Stripes { scale, axis } => {
                let p = hit.texture_coords().uvw;
                let coord = match axis {
                    0 => p.x,
                    1 => p.y,
                    _ => p.z,
                };
                parity(coord * scale) == 0
            }
            Self::Grid { u_cells, v_cells } => {
                let (u, v) = hit.natural_coords();
                (parity(u * u_cells as f32) + parity(v * v_cells as f32)) % 2 == 0
            }
        }
    }
}

/// Shades with one of two materials depending on where the hit falls in a pattern.
pub struct TexturePattern {
    pattern: Pattern,
    first: Arc<dyn Material>,
    second: Arc<dyn Material>,
}

impl TexturePattern {
    pub fn new(pattern: Pattern, first: Arc<dyn Material>, second: Arc<dyn Material>) -> Self {
        Self {
            pattern,
            first,
            second,
        }
    }
}

impl Material for TexturePattern {
    fn shade<'s>(
        &self,
        hit: &mut Hit<'s>,
        ctx: &mut ShadeContext<'s, '_>,
        depth: Depth,
        sample: Sample,
    ) -> Color {
        let chosen = if self.pattern.first(hit) {
            &self.first
        } else {
            &self.second
        };
        chosen.shade(hit, ctx, depth, sample)
    }

    fn summary(&self) -> String {
        format!(
            "Pattern({:?}, {}, {})",
            self.pattern,
            self.first.summary(),
            self.second.summary()
        )
    }
}
