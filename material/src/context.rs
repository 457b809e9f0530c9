use std::sync::Arc;

use geometry::ray::{Ray, Segment};
use light::{Background, Light, LightInfo, Sample};
use math::hcm::{Point3, Vec3};
use radiometry::color::Color;
use shape::{closest_hit, occluded, Hit, Surface};

use crate::arena::{with_scratch, ArenaOwner};
use crate::{Arena, Depth, Material, Scratch, ShadeStats, TraceConfig};

/// Everything a material needs to shade a hit: the read-only scene, the tracing constants and the
/// worker's scratch arena. Materials call back into it to trace reflected and transmitted rays.
pub struct ShadeContext<'s, 'a> {
    pub surfaces: &'s [Box<dyn Surface>],
    pub lights: &'s [Box<dyn Light>],
    pub materials: &'s [Arc<dyn Material>],
    pub background: &'s Background,
    pub config: &'s TraceConfig,
    arena: &'a mut Arena<'s>,
}

impl<'s> ArenaOwner<'s> for ShadeContext<'s, '_> {
    fn arena(&mut self) -> &mut Arena<'s> {
        &mut *self.arena
    }
}

impl<'s, 'a> ShadeContext<'s, 'a> {
    pub fn new(
        surfaces: &'s [Box<dyn Surface>],
        lights: &'s [Box<dyn Light>],
        materials: &'s [Arc<dyn Material>],
        background: &'s Background,
        config: &'s TraceConfig,
        arena: &'a mut Arena<'s>,
    ) -> Self {
        Self {
            surfaces,
            lights,
            materials,
            background,
            config,
            arena,
        }
    }

    pub fn stats(&mut self) -> &mut ShadeStats {
        &mut self.arena.stats
    }

    /// Runs `f` with a scratch value from the arena; the value goes back to its pool however `f`
    /// exits.
    pub fn scoped<T: Scratch<'s>, R>(&mut self, f: impl FnOnce(&mut Self, &mut T) -> R) -> R {
        with_scratch(self, f)
    }

    /// Shades a camera ray with the full depth budget.
    pub fn trace_primary(&mut self, ray: &Ray, sample: Sample) -> Color {
        self.arena.stats.primary_rays += 1;
        let depth = Depth::new(self.config.max_depth, self.config.internal_reflections);
        self.trace(ray, depth, 1.0, None, sample)
    }

    /// Finds the closest hit along `ray` (ignoring `skip`) and shades it, or returns the
    /// background if nothing is hit. `contribution` is the largest fraction of the pixel that the
    /// result can affect.
    pub fn trace(
        &mut self,
        ray: &Ray,
        depth: Depth,
        contribution: f32,
        skip: Option<&'s dyn Surface>,
        sample: Sample,
    ) -> Color {
        self.scoped(|ctx, hit: &mut Hit<'s>| {
            hit.max_contribution = contribution;
            if !closest_hit(ctx.surfaces, ray, hit, skip) {
                return ctx.background.color_for(ray);
            }
            hit.view = -ray.dir;
            ctx.shade(hit, depth, sample)
        })
    }

    /// Traces a secondary ray that leaves the point of `from` in direction `dir`.
    pub fn spawn(
        &mut self,
        from: &Hit<'s>,
        dir: Vec3,
        depth: Depth,
        contribution: f32,
        skip: Option<&'s dyn Surface>,
        sample: Sample,
    ) -> Color {
        self.arena.stats.secondary_rays += 1;
        let ray = Ray::spawn(from.point, dir, self.config.epsilon);
        self.trace(&ray, depth, contribution, skip, sample)
    }

    /// Runs the hit's material. Hits without a material and non-finite results shade to the
    /// configured error color.
    pub fn shade(&mut self, hit: &mut Hit<'s>, depth: Depth, sample: Sample) -> Color {
        let materials = self.materials;
        let material = match hit.material.and_then(|id| materials.get(id.0)) {
            Some(m) => m,
            None => return self.fallback(hit, "no material"),
        };
        let color = material.shade(hit, self, depth, sample);
        if color.is_finite() {
            color
        } else {
            self.fallback(hit, "non-finite color")
        }
    }

    /// True if some surface other than `skip` blocks the light described by `info` from `point`.
    pub fn shadowed(
        &mut self,
        point: Point3,
        info: &LightInfo,
        skip: Option<&'s dyn Surface>,
    ) -> bool {
        self.arena.stats.shadow_rays += 1;
        let eps = self.config.epsilon;
        let surfaces = self.surfaces;
        self.scoped(|_, segment: &mut Segment| {
            segment.set(
                point + info.to_light * eps,
                info.to_light,
                info.distance - eps,
            );
            occluded(surfaces, segment, skip)
        })
    }

    /// Counts a dot product that came out on the wrong side of zero through round-off.
    pub fn reject_dot(&mut self, what: &str, value: f32) {
        self.arena.stats.rejected_dots += 1;
        log::trace!("rejected {} = {}", what, value);
    }

    fn fallback(&mut self, hit: &Hit, reason: &str) -> Color {
        self.arena.stats.error_fallbacks += 1;
        log::debug!("{} at {}, using error color", reason, hit);
        self.config.error_color
    }
}
