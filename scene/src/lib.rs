mod error;
pub mod preset;

use std::sync::Arc;

use geometry::ray::Ray;
use light::{Background, Light, Sample};
use material::{Arena, Material, ShadeContext};
use radiometry::color::Color;
use shape::{MaterialId, Surface};

pub use error::SceneError;
pub use material::{ShadeStats, TraceConfig};

/// A validated, read-only collection of surfaces, lights and materials. Once built, it can be
/// shared by any number of rendering threads.
pub struct Scene {
    surfaces: Vec<Box<dyn Surface>>,
    lights: Vec<Box<dyn Light>>,
    materials: Vec<Arc<dyn Material>>,
    background: Background,
    config: TraceConfig,
}

impl Scene {
    /// Checks that the scene can be rendered: it has at least one surface, every material a
    /// surface refers to exists, and the trace constants are valid.
    pub fn new(
        surfaces: Vec<Box<dyn Surface>>,
        lights: Vec<Box<dyn Light>>,
        materials: Vec<Arc<dyn Material>>,
        background: Background,
        config: TraceConfig,
    ) -> Result<Self, SceneError> {
        if surfaces.is_empty() {
            return Err(SceneError::NoSurfaces);
        }
        config.validate().map_err(SceneError::InvalidConfig)?;
        for (index, surface) in surfaces.iter().enumerate() {
            let used = surface.materials();
            if used.is_empty() {
                log::warn!(
                    "surface #{} ({}) has no material and will shade to the error color",
                    index,
                    surface.summary()
                );
            }
            if let Some(id) = used.into_iter().find(|id| id.0 >= materials.len()) {
                return Err(SceneError::UnknownMaterial { surface: index, id });
            }
        }
        log::info!(
            "scene: {} surfaces, {} lights, {} materials, background {:?}",
            surfaces.len(),
            lights.len(),
            materials.len(),
            background
        );
        Ok(Self {
            surfaces,
            lights,
            materials,
            background,
            config,
        })
    }

    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    pub fn surfaces(&self) -> &[Box<dyn Surface>] {
        &self.surfaces
    }
    pub fn lights(&self) -> &[Box<dyn Light>] {
        &self.lights
    }
    pub fn materials(&self) -> &[Arc<dyn Material>] {
        &self.materials
    }
    pub fn background(&self) -> &Background {
        &self.background
    }
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Replaces the trace constants.
    pub fn with_config(self, config: TraceConfig) -> Result<Self, SceneError> {
        config.validate().map_err(SceneError::InvalidConfig)?;
        Ok(Self { config, ..self })
    }
}

/// Collects the parts of a scene; materials are numbered in the order they are added.
#[derive(Default)]
pub struct SceneBuilder {
    surfaces: Vec<Box<dyn Surface>>,
    lights: Vec<Box<dyn Light>>,
    materials: Vec<Arc<dyn Material>>,
    background: Option<Background>,
    config: TraceConfig,
}

impl SceneBuilder {
    /// Adds a material and returns the id surfaces use to refer to it.
    pub fn add_material(&mut self, material: impl Material + 'static) -> MaterialId {
        self.add_shared_material(Arc::new(material))
    }

    pub fn add_shared_material(&mut self, material: Arc<dyn Material>) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_surface(&mut self, surface: impl Surface + 'static) -> &mut Self {
        self.surfaces.push(Box::new(surface));
        self
    }

    pub fn add_light(&mut self, light: impl Light + 'static) -> &mut Self {
        self.lights.push(Box::new(light));
        self
    }

    pub fn background(&mut self, background: Background) -> &mut Self {
        if let Some(old) = self.background.replace(background) {
            log::warn!("Discarding existing background {:?}", old);
        }
        self
    }

    pub fn config(&mut self, config: TraceConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Scene, SceneError> {
        Scene::new(
            self.surfaces,
            self.lights,
            self.materials,
            self.background.unwrap_or_default(),
            self.config,
        )
    }
}

/// Shades one camera ray with a recursion budget of `max_depth` generations.
///
/// Each call sets up fresh scratch storage; renderers that trace many rays should keep a
/// [`Tracer`] per thread instead.
pub fn trace_color(ray: &Ray, scene: &Scene, max_depth: u32) -> Color {
    let config = scene.config.with_max_depth(max_depth);
    let mut arena = Arena::new();
    let mut ctx = ShadeContext::new(
        &scene.surfaces,
        &scene.lights,
        &scene.materials,
        &scene.background,
        &config,
        &mut arena,
    );
    ctx.trace_primary(ray, Sample::default())
}

/// Traces rays through a scene with scratch storage that is reused from ray to ray. Not shared
/// between threads: each rendering worker owns one.
pub struct Tracer<'s> {
    scene: &'s Scene,
    arena: Arena<'s>,
}

impl<'s> Tracer<'s> {
    pub fn new(scene: &'s Scene) -> Self {
        Self {
            scene,
            arena: Arena::new(),
        }
    }

    pub fn trace(&mut self, ray: &Ray, sample: Sample) -> Color {
        let scene = self.scene;
        let mut ctx = ShadeContext::new(
            &scene.surfaces,
            &scene.lights,
            &scene.materials,
            &scene.background,
            &scene.config,
            &mut self.arena,
        );
        ctx.trace_primary(ray, sample)
    }

    pub fn stats(&self) -> &ShadeStats {
        &self.arena.stats
    }

    /// Returns the counters gathered since the last call and resets them.
    pub fn take_stats(&mut self) -> ShadeStats {
        std::mem::take(&mut self.arena.stats)
    }

    /// Scratch values acquired and not yet released; zero between rays.
    pub fn outstanding(&self) -> usize {
        self.arena.outstanding()
    }

    /// Scratch values allocated since the tracer was made.
    pub fn allocated(&self) -> usize {
        self.arena.created()
    }
}
