use math::hcm::{self, Point3, Vec3};
use std::fmt::{Debug, Display, Formatter, Result};

use crate::{MaterialId, Surface};

/// Texture-space coordinates of a hit together with the two tangent directions along which the
/// coordinates grow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextureFrame {
    pub uvw: Point3,
    pub du: Vec3,
    pub dv: Vec3,
}

/// The intersection record threaded through the whole life of a ray.
///
///  - `distance` is the closest hit distance found so far; `+inf` until something is hit. A
///    surface only writes to the record if it finds a hit strictly closer than `distance`.
///  - `point`, `normal`: world-space position and the outward unit normal.
///  - `local_point`, `local_normal`: the same in the frame of the innermost surface (`leaf`).
///  - `entering`: true if the ray crosses from outside to inside the surface.
///  - `surface`: the top-level surface that was hit (a `Transformed` node re-stamps it).
///  - `material`: resolved material, `face`: index of the polyhedron plane that was hit.
///  - `view`: unit vector from the hit point back towards the eye.
///  - `max_contribution`: the largest fraction of the pixel color this ray can still affect.
///
/// Natural parameters and texture coordinates are computed on demand and cached.
#[derive(Clone, Copy)]
pub struct Hit<'s> {
    pub distance: f32,
    pub point: Point3,
    pub normal: Vec3,
    pub local_point: Point3,
    pub local_normal: Vec3,
    pub entering: bool,
    pub surface: Option<&'s dyn Surface>,
    pub leaf: Option<&'s dyn Surface>,
    pub material: Option<MaterialId>,
    pub face: Option<usize>,
    pub view: Vec3,
    pub max_contribution: f32,
    pub(crate) natural: Option<(f32, f32)>,
    pub(crate) texture: Option<TextureFrame>,
}

impl<'s> Default for Hit<'s> {
    fn default() -> Self {
        Hit {
            distance: f32::INFINITY,
            point: Point3::ORIGIN,
            normal: Vec3::ZERO,
            local_point: Point3::ORIGIN,
            local_normal: Vec3::ZERO,
            entering: true,
            surface: None,
            leaf: None,
            material: None,
            face: None,
            view: Vec3::ZERO,
            max_contribution: 1.0,
            natural: None,
            texture: None,
        }
    }
}

impl<'s> Hit<'s> {
    /// Brings a recycled record back to the initial state.
    pub fn reset(&mut self) {
        *self = Hit::default();
    }

    pub fn is_hit(&self) -> bool {
        self.distance.is_finite()
    }

    /// Records a closer hit on a primitive surface. Position and normal are given in the
    /// primitive's own frame, which is also the world frame until an enclosing node maps them.
    pub fn record(
        &mut self,
        surface: &'s dyn Surface,
        distance: f32,
        point: Point3,
        normal: Vec3,
        entering: bool,
    ) {
        debug_assert!(distance < self.distance);
        self.distance = distance;
        self.point = point;
        self.normal = normal;
        self.local_point = point;
        self.local_normal = normal;
        self.entering = entering;
        self.surface = Some(surface);
        self.leaf = Some(surface);
        self.material = surface.material();
        self.face = None;
        self.natural = None;
        self.texture = None;
    }

    /// Returns the natural parameterization of the hit surface, computing it on first use.
    pub fn natural_coords(&mut self) -> (f32, f32) {
        if let Some(uv) = self.natural {
            return uv;
        }
        let leaf = self.leaf;
        let uv = leaf.map_or((0.0, 0.0), |s| s.natural_params(&*self));
        self.natural = Some(uv);
        uv
    }

    /// Returns texture coordinates and tangents, computing them on first use.
    pub fn texture_coords(&mut self) -> TextureFrame {
        if let Some(frame) = self.texture {
            return frame;
        }
        let leaf = self.leaf;
        let frame = match leaf {
            Some(s) => s.texture_frame(&*self),
            None => default_texture_frame(self),
        };
        self.texture = Some(frame);
        frame
    }

    pub fn has_natural_coords(&self) -> bool {
        self.natural.is_some()
    }
    pub fn has_texture_coords(&self) -> bool {
        self.texture.is_some()
    }

    /// The normal flipped, if necessary, to face the viewer.
    pub fn facing_normal(&self) -> Vec3 {
        if self.normal.dot(self.view) < 0.0 {
            -self.normal
        } else {
            self.normal
        }
    }
}

/// Texture coordinates are the local hit position; tangents span the plane perpendicular to the
/// world normal.
pub fn default_texture_frame(hit: &Hit) -> TextureFrame {
    let (du, dv) = match hit.normal.try_hat() {
        Some(n) => hcm::make_coord_system(n),
        None => (Vec3::X, Vec3::Y),
    };
    TextureFrame {
        uvw: hit.local_point,
        du,
        dv,
    }
}

impl<'s> Display for Hit<'s> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "t = {:.3}, pos = {}, normal = {}, {}",
            self.distance,
            self.point,
            self.normal,
            if self.entering { "entering" } else { "leaving" }
        )
    }
}

impl<'s> Debug for Hit<'s> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Hit")
            .field("distance", &self.distance)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("entering", &self.entering)
            .field("surface", &self.surface.map(|s| s.summary()))
            .field("material", &self.material)
            .field("face", &self.face)
            .field("max_contribution", &self.max_contribution)
            .finish()
    }
}
