mod error;
mod hit;
mod polyhedron;
mod quadric;
mod transformed;

use geometry::bvh::BBox;
use geometry::ray::{Ray, Segment};
use math::hcm::Point3;

pub use error::ShapeError;
pub use hit::{default_texture_frame, Hit, TextureFrame};
pub use polyhedron::{clip, Clip, ConvexPolyhedron, Plane};
pub use quadric::{Quadric, QuadricForm, QuadricKind, Root, Roots};
pub use transformed::{Transformed, TransformedBuilder};

/// Hits closer than this to the ray origin are ignored.
pub const MIN_DISTANCE: f32 = 1e-6;

/// Index into the scene's material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// Represents the characteristics of an analytic surface: it knows whether it bounds a convex
/// region, may provide a bounding hull, and can intersect rays and shadow segments.
/// - See `quadric.rs` for the second-degree surfaces: spheres, cylinders, cones and others.
/// - See `polyhedron.rs` for convex regions bounded by planes.
/// - See `transformed.rs` for the node that places another surface in a parent frame.
pub trait Surface: Send + Sync {
    fn summary(&self) -> String;

    /// True if the region bounded by the surface is convex. A convex surface can never shadow
    /// or reflect onto itself.
    fn is_convex(&self) -> bool;

    /// Points whose convex hull encloses the surface. `None` if the surface is unbounded and must
    /// always be tested.
    fn hull(&self) -> Option<&[Point3]>;

    /// Axis-aligned box around `hull()`.
    fn bbox(&self) -> Option<&BBox>;

    /// Cheap test run before `intersect()`: false only if the ray cannot hit the surface closer
    /// than `limit`.
    fn pretest(&self, r: &Ray, limit: f32) -> bool {
        match self.bbox() {
            None => true,
            Some(b) => b.slab_test(r).map_or(false, |slab| slab.t_enter < limit),
        }
    }

    /// Intersects the ray with the surface. If a hit closer than `hit.distance` is found, the
    /// record is updated and true is returned; otherwise the record is left untouched.
    fn intersect<'s>(&'s self, r: &Ray, hit: &mut Hit<'s>) -> bool;

    /// True if the surface crosses the segment anywhere strictly between its ends.
    fn occludes(&self, s: &Segment) -> bool;

    /// Surface-intrinsic (u, v) parameters of a hit on this surface, evaluated from the hit's
    /// local point and normal.
    fn natural_params(&self, hit: &Hit) -> (f32, f32);

    fn texture_frame(&self, hit: &Hit) -> TextureFrame {
        default_texture_frame(hit)
    }

    /// The default material of the surface.
    fn material(&self) -> Option<MaterialId>;

    /// Every material this surface or its parts may assign to a hit.
    fn materials(&self) -> Vec<MaterialId> {
        self.material().into_iter().collect()
    }
}

/// Identity comparison of two surfaces.
pub fn same_surface(a: &dyn Surface, b: &dyn Surface) -> bool {
    std::ptr::addr_eq(a, b)
}

/// Tightens `hit` to the closest hit among `surfaces`, skipping `skip`. Returns true if `hit`
/// was updated.
pub fn closest_hit<'s>(
    surfaces: &'s [Box<dyn Surface>],
    r: &Ray,
    hit: &mut Hit<'s>,
    skip: Option<&dyn Surface>,
) -> bool {
    let mut found = false;
    for surface in surfaces.iter() {
        let surface = surface.as_ref();
        if skip.map_or(false, |s| same_surface(s, surface)) {
            continue;
        }
        if surface.pretest(r, hit.distance) && surface.intersect(r, hit) {
            found = true;
        }
    }
    found
}

/// True if any of `surfaces` other than `skip` blocks the segment.
pub fn occluded(surfaces: &[Box<dyn Surface>], s: &Segment, skip: Option<&dyn Surface>) -> bool {
    let r = s.as_ray();
    surfaces.iter().any(|surface| {
        let surface = surface.as_ref();
        !skip.map_or(false, |k| same_surface(k, surface))
            && surface.pretest(&r, s.length)
            && surface.occludes(s)
    })
}
