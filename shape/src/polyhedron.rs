use geometry::bvh::BBox;
use geometry::ray::{Ray, Segment};
use itertools::Itertools;
use math::hcm::{self, Point3, Vec3};

use crate::{Hit, MaterialId, ShapeError, Surface, MIN_DISTANCE};

/// Half-space `normal · p <= offset`. The normal points out of the solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
    pub material: Option<MaterialId>,
}

impl Plane {
    /// The half-space bounded by the plane through `point`, with `normal` pointing outside.
    /// `normal` need not be unit-length; it is normalized by `ConvexPolyhedron::new()`.
    pub fn new(normal: Vec3, point: Point3) -> Self {
        Plane {
            normal,
            offset: normal.dot(Vec3::from(point)),
            material: None,
        }
    }

    /// Overrides the polyhedron's material on this face.
    pub fn with_material(self, material: MaterialId) -> Self {
        Plane {
            material: Some(material),
            ..self
        }
    }

    /// Signed distance of `p` from the plane, positive outside.
    pub fn distance(&self, p: Point3) -> f32 {
        self.normal.dot(Vec3::from(p)) - self.offset
    }
}

/// Outcome of clipping a ray against a set of half-spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clip {
    /// The ray never reaches the region.
    Miss,
    /// The ray starts outside and enters the region through `plane` at `t`.
    Enter { t: f32, plane: usize },
    /// The ray starts inside and leaves the region through `plane` at `t`.
    Exit { t: f32, plane: usize },
    /// The ray starts inside and never crosses a boundary.
    Unbounded,
}

/// Clips the ray against the intersection of the half-spaces in `planes`.
///
/// Any number of planes is accepted: with no planes the whole space is inside and every ray is
/// `Unbounded`.
pub fn clip(planes: &[Plane], r: &Ray) -> Clip {
    let (mut t_enter, mut enter_plane) = (-f32::INFINITY, None);
    let (mut t_exit, mut exit_plane) = (f32::INFINITY, None);
    let mut inside = true;
    for (index, plane) in planes.iter().enumerate() {
        let dist = plane.distance(r.origin);
        let speed = plane.normal.dot(r.dir);
        if dist > 0.0 {
            inside = false;
        }
        if speed == 0.0 {
            if dist > 0.0 {
                // Parallel and outside: nothing inside this half-space is reachable.
                return Clip::Miss;
            }
            continue;
        }
        let t = -dist / speed;
        if speed < 0.0 {
            if t > t_enter {
                t_enter = t;
                enter_plane = Some(index);
            }
        } else if t < t_exit {
            t_exit = t;
            exit_plane = Some(index);
        }
        if t_enter > t_exit {
            return Clip::Miss;
        }
    }

    if inside {
        match exit_plane {
            Some(plane) => Clip::Exit { t: t_exit, plane },
            None => Clip::Unbounded,
        }
    } else if t_exit < 0.0 {
        Clip::Miss
    } else {
        match enter_plane {
            Some(plane) => Clip::Enter { t: t_enter, plane },
            None => Clip::Miss,
        }
    }
}

/// Convex region bounded by planes. The planes are kept in the given order so that hit records
/// can refer to a face by index.
#[derive(Debug, Clone)]
pub struct ConvexPolyhedron {
    planes: Vec<Plane>,
    hull: Option<Vec<Point3>>,
    bbox: Option<BBox>,
    material: Option<MaterialId>,
}

impl ConvexPolyhedron {
    pub fn new(planes: Vec<Plane>) -> Result<Self, ShapeError> {
        if planes.is_empty() {
            return Err(ShapeError::NoPlanes);
        }
        let planes = planes
            .into_iter()
            .enumerate()
            .map(|(index, plane)| {
                let norm = plane.normal.norm();
                if norm > 0.0 && norm.is_finite() {
                    Ok(Plane {
                        normal: plane.normal / norm,
                        offset: plane.offset / norm,
                        material: plane.material,
                    })
                } else {
                    Err(ShapeError::DegeneratePlane(index))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let hull = compute_hull(&planes);
        if hull.is_none() {
            log::debug!("polyhedron with {} planes is unbounded", planes.len());
        }
        let bbox = hull.as_ref().map(|h| BBox::from_points(h.iter()));
        Ok(ConvexPolyhedron {
            planes,
            hull,
            bbox,
            material: None,
        })
    }

    /// Axis-aligned box between two opposite corners.
    pub fn cuboid(min: Point3, max: Point3) -> Result<Self, ShapeError> {
        let b = BBox::new(min, max);
        let (lo, hi) = (b.min(), b.max());
        Self::new(vec![
            Plane::new(Vec3::X, hi),
            Plane::new(-Vec3::X, lo),
            Plane::new(Vec3::Y, hi),
            Plane::new(-Vec3::Y, lo),
            Plane::new(Vec3::Z, hi),
            Plane::new(-Vec3::Z, lo),
        ])
    }

    pub fn with_material(self, material: MaterialId) -> Self {
        Self {
            material: Some(material),
            ..self
        }
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// True if `p` is inside or on every bounding plane.
    pub fn contains(&self, p: Point3) -> bool {
        self.planes.iter().all(|plane| plane.distance(p) <= 0.0)
    }
}

/// Vertices of the polyhedron: every triple-plane intersection that lies within all half-spaces.
/// Returns `None` if the region is unbounded.
fn compute_hull(planes: &[Plane]) -> Option<Vec<Point3>> {
    if recession_direction(planes).is_some() {
        return None;
    }
    let tolerance = 1e-4;
    let vertices = planes
        .iter()
        .tuple_combinations()
        .filter_map(|(p0, p1, p2)| {
            let (n0, n1, n2) = (p0.normal, p1.normal, p2.normal);
            let det = n0.dot(n1.cross(n2));
            if det.abs() < 1e-6 {
                return None;
            }
            let v = (p0.offset * n1.cross(n2) + p1.offset * n2.cross(n0) + p2.offset * n0.cross(n1))
                / det;
            Some(Point3::from(v))
        })
        .filter(|v| planes.iter().all(|plane| plane.distance(*v) <= tolerance))
        .collect::<Vec<_>>();
    // An empty but bounded region has no vertices; an empty hull still culls every ray.
    Some(vertices)
}

/// Finds a direction along which the region extends to infinity, if any.
///
/// The recession cone `{d : n·d <= 0 for every plane}` is either trivial or has an edge along the
/// crossing of two boundary planes (or, when all normals are parallel, along a tangent of one).
fn recession_direction(planes: &[Plane]) -> Option<Vec3> {
    let recedes = |d: Vec3| planes.iter().all(|plane| plane.normal.dot(d) <= 1e-6);
    let crossings = planes
        .iter()
        .tuple_combinations()
        .filter_map(|(p0, p1)| p0.normal.cross(p1.normal).try_hat());
    let tangents = planes.iter().flat_map(|plane| {
        let (u, v) = hcm::make_coord_system(plane.normal);
        vec![u, v]
    });
    crossings
        .chain(tangents)
        .flat_map(|d| vec![d, -d])
        .find(|d| recedes(*d))
}

impl Surface for ConvexPolyhedron {
    fn summary(&self) -> String {
        format!(
            "ConvexPolyhedron({} planes, {})",
            self.planes.len(),
            if self.hull.is_some() {
                "bounded"
            } else {
                "unbounded"
            }
        )
    }
    fn is_convex(&self) -> bool {
        true
    }
    fn hull(&self) -> Option<&[Point3]> {
        self.hull.as_deref()
    }
    fn bbox(&self) -> Option<&BBox> {
        self.bbox.as_ref()
    }

    fn intersect<'s>(&'s self, r: &Ray, hit: &mut Hit<'s>) -> bool {
        let (t, plane, entering) = match clip(&self.planes, r) {
            Clip::Enter { t, plane } => (t, plane, true),
            Clip::Exit { t, plane } => (t, plane, false),
            Clip::Miss | Clip::Unbounded => return false,
        };
        if t <= MIN_DISTANCE || t >= hit.distance {
            return false;
        }
        let face = &self.planes[plane];
        hit.record(self, t, r.position_at(t), face.normal, entering);
        hit.face = Some(plane);
        if let Some(m) = face.material {
            hit.material = Some(m);
        }
        true
    }

    fn occludes(&self, s: &Segment) -> bool {
        match clip(&self.planes, &s.as_ray()) {
            Clip::Enter { t, .. } | Clip::Exit { t, .. } => t > MIN_DISTANCE && s.covers(t),
            Clip::Miss | Clip::Unbounded => false,
        }
    }

    /// Coordinates of the hit in the tangent frame of the face it lies on.
    fn natural_params(&self, hit: &Hit) -> (f32, f32) {
        let normal = hit
            .face
            .and_then(|i| self.planes.get(i))
            .map_or(hit.local_normal, |plane| plane.normal);
        let (du, dv) = hcm::make_coord_system(normal);
        let p = Vec3::from(hit.local_point);
        (p.dot(du), p.dot(dv))
    }

    fn material(&self) -> Option<MaterialId> {
        self.material
    }

    fn materials(&self) -> Vec<MaterialId> {
        self.material
            .into_iter()
            .chain(self.planes.iter().filter_map(|p| p.material))
            .collect()
    }
}
