use std::f32::consts::PI;

use geometry::bvh::BBox;
use geometry::ray::{Ray, Segment};
use math::hcm::{Mat3, Point3, Vec3};

use crate::{Hit, MaterialId, ShapeError, Surface, MIN_DISTANCE};

/// Coefficients of the implicit second-degree equation
///
///   a x² + b y² + c z² + d xy + e yz + f zx + g x + h y + i z + j = 0
///
/// The region where the left side is negative is the inside of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuadricForm {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
    pub g: f32,
    pub h: f32,
    pub i: f32,
    pub j: f32,
}

impl QuadricForm {
    /// Evaluates the field at `p`; positive outside, negative inside.
    pub fn value(&self, p: Point3) -> f32 {
        let Point3 { x, y, z } = p;
        self.quadratic(Vec3::new(x, y, z)) + self.g * x + self.h * y + self.i * z + self.j
    }

    /// Only the second-degree terms evaluated at `v`.
    fn quadratic(&self, v: Vec3) -> f32 {
        let Vec3 { x, y, z } = v;
        self.a * x * x
            + self.b * y * y
            + self.c * z * z
            + self.d * x * y
            + self.e * y * z
            + self.f * z * x
    }

    /// Gradient of the field at `p`; points outward on the surface.
    pub fn gradient(&self, p: Point3) -> Vec3 {
        let Point3 { x, y, z } = p;
        Vec3::new(
            2.0 * self.a * x + self.d * y + self.f * z + self.g,
            2.0 * self.b * y + self.d * x + self.e * z + self.h,
            2.0 * self.c * z + self.e * y + self.f * x + self.i,
        )
    }

    /// Symmetric matrix `A` such that the second-degree part equals `pᵀ A p`.
    pub fn quadratic_part(&self) -> Mat3 {
        Mat3::symmetric(
            Vec3::new(self.a, self.b, self.c),
            Vec3::new(self.d, self.e, self.f) * 0.5,
        )
    }

    /// Coefficients `(qa, qb, qc)` of `qa t² + qb t + qc = 0` for points along the ray.
    pub fn ray_coefficients(&self, r: &Ray) -> (f32, f32, f32) {
        let qa = self.quadratic(r.dir);
        let qb = self.gradient(r.origin).dot(r.dir);
        let qc = self.value(r.origin);
        (qa, qb, qc)
    }

    fn is_degenerate(&self) -> bool {
        let terms = [
            self.a, self.b, self.c, self.d, self.e, self.f, self.g, self.h, self.i,
        ];
        terms.iter().all(|x| *x == 0.0)
    }
}

/// Named members of the quadric family. Decides natural parameterization and boundedness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadricKind {
    Ellipsoid { center: Point3, radii: Vec3 },
    Cylinder,
    Cone,
    Paraboloid,
    HyperboloidOneSheet,
    HyperboloidTwoSheets,
    HyperbolicParaboloid,
    General,
}

/// A root of the ray equation, tagged with the side the ray goes to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub t: f32,
    pub entering: bool,
}

/// Outcome of solving a ray against a quadric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roots {
    /// No real root; the ray origin is outside.
    MissOutside,
    /// No real root; the ray origin is inside.
    MissInside,
    /// The ray equation degenerated to a linear one.
    Single(Root),
    /// Two roots with `near.t <= far.t`. A tangent ray has both roots equal.
    Pair { near: Root, far: Root },
}

impl Roots {
    /// The nearest root in `(MIN_DISTANCE, limit)`.
    pub fn first_within(&self, limit: f32) -> Option<Root> {
        let valid = |root: &Root| root.t > MIN_DISTANCE && root.t < limit;
        match self {
            Roots::MissOutside | Roots::MissInside => None,
            Roots::Single(root) => Some(*root).filter(valid),
            Roots::Pair { near, far } => Some(*near).filter(valid).or(Some(*far).filter(valid)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Quadric {
    form: QuadricForm,
    kind: QuadricKind,
    convex: bool,
    hull: Option<Vec<Point3>>,
    bbox: Option<BBox>,
    material: Option<MaterialId>,
}

fn positive(name: &'static str, value: f32) -> Result<f32, ShapeError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ShapeError::NonPositiveParameter { name, value })
    }
}

fn positive_radius(r: f32) -> Result<f32, ShapeError> {
    if r > 0.0 && r.is_finite() {
        Ok(r)
    } else {
        Err(ShapeError::NonPositiveRadius(r))
    }
}

impl Quadric {
    fn build(form: QuadricForm, kind: QuadricKind) -> Self {
        // The inside is convex iff the quadratic part is positive semidefinite.
        let convex = form.quadratic_part().principal_minors_non_negative(1e-6);
        let hull = match kind {
            QuadricKind::Ellipsoid { center, radii } => {
                let corners = BBox::new(center - radii, center + radii).all_corners();
                Some(corners.to_vec())
            }
            _ => None,
        };
        let bbox = hull.as_ref().map(|h| BBox::from_points(h.iter()));
        Quadric {
            form,
            kind,
            convex,
            hull,
            bbox,
            material: None,
        }
    }

    pub fn sphere(radius: f32) -> Result<Self, ShapeError> {
        Self::sphere_at(Point3::ORIGIN, radius)
    }

    /// Sphere of `radius` centered at `center`:  |p - center|² - r² = 0.
    pub fn sphere_at(center: Point3, radius: f32) -> Result<Self, ShapeError> {
        let r = positive_radius(radius)?;
        let c = Vec3::from(center);
        let form = QuadricForm {
            a: 1.0,
            b: 1.0,
            c: 1.0,
            g: -2.0 * c.x,
            h: -2.0 * c.y,
            i: -2.0 * c.z,
            j: c.norm_squared() - r * r,
            ..Default::default()
        };
        let radii = Vec3::new(r, r, r);
        Ok(Self::build(form, QuadricKind::Ellipsoid { center, radii }))
    }

    /// Axis-aligned ellipsoid centered at the origin.
    pub fn ellipsoid(rx: f32, ry: f32, rz: f32) -> Result<Self, ShapeError> {
        let (rx, ry, rz) = (positive_radius(rx)?, positive_radius(ry)?, positive_radius(rz)?);
        let form = QuadricForm {
            a: (rx * rx).recip(),
            b: (ry * ry).recip(),
            c: (rz * rz).recip(),
            j: -1.0,
            ..Default::default()
        };
        let kind = QuadricKind::Ellipsoid {
            center: Point3::ORIGIN,
            radii: Vec3::new(rx, ry, rz),
        };
        Ok(Self::build(form, kind))
    }

    /// Infinite cylinder around the z-axis: x² + y² = r².
    pub fn cylinder(radius: f32) -> Result<Self, ShapeError> {
        let r = positive_radius(radius)?;
        let form = QuadricForm {
            a: 1.0,
            b: 1.0,
            j: -r * r,
            ..Default::default()
        };
        Ok(Self::build(form, QuadricKind::Cylinder))
    }

    /// Double cone around the z-axis with apex at the origin: x² + y² = (slope·z)².
    pub fn cone(slope: f32) -> Result<Self, ShapeError> {
        let s = positive("slope", slope)?;
        let form = QuadricForm {
            a: 1.0,
            b: 1.0,
            c: -s * s,
            ..Default::default()
        };
        Ok(Self::build(form, QuadricKind::Cone))
    }

    /// Paraboloid opening towards +z: x² + y² = k·z.
    pub fn paraboloid(k: f32) -> Result<Self, ShapeError> {
        let k = positive("k", k)?;
        let form = QuadricForm {
            a: 1.0,
            b: 1.0,
            i: -k,
            ..Default::default()
        };
        Ok(Self::build(form, QuadricKind::Paraboloid))
    }

    /// (x² + y²) / a² - z² / c² = 1, a single connected sheet with waist radius `a`.
    pub fn hyperboloid_one_sheet(a: f32, c: f32) -> Result<Self, ShapeError> {
        let (a, c) = (positive("a", a)?, positive("c", c)?);
        let form = QuadricForm {
            a: (a * a).recip(),
            b: (a * a).recip(),
            c: -(c * c).recip(),
            j: -1.0,
            ..Default::default()
        };
        Ok(Self::build(form, QuadricKind::HyperboloidOneSheet))
    }

    /// z² / c² - (x² + y²) / a² = 1, two sheets with vertices at z = ±c. The inside is the pair
    /// of regions enclosed by the sheets.
    pub fn hyperboloid_two_sheets(a: f32, c: f32) -> Result<Self, ShapeError> {
        let (a, c) = (positive("a", a)?, positive("c", c)?);
        let form = QuadricForm {
            a: (a * a).recip(),
            b: (a * a).recip(),
            c: -(c * c).recip(),
            j: 1.0,
            ..Default::default()
        };
        Ok(Self::build(form, QuadricKind::HyperboloidTwoSheets))
    }

    /// Saddle surface x² / a² - y² / b² = z.
    pub fn hyperbolic_paraboloid(a: f32, b: f32) -> Result<Self, ShapeError> {
        let (a, b) = (positive("a", a)?, positive("b", b)?);
        let form = QuadricForm {
            a: (a * a).recip(),
            b: -(b * b).recip(),
            i: -1.0,
            ..Default::default()
        };
        Ok(Self::build(form, QuadricKind::HyperbolicParaboloid))
    }

    /// A quadric with arbitrary coefficients. Unbounded as far as pretests are concerned.
    pub fn from_form(form: QuadricForm) -> Result<Self, ShapeError> {
        if form.is_degenerate() {
            return Err(ShapeError::DegenerateQuadric);
        }
        Ok(Self::build(form, QuadricKind::General))
    }

    pub fn with_material(self, material: MaterialId) -> Self {
        Self {
            material: Some(material),
            ..self
        }
    }

    pub fn form(&self) -> &QuadricForm {
        &self.form
    }
    pub fn kind(&self) -> QuadricKind {
        self.kind
    }

    /// Outward unit normal at `p`. Falls back to `fallback` where the gradient vanishes (the apex
    /// of a cone).
    pub fn normal_at(&self, p: Point3, fallback: Vec3) -> Vec3 {
        self.form.gradient(p).try_hat().unwrap_or(fallback)
    }

    fn classify(&self, r: &Ray, t: f32) -> bool {
        self.form.gradient(r.position_at(t)).dot(r.dir) < 0.0
    }

    /// Solves the ray against the implicit equation and classifies the roots.
    pub fn solve(&self, r: &Ray) -> Roots {
        let (qa, qb, qc) = self.form.ray_coefficients(r);
        let miss = if qc > 0.0 {
            Roots::MissOutside
        } else {
            Roots::MissInside
        };

        let scale = qb.abs().max(qc.abs()).max(1.0);
        if qa.abs() <= 1e-7 * scale {
            // Linear along this ray.
            if qb == 0.0 {
                return miss;
            }
            let t = -qc / qb;
            return Roots::Single(Root {
                t,
                entering: self.classify(r, t),
            });
        }

        let mut discriminant = qb * qb - 4.0 * qa * qc;
        if discriminant < 0.0 {
            if discriminant > -1e-6 * qb * qb {
                discriminant = 0.0;
            } else {
                return miss;
            }
        }
        // Numerically stable form: q = -(b + sign(b)·sqrt(disc)) / 2, roots are q/a and c/q.
        let sqrt_disc = discriminant.sqrt();
        let q = -0.5 * (qb + qb.signum() * sqrt_disc);
        let (t0, t1) = if q == 0.0 {
            let t = -qb / (2.0 * qa);
            (t, t)
        } else {
            (q / qa, qc / q)
        };
        let (near, far) = math::float::min_max(t0, t1);
        let (near_entering, far_entering) = if self.convex {
            (true, false)
        } else {
            (self.classify(r, near), self.classify(r, far))
        };
        Roots::Pair {
            near: Root {
                t: near,
                entering: near_entering,
            },
            far: Root {
                t: far,
                entering: far_entering,
            },
        }
    }
}

impl Surface for Quadric {
    fn summary(&self) -> String {
        format!(
            "Quadric({:?}, {})",
            self.kind,
            if self.convex { "convex" } else { "non-convex" }
        )
    }
    fn is_convex(&self) -> bool {
        self.convex
    }
    fn hull(&self) -> Option<&[Point3]> {
        self.hull.as_deref()
    }
    fn bbox(&self) -> Option<&BBox> {
        self.bbox.as_ref()
    }

    fn intersect<'s>(&'s self, r: &Ray, hit: &mut Hit<'s>) -> bool {
        let root = match self.solve(r).first_within(hit.distance) {
            None => return false,
            Some(root) => root,
        };
        let point = r.position_at(root.t);
        let normal = self.normal_at(point, -r.dir);
        hit.record(self, root.t, point, normal, root.entering);
        true
    }

    fn occludes(&self, s: &Segment) -> bool {
        self.solve(&s.as_ray())
            .first_within(s.length)
            .is_some()
    }

    fn natural_params(&self, hit: &Hit) -> (f32, f32) {
        let p = hit.local_point;
        match self.kind {
            QuadricKind::Ellipsoid { center, radii } => {
                let q = p - center;
                let unit = Vec3::new(q.x / radii.x, q.y / radii.y, q.z / radii.z);
                let longitude = unit.y.atan2(unit.x) / (2.0 * PI) + 0.5;
                let latitude = 0.5 + unit.z.clamp(-1.0, 1.0).asin() / PI;
                (longitude, latitude)
            }
            _ => (p.y.atan2(p.x) / (2.0 * PI) + 0.5, p.z),
        }
    }

    fn material(&self) -> Option<MaterialId> {
        self.material
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use math::assert_close;
    use math::hcm::{Point3, Vec3};

    #[test]
    fn unit_sphere_scenario() {
        let sphere = Quadric::sphere(1.0).unwrap();
        let r = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let mut hit = Hit::default();
        assert!(sphere.intersect(&r, &mut hit));
        assert_eq!(hit.distance, 4.0);
        assert_close!(hit.point, Point3::new(0.0, 0.0, 1.0));
        assert_close!(hit.normal, Vec3::Z);
        assert!(hit.entering);
    }

    #[test]
    fn tangent_ray_is_a_hit() {
        let sphere = Quadric::sphere(1.0).unwrap();
        let r = Ray::new(Point3::new(1.0, 0.0, 5.0), -Vec3::Z);
        match sphere.solve(&r) {
            Roots::Pair { near, far } => {
                assert!((near.t - 5.0).abs() < 1e-4);
                assert!((far.t - near.t).abs() < 1e-4);
            }
            other => panic!("expected a tangent hit, got {:?}", other),
        }
        let mut hit = Hit::default();
        assert!(sphere.intersect(&r, &mut hit));
        assert_close!(hit.point, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn miss_reports_origin_side() {
        let sphere = Quadric::sphere(1.0).unwrap();
        let r = Ray::new(Point3::new(3.0, 0.0, 5.0), -Vec3::Z);
        assert_eq!(sphere.solve(&r), Roots::MissOutside);
        // Inside an infinite cylinder, running parallel to its axis.
        let cylinder = Quadric::cylinder(1.0).unwrap();
        let r = Ray::new(Point3::new(0.5, 0.0, 0.0), Vec3::Z);
        assert_eq!(cylinder.solve(&r), Roots::MissInside);
    }

    #[test]
    fn convex_near_root_enters() {
        for q in [
            Quadric::sphere(2.0).unwrap(),
            Quadric::ellipsoid(1.0, 2.0, 3.0).unwrap(),
            Quadric::cylinder(1.5).unwrap(),
            Quadric::paraboloid(1.0).unwrap(),
        ] {
            assert!(q.is_convex(), "{}", q.summary());
            let r = Ray::new(Point3::new(-10.0, 0.3, 0.5), Vec3::X);
            match q.solve(&r) {
                Roots::Pair { near, far } => {
                    assert!(near.entering && !far.entering, "{}", q.summary());
                }
                other => panic!("{}: {:?}", q.summary(), other),
            }
        }
    }

    #[test]
    fn non_convex_roots_are_classified_by_gradient() {
        // The ray crosses the upper nappe of the cone: in through the side, out through the side.
        let cone = Quadric::cone(1.0).unwrap();
        assert!(!cone.is_convex());
        let r = Ray::new(Point3::new(-10.0, 0.0, 2.0), Vec3::X);
        match cone.solve(&r) {
            Roots::Pair { near, far } => {
                assert!((near.t - 8.0).abs() < 1e-4);
                assert!((far.t - 12.0).abs() < 1e-4);
                assert!(near.entering);
                assert!(!far.entering);
            }
            other => panic!("{:?}", other),
        }

        // Across the waist of a hyperboloid: the inside is the (non-convex) hole.
        let hyper = Quadric::hyperboloid_one_sheet(1.0, 1.0).unwrap();
        assert!(!hyper.is_convex());
        let r = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::X);
        match hyper.solve(&r) {
            Roots::Pair { near, far } => {
                assert!((near.t - 9.0).abs() < 1e-4);
                assert!(near.entering);
                assert!(!far.entering);
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn linear_branch() {
        // Parallel to the paraboloid axis: a single crossing.
        let para = Quadric::paraboloid(1.0).unwrap();
        let r = Ray::new(Point3::new(1.0, 0.0, -5.0), Vec3::Z);
        match para.solve(&r) {
            Roots::Single(root) => {
                assert!((root.t - 6.0).abs() < 1e-5);
                assert!(root.entering);
            }
            other => panic!("{:?}", other),
        }

        // The saddle is linear along z: x² - y² = z crossed at z = 0.25.
        let saddle = Quadric::hyperbolic_paraboloid(1.0, 1.0).unwrap();
        let r = Ray::new(Point3::new(0.5, 0.0, 5.0), -Vec3::Z);
        match saddle.solve(&r) {
            Roots::Single(root) => {
                assert!((root.t - 4.75).abs() < 1e-5);
                assert!(!root.entering);
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn two_sheets_are_left_then_entered() {
        // Starting inside the upper sheet, the ray leaves it at z = 1 and enters the lower one
        // at z = -1.
        let hyper = Quadric::hyperboloid_two_sheets(1.0, 1.0).unwrap();
        assert!(!hyper.is_convex());
        let r = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z);
        match hyper.solve(&r) {
            Roots::Pair { near, far } => {
                assert!((near.t - 4.0).abs() < 1e-4);
                assert!((far.t - 6.0).abs() < 1e-4);
                assert!(!near.entering);
                assert!(far.entering);
            }
            other => panic!("{:?}", other),
        }
        let mut hit = Hit::default();
        assert!(hyper.intersect(&r, &mut hit));
        assert_close!(hit.normal, -Vec3::Z);
    }

    #[test]
    fn farther_hits_leave_record_untouched() {
        let sphere = Quadric::sphere(1.0).unwrap();
        let r = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let mut hit = Hit {
            distance: 3.0,
            ..Default::default()
        };
        assert!(!sphere.intersect(&r, &mut hit));
        assert_eq!(hit.distance, 3.0);
        assert!(hit.surface.is_none());
        // Sphere entirely behind the origin.
        let r = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::Z);
        let mut hit = Hit::default();
        assert!(!sphere.intersect(&r, &mut hit));
        assert!(!hit.is_hit());
    }

    #[test]
    fn invalid_parameters_fail() {
        assert_eq!(
            Quadric::sphere(0.0).unwrap_err(),
            ShapeError::NonPositiveRadius(0.0)
        );
        assert!(matches!(
            Quadric::cone(-1.0),
            Err(ShapeError::NonPositiveParameter { name: "slope", .. })
        ));
        assert_eq!(
            Quadric::from_form(QuadricForm {
                j: 1.0,
                ..Default::default()
            })
            .unwrap_err(),
            ShapeError::DegenerateQuadric
        );
    }

    #[test]
    fn sphere_at_has_hull_around_center() {
        let s = Quadric::sphere_at(Point3::new(3.0, 0.0, 0.0), 0.5).unwrap();
        let bbox = s.bbox().unwrap();
        assert!(bbox.contains(Point3::new(3.4, 0.0, 0.0)));
        assert!(!bbox.contains(Point3::ORIGIN));
        assert!(Quadric::cone(1.0).unwrap().hull().is_none());
        let mut hit = Hit::default();
        let r = Ray::new(Point3::new(3.0, 0.0, 5.0), -Vec3::Z);
        assert!(s.intersect(&r, &mut hit));
        assert!((hit.distance - 4.5).abs() < 1e-5);
        // The north pole maps to latitude 1.
        let (_, lat) = hit.natural_coords();
        assert!((lat - 1.0).abs() < 1e-3);
    }
}
