use std::fmt::{Display, Formatter, Result};

use math::hcm;

/// Represents a ray:
///
///   origin + t * direction
///
/// where t is positive.
///
/// Intersection distances are only meaningful if `dir` is unit-length; `Ray::new()` trusts the
/// caller, `Ray::normalized()` does the normalization and rejects zero directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ray {
    pub origin: hcm::Point3,
    pub dir: hcm::Vec3,
}

impl Ray {
    pub fn new(origin: hcm::Point3, dir: hcm::Vec3) -> Self {
        debug_assert!(
            (dir.norm_squared() - 1.0).abs() < 1e-3,
            "ray direction {} is not normalized",
            dir
        );
        Ray { origin, dir }
    }

    /// Builds a ray with `dir` normalized. Returns `None` if `dir` has zero or non-finite length.
    /// ```
    /// use geometry::ray::Ray;
    /// use math::hcm::{Point3, Vec3};
    /// let r = Ray::normalized(Point3::ORIGIN, Vec3::new(0.0, 0.0, -3.0)).unwrap();
    /// assert_eq!(r.dir, -Vec3::Z);
    /// assert!(Ray::normalized(Point3::ORIGIN, Vec3::ZERO).is_none());
    /// ```
    pub fn normalized(origin: hcm::Point3, dir: hcm::Vec3) -> Option<Self> {
        dir.try_hat().map(|dir| Ray { origin, dir })
    }

    /// Starts a secondary ray at `origin`, nudged `epsilon` along `dir` so that it does not
    /// immediately re-hit the surface it leaves from.
    pub fn spawn(origin: hcm::Point3, dir: hcm::Vec3, epsilon: f32) -> Self {
        Ray::new(origin + dir * epsilon, dir)
    }

    pub fn position_at(&self, t: f32) -> hcm::Point3 {
        self.origin + t * self.dir
    }
}

impl Display for Ray {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let precision = f.precision().unwrap_or(2);
        write!(
            f,
            "{:.precision$} + t{:.precision$}",
            self.origin,
            self.dir,
            precision = precision
        )
    }
}

/// A bounded piece of a line, used by shadow queries: `origin + t * dir` for `t` in `(0, length)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segment {
    pub origin: hcm::Point3,
    pub dir: hcm::Vec3,
    pub length: f32,
}

impl Segment {
    /// A segment of infinite length, as used for lights that are infinitely far away.
    pub fn unbounded(origin: hcm::Point3, dir: hcm::Vec3) -> Self {
        Segment {
            origin,
            dir,
            length: f32::INFINITY,
        }
    }

    /// Connects `from` to `to`. Returns `None` if both points coincide.
    pub fn between(from: hcm::Point3, to: hcm::Point3) -> Option<Self> {
        let diff = to - from;
        let length = diff.norm();
        diff.try_hat().map(|dir| Segment {
            origin: from,
            dir,
            length,
        })
    }

    /// Overwrites `self` in place; used when the segment comes from a scratch pool.
    pub fn set(&mut self, origin: hcm::Point3, dir: hcm::Vec3, length: f32) {
        self.origin = origin;
        self.dir = dir;
        self.length = length;
    }

    pub fn as_ray(&self) -> Ray {
        Ray {
            origin: self.origin,
            dir: self.dir,
        }
    }

    /// True if `t` lies strictly inside the segment.
    pub fn covers(&self, t: f32) -> bool {
        t > 0.0 && t < self.length
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} + t{}, t < {}", self.origin, self.dir, self.length)
    }
}
