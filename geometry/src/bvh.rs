use std::fmt::{Display, Formatter, Result};

use crate::ray::Ray;
use math::{
    float::{min_max, Interval},
    hcm::Point3,
};

/// 3D bounding-box type. Boundary check is closed (`[min, max]`) on all axes.
/// - Build one from 2 `Point3`s, or from a point cloud with `from_points()`;
/// - Expand it by a point with `b.union()`;
/// - Check if it `contains()` a point, or run the slab test against a `Ray` with `slab_test()`.
#[derive(Debug, Clone, Copy)]
pub struct BBox {
    min: Point3,
    max: Point3,
}

/// Result of a successful slab test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabHit {
    /// Parametric distance where the ray enters the box; negative if the origin is inside.
    pub t_enter: f32,
    pub t_exit: f32,
    pub starts_inside: bool,
}

impl BBox {
    pub fn empty() -> BBox {
        BBox {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(-f32::INFINITY, -f32::INFINITY, -f32::INFINITY),
        }
    }
    pub fn new(p0: Point3, p1: Point3) -> BBox {
        let (xmin, xmax) = min_max(p0.x, p1.x);
        let (ymin, ymax) = min_max(p0.y, p1.y);
        let (zmin, zmax) = min_max(p0.z, p1.z);
        BBox {
            min: Point3::new(xmin, ymin, zmin),
            max: Point3::new(xmax, ymax, zmax),
        }
    }
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> BBox {
        points.into_iter().fold(BBox::empty(), |b, p| b.union(*p))
    }

    pub fn union(self, p: Point3) -> BBox {
        let mut result = self;
        for i in 0..3 {
            result.min[i] = self.min[i].min(p[i]);
            result.max[i] = self.max[i].max(p[i]);
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    pub fn all_corners(&self) -> [Point3; 8] {
        let mut res = [Point3::ORIGIN; 8];

        for (i, corner) in res.iter_mut().enumerate() {
            for axis in 0..3 {
                corner[axis] = if i & (1 << axis) == 0 {
                    self.min[axis]
                } else {
                    self.max[axis]
                };
            }
        }

        res
    }
    pub fn min(&self) -> Point3 {
        self.min
    }
    pub fn max(&self) -> Point3 {
        self.max
    }

    /// Slab test: clips the ray line against the three pairs of axis-aligned planes.
    ///
    /// A ray parallel to a slab is rejected at once if its origin lies outside that slab. Returns
    /// `None` if the clipped interval is empty or lies entirely behind the origin. A `Some` result
    /// does not imply that the enclosed surface is hit.
    /// ```
    /// use geometry::{bvh::BBox, ray::Ray};
    /// use math::hcm::{Point3, Vec3};
    /// let b = BBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    /// let hit = b.slab_test(&Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z)).unwrap();
    /// assert_eq!((hit.t_enter, hit.t_exit, hit.starts_inside), (4.0, 6.0, false));
    /// assert!(b.slab_test(&Ray::new(Point3::new(2.0, 0.0, 5.0), -Vec3::Z)).is_none());
    /// ```
    pub fn slab_test(&self, r: &Ray) -> Option<SlabHit> {
        let mut range = Interval::everything();
        for axis in 0..3 {
            let (lo, hi, o) = (self.min[axis], self.max[axis], r.origin[axis]);
            if r.dir[axis] == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv_dir = 1.0 / r.dir[axis];
            let t0 = (lo - o) * inv_dir;
            let t1 = (hi - o) * inv_dir;
            range = range.clip(t0, t1)?;
        }
        let (t_enter, t_exit) = range.as_pair();
        if t_exit < 0.0 {
            return None;
        }
        Some(SlabHit {
            t_enter,
            t_exit,
            starts_inside: t_enter <= 0.0,
        })
    }

    pub fn contains(&self, p: Point3) -> bool {
        for axis in 0..3 {
            if self.min[axis] > p[axis] {
                return false;
            }
            if self.max[axis] < p[axis] {
                return false;
            }
        }
        true
    }
}

impl Display for BBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "box[{} -> {}]", self.min, self.max)
    }
}
