/// Defines the `BBox` bounding-box type and its slab test.
pub mod bvh;
pub mod microfacet;
/// `Ray` and the shadow-query `Segment`.
pub mod ray;
pub mod transform;

pub use ray::{Ray, Segment};
pub use transform::{AffineTransform, RigidBodyTransform, Transform};
