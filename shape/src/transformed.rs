use geometry::bvh::BBox;
use geometry::ray::{Ray, Segment};
use geometry::transform::{AffineTransform, RigidBodyTransform, Transform};
use math::hcm::{Mat3, Mat4, Point3};

use crate::{Hit, MaterialId, ShapeError, Surface, TextureFrame};

/// Places a child surface in the parent frame with a rigid-body transform.
///
/// Rays are brought into the child's frame, intersected there, and the resulting point and
/// normal are mapped back. Distances are preserved because the transform does not scale.
pub struct Transformed {
    child: Box<dyn Surface>,
    /// Child frame to parent frame.
    to_world: AffineTransform,
    /// Parent frame to child frame.
    to_object: AffineTransform,
    /// Inverse-transpose of `to_world`'s linear part.
    normal_to_world: Mat3,
    /// Inverse-transpose of `to_object`'s linear part.
    normal_to_object: Mat3,
    hull: Option<Vec<Point3>>,
    bbox: Option<BBox>,
    material: Option<MaterialId>,
}

#[derive(Default)]
pub struct TransformedBuilder {
    child: Option<Box<dyn Surface>>,
    transform: Option<Mat4>,
    material: Option<MaterialId>,
}

impl TransformedBuilder {
    pub fn child(self, child: impl Surface + 'static) -> Self {
        Self {
            child: Some(Box::new(child)),
            ..self
        }
    }
    pub fn transform(self, t: RigidBodyTransform) -> Self {
        self.matrix(t.to_matrix())
    }
    pub fn matrix(self, m: Mat4) -> Self {
        Self {
            transform: Some(m),
            ..self
        }
    }
    /// Material used for hits whose child assigns none.
    pub fn material(self, material: MaterialId) -> Self {
        Self {
            material: Some(material),
            ..self
        }
    }

    pub fn build(self) -> Result<Transformed, ShapeError> {
        let child = self.child.ok_or(ShapeError::MissingChild)?;
        let m = self.transform.ok_or(ShapeError::MissingTransform)?;
        let to_world = AffineTransform::from_matrix(m).ok_or(ShapeError::SingularTransform)?;
        if to_world.decompose().is_none() {
            return Err(ShapeError::NotRigid);
        }
        let to_object = to_world.inverse();
        let normal_to_world = to_world.normal_matrix();
        let normal_to_object = to_object.normal_matrix();
        let hull = child
            .hull()
            .map(|points| points.iter().map(|p| to_world.apply(*p)).collect::<Vec<_>>());
        let bbox = hull.as_ref().map(|h| BBox::from_points(h.iter()));
        Ok(Transformed {
            child,
            to_world,
            to_object,
            normal_to_world,
            normal_to_object,
            hull,
            bbox,
            material: self.material,
        })
    }
}

impl Transformed {
    pub fn builder() -> TransformedBuilder {
        TransformedBuilder::default()
    }

    pub fn child(&self) -> &dyn Surface {
        self.child.as_ref()
    }

    /// The ray expressed in the child's frame. The direction goes through the normal matrix,
    /// which equals the point matrix's linear part for rigid transforms.
    pub fn ray_to_object(&self, r: &Ray) -> Ray {
        Ray {
            origin: self.to_object.apply(r.origin),
            dir: self.normal_to_object * r.dir,
        }
    }

    pub fn ray_to_world(&self, r: &Ray) -> Ray {
        Ray {
            origin: self.to_world.apply(r.origin),
            dir: self.normal_to_world * r.dir,
        }
    }
}

impl Surface for Transformed {
    fn summary(&self) -> String {
        format!("Transformed({}){}", self.child.summary(), self.to_world)
    }
    fn is_convex(&self) -> bool {
        self.child.is_convex()
    }
    fn hull(&self) -> Option<&[Point3]> {
        self.hull.as_deref()
    }
    fn bbox(&self) -> Option<&BBox> {
        self.bbox.as_ref()
    }

    fn intersect<'s>(&'s self, r: &Ray, hit: &mut Hit<'s>) -> bool {
        let local = self.ray_to_object(r);
        if !self.child.pretest(&local, hit.distance) || !self.child.intersect(&local, hit) {
            return false;
        }
        hit.point = self.to_world.apply(hit.point);
        hit.normal = (self.normal_to_world * hit.normal).hat();
        hit.surface = Some(self);
        if hit.material.is_none() {
            hit.material = self.material;
        }
        true
    }

    fn occludes(&self, s: &Segment) -> bool {
        let local = Segment {
            origin: self.to_object.apply(s.origin),
            dir: self.normal_to_object * s.dir,
            length: s.length,
        };
        self.child.occludes(&local)
    }

    fn natural_params(&self, hit: &Hit) -> (f32, f32) {
        self.child.natural_params(hit)
    }

    fn texture_frame(&self, hit: &Hit) -> TextureFrame {
        self.child.texture_frame(hit)
    }

    fn material(&self) -> Option<MaterialId> {
        self.material
    }

    fn materials(&self) -> Vec<MaterialId> {
        let mut ids = self.child.materials();
        ids.extend(self.material);
        ids
    }
}
