use geometry::ray::Ray;
use math::hcm::{Point3, Vec3};
use math::Angle;

/// Pinhole camera. In camera space x points right, y up and z forward; image rows grow downward.
pub struct Camera {
    center: Point3,
    a: Vec3,
    b: Vec3,
    c: Vec3,

    // Film image resolution.
    width: u32,
    height: u32,

    orientation: [Vec3; 3],
}

impl Camera {
    pub fn new(resolution: (u32, u32), fov_y: Angle) -> Camera {
        let (width, height) = resolution;
        let aspect_ratio = width as f32 / (height as f32);
        let half_vertical = (fov_y.to_rad() / 2.0).tan();
        let half_horizontal = half_vertical * aspect_ratio;

        Camera {
            center: Point3::ORIGIN,
            a: Vec3::new(2.0 * half_horizontal / width as f32, 0.0, 0.0),
            b: Vec3::new(0.0, -2.0 * half_vertical / height as f32, 0.0),
            c: Vec3::new(-half_horizontal, half_vertical, 1.0),
            width,
            height,
            orientation: [Vec3::X, Vec3::Y, Vec3::Z],
        }
    }

    pub fn look_at(&mut self, from: Point3, target: Point3, up: Vec3) {
        let forward = (target - from).hat(); // camera z-axis
        let right = forward.cross(up).hat(); // camera x-axis
        let up = right.cross(forward); // adjusted y-axis

        self.orientation = [right, up, forward];
        self.center = from;
    }

    /// Ray through the point `(dx, dy)` of the given pixel, where both offsets are in [0, 1).
    pub fn shoot_ray(&self, row: u32, col: u32, (dx, dy): (f32, f32)) -> Option<Ray> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let x = col as f32 + dx.fract();
        let y = row as f32 + dy.fract();
        let local = self.c + self.a * x + self.b * y;
        Ray::normalized(self.center, Self::matvec(&self.orientation, local))
    }

    fn matvec(m: &[Vec3; 3], v: Vec3) -> Vec3 {
        m[0] * v[0] + m[1] * v[1] + m[2] * v[2]
    }
}
