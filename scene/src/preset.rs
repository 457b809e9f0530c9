use std::sync::Arc;

use geometry::microfacet::{Attenuation, MicrofacetDistrib};
use geometry::transform::RigidBodyTransform;
use light::{AmbientLight, Background, DirectionalLight, PointLight, SpotLight};
use material::{LocalModel, LocalOnly, Material, Pattern, Recursive, TexturePattern};
use math::hcm::{Point3, Vec3};
use math::Angle;
use radiometry::color::Color;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shape::{ConvexPolyhedron, Plane, Quadric, Transformed};

use crate::{Scene, SceneBuilder, SceneError};

/// Where a preset scene is meant to be seen from.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub eye: Point3,
    pub target: Point3,
    pub up: Vec3,
    pub fov_y: Angle,
}

impl View {
    fn new(eye: Point3, target: Point3, fov_deg: f32) -> Self {
        View {
            eye,
            target,
            up: Vec3::Y,
            fov_y: math::new_deg(fov_deg),
        }
    }
}

pub const NAMES: [&str; 3] = ["spheres", "quadrics", "cube"];

pub fn by_name(name: &str) -> Result<(Scene, View), SceneError> {
    match name {
        "spheres" => spheres(),
        "quadrics" => quadrics(),
        "cube" => glass_cube(),
        _ => Err(SceneError::UnknownPreset(name.to_owned())),
    }
}

// Functions that build the scenes: lights, background and collection of surfaces.
// ------------------------------------------------------------------------------------------------

fn blue_sky() -> Background {
    Background::Gradient {
        top: Color::new(0.5, 0.7, 1.0),
        bottom: Color::white(),
    }
}

fn directional(direction: Vec3, color: Color) -> Result<DirectionalLight, SceneError> {
    DirectionalLight::new(direction, color).ok_or(SceneError::DegenerateLight("directional"))
}

/// A slab whose top face is the plane y = 0, tiled in unit squares of two diffuse materials.
fn checkered_floor(builder: &mut SceneBuilder, a: Color, b: Color) -> Result<(), SceneError> {
    let first: Arc<dyn Material> = Arc::new(LocalOnly::diffuse(a, 0.9));
    let second: Arc<dyn Material> = Arc::new(LocalOnly::new(
        LocalModel::diffuse(b, 0.9).with_specular(0.2, 0.3),
    ));
    let grid = Pattern::Grid {
        u_cells: 1,
        v_cells: 1,
    };
    let tiles = builder.add_material(TexturePattern::new(grid, first, second));
    let floor = ConvexPolyhedron::cuboid(
        Point3::new(-50.0, -1.0, -50.0),
        Point3::new(50.0, 0.0, 50.0),
    )?;
    builder.add_surface(floor.with_material(tiles));
    Ok(())
}

fn glass() -> Recursive {
    let local = LocalModel::diffuse(Color::black(), 0.0).with_specular(0.5, 0.05);
    Recursive::transparent(local, 1.0, 1.0, 1.5)
}

/// Diffuse, mirror and glass spheres on a checkered floor, lit by a soft point light.
pub fn spheres() -> Result<(Scene, View), SceneError> {
    let mut builder = Scene::builder();
    checkered_floor(&mut builder, Color::gray(0.9), Color::gray(0.2))?;

    let glass = builder.add_material(glass());
    let mirror = builder.add_material(Recursive::mirror(
        LocalModel::diffuse(Color::new(0.7, 0.6, 0.5), 0.1).with_specular(0.8, 0.2),
        0.8,
    ));
    let matte = builder.add_material(LocalOnly::new(
        LocalModel::diffuse(Color::new(0.4, 0.2, 0.1), 0.9)
            .with_specular(0.3, 0.4)
            .with_attenuation(Attenuation::CookTorrance),
    ));
    builder
        .add_surface(Quadric::sphere_at(Point3::new(0.0, 1.0, 0.0), 1.0)?.with_material(glass))
        .add_surface(Quadric::sphere_at(Point3::new(-2.2, 1.0, -0.5), 1.0)?.with_material(matte))
        .add_surface(Quadric::sphere_at(Point3::new(2.2, 1.0, -0.5), 1.0)?.with_material(mirror));

    // A ring of small spheres with fixed pseudo-random colors.
    let mut rng = StdRng::seed_from_u64(7);
    for i in 0..8 {
        let angle = math::new_deg(i as f32 * 45.0 + 10.0);
        let (sin, cos) = angle.sin_cos();
        let center = Point3::new(4.0 * cos, 0.3, 4.0 * sin - 1.0);
        let albedo = Color::new(rng.gen(), rng.gen(), rng.gen());
        let id = if rng.gen::<f32>() < 0.75 {
            builder.add_material(LocalOnly::diffuse(albedo, 0.9))
        } else {
            builder.add_material(Recursive::mirror(LocalModel::diffuse(albedo, 0.3), 0.6))
        };
        builder.add_surface(Quadric::sphere_at(center, 0.3)?.with_material(id));
    }

    builder
        .add_light(AmbientLight::new(Color::gray(0.1)))
        .add_light(
            PointLight::new(Point3::new(5.0, 10.0, 5.0), Color::gray(0.8)).with_radius(0.5),
        )
        .add_light(directional(Vec3::new(1.0, -1.0, -0.5), Color::gray(0.2))?)
        .background(blue_sky());

    let view = View::new(Point3::new(0.0, 2.5, 9.0), Point3::new(0.0, 0.8, 0.0), 40.0);
    Ok((builder.build()?, view))
}

/// Unbounded quadrics standing on a floor, each placed by one or two `Transformed` nodes.
pub fn quadrics() -> Result<(Scene, View), SceneError> {
    let mut builder = Scene::builder();
    checkered_floor(&mut builder, Color::new(0.8, 0.8, 0.7), Color::new(0.3, 0.3, 0.35))?;

    let red = builder.add_material(LocalOnly::new(
        LocalModel::diffuse(Color::new(0.8, 0.2, 0.15), 0.8)
            .with_specular(0.4, 0.25)
            .with_distribution(MicrofacetDistrib::trowbridge_reitz(0.2))
            .with_attenuation(Attenuation::Smith),
    ));
    let steel = builder.add_material(Recursive::mirror(
        LocalModel::diffuse(Color::gray(0.5), 0.2)
            .with_specular(0.6, 0.1)
            .with_specular_color(Color::new(0.85, 0.9, 1.0)),
        0.6,
    ));
    let green = builder.add_material(LocalOnly::new(
        LocalModel::diffuse(Color::new(0.2, 0.6, 0.25), 0.9)
            .with_specular(0.3, 0.3)
            .with_distribution(MicrofacetDistrib::phong(40.0)),
    ));
    let stripes = builder.add_material(TexturePattern::new(
        Pattern::Stripes {
            scale: 4.0,
            axis: 2,
        },
        Arc::new(LocalOnly::diffuse(Color::new(0.9, 0.8, 0.2), 0.9)),
        Arc::new(LocalOnly::diffuse(Color::new(0.2, 0.2, 0.6), 0.9)),
    ));

    // The catalogue quadrics have their axis along z; this turns z into y.
    let upright = RigidBodyTransform::rotater_x(math::new_deg(-90.0));

    builder
        .add_surface(
            Transformed::builder()
                .child(Quadric::cylinder(0.4)?)
                .transform(upright.translate(Vec3::new(-3.0, 0.0, -1.0)))
                .material(steel)
                .build()?,
        )
        .add_surface(
            Transformed::builder()
                .child(Quadric::hyperboloid_one_sheet(0.5, 1.0)?)
                .transform(upright.translate(Vec3::new(0.0, 1.5, -2.0)))
                .material(red)
                .build()?,
        )
        .add_surface(
            Transformed::builder()
                .child(Quadric::paraboloid(0.5)?)
                .transform(upright.translate(Vec3::new(3.0, 0.2, -1.0)))
                .material(green)
                .build()?,
        );

    // A tilted ellipsoid, spun in its own frame and then lifted into place.
    let spun = Transformed::builder()
        .child(Quadric::ellipsoid(0.9, 0.4, 0.4)?)
        .transform(RigidBodyTransform::rotater_z(math::new_deg(30.0)))
        .build()?;
    builder.add_surface(
        Transformed::builder()
            .child(spun)
            .transform(RigidBodyTransform::translater(Vec3::new(0.0, 0.6, 1.5)))
            .material(stripes)
            .build()?,
    );

    builder
        .add_light(AmbientLight::new(Color::gray(0.15)))
        .add_light(PointLight::new(Point3::new(-4.0, 8.0, 6.0), Color::gray(0.7)))
        .add_light(directional(Vec3::new(-0.3, -1.0, -0.6), Color::gray(0.3))?)
        .background(blue_sky());

    let view = View::new(Point3::new(0.0, 3.0, 10.0), Point3::new(0.0, 1.0, 0.0), 45.0);
    Ok((builder.build()?, view))
}

/// A rotated glass cube with a tinted bottom face, under a spot light.
pub fn glass_cube() -> Result<(Scene, View), SceneError> {
    let mut builder = Scene::builder();
    checkered_floor(&mut builder, Color::gray(0.85), Color::new(0.5, 0.1, 0.1))?;

    let glass = builder.add_material(glass().with_transmit_color(Color::new(0.9, 1.0, 0.95)));
    let frosted = builder.add_material(LocalOnly::diffuse(Color::new(0.6, 0.8, 1.0), 0.8));

    let mut planes = vec![
        Plane::new(Vec3::X, Point3::new(0.75, 0.0, 0.0)),
        Plane::new(-Vec3::X, Point3::new(-0.75, 0.0, 0.0)),
        Plane::new(Vec3::Y, Point3::new(0.0, 0.75, 0.0)),
        Plane::new(-Vec3::Y, Point3::new(0.0, -0.75, 0.0)).with_material(frosted),
        Plane::new(Vec3::Z, Point3::new(0.0, 0.0, 0.75)),
        Plane::new(-Vec3::Z, Point3::new(0.0, 0.0, -0.75)),
    ];
    // Bevel one edge.
    planes.push(Plane::new(
        Vec3::new(1.0, 1.0, 0.0),
        Point3::new(0.55, 0.55, 0.0),
    ));
    let cube = ConvexPolyhedron::new(planes)?.with_material(glass);
    builder.add_surface(
        Transformed::builder()
            .child(cube)
            .transform(
                RigidBodyTransform::rotater_y(math::new_deg(35.0))
                    .translate(Vec3::new(0.0, 0.75, 0.0)),
            )
            .build()?,
    );
    let amber = builder.add_material(LocalOnly::diffuse(Color::new(0.9, 0.6, 0.1), 0.9));
    builder.add_surface(Quadric::sphere_at(Point3::new(1.8, 0.5, -1.5), 0.5)?.with_material(amber));

    let spot = SpotLight::new(
        PointLight::new(Point3::new(0.0, 6.0, 3.0), Color::white()),
        Vec3::new(0.0, -6.0, -3.0),
        math::new_deg(15.0),
        math::new_deg(25.0),
    )
    .ok_or(SceneError::DegenerateLight("spot"))?;
    builder
        .add_light(AmbientLight::new(Color::gray(0.1)))
        .add_light(spot)
        .background(Background::Constant(Color::gray(0.05)));

    let view = View::new(Point3::new(2.0, 3.0, 6.0), Point3::new(0.0, 0.6, 0.0), 40.0);
    Ok((builder.build()?, view))
}
