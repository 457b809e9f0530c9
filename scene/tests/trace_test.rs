use geometry::ray::Ray;
use light::{AmbientLight, Background, PointLight, Sample};
use material::{LocalModel, LocalOnly, Recursive};
use math::hcm::{Point3, Vec3};
use radiometry::color::Color;
use scene::{trace_color, Scene, SceneError, TraceConfig, Tracer};
use shape::{MaterialId, Quadric, ShapeError, Transformed};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn close(a: Color, b: Color) -> bool {
    (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
}

const SURFACE_COLOR: Color = Color::new(0.2, 0.6, 1.0);

fn one_sphere(material: impl material::Material + 'static) -> Scene {
    let mut builder = Scene::builder();
    let id = builder.add_material(material);
    builder
        .add_surface(Quadric::sphere(1.0).unwrap().with_material(id))
        .add_light(AmbientLight::new(Color::white()))
        .background(Background::Constant(Color::gray(0.5)));
    builder.build().unwrap()
}

#[test]
fn ambient_diffuse_ignores_the_view() {
    init_logger();
    let scene = one_sphere(LocalOnly::diffuse(SURFACE_COLOR, 0.5));
    for dir in [
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-0.3, 0.9, 0.1),
    ] {
        let dir = dir.hat();
        let ray = Ray::new(Point3::ORIGIN - dir * 4.0, dir);
        assert_eq!(trace_color(&ray, &scene, 10), 0.5 * SURFACE_COLOR);
    }
    let miss = Ray::new(Point3::new(0.0, 3.0, 4.0), -Vec3::Z);
    assert_eq!(trace_color(&miss, &scene, 10), Color::gray(0.5));
}

#[test]
fn zero_depth_budget_gives_local_color() {
    init_logger();
    let scene = one_sphere(Recursive::mirror(LocalModel::diffuse(SURFACE_COLOR, 0.5), 0.9));
    let ray = Ray::new(Point3::new(0.0, 0.0, 4.0), -Vec3::Z);
    assert!(close(trace_color(&ray, &scene, 0), 0.5 * SURFACE_COLOR));
    let reflected = trace_color(&ray, &scene, 1);
    assert!(close(reflected, 0.5 * SURFACE_COLOR + 0.9 * Color::gray(0.5)));
}

#[test]
fn tracer_reuses_scratch_storage() {
    init_logger();
    let mut builder = Scene::builder();
    let glass = builder.add_material(Recursive::transparent(
        LocalModel::diffuse(Color::black(), 0.0),
        1.0,
        1.0,
        1.5,
    ));
    let matte = builder.add_material(LocalOnly::diffuse(Color::white(), 0.8));
    builder
        .add_surface(Quadric::sphere(1.0).unwrap().with_material(glass))
        .add_surface(
            Quadric::sphere_at(Point3::new(0.0, 0.0, -3.0), 1.0)
                .unwrap()
                .with_material(matte),
        )
        .add_light(PointLight::new(Point3::new(2.0, 5.0, 5.0), Color::white()));
    let scene = builder.build().unwrap();

    let mut tracer = Tracer::new(&scene);
    let first = Ray::new(Point3::new(0.1, 0.0, 5.0), -Vec3::Z);
    tracer.trace(&first, Sample::default());
    let warmed_up = tracer.allocated();
    assert!(warmed_up > 0);
    for i in 0..50 {
        tracer.trace(&first, Sample::new(i, i));
        assert_eq!(tracer.outstanding(), 0);
    }
    assert_eq!(tracer.allocated(), warmed_up);

    let stats = tracer.take_stats();
    assert_eq!(stats.primary_rays, 51);
    assert!(stats.secondary_rays > 0);
    assert!(stats.shadow_rays > 0);
    assert_eq!(stats.error_fallbacks, 0);
    assert_eq!(tracer.stats().primary_rays, 0);
}

#[test]
fn nested_transforms_shade_like_the_plain_sphere() {
    init_logger();
    let mut builder = Scene::builder();
    let id = builder.add_material(LocalOnly::diffuse(SURFACE_COLOR, 1.0));
    let inner = Transformed::builder()
        .child(Quadric::sphere(1.0).unwrap())
        .transform(geometry::RigidBodyTransform::rotater_y(math::new_deg(50.0)))
        .build()
        .unwrap();
    builder
        .add_surface(
            Transformed::builder()
                .child(inner)
                .transform(geometry::RigidBodyTransform::translater(Vec3::new(0.0, 0.0, -2.0)))
                .material(id)
                .build()
                .unwrap(),
        )
        .add_light(PointLight::new(Point3::new(0.0, 0.0, 10.0), Color::white()));
    let scene = builder.build().unwrap();

    // Head-on, the lit point faces the light exactly.
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z);
    assert!(close(trace_color(&ray, &scene, 10), SURFACE_COLOR));
}

fn sphere_with_radius(r: f32) -> Result<Scene, SceneError> {
    let mut builder = Scene::builder();
    let id = builder.add_material(LocalOnly::diffuse(Color::white(), 1.0));
    builder.add_surface(Quadric::sphere(r)?.with_material(id));
    builder.build()
}

#[test]
fn construction_errors() {
    init_logger();
    assert!(matches!(
        Scene::builder().build(),
        Err(SceneError::NoSurfaces)
    ));
    assert_eq!(
        sphere_with_radius(-1.0).err(),
        Some(SceneError::Shape(ShapeError::NonPositiveRadius(-1.0)))
    );
    assert!(sphere_with_radius(1.0).is_ok());

    let mut builder = Scene::builder();
    builder.add_surface(Quadric::sphere(1.0).unwrap().with_material(MaterialId(3)));
    assert_eq!(
        builder.build().err(),
        Some(SceneError::UnknownMaterial {
            surface: 0,
            id: MaterialId(3)
        })
    );

    let scene = sphere_with_radius(1.0).unwrap();
    let bad = TraceConfig::default().with_cutoff(-1.0);
    assert!(matches!(
        scene.with_config(bad),
        Err(SceneError::InvalidConfig(_))
    ));
}
