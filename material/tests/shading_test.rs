use std::sync::Arc;

use geometry::ray::Ray;
use light::{AmbientLight, Background, Light, PointLight, Sample};
use material::{
    fresnel_schlick, Arena, LocalModel, LocalOnly, Material, Recursive, ShadeContext, TraceConfig,
};
use math::hcm::{Point3, Vec3};
use radiometry::color::Color;
use shape::{ConvexPolyhedron, MaterialId, Plane, Quadric, Surface};

struct World {
    surfaces: Vec<Box<dyn Surface>>,
    lights: Vec<Box<dyn Light>>,
    materials: Vec<Arc<dyn Material>>,
    background: Background,
    config: TraceConfig,
}

fn trace<'s>(world: &'s World, arena: &mut Arena<'s>, ray: &Ray) -> Color {
    let mut ctx = ShadeContext::new(
        &world.surfaces,
        &world.lights,
        &world.materials,
        &world.background,
        &world.config,
        arena,
    );
    ctx.trace_primary(ray, Sample::default())
}

fn close(a: Color, b: Color) -> bool {
    (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
}

const SURFACE_COLOR: Color = Color::new(0.8, 0.4, 0.2);

fn ambient_world(material: Arc<dyn Material>, config: TraceConfig) -> World {
    World {
        surfaces: vec![Box::new(
            Quadric::sphere(1.0).unwrap().with_material(MaterialId(0)),
        )],
        lights: vec![Box::new(AmbientLight::new(Color::white()))],
        materials: vec![material],
        background: Background::Constant(Color::white()),
        config,
    }
}

#[test]
fn ambient_only_diffuse_is_half_the_color() {
    let world = ambient_world(
        Arc::new(LocalOnly::diffuse(SURFACE_COLOR, 0.5)),
        TraceConfig::default(),
    );
    let mut arena = Arena::new();
    let expected = 0.5 * SURFACE_COLOR;
    for origin in [
        Point3::new(0.0, 0.0, 5.0),
        Point3::new(3.0, -4.0, 1.0),
        Point3::new(-2.0, 0.5, -6.0),
    ] {
        let ray = Ray::normalized(origin, Point3::ORIGIN - origin).unwrap();
        let c = trace(&world, &mut arena, &ray);
        assert_eq!(c, expected);
    }
    assert_eq!(arena.outstanding(), 0);
    assert_eq!(arena.stats.primary_rays, 3);
    assert_eq!(arena.stats.shadow_rays, 0);
}

#[test]
fn zero_depth_has_no_reflection() {
    let mirror = Recursive::mirror(LocalModel::diffuse(SURFACE_COLOR, 0.5), 1.0);
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z);

    let world = ambient_world(Arc::new(mirror), TraceConfig::default().with_max_depth(0));
    let mut arena = Arena::new();
    assert!(close(trace(&world, &mut arena, &ray), 0.5 * SURFACE_COLOR));
    assert_eq!(arena.stats.secondary_rays, 0);
    assert_eq!(arena.stats.depth_pruned, 1);

    // With one generation allowed, the mirror adds the white background.
    let world = ambient_world(Arc::new(mirror), TraceConfig::default().with_max_depth(1));
    let mut arena = Arena::new();
    let c = trace(&world, &mut arena, &ray);
    assert!(close(c, 0.5 * SURFACE_COLOR + Color::white()), "{}", c);
    assert_eq!(arena.stats.secondary_rays, 1);
    assert_eq!(arena.outstanding(), 0);
}

#[test]
fn cutoff_prunes_faint_reflections() {
    let faint = Recursive::mirror(LocalModel::diffuse(SURFACE_COLOR, 0.5), 0.001);
    let world = ambient_world(Arc::new(faint), TraceConfig::default());
    let mut arena = Arena::new();
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z);
    assert!(close(trace(&world, &mut arena, &ray), 0.5 * SURFACE_COLOR));
    assert_eq!(arena.stats.cutoff_pruned, 1);
    assert_eq!(arena.stats.secondary_rays, 0);
}

#[test]
fn glass_sphere_passes_nearly_all_light() {
    let glass = Recursive::transparent(LocalModel::diffuse(Color::black(), 0.0), 1.0, 1.0, 1.5);
    let world = World {
        surfaces: vec![Box::new(
            Quadric::sphere(1.0).unwrap().with_material(MaterialId(0)),
        )],
        lights: vec![],
        materials: vec![Arc::new(glass)],
        background: Background::Constant(Color::white()),
        config: TraceConfig::default(),
    };
    let mut arena = Arena::new();
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z);
    let c = trace(&world, &mut arena, &ray);
    // 4% is reflected at each crossing; the rest passes, and light bouncing inside partly
    // escapes too. Only branches below the cutoff are lost.
    assert!(c.r > 0.99 && c.r <= 1.0 + 1e-5, "{}", c);
    assert!(close(c, Color::gray(c.r)));
    assert!(arena.stats.secondary_rays >= 4);
    assert!(arena.stats.cutoff_pruned >= 1);
    assert_eq!(arena.stats.error_fallbacks, 0);
    assert_eq!(arena.outstanding(), 0);
}

#[test]
fn grazing_ray_inside_glass_is_totally_reflected() {
    let glass = Recursive::transparent(LocalModel::diffuse(Color::black(), 0.0), 1.0, 1.0, 1.5);
    let world = World {
        surfaces: vec![Box::new(
            Quadric::sphere(1.0).unwrap().with_material(MaterialId(0)),
        )],
        lights: vec![],
        materials: vec![Arc::new(glass)],
        background: Background::Constant(Color::white()),
        config: TraceConfig::default().with_internal_reflections(2),
    };
    let mut arena = Arena::new();
    // Starts inside and meets the sphere at 53 degrees from the normal, past the critical angle.
    let ray = Ray::new(Point3::new(0.0, -0.8, 0.0), Vec3::X);
    trace(&world, &mut arena, &ray);
    assert!(arena.stats.total_internal_reflections >= 1);
    assert_eq!(arena.outstanding(), 0);
}

#[test]
fn internal_bounces_stop_at_zero_depth() {
    let glass = Recursive::transparent(LocalModel::diffuse(Color::black(), 0.0), 1.0, 1.0, 1.5);
    let world = World {
        surfaces: vec![Box::new(
            Quadric::sphere(1.0).unwrap().with_material(MaterialId(0)),
        )],
        lights: vec![],
        materials: vec![Arc::new(glass)],
        background: Background::Constant(Color::white()),
        config: TraceConfig::default().with_max_depth(0),
    };
    let mut arena = Arena::new();
    let ray = Ray::new(Point3::new(0.0, -0.8, 0.0), Vec3::X);
    assert_eq!(trace(&world, &mut arena, &ray), Color::black());
    assert_eq!(arena.stats.total_internal_reflections, 1);
    assert_eq!(arena.stats.depth_pruned, 1);
    assert_eq!(arena.stats.secondary_rays, 0);
}

/// Glass filling everything below z = 0, lit only by a white background.
fn glass_below(kr: f32, kt: f32, config: TraceConfig) -> World {
    let glass = Recursive::transparent(LocalModel::diffuse(Color::black(), 0.0), kr, kt, 1.5);
    World {
        surfaces: vec![Box::new(
            ConvexPolyhedron::new(vec![Plane::new(Vec3::Z, Point3::ORIGIN)])
                .unwrap()
                .with_material(MaterialId(0)),
        )],
        lights: vec![],
        materials: vec![Arc::new(glass)],
        background: Background::Constant(Color::white()),
        config,
    }
}

#[test]
fn total_internal_reflection_keeps_transmitted_energy() {
    // 63 degrees from the normal, past the critical angle; the reflected ray heads back down and
    // never meets the surface again.
    let ray = Ray::normalized(Point3::new(0.0, 0.0, -1.0), Vec3::new(2.0, 0.0, 1.0)).unwrap();

    let world = glass_below(0.001, 0.999, TraceConfig::default());
    let mut arena = Arena::new();
    let c = trace(&world, &mut arena, &ray);
    assert!(close(c, Color::white()), "{}", c);
    assert_eq!(arena.stats.total_internal_reflections, 1);
    assert_eq!(arena.stats.secondary_rays, 1);
    assert_eq!(arena.stats.cutoff_pruned, 0);

    let world = glass_below(0.2, 0.5, TraceConfig::default());
    let mut arena = Arena::new();
    let c = trace(&world, &mut arena, &ray);
    assert!(close(c, Color::gray(0.7)), "{}", c);

    // No internal bounce left: the reflection is pruned.
    let world = glass_below(0.2, 0.5, TraceConfig::default().with_internal_reflections(0));
    let mut arena = Arena::new();
    assert_eq!(trace(&world, &mut arena, &ray), Color::black());
    assert_eq!(arena.stats.depth_pruned, 1);
    assert_eq!(arena.stats.secondary_rays, 0);
    assert_eq!(arena.outstanding(), 0);
}

#[test]
fn mirror_saddle_seen_from_behind() {
    // The ray crosses x² - y² = z at (0.5, 0, 0.25) from the side the outward normal points away
    // from. An opaque mirror is still lit there and still spends the depth budget.
    let mirror = Recursive::mirror(LocalModel::diffuse(SURFACE_COLOR, 0.5), 1.0);
    let saddle = |config| World {
        surfaces: vec![Box::new(
            Quadric::hyperbolic_paraboloid(1.0, 1.0)
                .unwrap()
                .with_material(MaterialId(0)),
        )],
        lights: vec![Box::new(AmbientLight::new(Color::white()))],
        materials: vec![Arc::new(mirror)],
        background: Background::Constant(Color::new(1.0, 0.0, 0.0)),
        config,
    };
    let ray = Ray::new(Point3::new(0.5, 0.0, 5.0), -Vec3::Z);

    let world = saddle(TraceConfig::default().with_max_depth(0));
    let mut arena = Arena::new();
    let c = trace(&world, &mut arena, &ray);
    assert!(close(c, 0.5 * SURFACE_COLOR), "{}", c);
    assert_eq!(arena.stats.secondary_rays, 0);
    assert_eq!(arena.stats.depth_pruned, 1);

    // One generation: the reflection runs along -x and meets the saddle again at x = -0.5, where
    // the budget is spent.
    let world = saddle(TraceConfig::default().with_max_depth(1));
    let mut arena = Arena::new();
    let c = trace(&world, &mut arena, &ray);
    assert!(close(c, SURFACE_COLOR), "{}", c);
    assert_eq!(arena.stats.secondary_rays, 1);
    assert_eq!(arena.stats.depth_pruned, 1);
    assert_eq!(arena.outstanding(), 0);
}

#[test]
fn opaque_mirror_reflects_more_at_grazing_angles() {
    let mirror = Recursive::mirror(LocalModel::diffuse(Color::black(), 0.0), 0.5);
    let world = World {
        surfaces: vec![Box::new(
            Quadric::sphere(1.0).unwrap().with_material(MaterialId(0)),
        )],
        lights: vec![],
        materials: vec![Arc::new(mirror)],
        background: Background::Constant(Color::white()),
        config: TraceConfig::default().with_max_depth(1),
    };
    let mut arena = Arena::new();

    let head_on = trace(&world, &mut arena, &Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z));
    assert!(close(head_on, Color::gray(0.5)), "{}", head_on);

    let off_axis = trace(&world, &mut arena, &Ray::new(Point3::new(0.0, 0.9, 5.0), -Vec3::Z));
    let expected = fresnel_schlick((1.0f32 - 0.81).sqrt(), 0.5);
    assert!((off_axis.r - expected).abs() < 1e-4, "{} vs. {}", off_axis, expected);
    assert!(off_axis.r > head_on.r + 0.01);
    assert_eq!(arena.outstanding(), 0);
}

#[test]
fn occluded_point_only_sees_ambient() {
    let floor = ConvexPolyhedron::cuboid(
        Point3::new(-10.0, -10.0, -1.0),
        Point3::new(10.0, 10.0, 0.0),
    )
    .unwrap()
    .with_material(MaterialId(0));
    let blocker = Quadric::sphere_at(Point3::new(0.0, 0.0, 2.0), 1.0)
        .unwrap()
        .with_material(MaterialId(0));
    let world = World {
        surfaces: vec![Box::new(floor), Box::new(blocker)],
        lights: vec![
            Box::new(AmbientLight::new(Color::gray(0.1))),
            Box::new(PointLight::new(Point3::new(0.0, 0.0, 10.0), Color::white())),
        ],
        materials: vec![Arc::new(LocalOnly::diffuse(Color::white(), 1.0))],
        background: Background::default(),
        config: TraceConfig::default(),
    };
    let mut arena = Arena::new();
    let down = Vec3::new(0.0, 3.0, -3.0);

    let shadowed = Ray::normalized(Point3::new(0.0, -3.0, 3.0), down).unwrap();
    let c = trace(&world, &mut arena, &shadowed);
    assert!(close(c, Color::gray(0.1)), "{}", c);

    let lit = Ray::normalized(Point3::new(5.0, -3.0, 3.0), down).unwrap();
    let c = trace(&world, &mut arena, &lit);
    let n_dot_l = 10.0 / 125.0f32.sqrt();
    assert!(close(c, Color::gray(0.1 + n_dot_l)), "{}", c);
    assert_eq!(arena.stats.shadow_rays, 2);
    assert_eq!(arena.outstanding(), 0);
}

fn bare_sphere(config: TraceConfig) -> World {
    World {
        surfaces: vec![Box::new(Quadric::sphere(1.0).unwrap())],
        lights: vec![],
        materials: vec![],
        background: Background::default(),
        config,
    }
}

#[test]
fn missing_material_shades_to_error_color() {
    let world = bare_sphere(TraceConfig::default());
    let mut arena = Arena::new();
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z);
    assert_eq!(trace(&world, &mut arena, &ray), Color::MAGENTA);
    assert_eq!(arena.stats.error_fallbacks, 1);

    let away = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::Z);
    assert_eq!(trace(&world, &mut arena, &away), Color::black());

    let green = Color::new(0.0, 1.0, 0.0);
    let world = bare_sphere(TraceConfig::default().with_error_color(green));
    let mut arena = Arena::new();
    assert_eq!(trace(&world, &mut arena, &ray), green);
}
