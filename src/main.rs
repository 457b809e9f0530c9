mod camera;
mod cli_options;
mod image;

use std::path::Path;
use std::time::Instant;

use indicatif::ProgressBar;
use light::Sample;
use radiometry::color::Color;
use rayon::prelude::*;
use scene::{ShadeStats, Tracer};

use camera::Camera;
use cli_options::CliOptions;

fn main() {
    env_logger::init();

    let options = match cli_options::parse_args(std::env::args().collect()) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}\nusage: {}", message, CliOptions::message());
            std::process::exit(1);
        }
    };
    if options.help {
        println!("usage: {}", CliOptions::message());
        return;
    }

    let (scene, view) = match scene::preset::by_name(&options.scene_name) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("{} (available: {})", e, scene::preset::NAMES.join(", "));
            std::process::exit(1);
        }
    };
    let scene = match options.depth {
        None => scene,
        Some(depth) => {
            let config = scene.config().with_max_depth(depth);
            match scene.with_config(config) {
                Ok(scene) => scene,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut camera = Camera::new((options.width, options.height), view.fov_y);
    camera.look_at(view.eye, view.target, view.up);

    let start = Instant::now();
    let bar = ProgressBar::new(options.height as u64);
    let render_row = |tracer: &mut Tracer, row: u32| {
        let line = (0..options.width)
            .map(|col| shade_pixel(tracer, &camera, &options, row, col))
            .collect::<Vec<_>>();
        bar.inc(1);
        (line, tracer.take_stats())
    };
    let rows: Vec<(Vec<Color>, ShadeStats)> = if options.use_multi_thread {
        (0..options.height)
            .into_par_iter()
            .map_init(|| Tracer::new(&scene), |tracer, row| render_row(tracer, row))
            .collect()
    } else {
        let mut tracer = Tracer::new(&scene);
        (0..options.height)
            .map(|row| render_row(&mut tracer, row))
            .collect()
    };
    bar.finish();

    let (rows, stats): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let stats: ShadeStats = stats.into_iter().sum();
    log::info!(
        "rendered {}x{} in {:.2}s; {}",
        options.width,
        options.height,
        start.elapsed().as_secs_f32(),
        stats
    );
    if stats.error_fallbacks > 0 {
        log::warn!("{} rays shaded to the error color", stats.error_fallbacks);
    }

    let image = image::Image::from_rows(options.width, rows);
    if let Err(e) = image.write_png(Path::new(&options.output)) {
        eprintln!("cannot write {}: {}", options.output, e);
        std::process::exit(1);
    }
}

/// Averages `options.samples` jittered rays through the pixel.
fn shade_pixel(
    tracer: &mut Tracer, camera: &Camera, options: &CliOptions, row: u32, col: u32,
) -> Color {
    let pixel_index = row * options.width + col;
    let total: Color = (0..options.samples)
        .filter_map(|s| {
            let jitter = if options.samples == 1 {
                (0.5, 0.5)
            } else {
                (rand::random::<f32>(), rand::random::<f32>())
            };
            let ray = camera.shoot_ray(row, col, jitter)?;
            Some(tracer.trace(&ray, Sample::new(s, pixel_index)))
        })
        .sum();
    total * (options.samples as f32).recip()
}
