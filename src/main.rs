// Copyright @yucwang 2026

#![allow(dead_code)]

mod core;
mod io;
mod integrators;
mod materials;
mod math;
mod renderers;
mod sensors;
mod shapes;

use self::core::scene::{ Model, Scene };
use self::io::exr_utils;
use self::materials::{ Material, Merl };
use self::math::bitmap::Bitmap;
use self::math::constants::{ Float, Vector3f };
use self::math::transform::Transform;
use self::renderers::ProgressiveRenderer;
use self::sensors::PinholeCamera;
use self::shapes::{ Shape, Sphere, Triangle, TriangleMesh };

use indicatif::{ ProgressBar, ProgressStyle };

use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct Settings {
    width: usize,
    height: usize,
    workers: usize,
    frames: u64,
    seed: u64,
    fov_degrees: Float,
    merl_path: Option<String>,
    output_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 768,
            height: 512,
            workers: thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
            frames: 256,
            seed: 0,
            fov_degrees: 70.0,
            merl_path: None,
            output_path: String::from("output.exr"),
        }
    }
}

fn parse_args(args: &[String]) -> Settings {
    let mut settings = Settings::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    settings.width = v;
                }
            }
            "--height" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    settings.height = v;
                }
            }
            "--workers" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    settings.workers = v;
                }
            }
            "--frames" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<u64>().ok()) {
                    settings.frames = v;
                }
            }
            "--seed" => {
                i += 1;
                settings.seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
            }
            "--fov" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<Float>().ok()) {
                    settings.fov_degrees = v;
                }
            }
            "--merl" => {
                i += 1;
                settings.merl_path = args.get(i).cloned();
            }
            "-o" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    settings.output_path = v.clone();
                }
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} [--width N] [--height N] [--workers N] [--frames N] \
                           [--seed N] [--fov DEG] [--merl brdf.binary] [-o output.exr]",
                          args[0]);
                std::process::exit(0);
            }
            other => {
                log::warn!("ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    settings
}

fn floor_mesh() -> TriangleMesh {
    let a = Vector3f::new(-12.0, 0.0, 3.0);
    let b = Vector3f::new(12.0, 0.0, 3.0);
    let c = Vector3f::new(12.0, 0.0, -16.0);
    let d = Vector3f::new(-12.0, 0.0, -16.0);
    TriangleMesh::new(vec![
        Triangle::new(a, b, c),
        Triangle::new(a, c, d),
    ])
}

fn build_demo_scene(settings: &Settings) -> Scene {
    let camera = PinholeCamera::new(Vector3f::new(0.0, 1.6, 5.0),
                                    Vector3f::new(0.0, -0.1, -1.0),
                                    Some(settings.fov_degrees.to_radians()));
    let mut scene = Scene::new(camera);

    scene.add_model(Model::new(
        Shape::TriangleMesh(floor_mesh()),
        Arc::new(Material::pure_diffuse(Vector3f::new(0.6, 0.6, 0.6))),
        Transform::default()));

    scene.add_model(Model::new(
        Shape::Sphere(Sphere::new(Vector3f::new(0.0, 7.0, -4.0), 2.0)),
        Arc::new(Material::pure_emissive(Vector3f::new(10.0, 10.0, 10.0))),
        Transform::default()));

    scene.add_model(Model::new(
        Shape::Sphere(Sphere::new(Vector3f::new(-2.2, 1.0, -4.0), 1.0)),
        Arc::new(Material::pure_diffuse(Vector3f::new(0.75, 0.25, 0.25))),
        Transform::default()));

    scene.add_model(Model::new(
        Shape::Sphere(Sphere::new(Vector3f::new(0.0, 1.0, -4.8), 1.0)),
        Arc::new(Material::abraded_opaque(Vector3f::new(0.8, 0.6, 0.2),
                                          Vector3f::new(0.9, 0.7, 0.3),
                                          0.25, 0.9)),
        Transform::default()));

    scene.add_model(Model::new(
        Shape::Sphere(Sphere::new(Vector3f::new(2.2, 1.0, -3.2), 1.0)),
        Arc::new(Material::abraded_translucent(Vector3f::new(0.04, 0.04, 0.04),
                                               0.05, 1.5)),
        Transform::default()));

    // a scaled instance to run the transform path
    scene.add_model(Model::new(
        Shape::Sphere(Sphere::new(Vector3f::zeros(), 1.0)),
        Arc::new(Material::pure_diffuse(Vector3f::new(0.25, 0.35, 0.8))),
        Transform::translate_scale(Vector3f::new(-0.6, 0.45, -2.4),
                                   Vector3f::new(0.45, 0.45, 0.45))));

    if let Some(path) = &settings.merl_path {
        match Merl::from_file(path) {
            Ok(merl) => {
                scene.add_model(Model::new(
                    Shape::Sphere(Sphere::new(Vector3f::new(1.0, 0.55, -1.6), 0.55)),
                    Arc::new(Material::merl(merl)),
                    Transform::default()));
            }
            Err(e) => {
                log::error!("cannot use measured BRDF {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }

    scene.cook();
    scene
}

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let settings = parse_args(&args);

    let scene = Arc::new(build_demo_scene(&settings));

    let renderer = ProgressiveRenderer::new(settings.width, settings.height,
                                            settings.workers, 64, settings.seed);
    let session = renderer.spawn(scene);

    let progress = ProgressBar::new(settings.frames);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} samples")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    while session.num_samples() < settings.frames {
        progress.set_position(session.num_samples().min(settings.frames));
        thread::sleep(Duration::from_millis(100));
    }
    progress.finish();

    let accumulator = session.stop();
    let mut image = Bitmap::new(settings.width, settings.height);
    let num_samples = accumulator.get_combined(&mut image);
    log::info!("render finished with {} accumulated samples", num_samples);

    exr_utils::write_exr_to_file(&image.raw_copy(), image.width(), image.height(),
                                 &settings.output_path);
}
