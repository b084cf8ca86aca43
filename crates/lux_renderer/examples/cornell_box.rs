//! Cornell box with one of every primitive and most materials.
//!
//! Writes `cornell_box.png` to the working directory. An optional first
//! argument names a JSON render configuration; missing fields use defaults.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use lux_renderer::material::Uber;
use lux_renderer::{
    render, Camera, Color, Cone, Cylinder, Material, Mesh, RenderConfig, SceneBuilder, Sphere,
    Triangle, TriangleLight, Vec3,
};

const LIGHT_RADIANCE: f32 = 12.0;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading render config {path}"))?;
            RenderConfig::from_json(&json)?
        }
        None => RenderConfig {
            width: 400,
            height: 400,
            samples_per_pixel: 64,
            ..RenderConfig::default()
        },
    };

    let start = Instant::now();
    let scene = build_scene().build()?;
    log::info!(
        "Scene ready: {} primitives, {} lights in {:.2?}",
        scene.bvh().primitives().len(),
        scene.lights().len(),
        start.elapsed()
    );

    let camera = Camera::new()
        .with_position(Vec3::new(0.0, 1.0, 3.9), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
        .with_fov(40.0)
        .with_aspect_ratio(config.width as f32 / config.height as f32);

    let start = Instant::now();
    let image = render(&scene, &camera, &config)?;
    log::info!("Rendered in {:.2?}", start.elapsed());

    image.save_png("cornell_box.png")?;
    log::info!("Saved cornell_box.png");
    Ok(())
}

/// Box spanning [-1, 1] x [0, 2] x [-1, 1], open towards +z.
fn build_scene() -> SceneBuilder {
    let white = Arc::new(Material::diffuse(Color::splat(0.73)));
    let red = Arc::new(Material::diffuse(Color::new(0.65, 0.05, 0.05)));
    let green = Arc::new(Material::diffuse(Color::new(0.12, 0.45, 0.15)));
    let lamp = Arc::new(Material::emissive(Color::splat(LIGHT_RADIANCE)));

    let mut builder = SceneBuilder::new();

    let wall = |a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: &Arc<Material>| {
        [
            Triangle::new(a, b, c, material.clone()),
            Triangle::new(a, c, d, material.clone()),
        ]
    };
    let walls = [
        // floor, ceiling, back
        wall(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
            &white,
        ),
        wall(
            Vec3::new(-1.0, 2.0, -1.0),
            Vec3::new(1.0, 2.0, -1.0),
            Vec3::new(1.0, 2.0, 1.0),
            Vec3::new(-1.0, 2.0, 1.0),
            &white,
        ),
        wall(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 2.0, -1.0),
            Vec3::new(-1.0, 2.0, -1.0),
            &white,
        ),
        wall(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(-1.0, 2.0, -1.0),
            Vec3::new(-1.0, 2.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
            &red,
        ),
        wall(
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 2.0, 1.0),
            Vec3::new(1.0, 2.0, -1.0),
            &green,
        ),
    ];
    for triangle in walls.into_iter().flatten() {
        builder = builder.add_primitive(triangle);
    }

    // Ceiling lamp: two triangles facing down, each also a light
    let y = 1.999;
    let (l0, l1, l2, l3) = (
        Vec3::new(-0.25, y, -0.25),
        Vec3::new(0.25, y, -0.25),
        Vec3::new(0.25, y, 0.25),
        Vec3::new(-0.25, y, 0.25),
    );
    for [a, b, c] in [[l0, l1, l2], [l0, l2, l3]] {
        builder = builder
            .add_primitive(Triangle::new(a, b, c, lamp.clone()))
            .add_light(TriangleLight::new(a, b, c, Color::splat(LIGHT_RADIANCE)));
    }

    let block = Mesh::cuboid(Vec3::new(0.5, 1.0, 0.5)).transformed(
        Vec3::ONE,
        Vec3::new(0.0, 0.3, 0.0),
        Vec3::new(-0.45, 0.5, -0.4),
    );
    let satin = Uber::default()
        .with_roughness(0.35)
        .with_anisotropic(0.6)
        .with_clearcoat(0.8, 0.9);
    builder = builder.add_mesh(&block, Arc::new(Material::uber(Color::new(0.2, 0.3, 0.7), satin)));

    builder
        .add_primitive(Sphere::new(
            Vec3::new(0.45, 0.3, 0.35),
            0.3,
            Arc::new(Material::dielectric(1.5, 0.0)),
        ))
        .add_primitive(Sphere::new(
            Vec3::new(-0.45, 1.2, -0.4),
            0.2,
            Arc::new(Material::subsurface(Color::new(0.9, 0.6, 0.5), 0.05)),
        ))
        .add_primitive(Cylinder::new(
            Vec3::new(0.5, 0.35, -0.45),
            0.18,
            0.7,
            Arc::new(Material::metal_gold(0.25)),
        ))
        .add_primitive(Cone::new(
            Vec3::new(-0.1, 0.6, 0.45),
            0.2,
            -0.6,
            Arc::new(Material::non_metal(Color::new(0.8, 0.8, 0.2), 0.4)),
        ))
        .with_seed(1)
}
