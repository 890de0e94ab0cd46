/*

    Build a spatial index over a small demo scene, cast
    one primary ray per camera pixel against it and check
    the answers against a brute force loop.

    Usage: kdtrace [config.json]
    Log verbosity follows RUST_LOG, e.g. RUST_LOG=debug.

    @date: Oct, 2025
    @author: Bartu

*/

use std::{self, env, time::Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use kd_tracer::aabb::Aabb;
use kd_tracer::caster::{cast_batch, count_mismatches, CastResult};
use kd_tracer::config::RunConfig;
use kd_tracer::gpu::GpuBuffers;
use kd_tracer::json_parser::parse_config;
use kd_tracer::numeric::{Float, Vector3, Vector4};
use kd_tracer::sampler::random_triangles;
use kd_tracer::scene::SceneIndex;
use kd_tracer::shapes::{Primitive, Sphere, Triangle};

fn demo_scene() -> Result<Vec<Primitive>, Box<dyn std::error::Error>> {
    let r: Float = 25000.0;
    let h: Float = 9.0;
    let sr: Float = 3.0;

    let mut primitives: Vec<Primitive> = vec![
        Sphere::new(Vector3::new(7.0, -h + sr, 7.5), sr, 0).into(),
        Sphere::new(Vector3::new(-7.0, -h + sr, 6.5), sr, 6).into(),
        Sphere::new(Vector3::new(0.0, -h + sr, 7.0), sr, 5).into(),
        Sphere::new(Vector3::new(0.0, -(r + h), 7.0), r, 3).into(),
        Sphere::new(Vector3::new(3.0, h + 10.0, 7.0), 3.0, 1).into(),
    ];

    // Quad standing on the floor, as a triangle soup
    let soup = [
        Vector4::new(-2.0, 0.0, 0.0, 0.0),
        Vector4::new(-2.0, 2.0, 0.0, 0.0),
        Vector4::new(2.0, 0.0, 0.0, 0.0),
        Vector4::new(-2.0, 2.0, 0.0, 0.0),
        Vector4::new(2.0, 2.0, 0.0, 0.0),
        Vector4::new(2.0, 0.0, 0.0, 0.0),
    ];
    primitives.extend(Triangle::from_soup(&soup)?.into_iter().map(Primitive::from));

    // Cloud of small triangles around the middle sphere
    let mut rng = StdRng::seed_from_u64(795);
    let cloud = Aabb::new(Vector3::new(-4.0, -h, -2.0), Vector3::new(4.0, -h + 2.0 * sr, 2.0));
    primitives.extend(random_triangles(&mut rng, 500, &cloud, 0.4).into_iter().map(Primitive::from));
    Ok(primitives)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {

    // Logging on console
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    let config = if args.len() == 1 {
        warn!("No config was provided, using defaults...");
        RunConfig::default()
    } else if args.len() == 2 {
        info!("Loading config from {}...", args[1]);
        parse_config(&args[1]).map_err(|e| {
            error!("Failed to load config: {}", e);
            Box::<dyn std::error::Error>::from(e)
        })?
    } else {
        error!("Usage: {} [config.json]", args[0]);
        std::process::exit(1);
    };
    debug!("Config: {:#?}", config);

    let primitives = demo_scene()?;
    info!("Demo scene has {} primitives", primitives.len());

    let start = Instant::now();
    let scene = SceneIndex::new(&primitives, &config.index)?;
    info!("Index built in {:.2?}", start.elapsed());

    let index = scene.snapshot();
    let stats = index.stats();
    info!(
        "{}: {} nodes, {} leaves ({} empty), depth {}, largest leaf {}, duplication {:.2}",
        index.kind(),
        stats.nodes,
        stats.leaves,
        stats.empty_leaves,
        stats.depth,
        stats.largest_leaf,
        stats.duplication_ratio()
    );
    if let Err(e) = index.validate_structure() {
        error!("Index failed validation: {}", e);
        return Err(e.into());
    }

    let rays = config.camera.generate_primary_rays();
    let start = Instant::now();
    let results = cast_batch(index.as_ref(), &rays, config.index.query_mode, config.index.ray_epsilon);
    let elapsed = start.elapsed();

    let reported = results
        .iter()
        .filter(|r| match r {
            CastResult::Candidates(c) => !c.is_empty(),
            CastResult::Hit(h) => h.is_some(),
        })
        .count();
    info!(
        "Cast {} rays in {:.2?} ({:?}), {} reported something",
        rays.len(),
        elapsed,
        config.index.query_mode,
        reported
    );

    let mismatches = count_mismatches(index.as_ref(), &primitives, &rays, config.index.ray_epsilon);
    if mismatches > 0 {
        warn!("{} of {} rays disagree with the brute force result", mismatches, rays.len());
    } else {
        info!("All rays agree with the brute force result");
    }

    let buffers = GpuBuffers::from_index(index.as_ref());
    info!(
        "Device buffers: {} bytes of nodes, {} bytes of primitives",
        buffers.node_bytes().len(),
        buffers.primitive_bytes().len()
    );

    info!("Finished execution.");
    Ok(())
}
