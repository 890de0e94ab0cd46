use rand::SeedableRng;
use rand::rngs::StdRng;

use kd_tracer::aabb::{Aabb, Bounded};
use kd_tracer::acceleration::{Accelerator, ExactQuery};
use kd_tracer::bvh::Bvh;
use kd_tracer::caster::{count_mismatches, hit_naive};
use kd_tracer::config::{IndexConfig, MAX_DEPTH_LIMIT, SplitHeuristic};
use kd_tracer::error::IndexError;
use kd_tracer::interval::Interval;
use kd_tracer::kdtree::KdTree;
use kd_tracer::numeric::{Float, Vector3, Vector4};
use kd_tracer::ray::Ray;
use kd_tracer::sampler::{random_rays, random_spheres, random_triangles};
use kd_tracer::shapes::{Primitive, Sphere, Triangle};

const EPSILON: Float = 1e-4;

fn spheres_on_x(count: usize, spacing: Float) -> Vec<Sphere> {
    (0..count)
        .map(|i| Sphere::new(Vector3::new(i as Float * spacing, 0.0, 0.0), 1.0, 0))
        .collect()
}

fn random_scene(seed: u64) -> (Vec<Primitive>, Aabb) {
    let mut rng = StdRng::seed_from_u64(seed);
    let world = Aabb::new(Vector3::splat(-20.0), Vector3::splat(20.0));
    let mut prims: Vec<Primitive> = random_spheres(&mut rng, 150, &world, 1.5)
        .into_iter()
        .map(Primitive::from)
        .collect();
    prims.extend(random_triangles(&mut rng, 350, &world, 2.0).into_iter().map(Primitive::from));
    (prims, world)
}

fn leaves<T: Bounded, A: Accelerator<T> + ?Sized>(index: &A) -> Vec<(Aabb, Vec<u32>)> {
    index
        .nodes()
        .iter()
        .filter(|n| n.is_leaf())
        .map(|n| (n.bounds, index.sources()[n.range()].to_vec()))
        .collect()
}

#[test]
fn nine_spheres_split_once() {
    let spheres = spheres_on_x(9, 3.0);
    let tree = KdTree::build(&spheres, &IndexConfig::with_limits(8, 1)).unwrap();

    assert_eq!(tree.nodes().len(), 3);
    assert!(!tree.nodes()[0].is_leaf());

    let leaves = leaves(&tree);
    assert_eq!(leaves.len(), 2);
    let refs: usize = leaves.iter().map(|(_, s)| s.len()).sum();
    assert!((9..=10).contains(&refs));

    let mut seen: Vec<u32> = leaves.iter().flat_map(|(_, s)| s.iter().copied()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, (0..9).collect::<Vec<u32>>());
}

#[test]
fn single_primitive_is_one_leaf_at_any_depth() {
    let sphere = [Sphere::new(Vector3::ONE, 2.0, 0)];
    for max_depth in [0, 1, 5, MAX_DEPTH_LIMIT] {
        let tree = KdTree::build(&sphere, &IndexConfig::with_limits(8, max_depth)).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert!(tree.nodes()[0].is_leaf());
        assert_eq!(tree.primitives(), &sphere);
    }
}

#[test]
fn stacked_duplicates_do_not_blow_up_at_the_depth_cap() {
    let mut spheres = vec![Sphere::new(Vector3::ZERO, 1.0, 0); 16];
    spheres.extend(spheres_on_x(4, 5.0));
    let tree = KdTree::build(&spheres, &IndexConfig::with_limits(1, MAX_DEPTH_LIMIT)).unwrap();

    let stats = tree.stats();
    assert!(stats.nodes < 64, "{} nodes", stats.nodes);
    assert!(stats.primitive_refs < 4 * spheres.len(), "{} references", stats.primitive_refs);
    assert!(tree.validate_structure().is_ok());

    let ray = Ray::new(Vector3::new(0.0, 0.0, -10.0), Vector3::Z);
    let hit = tree.closest_hit(&ray, &Interval::positive(EPSILON)).unwrap();
    assert!((hit.t - 9.0).abs() < EPSILON);
}

#[test]
fn ray_pointing_away_finds_nothing() {
    let (prims, _) = random_scene(1);
    let tree = KdTree::build(&prims, &IndexConfig::default()).unwrap();
    let ray = Ray::new(Vector3::splat(1000.0), Vector3::ONE.normalize());
    assert!(tree.query(&ray).is_empty());
    assert!(tree.query_sources(&ray).is_empty());
    assert!(tree.closest_hit(&ray, &Interval::positive(EPSILON)).is_none());
}

#[test]
fn ray_through_neighbours_in_different_leaves_finds_both() {
    // boundary lands on x = 2, sphere 1 touches it and goes to both sides
    let spheres = spheres_on_x(3, 3.0);
    let tree = KdTree::build(&spheres, &IndexConfig::with_limits(2, 5)).unwrap();

    let leaves = leaves(&tree);
    assert_eq!(leaves.len(), 2);
    let holder = |source: u32| leaves.iter().position(|(_, s)| s.contains(&source));
    assert_ne!(holder(0), holder(2));

    let along_x = Ray::new(Vector3::new(-10.0, 0.0, 0.0), Vector3::X);
    assert_eq!(tree.query_sources(&along_x), vec![0, 1, 2]);

    // lies in the splitting plane itself
    let in_plane = Ray::new(Vector3::new(2.0, 0.0, -10.0), Vector3::Z);
    assert_eq!(tree.query_indices(&in_plane).len(), 4);
    assert_eq!(tree.query_sources(&in_plane), vec![0, 1, 2]);
}

#[test]
fn candidates_contain_every_closest_hit() {
    let (prims, world) = random_scene(42);
    let rays = random_rays(&mut StdRng::seed_from_u64(43), 2000, &world);
    let t_interval = Interval::positive(EPSILON);

    for split in [SplitHeuristic::Median, SplitHeuristic::Midpoint] {
        let config = IndexConfig { split, ..IndexConfig::with_limits(4, 12) };
        let tree = KdTree::build(&prims, &config).unwrap();
        for ray in &rays {
            if let Some(hit) = hit_naive(ray, &t_interval, &prims, false) {
                assert!(tree.query_sources(ray).contains(&hit.source), "{split:?} lost {} on {ray:?}", hit.source);
            }
        }
        assert_eq!(count_mismatches(&tree, &prims, &rays, EPSILON), 0);
    }
}

#[test]
fn every_input_reaches_a_leaf() {
    let (prims, _) = random_scene(7);
    let tree = KdTree::build(&prims, &IndexConfig::with_limits(4, 10)).unwrap();

    let mut covered = vec![false; prims.len()];
    for (_, sources) in leaves(&tree) {
        for s in sources {
            covered[s as usize] = true;
        }
    }
    assert!(covered.iter().all(|&c| c));

    let stats = tree.stats();
    assert_eq!(stats.source_primitives, prims.len());
    assert!(stats.primitive_refs >= prims.len());
}

#[test]
fn children_stay_inside_parents_and_leaves_cover_root() {
    let (prims, _) = random_scene(9);
    let tree = KdTree::build(&prims, &IndexConfig::with_limits(4, 10)).unwrap();
    let nodes = tree.nodes();

    for node in nodes.iter().filter(|n| !n.is_leaf()) {
        let left = &nodes[node.left as usize].bounds;
        let right = &nodes[node.right as usize].bounds;
        assert!(node.bounds.contains(left));
        assert!(node.bounds.contains(right));
        assert_eq!(Aabb::union(left, right), node.bounds);
    }

    let leaf_union = Aabb::union_all(leaves(&tree).iter().map(|(b, _)| b));
    assert_eq!(leaf_union, nodes[0].bounds);
    assert!(tree.validate_structure().is_ok());
}

#[test]
fn rebuilding_gives_identical_arrays() {
    let (prims, _) = random_scene(3);
    let config = IndexConfig::with_limits(3, 12);
    let a = KdTree::build(&prims, &config).unwrap();
    let b = KdTree::build(&prims, &config).unwrap();
    assert_eq!(a.nodes(), b.nodes());
    assert_eq!(a.sources(), b.sources());
    assert_eq!(a.primitives(), b.primitives());
}

#[test]
fn bvh_and_kdtree_agree_on_closest_hits() {
    let (prims, world) = random_scene(11);
    let rays = random_rays(&mut StdRng::seed_from_u64(12), 1000, &world);
    let t_interval = Interval::positive(EPSILON);

    let tree = KdTree::build(&prims, &IndexConfig::with_limits(4, 12)).unwrap();
    let bvh = Bvh::build(&prims, &IndexConfig::with_limits(4, 12)).unwrap();
    assert_eq!(bvh.primitives().len(), prims.len());

    for ray in &rays {
        let a = tree.closest_hit(ray, &t_interval).map(|h| h.t);
        let b = bvh.closest_hit(ray, &t_interval).map(|h| h.t);
        match (a, b) {
            (Some(a), Some(b)) => assert!((a - b).abs() <= EPSILON, "{a} vs {b} on {ray:?}"),
            (None, None) => {}
            other => panic!("disagreement {other:?} on {ray:?}"),
        }
    }
}

#[test]
fn any_hit_matches_existence_of_a_hit() {
    let (prims, world) = random_scene(21);
    let rays = random_rays(&mut StdRng::seed_from_u64(22), 500, &world);
    let t_interval = Interval::positive(EPSILON);
    let tree = KdTree::build(&prims, &IndexConfig::default()).unwrap();

    for ray in &rays {
        let naive = hit_naive(ray, &t_interval, &prims, true);
        assert_eq!(tree.any_hit(ray, &t_interval).is_some(), naive.is_some());
    }
}

#[test]
fn malformed_soup_is_rejected_before_building() {
    let soup = vec![Vector4::ZERO; 4];
    match Triangle::from_soup(&soup) {
        Err(IndexError::MalformedSoup { len }) => assert_eq!(len, 4),
        other => panic!("expected MalformedSoup, got {other:?}"),
    }
}

#[test]
fn empty_scene_answers_empty() {
    let tree = KdTree::<Primitive>::build(&[], &IndexConfig::default()).unwrap();
    let ray = Ray::new(Vector3::ZERO, Vector3::X);
    assert!(tree.query(&ray).is_empty());
    assert!(tree.closest_hit(&ray, &Interval::positive(EPSILON)).is_none());
    assert_eq!(tree.stats().leaves, 1);
}
