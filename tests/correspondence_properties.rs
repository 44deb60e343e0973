//! Randomized checks of the ring-window matching rules against brute force.

use loam_odometry::{
    Config, FeaturePoint,
    algorithm::laser_odometry::correspondence::{find_edge, find_plane},
    frame::Framed,
    reference::ReferenceCloud,
};
use nalgebra::{Point3, point};
use rand::{Rng, SeedableRng, rngs::StdRng};

const RINGS: u16 = 16;

/// A reference cloud ordered by ring, with points scattered inside a box.
fn random_reference(rng: &mut StdRng, count: usize) -> ReferenceCloud<f64> {
    let mut points: Vec<FeaturePoint<f64>> = (0..count)
        .map(|_| {
            let ring = rng.random_range(0..RINGS);
            let position = point![
                rng.random_range(-4.0..4.0),
                rng.random_range(-4.0..4.0),
                rng.random_range(-1.0..1.0)
            ];
            FeaturePoint::new(position, ring, rng.random_range(0.0..1.0), 0.1)
        })
        .collect();
    points.sort_by(|a, b| a.ring().total_cmp(&b.ring()));

    let mut reference = ReferenceCloud::new(points.into_iter().collect::<Framed<_, _>>());
    reference.build_index();
    reference
}

fn random_query(rng: &mut StdRng) -> Point3<f64> {
    point![
        rng.random_range(-5.0..5.0),
        rng.random_range(-5.0..5.0),
        rng.random_range(-1.5..1.5)
    ]
}

/// Index of the point closest to `query` among those accepted by `filter`,
/// if it lies within the correspondence cutoff.
fn brute_force(
    points: &[FeaturePoint<f64>],
    query: &Point3<f64>,
    config: &Config<f64>,
    filter: impl Fn(usize, &FeaturePoint<f64>) -> bool,
) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .filter(|&(index, point)| filter(index, point))
        .map(|(index, point)| (index, nalgebra::distance_squared(&point.position, query)))
        .filter(|&(_, distance)| distance < config.max_correspondence_distance_squared())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

#[test]
fn test_edges_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = Config::<f64>::default();
    let reference = random_reference(&mut rng, 300);
    let points = reference.points();

    for _ in 0..200 {
        let query = random_query(&mut rng);
        let Some(j) = brute_force(points, &query, &config, |_, _| true) else {
            assert_eq!(find_edge(&reference, &query, &config), None);
            continue;
        };
        let ring = points[j].ring();
        let l = brute_force(points, &query, &config, |_, point| {
            let delta = (point.ring() - ring).abs();
            delta > 0.0 && delta <= config.ring_window
        });

        let edge = find_edge(&reference, &query, &config);
        assert_eq!(edge.map(|edge| (edge.j, edge.l)), l.map(|l| (j, l)));
    }
}

#[test]
fn test_planes_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(11);
    let config = Config::<f64>::default();
    let reference = random_reference(&mut rng, 300);
    let points = reference.points();

    for _ in 0..200 {
        let query = random_query(&mut rng);
        let Some(j) = brute_force(points, &query, &config, |_, _| true) else {
            assert_eq!(find_plane(&reference, &query, &config), None);
            continue;
        };
        let ring = points[j].ring();
        let l = brute_force(points, &query, &config, |index, point| {
            index != j && point.ring() == ring
        });
        let m = brute_force(points, &query, &config, |_, point| {
            let delta = (point.ring() - ring).abs();
            delta > 0.0 && delta <= config.ring_window
        });

        let plane = find_plane(&reference, &query, &config);
        match (l, m) {
            (Some(l), Some(m)) => {
                let plane = plane.expect("a plane exists");
                assert_eq!((plane.j, plane.l, plane.m), (j, l, m));
                assert_eq!(points[plane.l].ring(), ring);
                assert_ne!(points[plane.m].ring(), ring);
            }
            _ => assert_eq!(plane, None),
        }
    }
}

#[test]
fn test_unindexed_reference_never_matches() {
    let mut rng = StdRng::seed_from_u64(3);
    let config = Config::<f64>::default();
    let indexed = random_reference(&mut rng, 50);
    let unindexed = ReferenceCloud::new(indexed.cloud().clone());
    assert!(!unindexed.is_indexed());

    for _ in 0..20 {
        let query = random_query(&mut rng);
        assert_eq!(find_edge(&unindexed, &query, &config), None);
        assert_eq!(find_plane(&unindexed, &query, &config), None);
    }
}
