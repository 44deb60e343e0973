//! Drive the odometry with sweeps of a simulated 16-ring lidar moving down a
//! corridor, and print the estimated pose next to the true one.
//!
//! Run with: `RUST_LOG=debug cargo run --example synthetic_sweeps`

use itertools::Itertools;
use loam_odometry::{CollectTo, Config, FeatureCloud, FeaturePoint, LaserOdometry, SweepFeatures};
use nalgebra::{Point3, Vector3, point, vector};
use rand::{Rng, SeedableRng, rngs::StdRng};

const RINGS: u16 = 16;
const AZIMUTH_STEP_DEG: usize = 3;
const HALF_WIDTH: f64 = 2.0;
const FLOOR: f64 = -1.0;
const CEILING: f64 = 2.0;
const MAX_RANGE: f64 = 30.0;
const POST_SPACING: f64 = 4.0;
const NOISE: f64 = 0.005;

fn elevation(ring: u16) -> f64 {
    (-15.0 + 2.0 * f64::from(ring) + 1.0).to_radians()
}

/// Range along `direction` to the corridor walls, floor or ceiling.
fn cast(direction: &Vector3<f64>, sensor: &Point3<f64>) -> Option<f64> {
    let walls = [
        (direction.x, HALF_WIDTH - sensor.x),
        (direction.x, -HALF_WIDTH - sensor.x),
        (direction.y, FLOOR - sensor.y),
        (direction.y, CEILING - sensor.y),
    ];
    walls
        .into_iter()
        .filter(|&(component, _)| component.abs() > 1e-9)
        .map(|(component, offset)| offset / component)
        .filter(|&range| range > 0.0)
        .min_by(f64::total_cmp)
        .filter(|&range| range < MAX_RANGE)
}

/// Features of one sweep, measured by a sensor that sits at `sensor` at the
/// end of the sweep.
fn sweep(sensor: Point3<f64>, rng: &mut StdRng, scan_period: f64) -> SweepFeatures<f64> {
    let mut noise = || Vector3::from_fn(|_, _| rng.random_range(-NOISE..NOISE));

    let mut surfaces: FeatureCloud<f64> = FeatureCloud::default();
    (0..RINGS)
        .cartesian_product((0..360).step_by(AZIMUTH_STEP_DEG))
        .filter_map(|(ring, azimuth)| {
            let (theta, phi) = (elevation(ring), (azimuth as f64).to_radians());
            let direction = vector![theta.cos() * phi.sin(), theta.sin(), theta.cos() * phi.cos()];
            let range = cast(&direction, &sensor)?;
            Some((ring, Point3::from(direction * range)))
        })
        .map(|(ring, position)| FeaturePoint::new(position + noise(), ring, 1.0, scan_period))
        .collect_to(&mut surfaces);

    let posts = (-2..8).cartesian_product([-1.0, 1.0]).map(|(k, side)| {
        let along = (sensor.z / POST_SPACING).floor() + f64::from(k);
        point![side * (HALF_WIDTH - 0.1), 0.0, along * POST_SPACING]
    });
    let mut corners: FeatureCloud<f64> = FeatureCloud::default();
    (0..RINGS)
        .cartesian_product(posts.collect_vec())
        .filter_map(|(ring, post)| {
            let relative = post - sensor;
            let height = relative.x.hypot(relative.z) * elevation(ring).tan();
            (FLOOR..CEILING)
                .contains(&(sensor.y + height))
                .then(|| (ring, point![relative.x, height, relative.z]))
        })
        .filter(|(_, position)| position.coords.norm() < MAX_RANGE)
        .map(|(ring, position)| FeaturePoint::new(position + noise(), ring, 1.0, scan_period))
        .collect_to(&mut corners);

    let surface_flat = surfaces.iter().step_by(4).copied().collect();
    SweepFeatures {
        corner_sharp: corners.clone(),
        corner_less_sharp: corners,
        surface_flat,
        surface_less_flat: surfaces,
    }
}

fn main() -> loam_odometry::Result<()> {
    env_logger::init();

    let config = Config::<f64>::default();
    let scan_period = config.scan_period;
    let mut odometry = LaserOdometry::new(config)?;
    let mut rng = StdRng::seed_from_u64(0);

    for k in 0..30 {
        let t = k as f64 * scan_period;
        let sensor = point![0.3 * (0.5 * t).sin(), 0.0, 1.5 * t];
        let features = sweep(sensor, &mut rng, scan_period);
        let report = odometry.process_sweep(features);

        let pose = odometry.odometry();
        println!(
            "sweep {k:2}: {report:?}\n  estimated {:?}\n  true      {:?}",
            pose.translation.as_slice(),
            sensor.coords.as_slice()
        );
    }
    Ok(())
}
