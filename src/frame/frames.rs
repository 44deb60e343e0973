/// The sensor frame at the instant a point was measured. Points in this frame
/// carry their relative timestamp and are distorted by the in-sweep motion.
#[derive(Debug)]
pub struct Lidar;

/// The sensor frame at the start of the current sweep, which is also the end
/// of the previous sweep.
#[derive(Debug)]
pub struct SweepStart;

/// The sensor frame at the end of the current sweep.
#[derive(Debug)]
pub struct SweepEnd;

pub type SweepStartFramed<T> = super::Framed<T, SweepStart>;
