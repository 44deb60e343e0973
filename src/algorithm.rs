pub mod laser_odometry;
