pub mod motor_link;
pub mod sensors;
pub mod camera;
