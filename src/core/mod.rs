pub mod events;
pub mod calibration;
pub mod compare;
pub mod goto;
pub mod session;
