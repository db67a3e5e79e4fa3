pub mod io_utils;
pub mod log_utils;
