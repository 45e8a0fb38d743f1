pub mod math;
pub mod viewer;
