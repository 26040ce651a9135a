pub mod buffer2;
pub mod float_ext;
pub mod log_setup;

pub use buffer2::Buffer2;
pub use float_ext::FloatExt;

/// Default absolute tolerance for approximate float comparisons.
pub const EPSILON: f64 = 1e-6;
