mod cloud_errors;
mod validation_errors;

pub use cloud_errors::*;
pub use validation_errors::*;
