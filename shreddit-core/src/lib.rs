pub mod error;
pub mod error_utils;

pub use error::*;
pub use error_utils::*;
