pub mod error;
pub mod types;

pub use error::{first_error_message, Result, TopologyError};
pub use types::*;
