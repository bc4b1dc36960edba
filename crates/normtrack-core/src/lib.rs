pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::NormtrackConfig;
pub use error::{NormtrackError, Result};
pub use types::*;
