pub mod config;
pub mod error;
pub mod text;
pub mod types;

pub use config::PredioConfig;
pub use error::{PredioError, Result};
pub use types::*;
