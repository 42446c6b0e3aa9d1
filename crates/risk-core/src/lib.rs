pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::{Result, RiskError};
pub use types::*;
