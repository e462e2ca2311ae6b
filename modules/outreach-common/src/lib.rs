pub mod config;
pub mod safety;
pub mod types;

pub use config::{Config, ScraperConfig};
pub use safety::*;
pub use types::*;
